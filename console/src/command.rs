//! Parses one line of user input into a command.

pub const USAGE: &str = "\
commands:
  add [text]      insert text (or the current draft)
  draft <text>    edit the todo draft
  sql <text>      edit the display query
  fetch           apply the display query
  done <id>       mark a todo completed (`#n` picks row n)
  undo <id>       mark a todo open
  rm <id>         delete a todo
  list            show the todos
  whoami          show the signed-in user and token
  login | logout  sign in or out
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Option<String>),
    Draft(String),
    Sql(String),
    Fetch,
    Done(String),
    Undo(String),
    Remove(String),
    List,
    WhoAmI,
    Login,
    Logout,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let arg = |name: &str, make: fn(String) -> Command| {
            if rest.is_empty() {
                Command::Invalid(format!("{name} needs an argument"))
            } else {
                make(rest.to_string())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Command::Empty,
            "add" => Command::Add((!rest.is_empty()).then(|| rest.to_string())),
            "draft" => Command::Draft(rest.to_string()),
            "sql" => Command::Sql(rest.to_string()),
            "fetch" => Command::Fetch,
            "done" => arg("done", Command::Done),
            "undo" => arg("undo", Command::Undo),
            "rm" | "delete" => arg("rm", Command::Remove),
            "list" | "ls" => Command::List,
            "whoami" => Command::WhoAmI,
            "login" => Command::Login,
            "logout" => Command::Logout,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Invalid(format!("unknown command `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_text_after_verb() {
        assert_eq!(
            Command::parse("add Buy milk"),
            Command::Add(Some("Buy milk".to_string()))
        );
        assert_eq!(Command::parse("add"), Command::Add(None));
    }

    #[test]
    fn sql_keeps_statement_intact() {
        assert_eq!(
            Command::parse("sql SELECT * FROM todos WHERE completed = 1;"),
            Command::Sql("SELECT * FROM todos WHERE completed = 1;".to_string())
        );
    }

    #[test]
    fn id_commands_need_an_argument() {
        assert_eq!(Command::parse("done 3"), Command::Done("3".to_string()));
        assert_eq!(Command::parse("rm #2"), Command::Remove("#2".to_string()));
        assert!(matches!(Command::parse("undo"), Command::Invalid(_)));
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(
            Command::parse("frobnicate"),
            Command::Invalid("unknown command `frobnicate`".to_string())
        );
    }
}
