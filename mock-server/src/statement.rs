//! Recognizes the handful of statements the mock understands.
//!
//! Matching is textual: whitespace is collapsed, case is folded, a trailing
//! `;` is dropped and `"main"."todos"` is treated as `todos`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    Select { completed: Option<bool> },
    Insert,
    SetCompleted,
    Delete,
}

impl Statement {
    /// Number of `?` placeholders the statement binds.
    pub fn arity(self) -> usize {
        match self {
            Statement::Select { .. } => 0,
            Statement::Insert | Statement::Delete => 1,
            Statement::SetCompleted => 2,
        }
    }
}

pub fn parse(sql: &str) -> Result<Statement, String> {
    let normalized = normalize(sql);
    match normalized.as_str() {
        "select * from todos" => return Ok(Statement::Select { completed: None }),
        "insert into todos (user_id, text) values (context.id(), ?)" => {
            return Ok(Statement::Insert)
        }
        "update todos set completed = ? where id = ?" => return Ok(Statement::SetCompleted),
        "delete from todos where id = ?" => return Ok(Statement::Delete),
        _ => {}
    }
    if let Some(flag) = normalized.strip_prefix("select * from todos where completed = ") {
        return match flag {
            "0" | "false" => Ok(Statement::Select {
                completed: Some(false),
            }),
            "1" | "true" => Ok(Statement::Select {
                completed: Some(true),
            }),
            other => Err(format!("unsupported completed filter: {other}")),
        };
    }
    Err(format!("unsupported statement: {}", sql.trim()))
}

fn normalize(sql: &str) -> String {
    let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(';')
        .trim_end()
        .to_lowercase()
        .replace(r#""main"."todos""#, "todos")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_variants_are_recognized() {
        assert_eq!(
            parse("SELECT * FROM todos;"),
            Ok(Statement::Select { completed: None })
        );
        assert_eq!(
            parse(r#"SELECT * FROM "main"."todos";"#),
            Ok(Statement::Select { completed: None })
        );
        assert_eq!(
            parse("select *\n  from todos where completed = 1"),
            Ok(Statement::Select {
                completed: Some(true)
            })
        );
    }

    #[test]
    fn mutations_are_recognized() {
        assert_eq!(
            parse("INSERT INTO todos (user_id, text) VALUES (context.id(), ?)"),
            Ok(Statement::Insert)
        );
        assert_eq!(
            parse("UPDATE todos SET completed = ? WHERE id = ?"),
            Ok(Statement::SetCompleted)
        );
        assert_eq!(
            parse("DELETE FROM todos WHERE id = ?"),
            Ok(Statement::Delete)
        );
    }

    #[test]
    fn unknown_statement_is_rejected() {
        let err = parse("DROP TABLE todos").unwrap_err();
        assert_eq!(err, "unsupported statement: DROP TABLE todos");
    }

    #[test]
    fn bad_completed_filter_is_rejected() {
        assert!(parse("SELECT * FROM todos WHERE completed = 7").is_err());
    }
}
