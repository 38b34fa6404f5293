//! Plain-text views of the store.

use std::io::{self, Write};

use todo_query::{Notification, Session, Todo};
use tracing::warn;

pub const EMPTY_LIST: &str = "No todos yet. Add one above!";

pub const SIGNED_OUT: &str = "Signed out. Type `login` to sign in.";

pub fn todos<W: Write>(out: &mut W, todos: &[Todo]) -> io::Result<()> {
    if todos.is_empty() {
        return writeln!(out, "{EMPTY_LIST}");
    }
    let text_width = todos
        .iter()
        .map(|t| t.text.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let user_width = todos
        .iter()
        .map(|t| t.user_id.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    writeln!(out, "  #      {:text_width$}  {:user_width$}  ID", "Todo", "User")?;
    for (row, todo) in todos.iter().enumerate() {
        let mark = if todo.completed { "[x]" } else { "[ ]" };
        writeln!(
            out,
            "{:>3} {mark}  {:text_width$}  {:user_width$}  {}",
            row + 1,
            todo.text,
            todo.user_id,
            todo.id
        )?;
    }
    Ok(())
}

pub fn whoami<W: Write>(out: &mut W, session: &Session, token: &str) -> io::Result<()> {
    match (&session.user, session.is_loaded && session.is_signed_in) {
        (Some(user), true) => {
            writeln!(out, "Email: {}", user.email)?;
            writeln!(out, "User ID: {}", user.id)?;
            writeln!(out, "JWT: {token}")
        }
        _ => writeln!(out, "{SIGNED_OUT}"),
    }
}

/// Transient error toasts. One line per failure; nothing is deduplicated.
#[derive(Debug)]
pub struct Toaster<W: Write> {
    out: W,
}

impl<W: Write> Toaster<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn show(&mut self, notification: &Notification) -> io::Result<()> {
        warn!(action = %notification.action, "{}", notification.message);
        writeln!(self.out, "! {}", notification.message)?;
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
