//! Terminal host for the todo query client.
//!
//! Plays the part of the demo page: it owns the event loop, asks a
//! `SessionProvider` for identity and tokens, executes the store's HTTP
//! effects, prints notifications as toasts and renders the list.

pub mod app;
pub mod command;
pub mod config;
pub mod render;
pub mod session;
pub mod transport;

pub use app::App;
pub use config::Config;
pub use session::{ConfiguredSession, SessionError, SessionProvider, TokenSource};
pub use transport::Transport;
