//! Session providers: where identity state and bearer tokens come from.
//!
//! The store never talks to an identity provider itself. The host asks a
//! `SessionProvider` for the current session, forwards sign-in and sign-out
//! requests to it, and calls `token` whenever the store emits
//! `Effect::AcquireToken`.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use todo_query::{Session, User};
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to run token command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("token command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },
}

pub trait SessionProvider: Send + Sync + 'static {
    /// Current identity state.
    fn session(&self) -> Session;

    fn sign_in(&self) -> Session;

    fn sign_out(&self) -> Session;

    /// Issue a bearer token for the signed-in user. `Ok(None)` means the
    /// provider has no token to give.
    fn token(&self) -> impl Future<Output = Result<Option<String>, SessionError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Static(String),
    /// Run through `sh -c`; trimmed stdout is the token. There is no timeout:
    /// a command that never exits leaves the console waiting on it.
    Command(String),
}

/// Provider backed by local configuration.
///
/// Starts signed in when a token source is configured. Signing in without one
/// is allowed but yields no token, so the store stays unready.
#[derive(Debug)]
pub struct ConfiguredSession {
    user: User,
    source: Option<TokenSource>,
    signed_in: AtomicBool,
}

impl ConfiguredSession {
    pub fn new(user: User, source: Option<TokenSource>) -> Self {
        let signed_in = AtomicBool::new(source.is_some());
        Self {
            user,
            source,
            signed_in,
        }
    }
}

impl SessionProvider for ConfiguredSession {
    fn session(&self) -> Session {
        if self.signed_in.load(Ordering::SeqCst) {
            Session::signed_in(self.user.clone())
        } else {
            Session::signed_out()
        }
    }

    fn sign_in(&self) -> Session {
        self.signed_in.store(true, Ordering::SeqCst);
        self.session()
    }

    fn sign_out(&self) -> Session {
        self.signed_in.store(false, Ordering::SeqCst);
        self.session()
    }

    async fn token(&self) -> Result<Option<String>, SessionError> {
        if !self.signed_in.load(Ordering::SeqCst) {
            return Ok(None);
        }
        match &self.source {
            None => Ok(None),
            Some(TokenSource::Static(token)) => Ok(non_empty(token)),
            Some(TokenSource::Command(command)) => {
                debug!(%command, "running token command");
                let output = Command::new("sh").arg("-c").arg(command).output().await?;
                if !output.status.success() {
                    return Err(SessionError::CommandFailed {
                        status: output.status.to_string(),
                        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                    });
                }
                Ok(non_empty(&String::from_utf8_lossy(&output.stdout)))
            }
        }
    }
}

fn non_empty(token: &str) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
