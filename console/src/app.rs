//! The event loop that hosts the store.
//!
//! # Design
//! All state changes happen on this loop, one event at a time. Effects that
//! need I/O are spawned as tasks that post their result back over an
//! unbounded channel as a new event, so a slow request never blocks the loop.
//!
//! Input is read one command at a time: the next line is only read once the
//! store has no request or token acquisition outstanding. That keeps a piped
//! script deterministic without changing how the store itself handles
//! overlapping work.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use todo_query::{Effect, Event, Store, Todo};
use tracing::{debug, info, warn};

use crate::command::{Command, USAGE};
use crate::render::{self, Toaster};
use crate::session::SessionProvider;
use crate::transport::Transport;

pub struct App<P, O, E>
where
    P: SessionProvider,
    O: Write,
    E: Write,
{
    store: Store,
    provider: Arc<P>,
    transport: Transport,
    out: O,
    toaster: Toaster<E>,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    tokens_pending: usize,
    last_rendered: Option<Vec<Todo>>,
}

impl<P, O, E> App<P, O, E>
where
    P: SessionProvider,
    O: Write,
    E: Write,
{
    pub fn new(store: Store, provider: Arc<P>, transport: Transport, out: O, err: E) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store,
            provider,
            transport,
            out,
            toaster: Toaster::new(err),
            tx,
            rx,
            tokens_pending: 0,
            last_rendered: None,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn output(&self) -> &O {
        &self.out
    }

    pub fn errors(&self) -> &E {
        self.toaster.get_ref()
    }

    /// Run until `quit` or end of input. Outstanding work is finished first.
    pub async fn run<R>(&mut self, input: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.dispatch(Event::SessionChanged(self.provider.session()))?;
        if !self.store.session().is_signed_in {
            writeln!(self.out, "{}", render::SIGNED_OUT)?;
        }

        loop {
            self.settle().await?;
            self.render_if_changed()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if !self.execute(Command::parse(&line))? {
                break;
            }
        }
        self.settle().await?;
        self.render_if_changed()?;
        info!("bye");
        Ok(())
    }

    /// Apply one command. Returns `false` when the user asked to quit.
    fn execute(&mut self, command: Command) -> anyhow::Result<bool> {
        debug!(?command, "command");
        match command {
            Command::Add(text) => {
                if let Some(text) = text {
                    self.dispatch(Event::DraftEdited(text))?;
                }
                self.dispatch(Event::Submit)?;
            }
            Command::Draft(text) => self.dispatch(Event::DraftEdited(text))?,
            Command::Sql(sql) => self.dispatch(Event::QueryDraftEdited(sql))?,
            Command::Fetch => self.dispatch(Event::QueryApplied)?,
            Command::Done(id) => {
                let id = self.resolve_id(&id);
                self.dispatch(Event::SetCompleted { id, completed: true })?;
            }
            Command::Undo(id) => {
                let id = self.resolve_id(&id);
                self.dispatch(Event::SetCompleted {
                    id,
                    completed: false,
                })?;
            }
            Command::Remove(id) => {
                let id = self.resolve_id(&id);
                self.dispatch(Event::Delete { id })?;
            }
            Command::List => self.render()?,
            Command::WhoAmI => {
                render::whoami(&mut self.out, self.store.session(), self.store.token())?
            }
            Command::Login => {
                let session = self.provider.sign_in();
                self.dispatch(Event::SessionChanged(session))?;
            }
            Command::Logout => {
                let session = self.provider.sign_out();
                self.dispatch(Event::SessionChanged(session))?;
                self.last_rendered = None;
                writeln!(self.out, "{}", render::SIGNED_OUT)?;
            }
            Command::Help => writeln!(self.out, "{USAGE}")?,
            Command::Quit => return Ok(false),
            Command::Empty => {}
            Command::Invalid(reason) => writeln!(self.out, "{reason}\n{USAGE}")?,
        }
        Ok(true)
    }

    /// `#n` names the n-th displayed row; anything else is taken as an id.
    fn resolve_id(&self, arg: &str) -> String {
        arg.strip_prefix('#')
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.store.todos().get(i))
            .map(|t| t.id.clone())
            .unwrap_or_else(|| arg.to_string())
    }

    fn dispatch(&mut self, event: Event) -> anyhow::Result<()> {
        if matches!(event, Event::TokenResolved(_)) {
            self.tokens_pending = self.tokens_pending.saturating_sub(1);
        }
        for effect in self.store.handle(event) {
            match effect {
                Effect::AcquireToken => {
                    self.tokens_pending += 1;
                    let provider = Arc::clone(&self.provider);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let token = provider.token().await.unwrap_or_else(|e| {
                            warn!(error = %e, "token acquisition failed");
                            None
                        });
                        let _ = tx.send(Event::TokenResolved(token));
                    });
                }
                Effect::Send { ticket, request } => {
                    let transport = self.transport.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let outcome = transport.send(request).await;
                        let _ = tx.send(Event::Response { ticket, outcome });
                    });
                }
                Effect::Notify(notification) => self.toaster.show(&notification)?,
            }
        }
        Ok(())
    }

    /// Process completions until nothing is outstanding.
    async fn settle(&mut self) -> anyhow::Result<()> {
        while self.store.in_flight() > 0 || self.tokens_pending > 0 {
            let Some(event) = self.rx.recv().await else {
                break;
            };
            self.dispatch(event)?;
        }
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        if self.store.session().is_signed_in {
            render::todos(&mut self.out, self.store.todos())?;
        } else {
            writeln!(self.out, "{}", render::SIGNED_OUT)?;
        }
        self.last_rendered = Some(self.store.todos().to_vec());
        self.out.flush()?;
        Ok(())
    }

    fn render_if_changed(&mut self) -> anyhow::Result<()> {
        if !self.store.session().is_signed_in {
            return Ok(());
        }
        if self.last_rendered.as_deref() != Some(self.store.todos()) {
            self.render()?;
        }
        Ok(())
    }
}
