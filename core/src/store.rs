//! The todo controller as an explicit state container.
//!
//! # Design
//! `Store` owns every piece of page state (session snapshot, cached token,
//! todo list, draft and query buffers) and changes it only in
//! `Store::handle`, one `Event` at a time. Anything that needs the outside
//! world comes back out as an `Effect` for the host to perform: acquire a
//! token, send an HTTP request, or show a notification. Results re-enter as
//! events, so the store stays free of I/O and every transition is testable.
//!
//! Each request is tagged with a monotonically increasing `Ticket`. Only the
//! most recently issued fetch may replace the list; older fetch responses are
//! dropped when they arrive. Responses whose ticket is no longer tracked (the
//! user signed out in between) are dropped as well.
//!
//! Data operations require the store to be ready: signed in with a non-empty
//! token. Anything else is a silent no-op.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::client::{QueryClient, DEFAULT_APPLIED_SQL, DEFAULT_QUERY_DRAFT, SELECT_ALL_SQL};
use crate::error::{Action, ApiError};
use crate::http::{HttpOutcome, HttpRequest};
use crate::session::Session;
use crate::types::Todo;

/// Correlates an issued request with its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Inputs to the store.
#[derive(Debug, Clone)]
pub enum Event {
    /// The session provider reported new identity state.
    SessionChanged(Session),
    /// An `Effect::AcquireToken` finished. `None` means no token was issued.
    TokenResolved(Option<String>),
    /// The todo edit buffer changed.
    DraftEdited(String),
    /// The query edit buffer changed.
    QueryDraftEdited(String),
    /// Commit the query edit buffer as the applied query.
    QueryApplied,
    /// Insert the contents of the todo edit buffer.
    Submit,
    SetCompleted { id: String, completed: bool },
    Delete { id: String },
    /// The host finished executing the request sent under `ticket`.
    Response { ticket: Ticket, outcome: HttpOutcome },
}

/// A transient, fire-and-forget message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub action: Action,
    pub message: String,
}

/// Work the host performs on behalf of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the session provider for a fresh token and report it back as
    /// `Event::TokenResolved`.
    AcquireToken,
    /// Execute `request` and report the outcome as `Event::Response`.
    Send { ticket: Ticket, request: HttpRequest },
    Notify(Notification),
}

#[derive(Debug, Clone)]
enum Pending {
    Fetch,
    Insert,
    Refetch,
    SetCompleted { id: String, completed: bool },
    Delete { id: String },
}

#[derive(Debug)]
pub struct Store {
    client: QueryClient,
    session: Session,
    token: String,
    todos: Vec<Todo>,
    draft: String,
    query_draft: String,
    applied_query: String,
    next_ticket: u64,
    latest_fetch: Option<Ticket>,
    pending: HashMap<Ticket, Pending>,
}

impl Store {
    pub fn new(client: QueryClient) -> Self {
        Self {
            client,
            session: Session::default(),
            token: String::new(),
            todos: Vec::new(),
            draft: String::new(),
            query_draft: DEFAULT_QUERY_DRAFT.to_string(),
            applied_query: DEFAULT_APPLIED_SQL.to_string(),
            next_ticket: 1,
            latest_fetch: None,
            pending: HashMap::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn query_draft(&self) -> &str {
        &self.query_draft
    }

    pub fn applied_query(&self) -> &str {
        &self.applied_query
    }

    /// Signed in with a token in hand.
    pub fn is_ready(&self) -> bool {
        self.session.is_signed_in && !self.token.is_empty()
    }

    /// Number of requests sent and not yet answered.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::SessionChanged(session) => self.on_session(session),
            Event::TokenResolved(token) => self.on_token(token),
            Event::DraftEdited(text) => {
                self.draft = text;
                Vec::new()
            }
            Event::QueryDraftEdited(sql) => {
                self.query_draft = sql;
                Vec::new()
            }
            Event::QueryApplied => self.on_query_applied(),
            Event::Submit => self.on_submit(),
            Event::SetCompleted { id, completed } => self.on_set_completed(id, completed),
            Event::Delete { id } => self.on_delete(id),
            Event::Response { ticket, outcome } => self.on_response(ticket, outcome),
        }
    }

    fn on_session(&mut self, session: Session) -> Vec<Effect> {
        let was_signed_in = self.session.is_signed_in;
        let previous_user = self.session.user.as_ref().map(|u| u.id.clone());
        self.session = session;

        if !self.session.is_signed_in {
            if was_signed_in {
                debug!("signed out, dropping token and {} in-flight requests", self.pending.len());
                self.reset_data();
            }
            return Vec::new();
        }

        let current_user = self.session.user.as_ref().map(|u| u.id.clone());
        if was_signed_in && previous_user == current_user {
            return Vec::new();
        }
        if was_signed_in {
            debug!("account switched, dropping state of previous user");
            self.reset_data();
        }

        vec![Effect::AcquireToken]
    }

    fn on_token(&mut self, token: Option<String>) -> Vec<Effect> {
        if !self.session.is_signed_in {
            debug!("token resolved while signed out, ignoring");
            return Vec::new();
        }
        let token = token.unwrap_or_default();
        if token == self.token {
            return Vec::new();
        }
        self.token = token;
        if !self.is_ready() {
            return Vec::new();
        }
        self.fetch(Pending::Fetch, &self.applied_query.clone())
    }

    fn on_query_applied(&mut self) -> Vec<Effect> {
        if self.query_draft == self.applied_query {
            return Vec::new();
        }
        self.applied_query = self.query_draft.clone();
        if !self.is_ready() {
            return Vec::new();
        }
        self.fetch(Pending::Fetch, &self.applied_query.clone())
    }

    fn on_submit(&mut self) -> Vec<Effect> {
        if !self.is_ready() || self.draft.trim().is_empty() {
            return Vec::new();
        }
        let request = self.client.build_insert(&self.token, &self.draft);
        self.issue(Pending::Insert, Action::Add, request)
    }

    fn on_set_completed(&mut self, id: String, completed: bool) -> Vec<Effect> {
        if !self.is_ready() {
            return Vec::new();
        }
        let request = self.client.build_set_completed(&self.token, &id, completed);
        self.issue(Pending::SetCompleted { id, completed }, Action::Update, request)
    }

    fn on_delete(&mut self, id: String) -> Vec<Effect> {
        if !self.is_ready() {
            return Vec::new();
        }
        let request = self.client.build_delete(&self.token, &id);
        self.issue(Pending::Delete { id }, Action::Delete, request)
    }

    fn on_response(&mut self, ticket: Ticket, outcome: HttpOutcome) -> Vec<Effect> {
        let Some(pending) = self.pending.remove(&ticket) else {
            debug!(%ticket, "response for untracked request, discarding");
            return Vec::new();
        };

        match pending {
            Pending::Fetch | Pending::Refetch if self.latest_fetch != Some(ticket) => {
                debug!(%ticket, latest = ?self.latest_fetch, "stale fetch response, discarding");
                Vec::new()
            }
            Pending::Fetch => {
                match outcome
                    .map_err(ApiError::Transport)
                    .and_then(|r| self.client.parse_rows(r))
                {
                    Ok(todos) => {
                        self.todos = todos;
                        Vec::new()
                    }
                    Err(err) => vec![notify(Action::Fetch, &err)],
                }
            }
            Pending::Refetch => {
                match outcome
                    .map_err(ApiError::Transport)
                    .and_then(|r| self.client.parse_rows(r))
                {
                    Ok(todos) => {
                        self.todos = todos;
                        Vec::new()
                    }
                    Err(err @ (ApiError::Transport(_) | ApiError::Deserialization(_))) => {
                        vec![notify(Action::Add, &err)]
                    }
                    Err(err) => {
                        debug!(%ticket, error = %err, "refetch after insert failed");
                        Vec::new()
                    }
                }
            }
            Pending::Insert => {
                match outcome
                    .map_err(ApiError::Transport)
                    .and_then(|r| self.client.parse_ack(r))
                {
                    Ok(()) => {
                        self.draft.clear();
                        self.fetch(Pending::Refetch, SELECT_ALL_SQL)
                    }
                    Err(err) => vec![notify(Action::Add, &err)],
                }
            }
            Pending::SetCompleted { id, completed } => {
                match outcome
                    .map_err(ApiError::Transport)
                    .and_then(|r| self.client.parse_ack(r))
                {
                    Ok(()) => {
                        if let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) {
                            todo.completed = completed;
                        }
                        Vec::new()
                    }
                    Err(err) => vec![notify(Action::Update, &err)],
                }
            }
            Pending::Delete { id } => {
                match outcome
                    .map_err(ApiError::Transport)
                    .and_then(|r| self.client.parse_ack(r))
                {
                    Ok(()) => {
                        self.todos.retain(|t| t.id != id);
                        Vec::new()
                    }
                    Err(err) => vec![notify(Action::Delete, &err)],
                }
            }
        }
    }

    fn fetch(&mut self, kind: Pending, sql: &str) -> Vec<Effect> {
        let request = self.client.build_select(&self.token, sql);
        let effects = self.issue(kind, Action::Fetch, request);
        if let Some(Effect::Send { ticket, .. }) = effects.first() {
            self.latest_fetch = Some(*ticket);
        }
        effects
    }

    fn issue(
        &mut self,
        kind: Pending,
        action: Action,
        request: Result<HttpRequest, ApiError>,
    ) -> Vec<Effect> {
        let request = match request {
            Ok(request) => request,
            Err(err) => return vec![notify(action, &err)],
        };
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        debug!(%ticket, ?kind, "sending query");
        self.pending.insert(ticket, kind);
        vec![Effect::Send { ticket, request }]
    }

    fn reset_data(&mut self) {
        self.token.clear();
        self.todos.clear();
        self.pending.clear();
        self.latest_fetch = None;
    }
}

fn notify(action: Action, err: &ApiError) -> Effect {
    debug!(%action, error = %err, "request failed");
    Effect::Notify(Notification {
        action,
        message: err.notification_text(action),
    })
}
