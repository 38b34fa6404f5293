//! I/O-free client core for a per-user todo list kept in a remote SQL
//! query service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The `Store` ties these
//! together into the page controller: it consumes `Event`s (session changes,
//! user actions, finished requests) and emits `Effect`s for the host to run.
//!
//! # Design
//! - `QueryClient` is stateless; it holds only `base_url`.
//! - Every operation is a `POST /query` carrying SQL and positional params.
//! - `Store` is the only stateful piece and is mutated one event at a time.
//! - DTOs are defined independently from the mock server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod store;
pub mod types;

pub use client::QueryClient;
pub use error::{Action, ApiError};
pub use http::{HttpOutcome, HttpRequest, HttpResponse};
pub use session::{Session, User};
pub use store::{Effect, Event, Notification, Store, Ticket};
pub use types::{QueryRequest, QueryResult, SqlParam, Todo};
