//! Synchronous API client core for the ticket desk service.
//!
//! # Overview
//! Talks to the ticket desk HTTP API: auth, users, tickets with their message
//! threads, and data entries. Every operation returns `ApiResult<T>`, either
//! the decoded response envelope or an `ApiError` carrying a message and a
//! status code. Nothing panics across this boundary.
//!
//! # Design
//! - Requests are built and responses parsed as plain data (`http` module);
//!   only a `Transport` performs I/O, so the client is testable without a
//!   network.
//! - The session (cached user and bearer token) is an explicit
//!   `SessionStore` injected into `ApiClient`, read fresh on every request.
//! - Resource operations live in borrowing namespaces: `client.auth()`,
//!   `client.users()`, `client.tickets()`, `client.data_entries()`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{ApiClient, Payload, RequestOptions};
pub use config::{ApiConfig, Endpoints};
pub use error::{ApiError, ApiResult};
pub use http::{Attachment, HttpMethod, HttpRequest, HttpResponse, MultipartForm, Part, RequestBody};
pub use query::{build_url, QueryParams, QueryValue};
pub use session::{MemoryStorage, SessionStore, Storage, StoredUser, SESSION_KEY};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    Acknowledgement, AuthData, CreateDataEntry, CreateTicket, DataEntry, Envelope, LoginRequest,
    NewMessage, Page, PageQuery, Pagination, RegisterRequest, Ticket, TicketMessage,
    TicketPriority, TicketQuery, TicketStats, TicketStatus, UpdateDataEntry, UpdateTicket, User,
};
