//! Typed namespaces over the HTTP client, one per server resource.
//!
//! Each namespace borrows the `ApiClient`, picks the endpoint and payload
//! encoding, and hands back the client's result unchanged. Response envelopes
//! are not unwrapped; callers see exactly what the server sent.

pub mod auth;
pub mod data_entries;
pub mod tickets;
pub mod users;

pub use auth::Auth;
pub use data_entries::DataEntries;
pub use tickets::Tickets;
pub use users::Users;

use crate::client::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn tickets(&self) -> Tickets<'_> {
        Tickets::new(self)
    }

    pub fn data_entries(&self) -> DataEntries<'_> {
        DataEntries::new(self)
    }
}
