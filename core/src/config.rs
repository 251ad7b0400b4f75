//! Base URL configuration and the endpoint path table.
//!
//! # Design
//! Every endpoint lives under `<base_url>/api/v1`. `Endpoints` precomputes
//! that root once; static paths come back as borrowed strings and templated
//! paths take the resource identifier.

/// Environment variable consulted by `ApiConfig::from_env`.
pub const BASE_URL_ENV: &str = "API_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const API_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read `API_BASE_URL`, falling back to `DEFAULT_BASE_URL` when unset or blank.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    pub fn api_root(&self) -> String {
        format!("{}/api/{API_VERSION}", self.base_url)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            root: self.api_root(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Absolute URLs for every endpoint the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    root: String,
}

impl Endpoints {
    pub fn root(&self) -> &str {
        &self.root
    }

    // Auth

    pub fn auth_register(&self) -> String {
        format!("{}/auth/register", self.root)
    }

    pub fn auth_login(&self) -> String {
        format!("{}/auth/login", self.root)
    }

    pub fn auth_logout(&self) -> String {
        format!("{}/auth/logout", self.root)
    }

    pub fn auth_current_user(&self) -> String {
        format!("{}/auth/current-user", self.root)
    }

    // Users

    pub fn users(&self) -> String {
        format!("{}/users", self.root)
    }

    // Data entries

    pub fn data_entries(&self) -> String {
        format!("{}/data-entries", self.root)
    }

    pub fn data_entry(&self, id: &str) -> String {
        format!("{}/data-entries/{id}", self.root)
    }

    // Tickets

    pub fn tickets(&self) -> String {
        format!("{}/tickets", self.root)
    }

    pub fn my_tickets(&self) -> String {
        format!("{}/tickets/my-tickets", self.root)
    }

    pub fn ticket(&self, id: &str) -> String {
        format!("{}/tickets/{id}", self.root)
    }

    pub fn ticket_stats(&self) -> String {
        format!("{}/tickets/stats", self.root)
    }

    pub fn ticket_messages(&self, ticket_id: &str) -> String {
        format!("{}/tickets/{ticket_id}/messages", self.root)
    }
}
