//! Registration, login, logout, and the cached session.

use crate::client::{ApiClient, Payload};
use crate::error::ApiResult;
use crate::query::QueryParams;
use crate::session::StoredUser;
use crate::types::{Acknowledgement, AuthData, Envelope, LoginRequest, RegisterRequest, User};

pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn register(&self, input: &RegisterRequest) -> ApiResult<Envelope<AuthData>> {
        let url = self.client.endpoints().auth_register();
        self.client.post(&url, Some(Payload::json(input)?))
    }

    pub fn login(&self, input: &LoginRequest) -> ApiResult<Envelope<AuthData>> {
        let url = self.client.endpoints().auth_login();
        self.client.post(&url, Some(Payload::json(input)?))
    }

    pub fn current_user(&self) -> ApiResult<Envelope<User>> {
        let url = self.client.endpoints().auth_current_user();
        self.client.get(&url, QueryParams::new())
    }

    pub fn logout(&self) -> ApiResult<Acknowledgement> {
        let url = self.client.endpoints().auth_logout();
        self.client.post(&url, None)
    }

    /// `register`, then cache the returned user and token.
    pub fn register_and_store(&self, input: &RegisterRequest) -> ApiResult<Envelope<AuthData>> {
        let envelope = self.register(input)?;
        self.store_user(&envelope.data.user, &envelope.data.token);
        Ok(envelope)
    }

    /// `login`, then cache the returned user and token.
    pub fn login_and_store(&self, input: &LoginRequest) -> ApiResult<Envelope<AuthData>> {
        let envelope = self.login(input)?;
        self.store_user(&envelope.data.user, &envelope.data.token);
        Ok(envelope)
    }

    /// `logout`, then clear the cached session whatever the server said.
    pub fn logout_and_clear(&self) -> ApiResult<Acknowledgement> {
        let result = self.logout();
        self.clear_user();
        result
    }

    pub fn store_user(&self, user: &User, token: &str) {
        self.client.session().store(user, token);
    }

    pub fn clear_user(&self) {
        self.client.session().clear();
    }

    pub fn stored_user(&self) -> Option<StoredUser> {
        self.client.session().stored_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated()
    }
}
