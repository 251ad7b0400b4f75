use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::types::{Envelope, PageQuery, User};

pub struct Users<'a> {
    client: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// All users. The server restricts this to admins.
    pub fn list(&self, query: PageQuery) -> ApiResult<Envelope<Vec<User>>> {
        let url = self.client.endpoints().users();
        self.client.get(&url, query.to_params())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tests::fake_client;
    use crate::types::PageQuery;

    #[test]
    fn list_passes_paging() {
        let (client, transport) = fake_client();
        transport.respond(200, r#"{"success":true,"message":"ok","data":[]}"#);
        let envelope = client.users().list(PageQuery::new(2, 25)).unwrap();
        assert!(envelope.data.is_empty());
        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/v1/users?page=2&limit=25"
        );
    }

    #[test]
    fn forbidden_is_unauthorized() {
        let (client, transport) = fake_client();
        transport.respond(403, r#"{"success":false,"message":"Admins only"}"#);
        let err = client.users().list(PageQuery::default()).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(transport.last_request().url, "http://api.test/api/v1/users");
    }
}
