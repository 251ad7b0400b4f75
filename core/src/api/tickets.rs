//! Ticket CRUD, statistics, and the message thread under each ticket.

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::query::QueryParams;
use crate::types::{
    Acknowledgement, CreateTicket, Envelope, NewMessage, Page, PageQuery, Ticket, TicketMessage,
    TicketQuery, TicketStats, UpdateTicket,
};

pub struct Tickets<'a> {
    client: &'a ApiClient,
}

impl<'a> Tickets<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// JSON when `input` has no attachments, multipart otherwise.
    pub fn create(&self, input: CreateTicket) -> ApiResult<Envelope<Ticket>> {
        let url = self.client.endpoints().tickets();
        self.client.post(&url, Some(input.into_payload()?))
    }

    /// Every ticket visible to the caller, filtered.
    pub fn list(&self, query: &TicketQuery) -> ApiResult<Envelope<Page<Ticket>>> {
        let url = self.client.endpoints().tickets();
        self.client.get(&url, query.to_params())
    }

    /// Tickets created by or assigned to the caller.
    pub fn list_mine(&self, query: &TicketQuery) -> ApiResult<Envelope<Page<Ticket>>> {
        let url = self.client.endpoints().my_tickets();
        self.client.get(&url, query.to_params())
    }

    pub fn get(&self, id: &str) -> ApiResult<Envelope<Ticket>> {
        let url = self.client.endpoints().ticket(id);
        self.client.get(&url, QueryParams::new())
    }

    pub fn update(&self, id: &str, input: UpdateTicket) -> ApiResult<Envelope<Ticket>> {
        let url = self.client.endpoints().ticket(id);
        self.client.put(&url, Some(input.into_payload()?))
    }

    pub fn delete(&self, id: &str) -> ApiResult<Acknowledgement> {
        let url = self.client.endpoints().ticket(id);
        self.client.delete(&url)
    }

    pub fn stats(&self) -> ApiResult<Envelope<TicketStats>> {
        let url = self.client.endpoints().ticket_stats();
        self.client.get(&url, QueryParams::new())
    }

    pub fn messages(&self, ticket_id: &str, query: PageQuery) -> ApiResult<Envelope<Vec<TicketMessage>>> {
        let url = self.client.endpoints().ticket_messages(ticket_id);
        self.client.get(&url, query.to_params())
    }

    pub fn add_message(&self, ticket_id: &str, input: NewMessage) -> ApiResult<Envelope<TicketMessage>> {
        let url = self.client.endpoints().ticket_messages(ticket_id);
        self.client.post(&url, Some(input.into_payload()?))
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tests::{fake_client, sample_user};
    use crate::http::{Attachment, HttpMethod, RequestBody};
    use crate::types::{
        CreateTicket, NewMessage, PageQuery, TicketPriority, TicketQuery, TicketStatus, UpdateTicket,
    };

    const TICKET: &str = r#"{
        "_id": "t1",
        "title": "VPN down",
        "description": "Cannot connect",
        "status": "open",
        "priority": "high",
        "category": "network",
        "createdBy": "u1",
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-01T10:00:00Z"
    }"#;

    fn envelope(data: &str) -> String {
        format!(r#"{{"success":true,"message":"ok","data":{data}}}"#)
    }

    fn new_ticket(attachments: Vec<Attachment>) -> CreateTicket {
        CreateTicket {
            title: "VPN down".to_string(),
            description: "Cannot connect".to_string(),
            priority: TicketPriority::High,
            category: "network".to_string(),
            attachments,
        }
    }

    #[test]
    fn create_without_attachments_sends_json() {
        let (client, transport) = fake_client();
        client.session().store(&sample_user(), "tok");
        transport.respond(201, &envelope(TICKET));

        let created = client.tickets().create(new_ticket(Vec::new())).unwrap();
        assert_eq!(created.data.id, "t1");

        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://api.test/api/v1/tickets");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), Some("Bearer tok"));
        assert!(matches!(req.body, Some(RequestBody::Json(_))));
    }

    #[test]
    fn create_with_attachments_sends_multipart() {
        let (client, transport) = fake_client();
        transport.respond(201, &envelope(TICKET));

        let file = Attachment::new("trace.log", "text/plain", b"timeout".to_vec());
        client.tickets().create(new_ticket(vec![file])).unwrap();

        let req = transport.last_request();
        assert!(req.header("content-type").is_none());
        let Some(RequestBody::Multipart(form)) = req.body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.text_value("category"), Some("network"));
    }

    #[test]
    fn list_mine_hits_my_tickets_and_decodes_page() {
        let (client, transport) = fake_client();
        transport.respond(
            200,
            &envelope(&format!(
                r#"{{"items":[{TICKET}],"pagination":{{"page":1,"limit":50,"total":1,"totalPages":1}}}}"#
            )),
        );
        let query = TicketQuery {
            page: Some(1),
            limit: Some(50),
            ..Default::default()
        };
        let page = client.tickets().list_mine(&query).unwrap().data;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total, 1);
        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/v1/tickets/my-tickets?page=1&limit=50"
        );
    }

    #[test]
    fn list_applies_filters() {
        let (client, transport) = fake_client();
        transport.respond(200, &envelope(r#"{"items":[],"pagination":{"page":1,"limit":10,"total":0}}"#));
        let query = TicketQuery {
            status: Some(TicketStatus::InProgress),
            priority: Some(TicketPriority::Urgent),
            category: Some(String::new()),
            ..Default::default()
        };
        client.tickets().list(&query).unwrap();
        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/v1/tickets?status=in-progress&priority=urgent"
        );
    }

    #[test]
    fn update_puts_to_templated_path() {
        let (client, transport) = fake_client();
        transport.respond(200, &envelope(TICKET));
        let update = UpdateTicket {
            status: Some(TicketStatus::Resolved),
            ..Default::default()
        };
        client.tickets().update("t1", update).unwrap();
        let req = transport.last_request();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://api.test/api/v1/tickets/t1");
        assert_eq!(req.body, Some(RequestBody::Json(r#"{"status":"resolved"}"#.to_string())));
    }

    #[test]
    fn delete_missing_ticket_is_not_found() {
        let (client, transport) = fake_client();
        transport.respond(404, r#"{"success":false,"message":"Ticket not found"}"#);
        let err = client.tickets().delete("nope").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(transport.last_request().method, HttpMethod::Delete);
    }

    #[test]
    fn stats_decode() {
        let (client, transport) = fake_client();
        transport.respond(
            200,
            &envelope(r#"{"total":7,"open":3,"inProgress":2,"resolved":1,"closed":1}"#),
        );
        let stats = client.tickets().stats().unwrap().data;
        assert_eq!(stats.total, 7);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(transport.last_request().url, "http://api.test/api/v1/tickets/stats");
    }

    #[test]
    fn messages_round_trip_through_thread_endpoint() {
        let (client, transport) = fake_client();
        let message = r#"{"_id":"m1","content":"Rebooted router","createdBy":"u1","createdAt":"2024-05-01T11:00:00Z"}"#;
        transport.respond(201, &envelope(message));
        transport.respond(200, &envelope(&format!("[{message}]")));

        let added = client
            .tickets()
            .add_message("t1", NewMessage::new("Rebooted router"))
            .unwrap();
        assert_eq!(added.data.content, "Rebooted router");
        assert_eq!(
            transport.last_request().body,
            Some(RequestBody::Json(r#"{"message":"Rebooted router"}"#.to_string()))
        );

        let thread = client.tickets().messages("t1", PageQuery::default()).unwrap();
        assert_eq!(thread.data.len(), 1);
        assert_eq!(
            transport.last_request().url,
            "http://api.test/api/v1/tickets/t1/messages"
        );
    }
}
