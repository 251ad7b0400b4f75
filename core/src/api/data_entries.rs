use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::query::QueryParams;
use crate::types::{Acknowledgement, CreateDataEntry, DataEntry, Envelope, PageQuery, UpdateDataEntry};

pub struct DataEntries<'a> {
    client: &'a ApiClient,
}

impl<'a> DataEntries<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Multipart when an image is attached, JSON otherwise.
    pub fn create(&self, input: CreateDataEntry) -> ApiResult<Envelope<DataEntry>> {
        let url = self.client.endpoints().data_entries();
        self.client.post(&url, Some(input.into_payload()?))
    }

    pub fn list(&self, query: PageQuery) -> ApiResult<Envelope<Vec<DataEntry>>> {
        let url = self.client.endpoints().data_entries();
        self.client.get(&url, query.to_params())
    }

    pub fn get(&self, id: &str) -> ApiResult<Envelope<DataEntry>> {
        let url = self.client.endpoints().data_entry(id);
        self.client.get(&url, QueryParams::new())
    }

    pub fn update(&self, id: &str, input: UpdateDataEntry) -> ApiResult<Envelope<DataEntry>> {
        let url = self.client.endpoints().data_entry(id);
        self.client.put(&url, Some(input.into_payload()?))
    }

    pub fn delete(&self, id: &str) -> ApiResult<Acknowledgement> {
        let url = self.client.endpoints().data_entry(id);
        self.client.delete(&url)
    }
}
