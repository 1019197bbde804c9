// ── Collection source seam ──
//
// The subset of collection operations the poller and bindings need.
// `CollectionClient` is the production implementation.

use std::future::Future;

use medtrack_api::{CollectionClient, Document, Error, Fields};

/// Something that can list and create documents by collection name.
pub trait CollectionSource: Send + Sync + 'static {
    /// Fetch every document of `collection`, in server order.
    fn list(&self, collection: &str)
    -> impl Future<Output = Result<Vec<Document>, Error>> + Send;

    /// Create a document, returning its identifier string.
    fn create(
        &self,
        collection: &str,
        fields: &Fields,
    ) -> impl Future<Output = Result<String, Error>> + Send;
}

impl CollectionSource for CollectionClient {
    fn list(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<Document>, Error>> + Send {
        CollectionClient::list(self, collection)
    }

    fn create(
        &self,
        collection: &str,
        fields: &Fields,
    ) -> impl Future<Output = Result<String, Error>> + Send {
        CollectionClient::create(self, collection, fields)
    }
}
