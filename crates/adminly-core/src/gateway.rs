// ── Resource gateway ──
//
// The seam between the controller and the network. `HttpGateway` is the
// production implementation over `ApiClient`; tests script their own.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};

use adminly_api::{ApiClient, WirePage};

use crate::error::CoreError;
use crate::model::{FilterCriteria, Resource, ResourceId};

/// CSV body of an export, chunk by chunk.
pub type ExportStream = BoxStream<'static, Result<Bytes, CoreError>>;

/// Remote operations on one resource collection.
///
/// Every call resolves to the unwrapped envelope payload or a
/// classified [`CoreError`].
pub trait Gateway<R: Resource>: Send + Sync + 'static {
    fn list(
        &self,
        criteria: &FilterCriteria,
    ) -> impl Future<Output = Result<WirePage<R::Wire>, CoreError>> + Send;

    fn get(&self, id: &ResourceId) -> impl Future<Output = Result<R::Wire, CoreError>> + Send;

    fn create(&self, draft: &R::Draft) -> impl Future<Output = Result<R::Wire, CoreError>> + Send;

    fn update(
        &self,
        id: &ResourceId,
        draft: &R::Draft,
    ) -> impl Future<Output = Result<R::Wire, CoreError>> + Send;

    fn remove(&self, id: &ResourceId) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// CSV of every record matching the criteria's filters (paging ignored).
    fn export(
        &self,
        criteria: &FilterCriteria,
    ) -> impl Future<Output = Result<ExportStream, CoreError>> + Send;
}

/// `Gateway` over the admin REST API.
pub struct HttpGateway<R> {
    client: Arc<ApiClient>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> HttpGateway<R> {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }
}

impl<R> Clone for HttpGateway<R> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.client))
    }
}

impl<R: Resource> Gateway<R> for HttpGateway<R> {
    async fn list(&self, criteria: &FilterCriteria) -> Result<WirePage<R::Wire>, CoreError> {
        let params = criteria.to_query(R::CATEGORY_PARAM);
        Ok(self.client.list_records(R::COLLECTION, &params).await?)
    }

    async fn get(&self, id: &ResourceId) -> Result<R::Wire, CoreError> {
        Ok(self.client.get_record(R::COLLECTION, id.as_str()).await?)
    }

    async fn create(&self, draft: &R::Draft) -> Result<R::Wire, CoreError> {
        Ok(self.client.create_record(R::COLLECTION, draft).await?)
    }

    async fn update(&self, id: &ResourceId, draft: &R::Draft) -> Result<R::Wire, CoreError> {
        Ok(self
            .client
            .update_record(R::COLLECTION, id.as_str(), draft)
            .await?)
    }

    async fn remove(&self, id: &ResourceId) -> Result<(), CoreError> {
        Ok(self.client.delete_record(R::COLLECTION, id.as_str()).await?)
    }

    async fn export(&self, criteria: &FilterCriteria) -> Result<ExportStream, CoreError> {
        let params = criteria.to_export_query(R::CATEGORY_PARAM);
        let stream = self.client.export_records(R::COLLECTION, &params).await?;
        Ok(stream.map_err(CoreError::from).boxed())
    }
}
