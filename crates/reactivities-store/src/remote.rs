//! Contract between the store and the backend.
//!
//! The store only ever talks to an `Arc<dyn RemoteServiceClient>`; the HTTP
//! implementation lives in `reactivities-client`.

use async_trait::async_trait;
use reactivities_shared::{ActivityWire, RemoteError};

#[async_trait]
pub trait RemoteServiceClient: Send + Sync {
    /// `GET /activities`
    async fn list(&self) -> Result<Vec<ActivityWire>, RemoteError>;

    /// `GET /activities/{id}`
    async fn details(&self, id: &str) -> Result<ActivityWire, RemoteError>;

    /// `POST /activities`
    async fn create(&self, activity: &ActivityWire) -> Result<(), RemoteError>;

    /// `PUT /activities/{id}`
    async fn update(&self, activity: &ActivityWire) -> Result<(), RemoteError>;

    /// `DELETE /activities/{id}`
    async fn delete(&self, id: &str) -> Result<(), RemoteError>;

    /// `POST /activities/{id}/attend`
    async fn attend(&self, id: &str) -> Result<(), RemoteError>;

    /// `DELETE /activities/{id}/attend`
    async fn unattend(&self, id: &str) -> Result<(), RemoteError>;
}
