//! Async API facade: a `TripClient` paired with a `Transport`.
//!
//! One canonical service covers every trip and user operation. View models
//! receive it at construction, so tests substitute a scripted transport and
//! production code passes `UreqTransport`.

use crate::client::TripClient;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Record, Trip, User, UserPatch};

pub struct ApiService<T> {
    client: TripClient,
    transport: T,
}

impl<T: Transport> ApiService<T> {
    pub fn new(client: TripClient, transport: T) -> Self {
        Self { client, transport }
    }

    #[must_use]
    pub fn client(&self) -> &TripClient {
        &self.client
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn list<R: Record>(&self) -> Result<Vec<R>, ApiError> {
        let request = self.client.build_list::<R>()?;
        let response = self.transport.execute(request).await?;
        self.client.parse_list(response)
    }

    pub async fn get<R: Record>(&self, id: &str) -> Result<R, ApiError> {
        let request = self.client.build_get::<R>(id)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_one(response)
    }

    pub async fn create<R: Record>(&self, record: R) -> Result<R, ApiError> {
        let request = self.client.build_create(&record)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_created(response, record)
    }

    pub async fn update<R: Record>(&self, id: &str, record: &R) -> Result<R, ApiError> {
        let request = self.client.build_update(id, record)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_one(response)
    }

    pub async fn delete<R: Record>(&self, id: &str) -> Result<(), ApiError> {
        let request = self.client.build_delete::<R>(id)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_deleted(response)
    }

    pub async fn fetch_trips(&self) -> Result<Vec<Trip>, ApiError> {
        self.list().await
    }

    pub async fn fetch_trip(&self, id: &str) -> Result<Trip, ApiError> {
        self.get(id).await
    }

    pub async fn create_trip(&self, trip: Trip) -> Result<Trip, ApiError> {
        self.create(trip).await
    }

    pub async fn update_trip(&self, id: &str, trip: &Trip) -> Result<Trip, ApiError> {
        self.update(id, trip).await
    }

    pub async fn delete_trip(&self, id: &str) -> Result<(), ApiError> {
        self.delete::<Trip>(id).await
    }

    pub async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        self.list().await
    }

    pub async fn fetch_user(&self, id: &str) -> Result<User, ApiError> {
        self.get(id).await
    }

    pub async fn create_user(&self, user: User) -> Result<User, ApiError> {
        self.create(user).await
    }

    pub async fn update_user(&self, id: &str, user: &User) -> Result<User, ApiError> {
        self.update(id, user).await
    }

    pub async fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<User, ApiError> {
        let request = self.client.build_patch_user(id, patch)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_patch_user(response)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.delete::<User>(id).await
    }
}

impl ApiService<UreqTransport> {
    /// Production wiring: ureq transport with the configured timeouts.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(TripClient::new(&config.base_url), UreqTransport::from_config(config))
    }
}
