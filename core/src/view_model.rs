//! Screen-facing state holders for the trip and user lists.
//!
//! A holder owns the last list it loaded, the last error, and a `Phase`.
//! After every transition it publishes a `Snapshot` on a `watch` channel;
//! UI code subscribes and re-renders on change.
//!
//! All operations take `&mut self`, so one holder never has two requests in
//! flight. There is no cancellation: a future that is driven to completion
//! applies its result even when every subscriber is gone.

use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::service::ApiService;
use crate::transport::{Transport, UreqTransport};
use crate::types::{Record, Trip, User, UserPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What a subscriber sees after each transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<R> {
    pub phase: Phase,
    pub items: Vec<R>,
    pub error: Option<ApiError>,
}

impl<R> Snapshot<R> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}

impl<R> Default for Snapshot<R> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            items: Vec::new(),
            error: None,
        }
    }
}

pub struct ListViewModel<R: Record, T: Transport> {
    service: ApiService<T>,
    items: Vec<R>,
    error: Option<ApiError>,
    phase: Phase,
    updates: watch::Sender<Snapshot<R>>,
}

pub type TripsViewModel<T> = ListViewModel<Trip, T>;
pub type UsersViewModel<T> = ListViewModel<User, T>;

impl<R: Record, T: Transport> ListViewModel<R, T> {
    pub fn new(service: ApiService<T>) -> Self {
        let (updates, _) = watch::channel(Snapshot::default());
        Self {
            service,
            items: Vec::new(),
            error: None,
            phase: Phase::Idle,
            updates,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[R] {
        &self.items
    }

    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    #[must_use]
    pub fn service(&self) -> &ApiService<T> {
        &self.service
    }

    /// Receiver that starts at the current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<R>> {
        self.updates.subscribe()
    }

    /// Reload the whole list. The previous list stays visible if this fails.
    pub async fn fetch_all(&mut self) -> Result<(), ApiError> {
        self.begin();

        match self.service.list::<R>().await {
            Ok(items) => {
                info!(kind = R::NAME, count = items.len(), "list loaded");
                self.items = items;
                self.succeed();
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.fetch_all().await
    }

    /// Create `record` and put the server's copy at the front of the list.
    pub async fn create(&mut self, record: R) -> Result<(), ApiError> {
        self.begin();
        match self.service.create(record).await {
            Ok(created) => {
                info!(kind = R::NAME, id = created.id().unwrap_or_default(), "created");
                self.items.insert(0, created);
                self.succeed();
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Replace the first entry with `id` by the server's copy.
    pub async fn update(&mut self, id: &str, record: &R) -> Result<(), ApiError> {
        self.begin();
        match self.service.update(id, record).await {
            Ok(updated) => {
                info!(kind = R::NAME, id, "updated");
                self.replace_first(id, updated);
                self.succeed();
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Delete `id` on the server and drop every local entry carrying it.
    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        self.begin();
        match self.service.delete::<R>(id).await {
            Ok(()) => {
                let before = self.items.len();
                self.items.retain(|item| item.id() != Some(id));
                info!(kind = R::NAME, id, removed = before - self.items.len(), "deleted");
                self.succeed();
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn replace_first(&mut self, id: &str, record: R) {
        match self.items.iter_mut().find(|item| item.id() == Some(id)) {
            Some(slot) => *slot = record,
            None => debug!(kind = R::NAME, id, "updated record not in local list"),
        }
    }

    /// Every request starts here: the error is cleared and `Loading` goes
    /// out before the transport is called.
    fn begin(&mut self) {
        self.error = None;
        self.transition(Phase::Loading);
    }

    fn succeed(&mut self) {
        self.error = None;
        self.transition(Phase::Loaded);
    }

    fn fail(&mut self, error: ApiError) -> ApiError {
        info!(kind = R::NAME, %error, "request failed");
        self.error = Some(error.clone());
        self.transition(Phase::Failed);
        error
    }

    fn transition(&mut self, phase: Phase) {
        self.phase = phase;
        self.updates.send_replace(Snapshot {
            phase,
            items: self.items.clone(),
            error: self.error.clone(),
        });
    }
}

impl<T: Transport> ListViewModel<User, T> {
    /// Apply a partial update and replace the first matching entry.
    pub async fn patch(&mut self, id: &str, patch: &UserPatch) -> Result<(), ApiError> {
        self.begin();
        match self.service.patch_user(id, patch).await {
            Ok(updated) => {
                info!(kind = User::NAME, id, "patched");
                self.replace_first(id, updated);
                self.succeed();
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }
}

impl<R: Record> ListViewModel<R, UreqTransport> {
    /// Holder backed by the production HTTP transport.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(ApiService::from_config(&config.api))
    }
}
