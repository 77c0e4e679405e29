use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::{AppConfig, ListingConfig};
use crate::database::{DatabaseError, DatabaseManager};
use crate::services::identity_service::provider_from_config;
use crate::services::{
    CheckInService, IdentityProvider, ImportService, MeetingService, ProgressHub, PropertyService,
    ShareholderService, SnapshotService, TransferService,
};

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub tokens: Arc<TokenVerifier>,
    pub identity: Arc<dyn IdentityProvider>,
    pub progress: ProgressHub,
    pub listing: ListingConfig,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, DatabaseError> {
        Ok(Self {
            db: DatabaseManager::connect_lazy(&config.database)?,
            tokens: Arc::new(TokenVerifier::new(&config.security)),
            identity: provider_from_config(&config.identity),
            progress: ProgressHub::new(),
            listing: config.listing.clone(),
        })
    }

    /// Swap the identity provider (tests use an in-memory one)
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    pub fn shareholders(&self) -> ShareholderService {
        ShareholderService::new(self.db.clone())
    }

    pub fn properties(&self) -> PropertyService {
        PropertyService::new(self.db.clone())
    }

    pub fn checkins(&self) -> CheckInService {
        CheckInService::new(self.db.clone())
    }

    pub fn transfers(&self) -> TransferService {
        TransferService::new(self.db.clone())
    }

    pub fn meetings(&self) -> MeetingService {
        MeetingService::new(self.db.clone())
    }

    pub fn imports(&self) -> ImportService {
        ImportService::new(self.db.clone(), self.progress.clone())
    }

    pub fn snapshots(&self) -> SnapshotService {
        SnapshotService::new(self.db.clone())
    }
}
