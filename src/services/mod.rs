pub mod checkin_service;
pub mod identity_service;
pub mod import_service;
pub mod meeting_service;
pub mod progress;
pub mod property_service;
pub mod shareholder_service;
pub mod snapshot_service;
pub mod transfer_service;

pub use checkin_service::{CheckInError, CheckInService};
pub use identity_service::{IdentityError, IdentityProvider};
pub use import_service::ImportService;
pub use meeting_service::MeetingService;
pub use progress::{ProgressEvent, ProgressHub};
pub use property_service::PropertyService;
pub use shareholder_service::{Note, ShareholderService};
pub use snapshot_service::SnapshotService;
pub use transfer_service::{TransferError, TransferService};
