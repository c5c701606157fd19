//! # Domain Module
//!
//! Contains the business rules of the farm: validation of every form, the
//! derived dashboard and report figures, date filtering, the lot deletion
//! guard and the [`FarmService`] that ties them to the configured storage.
//!
//! ## Key Responsibilities
//!
//! - **Validation**: per-field flags for every record form and the credential forms
//! - **Aggregation**: pure functions recomputed on demand, never cached
//! - **Lifecycle**: session-scoped collections with optimistic persistence
//!
//! The domain layer never talks to HTTP and never knows which storage backend
//! is in use.

pub mod collections;
pub mod date_filter;
pub mod error;
pub mod farm_service;
pub mod lot_service;
pub mod notifications;
pub mod report_renderer;
pub mod report_service;
pub mod validation;

pub use collections::{CollectionSlot, FarmCollections, FreelyDeletable};
pub use date_filter::{DateFilter, FilterDate};
pub use error::{FarmError, FarmResult};
pub use farm_service::FarmService;
pub use lot_service::{LotDeletionDecision, LotService};
pub use notifications::{LogNotifier, NotificationSink};
pub use report_renderer::{CsvReportRenderer, ReportRenderer};
pub use report_service::ReportService;
pub use validation::{
    validate_login, validate_password_reset, validate_registration, CredentialError, RecordForm,
};
