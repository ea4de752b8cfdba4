//! Airside operating-license workflow: the status graph, its backing store,
//! role-scoped register views, and the audit timeline.

pub mod catalog;
pub mod domain;
pub mod engine;
pub mod history;
pub mod notify;
pub mod router;
pub mod seed;
pub mod service;
pub mod store;
pub mod submission;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantSnapshot, Application, ApplicationId, ApplicationStatus, Attachment, AttachmentSet,
    AuditAction, AuditEvent, LicenseDetails, LicenseKind, MediaKind, Orientation,
    OrientationSession, Practical, PracticalSession, StageStamp,
};
pub use engine::{Transition, TransitionError, TransitionKind, TrainingOutcome};
pub use history::TimelineEntry;
pub use notify::{Audience, Notification, NotificationPublisher, NotifyError, TracingNotifier};
pub use router::licensing_router;
pub use seed::{BacklogEntry, SeedError};
pub use service::{LicensingService, ServiceError};
pub use store::{ApplicationStore, StoreError, UpdateError};
pub use submission::{ReferenceAllocator, SubmissionError, SubmissionForm};
pub use views::{
    PageMarker, RequestPage, RequestQuery, RequestsTab, SafetyCounts, SectionalCounts, SortOrder,
    ViewMode,
};
