//! Collaborator contracts and default implementations

pub mod adgraph;
pub mod credentials;
pub mod notify;
pub mod quota;

pub use adgraph::{AdGraphClient, AdGraphError, HttpAdGraphClient};
pub use credentials::CredentialProvider;
pub use notify::{LogNotificationSink, NotificationSink};
pub use quota::{RateBudget, SlidingWindowBudget};
