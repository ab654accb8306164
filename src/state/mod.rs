//! State management module
//!
//! This module holds the in-memory copies of the backend tables, the
//! dashboard view state and the session that ties them together.

pub mod dashboard;
pub mod session;
pub mod snapshot;

// Re-export commonly used state components
pub use dashboard::{Action, AuthState, DashboardState, DeleteTarget, DeliveryModal, FilterState, Notice, NoticeKind, Tab};
pub use session::{DashboardSession, SessionEvent};
pub use snapshot::{LoadState, Snapshot};
