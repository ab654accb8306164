//! Statistics and table views
//!
//! Derived presentation data computed from a snapshot of the backend tables.

pub mod aggregator;
pub mod pagination;

pub use aggregator::{ChartSlice, DashboardStats, Grouping, DEFAULT_USER_TYPE, UNSPECIFIED_UNIT};
pub use pagination::{clamp_page, filter_participants, matches_query, paginate, search_page, ParticipantPage, DEFAULT_PAGE_SIZE};
