//! Data models module
//!
//! This module contains all data structures used throughout the crate

pub mod participant;
pub mod attraction;
pub mod event_settings;

// Re-export commonly used models
pub use participant::{Participant, ParticipantRow, ParticipantStatus, ParticipantPatch, NewParticipant, Lifecycle, Delivery};
pub use attraction::{Attraction, AttractionDraft, AttractionKind};
pub use event_settings::{EventSettings, SettingsContent, SettingsUpdate, ResolvedSettings, SectionVisibility};
