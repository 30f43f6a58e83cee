//! Scroll-synchronized reading-progress tracking.
//!
//! The tracker partitions a document into named sections and, on every
//! scroll or resize event, derives which section is active relative to a
//! fixed reference line plus a per-section read percentage. Programmatic
//! jumps go through [`SectionTracker::scroll_to_section`], which stays
//! consistent with passive tracking by publishing an optimistic snapshot
//! that the next measured tick reconciles.

mod messages;
mod state;
mod update;

pub use messages::TrackerEvent;
pub use state::{Phase, ProgressState, SectionTracker, StateSink, SubscriptionId};
pub use update::{Effect, NavigateError};
