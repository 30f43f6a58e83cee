//! scrollmark: a host-agnostic scroll-synchronized reading-progress tracker.
//!
//! A host page hands the tracker an ordered set of named sections and a way
//! to resolve their live geometry; the tracker answers with an immutable
//! snapshot per tick holding the active section and a per-section read
//! percentage, plus a jump-to-section primitive that stays consistent with
//! passive tracking. The `document` and `script` modules implement the
//! simulated host used by the demo binary.

pub mod cache;
pub mod cancellation;
pub mod config;
pub mod document;
pub mod progress;
pub mod registry;
pub mod script;
pub mod tracker;

pub use progress::{SectionProgress, completion};
pub use registry::{ExtentResolver, SectionDescriptor, SectionExtent, SectionRegistry};
pub use tracker::{
    Effect, NavigateError, Phase, ProgressState, SectionTracker, SubscriptionId, TrackerEvent,
};
