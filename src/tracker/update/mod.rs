use super::messages::TrackerEvent;
use super::state::{Phase, SectionTracker};
use tracing::debug;

mod navigator;
mod observer;

pub use navigator::NavigateError;

/// Work that must be performed by the host outside the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Smooth-scroll the surface to an absolute document position. The
    /// animation is never awaited; its progress arrives back through the
    /// ordinary stream of `Scrolled` events.
    ScrollTo { position: f64 },
}

impl SectionTracker {
    /// Process one host event.
    ///
    /// Events delivered after `suspend` are discarded up front: listener
    /// removal can race with in-flight delivery, and a tick must never run
    /// against geometry that is being torn down. Events before `start` are
    /// equally meaningless since no listeners exist yet.
    pub fn update(&mut self, event: TrackerEvent) {
        match self.phase {
            Phase::Suspended => {
                debug!(?event, "Discarding event delivered after teardown");
                return;
            }
            Phase::Idle => {
                debug!(?event, "Discarding event delivered before start");
                return;
            }
            Phase::Tracking => {}
        }

        match event {
            TrackerEvent::Scrolled { position } => self.handle_scrolled(position),
            TrackerEvent::Resized { reference_line } => self.handle_resized(reference_line),
            TrackerEvent::Tick(now) => self.handle_tick(now),
        }
    }
}
