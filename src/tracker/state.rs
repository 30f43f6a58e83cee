//! Tracker state and subscription plumbing.

use crate::cancellation::CancellationToken;
use crate::config::TrackerConfig;
use crate::registry::{ExtentResolver, SectionRegistry};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Lifecycle of a tracker instance. There is no way back out of
/// `Suspended`; a new document gets a new tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Tracking,
    Suspended,
}

/// The immutable snapshot published after each tick.
///
/// `progress_by_id` holds exactly one entry per registered section.
/// `active_id` is the last section in registry order whose heading marker
/// has crossed the reference line, or `None` above the first section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressState {
    pub progress_by_id: HashMap<String, f64>,
    pub active_id: Option<String>,
}

/// Handle returned by [`SectionTracker::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Push-based consumer of published snapshots.
pub type StateSink = Box<dyn FnMut(&ProgressState)>;

pub(super) struct PendingSettle {
    pub(super) due: Instant,
    pub(super) token: CancellationToken,
}

/// Scroll-synchronized reading-progress tracker.
///
/// The registry is owned here and read fresh on every tick, so handlers
/// never operate on a section list captured at subscription time.
pub struct SectionTracker {
    pub(super) phase: Phase,
    pub(super) registry: SectionRegistry,
    pub(super) resolver: Box<dyn ExtentResolver>,
    pub(super) reference_line: f64,
    pub(super) scroll_position: f64,
    pub(super) settle_delay: Duration,
    pub(super) pending_settle: Option<PendingSettle>,
    pub(super) snapshot: ProgressState,
    sinks: Vec<(SubscriptionId, StateSink)>,
    next_sink_id: u64,
}

impl SectionTracker {
    pub fn new(
        config: &TrackerConfig,
        registry: SectionRegistry,
        resolver: Box<dyn ExtentResolver>,
    ) -> Self {
        Self {
            phase: Phase::Idle,
            registry,
            resolver,
            reference_line: config.reference_line,
            scroll_position: 0.0,
            settle_delay: config.settle_delay(),
            pending_settle: None,
            snapshot: ProgressState::default(),
            sinks: Vec::new(),
            next_sink_id: 0,
        }
    }

    /// Begin tracking and arm the deferred initial recomputation.
    ///
    /// Layout is often not stable yet when listeners attach (fonts and
    /// images still loading), so one extra recomputation is scheduled at
    /// `now + settle_delay` and fired by a later [`TrackerEvent::Tick`].
    pub fn start(&mut self, now: Instant) {
        if self.phase != Phase::Idle {
            debug!(phase = ?self.phase, "start ignored; tracker already ran");
            return;
        }
        self.phase = Phase::Tracking;
        self.pending_settle = Some(PendingSettle {
            due: now + self.settle_delay,
            token: CancellationToken::new(),
        });
        info!(
            sections = self.registry.len(),
            reference_line = self.reference_line,
            "Section tracking started"
        );
    }

    /// Stop processing events. Idempotent; the host calls this before
    /// tearing down the content the registry refers to.
    pub fn suspend(&mut self) {
        if self.phase == Phase::Suspended {
            debug!("suspend ignored; tracker already suspended");
            return;
        }
        if let Some(pending) = self.pending_settle.take() {
            pending.token.cancel();
        }
        self.registry = SectionRegistry::default();
        self.sinks.clear();
        self.phase = Phase::Suspended;
        info!("Section tracking suspended");
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Latest published snapshot, for the first paint before any push.
    pub fn state(&self) -> &ProgressState {
        &self.snapshot
    }

    /// Token guarding the deferred initial recomputation, if one is still
    /// pending. A host scheduler holding a clone can drop the queued pulse
    /// once teardown cancels it.
    pub fn settle_token(&self) -> Option<CancellationToken> {
        self.pending_settle.as_ref().map(|p| p.token.clone())
    }

    /// Replace the section set. The progress map is re-keyed to exactly the
    /// new ids in the same tick, so removed sections never linger in
    /// published snapshots.
    pub fn replace_sections(&mut self, registry: SectionRegistry) {
        info!(sections = registry.len(), "Section registry replaced");
        self.registry = registry;
        if self.phase == Phase::Tracking {
            self.recompute();
        }
    }

    pub fn subscribe(&mut self, sink: StateSink) -> SubscriptionId {
        let id = SubscriptionId(self.next_sink_id);
        self.next_sink_id += 1;
        self.sinks.push((id, sink));
        id
    }

    /// Idempotent; unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.sinks.retain(|(sink_id, _)| *sink_id != id);
    }

    /// Install `next` as the current snapshot and notify sinks, skipping
    /// the downstream work entirely when nothing changed.
    pub(super) fn publish(&mut self, next: ProgressState) -> bool {
        if next == self.snapshot {
            return false;
        }
        self.snapshot = next;
        let snapshot = self.snapshot.clone();
        for (_, sink) in &mut self.sinks {
            sink(&snapshot);
        }
        true
    }
}
