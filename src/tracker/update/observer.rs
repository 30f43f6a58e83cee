use super::super::state::{ProgressState, SectionTracker};
use crate::progress::completion;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

impl SectionTracker {
    pub(super) fn handle_scrolled(&mut self, position: f64) {
        self.scroll_position = if position.is_finite() {
            position.max(0.0)
        } else {
            0.0
        };
        self.recompute();
    }

    pub(super) fn handle_resized(&mut self, reference_line: Option<f64>) {
        if let Some(line) = reference_line {
            if line.is_finite() && line >= 0.0 {
                self.reference_line = line;
            } else {
                warn!(line, "Ignoring invalid reference line from resize");
            }
        }
        self.recompute();
    }

    pub(super) fn handle_tick(&mut self, now: Instant) {
        let Some(pending) = &self.pending_settle else {
            return;
        };
        if pending.token.is_cancelled() {
            self.pending_settle = None;
            return;
        }
        if now < pending.due {
            return;
        }
        self.pending_settle = None;
        debug!("Running deferred settle recomputation");
        self.recompute();
    }

    /// One tick: re-read every section's extent, classify it, pick the
    /// active section, and publish the snapshot if it changed.
    ///
    /// A section whose geometry cannot be resolved keeps its previous
    /// percentage (0 when it has never been seen) and is skipped for the
    /// active decision; one bad section never aborts the rest of the tick.
    pub(in crate::tracker) fn recompute(&mut self) -> bool {
        let mut progress_by_id = HashMap::with_capacity(self.registry.len());
        let mut active_id = None;

        for section in self.registry.iter() {
            let Some(extent) = self.resolver.resolve(&section.id) else {
                let previous = self
                    .snapshot
                    .progress_by_id
                    .get(&section.id)
                    .copied()
                    .unwrap_or(0.0);
                debug!(id = %section.id, "Section geometry unavailable; keeping previous progress");
                progress_by_id.insert(section.id.clone(), previous);
                continue;
            };

            let outcome = completion(&extent, self.reference_line);
            if outcome.reached {
                active_id = Some(section.id.clone());
            }
            progress_by_id.insert(section.id.clone(), outcome.percent);
        }

        self.publish(ProgressState {
            progress_by_id,
            active_id,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::config::TrackerConfig;
    use crate::registry::{ExtentResolver, SectionDescriptor, SectionExtent, SectionRegistry};
    use crate::tracker::{Phase, SectionTracker, TrackerEvent};
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    /// Synthetic rendering surface: sections in document coordinates plus a
    /// movable scroll position, with on-demand resolution failures.
    #[derive(Clone)]
    pub(crate) struct FakeSurface {
        inner: Rc<RefCell<Surface>>,
    }

    struct Surface {
        scroll: f64,
        sections: Vec<(String, f64, f64, f64)>,
        missing: HashSet<String>,
    }

    impl FakeSurface {
        pub(crate) fn new(sections: &[(&str, f64, f64)]) -> Self {
            let sections = sections
                .iter()
                .map(|(id, top, height)| (id.to_string(), *top, *height, 0.0))
                .collect();
            Self {
                inner: Rc::new(RefCell::new(Surface {
                    scroll: 0.0,
                    sections,
                    missing: HashSet::new(),
                })),
            }
        }

        pub(crate) fn set_scroll(&self, y: f64) {
            self.inner.borrow_mut().scroll = y;
        }

        pub(crate) fn set_heading_offset(&self, id: &str, offset: f64) {
            let mut surface = self.inner.borrow_mut();
            if let Some(entry) = surface.sections.iter_mut().find(|(sid, ..)| sid == id) {
                entry.3 = offset;
            }
        }

        pub(crate) fn remove(&self, id: &str) {
            self.inner.borrow_mut().missing.insert(id.to_string());
        }
    }

    impl ExtentResolver for FakeSurface {
        fn resolve(&self, id: &str) -> Option<SectionExtent> {
            let surface = self.inner.borrow();
            if surface.missing.contains(id) {
                return None;
            }
            let (_, top, height, heading_offset) =
                surface.sections.iter().find(|(sid, ..)| sid == id)?;
            Some(SectionExtent {
                top: top - surface.scroll,
                bottom: top + height - surface.scroll,
                reference_top: top + heading_offset - surface.scroll,
            })
        }
    }

    pub(crate) const SETTLE_MS: u64 = 200;

    /// Registry from the canonical scenario: A 0..500, B 500..1200,
    /// C 1200..1600, reference line at 80.
    pub(crate) fn build_test_tracker() -> (SectionTracker, FakeSurface, Instant) {
        let surface = FakeSurface::new(&[
            ("a", 0.0, 500.0),
            ("b", 500.0, 700.0),
            ("c", 1200.0, 400.0),
        ]);
        let registry = SectionRegistry::new(vec![
            SectionDescriptor::new("a", "Alpha"),
            SectionDescriptor::new("b", "Bravo"),
            SectionDescriptor::new("c", "Charlie"),
        ]);
        let config = TrackerConfig {
            reference_line: 80.0,
            settle_delay_ms: SETTLE_MS,
            ..TrackerConfig::default()
        };
        let mut tracker = SectionTracker::new(&config, registry, Box::new(surface.clone()));
        let now = Instant::now();
        tracker.start(now);
        (tracker, surface, now)
    }

    pub(crate) fn scroll_to(tracker: &mut SectionTracker, surface: &FakeSurface, y: f64) {
        surface.set_scroll(y);
        tracker.update(TrackerEvent::Scrolled { position: y });
    }

    fn percent(tracker: &SectionTracker, id: &str) -> f64 {
        tracker
            .state()
            .progress_by_id
            .get(id)
            .copied()
            .unwrap_or(f64::NAN)
    }

    #[test]
    fn top_of_document_has_no_active_section() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 0.0);

        let state = tracker.state();
        assert_eq!(state.active_id, None);
        for id in ["a", "b", "c"] {
            assert_eq!(percent(&tracker, id), 0.0);
        }
    }

    #[test]
    fn straddling_section_reports_fractional_progress() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 300.0);

        // Reference line sits at document y 380, inside section a.
        assert_eq!(tracker.state().active_id.as_deref(), Some("a"));
        assert!((percent(&tracker, "a") - 76.0).abs() < 1e-9);
        assert_eq!(percent(&tracker, "b"), 0.0);
        assert_eq!(percent(&tracker, "c"), 0.0);
    }

    #[test]
    fn scrolling_past_everything_completes_all_sections() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 1700.0);

        assert_eq!(tracker.state().active_id.as_deref(), Some("c"));
        for id in ["a", "b", "c"] {
            assert_eq!(percent(&tracker, id), 100.0);
        }
    }

    #[test]
    fn progress_is_monotonic_and_bounded_under_forward_scroll() {
        let (mut tracker, surface, _) = build_test_tracker();
        let mut previous = [0.0f64; 3];

        let mut y = 0.0;
        while y <= 1800.0 {
            scroll_to(&mut tracker, &surface, y);
            for (slot, id) in previous.iter_mut().zip(["a", "b", "c"]) {
                let value = percent(&tracker, id);
                assert!((0.0..=100.0).contains(&value), "{id} out of bounds: {value}");
                assert!(
                    value + 1e-9 >= *slot,
                    "{id} regressed from {} to {value} at scroll {y}",
                    *slot
                );
                *slot = value;
            }
            y += 40.0;
        }
        assert_eq!(previous, [100.0, 100.0, 100.0]);
    }

    #[test]
    fn active_section_is_last_reached_in_registry_order() {
        let (mut tracker, surface, _) = build_test_tracker();

        scroll_to(&mut tracker, &surface, 600.0);
        // Line at 680: both a and b reached, b wins by order.
        assert_eq!(tracker.state().active_id.as_deref(), Some("b"));

        scroll_to(&mut tracker, &surface, 1300.0);
        assert_eq!(tracker.state().active_id.as_deref(), Some("c"));
    }

    #[test]
    fn heading_offset_delays_activation_without_touching_percent() {
        let (mut tracker, surface, _) = build_test_tracker();
        surface.set_heading_offset("b", 150.0);

        // Line at document y 600: inside b's box but above its heading.
        scroll_to(&mut tracker, &surface, 520.0);
        assert_eq!(tracker.state().active_id.as_deref(), Some("a"));
        assert_eq!(percent(&tracker, "b"), 0.0);

        // Line at 680 passes the heading at 650; percent uses the full box.
        scroll_to(&mut tracker, &surface, 600.0);
        assert_eq!(tracker.state().active_id.as_deref(), Some("b"));
        assert!((percent(&tracker, "b") - (180.0 / 700.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn snapshots_are_published_only_on_change() {
        let (mut tracker, surface, _) = build_test_tracker();
        let published = Rc::new(Cell::new(0usize));
        let counter = published.clone();
        tracker.subscribe(Box::new(move |_| counter.set(counter.get() + 1)));

        scroll_to(&mut tracker, &surface, 300.0);
        assert_eq!(published.get(), 1);

        // Same position again: identical snapshot, no downstream work.
        tracker.update(TrackerEvent::Scrolled { position: 300.0 });
        assert_eq!(published.get(), 1);

        scroll_to(&mut tracker, &surface, 301.0);
        assert_eq!(published.get(), 2);
    }

    #[test]
    fn unresolved_section_keeps_previous_value_and_tick_completes() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 300.0);
        let before = percent(&tracker, "a");
        assert!(before > 0.0);

        surface.remove("a");
        scroll_to(&mut tracker, &surface, 600.0);

        let state = tracker.state();
        assert_eq!(percent(&tracker, "a"), before);
        assert_eq!(state.active_id.as_deref(), Some("b"));
        assert!((percent(&tracker, "b") - (180.0 / 700.0) * 100.0).abs() < 1e-9);
        assert_eq!(state.progress_by_id.len(), 3);
    }

    #[test]
    fn replaced_registry_drops_stale_ids_in_the_same_tick() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 600.0);
        assert_eq!(tracker.state().progress_by_id.len(), 3);

        tracker.replace_sections(SectionRegistry::new(vec![
            SectionDescriptor::new("a", "Alpha"),
            SectionDescriptor::new("c", "Charlie"),
        ]));

        let state = tracker.state();
        assert_eq!(state.progress_by_id.len(), 2);
        assert!(!state.progress_by_id.contains_key("b"));
        assert_eq!(state.active_id.as_deref(), Some("a"));
    }

    #[test]
    fn settle_tick_fires_once_after_the_delay() {
        let (mut tracker, surface, started) = build_test_tracker();
        surface.set_scroll(0.0);
        let published = Rc::new(Cell::new(0usize));
        let counter = published.clone();
        tracker.subscribe(Box::new(move |_| counter.set(counter.get() + 1)));

        // Too early: deadline not reached, nothing happens.
        tracker.update(TrackerEvent::Tick(started + Duration::from_millis(50)));
        assert_eq!(published.get(), 0);

        // Past the deadline: the initial snapshot appears without any
        // scroll event having been delivered.
        tracker.update(TrackerEvent::Tick(started + Duration::from_millis(SETTLE_MS)));
        assert_eq!(published.get(), 1);
        assert_eq!(tracker.state().progress_by_id.len(), 3);

        // The deferred recomputation is one-shot.
        tracker.update(TrackerEvent::Tick(started + Duration::from_secs(5)));
        assert_eq!(published.get(), 1);
    }

    #[test]
    fn suspend_cancels_the_pending_settle_tick() {
        let (mut tracker, _, started) = build_test_tracker();
        let token = tracker.settle_token().expect("settle tick armed by start");

        tracker.suspend();
        assert!(token.is_cancelled());
        assert_eq!(tracker.phase(), Phase::Suspended);

        // A pulse the host had already queued is now inert.
        tracker.update(TrackerEvent::Tick(started + Duration::from_secs(1)));
        assert_eq!(tracker.state().progress_by_id.len(), 0);
    }

    #[test]
    fn events_after_teardown_are_discarded() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 300.0);
        let before = tracker.state().clone();

        tracker.suspend();
        tracker.suspend();
        tracker.update(TrackerEvent::Scrolled { position: 900.0 });
        tracker.update(TrackerEvent::Resized {
            reference_line: Some(10.0),
        });

        assert_eq!(*tracker.state(), before);
    }

    #[test]
    fn events_before_start_are_discarded() {
        let surface = FakeSurface::new(&[("a", 0.0, 500.0)]);
        let registry = SectionRegistry::new(vec![SectionDescriptor::new("a", "Alpha")]);
        let config = TrackerConfig::default();
        let mut tracker = SectionTracker::new(&config, registry, Box::new(surface));

        tracker.update(TrackerEvent::Scrolled { position: 300.0 });
        assert_eq!(tracker.phase(), Phase::Idle);
        assert!(tracker.state().progress_by_id.is_empty());
    }

    #[test]
    fn resize_can_resupply_the_reference_line() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 400.0);
        // Line at 480: still inside a.
        assert_eq!(tracker.state().active_id.as_deref(), Some("a"));

        // A taller sticky header pushes the line to document y 500, onto b.
        tracker.update(TrackerEvent::Resized {
            reference_line: Some(100.0),
        });
        assert_eq!(tracker.state().active_id.as_deref(), Some("b"));

        // Garbage values are ignored but the tick still runs.
        tracker.update(TrackerEvent::Resized {
            reference_line: Some(f64::NAN),
        });
        assert_eq!(tracker.state().active_id.as_deref(), Some("b"));
    }

    #[test]
    fn non_finite_scroll_positions_are_sanitized() {
        let (mut tracker, surface, _) = build_test_tracker();
        surface.set_scroll(0.0);
        tracker.update(TrackerEvent::Scrolled {
            position: f64::INFINITY,
        });
        assert_eq!(tracker.state().active_id, None);
    }
}
