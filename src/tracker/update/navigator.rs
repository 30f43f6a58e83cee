use super::Effect;
use super::super::state::SectionTracker;
use thiserror::Error;
use tracing::{info, warn};

/// Failure modes of programmatic navigation. Navigation never panics and
/// never disturbs published state on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigateError {
    #[error("section not found: {0}")]
    SectionNotFound(String),
}

impl SectionTracker {
    /// Jump to a section: compute the scroll target that puts its top edge
    /// on the reference line and ask the host to smooth-scroll there.
    ///
    /// An optimistic snapshot with the target marked active is published
    /// immediately so dependent UI reflects the reader's intent before the
    /// animation lands. The guess is strictly a latency hedge: the next
    /// measured tick, fed by the scroll events the animation produces,
    /// always wins.
    pub fn scroll_to_section(&mut self, id: &str) -> Result<Effect, NavigateError> {
        if !self.registry.contains(id) {
            warn!(id, "Navigation requested for unknown section");
            return Err(NavigateError::SectionNotFound(id.to_string()));
        }
        let Some(extent) = self.resolver.resolve(id) else {
            warn!(id, "Navigation target has no resolvable geometry");
            return Err(NavigateError::SectionNotFound(id.to_string()));
        };

        let raw = self.scroll_position + extent.top - self.reference_line;
        let target = if raw.is_finite() { raw.max(0.0) } else { 0.0 };

        let mut next = self.snapshot.clone();
        next.active_id = Some(id.to_string());
        self.publish(next);

        info!(id, target, "Jumping to section");
        Ok(Effect::ScrollTo { position: target })
    }
}

#[cfg(test)]
mod tests {
    use super::super::Effect;
    use super::super::observer::tests::{build_test_tracker, scroll_to};
    use super::NavigateError;

    #[test]
    fn jump_publishes_optimistic_active_before_any_scroll_lands() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 0.0);

        let effect = tracker.scroll_to_section("b").expect("known section");
        assert_eq!(
            effect,
            Effect::ScrollTo {
                position: 500.0 - 80.0
            }
        );
        assert_eq!(tracker.state().active_id.as_deref(), Some("b"));
    }

    #[test]
    fn settled_scroll_confirms_the_optimistic_guess() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 0.0);

        let Effect::ScrollTo { position } = tracker.scroll_to_section("b").expect("known section");
        scroll_to(&mut tracker, &surface, position);

        // The reference line now sits exactly on b's marker.
        let state = tracker.state();
        assert_eq!(state.active_id.as_deref(), Some("b"));
        assert_eq!(state.progress_by_id.get("a").copied(), Some(100.0));
        assert_eq!(state.progress_by_id.get("b").copied(), Some(0.0));
    }

    #[test]
    fn measured_tick_wins_over_the_optimistic_guess_on_overshoot() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 0.0);

        tracker.scroll_to_section("b").expect("known section");
        assert_eq!(tracker.state().active_id.as_deref(), Some("b"));

        // The animation overshoots past c's marker before settling.
        scroll_to(&mut tracker, &surface, 1500.0);
        assert_eq!(tracker.state().active_id.as_deref(), Some("c"));
    }

    #[test]
    fn unknown_id_is_a_typed_error_and_leaves_state_untouched() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 300.0);
        let before = tracker.state().clone();

        let err = tracker.scroll_to_section("z").unwrap_err();
        assert_eq!(err, NavigateError::SectionNotFound("z".to_string()));
        assert_eq!(*tracker.state(), before);
    }

    #[test]
    fn unresolvable_target_is_reported_not_thrown() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 0.0);
        let before = tracker.state().clone();

        surface.remove("c");
        let err = tracker.scroll_to_section("c").unwrap_err();
        assert!(matches!(err, NavigateError::SectionNotFound(_)));
        assert_eq!(*tracker.state(), before);
    }

    #[test]
    fn navigation_after_suspend_reports_not_found() {
        let (mut tracker, _, _) = build_test_tracker();
        tracker.suspend();
        assert!(tracker.scroll_to_section("a").is_err());
    }

    #[test]
    fn jump_target_never_goes_above_the_document_start() {
        let (mut tracker, surface, _) = build_test_tracker();
        scroll_to(&mut tracker, &surface, 10.0);

        // a's top minus the reference line would land at a negative offset.
        let Effect::ScrollTo { position } = tracker.scroll_to_section("a").expect("known section");
        assert_eq!(position, 0.0);
    }
}
