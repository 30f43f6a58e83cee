use std::time::Instant;

/// Events delivered by the host.
///
/// The tracker is single threaded and event driven: every variant runs to
/// completion synchronously inside `update`, so correctness is a matter of
/// event ordering, not locking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerEvent {
    /// The scroll position changed. `position` is the absolute document
    /// offset of the viewport top.
    Scrolled { position: f64 },
    /// The viewport was resized. A new sticky-header height may be supplied
    /// alongside; geometry is re-read either way.
    Resized { reference_line: Option<f64> },
    /// Host clock pulse, used to fire the deferred initial recomputation
    /// once its deadline has passed.
    Tick(Instant),
}
