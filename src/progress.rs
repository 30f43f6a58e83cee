//! Completion math for a single section.
//!
//! The strategy is a direct classification against the reference line: a
//! section is done once its bottom edge has scrolled past the line, untouched
//! while its heading marker is still below it, and partially read in between.
//! The reached decision uses the heading marker (`reference_top`) while the
//! percentage uses the full bounding box; both are part of the contract and
//! pinned by tests.

use crate::registry::SectionExtent;

/// Fully-read percentage.
pub const COMPLETE: f64 = 100.0;

/// Outcome of classifying one section against the reference line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionProgress {
    /// Read progress in [0, 100].
    pub percent: f64,
    /// Whether the heading marker has crossed the reference line.
    pub reached: bool,
}

/// Classify a section extent against the reference line.
///
/// Each section is computed independently of its neighbors; no section steals
/// progress from another. Zero-height extents never divide.
pub fn completion(extent: &SectionExtent, reference_line: f64) -> SectionProgress {
    if extent.bottom < reference_line {
        return SectionProgress {
            percent: COMPLETE,
            reached: true,
        };
    }

    if extent.reference_top <= reference_line {
        let height = extent.height();
        if height <= f64::EPSILON {
            // Collapsed section: all-or-nothing based on its top edge.
            let percent = if extent.top <= reference_line {
                COMPLETE
            } else {
                0.0
            };
            return SectionProgress {
                percent,
                reached: true,
            };
        }
        let raw = (reference_line - extent.top) / height * COMPLETE;
        let percent = if raw.is_finite() {
            raw.clamp(0.0, COMPLETE)
        } else {
            0.0
        };
        return SectionProgress {
            percent,
            reached: true,
        };
    }

    SectionProgress {
        percent: 0.0,
        reached: false,
    }
}
