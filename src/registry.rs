//! Section descriptors and the geometry seam.
//!
//! The tracker never touches a rendering surface directly. The host hands it
//! an ordered list of section descriptors plus an [`ExtentResolver`] that can
//! turn a section id into live on-screen geometry. Extents are resolved fresh
//! on every tick because layout can shift under the reader (images loading,
//! dynamic content), so nothing here caches geometry.

use tracing::warn;

/// One named content block, identified by a stable id. Order is implicit in
/// the registry's sequence; the tracker passes `title` through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDescriptor {
    pub id: String,
    pub title: String,
}

impl SectionDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Current on-screen extent of a section, relative to the viewport top and in
/// the same coordinate space as the reference line.
///
/// `reference_top` is the position of the section's heading marker. It can
/// differ from `top` when a section has leading whitespace before its
/// heading; the reached decision uses the marker while the percentage uses
/// the full box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionExtent {
    pub top: f64,
    pub bottom: f64,
    pub reference_top: f64,
}

impl SectionExtent {
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Host-supplied capability for turning a section id into live geometry.
///
/// `None` means the backing content cannot be located right now (removed
/// from the surface, mistyped id, or torn down mid-navigation). Callers must
/// treat that as a skip, never as a failure of the whole tick.
pub trait ExtentResolver {
    fn resolve(&self, id: &str) -> Option<SectionExtent>;
}

/// Ordered collection of section descriptors.
///
/// A registry is built once for a given document and replaced wholesale when
/// the section set changes; it is never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    sections: Vec<SectionDescriptor>,
}

impl SectionRegistry {
    /// Build a registry, keeping the first occurrence of any duplicated id.
    pub fn new(sections: Vec<SectionDescriptor>) -> Self {
        let mut deduped: Vec<SectionDescriptor> = Vec::with_capacity(sections.len());
        for section in sections {
            if deduped.iter().any(|s| s.id == section.id) {
                warn!(id = %section.id, "Duplicate section id dropped from registry");
                continue;
            }
            deduped.push(section);
        }
        Self { sections: deduped }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionDescriptor> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s.id == id)
    }
}
