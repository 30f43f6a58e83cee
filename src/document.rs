//! Simulated document for the demo driver.
//!
//! A layout file describes a long-form document as an ordered list of
//! sections in document coordinates. [`SimulatedViewport`] stands in for a
//! real rendering surface: it holds the live scroll position and answers
//! extent queries the way a browser measurement would, relative to the
//! viewport top.

use crate::registry::{ExtentResolver, SectionDescriptor, SectionExtent, SectionRegistry};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tracing::info;

/// One section in document coordinates.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionGeometry {
    pub id: String,
    pub title: String,
    pub top: f64,
    pub height: f64,
    /// Distance from the section top to its heading marker; accounts for
    /// leading whitespace before the heading.
    #[serde(default)]
    pub heading_offset: f64,
}

/// Document description loaded from a TOML layout file.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentLayout {
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    pub sections: Vec<SectionGeometry>,
}

fn default_viewport_height() -> f64 {
    720.0
}

impl DocumentLayout {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout at {}", path.display()))?;
        let layout: DocumentLayout = toml::from_str(&data)
            .with_context(|| format!("Invalid layout TOML at {}", path.display()))?;
        layout.validate()?;
        info!(
            path = %path.display(),
            sections = layout.sections.len(),
            height = layout.document_height(),
            "Loaded document layout"
        );
        Ok(layout)
    }

    /// Reject geometry the tracker is not specified for: unordered or
    /// overlapping sections, negative sizes, markers outside their section.
    pub fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            bail!("layout contains no sections");
        }
        let mut previous_bottom = f64::NEG_INFINITY;
        for section in &self.sections {
            if section.id.trim().is_empty() {
                bail!("section with empty id");
            }
            if !section.top.is_finite() || section.top < 0.0 {
                bail!("section '{}' has an invalid top", section.id);
            }
            if !section.height.is_finite() || section.height < 0.0 {
                bail!("section '{}' has a negative height", section.id);
            }
            if section.heading_offset < 0.0 || section.heading_offset > section.height {
                bail!("section '{}' places its heading outside itself", section.id);
            }
            if section.top < previous_bottom {
                bail!("section '{}' overlaps the one before it", section.id);
            }
            previous_bottom = section.top + section.height;
        }
        Ok(())
    }

    pub fn registry(&self) -> SectionRegistry {
        SectionRegistry::new(
            self.sections
                .iter()
                .map(|s| SectionDescriptor::new(s.id.clone(), s.title.clone()))
                .collect(),
        )
    }

    pub fn document_height(&self) -> f64 {
        self.sections
            .last()
            .map(|s| s.top + s.height)
            .unwrap_or(0.0)
    }
}

/// Headless stand-in for a scrollable rendering surface.
///
/// Clones share the scroll position, so the driver keeps one handle for
/// moving the viewport while the tracker owns another as its resolver.
#[derive(Clone)]
pub struct SimulatedViewport {
    inner: Rc<ViewportInner>,
}

struct ViewportInner {
    layout: DocumentLayout,
    scroll: Cell<f64>,
}

impl SimulatedViewport {
    pub fn new(layout: DocumentLayout) -> Self {
        Self {
            inner: Rc::new(ViewportInner {
                layout,
                scroll: Cell::new(0.0),
            }),
        }
    }

    pub fn set_scroll(&self, y: f64) {
        let clamped = if y.is_finite() {
            y.clamp(0.0, self.max_scroll())
        } else {
            0.0
        };
        self.inner.scroll.set(clamped);
    }

    pub fn scroll(&self) -> f64 {
        self.inner.scroll.get()
    }

    /// Largest reachable scroll offset, matching how a browser refuses to
    /// scroll past `document height - viewport height`.
    pub fn max_scroll(&self) -> f64 {
        (self.inner.layout.document_height() - self.inner.layout.viewport_height).max(0.0)
    }
}

impl ExtentResolver for SimulatedViewport {
    fn resolve(&self, id: &str) -> Option<SectionExtent> {
        let scroll = self.inner.scroll.get();
        let geometry = self.inner.layout.sections.iter().find(|s| s.id == id)?;
        Some(SectionExtent {
            top: geometry.top - scroll,
            bottom: geometry.top + geometry.height - scroll,
            reference_top: geometry.top + geometry.heading_offset - scroll,
        })
    }
}
