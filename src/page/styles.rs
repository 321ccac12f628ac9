//! Style plumbing on a page: thin wrappers over the interned style set.

use crate::error::Result;
use crate::style::Style;

use super::Page;

impl Page {
    /// Intern a style into this page's set, returning its id.
    pub fn style_upsert(&mut self, style: Style) -> Result<u16> {
        self.regions().styles.upsert(style)
    }

    /// Add a reference to an already-interned style.
    pub fn style_use(&mut self, id: u16) {
        if id != 0 {
            self.regions().styles.use_id(id);
        }
    }

    /// Drop a reference to a style.
    pub fn style_release(&mut self, id: u16) {
        self.regions().styles.release(id);
    }

    /// The style for an id. Id 0 is the default style.
    pub fn style_lookup(&self, id: u16) -> Style {
        if id == 0 {
            return Style::default();
        }
        self.style_records()[id as usize]
    }

    /// Number of live interned styles.
    pub fn style_count(&self) -> usize {
        self.style_header().len as usize
    }

    /// Interning capacity (excluding the reserved default slot).
    pub fn style_capacity(&self) -> usize {
        self.capacity().styles as usize - 1
    }
}
