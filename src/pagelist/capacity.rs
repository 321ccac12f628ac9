//! Page capacity adjustment and compaction.
//!
//! When a page's style set or grapheme arena fills up, the list rebuilds
//! that page in a larger buffer and swaps it into the same node, so pins
//! referencing the page stay valid untouched.

use tracing::debug;

use crate::error::{Error, Result};
use crate::page::Capacity;

use super::{PageId, PageList};

/// New capacity targets for [`PageList::adjust_capacity`]. `None` keeps
/// the current value; values never shrink below the current capacity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjustCapacity {
    pub styles: Option<u16>,
    pub grapheme_bytes: Option<u32>,
}

impl PageList {
    /// Rebuild a page with more style slots or grapheme bytes.
    ///
    /// The page's content, size, and node id are preserved; only the
    /// capacity (and therefore the backing buffer) changes.
    pub fn adjust_capacity(&mut self, id: PageId, adjust: AdjustCapacity) -> Result<()> {
        let old = self.page(id).capacity();
        let new_cap = Capacity {
            cols: old.cols,
            rows: old.rows,
            styles: adjust.styles.map_or(old.styles, |s| s.max(old.styles)),
            grapheme_bytes: adjust
                .grapheme_bytes
                .map_or(old.grapheme_bytes, |g| g.max(old.grapheme_bytes)),
        };
        debug!(page = id.0, ?old, ?new_cap, "adjusting page capacity");
        self.rebuild_page(id, new_cap)
    }

    /// Rebuild a page at its current capacity, dropping style-table and
    /// grapheme-arena fragmentation accumulated by heavy churn.
    pub fn compact(&mut self, id: PageId) -> Result<()> {
        let cap = self.page(id).capacity();
        self.rebuild_page(id, cap)
    }

    /// Copy one row between two pages of this list, growing the
    /// destination page's style/grapheme capacity once if the copy runs
    /// out of room.
    pub(crate) fn clone_row_between(
        &mut self,
        dst_id: PageId,
        dst_y: u16,
        src_id: PageId,
        src_y: u16,
    ) -> Result<()> {
        match self.try_clone_row(dst_id, dst_y, src_id, src_y) {
            Err(Error::OutOfMemory) => {
                let cap = self.page(dst_id).capacity();
                self.adjust_capacity(
                    dst_id,
                    AdjustCapacity {
                        styles: Some(cap.styles * 2),
                        grapheme_bytes: Some(cap.grapheme_bytes * 2),
                    },
                )?;
                self.try_clone_row(dst_id, dst_y, src_id, src_y)
            }
            result => result,
        }
    }

    fn try_clone_row(
        &mut self,
        dst_id: PageId,
        dst_y: u16,
        src_id: PageId,
        src_y: u16,
    ) -> Result<()> {
        let (dst, src) = self.two_pages_mut(dst_id, src_id);
        dst.clone_row_from(src, dst_y, src_y)
    }

    /// Replace a page's buffer with a fresh one at `new_cap`, copying all
    /// rows. On failure the original page is left untouched.
    fn rebuild_page(&mut self, id: PageId, new_cap: Capacity) -> Result<()> {
        let size = self.page(id).size();
        debug_assert!(new_cap.rows >= size.rows && new_cap.cols >= size.cols);

        let mut new_page = self.create_page(new_cap);
        new_page.set_cols(size.cols);
        new_page.set_rows(size.rows);

        if let Err(err) = new_page.clone_from(self.page(id), 0, size.rows) {
            self.destroy_page(new_page);
            return Err(err);
        }

        let old = self.nodes[id.0 as usize]
            .page
            .replace(new_page)
            .expect("live page id");
        self.destroy_page(old);
        Ok(())
    }
}
