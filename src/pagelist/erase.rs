//! Erase operations: row ranges and single-row cascades.

use smallvec::SmallVec;
use tracing::debug;

use crate::error::Result;
use crate::point::Point;

use super::{PageId, PageList, Pin};

impl PageList {
    /// Erase all rows from `tl` through `bl` (inclusive; defaults to the
    /// bottom-right of `tl`'s frame).
    ///
    /// Full pages are detached and destroyed; a partial page slides its
    /// surviving rows up and clears the leftovers so future growth reuses
    /// zeroed memory. If the erasure cut into the active area, the list
    /// regrows so the active area keeps its row count. Pins in erased
    /// rows move to the origin of the nearest surviving page.
    pub fn erase_rows(&mut self, tl: Point, bl: Option<Point>) -> Result<()> {
        let Some(top) = self.pin(tl) else { return Ok(()) };
        let bottom = bl
            .and_then(|p| self.pin(p))
            .or_else(|| self.get_bottom_right(tl.tag))
            .unwrap_or(top);

        // Collect chunks first: erasing restructures the list.
        let mut chunks: SmallVec<[(PageId, u16, u16); 4]> = SmallVec::new();
        let mut id = top.page;
        loop {
            let rows = self.page(id).size().rows;
            let start = if id == top.page { top.y } else { 0 };
            let end = if id == bottom.page { bottom.y + 1 } else { rows };
            chunks.push((id, start, end));
            if id == bottom.page {
                break;
            }
            match self.next(id) {
                Some(next) => id = next,
                None => break,
            }
        }

        for (id, start, end) in chunks {
            let rows = self.page(id).size().rows;
            if start == 0 && end == rows {
                self.erase_page(id);
            } else {
                self.erase_partial_chunk(id, start, end);
            }
        }

        // Restore the active area's row count if the erase cut into it.
        while self.total_rows() < self.rows as usize {
            self.grow()?;
        }
        self.collapse_viewport();
        Ok(())
    }

    /// Remove a whole page from the list.
    ///
    /// The last remaining page is reinitialized in place (the list is
    /// never empty) instead of being destroyed.
    pub(crate) fn erase_page(&mut self, id: PageId) {
        let only_page = self.prev(id).is_none() && self.next(id).is_none();
        if only_page {
            let cols = self.cols;
            let cap = self.page(id).capacity();
            let page = self.page_mut(id);
            page.reinit(cap);
            page.set_cols(cols);
            self.remap_pins_in(id, |pin| {
                pin.x = 0;
                pin.y = 0;
            });
            debug!(page = id.0, "erase: reinitialized only page");
            return;
        }

        // Pins move to the origin of the next surviving page (or the new
        // tail when the erased page was last).
        let survivor = self.next(id).or_else(|| self.prev(id)).expect("not the only page");
        self.remap_pins_in(id, |pin| {
            *pin = Pin { page: survivor, x: 0, y: 0 };
        });
        let page = self.free_node(id);
        self.destroy_page(page);
        debug!(page = id.0, "erase: destroyed full page");
    }

    /// Erase rows `[start, end)` of one page, sliding the surviving tail
    /// up and clearing the slots left behind.
    fn erase_partial_chunk(&mut self, id: PageId, start: u16, end: u16) {
        let erased = end - start;
        let cols = self.page(id).size().cols;
        let rows = self.page(id).size().rows;

        // Release the erased rows' styles and grapheme slices up front;
        // their records rotate to the tail as blank spare rows.
        for y in start..end {
            let page = self.page_mut(id);
            page.clear_cells(y, 0, cols);
            page.row_mut(y).clear_flags();
        }

        let page = self.page_mut(id);
        page.rows_slice_mut()[start as usize..rows as usize].rotate_left(erased as usize);
        page.set_rows(rows - erased);

        for pin in self.pins.iter_mut().flatten() {
            if pin.page != id {
                continue;
            }
            if pin.y >= start && pin.y < end {
                pin.x = 0;
                pin.y = 0;
            } else if pin.y >= end {
                pin.y -= erased;
            }
        }
    }

    /// Remove a single row, pulling every row below it up one slot —
    /// across page boundaries to the end of the list.
    pub fn erase_row(&mut self, pt: Point) -> Result<()> {
        let Some(pin) = self.pin(pt) else { return Ok(()) };
        self.erase_row_inner(pin, usize::MAX)
    }

    /// Like [`PageList::erase_row`], but pulls at most `limit` rows up,
    /// clearing the final exposed row in place.
    pub fn erase_row_bounded(&mut self, pt: Point, limit: usize) -> Result<()> {
        let Some(pin) = self.pin(pt) else { return Ok(()) };
        self.erase_row_inner(pin, limit)
    }

    fn erase_row_inner(&mut self, start: Pin, mut budget: usize) -> Result<()> {
        let mut cur = start.page;
        let mut cur_y = start.y;
        let cols = self.cols;

        // Pins on the erased row follow its record through the rotation
        // to the final (cleared) slot of the cascade.
        let follow: SmallVec<[usize; 2]> = self
            .pins
            .iter()
            .enumerate()
            .filter_map(|(slot, pin)| {
                pin.filter(|p| p.page == cur && p.y == cur_y).map(|_| slot)
            })
            .collect();

        loop {
            let rows = self.page(cur).size().rows;
            let span_end =
                ((cur_y as usize).saturating_add(budget).saturating_add(1)).min(rows as usize) as u16;

            self.page_mut(cur).rows_slice_mut()[cur_y as usize..span_end as usize].rotate_left(1);
            for (slot, pin) in self.pins.iter_mut().enumerate() {
                let Some(pin) = pin else { continue };
                if pin.page == cur
                    && pin.y > cur_y
                    && pin.y < span_end
                    && !follow.contains(&slot)
                {
                    pin.y -= 1;
                }
            }
            budget = budget.saturating_sub((span_end - cur_y) as usize - 1);

            let next = self.next(cur);
            let (stop, last_y) = match next {
                Some(_) if span_end == rows && budget > 0 => (false, rows - 1),
                _ => (true, span_end - 1),
            };

            if stop {
                let page = self.page_mut(cur);
                page.clear_cells(last_y, 0, cols);
                page.row_mut(last_y).clear_flags();
                for slot in follow {
                    if let Some(pin) = &mut self.pins[slot] {
                        pin.page = cur;
                        pin.y = last_y;
                    }
                }
                return Ok(());
            }

            // Pull the next page's first row into the freed bottom slot.
            let next = next.expect("checked above");
            self.clone_row_between(cur, last_y, next, 0)?;
            for (slot, pin) in self.pins.iter_mut().enumerate() {
                let Some(pin) = pin else { continue };
                if pin.page == next && pin.y == 0 && !follow.contains(&slot) {
                    *pin = Pin { page: cur, x: pin.x, y: last_y };
                }
            }
            budget = budget.saturating_sub(1);
            cur = next;
            cur_y = 0;
        }
    }
}
