//! Column-change reflow.
//!
//! When the column count changes, every page is rewritten cell-by-cell
//! into freshly allocated destination pages: wrapped lines re-wrap to the
//! new width, wide characters re-straddle (or stop straddling) row
//! boundaries, styles and grapheme slices re-intern into the destination
//! pages, and every tracked pin follows its cell.
//!
//! The walk keeps one destination cursor across all source pages, so a
//! logical line that spans a source page boundary flows through
//! uninterrupted, and blank lines fold into a counter that is flushed
//! only when more content follows.

use smallvec::SmallVec;
use tracing::debug;

use crate::cell::{Cell, Wide};
use crate::error::{Error, Result};
use crate::page::Capacity;
use crate::point::{Point, Tag};

use super::capacity::AdjustCapacity;
use super::resize::Cursor;
use super::{PageId, PageList, Pin};

/// Where the next reflowed cell lands.
struct DstCursor {
    id: PageId,
    y: u16,
    x: u16,
    /// The current row has been claimed by a logical line. While false,
    /// the first claim writes into row `y` instead of advancing.
    started: bool,
}

impl PageList {
    /// Rewrite the whole list at a new column count, preserving content,
    /// pins, and (optionally) a cursor position in active coordinates.
    pub(crate) fn reflow_cols(
        &mut self,
        new_cols: u16,
        cursor: Option<Cursor>,
    ) -> Result<Option<Cursor>> {
        debug_assert_ne!(new_cols, self.cols);
        debug_assert!(new_cols > 0);
        let new_page_cap = Self::capacity_for_cols(new_cols)?;
        debug!(old = self.cols, new = new_cols, "reflow start");

        // The cursor rides through the reflow as a tracked pin. Remember
        // how many active rows sat below it so growth can restore them.
        let cursor_state = cursor.and_then(|c| {
            let cy = c.y.min(self.rows - 1);
            let cx = c.x.min(self.cols - 1);
            let pin = self.pin(Point::active(cx, cy as usize))?;
            Some((self.track_pin(pin), self.rows - 1 - cy))
        });

        let src_ids: Vec<PageId> = {
            let mut ids = Vec::new();
            let mut id = Some(self.head);
            while let Some(cur) = id {
                ids.push(cur);
                id = self.next(cur);
            }
            ids
        };

        let mut dst_ids: Vec<PageId> = Vec::new();
        let mut dst = {
            let mut page = self.create_page(new_page_cap);
            page.set_cols(new_cols);
            page.set_rows(1);
            let id = self.alloc_node(page);
            dst_ids.push(id);
            DstCursor { id, y: 0, x: 0, started: false }
        };

        // Blank lines awaiting more content; trailing blanks are dropped.
        let mut blanks: usize = 0;
        // The previous source row wrapped: the logical line continues.
        let mut mid_line = false;

        for &src_id in &src_ids {
            let src_rows = self.page(src_id).size().rows;
            for src_y in 0..src_rows {
                let row = self.page(src_id).row(src_y);

                let row_pins: SmallVec<[(usize, u16); 4]> = self
                    .pins
                    .iter()
                    .enumerate()
                    .filter_map(|(slot, p)| {
                        p.filter(|p| p.page == src_id && p.y == src_y)
                            .map(|p| (slot, p.x))
                    })
                    .collect();

                // Trailing blank cells are trimmed. A pin on an otherwise
                // blank row keeps its column alive so the pin survives;
                // pins in the trimmed tail of a content row are clamped
                // after the copy instead.
                let mut cols_len = self.page(src_id).row_content_len(src_y);
                if cols_len == 0 {
                    match row_pins.iter().map(|&(_, x)| x).max() {
                        Some(max_x) => cols_len = max_x + 1,
                        None => {
                            if row.wrap() && mid_line {
                                // A fully blank row in the middle of a
                                // wrapped line adds nothing; the line's
                                // remaining segments stay joined.
                            } else {
                                // Folded like any other blank line. The
                                // wrap flag can linger on a cleared row
                                // (clearing resets only grapheme/styled);
                                // a blank row never starts a line, so its
                                // continuation begins fresh.
                                blanks += 1;
                                mid_line = false;
                            }
                            continue;
                        }
                    }
                }

                while blanks > 0 {
                    self.reflow_claim_row(&mut dst, &mut dst_ids, new_cols, new_page_cap, false);
                    blanks -= 1;
                }

                if !mid_line {
                    self.reflow_claim_row(&mut dst, &mut dst_ids, new_cols, new_page_cap, false);
                    let prompt = row.semantic_prompt();
                    self.page_mut(dst.id).row_mut(dst.y).set_semantic_prompt(prompt);
                }

                for x in 0..cols_len {
                    let cell = self.page(src_id).cell(x, src_y);
                    match cell.wide() {
                        Wide::SpacerTail => {
                            // Regenerated beside its wide cell.
                            self.reflow_remap(&row_pins, x, dst.id, dst.y, dst.x.saturating_sub(1));
                            continue;
                        }
                        Wide::SpacerHead => {
                            // Re-inserted only where a wide char actually
                            // straddles the new width.
                            self.reflow_remap(&row_pins, x, dst.id, dst.y, dst.x.min(new_cols - 1));
                            continue;
                        }
                        Wide::Wide if new_cols == 1 => {
                            // No room for a pair: degrade to a blank.
                            if dst.x >= new_cols {
                                self.reflow_wrap(&mut dst, &mut dst_ids, new_cols, new_page_cap);
                            }
                            self.reflow_write_raw(&dst, Cell::EMPTY);
                            self.reflow_remap(&row_pins, x, dst.id, dst.y, dst.x);
                            dst.x += 1;
                        }
                        Wide::Wide => {
                            if dst.x == new_cols - 1 {
                                // The pair would straddle: fill the last
                                // column with a spacer head and wrap.
                                let mut head = Cell::EMPTY;
                                head.set_wide(Wide::SpacerHead);
                                self.reflow_write_raw(&dst, head);
                                self.page_mut(dst.id).row_mut(dst.y).set_wrap(true);
                                dst.x += 1;
                            }
                            if dst.x + 2 > new_cols {
                                self.reflow_wrap(&mut dst, &mut dst_ids, new_cols, new_page_cap);
                            }
                            self.reflow_write_cell(&dst, src_id, src_y, x, cell)?;
                            self.reflow_remap(&row_pins, x, dst.id, dst.y, dst.x);
                            dst.x += 1;
                            let mut tail = Cell::EMPTY;
                            tail.set_wide(Wide::SpacerTail);
                            self.reflow_write_raw(&dst, tail);
                            dst.x += 1;
                        }
                        Wide::Narrow => {
                            if dst.x >= new_cols {
                                self.reflow_wrap(&mut dst, &mut dst_ids, new_cols, new_page_cap);
                            }
                            self.reflow_write_cell(&dst, src_id, src_y, x, cell)?;
                            self.reflow_remap(&row_pins, x, dst.id, dst.y, dst.x);
                            dst.x += 1;
                        }
                    }
                }

                // Pins that sat in the trimmed trailing blanks clamp to
                // the destination row's right edge.
                for &(slot, px) in &row_pins {
                    if px >= cols_len {
                        self.pins[slot] =
                            Some(Pin { page: dst.id, x: new_cols - 1, y: dst.y });
                    }
                }

                mid_line = row.wrap();
            }
        }

        // Splice: destinations to the tail, then drop the sources.
        for &id in &dst_ids {
            self.link_after(self.tail, id);
        }
        for &id in &src_ids {
            let page = self.free_node(id);
            self.destroy_page(page);
        }
        // Any pin not touched by the walk (nothing should remain, but a
        // dangling page id must never escape) lands at the new origin.
        let head = self.head;
        for pin in self.pins.iter_mut().flatten() {
            if src_ids.contains(&pin.page) {
                *pin = Pin { page: head, x: 0, y: 0 };
            }
        }

        self.cols = new_cols;
        self.page_cap = new_page_cap;
        self.update_min_max_bytes();

        while self.total_rows() < self.rows as usize {
            self.grow()?;
        }

        debug!(total_rows = self.total_rows(), "reflow done");

        // Cursor: restore the row count below it, without pushing content
        // into scrollback beyond what the cursor's own wrapping consumed.
        let Some((pin_id, rows_below_before)) = cursor_state else {
            return Ok(None);
        };
        let result = loop {
            let pin = self.pin_get(pin_id).expect("cursor pin tracked");
            match self.point_from_pin(Tag::Active, pin) {
                Some(pt) => {
                    let y = pt.y as u16;
                    let below = self.rows - 1 - y;
                    if below >= rows_below_before || y == 0 {
                        break Cursor { x: pt.x, y };
                    }
                    self.grow()?;
                }
                // The cursor's content scrolled above the active area;
                // clamp to the top-left visible row.
                None => break Cursor { x: pin.x, y: 0 },
            }
        };
        self.untrack_pin(pin_id);
        Ok(Some(result))
    }

    /// Advance the destination cursor to a fresh row, allocating the next
    /// destination page when the current one is out of row capacity.
    fn reflow_claim_row(
        &mut self,
        dst: &mut DstCursor,
        dst_ids: &mut Vec<PageId>,
        new_cols: u16,
        new_cap: Capacity,
        wrap_cont: bool,
    ) {
        if !dst.started {
            dst.started = true;
        } else if dst.y + 1 < self.page(dst.id).capacity().rows {
            dst.y += 1;
            self.page_mut(dst.id).set_rows(dst.y + 1);
        } else {
            let mut page = self.create_page(new_cap);
            page.set_cols(new_cols);
            page.set_rows(1);
            let id = self.alloc_node(page);
            dst_ids.push(id);
            dst.id = id;
            dst.y = 0;
        }
        dst.x = 0;
        if wrap_cont {
            self.page_mut(dst.id).row_mut(dst.y).set_wrap_continuation(true);
        }
    }

    /// Soft-wrap the destination: mark the current row wrapped and claim
    /// a continuation row.
    fn reflow_wrap(
        &mut self,
        dst: &mut DstCursor,
        dst_ids: &mut Vec<PageId>,
        new_cols: u16,
        new_cap: Capacity,
    ) {
        self.page_mut(dst.id).row_mut(dst.y).set_wrap(true);
        self.reflow_claim_row(dst, dst_ids, new_cols, new_cap, true);
    }

    /// Write a bare cell record (spacers, degraded blanks): no style or
    /// grapheme bookkeeping involved.
    fn reflow_write_raw(&mut self, dst: &DstCursor, cell: Cell) {
        *self.page_mut(dst.id).cell_mut(dst.x, dst.y) = cell;
    }

    /// Copy one content cell to the destination cursor, re-interning its
    /// style and copying its grapheme slice. A full style set or grapheme
    /// arena grows the destination page once and retries.
    fn reflow_write_cell(
        &mut self,
        dst: &DstCursor,
        src_id: PageId,
        src_y: u16,
        src_x: u16,
        mut cell: Cell,
    ) -> Result<()> {
        let style = match cell.style_id() {
            0 => None,
            id => Some(self.page(src_id).style_lookup(id)),
        };
        let cps: SmallVec<[u32; 4]> = if cell.has_grapheme() {
            self.page(src_id)
                .lookup_grapheme(src_x, src_y)
                .map(SmallVec::from_slice)
                .unwrap_or_default()
        } else {
            SmallVec::new()
        };
        cell.set_has_grapheme(false);

        if let Some(style) = style {
            let new_id = match self.page_mut(dst.id).style_upsert(style) {
                Ok(id) => id,
                Err(Error::OutOfMemory) => {
                    let styles = self.page(dst.id).capacity().styles;
                    self.adjust_capacity(
                        dst.id,
                        AdjustCapacity { styles: Some(styles * 2), grapheme_bytes: None },
                    )?;
                    self.page_mut(dst.id).style_upsert(style)?
                }
            };
            cell.set_style_id(new_id);
        }

        {
            let styled = cell.style_id() != 0;
            let page = self.page_mut(dst.id);
            let (row, slot) = page.row_and_cell_mut(dst.x, dst.y);
            *slot = cell;
            if styled {
                row.set_styled(true);
            }
        }

        if !cps.is_empty() {
            match self.page_mut(dst.id).set_grapheme(dst.x, dst.y, &cps) {
                Ok(()) => {}
                Err(Error::OutOfMemory) => {
                    let bytes = self.page(dst.id).capacity().grapheme_bytes;
                    self.adjust_capacity(
                        dst.id,
                        AdjustCapacity { styles: None, grapheme_bytes: Some(bytes * 2) },
                    )?;
                    self.page_mut(dst.id).set_grapheme(dst.x, dst.y, &cps)?;
                }
            }
        }
        Ok(())
    }

    /// Remap every pin sitting on source column `x` to a destination
    /// position.
    fn reflow_remap(
        &mut self,
        row_pins: &[(usize, u16)],
        x: u16,
        page: PageId,
        y: u16,
        new_x: u16,
    ) {
        for &(slot, px) in row_pins {
            if px == x {
                self.pins[slot] = Some(Pin { page, x: new_x, y });
            }
        }
    }
}

#[cfg(test)]
mod tests;
