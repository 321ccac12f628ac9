//! Resize: row-count changes and non-reflow column changes.
//!
//! Column changes that redistribute content across rows live in the
//! reflow module; everything here keeps each row's cells in place.

use tracing::debug;

use crate::error::Result;
use crate::point::{Point, Tag};

use super::{PageList, Pin};

/// Caller-supplied cursor position in active coordinates. Resize keeps
/// the cursor on its content and returns the adjusted position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
}

/// Options for [`PageList::resize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResizeOptions {
    /// New column count; `None` keeps the current width.
    pub cols: Option<u16>,
    /// New active-area row count; `None` keeps the current height.
    pub rows: Option<u16>,
    /// Re-wrap content to the new width. Without it, rows are truncated
    /// or extended in place (the alt-screen behavior).
    pub reflow: bool,
    /// Cursor to preserve across the resize.
    pub cursor: Option<Cursor>,
}

impl PageList {
    /// Resize the screen, returning the adjusted cursor when one was
    /// supplied.
    pub fn resize(&mut self, opts: ResizeOptions) -> Result<Option<Cursor>> {
        debug_assert!(opts.cols.is_none_or(|c| c > 0));
        debug_assert!(opts.rows.is_none_or(|r| r > 0));
        let mut cursor = opts.cursor;

        if let Some(new_cols) = opts.cols {
            if new_cols != self.cols {
                debug!(
                    old = self.cols,
                    new = new_cols,
                    reflow = opts.reflow,
                    "resizing columns"
                );
                if opts.reflow {
                    cursor = self.reflow_cols(new_cols, cursor)?;
                } else {
                    self.resize_cols_no_reflow(new_cols)?;
                    if let Some(c) = &mut cursor {
                        c.x = c.x.min(new_cols - 1);
                    }
                }
            }
        }

        if let Some(new_rows) = opts.rows {
            if new_rows != self.rows {
                debug!(old = self.rows, new = new_rows, "resizing rows");
                cursor = self.resize_rows(new_rows, cursor)?;
            }
        }

        Ok(cursor)
    }

    /// Recompute the budget floor after a geometry change.
    pub(crate) fn update_min_max_bytes(&mut self) {
        let page_bytes = self.page_cap.layout().total_bytes;
        self.min_max_bytes =
            page_bytes * ((self.rows as usize).div_ceil(self.page_cap.rows as usize) + 1);
    }

    fn resize_cols_no_reflow(&mut self, new_cols: u16) -> Result<()> {
        let new_page_cap = Self::capacity_for_cols(new_cols)?;

        if new_cols < self.cols {
            // Shrink: clear the dropped columns on every page so the cells
            // are zeroed if the width grows back.
            let mut id = Some(self.head);
            while let Some(cur) = id {
                let size = self.page(cur).size();
                for y in 0..size.rows {
                    self.page_mut(cur).clear_cells(y, new_cols, size.cols);
                }
                self.page_mut(cur).set_cols(new_cols);
                id = self.next(cur);
            }
            for pin in self.pins.iter_mut().flatten() {
                pin.x = pin.x.min(new_cols - 1);
            }
        } else {
            // Grow: extend in place where the capacity allows; otherwise
            // redistribute the page's rows, filling the previous page's
            // spare row capacity before allocating fresh pages.
            let mut id = Some(self.head);
            while let Some(cur) = id {
                let next = self.next(cur);
                if self.page(cur).capacity().cols >= new_cols {
                    self.page_mut(cur).set_cols(new_cols);
                    id = next;
                    continue;
                }

                let src_rows = self.page(cur).size().rows;
                for src_y in 0..src_rows {
                    let dst_id = match self.prev(cur) {
                        Some(p)
                            if self.page(p).capacity().cols >= new_cols
                                && self.page(p).spare_rows() > 0 =>
                        {
                            p
                        }
                        _ => {
                            let mut page = self.create_page(new_page_cap);
                            page.set_cols(new_cols);
                            let nid = self.alloc_node(page);
                            self.link_before(cur, nid);
                            nid
                        }
                    };
                    let dst_y = self.page(dst_id).size().rows;
                    self.page_mut(dst_id).set_rows(dst_y + 1);
                    self.clone_row_between(dst_id, dst_y, cur, src_y)?;
                    for pin in self.pins.iter_mut().flatten() {
                        if pin.page == cur && pin.y == src_y {
                            *pin = Pin { page: dst_id, x: pin.x, y: dst_y };
                        }
                    }
                }
                let page = self.free_node(cur);
                self.destroy_page(page);
                id = next;
            }
        }

        self.cols = new_cols;
        self.page_cap = new_page_cap;
        self.update_min_max_bytes();
        Ok(())
    }

    fn resize_rows(&mut self, new_rows: u16, cursor: Option<Cursor>) -> Result<Option<Cursor>> {
        let old_rows = self.rows;
        if new_rows < old_rows {
            // Track the cursor's content through the shift: trimming below
            // it never moves it, but shrinking the window may.
            let cursor_pin = cursor.and_then(|c| self.pin(Point::active(c.x, c.y.into())));
            let cursor_abs = cursor_pin.and_then(|p| self.abs_row(p));

            let mut to_trim = (old_rows - new_rows) as usize;
            while to_trim > 0 {
                let tail = self.tail;
                let page = self.page(tail);
                let rows = page.size().rows;
                if rows == 0 {
                    break;
                }
                let last = rows - 1;
                if !page.row_is_blank(last) || self.pin_on_row(tail, last) {
                    break;
                }
                // Never trim the cursor's row or anything above it.
                if let Some(abs) = cursor_abs {
                    let last_abs = self.total_rows() - 1;
                    if last_abs <= abs {
                        break;
                    }
                }
                // A "blank" row can still hold style-only cells; release
                // them before the row leaves the live area.
                let cols = self.page(tail).size().cols;
                self.page_mut(tail).clear_cells(last, 0, cols);
                self.page_mut(tail).row_mut(last).clear_flags();
                self.page_mut(tail).set_rows(last);
                if last == 0 && self.prev(tail).is_some() {
                    let page = self.free_node(tail);
                    self.destroy_page(page);
                }
                to_trim -= 1;
            }

            self.rows = new_rows;
            self.update_min_max_bytes();

            let cursor = match (cursor, cursor_pin) {
                (Some(_), Some(pin)) => {
                    let pt = self.point_from_pin(Tag::Active, pin);
                    Some(match pt {
                        Some(pt) => Cursor { x: pt.x, y: pt.y as u16 },
                        // Content scrolled above the new active top.
                        None => Cursor { x: pin.x, y: 0 },
                    })
                }
                (c, _) => c,
            };
            return Ok(cursor);
        }

        // Growing rows.
        let delta = (new_rows - old_rows) as usize;
        let mut cursor = cursor;
        if cursor.is_some_and(|c| c.y + 1 < old_rows) {
            // Cursor above the bottom: append blank rows below it so the
            // cursor's content doesn't move.
            for _ in 0..delta {
                self.grow()?;
            }
        } else {
            // Pull rows back out of scrollback first, then pad with blanks.
            let from_scrollback = delta.min(self.scrollback_rows());
            if let Some(c) = &mut cursor {
                c.y += from_scrollback as u16;
            }
            for _ in 0..delta - from_scrollback {
                self.grow()?;
            }
        }
        self.rows = new_rows;
        self.update_min_max_bytes();
        Ok(cursor)
    }
}
