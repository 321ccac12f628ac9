//! Region cloning.
//!
//! Clones a row range into a brand-new list, either with its own buffer
//! pool or sharing this list's pool (cheap short-lived clones, e.g. for
//! rendering a frame or running a search). The clone always holds at
//! least a full active area of rows.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::point::{Direction, Point};

use super::capacity::AdjustCapacity;
use super::{PageId, PageList, PagePool, Pin, Viewport};

/// Who owns the buffer pool backing a clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloneMemory {
    /// The clone allocates its own pool.
    #[default]
    Own,
    /// The clone shares this list's pool; buffers recycle across both.
    SharedPool,
}

/// Options for [`PageList::clone_region`].
#[derive(Debug, Clone, Copy)]
pub struct CloneOptions {
    /// Top of the cloned region.
    pub top: Point,
    /// Bottom of the cloned region (inclusive); defaults to the end of
    /// the list.
    pub bot: Option<Point>,
    pub memory: CloneMemory,
    /// Re-register this list's tracked pins (those inside the region) at
    /// the same slots in the clone.
    pub remap_pins: bool,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            top: Point::screen(0, 0),
            bot: None,
            memory: CloneMemory::Own,
            remap_pins: false,
        }
    }
}

impl PageList {
    /// Clone a row region into a new list with the same geometry.
    ///
    /// The clone's content is bit-identical to the source region; blank
    /// rows pad the bottom if the region is shorter than the active area.
    pub fn clone_region(&self, opts: CloneOptions) -> Result<PageList> {
        let top = self
            .pin(opts.top)
            .unwrap_or(Pin { page: self.head, x: 0, y: 0 });
        let pool = match opts.memory {
            CloneMemory::Own => Rc::new(RefCell::new(PagePool::new())),
            CloneMemory::SharedPool => Rc::clone(&self.pool),
        };

        let mut clone = PageList {
            nodes: Vec::new(),
            free_nodes: Vec::new(),
            head: PageId(0),
            tail: PageId(0),
            pool,
            pins: vec![None],
            free_pins: Vec::new(),
            cols: self.cols,
            rows: self.rows,
            page_cap: self.page_cap,
            explicit_max_bytes: self.explicit_max_bytes,
            min_max_bytes: self.min_max_bytes,
            total_bytes: 0,
            viewport: Viewport::Active,
        };

        let mut page = clone.create_page(clone.page_cap);
        page.set_cols(clone.cols);
        let first = clone.alloc_node(page);
        clone.head = first;
        clone.tail = first;

        let top_point = self.point_from_pin(crate::point::Tag::Screen, top);
        for chunk in self.page_iterator(
            Direction::RightDown,
            top_point.unwrap_or(Point::screen(0, 0)),
            opts.bot,
        ) {
            for src_y in chunk.start..chunk.end {
                let tail = clone.tail;
                let dst_id = if clone.page(tail).spare_rows() > 0 {
                    tail
                } else {
                    let mut page = clone.create_page(clone.page_cap);
                    page.set_cols(clone.cols);
                    let id = clone.alloc_node(page);
                    clone.link_after(tail, id);
                    id
                };
                let dst_y = clone.page(dst_id).size().rows;
                clone.page_mut(dst_id).set_rows(dst_y + 1);
                let copied = clone
                    .page_mut(dst_id)
                    .clone_row_from(self.page(chunk.page), dst_y, src_y);
                if let Err(Error::OutOfMemory) = copied {
                    // Rows merged from several source pages can outgrow a
                    // fresh page's style/grapheme budget.
                    let cap = clone.page(dst_id).capacity();
                    clone.adjust_capacity(
                        dst_id,
                        AdjustCapacity {
                            styles: Some(cap.styles * 2),
                            grapheme_bytes: Some(cap.grapheme_bytes * 2),
                        },
                    )?;
                    clone
                        .page_mut(dst_id)
                        .clone_row_from(self.page(chunk.page), dst_y, src_y)?;
                }
            }
        }

        // Pad to a full active area.
        while clone.total_rows() < clone.rows as usize {
            clone.grow()?;
        }

        clone.pins[0] = Some(Pin { page: clone.head, x: 0, y: 0 });

        if opts.remap_pins {
            let top_abs = self.abs_row(top).unwrap_or(0);
            let clone_origin = Pin { page: clone.head, x: 0, y: 0 };
            for (slot, pin) in self.pins.iter().enumerate().skip(1) {
                let mapped = pin
                    .and_then(|p| self.abs_row(p).map(|abs| (p, abs)))
                    .filter(|&(_, abs)| abs >= top_abs)
                    .and_then(|(p, abs)| {
                        let down = abs - top_abs;
                        clone.pin_down(clone_origin, down).map(|mut m| {
                            m.x = p.x;
                            m
                        })
                    });
                if slot >= clone.pins.len() {
                    clone.pins.resize(slot + 1, None);
                }
                clone.pins[slot] = mapped;
                if mapped.is_none() {
                    clone.free_pins.push(slot as u32);
                }
            }
        }

        Ok(clone)
    }
}
