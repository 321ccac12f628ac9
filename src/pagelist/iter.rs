//! Iteration over regions of the list.
//!
//! The primitive is the chunk iterator: contiguous row ranges within one
//! page, so consumers amortize page traversal instead of paying it per
//! cell. Row and cell iterators layer on top. Iterators hold a shared
//! borrow of the list, so any mutation invalidates them at compile time.

use crate::point::{Direction, Point};

use super::{PageId, PageList, Pin};

/// A contiguous run of rows within one page: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub page: PageId,
    pub start: u16,
    pub end: u16,
}

impl Chunk {
    pub fn rows(&self) -> u16 {
        self.end - self.start
    }
}

/// Yields chunks from a start point toward a bound, in either direction.
pub struct PageChunkIter<'a> {
    list: &'a PageList,
    dir: Direction,
    cur: Option<Pin>,
    limit: Pin,
}

impl<'a> Iterator for PageChunkIter<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let cur = self.cur?;
        let page = cur.page;
        match self.dir {
            Direction::RightDown => {
                if self.limit.page == page {
                    self.cur = None;
                    (cur.y <= self.limit.y).then_some(Chunk {
                        page,
                        start: cur.y,
                        end: self.limit.y + 1,
                    })
                } else {
                    let end = self.list.page(page).size().rows;
                    self.cur = self
                        .list
                        .next(page)
                        .map(|next| Pin { page: next, x: 0, y: 0 });
                    Some(Chunk { page, start: cur.y, end })
                }
            }
            Direction::LeftUp => {
                if self.limit.page == page {
                    self.cur = None;
                    (self.limit.y <= cur.y).then_some(Chunk {
                        page,
                        start: self.limit.y,
                        end: cur.y + 1,
                    })
                } else {
                    self.cur = self.list.prev(page).map(|prev| Pin {
                        page: prev,
                        x: 0,
                        y: self.list.page(prev).size().rows - 1,
                    });
                    Some(Chunk { page, start: 0, end: cur.y + 1 })
                }
            }
        }
    }
}

/// Yields one pin per row, walking chunks in the iterator's direction.
pub struct RowIter<'a> {
    chunks: PageChunkIter<'a>,
    current: Option<Chunk>,
    /// Offset into the current chunk (0-based from the walk side).
    offset: u16,
    dir: Direction,
}

impl<'a> Iterator for RowIter<'a> {
    type Item = Pin;

    fn next(&mut self) -> Option<Pin> {
        loop {
            let chunk = match self.current {
                Some(chunk) => chunk,
                None => {
                    self.current = Some(self.chunks.next()?);
                    self.offset = 0;
                    continue;
                }
            };
            if self.offset >= chunk.rows() {
                self.current = None;
                continue;
            }
            let y = match self.dir {
                Direction::RightDown => chunk.start + self.offset,
                Direction::LeftUp => chunk.end - 1 - self.offset,
            };
            self.offset += 1;
            return Some(Pin { page: chunk.page, x: 0, y });
        }
    }
}

/// Yields one pin per cell, wrapping between rows at column boundaries.
pub struct CellIter<'a> {
    list: &'a PageList,
    dir: Direction,
    cur: Option<Pin>,
    limit: Pin,
}

impl<'a> Iterator for CellIter<'a> {
    type Item = Pin;

    fn next(&mut self) -> Option<Pin> {
        let cur = self.cur?;
        self.cur = if cur == self.limit {
            None
        } else {
            match self.dir {
                Direction::RightDown => {
                    if cur.x + 1 < self.list.cols() {
                        Some(Pin { x: cur.x + 1, ..cur })
                    } else {
                        self.list
                            .pin_down(Pin { x: 0, ..cur }, 1)
                            .map(|pin| Pin { x: 0, ..pin })
                    }
                }
                Direction::LeftUp => {
                    if cur.x > 0 {
                        Some(Pin { x: cur.x - 1, ..cur })
                    } else {
                        let last_x = self.list.cols() - 1;
                        self.list
                            .pin_up(Pin { x: 0, ..cur }, 1)
                            .map(|pin| Pin { x: last_x, ..pin })
                    }
                }
            }
        };
        Some(cur)
    }
}

impl PageList {
    /// Iterate chunks of rows from `tl` toward the bound.
    ///
    /// For `RightDown`, `tl` is the starting (top) point and the bound
    /// defaults to the bottom-right of `tl`'s frame. For `LeftUp`, `tl`
    /// is the starting (bottom) point and the bound defaults to the
    /// frame's top-left. Bounds are inclusive.
    pub fn page_iterator(
        &self,
        dir: Direction,
        tl: Point,
        bl: Option<Point>,
    ) -> PageChunkIter<'_> {
        let (cur, limit) = self.iter_bounds(dir, tl, bl);
        PageChunkIter { list: self, dir, cur, limit }
    }

    /// Iterate rows, yielding a pin per row.
    pub fn row_iterator(&self, dir: Direction, tl: Point, bl: Option<Point>) -> RowIter<'_> {
        RowIter {
            chunks: self.page_iterator(dir, tl, bl),
            current: None,
            offset: 0,
            dir,
        }
    }

    /// Iterate cells, yielding a pin per cell. The first row starts at
    /// `tl.x`; the bound's column stops the final row.
    pub fn cell_iterator(&self, dir: Direction, tl: Point, bl: Option<Point>) -> CellIter<'_> {
        let (cur, limit) = self.iter_bounds(dir, tl, bl);
        let cur = cur.map(|mut pin| {
            pin.x = tl.x;
            pin
        });
        CellIter { list: self, dir, cur, limit }
    }

    fn iter_bounds(&self, dir: Direction, tl: Point, bl: Option<Point>) -> (Option<Pin>, Pin) {
        let start = self.pin(tl);
        let limit = bl.and_then(|p| self.pin(p)).unwrap_or_else(|| match dir {
            Direction::RightDown => self
                .get_bottom_right(tl.tag)
                .unwrap_or_else(|| self.get_top_left(tl.tag)),
            Direction::LeftUp => self.get_top_left(tl.tag),
        });
        (start, limit)
    }
}

#[cfg(test)]
mod tests;
