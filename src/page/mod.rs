//! A single page of screen storage.
//!
//! A [`Page`] owns one contiguous block of 64-bit words holding some rows
//! of the screen: row headers, their cells, an interned style set, and a
//! grapheme arena with its lookup map. Every internal reference is an
//! offset from the buffer base — never a pointer — so a page relocates
//! with a plain copy and pooled buffers need no fixup.
//!
//! All mutation goes through `Page` methods so the cross-region invariants
//! (style ref counts, grapheme map entries, row flags) stay in one place.

pub mod layout;

mod cells;
mod graphemes;
mod integrity;
mod styles;

use bytemuck::{cast_slice, cast_slice_mut};

use crate::bitmap::ChunkBitmap;
use crate::cell::{Cell, Row};
use crate::offmap::{self, MapHeader, OffsetMap};
use crate::style::{Style, StyleSet, StyleSetHeader};

pub use layout::{Capacity, Layout, GRAPHEME_CHUNK_CPS, OS_PAGE_SIZE};

/// Rows × cols currently live in a page. Always within the capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

/// One fixed-capacity, relocatable block of screen rows.
#[derive(Debug, Clone)]
pub struct Page {
    buf: Box<[u64]>,
    layout: Layout,
    capacity: Capacity,
    size: Size,
    /// While non-zero, `verify_integrity` is a no-op. Used by multi-step
    /// mutations that are inconsistent mid-flight.
    pub(crate) pause_integrity_checks: u32,
}

impl Page {
    /// Allocate a zeroed page of the given capacity with zero live size.
    ///
    /// The buffer comes zero-initialized, which doubles as initialization:
    /// zeroed cells are empty, a zeroed style set and grapheme map are
    /// valid and empty.
    pub fn new(capacity: Capacity) -> Self {
        let layout = capacity.layout();
        let buf = vec![0u64; layout.total_words].into_boxed_slice();
        let mut page = Self {
            buf,
            layout,
            capacity,
            size: Size { cols: capacity.cols, rows: 0 },
            pause_integrity_checks: 0,
        };
        page.init_row_offsets();
        page
    }

    /// Rebuild a page in a recycled buffer. The buffer must be at least as
    /// large as the capacity's layout; it is zeroed here.
    pub fn from_buf(buf: Box<[u64]>, capacity: Capacity) -> Self {
        let layout = capacity.layout();
        debug_assert!(buf.len() >= layout.total_words);
        let mut page = Self {
            buf,
            layout,
            capacity,
            size: Size { cols: capacity.cols, rows: 0 },
            pause_integrity_checks: 0,
        };
        page.buf.fill(0);
        page.init_row_offsets();
        page
    }

    /// Zero the page and reinitialize it at a (possibly different)
    /// capacity, keeping the backing buffer.
    pub fn reinit(&mut self, capacity: Capacity) {
        let layout = capacity.layout();
        debug_assert!(self.buf.len() >= layout.total_words);
        self.buf.fill(0);
        self.layout = layout;
        self.capacity = capacity;
        self.size = Size { cols: capacity.cols, rows: 0 };
        self.init_row_offsets();
    }

    /// Take the backing buffer, consuming the page (for pooling).
    pub fn into_buf(self) -> Box<[u64]> {
        self.buf
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Backing buffer size in bytes.
    pub fn buf_bytes(&self) -> usize {
        self.layout.total_bytes
    }

    /// Whether the backing buffer has the standard pooled shape.
    pub fn is_standard(&self) -> bool {
        self.buf.len() == Capacity::STANDARD.layout().total_words
    }

    pub(crate) fn set_rows(&mut self, rows: u16) {
        debug_assert!(rows <= self.capacity.rows);
        self.size.rows = rows;
    }

    pub(crate) fn set_cols(&mut self, cols: u16) {
        debug_assert!(cols <= self.capacity.cols);
        self.size.cols = cols;
    }

    /// Spare row capacity below the live size.
    pub fn spare_rows(&self) -> u16 {
        self.capacity.rows - self.size.rows
    }

    // --- record access ------------------------------------------------------

    /// All row headers up to the capacity.
    pub(crate) fn rows_slice(&self) -> &[Row] {
        let l = &self.layout;
        cast_slice(&self.buf[l.rows_start..l.rows_start + self.capacity.rows as usize])
    }

    pub(crate) fn rows_slice_mut(&mut self) -> &mut [Row] {
        let l = self.layout;
        cast_slice_mut(&mut self.buf[l.rows_start..l.rows_start + self.capacity.rows as usize])
    }

    /// The row header at `y` (bounds-asserted against the live size).
    pub fn row(&self, y: u16) -> Row {
        debug_assert!(y < self.size.rows, "row {y} >= size {}", self.size.rows);
        self.rows_slice()[y as usize]
    }

    pub fn row_mut(&mut self, y: u16) -> &mut Row {
        debug_assert!(y < self.size.rows, "row {y} >= size {}", self.size.rows);
        &mut self.rows_slice_mut()[y as usize]
    }

    /// The whole cells array (capacity-sized).
    pub(crate) fn cells_slice(&self) -> &[Cell] {
        let l = &self.layout;
        cast_slice(&self.buf[l.cells_start..l.style_header])
    }

    pub(crate) fn cells_slice_mut(&mut self) -> &mut [Cell] {
        let l = self.layout;
        cast_slice_mut(&mut self.buf[l.cells_start..l.style_header])
    }

    /// Index of cell `(x, y)` in the cells array.
    pub(crate) fn cell_index(&self, x: u16, y: u16) -> usize {
        debug_assert!(x < self.size.cols && y < self.size.rows);
        self.row(y).cells_offset() as usize + x as usize
    }

    pub fn cell(&self, x: u16, y: u16) -> Cell {
        self.cells_slice()[self.cell_index(x, y)]
    }

    pub fn cell_mut(&mut self, x: u16, y: u16) -> &mut Cell {
        let idx = self.cell_index(x, y);
        &mut self.cells_slice_mut()[idx]
    }

    /// The live cells of row `y`.
    pub fn row_cells(&self, y: u16) -> &[Cell] {
        let start = self.row(y).cells_offset() as usize;
        &self.cells_slice()[start..start + self.size.cols as usize]
    }

    pub fn row_cells_mut(&mut self, y: u16) -> &mut [Cell] {
        let start = self.row(y).cells_offset() as usize;
        let cols = self.size.cols as usize;
        &mut self.cells_slice_mut()[start..start + cols]
    }

    /// The row header and one cell, mutably. This is the write handle the
    /// producer side uses: mutate the cell, then update the row flags.
    pub fn row_and_cell_mut(&mut self, x: u16, y: u16) -> (&mut Row, &mut Cell) {
        let idx = self.cell_index(x, y);
        let l = self.layout;
        let cap_rows = self.capacity.rows as usize;
        let (head, tail) = self.buf.split_at_mut(l.cells_start);
        let rows: &mut [Row] = cast_slice_mut(&mut head[l.rows_start..l.rows_start + cap_rows]);
        let cells: &mut [Cell] = cast_slice_mut(&mut tail[..l.style_header - l.cells_start]);
        (&mut rows[y as usize], &mut cells[idx])
    }

    /// Length of row `y` with trailing contentless cells trimmed.
    pub fn row_content_len(&self, y: u16) -> u16 {
        let cells = self.row_cells(y);
        let mut len = cells.len();
        while len > 0 && !cells[len - 1].has_content() {
            len -= 1;
        }
        len as u16
    }

    /// Whether row `y` has no visible content.
    pub fn row_is_blank(&self, y: u16) -> bool {
        self.row_content_len(y) == 0
    }

    // --- read-only region views --------------------------------------------

    pub(crate) fn grapheme_map_entries(&self) -> &[offmap::Entry] {
        let l = &self.layout;
        let words = &self.buf[l.grapheme_map_start..l.grapheme_map_start + l.grapheme_map_len * 2];
        cast_slice(words)
    }

    pub(crate) fn grapheme_chunk_data(&self) -> &[u32] {
        let l = &self.layout;
        let words = &self.buf[l.grapheme_chunks_start..l.grapheme_map_header];
        cast_slice(words)
    }

    pub(crate) fn grapheme_map_header(&self) -> MapHeader {
        let l = &self.layout;
        cast_slice::<u64, MapHeader>(&self.buf[l.grapheme_map_header..l.grapheme_map_header + 1])[0]
    }

    pub(crate) fn style_header(&self) -> StyleSetHeader {
        let l = &self.layout;
        cast_slice::<u64, StyleSetHeader>(&self.buf[l.style_header..l.style_header + 1])[0]
    }

    pub(crate) fn style_records(&self) -> &[Style] {
        let l = &self.layout;
        cast_slice(&self.buf[l.style_records_start..l.style_refs_start])
    }

    pub(crate) fn style_refs(&self) -> &[u32] {
        let l = &self.layout;
        let refs: &[u32] = cast_slice(&self.buf[l.style_refs_start..l.style_table_start]);
        &refs[..self.capacity.styles as usize]
    }

    // --- mutable region split ----------------------------------------------

    /// Split the buffer into independently borrowable region views.
    pub(crate) fn regions(&mut self) -> Regions<'_> {
        let l = self.layout;
        let cap_rows = self.capacity.rows as usize;
        let cap_styles = self.capacity.styles as usize;

        let buf = &mut self.buf[..];
        let (rows_w, rest) = buf.split_at_mut(l.cells_start);
        let (cells_w, rest) = rest.split_at_mut(l.style_header - l.cells_start);
        let (sheader_w, rest) = rest.split_at_mut(1);
        let (srecords_w, rest) = rest.split_at_mut(l.style_refs_start - l.style_records_start);
        let (srefs_w, rest) = rest.split_at_mut(l.style_table_start - l.style_refs_start);
        let (stable_w, rest) = rest.split_at_mut(l.grapheme_bitmap_start - l.style_table_start);
        let (gbitmap_w, rest) = rest.split_at_mut(l.grapheme_chunks_start - l.grapheme_bitmap_start);
        let (gchunks_w, rest) = rest.split_at_mut(l.grapheme_map_header - l.grapheme_chunks_start);
        let (gmheader_w, rest) = rest.split_at_mut(1);
        let gmap_w = &mut rest[..l.grapheme_map_len * 2];

        let refs: &mut [u32] = cast_slice_mut(srefs_w);
        let table: &mut [u16] = cast_slice_mut(stable_w);

        Regions {
            rows: cast_slice_mut(&mut rows_w[l.rows_start..l.rows_start + cap_rows]),
            cells: cast_slice_mut(cells_w),
            styles: StyleSet {
                header: &mut cast_slice_mut::<u64, StyleSetHeader>(sheader_w)[0],
                records: cast_slice_mut(srecords_w),
                refs: &mut refs[..cap_styles],
                table: &mut table[..l.style_table_len],
            },
            grapheme_bitmap: ChunkBitmap::new(gbitmap_w, l.grapheme_chunks),
            grapheme_data: cast_slice_mut(gchunks_w),
            grapheme_map: OffsetMap {
                header: &mut cast_slice_mut::<u64, MapHeader>(gmheader_w)[0],
                entries: cast_slice_mut(gmap_w),
            },
        }
    }

    fn init_row_offsets(&mut self) {
        let cols = self.capacity.cols as u32;
        for (i, row) in self.rows_slice_mut().iter_mut().enumerate() {
            *row = Row::new(i as u32 * cols);
        }
    }
}

/// Mutable views of every page region, borrow-checked as one unit.
pub(crate) struct Regions<'a> {
    pub rows: &'a mut [Row],
    pub cells: &'a mut [Cell],
    pub styles: StyleSet<'a>,
    pub grapheme_bitmap: ChunkBitmap<'a>,
    pub grapheme_data: &'a mut [u32],
    pub grapheme_map: OffsetMap<'a>,
}
