//! Cell movement, clearing, and cross-page row copies.

use crate::cell::{Cell, Wide};
use crate::error::Result;

use super::graphemes::chunks_for;
use super::Page;

impl Page {
    /// Move `len` cells from `(src_left, src_y)` to `(dst_left, dst_y)`.
    ///
    /// Grapheme map entries follow by re-keying — the arena slices are not
    /// reallocated. Style ref counts are untouched (same page). Source
    /// cells left uncovered by the destination are zeroed. The destination
    /// cells must already be clear; this never fails.
    pub fn move_cells(&mut self, src_y: u16, src_left: u16, dst_y: u16, dst_left: u16, len: u16) {
        if len == 0 {
            return;
        }
        let src = self.cell_index(src_left, src_y);
        let dst = self.cell_index(dst_left, dst_y);
        if src == dst {
            return;
        }
        let len = len as usize;
        let mut r = self.regions();

        let mut any_grapheme = false;
        let mut any_styled = false;
        for i in 0..len {
            let cell = r.cells[src + i];
            if cell.has_grapheme() {
                r.grapheme_map.rekey((src + i) as u32, (dst + i) as u32);
                any_grapheme = true;
            }
            if cell.style_id() != 0 {
                any_styled = true;
            }
        }

        r.cells.copy_within(src..src + len, dst);
        for i in src..src + len {
            if i < dst || i >= dst + len {
                r.cells[i] = Cell::EMPTY;
            }
        }

        let dst_row = &mut r.rows[dst_y as usize];
        if any_grapheme {
            dst_row.set_grapheme(true);
        }
        if any_styled {
            dst_row.set_styled(true);
        }
    }

    /// Swap two cells within one row, keeping grapheme map entries keyed
    /// to the cell that owns them.
    pub fn swap_cells(&mut self, y: u16, a_x: u16, b_x: u16) {
        if a_x == b_x {
            return;
        }
        let a = self.cell_index(a_x, y) as u32;
        let b = self.cell_index(b_x, y) as u32;
        let mut r = self.regions();

        r.cells.swap(a as usize, b as usize);

        let a_slice = r.grapheme_map.remove(a);
        let b_slice = r.grapheme_map.remove(b);
        if let Some(slice) = a_slice {
            r.grapheme_map.insert(b, slice).expect("slot freed by remove");
        }
        if let Some(slice) = b_slice {
            r.grapheme_map.insert(a, slice).expect("slot freed by remove");
        }
    }

    /// Zero the cells of row `y` in columns `[left, end)`, releasing style
    /// references and freeing grapheme slices. Clearing the whole row also
    /// resets the row's conservative `grapheme`/`styled` flags.
    pub fn clear_cells(&mut self, y: u16, left: u16, end: u16) {
        debug_assert!(left <= end && end <= self.size.cols);
        let base = self.row(y).cells_offset() as usize;
        let whole_row = left == 0 && end == self.size.cols;
        let mut r = self.regions();

        for x in left..end {
            let off = base + x as usize;
            let cell = r.cells[off];
            if cell.has_grapheme() {
                if let Some(slice) = r.grapheme_map.remove(off as u32) {
                    r.grapheme_bitmap.free(slice.chunk as usize, chunks_for(slice.len));
                }
            }
            let style_id = cell.style_id();
            if style_id != 0 {
                r.styles.release(style_id);
            }
            r.cells[off] = Cell::EMPTY;
        }

        if whole_row {
            let row = &mut r.rows[y as usize];
            row.set_grapheme(false);
            row.set_styled(false);
        }
    }

    /// Copy rows `[y_start, y_end)` from another page into the same rows
    /// of this page.
    pub fn clone_from(&mut self, src: &Page, y_start: u16, y_end: u16) -> Result<()> {
        for y in y_start..y_end {
            self.clone_row_from(src, y, y)?;
        }
        Ok(())
    }

    /// Copy a whole row from another page, including the row flags.
    ///
    /// The copied width is the intersection of the two pages' live column
    /// counts. Styles are re-interned into this page's set and grapheme
    /// slices copied into this page's arena. When this page is wider than
    /// the source, a trailing `spacer_head` loses its meaning and is
    /// demoted to narrow.
    pub fn clone_row_from(&mut self, src: &Page, dst_y: u16, src_y: u16) -> Result<()> {
        let width = self.size.cols.min(src.size.cols);
        // The partial copy clears its own range; release anything beyond
        // the copied width here.
        self.clear_cells(dst_y, width, self.size.cols);
        self.clone_partial_row_from(src, dst_y, 0, src_y, 0, width)?;
        self.row_mut(dst_y).copy_flags_from(src.row(src_y));

        if self.size.cols > src.size.cols && width > 0 {
            let last = self.cell_mut(width - 1, dst_y);
            if last.wide() == Wide::SpacerHead {
                last.set_wide(Wide::Narrow);
            }
        }
        Ok(())
    }

    /// Copy a cell range from another page's row into this page's row at
    /// `dst_left`, without touching the destination row flags beyond the
    /// conservative `grapheme`/`styled` bits.
    pub fn clone_partial_row_from(
        &mut self,
        src: &Page,
        dst_y: u16,
        dst_left: u16,
        src_y: u16,
        src_left: u16,
        src_end: u16,
    ) -> Result<()> {
        let len = src_end - src_left;
        self.clear_cells(dst_y, dst_left, dst_left + len);
        self.copy_cell_range(src, dst_y, dst_left, src_y, src_left, len)
    }

    fn copy_cell_range(
        &mut self,
        src: &Page,
        dst_y: u16,
        dst_left: u16,
        src_y: u16,
        src_left: u16,
        len: u16,
    ) -> Result<()> {
        let mut any_grapheme = false;
        let mut any_styled = false;

        for i in 0..len {
            let src_x = src_left + i;
            let dst_x = dst_left + i;
            let mut cell = src.cell(src_x, src_y);

            let style_id = cell.style_id();
            if style_id != 0 {
                let style = src.style_lookup(style_id);
                cell.set_style_id(self.style_upsert(style)?);
                any_styled = true;
            }

            // Write the record first; grapheme copy keys off the cell.
            let had_grapheme = cell.has_grapheme();
            cell.set_has_grapheme(false);
            *self.cell_mut(dst_x, dst_y) = cell;

            if had_grapheme {
                let cps: Vec<u32> = src
                    .lookup_grapheme(src_x, src_y)
                    .map(<[u32]>::to_vec)
                    .unwrap_or_default();
                if !cps.is_empty() {
                    self.set_grapheme(dst_x, dst_y, &cps)?;
                    any_grapheme = true;
                }
            }
        }

        let row = self.row_mut(dst_y);
        if any_grapheme {
            row.set_grapheme(true);
        }
        if any_styled {
            row.set_styled(true);
        }
        Ok(())
    }
}
