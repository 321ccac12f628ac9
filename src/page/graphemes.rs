//! Grapheme storage: extra codepoints beyond a cell's base codepoint.
//!
//! The first codepoint of a grapheme cluster lives in the cell itself;
//! the rest live in the page's grapheme arena as a bitmap-allocated run
//! of fixed chunks, found through the grapheme map (cell offset → slice).

use crate::error::{Error, Result};
use crate::offmap::{self, SliceRef};

use super::layout::GRAPHEME_CHUNK_CPS;
use super::Page;

/// Arena chunks needed for `cps` codepoints.
pub(crate) fn chunks_for(cps: u32) -> usize {
    (cps as usize).div_ceil(GRAPHEME_CHUNK_CPS)
}

impl Page {
    /// Append one extra codepoint to the cell at `(x, y)`.
    ///
    /// Fast path: the current slice has a spare slot in its last chunk.
    /// Slow path: allocate a longer run, copy, free the old one. Fails
    /// with `OutOfMemory` when the arena has no contiguous run; the page
    /// list recovers by growing the page's grapheme capacity.
    pub fn append_grapheme(&mut self, x: u16, y: u16, cp: u32) -> Result<()> {
        let off = self.cell_index(x, y) as u32;
        let mut r = self.regions();

        if !r.cells[off as usize].has_grapheme() {
            let chunk = r.grapheme_bitmap.alloc(1).ok_or(Error::OutOfMemory)?;
            r.grapheme_data[chunk * GRAPHEME_CHUNK_CPS] = cp;
            let slice = SliceRef { chunk: chunk as u32, len: 1 };
            if let Err(err) = r.grapheme_map.insert(off, slice) {
                r.grapheme_bitmap.free(chunk, 1);
                return Err(err);
            }
            r.cells[off as usize].set_has_grapheme(true);
            r.rows[y as usize].set_grapheme(true);
            return Ok(());
        }

        let slice = r.grapheme_map.get(off).expect("grapheme cell with no map entry");
        let len = slice.len as usize;
        if len % GRAPHEME_CHUNK_CPS != 0 {
            // Spare slot in the last chunk.
            r.grapheme_data[slice.chunk as usize * GRAPHEME_CHUNK_CPS + len] = cp;
            let grown = SliceRef { chunk: slice.chunk, len: slice.len + 1 };
            r.grapheme_map.insert(off, grown).expect("replacing existing key");
            return Ok(());
        }

        let old_chunks = chunks_for(slice.len);
        let new_chunk = r.grapheme_bitmap.alloc(old_chunks + 1).ok_or(Error::OutOfMemory)?;
        let src = slice.chunk as usize * GRAPHEME_CHUNK_CPS;
        let dst = new_chunk * GRAPHEME_CHUNK_CPS;
        r.grapheme_data.copy_within(src..src + len, dst);
        r.grapheme_data[dst + len] = cp;
        r.grapheme_bitmap.free(slice.chunk as usize, old_chunks);
        let grown = SliceRef { chunk: new_chunk as u32, len: slice.len + 1 };
        r.grapheme_map.insert(off, grown).expect("replacing existing key");
        Ok(())
    }

    /// Set the full extra-codepoint slice for a cell at once (bulk path
    /// for row copies and reflow). An empty slice clears the cell.
    pub fn set_grapheme(&mut self, x: u16, y: u16, cps: &[u32]) -> Result<()> {
        if self.cell(x, y).has_grapheme() {
            self.clear_grapheme(x, y);
        }
        if cps.is_empty() {
            return Ok(());
        }

        let off = self.cell_index(x, y) as u32;
        let mut r = self.regions();
        let chunks = chunks_for(cps.len() as u32);
        let chunk = r.grapheme_bitmap.alloc(chunks).ok_or(Error::OutOfMemory)?;
        let dst = chunk * GRAPHEME_CHUNK_CPS;
        r.grapheme_data[dst..dst + cps.len()].copy_from_slice(cps);
        let slice = SliceRef { chunk: chunk as u32, len: cps.len() as u32 };
        if let Err(err) = r.grapheme_map.insert(off, slice) {
            r.grapheme_bitmap.free(chunk, chunks);
            return Err(err);
        }
        r.cells[off as usize].set_has_grapheme(true);
        r.rows[y as usize].set_grapheme(true);
        Ok(())
    }

    /// The extra codepoints of the cell at `(x, y)`, in append order.
    /// `None` when the cell holds no grapheme slice.
    pub fn lookup_grapheme(&self, x: u16, y: u16) -> Option<&[u32]> {
        let off = self.cell_index(x, y) as u32;
        let slice = offmap::find(self.grapheme_map_entries(), off)?;
        let start = slice.chunk as usize * GRAPHEME_CHUNK_CPS;
        Some(&self.grapheme_chunk_data()[start..start + slice.len as usize])
    }

    /// Free the cell's grapheme slice and retag it as a plain codepoint.
    pub fn clear_grapheme(&mut self, x: u16, y: u16) {
        let off = self.cell_index(x, y) as u32;
        let mut r = self.regions();
        if let Some(slice) = r.grapheme_map.remove(off) {
            r.grapheme_bitmap.free(slice.chunk as usize, chunks_for(slice.len));
        }
        r.cells[off as usize].set_has_grapheme(false);
    }

    /// Number of cells holding grapheme slices.
    pub fn grapheme_count(&self) -> usize {
        self.grapheme_map_header().len as usize
    }
}
