//! Page capacity and buffer layout.
//!
//! A page's buffer is one block of 64-bit words carved into regions: row
//! headers, cells, style set, grapheme arena, grapheme map. [`Layout`]
//! computes the word offset of each region for a given [`Capacity`], and
//! rounds the total up to a whole multiple of the OS page size so standard
//! buffers pool cleanly.

use crate::bitmap::ChunkBitmap;
use crate::error::{Error, Result};

/// OS page granularity; every page buffer is a whole multiple of this.
pub const OS_PAGE_SIZE: usize = 4096;

/// Codepoints per grapheme arena chunk.
pub const GRAPHEME_CHUNK_CPS: usize = 4;

/// Bytes per grapheme arena chunk (4 × u32).
pub const GRAPHEME_CHUNK_BYTES: usize = GRAPHEME_CHUNK_CPS * 4;

const WORD: usize = 8;

/// Maximum rows × cols a page may hold, plus its style and grapheme
/// budgets. The live [`super::Size`] never exceeds the capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub cols: u16,
    pub rows: u16,
    /// Style slots, including the reserved default slot 0.
    pub styles: u16,
    /// Grapheme arena budget in bytes.
    pub grapheme_bytes: u32,
}

impl Capacity {
    /// The standard capacity: buffers of this shape come from the page
    /// pool. The numbers land the total on a convenient page multiple.
    pub const STANDARD: Self = Self {
        cols: 215,
        rows: 215,
        styles: 128,
        grapheme_bytes: 8192,
    };

    /// Compute the region layout for this capacity.
    pub fn layout(self) -> Layout {
        Layout::compute(self)
    }

    /// Recompute the maximum rows that fit in this capacity's byte size at
    /// a new column width. The style and grapheme regions keep their size;
    /// what remains is divided between row headers and cells.
    ///
    /// Fails with `OutOfMemory` when not even one row fits.
    pub fn adjust(self, new_cols: u16) -> Result<Self> {
        let layout = self.layout();
        let tail_words = layout.content_words - layout.style_header;
        let avail_words = layout.total_words - tail_words;
        // One word of row header plus one word per cell.
        let per_row = 1 + new_cols as usize;
        let rows = (avail_words / per_row).min(u16::MAX as usize) as u16;
        if rows == 0 {
            return Err(Error::OutOfMemory);
        }
        Ok(Self {
            cols: new_cols,
            rows,
            styles: self.styles,
            grapheme_bytes: self.grapheme_bytes,
        })
    }
}

/// Word offsets of every region inside a page buffer.
///
/// Regions appear in buffer order: rows, cells, style set (header, records,
/// ref counts, id table), grapheme arena (bitmap, chunks), grapheme map
/// (header, entries). Each region starts word-aligned, so `bytemuck` casts
/// of sub-slices never see misalignment.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// Buffer size in bytes, a whole multiple of [`OS_PAGE_SIZE`].
    pub total_bytes: usize,
    /// Buffer size in 64-bit words.
    pub total_words: usize,
    /// Words actually occupied by regions (before OS-page rounding).
    pub content_words: usize,

    pub rows_start: usize,
    pub cells_start: usize,

    pub style_header: usize,
    pub style_records_start: usize,
    pub style_refs_start: usize,
    pub style_table_start: usize,
    /// Entries in the style id table (power of two).
    pub style_table_len: usize,

    pub grapheme_bitmap_start: usize,
    pub grapheme_chunks_start: usize,
    /// Chunks in the grapheme arena.
    pub grapheme_chunks: usize,
    pub grapheme_map_header: usize,
    pub grapheme_map_start: usize,
    /// Entries in the grapheme map (power of two).
    pub grapheme_map_len: usize,
}

impl Layout {
    fn compute(cap: Capacity) -> Self {
        let rows = cap.rows as usize;
        let cols = cap.cols as usize;
        let styles = cap.styles as usize;

        let rows_start = 0;
        let cells_start = rows_start + rows;

        let style_header = cells_start + rows * cols;
        let style_records_start = style_header + 1;
        // 16-byte records: two words each.
        let style_refs_start = style_records_start + styles * 2;
        // u32 ref counts packed two per word.
        let style_table_start = style_refs_start + styles.div_ceil(2);
        let style_table_len = (styles * 2).next_power_of_two();
        // u16 entries packed four per word.
        let style_table_words = style_table_len.div_ceil(4);

        let grapheme_chunks = cap.grapheme_bytes as usize / GRAPHEME_CHUNK_BYTES;
        let grapheme_bitmap_start = style_table_start + style_table_words;
        let grapheme_chunks_start =
            grapheme_bitmap_start + ChunkBitmap::words_for(grapheme_chunks);

        let grapheme_map_header =
            grapheme_chunks_start + grapheme_chunks * (GRAPHEME_CHUNK_BYTES / WORD);
        let grapheme_map_start = grapheme_map_header + 1;
        let grapheme_map_len = (grapheme_chunks * 2).next_power_of_two().max(2);
        // 16-byte entries: two words each.
        let content_words = grapheme_map_start + grapheme_map_len * 2;

        let total_bytes = (content_words * WORD).next_multiple_of(OS_PAGE_SIZE);
        let total_words = total_bytes / WORD;

        Self {
            total_bytes,
            total_words,
            content_words,
            rows_start,
            cells_start,
            style_header,
            style_records_start,
            style_refs_start,
            style_table_start,
            style_table_len,
            grapheme_bitmap_start,
            grapheme_chunks_start,
            grapheme_chunks,
            grapheme_map_header,
            grapheme_map_start,
            grapheme_map_len,
        }
    }
}

#[cfg(test)]
mod tests;
