//! Packed cell and row records.
//!
//! A [`Cell`] is one character position in the grid, packed into 64 bits so
//! a page stores millions of them with no per-cell heap data. A [`Row`] is
//! the 64-bit header in front of a row's cell array. Both are plain-old-data
//! and live inside a page's relocatable buffer; everything they reference is
//! an offset, never a pointer.

use bytemuck::{Pod, Zeroable};
use unicode_width::UnicodeWidthChar;

/// What the `content` bits of a [`Cell`] hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ContentTag {
    /// A single codepoint (the empty cell is codepoint 0).
    Codepoint = 0,
    /// A codepoint plus extra codepoints in the page's grapheme map.
    CodepointGrapheme = 1,
    /// No text; background color from the 256-color palette.
    BgColorPalette = 2,
    /// No text; background color as 24-bit RGB.
    BgColorRgb = 3,
}

impl ContentTag {
    fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            0 => Self::Codepoint,
            1 => Self::CodepointGrapheme,
            2 => Self::BgColorPalette,
            _ => Self::BgColorRgb,
        }
    }
}

/// Width class of a cell.
///
/// Wide characters occupy two cells: the wide cell itself followed by a
/// `SpacerTail`. When a wide character would straddle a soft-wrap boundary,
/// a `SpacerHead` fills the otherwise-wasted final cell of the first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Wide {
    #[default]
    Narrow = 0,
    Wide = 1,
    SpacerTail = 2,
    SpacerHead = 3,
}

impl Wide {
    fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            0 => Self::Narrow,
            1 => Self::Wide,
            2 => Self::SpacerTail,
            _ => Self::SpacerHead,
        }
    }

    /// Width class for a character about to be written.
    pub fn from_char(ch: char) -> Self {
        if UnicodeWidthChar::width(ch).unwrap_or(1) >= 2 {
            Self::Wide
        } else {
            Self::Narrow
        }
    }
}

/// Shell-reported row classification (set via OSC sequences upstream).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SemanticPrompt {
    #[default]
    Unknown = 0,
    Prompt = 1,
    PromptContinuation = 2,
    Input = 3,
    Command = 4,
}

impl SemanticPrompt {
    fn from_bits(bits: u64) -> Self {
        match bits & 0b111 {
            1 => Self::Prompt,
            2 => Self::PromptContinuation,
            3 => Self::Input,
            4 => Self::Command,
            _ => Self::Unknown,
        }
    }

    /// Whether `delta_prompt` scrolling treats this row as a prompt stop.
    pub fn is_prompt(self) -> bool {
        matches!(self, Self::Prompt | Self::PromptContinuation | Self::Input)
    }
}

/// A 32-bit tagged color: unset, a 256-color palette index, or 24-bit RGB.
///
/// Used by [`crate::style::Style`]; packed so styles are plain bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct PackedColor(u32);

const COLOR_TAG_SHIFT: u32 = 30;
const COLOR_TAG_PALETTE: u32 = 1;
const COLOR_TAG_RGB: u32 = 2;

impl PackedColor {
    /// The unset color (terminal default).
    pub const NONE: Self = Self(0);

    /// A 256-color palette index.
    pub fn palette(index: u8) -> Self {
        Self((COLOR_TAG_PALETTE << COLOR_TAG_SHIFT) | u32::from(index))
    }

    /// A 24-bit RGB color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(
            (COLOR_TAG_RGB << COLOR_TAG_SHIFT)
                | (u32::from(r) << 16)
                | (u32::from(g) << 8)
                | u32::from(b),
        )
    }

    /// Whether this is the unset color.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

// --- Cell -------------------------------------------------------------------

const CELL_CONTENT_MASK: u64 = 0xFFFF_FFFF;
const CELL_STYLE_SHIFT: u64 = 32;
const CELL_STYLE_MASK: u64 = 0xFFFF;
const CELL_WIDE_SHIFT: u64 = 48;
const CELL_PROTECTED_BIT: u64 = 1 << 50;
const CELL_TAG_SHIFT: u64 = 51;

/// One character position, packed into 64 bits.
///
/// | bits   | field                                             |
/// |--------|---------------------------------------------------|
/// | 0..32  | content: codepoint, palette index, or RGB         |
/// | 32..48 | style id (0 = default, no lookup needed)          |
/// | 48..50 | width class ([`Wide`])                            |
/// | 50     | protected (DECSCA)                                |
/// | 51..53 | content tag ([`ContentTag`])                      |
///
/// The all-zero value is the empty cell: codepoint 0, default style,
/// narrow. Pages are zero-initialized, so untouched cells are empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct Cell(u64);

impl Cell {
    /// An empty cell (codepoint 0, default style, narrow).
    pub const EMPTY: Self = Self(0);

    /// A cell holding a single codepoint with default style.
    pub fn new(cp: u32) -> Self {
        let mut cell = Self::EMPTY;
        cell.set_codepoint(cp);
        cell
    }

    /// A cell for the given character, with the width class derived from
    /// its Unicode width.
    pub fn from_char(ch: char) -> Self {
        let mut cell = Self::new(ch as u32);
        cell.set_wide(Wide::from_char(ch));
        cell
    }

    /// Raw 64-bit value (for bulk copies and equality in tests).
    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn content_tag(self) -> ContentTag {
        ContentTag::from_bits(self.0 >> CELL_TAG_SHIFT)
    }

    /// The codepoint, for `Codepoint`/`CodepointGrapheme` cells.
    pub fn codepoint(self) -> u32 {
        (self.0 & CELL_CONTENT_MASK) as u32
    }

    /// Store a codepoint and tag the cell `Codepoint`.
    pub fn set_codepoint(&mut self, cp: u32) {
        self.0 &= !(CELL_CONTENT_MASK | (0b11 << CELL_TAG_SHIFT));
        self.0 |= u64::from(cp) & CELL_CONTENT_MASK;
    }

    /// Tag the cell as having extra codepoints in the page grapheme map.
    ///
    /// The page's grapheme routines call this; the flag must never be set
    /// without a matching map entry.
    pub(crate) fn set_has_grapheme(&mut self, has: bool) {
        let tag = if has {
            ContentTag::CodepointGrapheme
        } else {
            ContentTag::Codepoint
        };
        self.0 &= !(0b11 << CELL_TAG_SHIFT);
        self.0 |= (tag as u64) << CELL_TAG_SHIFT;
    }

    pub fn has_grapheme(self) -> bool {
        self.content_tag() == ContentTag::CodepointGrapheme
    }

    /// Replace the content with a palette background color.
    pub fn set_bg_palette(&mut self, index: u8) {
        self.0 &= !(CELL_CONTENT_MASK | (0b11 << CELL_TAG_SHIFT));
        self.0 |= u64::from(index);
        self.0 |= (ContentTag::BgColorPalette as u64) << CELL_TAG_SHIFT;
    }

    /// Replace the content with an RGB background color.
    pub fn set_bg_rgb(&mut self, r: u8, g: u8, b: u8) {
        self.0 &= !(CELL_CONTENT_MASK | (0b11 << CELL_TAG_SHIFT));
        self.0 |= (u64::from(r) << 16) | (u64::from(g) << 8) | u64::from(b);
        self.0 |= (ContentTag::BgColorRgb as u64) << CELL_TAG_SHIFT;
    }

    /// Palette index, for `BgColorPalette` cells.
    pub fn bg_palette(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// RGB triple, for `BgColorRgb` cells.
    pub fn bg_rgb(self) -> (u8, u8, u8) {
        let v = (self.0 & CELL_CONTENT_MASK) as u32;
        ((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    pub fn style_id(self) -> u16 {
        ((self.0 >> CELL_STYLE_SHIFT) & CELL_STYLE_MASK) as u16
    }

    pub fn set_style_id(&mut self, id: u16) {
        self.0 &= !(CELL_STYLE_MASK << CELL_STYLE_SHIFT);
        self.0 |= u64::from(id) << CELL_STYLE_SHIFT;
    }

    pub fn wide(self) -> Wide {
        Wide::from_bits(self.0 >> CELL_WIDE_SHIFT)
    }

    pub fn set_wide(&mut self, wide: Wide) {
        self.0 &= !(0b11 << CELL_WIDE_SHIFT);
        self.0 |= (wide as u64) << CELL_WIDE_SHIFT;
    }

    pub fn protected(self) -> bool {
        self.0 & CELL_PROTECTED_BIT != 0
    }

    pub fn set_protected(&mut self, protected: bool) {
        if protected {
            self.0 |= CELL_PROTECTED_BIT;
        } else {
            self.0 &= !CELL_PROTECTED_BIT;
        }
    }

    /// Whether the cell displays nothing: no codepoint and no background
    /// content. Spacers count as content (they shadow a wide char).
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether the cell contributes to a row's visible length.
    ///
    /// Reflow trims trailing cells for which this is false.
    pub fn has_content(self) -> bool {
        match self.content_tag() {
            ContentTag::Codepoint | ContentTag::CodepointGrapheme => {
                self.codepoint() != 0 || self.wide() != Wide::Narrow
            }
            ContentTag::BgColorPalette | ContentTag::BgColorRgb => true,
        }
    }

    /// Whether this cell needs per-cell bookkeeping when copied between
    /// pages (grapheme map entry or style ref count).
    pub fn has_extra(self) -> bool {
        self.has_grapheme() || self.style_id() != 0
    }
}

// --- Row --------------------------------------------------------------------

const ROW_CELLS_MASK: u64 = 0xFFFF_FFFF;
const ROW_WRAP_BIT: u64 = 1 << 32;
const ROW_WRAP_CONT_BIT: u64 = 1 << 33;
const ROW_GRAPHEME_BIT: u64 = 1 << 34;
const ROW_STYLED_BIT: u64 = 1 << 35;
const ROW_PROMPT_SHIFT: u64 = 36;
const ROW_PROMPT_MASK: u64 = 0b111;

/// A row header, packed into 64 bits.
///
/// | bits   | field                                                    |
/// |--------|----------------------------------------------------------|
/// | 0..32  | offset of the row's first cell in the page cells array   |
/// | 32     | wrap: the row soft-wraps into the next row               |
/// | 33     | wrap continuation: the row continues a wrapped line      |
/// | 34     | grapheme: some cell may hold extra codepoints            |
/// | 35     | styled: some cell may hold a non-default style           |
/// | 36..39 | semantic prompt ([`SemanticPrompt`])                     |
///
/// `grapheme` and `styled` are conservative: clearing the last grapheme or
/// styled cell may leave them set, but they are never false while such a
/// cell remains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct Row(u64);

impl Row {
    /// A row header pointing at the given cell offset, all flags clear.
    pub fn new(cells_offset: u32) -> Self {
        Self(u64::from(cells_offset))
    }

    /// Offset of this row's first cell in the page cells array.
    pub fn cells_offset(self) -> u32 {
        (self.0 & ROW_CELLS_MASK) as u32
    }

    pub fn set_cells_offset(&mut self, offset: u32) {
        self.0 &= !ROW_CELLS_MASK;
        self.0 |= u64::from(offset);
    }

    pub fn wrap(self) -> bool {
        self.0 & ROW_WRAP_BIT != 0
    }

    pub fn set_wrap(&mut self, wrap: bool) {
        if wrap {
            self.0 |= ROW_WRAP_BIT;
        } else {
            self.0 &= !ROW_WRAP_BIT;
        }
    }

    pub fn wrap_continuation(self) -> bool {
        self.0 & ROW_WRAP_CONT_BIT != 0
    }

    pub fn set_wrap_continuation(&mut self, cont: bool) {
        if cont {
            self.0 |= ROW_WRAP_CONT_BIT;
        } else {
            self.0 &= !ROW_WRAP_CONT_BIT;
        }
    }

    pub fn grapheme(self) -> bool {
        self.0 & ROW_GRAPHEME_BIT != 0
    }

    pub fn set_grapheme(&mut self, grapheme: bool) {
        if grapheme {
            self.0 |= ROW_GRAPHEME_BIT;
        } else {
            self.0 &= !ROW_GRAPHEME_BIT;
        }
    }

    pub fn styled(self) -> bool {
        self.0 & ROW_STYLED_BIT != 0
    }

    pub fn set_styled(&mut self, styled: bool) {
        if styled {
            self.0 |= ROW_STYLED_BIT;
        } else {
            self.0 &= !ROW_STYLED_BIT;
        }
    }

    pub fn semantic_prompt(self) -> SemanticPrompt {
        SemanticPrompt::from_bits(self.0 >> ROW_PROMPT_SHIFT)
    }

    pub fn set_semantic_prompt(&mut self, prompt: SemanticPrompt) {
        self.0 &= !(ROW_PROMPT_MASK << ROW_PROMPT_SHIFT);
        self.0 |= (prompt as u64) << ROW_PROMPT_SHIFT;
    }

    /// Reset every flag, keeping the cell offset.
    pub fn clear_flags(&mut self) {
        self.0 &= ROW_CELLS_MASK;
    }

    /// Copy every flag (not the cell offset) from another row header.
    pub fn copy_flags_from(&mut self, other: Row) {
        self.0 = (self.0 & ROW_CELLS_MASK) | (other.0 & !ROW_CELLS_MASK);
    }
}
