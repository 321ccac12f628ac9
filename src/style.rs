//! Interned cell styles.
//!
//! A [`Style`] is the full display attribute set of a cell: colors plus SGR
//! flags. Cells do not store styles inline; they carry a 16-bit id into the
//! page's [`StyleSet`], a ref-counted interning table keyed by content hash.
//! Id 0 is the default style and never hits the table.
//!
//! The set's storage (records, ref counts, id lookup table) lives inside
//! the page buffer as plain arrays, so it relocates with the page.
//! [`StyleSet`] is a short-lived view over those regions.

use std::hash::Hasher;

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHasher;

use crate::cell::PackedColor;
use crate::error::{Error, Result};

bitflags! {
    /// SGR attribute flags carried by a [`Style`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StyleFlags: u16 {
        const BOLD              = 1 << 0;
        const FAINT             = 1 << 1;
        const ITALIC            = 1 << 2;
        const BLINK             = 1 << 3;
        const INVERSE           = 1 << 4;
        const INVISIBLE         = 1 << 5;
        const STRIKETHROUGH     = 1 << 6;
        const OVERLINE          = 1 << 7;
        const UNDERLINE         = 1 << 8;
        const DOUBLE_UNDERLINE  = 1 << 9;
        const CURLY_UNDERLINE   = 1 << 10;
        const DOTTED_UNDERLINE  = 1 << 11;
        const DASHED_UNDERLINE  = 1 << 12;
    }
}

/// The display attributes of a cell, 16 bytes of plain data.
///
/// The zero value is the default style; it is never interned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Style {
    pub fg: PackedColor,
    pub bg: PackedColor,
    pub underline_color: PackedColor,
    flags_bits: u16,
    _pad: u16,
}

impl Style {
    pub fn new(fg: PackedColor, bg: PackedColor, flags: StyleFlags) -> Self {
        Self {
            fg,
            bg,
            underline_color: PackedColor::NONE,
            flags_bits: flags.bits(),
            _pad: 0,
        }
    }

    pub fn flags(&self) -> StyleFlags {
        StyleFlags::from_bits_truncate(self.flags_bits)
    }

    pub fn set_flags(&mut self, flags: StyleFlags) {
        self.flags_bits = flags.bits();
    }

    /// Whether this is the default style (id 0, never interned).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    fn content_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(bytemuck::bytes_of(self));
        hasher.finish()
    }
}

/// Bookkeeping header stored in front of the style regions.
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
pub struct StyleSetHeader {
    /// Number of live (ref count > 0) interned styles.
    pub len: u32,
    /// Tombstoned lookup-table slots awaiting a rehash.
    pub tombstones: u32,
}

/// Lookup-table slot markers. Live slots hold a style id (1-based).
const SLOT_EMPTY: u16 = 0;
const SLOT_TOMBSTONE: u16 = u16::MAX;

/// Mutable view over a page's style regions.
///
/// Constructed per operation by [`crate::page::Page`]; holds no state of
/// its own. `records[0]` is reserved for the implicit default style.
pub struct StyleSet<'a> {
    pub header: &'a mut StyleSetHeader,
    pub records: &'a mut [Style],
    pub refs: &'a mut [u32],
    /// Open-addressing id table, power-of-two length.
    pub table: &'a mut [u16],
}

impl StyleSet<'_> {
    /// Number of interned styles (excluding the default).
    pub fn len(&self) -> usize {
        self.header.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.header.len == 0
    }

    /// Interning capacity (excluding the reserved default slot).
    pub fn capacity(&self) -> usize {
        self.records.len() - 1
    }

    /// Intern a style, returning its id. An existing match gains a
    /// reference; a new style takes a free slot with ref count 1.
    ///
    /// Fails with `OutOfMemory` when every slot is live; the page list
    /// recovers by growing the page's style capacity.
    pub fn upsert(&mut self, style: Style) -> Result<u16> {
        if style.is_default() {
            return Ok(0);
        }
        self.maybe_rehash();

        let mask = self.table.len() - 1;
        let mut pos = style.content_hash() as usize & mask;
        let mut insert_at = None;
        loop {
            match self.table[pos] {
                SLOT_EMPTY => {
                    let pos = insert_at.unwrap_or(pos);
                    return self.insert_new(style, pos);
                }
                SLOT_TOMBSTONE => {
                    // Remember the first reusable slot but keep probing:
                    // the style may exist further down the chain.
                    insert_at.get_or_insert(pos);
                }
                id => {
                    if self.records[id as usize] == style {
                        self.refs[id as usize] += 1;
                        return Ok(id);
                    }
                }
            }
            pos = (pos + 1) & mask;
        }
    }

    /// Add a reference to an already-interned style.
    pub fn use_id(&mut self, id: u16) {
        debug_assert_ne!(id, 0, "default style is not ref counted");
        debug_assert!(self.refs[id as usize] > 0, "use_id on dead style {id}");
        self.refs[id as usize] += 1;
    }

    /// Drop a reference; the last reference frees the slot.
    pub fn release(&mut self, id: u16) {
        if id == 0 {
            return;
        }
        let slot = id as usize;
        debug_assert!(self.refs[slot] > 0, "release on dead style {id}");
        self.refs[slot] -= 1;
        if self.refs[slot] > 0 {
            return;
        }

        // Tombstone the table entry before zeroing the record; the probe
        // needs the record's hash.
        let mask = self.table.len() - 1;
        let mut pos = self.records[slot].content_hash() as usize & mask;
        loop {
            match self.table[pos] {
                SLOT_EMPTY => {
                    debug_assert!(false, "style {id} missing from lookup table");
                    break;
                }
                entry if entry == id => {
                    self.table[pos] = SLOT_TOMBSTONE;
                    self.header.tombstones += 1;
                    break;
                }
                _ => pos = (pos + 1) & mask,
            }
        }

        self.records[slot] = Style::default();
        self.header.len -= 1;
    }

    /// The style for an id. Id 0 returns the default style.
    pub fn lookup(&self, id: u16) -> Style {
        self.records[id as usize]
    }

    /// Ref count for an id (0 for free slots).
    pub fn ref_count(&self, id: u16) -> u32 {
        self.refs[id as usize]
    }

    /// Live `(id, style, refs)` triples, for capacity adjustment and
    /// integrity checks.
    pub fn iter_live(&self) -> impl Iterator<Item = (u16, Style, u32)> + '_ {
        (1..self.records.len()).filter_map(move |slot| {
            let refs = self.refs[slot];
            (refs > 0).then(|| (slot as u16, self.records[slot], refs))
        })
    }

    fn insert_new(&mut self, style: Style, pos: usize) -> Result<u16> {
        // Free record slots have ref count 0; slot 0 is reserved.
        let slot = (1..self.records.len())
            .find(|&slot| self.refs[slot] == 0)
            .ok_or(Error::OutOfMemory)?;

        if self.table[pos] == SLOT_TOMBSTONE {
            self.header.tombstones -= 1;
        }
        self.table[pos] = slot as u16;
        self.records[slot] = style;
        self.refs[slot] = 1;
        self.header.len += 1;
        Ok(slot as u16)
    }

    /// Rebuild the lookup table once tombstones dominate probe chains.
    fn maybe_rehash(&mut self) {
        if (self.header.tombstones as usize) <= self.table.len() / 4 {
            return;
        }
        self.table.fill(SLOT_EMPTY);
        self.header.tombstones = 0;

        let mask = self.table.len() - 1;
        for slot in 1..self.records.len() {
            if self.refs[slot] == 0 {
                continue;
            }
            let mut pos = self.records[slot].content_hash() as usize & mask;
            while self.table[pos] != SLOT_EMPTY {
                pos = (pos + 1) & mask;
            }
            self.table[pos] = slot as u16;
        }
    }
}
