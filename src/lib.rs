//! Paged terminal screen storage.
//!
//! This crate provides the storage engine for a terminal emulator's screen:
//! a doubly-linked list of fixed-capacity pages holding every grid cell of
//! the active area plus scrollback, together with the operations that grow,
//! shrink, scroll, erase, clone, and reflow that storage. It contains no
//! VT parsing, rendering, or platform-specific code.
//!
//! Each page is a single contiguous, relocatable memory block: every
//! internal reference is an offset from the buffer base, so a page can be
//! duplicated or pooled with a plain copy. Tracked positions ("pins") stay
//! valid across every mutation, including column reflow.

#![deny(unsafe_code)]

pub mod bitmap;
pub mod cell;
pub mod error;
pub mod offmap;
pub mod page;
pub mod pagelist;
pub mod point;
pub mod style;

pub use cell::{Cell, ContentTag, PackedColor, Row, SemanticPrompt, Wide};
pub use error::{Error, IntegrityError, Result};
pub use page::{Capacity, Page, Size};
pub use pagelist::{
    AdjustCapacity, CellIter, Chunk, CloneMemory, CloneOptions, Cursor, PageChunkIter, PageId,
    PageList, Pin, PinId, ResizeOptions, RowIter, ScrollBehavior, Viewport,
};
pub use point::{Direction, Point, Tag};
pub use style::{Style, StyleFlags};
