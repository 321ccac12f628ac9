//! Error types for page and page-list operations.

use thiserror::Error;

/// Result type alias for fallible storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for page and page-list operations.
///
/// Allocation failures in the style and grapheme paths are normally
/// recovered internally by growing the page capacity; an `OutOfMemory`
/// that escapes to the caller is unrecoverable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A page, style slot, or grapheme chunk could not be allocated.
    #[error("out of memory")]
    OutOfMemory,
}

/// Violation found by [`crate::page::Page::verify_integrity`].
///
/// Each variant pins one invariant so tests can assert the exact failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("page has zero rows")]
    ZeroRowCount,
    #[error("page has zero cols")]
    ZeroColCount,
    #[error("row {y} contains grapheme cells but is not marked")]
    UnmarkedGraphemeRow { y: u16 },
    #[error("cell ({x}, {y}) is tagged grapheme but has no map entry")]
    MissingGraphemeData { x: u16, y: u16 },
    #[error("page grapheme count does not match map entries")]
    InvalidGraphemeCount,
    #[error("cell ({x}, {y}) references missing style {id}")]
    MissingStyle { x: u16, y: u16, id: u16 },
    #[error("row {y} contains styled cells but is not marked")]
    UnmarkedStyleRow { y: u16 },
    #[error("style {id} ref count {refs} is below the {cells} observed cells")]
    MismatchedStyleRef { id: u16, refs: u32, cells: u32 },
    #[error("page style count does not match live styles")]
    InvalidStyleCount,
    #[error("spacer tail at ({x}, {y}) does not follow a wide cell")]
    InvalidSpacerTailLocation { x: u16, y: u16 },
    #[error("spacer head at ({x}, {y}) is not at the last column")]
    InvalidSpacerHeadLocation { x: u16, y: u16 },
    #[error("spacer head at ({x}, {y}) is on an unwrapped row")]
    UnwrappedSpacerHead { x: u16, y: u16 },
}
