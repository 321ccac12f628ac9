//! Tagged grid coordinates.
//!
//! A [`Point`] names a cell relative to one of four reference frames
//! ([`Tag`]): the whole screen including scrollback, the scrollback alone,
//! the active area, or the viewport. Points are what callers hand to the
//! page list; the list resolves them to concrete page/row/column positions.

use std::cmp::Ordering;
use std::fmt;

/// Reference frame for a [`Point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tag {
    /// Absolute, from the top of the entire page list.
    Screen,
    /// Scrollback only: row 0 is the oldest stored row. Empty when the
    /// list holds nothing above the active area.
    History,
    /// Relative to the active area's top-left.
    #[default]
    Active,
    /// Relative to the viewport's top-left.
    Viewport,
}

/// A grid coordinate relative to a [`Tag`] frame.
///
/// `y` grows downward and is unbounded (scrollback can hold far more rows
/// than one frame); `x` is a column within the uniform list width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub tag: Tag,
    pub x: u16,
    pub y: usize,
}

impl Point {
    /// A point in the [`Tag::Screen`] frame.
    pub fn screen(x: u16, y: usize) -> Self {
        Self { tag: Tag::Screen, x, y }
    }

    /// A point in the [`Tag::History`] frame.
    pub fn history(x: u16, y: usize) -> Self {
        Self { tag: Tag::History, x, y }
    }

    /// A point in the [`Tag::Active`] frame.
    pub fn active(x: u16, y: usize) -> Self {
        Self { tag: Tag::Active, x, y }
    }

    /// A point in the [`Tag::Viewport`] frame.
    pub fn viewport(x: u16, y: usize) -> Self {
        Self { tag: Tag::Viewport, x, y }
    }

    /// Row-major ordering of the coordinates, ignoring the tag.
    ///
    /// Only meaningful for two points in the same frame; the page list
    /// compares resolved (screen-frame) points.
    pub fn cmp_coord(&self, other: &Self) -> Ordering {
        match self.y.cmp(&other.y) {
            Ordering::Equal => self.x.cmp(&other.x),
            ord => ord,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({}, {})", self.tag, self.x, self.y)
    }
}

/// Traversal direction for page, row, and cell iterators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Top-left toward bottom-right.
    RightDown,
    /// Bottom-right toward top-left.
    LeftUp,
}
