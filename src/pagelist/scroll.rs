//! Viewport scrolling.
//!
//! Scrolling only moves the viewport descriptor; it never allocates or
//! touches cell content. A viewport that lands inside the active area
//! collapses to the `Active` tag so it follows new output again.

use super::{PageList, Pin, Viewport};

/// How to move the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Jump to the active area (follow output).
    Active,
    /// Jump to the top of the scrollback.
    Top,
    /// Move by a row delta; negative is up.
    DeltaRow(isize),
    /// Move by a count of prompt rows; negative is up.
    DeltaPrompt(isize),
    /// Jump to a specific pin.
    Pin(Pin),
}

impl PageList {
    /// Move the viewport. Never allocates.
    pub fn scroll(&mut self, behavior: ScrollBehavior) {
        match behavior {
            ScrollBehavior::Active => self.viewport = Viewport::Active,
            ScrollBehavior::Top => self.viewport = Viewport::Top,
            ScrollBehavior::DeltaRow(n) => self.scroll_delta_row(n),
            ScrollBehavior::DeltaPrompt(n) => self.scroll_delta_prompt(n),
            ScrollBehavior::Pin(pin) => self.scroll_to_pin(pin),
        }
    }

    /// Collapse a pinned or top viewport that has drifted into the active
    /// area back to `Active`. Called after erases shrink the list.
    pub(crate) fn collapse_viewport(&mut self) {
        match self.viewport {
            Viewport::Active => {}
            Viewport::Top => {
                if self.scrollback_rows() == 0 {
                    self.viewport = Viewport::Active;
                }
            }
            Viewport::Pinned => {
                if self.pin_in_active(self.viewport_pin()) {
                    self.viewport = Viewport::Active;
                }
            }
        }
    }

    fn scroll_to_pin(&mut self, pin: Pin) {
        if self.pin_in_active(pin) {
            self.viewport = Viewport::Active;
        } else {
            self.set_viewport_pin(pin);
            self.viewport = Viewport::Pinned;
        }
    }

    fn scroll_delta_row(&mut self, n: isize) {
        if n == 0 {
            return;
        }
        let top = self.viewport_top();
        let target = if n < 0 {
            // Saturate at the top of the list.
            self.pin_up(top, n.unsigned_abs())
                .unwrap_or(Pin { page: self.head, x: 0, y: 0 })
        } else {
            match self.pin_down(top, n as usize) {
                Some(pin) => pin,
                None => {
                    self.viewport = Viewport::Active;
                    return;
                }
            }
        };
        self.scroll_to_pin(Pin { x: 0, ..target });
    }

    /// Walk rows in the scroll direction, skipping the current row, and
    /// land on the n-th row whose semantic prompt marks a prompt stop.
    /// Fewer matches than `n` lands on the last match; none leaves the
    /// viewport unchanged.
    fn scroll_delta_prompt(&mut self, n: isize) {
        if n == 0 {
            return;
        }
        let up = n < 0;
        let mut remaining = n.unsigned_abs();
        let mut cur = self.viewport_top();
        let mut found = None;

        loop {
            cur = match if up { self.pin_up(cur, 1) } else { self.pin_down(cur, 1) } {
                Some(pin) => pin,
                None => break,
            };
            // Don't walk below the active top; prompts inside the active
            // area are already visible.
            if !up && self.pin_in_active(cur) {
                break;
            }
            let prompt = self.page(cur.page).row(cur.y).semantic_prompt();
            if prompt.is_prompt() {
                found = Some(cur);
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }

        if let Some(pin) = found {
            self.scroll_to_pin(Pin { x: 0, ..pin });
        }
    }
}
