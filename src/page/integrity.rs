//! Exhaustive page validation.
//!
//! O(total cells); intended for debug builds and tests, not hot paths.

use crate::cell::Wide;
use crate::error::IntegrityError;

use super::Page;

impl Page {
    /// Check every cross-region invariant of the page.
    ///
    /// Returns the first violation found, in scan order. A page mid-way
    /// through a multi-step mutation can suspend checks via the internal
    /// pause counter, in which case this returns `Ok` unconditionally.
    pub fn verify_integrity(&self) -> Result<(), IntegrityError> {
        if self.pause_integrity_checks > 0 {
            return Ok(());
        }
        if self.size.rows == 0 {
            return Err(IntegrityError::ZeroRowCount);
        }
        if self.size.cols == 0 {
            return Err(IntegrityError::ZeroColCount);
        }

        let refs = self.style_refs();
        let mut styles_seen = vec![0u32; self.capacity.styles as usize];
        let mut grapheme_cells = 0usize;

        for y in 0..self.size.rows {
            let row = self.row(y);
            for x in 0..self.size.cols {
                let cell = self.cell(x, y);

                if cell.has_grapheme() {
                    if !row.grapheme() {
                        return Err(IntegrityError::UnmarkedGraphemeRow { y });
                    }
                    if self.lookup_grapheme(x, y).is_none() {
                        return Err(IntegrityError::MissingGraphemeData { x, y });
                    }
                    grapheme_cells += 1;
                }

                let id = cell.style_id();
                if id != 0 {
                    if !row.styled() {
                        return Err(IntegrityError::UnmarkedStyleRow { y });
                    }
                    if id >= self.capacity.styles || refs[id as usize] == 0 {
                        return Err(IntegrityError::MissingStyle { x, y, id });
                    }
                    styles_seen[id as usize] += 1;
                }

                match cell.wide() {
                    Wide::SpacerTail => {
                        if x == 0 || self.cell(x - 1, y).wide() != Wide::Wide {
                            return Err(IntegrityError::InvalidSpacerTailLocation { x, y });
                        }
                    }
                    Wide::SpacerHead => {
                        if x != self.size.cols - 1 {
                            return Err(IntegrityError::InvalidSpacerHeadLocation { x, y });
                        }
                        if !row.wrap() {
                            return Err(IntegrityError::UnwrappedSpacerHead { x, y });
                        }
                    }
                    Wide::Narrow | Wide::Wide => {}
                }
            }
        }

        for (id, &seen) in styles_seen.iter().enumerate().skip(1) {
            if seen > refs[id] {
                return Err(IntegrityError::MismatchedStyleRef {
                    id: id as u16,
                    refs: refs[id],
                    cells: seen,
                });
            }
        }
        let live = refs.iter().skip(1).filter(|&&r| r > 0).count();
        if live != self.style_count() {
            return Err(IntegrityError::InvalidStyleCount);
        }

        if grapheme_cells != self.grapheme_count() {
            return Err(IntegrityError::InvalidGraphemeCount);
        }

        Ok(())
    }
}
