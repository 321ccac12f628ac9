use crate::cell::{Cell, SemanticPrompt, Wide};
use crate::pagelist::{Cursor, PageList, ResizeOptions};
use crate::point::{Point, Tag};
use crate::style::{Style, StyleFlags};
use crate::PackedColor;

fn list(cols: u16, rows: u16) -> PageList {
    PageList::new(cols, rows, None).unwrap()
}

/// Write a run of narrow characters starting at a point, handling wide
/// characters the way a VT writer would (wide cell + spacer tail).
fn write_text(list: &mut PageList, pt: Point, text: &str) {
    let mut x = pt.x;
    for ch in text.chars() {
        let pin = list.pin(Point { x, ..pt }).expect("in range");
        let wide = Cell::from_char(ch).wide();
        let page = list.page_mut(pin.page);
        let (_, cell) = page.row_and_cell_mut(pin.x, pin.y);
        *cell = Cell::from_char(ch);
        x += 1;
        if wide == Wide::Wide {
            let (_, tail) = page.row_and_cell_mut(pin.x + 1, pin.y);
            *tail = Cell::EMPTY;
            tail.set_wide(Wide::SpacerTail);
            x += 1;
        }
    }
}

fn row_text(list: &PageList, y: usize) -> String {
    (0..list.cols())
        .map(|x| {
            let cell = list.get_cell(Point::screen(x, y)).unwrap();
            match cell.codepoint() {
                0 => ' ',
                cp => char::from_u32(cp).unwrap(),
            }
        })
        .collect()
}

fn set_wrap(list: &mut PageList, y: usize, wrap: bool, continuation: bool) {
    let pin = list.pin(Point::screen(0, y)).unwrap();
    let row = list.page_mut(pin.page).row_mut(pin.y);
    row.set_wrap(wrap);
    row.set_wrap_continuation(continuation);
}

fn reflow(list: &mut PageList, cols: u16) {
    list.resize(ResizeOptions { cols: Some(cols), rows: None, reflow: true, cursor: None })
        .unwrap();
}

#[test]
fn grow_cols_unwraps_a_wrapped_line() {
    let mut list = list(2, 4);
    write_text(&mut list, Point::active(0, 0), "AB");
    set_wrap(&mut list, 0, true, false);
    write_text(&mut list, Point::active(0, 1), "CD");
    set_wrap(&mut list, 1, false, true);

    reflow(&mut list, 4);

    assert_eq!(list.total_rows(), 4);
    assert_eq!(row_text(&list, 0), "ABCD");
    let first = list.pin(Point::screen(0, 0)).unwrap();
    let row = list.page(first.page).row(first.y);
    assert!(!row.wrap());
    assert!(!row.wrap_continuation());
    assert_eq!(row_text(&list, 1), "    ");
}

#[test]
fn shrink_cols_wraps_and_preserves_cursor() {
    let mut list = list(5, 10);
    write_text(&mut list, Point::active(0, 5), "01234");
    let pin_id = list.track_pin(list.pin(Point::active(2, 5)).unwrap());

    let cursor = list
        .resize(ResizeOptions {
            cols: Some(4),
            rows: None,
            reflow: true,
            cursor: Some(Cursor { x: 2, y: 5 }),
        })
        .unwrap()
        .unwrap();

    assert_eq!(row_text(&list, 5), "0123");
    assert_eq!(row_text(&list, 6), "4   ");
    let r5 = list.pin(Point::screen(0, 5)).unwrap();
    assert!(list.page(r5.page).row(r5.y).wrap());
    let r6 = list.pin(Point::screen(0, 6)).unwrap();
    assert!(list.page(r6.page).row(r6.y).wrap_continuation());

    // The pin and cursor stay on the character they sat on: '2'.
    let pin = list.pin_get(pin_id).unwrap();
    let pt = list.point_from_pin(Tag::Active, pin).unwrap();
    assert_eq!(
        list.get_cell(pt).unwrap().codepoint(),
        '2' as u32,
        "pin still displays its character"
    );
    assert_eq!(cursor, Cursor { x: pt.x, y: pt.y as u16 });

    // The cursor kept its count of rows below it in the active area.
    assert_eq!(list.rows() - 1 - cursor.y, 4);
}

#[test]
fn shrink_through_wide_char_inserts_spacer_head() {
    let mut list = list(4, 4);
    write_text(&mut list, Point::active(0, 0), "ab好");

    reflow(&mut list, 3);

    // "ab" + spacer head on the first row; the wide pair wraps.
    let r0 = list.pin(Point::screen(0, 0)).unwrap();
    let page = list.page(r0.page);
    assert_eq!(page.cell(0, r0.y).codepoint(), 'a' as u32);
    assert_eq!(page.cell(1, r0.y).codepoint(), 'b' as u32);
    assert_eq!(page.cell(2, r0.y).wide(), Wide::SpacerHead);
    assert!(page.row(r0.y).wrap());

    let r1 = list.pin(Point::screen(0, 1)).unwrap();
    let page = list.page(r1.page);
    assert_eq!(page.cell(0, r1.y).codepoint(), '好' as u32);
    assert_eq!(page.cell(0, r1.y).wide(), Wide::Wide);
    assert_eq!(page.cell(1, r1.y).wide(), Wide::SpacerTail);
    assert!(page.row(r1.y).wrap_continuation());
    page.verify_integrity().unwrap();
}

#[test]
fn grow_cols_demotes_unneeded_spacer_head() {
    let mut list = list(3, 4);
    write_text(&mut list, Point::active(0, 0), "ab");
    {
        let pin = list.pin(Point::active(2, 0)).unwrap();
        let page = list.page_mut(pin.page);
        let (row, cell) = page.row_and_cell_mut(2, pin.y);
        cell.set_wide(Wide::SpacerHead);
        row.set_wrap(true);
    }
    write_text(&mut list, Point::active(0, 1), "好");
    set_wrap(&mut list, 1, false, true);

    reflow(&mut list, 6);

    // One row: "ab" + wide pair, no spacer head anywhere.
    let r0 = list.pin(Point::screen(0, 0)).unwrap();
    let page = list.page(r0.page);
    assert_eq!(page.cell(0, r0.y).codepoint(), 'a' as u32);
    assert_eq!(page.cell(1, r0.y).codepoint(), 'b' as u32);
    assert_eq!(page.cell(2, r0.y).codepoint(), '好' as u32);
    assert_eq!(page.cell(2, r0.y).wide(), Wide::Wide);
    assert_eq!(page.cell(3, r0.y).wide(), Wide::SpacerTail);
    assert!(!page.row(r0.y).wrap());
    page.verify_integrity().unwrap();
}

#[test]
fn reflow_to_one_col_degrades_wide_chars() {
    let mut list = list(2, 2);
    write_text(&mut list, Point::active(0, 0), "好");

    reflow(&mut list, 1);

    // A single narrow blank; the tail is dropped.
    let cell = list.get_cell(Point::active(0, 0)).unwrap();
    assert_eq!(cell.wide(), Wide::Narrow);
    assert_eq!(cell.codepoint(), 0);
    for y in 0..list.total_rows() {
        let pin = list.pin(Point::screen(0, y)).unwrap();
        for x in 0..1 {
            assert_ne!(list.page(pin.page).cell(x, pin.y).wide(), Wide::SpacerTail);
        }
    }
}

#[test]
fn reflow_carries_styles_and_graphemes() {
    let mut list = list(4, 4);
    let style = Style::new(PackedColor::rgb(9, 9, 9), PackedColor::NONE, StyleFlags::ITALIC);
    {
        let pin = list.pin(Point::active(0, 0)).unwrap();
        let id = list.page_mut(pin.page).style_upsert(style).unwrap();
        let page = list.page_mut(pin.page);
        let (row, cell) = page.row_and_cell_mut(0, pin.y);
        *cell = Cell::from_char('e');
        cell.set_style_id(id);
        row.set_styled(true);
        page.append_grapheme(0, pin.y, 0x0301).unwrap();
        write_text(&mut list, Point::active(1, 0), "xyz");
    }

    reflow(&mut list, 2);

    // 'e' with its accent and style survives at the same logical spot.
    let pin = list.pin(Point::screen(0, 0)).unwrap();
    let page = list.page(pin.page);
    let cell = page.cell(0, pin.y);
    assert_eq!(cell.codepoint(), 'e' as u32);
    assert!(cell.has_grapheme());
    assert_eq!(page.lookup_grapheme(0, pin.y).unwrap(), &[0x0301]);
    assert_ne!(cell.style_id(), 0);
    assert_eq!(page.style_lookup(cell.style_id()), style);
    page.verify_integrity().unwrap();

    // Line re-wrapped: "ex" / "yz".
    assert_eq!(row_text(&list, 0), "ex");
    assert_eq!(row_text(&list, 1), "yz");
}

#[test]
fn interior_blank_rows_are_preserved() {
    let mut list = list(6, 6);
    write_text(&mut list, Point::active(0, 0), "top");
    write_text(&mut list, Point::active(0, 3), "mid");

    reflow(&mut list, 8);

    assert_eq!(row_text(&list, 0).trim_end(), "top");
    assert_eq!(row_text(&list, 1).trim_end(), "");
    assert_eq!(row_text(&list, 2).trim_end(), "");
    assert_eq!(row_text(&list, 3).trim_end(), "mid");
}

#[test]
fn pin_on_blank_row_survives_reflow() {
    let mut list = list(6, 6);
    write_text(&mut list, Point::active(0, 0), "a");
    let pin_id = list.track_pin(list.pin(Point::active(3, 2)).unwrap());

    reflow(&mut list, 4);

    let pin = list.pin_get(pin_id).unwrap();
    let pt = list.point_from_pin(Tag::Active, pin).unwrap();
    assert_eq!(pt.y, 2, "the pinned blank row was not folded away");
    assert!(pin.y < list.page(pin.page).size().rows);
}

#[test]
fn pin_in_trimmed_trailing_blanks_clamps_to_right_edge() {
    let mut list = list(8, 4);
    write_text(&mut list, Point::active(0, 0), "ab");
    let pin_id = list.track_pin(list.pin(Point::active(6, 0)).unwrap());

    reflow(&mut list, 4);

    let pin = list.pin_get(pin_id).unwrap();
    assert_eq!(pin.x, 3, "clamped to the new right edge");
    let pt = list.point_from_pin(Tag::Active, pin).unwrap();
    assert_eq!(pt.y, 0);
}

#[test]
fn wrapped_line_flows_across_page_boundary() {
    let mut list = list(4, 24);
    let per_page = list.page(list.head()).capacity().rows as usize;
    while list.total_rows() < per_page {
        list.grow().unwrap();
    }
    // Last row of the first page wraps into the first row of a second page.
    write_text(&mut list, Point::screen(0, per_page - 1), "abcd");
    set_wrap(&mut list, per_page - 1, true, false);
    list.grow().unwrap();
    write_text(&mut list, Point::screen(0, per_page), "ef");
    set_wrap(&mut list, per_page, false, true);

    reflow(&mut list, 8);

    // The joined line sits where the wrapped line started.
    assert_eq!(row_text(&list, per_page - 1).trim_end(), "abcdef");
    let pin = list.pin(Point::screen(0, per_page - 1)).unwrap();
    assert!(!list.page(pin.page).row(pin.y).wrap());
}

#[test]
fn blank_row_inside_wrapped_line_keeps_the_join() {
    let mut list = list(4, 6);
    write_text(&mut list, Point::active(0, 0), "abcd");
    set_wrap(&mut list, 0, true, false);
    // A continuation row whose cells were cleared: blank, but clearing
    // resets only the grapheme/styled flags, so wrap survives.
    write_text(&mut list, Point::active(0, 1), "xx");
    set_wrap(&mut list, 1, true, true);
    {
        let pin = list.pin(Point::active(0, 1)).unwrap();
        let cols = list.cols();
        list.page_mut(pin.page).clear_cells(pin.y, 0, cols);
    }
    write_text(&mut list, Point::active(0, 2), "ef");
    set_wrap(&mut list, 2, false, true);

    reflow(&mut list, 8);

    // The blank middle segment contributed nothing; the line's remaining
    // segments joined.
    assert_eq!(row_text(&list, 0).trim_end(), "abcdef");
    let pin = list.pin(Point::screen(0, 0)).unwrap();
    assert!(!list.page(pin.page).row(pin.y).wrap());
}

#[test]
fn cleared_wrapped_row_does_not_glue_lines() {
    let mut list = list(4, 6);
    write_text(&mut list, Point::active(0, 0), "wx");
    // A wrapped line whose first row was cleared: the lingering wrap
    // flag must not splice its continuation onto the unrelated line
    // above.
    write_text(&mut list, Point::active(0, 1), "abcd");
    set_wrap(&mut list, 1, true, false);
    {
        let pin = list.pin(Point::active(0, 1)).unwrap();
        let cols = list.cols();
        list.page_mut(pin.page).clear_cells(pin.y, 0, cols);
    }
    write_text(&mut list, Point::active(0, 2), "ef");
    set_wrap(&mut list, 2, false, true);

    reflow(&mut list, 8);

    assert_eq!(row_text(&list, 0).trim_end(), "wx");
    assert_eq!(row_text(&list, 1).trim_end(), "");
    assert_eq!(row_text(&list, 2).trim_end(), "ef");
}

#[test]
fn semantic_prompt_survives_reflow() {
    let mut list = list(6, 4);
    write_text(&mut list, Point::active(0, 1), "$ ls");
    {
        let pin = list.pin(Point::active(0, 1)).unwrap();
        list.page_mut(pin.page).row_mut(pin.y).set_semantic_prompt(SemanticPrompt::Prompt);
    }

    reflow(&mut list, 12);

    let pin = list.pin(Point::screen(0, 1)).unwrap();
    assert_eq!(
        list.page(pin.page).row(pin.y).semantic_prompt(),
        SemanticPrompt::Prompt
    );
}

#[test]
fn reflow_blank_screen_yields_blank_screen() {
    let mut list = list(10, 6);
    reflow(&mut list, 7);
    assert_eq!(list.cols(), 7);
    assert_eq!(list.total_rows(), 6);
    for y in 0..6 {
        assert!(list.get_cell(Point::active(0, y)).unwrap().is_empty());
    }
}

#[test]
fn repeated_reflow_round_trips_content() {
    let mut list = list(8, 6);
    write_text(&mut list, Point::active(0, 0), "hello wo");
    set_wrap(&mut list, 0, true, false);
    write_text(&mut list, Point::active(0, 1), "rld");
    set_wrap(&mut list, 1, false, true);

    reflow(&mut list, 3);
    reflow(&mut list, 8);

    assert_eq!(row_text(&list, 0), "hello wo");
    assert_eq!(row_text(&list, 1).trim_end(), "rld");
}
