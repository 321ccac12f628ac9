use crate::cell::Cell;
use crate::pagelist::{PageList, Pin};
use crate::point::{Direction, Point, Tag};

fn list_with_scrollback(cols: u16, rows: u16, grows: usize) -> PageList {
    let mut list = PageList::new(cols, rows, None).unwrap();
    for _ in 0..grows {
        list.grow().unwrap();
    }
    list
}

fn two_page_list() -> PageList {
    let mut list = PageList::new(80, 24, None).unwrap();
    let per_page = list.page(list.head()).capacity().rows as usize;
    while list.total_rows() < per_page + 10 {
        list.grow().unwrap();
    }
    list
}

#[test]
fn single_page_yields_one_chunk() {
    let list = list_with_scrollback(10, 5, 0);
    let chunks: Vec<_> = list
        .page_iterator(Direction::RightDown, Point::screen(0, 0), None)
        .collect();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].start, 0);
    assert_eq!(chunks[0].end, 5);
    assert_eq!(chunks[0].rows(), 5);
}

#[test]
fn chunks_span_pages_with_partial_ends() {
    let list = two_page_list();
    let per_page = list.page(list.head()).capacity().rows;

    // Start mid-first-page, no bound: first chunk is partial, the second
    // covers the tail page's live rows.
    let chunks: Vec<_> = list
        .page_iterator(Direction::RightDown, Point::screen(0, 100), None)
        .collect();
    assert_eq!(chunks.len(), 2);
    assert_eq!((chunks[0].start, chunks[0].end), (100, per_page));
    assert_eq!((chunks[1].start, chunks[1].end), (0, 10));
}

#[test]
fn bounded_chunks_stop_at_the_bound() {
    let list = list_with_scrollback(10, 5, 7); // 12 rows
    let chunks: Vec<_> = list
        .page_iterator(
            Direction::RightDown,
            Point::screen(0, 2),
            Some(Point::screen(0, 8)),
        )
        .collect();
    assert_eq!(chunks.len(), 1);
    assert_eq!((chunks[0].start, chunks[0].end), (2, 9), "bound is inclusive");
}

#[test]
fn left_up_chunks_walk_backward() {
    let list = two_page_list();
    let per_page = list.page(list.head()).capacity().rows;

    let chunks: Vec<_> = list
        .page_iterator(Direction::LeftUp, Point::screen(0, per_page as usize + 5), None)
        .collect();
    assert_eq!(chunks.len(), 2);
    // First chunk: the tail page from its row 5 upward.
    assert_eq!((chunks[0].start, chunks[0].end), (0, 6));
    // Second: the whole first page.
    assert_eq!((chunks[1].start, chunks[1].end), (0, per_page));
}

#[test]
fn active_tag_iterates_only_active_rows() {
    let list = list_with_scrollback(10, 5, 7);
    let total: u16 = list
        .page_iterator(Direction::RightDown, Point::active(0, 0), None)
        .map(|c| c.rows())
        .sum();
    assert_eq!(total, 5);
}

#[test]
fn row_iterator_walks_rows_in_order() {
    let list = list_with_scrollback(10, 5, 7); // 12 rows
    let pins: Vec<Pin> = list
        .row_iterator(Direction::RightDown, Point::screen(0, 0), None)
        .collect();
    assert_eq!(pins.len(), 12);
    for (i, pin) in pins.iter().enumerate() {
        assert_eq!(
            list.point_from_pin(Tag::Screen, *pin).unwrap(),
            Point::screen(0, i)
        );
    }
}

#[test]
fn row_iterator_left_up_reverses() {
    let list = list_with_scrollback(10, 4, 0);
    let ys: Vec<u16> = list
        .row_iterator(Direction::LeftUp, Point::screen(0, 3), None)
        .map(|pin| pin.y)
        .collect();
    assert_eq!(ys, vec![3, 2, 1, 0]);
}

#[test]
fn cell_iterator_wraps_rows() {
    let mut list = PageList::new(3, 2, None).unwrap();
    for (i, pt) in [(0, 0), (1, 0), (2, 0), (0, 1)].iter().enumerate() {
        let pin = list.pin(Point::active(pt.0, pt.1)).unwrap();
        let page = list.page_mut(pin.page);
        let (_, cell) = page.row_and_cell_mut(pin.x, pin.y);
        *cell = Cell::new('a' as u32 + i as u32);
    }

    let cells: Vec<u32> = list
        .cell_iterator(Direction::RightDown, Point::active(1, 0), Some(Point::active(0, 1)))
        .map(|pin| list.page(pin.page).cell(pin.x, pin.y).codepoint())
        .collect();
    assert_eq!(cells, vec!['b' as u32, 'c' as u32, 'a' as u32 + 3]);
}

#[test]
fn cell_iterator_left_up_wraps_to_row_ends() {
    let list = list_with_scrollback(3, 2, 0);
    let pins: Vec<(u16, u16)> = list
        .cell_iterator(Direction::LeftUp, Point::active(1, 1), None)
        .map(|pin| (pin.x, pin.y))
        .collect();
    assert_eq!(pins, vec![(1, 1), (0, 1), (2, 0), (1, 0), (0, 0)]);
}

#[test]
fn iterator_with_out_of_range_start_is_empty() {
    let list = list_with_scrollback(10, 5, 0);
    let count = list
        .page_iterator(Direction::RightDown, Point::history(0, 0), None)
        .count();
    assert_eq!(count, 0, "no scrollback: history frame is empty");
}
