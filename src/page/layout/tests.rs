use crate::page::layout::OS_PAGE_SIZE;

use super::Capacity;

#[test]
fn total_is_os_page_multiple() {
    for cap in [
        Capacity::STANDARD,
        Capacity { cols: 80, rows: 24, styles: 16, grapheme_bytes: 256 },
        Capacity { cols: 1000, rows: 4, styles: 16, grapheme_bytes: 256 },
    ] {
        let layout = cap.layout();
        assert_eq!(layout.total_bytes % OS_PAGE_SIZE, 0, "{cap:?}");
        assert!(layout.content_words <= layout.total_words);
    }
}

#[test]
fn regions_are_ordered_and_disjoint() {
    let l = Capacity::STANDARD.layout();
    let bounds = [
        l.rows_start,
        l.cells_start,
        l.style_header,
        l.style_records_start,
        l.style_refs_start,
        l.style_table_start,
        l.grapheme_bitmap_start,
        l.grapheme_chunks_start,
        l.grapheme_map_header,
        l.grapheme_map_start,
        l.content_words,
    ];
    for pair in bounds.windows(2) {
        assert!(pair[0] < pair[1], "region bounds must ascend: {bounds:?}");
    }
}

#[test]
fn table_sizes_are_powers_of_two() {
    let l = Capacity::STANDARD.layout();
    assert!(l.style_table_len.is_power_of_two());
    assert!(l.grapheme_map_len.is_power_of_two());
    // Enough headroom for every possible entry.
    assert!(l.style_table_len >= 2 * Capacity::STANDARD.styles as usize);
    assert!(l.grapheme_map_len >= 2 * l.grapheme_chunks);
}

#[test]
fn adjust_keeps_total_size() {
    let cap = Capacity::STANDARD;
    let total = cap.layout().total_bytes;

    for new_cols in [1u16, 2, 80, 215, 400, 1000] {
        let adjusted = cap.adjust(new_cols).unwrap();
        assert_eq!(adjusted.cols, new_cols);
        assert!(adjusted.rows > 0);
        assert!(
            adjusted.layout().total_bytes <= total,
            "adjusted layout for cols={new_cols} must fit the original buffer"
        );
        assert_eq!(adjusted.styles, cap.styles);
        assert_eq!(adjusted.grapheme_bytes, cap.grapheme_bytes);
    }
}

#[test]
fn adjust_trades_cols_for_rows() {
    let cap = Capacity::STANDARD;
    let narrow = cap.adjust(10).unwrap();
    let wide = cap.adjust(430).unwrap();
    assert!(narrow.rows > cap.rows);
    assert!(wide.rows < cap.rows);
}

#[test]
fn adjust_fails_when_no_row_fits() {
    let tiny = Capacity { cols: 4, rows: 1, styles: 8, grapheme_bytes: 64 };
    // A column count far beyond the buffer's word count leaves no room.
    let huge_cols = (tiny.layout().total_words + 1).min(u16::MAX as usize) as u16;
    assert!(tiny.adjust(huge_cols).is_err());
}

#[test]
fn standard_capacity_shape() {
    let cap = Capacity::STANDARD;
    assert_eq!(cap.cols, 215);
    assert_eq!(cap.rows, 215);
    assert_eq!(cap.styles, 128);
    assert_eq!(cap.grapheme_bytes, 8192);
}
