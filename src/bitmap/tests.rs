use super::ChunkBitmap;

fn words(chunks: usize) -> Vec<u64> {
    vec![0; ChunkBitmap::words_for(chunks)]
}

#[test]
fn words_for_rounds_up() {
    assert_eq!(ChunkBitmap::words_for(1), 1);
    assert_eq!(ChunkBitmap::words_for(64), 1);
    assert_eq!(ChunkBitmap::words_for(65), 2);
    assert_eq!(ChunkBitmap::words_for(512), 8);
}

#[test]
fn alloc_is_first_fit() {
    let mut w = words(128);
    let mut bm = ChunkBitmap::new(&mut w, 128);

    assert_eq!(bm.alloc(1), Some(0));
    assert_eq!(bm.alloc(3), Some(1));
    assert_eq!(bm.alloc(1), Some(4));
    assert_eq!(bm.allocated_count(), 5);
}

#[test]
fn free_makes_room_for_reuse() {
    let mut w = words(16);
    let mut bm = ChunkBitmap::new(&mut w, 16);

    let a = bm.alloc(4).unwrap();
    let b = bm.alloc(4).unwrap();
    let _c = bm.alloc(4).unwrap();
    bm.free(b, 4);

    // The freed middle run is found before the tail.
    assert_eq!(bm.alloc(2), Some(a + 4));
    assert_eq!(bm.alloc(2), Some(a + 6));
}

#[test]
fn alloc_spans_word_boundary() {
    let mut w = words(128);
    let mut bm = ChunkBitmap::new(&mut w, 128);

    // Fill chunks 0..62, leaving a run that crosses the 64-bit boundary.
    assert_eq!(bm.alloc(62), Some(0));
    assert_eq!(bm.alloc(4), Some(62));
    assert!(bm.is_allocated(63));
    assert!(bm.is_allocated(64));
    assert_eq!(bm.allocated_count(), 66);
}

#[test]
fn exhaustion_returns_none() {
    let mut w = words(8);
    let mut bm = ChunkBitmap::new(&mut w, 8);

    assert_eq!(bm.alloc(8), Some(0));
    assert_eq!(bm.alloc(1), None);

    bm.free(3, 2);
    assert_eq!(bm.alloc(3), None, "only 2 contiguous free");
    assert_eq!(bm.alloc(2), Some(3));
}

#[test]
fn zero_and_oversized_requests_fail() {
    let mut w = words(8);
    let mut bm = ChunkBitmap::new(&mut w, 8);
    assert_eq!(bm.alloc(0), None);
    assert_eq!(bm.alloc(9), None);
}

#[test]
fn fragmented_then_coalesced() {
    let mut w = words(8);
    let mut bm = ChunkBitmap::new(&mut w, 8);

    for i in 0..8 {
        assert_eq!(bm.alloc(1), Some(i));
    }
    // Free alternating chunks: no run of 2 exists.
    for i in (0..8).step_by(2) {
        bm.free(i, 1);
    }
    assert_eq!(bm.alloc(2), None);

    // Free the rest: the arena coalesces back to one run.
    for i in (1..8).step_by(2) {
        bm.free(i, 1);
    }
    assert_eq!(bm.alloc(8), Some(0));
}
