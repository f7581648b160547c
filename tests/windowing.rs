use framesift::windower::{Windower, frames_per_page, page_range, total_pages};
use proptest::prelude::*;

/// Bottom edges where exactly the first `fit` frames sit above a 10-row limit.
fn bottoms(total: usize, fit: usize) -> Vec<f64> {
    (0..total).map(|i| if i < fit { 1.0 } else { 100.0 }).collect()
}

fn list_and_page_size() -> impl Strategy<Value = (usize, usize)> {
    (1usize..400).prop_flat_map(|n| (Just(n), 1..=n))
}

proptest! {
    #[test]
    fn page_count_matches_ceiling((n, k) in list_and_page_size()) {
        prop_assert_eq!(total_pages(n, k), n.div_ceil(k));
        let last = page_range(n, k, total_pages(n, k) - 1);
        prop_assert!(!last.is_empty());
        prop_assert!(last.len() <= k);
        prop_assert_eq!(last.end, n);
    }

    #[test]
    fn advancing_visits_every_frame_once((n, k) in list_and_page_size()) {
        let mut windower = Windower::new(36.0);
        windower.measure(n, &bottoms(n, k), 10.0, 0.0);
        prop_assert_eq!(windower.state().frames_per_page, Some(k));

        let mut seen = Vec::with_capacity(n);
        loop {
            let range = windower.page_range(n);
            prop_assert!(!range.is_empty());
            prop_assert!(range.len() <= k);
            seen.extend(range);
            if !windower.advance() {
                break;
            }
        }
        prop_assert!(windower.is_done());
        prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
        prop_assert_eq!(windower.state().done_pages + 1, n.div_ceil(k));
    }

    #[test]
    fn page_never_empty_when_first_frame_overflows(n in 1usize..200) {
        let tall = vec![100.0; n];
        prop_assert_eq!(frames_per_page(&tall, 10.0, 1.0), Some(1));
    }
}

#[test]
fn resetting_returns_to_first_page() {
    let mut windower = Windower::new(36.0);
    windower.measure(10, &bottoms(10, 3), 10.0, 0.0);
    assert!(windower.advance());
    assert!(windower.advance());
    assert_eq!(windower.page_range(10), 6..9);

    windower.set_frame_width(48.0);
    assert!(windower.needs_measurement());
    assert_eq!(windower.state().done_pages, 0);
    assert_eq!(windower.page_range(10), 0..10);
    assert!(!windower.advance());
}
