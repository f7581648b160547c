//! Property tests for the selection engine.
//!
//! 1. The selected-id set always equals the set of marked frames
//! 2. Bulk select/deselect are idempotent
//! 3. A second click before the range start only unmarks the start
//! 4. Right-click deselect clears exactly the marked run around the frame

use framesift::models::{Frame, FrameId};
use framesift::selection::{RangeGesture, Selection, SelectionOp};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Click(FrameId),
    ContextClick(FrameId),
    SelectAll,
    DeselectAll,
    Mark(usize, usize),
    Unmark(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // ids run past the list length so unknown ids show up too
    prop_oneof![
        4 => (0i64..50).prop_map(Op::Click),
        2 => (0i64..50).prop_map(Op::ContextClick),
        1 => Just(Op::SelectAll),
        1 => Just(Op::DeselectAll),
        1 => (0usize..45, 0usize..45).prop_map(|(a, b)| Op::Mark(a, b)),
        1 => (0usize..45, 0usize..45).prop_map(|(a, b)| Op::Unmark(a, b)),
    ]
}

fn frames_from(flags: &[bool]) -> Vec<Frame> {
    flags
        .iter()
        .enumerate()
        .map(|(i, marked)| Frame {
            id: i as FrameId,
            image_ref: format!("https://img/{i}.jpg"),
            marked: *marked,
        })
        .collect()
}

fn apply_ops(selection: &mut Selection, ops: &[Op]) {
    for op in ops {
        match op {
            Op::Click(id) => {
                selection.click(*id);
            }
            Op::ContextClick(id) => {
                selection.context_click(*id);
            }
            Op::SelectAll => selection.select_all(),
            Op::DeselectAll => selection.deselect_all(),
            Op::Mark(a, b) => selection.apply(SelectionOp::Mark(*a..=*b)),
            Op::Unmark(a, b) => selection.apply(SelectionOp::Unmark(*a..=*b)),
        }
    }
}

fn marked(selection: &Selection) -> Vec<bool> {
    selection.frames().iter().map(|f| f.marked).collect()
}

proptest! {
    #[test]
    fn selected_ids_equal_marked_frames(
        flags in prop::collection::vec(any::<bool>(), 1..40),
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let mut selection = Selection::new(frames_from(&flags));
        prop_assert!(selection.is_consistent());
        for op in &ops {
            apply_ops(&mut selection, std::slice::from_ref(op));
            prop_assert!(selection.is_consistent(), "broken after {:?}", op);
        }
        prop_assert_eq!(selection.frames().len(), flags.len());
    }

    #[test]
    fn bulk_operations_are_idempotent(
        flags in prop::collection::vec(any::<bool>(), 1..40),
        ops in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let mut selection = Selection::new(frames_from(&flags));
        apply_ops(&mut selection, &ops);

        selection.select_all();
        let once = (marked(&selection), selection.selected().clone());
        selection.select_all();
        prop_assert_eq!(&once, &(marked(&selection), selection.selected().clone()));
        prop_assert!(once.0.iter().all(|m| *m));

        selection.deselect_all();
        let once = (marked(&selection), selection.selected().clone());
        selection.deselect_all();
        prop_assert_eq!(&once, &(marked(&selection), selection.selected().clone()));
        prop_assert!(once.1.is_empty());
    }

    #[test]
    fn reversed_range_unmarks_only_the_start(
        flags in prop::collection::vec(any::<bool>(), 2..40),
        picks in (0usize..40, 0usize..40),
    ) {
        let n = flags.len();
        let (a, b) = (picks.0 % n, picks.1 % n);
        prop_assume!(a != b);
        let (end, start) = (a.min(b), a.max(b));

        let mut selection = Selection::new(frames_from(&flags));
        selection.click(start as FrameId);
        let before = marked(&selection);
        selection.click(end as FrameId);
        let after = marked(&selection);

        prop_assert_eq!(selection.gesture(), RangeGesture::Idle);
        for i in 0..n {
            if i == start {
                prop_assert!(!after[i]);
            } else {
                prop_assert_eq!(after[i], before[i]);
            }
        }
    }

    #[test]
    fn forward_range_marks_inclusive_span(
        flags in prop::collection::vec(any::<bool>(), 1..40),
        picks in (0usize..40, 0usize..40),
    ) {
        let n = flags.len();
        let (start, end) = ((picks.0 % n).min(picks.1 % n), (picks.0 % n).max(picks.1 % n));

        let mut selection = Selection::new(frames_from(&flags));
        selection.click(start as FrameId);
        selection.click(end as FrameId);
        let after = marked(&selection);

        for i in 0..n {
            if (start..=end).contains(&i) {
                prop_assert!(after[i]);
            } else {
                prop_assert_eq!(after[i], flags[i]);
            }
        }
    }

    #[test]
    fn context_click_clears_exactly_the_run(
        flags in prop::collection::vec(any::<bool>(), 1..40),
        pick in 0usize..40,
    ) {
        let n = flags.len();
        let index = pick % n;
        let mut selection = Selection::new(frames_from(&flags));
        let handled = selection.context_click(index as FrameId);
        let after = marked(&selection);

        prop_assert_eq!(handled, flags[index]);
        if !handled {
            prop_assert_eq!(after, flags);
            return Ok(());
        }
        let mut start = index;
        while start > 0 && flags[start - 1] {
            start -= 1;
        }
        let mut finish = index;
        while finish + 1 < n && flags[finish + 1] {
            finish += 1;
        }
        for i in 0..n {
            if (start..=finish).contains(&i) {
                prop_assert!(!after[i]);
            } else {
                prop_assert_eq!(after[i], flags[i]);
            }
        }
    }
}
