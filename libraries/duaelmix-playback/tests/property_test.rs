//! Property-based tests for the playlist model
//!
//! Uses proptest to check the structural invariants of drag and drop and
//! selection across many random playlists and move sequences.

use duaelmix_core::{SubIndex, Track};
use duaelmix_playback::{DragRef, PlaylistModel};
use duaelmix_storage::{LocalState, MemoryKeyValueStore};
use proptest::prelude::*;
use std::sync::Arc;

// ===== Helpers =====

/// Build a model whose pairs have the given sizes (1 or 2 tracks)
fn model_with(sizes: &[usize]) -> PlaylistModel {
    let state = LocalState::new(Arc::new(MemoryKeyValueStore::new()));
    let mut model = PlaylistModel::load(state).unwrap();
    let mut next = 0;

    for &size in sizes {
        model.append_track(Track::new(format!("t{next}")));
        next += 1;
        if size == 2 {
            let last = model.len() - 1;
            model.append_track(Track::new(format!("t{next}")));
            next += 1;
            model
                .move_item(
                    DragRef::Track { pair: last + 1, sub: SubIndex::Driving },
                    DragRef::Track { pair: last, sub: SubIndex::Driven },
                )
                .unwrap();
        }
    }
    model.drain_events();
    model
}

fn arbitrary_sizes() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..=2, 0..8)
}

fn arbitrary_sub() -> impl Strategy<Value = SubIndex> {
    prop_oneof![Just(SubIndex::Driving), Just(SubIndex::Driven)]
}

fn arbitrary_ref() -> impl Strategy<Value = DragRef> {
    prop_oneof![
        (0usize..10, arbitrary_sub()).prop_map(|(pair, sub)| DragRef::Track { pair, sub }),
        (0usize..10).prop_map(|pair| DragRef::TrackPair { pair }),
        (0usize..11).prop_map(|index| DragRef::Gap { index }),
        Just(DragRef::Trash),
    ]
}

fn track_names(model: &PlaylistModel) -> Vec<Vec<String>> {
    model
        .playlist()
        .iter()
        .map(|pair| pair.tracks().iter().map(|t| t.name.clone()).collect())
        .collect()
}

// ===== Property Tests =====

proptest! {
    /// Property: no sequence of moves creates an empty or three-track pair,
    /// and tracks only disappear into the trash
    #[test]
    fn moves_keep_pairs_well_formed(
        sizes in arbitrary_sizes(),
        moves in prop::collection::vec((arbitrary_ref(), arbitrary_ref()), 0..30)
    ) {
        let mut model = model_with(&sizes);
        let mut expected_tracks = model.playlist().track_count();

        for (src, dst) in moves {
            let legal = model.can_drop(src, dst);
            match model.move_item(src, dst) {
                Ok(trashed) => {
                    prop_assert!(legal);
                    expected_tracks -= trashed.len();
                }
                Err(_) => prop_assert!(!legal),
            }

            for pair in model.playlist().iter() {
                prop_assert!((1..=2).contains(&pair.len()), "pair of {} tracks", pair.len());
            }
            prop_assert_eq!(model.playlist().track_count(), expected_tracks);
        }
    }

    /// Property: swapping two occupied track slots is its own inverse
    #[test]
    fn track_swap_is_self_inverse(
        sizes in prop::collection::vec(1usize..=2, 1..8),
        a in (0usize..8, arbitrary_sub()),
        b in (0usize..8, arbitrary_sub())
    ) {
        let mut model = model_with(&sizes);
        let src = DragRef::Track { pair: a.0, sub: a.1 };
        let dst = DragRef::Track { pair: b.0, sub: b.1 };

        let occupied = |model: &PlaylistModel, (pair, sub): (usize, SubIndex)| {
            model.playlist().get(pair).is_some_and(|p| p.is_occupied(sub))
        };
        prop_assume!(src != dst && occupied(&model, a) && occupied(&model, b));

        let before = track_names(&model);
        model.move_item(src, dst).unwrap();
        model.move_item(src, dst).unwrap();
        prop_assert_eq!(track_names(&model), before);
    }

    /// Property: moving the selection by the playlist length is a no-op
    #[test]
    fn select_relative_by_len_returns(
        sizes in prop::collection::vec(1usize..=2, 1..8),
        start in -20isize..20
    ) {
        let mut model = model_with(&sizes);
        model.select_relative(start);
        let before = model.selected_index();

        model.select_relative(model.len() as isize);
        prop_assert_eq!(model.selected_index(), before);
        prop_assert!(before.unwrap() < model.len());
    }

    /// Property: pairs never drop into the gaps directly around them
    #[test]
    fn pair_into_adjacent_gap_is_rejected(sizes in prop::collection::vec(1usize..=2, 1..8), pair in 0usize..8) {
        let model = model_with(&sizes);
        prop_assume!(pair < model.len());

        let src = DragRef::TrackPair { pair };
        let gap_before = DragRef::Gap { index: pair };
        let gap_after = DragRef::Gap { index: pair + 1 };
        prop_assert!(!model.can_drop(src, gap_before));
        prop_assert!(!model.can_drop(src, gap_after));
        prop_assert!(!model.can_drop(src, src));
    }

    /// Property: the selection always points at an existing pair after a move
    #[test]
    fn selection_stays_in_range(
        sizes in prop::collection::vec(1usize..=2, 1..8),
        select in 0isize..8,
        moves in prop::collection::vec((arbitrary_ref(), arbitrary_ref()), 1..20)
    ) {
        let mut model = model_with(&sizes);
        model.select_relative(select);

        for (src, dst) in moves {
            let _ = model.move_item(src, dst);
            match model.selected_index() {
                Some(index) => prop_assert!(index < model.len()),
                None => prop_assert!(model.is_empty()),
            }
        }
    }
}
