use std::collections::HashSet;

use itertools::Itertools;
use rand::{seq::index, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::model::constants::{BAN_LIST_CAPACITY, SELECTION_SIZE};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Need at least {required} levels available after exclusions, found {available}")]
    InsufficientLevels { required: usize, available: usize }
}

/// The levels currently in rotation and the recently retired ones.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelSelectionState {
    pub current: Vec<String>,
    /// Oldest first, never longer than [`BAN_LIST_CAPACITY`]
    pub banned: Vec<String>
}

impl LevelSelectionState {
    /// The ban list after retiring the current selection: the retiring ids are appended
    /// and the oldest entries dropped until the list fits.
    pub fn retire_current(&self) -> Vec<String> {
        let mut banned: Vec<String> = self
            .banned
            .iter()
            .filter(|id| !self.current.contains(*id))
            .cloned()
            .collect();
        banned.extend(self.current.iter().cloned());

        if banned.len() > BAN_LIST_CAPACITY {
            banned.drain(..banned.len() - BAN_LIST_CAPACITY);
        }

        banned
    }
}

/// `catalog - exclusions - banned`, in catalog order, without duplicates.
pub fn eligible_levels(catalog: &[String], exclusions: &HashSet<String>, banned: &[String]) -> Vec<String> {
    catalog
        .iter()
        .filter(|id| !exclusions.contains(*id) && !banned.contains(*id))
        .unique()
        .cloned()
        .collect()
}

/// Picks the next rotation.
///
/// The current selection is retired into the ban list first, then
/// [`SELECTION_SIZE`] distinct levels are drawn uniformly from what remains.
/// Returns the new state; nothing about `state` is modified on failure.
pub fn select_levels<R: Rng + ?Sized>(
    catalog: &[String],
    exclusions: &HashSet<String>,
    state: &LevelSelectionState,
    rng: &mut R
) -> Result<LevelSelectionState, SelectionError> {
    let banned = state.retire_current();
    let eligible = eligible_levels(catalog, exclusions, &banned);

    if eligible.len() < SELECTION_SIZE {
        return Err(SelectionError::InsufficientLevels {
            required: SELECTION_SIZE,
            available: eligible.len()
        });
    }

    let current: Vec<String> = index::sample(rng, eligible.len(), SELECTION_SIZE)
        .into_iter()
        .map(|i| eligible[i].clone())
        .collect();

    info!(eligible = eligible.len(), selected = ?current, "Selected levels");

    Ok(LevelSelectionState { current, banned })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{eligible_levels, select_levels, LevelSelectionState, SelectionError};
    use crate::{
        model::constants::{BAN_LIST_CAPACITY, SELECTION_SIZE},
        utils::test_utils::{generate_catalog, seeded_rng}
    };

    #[test]
    fn test_insufficient_levels_for_catalog_of_four() {
        let catalog = generate_catalog(4);
        let result = select_levels(&catalog, &HashSet::new(), &LevelSelectionState::default(), &mut seeded_rng());

        assert_eq!(
            result,
            Err(SelectionError::InsufficientLevels {
                required: 5,
                available: 4
            })
        );
    }

    #[test]
    fn test_selects_five_distinct_eligible_levels() {
        let catalog = generate_catalog(20);
        let exclusions: HashSet<String> = ["level-1".to_string(), "level-2".to_string()].into_iter().collect();
        let state = LevelSelectionState {
            current: vec!["level-3".to_string()],
            banned: vec!["level-4".to_string()]
        };

        let next = select_levels(&catalog, &exclusions, &state, &mut seeded_rng()).unwrap();
        let unique: HashSet<&String> = next.current.iter().collect();

        assert_eq!(next.current.len(), SELECTION_SIZE);
        assert_eq!(unique.len(), SELECTION_SIZE);
        for id in &next.current {
            assert!(catalog.contains(id));
            assert!(!exclusions.contains(id));
            assert_ne!(id, "level-3");
            assert_ne!(id, "level-4");
        }
        assert_eq!(next.banned, vec!["level-4".to_string(), "level-3".to_string()]);
    }

    #[test]
    fn test_ban_list_is_fifo_capped() {
        let state = LevelSelectionState {
            current: generate_catalog(5),
            banned: (10..18).map(|i| format!("old-{}", i)).collect()
        };

        let banned = state.retire_current();

        assert_eq!(banned.len(), BAN_LIST_CAPACITY);
        assert_eq!(banned[0], "old-13");
        assert_eq!(&banned[5..], generate_catalog(5).as_slice());
    }

    #[test]
    fn test_retiring_selection_makes_level_pool_too_small() {
        // 9 levels: 5 in rotation leave only 4 eligible
        let catalog = generate_catalog(9);
        let state = LevelSelectionState {
            current: catalog[..5].to_vec(),
            banned: Vec::new()
        };

        let result = select_levels(&catalog, &HashSet::new(), &state, &mut seeded_rng());

        assert!(matches!(result, Err(SelectionError::InsufficientLevels { available: 4, .. })));
    }

    #[test]
    fn test_eligible_levels_dedupes_catalog() {
        let catalog = vec!["a".to_string(), "b".to_string(), "a".to_string(), "c".to_string()];
        let exclusions: HashSet<String> = ["c".to_string()].into_iter().collect();

        assert_eq!(eligible_levels(&catalog, &exclusions, &["b".to_string()]), vec!["a".to_string()]);
    }

    #[test]
    fn test_same_seed_same_selection() {
        let catalog = generate_catalog(30);
        let state = LevelSelectionState::default();

        let a = select_levels(&catalog, &HashSet::new(), &state, &mut seeded_rng()).unwrap();
        let b = select_levels(&catalog, &HashSet::new(), &state, &mut seeded_rng()).unwrap();

        assert_eq!(a, b);
    }
}
