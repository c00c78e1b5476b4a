//! Riddle puzzle display generation
//!
//! This module implements the riddle puzzle kind. The answer is fully
//! blanked and the prose prompt rides along in the display, so players
//! solve from the riddle text rather than from revealed letters.

use std::collections::BTreeSet;

use enum_map::EnumMap;

use super::{Difficulty, Puzzle, PuzzleDisplay, common};

/// Decoy letters mixed into the keyboard, by difficulty tier
///
/// On hard the count covers the whole alphabet, so the keyboard narrows
/// nothing down.
const DECOYS: EnumMap<Difficulty, usize> = EnumMap::from_array([4, 8, 26]);

/// Generates the riddle display for `puzzle`
pub fn display(puzzle: &Puzzle) -> PuzzleDisplay {
    let canonical = common::canonicalize(&puzzle.answer);
    let answer_letters = common::letter_set(&canonical);
    let decoys = common::pick_decoys(&answer_letters, DECOYS[puzzle.difficulty]);

    PuzzleDisplay {
        display: common::mask(&canonical, &BTreeSet::new()),
        desc: puzzle.long_text.clone(),
        image: None,
        letters_available: common::available_letters(&answer_letters, &BTreeSet::new(), &decoys),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::puzzle::{PuzzleId, PuzzleKind};

    fn riddle_puzzle(difficulty: Difficulty) -> Puzzle {
        Puzzle {
            puzzle_id: PuzzleId::new(),
            answer: "Raven".to_owned(),
            hint: "Bird".to_owned(),
            difficulty,
            kind: PuzzleKind::Riddle,
            long_text: Some("Quoth me nevermore.".to_owned()),
            image: None,
        }
    }

    #[test]
    fn test_riddle_blanks_everything() {
        let display = display(&riddle_puzzle(Difficulty::Easy));
        assert_eq!(display.display, "_____");
        assert_eq!(display.desc, Some("Quoth me nevermore.".to_owned()));
        assert_eq!(display.image, None);
    }

    #[test]
    fn test_riddle_decoy_counts() {
        for (difficulty, decoys) in [
            (Difficulty::Easy, 4),
            (Difficulty::Normal, 8),
            (Difficulty::Hard, 21),
        ] {
            // RAVEN has five distinct letters, so hard caps at the
            // remaining 21 letters of the alphabet
            let display = display(&riddle_puzzle(difficulty));
            assert_eq!(display.letters_available.len(), 5 + decoys);
        }
    }

    #[test]
    fn test_riddle_hard_offers_whole_alphabet() {
        let display = display(&riddle_puzzle(Difficulty::Hard));
        assert_eq!(display.letters_available, Vec::from(common::ALPHABET));
    }
}
