//! Rebus puzzle display generation
//!
//! This module implements the rebus puzzle kind. The answer is fully
//! blanked and the picture clue rides along in the display. Easy rebus
//! puzzles get no decoys at all, so the keyboard spells out exactly
//! which letters the answer uses.

use std::collections::BTreeSet;

use enum_map::EnumMap;

use super::{Difficulty, Puzzle, PuzzleDisplay, common};

/// Decoy letters mixed into the keyboard, by difficulty tier
const DECOYS: EnumMap<Difficulty, usize> = EnumMap::from_array([0, 8, 26]);

/// Generates the rebus display for `puzzle`
pub fn display(puzzle: &Puzzle) -> PuzzleDisplay {
    let canonical = common::canonicalize(&puzzle.answer);
    let answer_letters = common::letter_set(&canonical);
    let decoys = common::pick_decoys(&answer_letters, DECOYS[puzzle.difficulty]);

    PuzzleDisplay {
        display: common::mask(&canonical, &BTreeSet::new()),
        desc: None,
        image: puzzle.image.clone(),
        letters_available: common::available_letters(&answer_letters, &BTreeSet::new(), &decoys),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::puzzle::{PuzzleId, PuzzleKind};

    fn rebus_puzzle(difficulty: Difficulty) -> Puzzle {
        Puzzle {
            puzzle_id: PuzzleId::new(),
            answer: "Early Bird".to_owned(),
            hint: "Phrase/Term".to_owned(),
            difficulty,
            kind: PuzzleKind::Rebus,
            long_text: None,
            image: Some("rebus/early-bird.png".to_owned()),
        }
    }

    #[test]
    fn test_rebus_blanks_everything_and_keeps_image() {
        let display = display(&rebus_puzzle(Difficulty::Normal));
        assert_eq!(display.display, "_____ ____");
        assert_eq!(display.desc, None);
        assert_eq!(display.image, Some("rebus/early-bird.png".to_owned()));
    }

    #[test]
    fn test_easy_rebus_offers_answer_letters_only() {
        for _ in 0..20 {
            let display = display(&rebus_puzzle(Difficulty::Easy));
            // EARLY BIRD: A B D E I L R Y
            assert_eq!(
                display.letters_available,
                vec!['A', 'B', 'D', 'E', 'I', 'L', 'R', 'Y']
            );
        }
    }

    #[test]
    fn test_rebus_decoys_disjoint_from_answer() {
        let answer_letters = common::letter_set("EARLY BIRD");
        let display = display(&rebus_puzzle(Difficulty::Normal));
        let decoys = display
            .letters_available
            .iter()
            .filter(|letter| !answer_letters.contains(letter))
            .count();
        assert_eq!(decoys, 8);
    }
}
