//! Blanks puzzle display generation
//!
//! This module implements the blanks puzzle kind. A blanks puzzle shows
//! the answer as underscores with a difficulty-scaled share of its
//! letters revealed up front, preferring frequent letters so the reveal
//! gives shape without giving the word away.

use std::collections::BTreeSet;

use super::{Difficulty, Puzzle, PuzzleDisplay, common};
use crate::constants::blanks::{EASY_SHORT_ANSWER_MAX, HARD_LONG_ANSWER_MIN};

/// Reveal and decoy policy for one difficulty tier
///
/// The reveal budget is `floor(length × numerator / denominator)`
/// characters, counted over the whole answer including spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Policy {
    /// Numerator of the reveal-budget ratio
    reveal_numerator: usize,
    /// Denominator of the reveal-budget ratio
    reveal_denominator: usize,
    /// Number of non-answer letters mixed into the keyboard
    decoys: usize,
}

/// Looks up the policy for a difficulty tier and answer length
///
/// Easy answers short enough to type blind get four decoys; longer easy
/// answers get none. Hard answers at or above the long threshold reveal
/// three sevenths instead of two.
fn policy(difficulty: Difficulty, answer_length: usize) -> Policy {
    match difficulty {
        Difficulty::Easy => Policy {
            reveal_numerator: 2,
            reveal_denominator: 5,
            decoys: if answer_length <= EASY_SHORT_ANSWER_MAX {
                4
            } else {
                0
            },
        },
        Difficulty::Normal => Policy {
            reveal_numerator: 2,
            reveal_denominator: 6,
            decoys: 5,
        },
        Difficulty::Hard => Policy {
            reveal_numerator: if answer_length >= HARD_LONG_ANSWER_MIN {
                3
            } else {
                2
            },
            reveal_denominator: 7,
            decoys: 6,
        },
    }
}

/// Generates the blanks display for `puzzle`
///
/// # Returns
///
/// A display whose blanked text, revealed letters, and keyboard follow
/// the tier's reveal and decoy policy
pub fn display(puzzle: &Puzzle) -> PuzzleDisplay {
    let canonical = common::canonicalize(&puzzle.answer);
    let length = canonical.chars().count();
    generate(&canonical, policy(puzzle.difficulty, length))
}

/// Runs the reveal loop and assembles the display
///
/// Letters are considered most frequent first. A letter is revealed only
/// when all of its occurrences fit in the remaining budget; a letter
/// occurring once is skipped half of the time while later candidates
/// remain, so short answers do not always expose the same letters.
fn generate(canonical: &str, policy: Policy) -> PuzzleDisplay {
    let answer_letters = common::letter_set(canonical);
    let length = canonical.chars().count();
    let mut budget = (length * policy.reveal_numerator) / policy.reveal_denominator;

    let counts = common::letter_counts(canonical);
    let mut revealed = BTreeSet::new();
    for (position, &(letter, count)) in counts.iter().enumerate() {
        if budget == 0 {
            break;
        }
        if count > budget {
            continue;
        }
        if count == 1 && position + 1 < counts.len() && fastrand::bool() {
            continue;
        }
        revealed.insert(letter);
        budget -= count;
    }

    let decoys = common::pick_decoys(&answer_letters, policy.decoys);

    PuzzleDisplay {
        display: common::mask(canonical, &revealed),
        desc: None,
        image: None,
        letters_available: common::available_letters(&answer_letters, &revealed, &decoys),
    }
}
