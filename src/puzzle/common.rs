//! Shared letter accounting for puzzle display generation
//!
//! This module contains the helpers common to the blanks, riddle, and
//! rebus generators: canonicalizing answers, counting letters, masking
//! hidden letters, and assembling the on-screen keyboard out of answer
//! letters and random decoys.

use std::collections::BTreeSet;

use itertools::Itertools;

/// The uppercase alphabet, in the order letters appear on the keyboard
pub const ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Uppercases an answer for letter accounting and masking
pub fn canonicalize(answer: &str) -> String {
    answer.to_uppercase()
}

/// Collects the distinct letters of a canonical answer
///
/// Characters outside the alphabet (spaces, hyphens, digits) are ignored.
pub fn letter_set(canonical: &str) -> BTreeSet<char> {
    canonical
        .chars()
        .filter(char::is_ascii_alphabetic)
        .collect()
}

/// Tallies the letters of a canonical answer, most frequent first
///
/// Letters tied on frequency come out in alphabet order. Characters
/// outside the alphabet are ignored.
pub fn letter_counts(canonical: &str) -> Vec<(char, usize)> {
    canonical
        .chars()
        .filter(char::is_ascii_alphabetic)
        .counts()
        .into_iter()
        .sorted_by_key(|&(letter, count)| (std::cmp::Reverse(count), letter))
        .collect_vec()
}

/// Picks up to `count` random letters that do not occur in the answer
pub fn pick_decoys(answer_letters: &BTreeSet<char>, count: usize) -> Vec<char> {
    let mut pool = ALPHABET
        .iter()
        .copied()
        .filter(|letter| !answer_letters.contains(letter))
        .collect_vec();
    fastrand::shuffle(&mut pool);
    pool.truncate(count);
    pool
}

/// Masks a canonical answer, keeping revealed letters and non-letters
///
/// Every letter outside `revealed` becomes an underscore; spaces,
/// hyphens, and other non-letters pass through so the answer keeps its
/// shape.
pub fn mask(canonical: &str, revealed: &BTreeSet<char>) -> String {
    canonical
        .chars()
        .map(|c| {
            if !c.is_ascii_alphabetic() || revealed.contains(&c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Assembles the keyboard letters, in alphabet order
///
/// A letter is offered when it still has to be typed (occurs in the
/// answer and is not already revealed) or when it is a decoy.
pub fn available_letters(
    answer_letters: &BTreeSet<char>,
    revealed: &BTreeSet<char>,
    decoys: &[char],
) -> Vec<char> {
    ALPHABET
        .iter()
        .copied()
        .filter(|letter| {
            (answer_letters.contains(letter) && !revealed.contains(letter))
                || decoys.contains(letter)
        })
        .collect_vec()
}
