//! Puzzle repository model and display generation
//!
//! This module contains the puzzle kinds supported by the Pathword game
//! system: blanks, riddle, and rebus puzzles. Each kind has its own
//! display-generation policy that decides how much of the answer is
//! revealed up front and how many decoy letters pad the on-screen
//! keyboard.

pub mod blanks;
pub mod catalog;
pub mod common;
pub mod rebus;
pub mod riddle;

use derive_more::Display;
use enum_map::Enum;
use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::constants::puzzle::{
    ID_LENGTH, MAX_ANSWER_LENGTH, MAX_HINT_LENGTH, MAX_IMAGE_LENGTH, MAX_LONG_TEXT_LENGTH,
};

/// Difficulty tier of a puzzle
///
/// The tier drives every per-puzzle policy in the game: how much of the
/// answer the display reveals, how many points a solve awards, and how
/// likely a path puzzle is to be marked required.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Enum, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Short answers, generous reveals, one point per solve
    #[display("easy")]
    Easy,
    /// Mid-length answers, two points per solve
    #[display("normal")]
    Normal,
    /// Long answers, stingy reveals, four points per solve
    #[display("hard")]
    Hard,
}

impl Difficulty {
    /// Points awarded for solving a puzzle of this tier
    pub const fn points(self) -> u64 {
        match self {
            Self::Easy => 1,
            Self::Normal => 2,
            Self::Hard => 4,
        }
    }

    /// Amount subtracted from the random draw when deciding whether a
    /// path puzzle is required, so harder tiers demand fewer solves
    pub const fn required_modifier(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Normal => 1,
            Self::Hard => 2,
        }
    }
}

/// Presentation family of a puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleKind {
    /// The answer alone, as blanks with some letters revealed up front
    Blanks,
    /// A prose riddle shown alongside the fully blanked answer
    Riddle,
    /// A picture clue shown alongside the fully blanked answer
    Rebus,
}

/// A unique identifier for a repository puzzle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PuzzleId(String);

impl PuzzleId {
    /// Creates a new random puzzle ID
    pub fn new() -> Self {
        const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        Self(
            (0..ID_LENGTH)
                .map(|_| char::from(DIGITS[fastrand::usize(..DIGITS.len())]))
                .collect(),
        )
    }
}

impl Default for PuzzleId {
    /// Creates a new random puzzle ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PuzzleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A puzzle as stored in the repository
///
/// Repository puzzles are game-independent. At game creation a puzzle is
/// copied onto a team's path together with its generated display.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    /// Unique identifier of the puzzle
    pub puzzle_id: PuzzleId,
    /// Canonical answer, compared case-insensitively
    pub answer: String,
    /// Category hint shown to players alongside the display
    pub hint: String,
    /// Difficulty tier
    pub difficulty: Difficulty,
    /// Presentation family
    #[serde(rename = "type")]
    pub kind: PuzzleKind,
    /// Riddle prompt, present on riddle puzzles
    pub long_text: Option<String>,
    /// Image reference, present on rebus puzzles
    pub image: Option<String>,
}

impl Puzzle {
    /// Generates the player-facing display for this puzzle
    ///
    /// Dispatches to the generator of the puzzle's presentation family.
    /// Generation is random, so two calls may reveal different letters
    /// and pick different decoys.
    ///
    /// # Returns
    ///
    /// The display that should be stored on the path and served to players
    pub fn display(&self) -> PuzzleDisplay {
        match self.kind {
            PuzzleKind::Blanks => blanks::display(self),
            PuzzleKind::Riddle => riddle::display(self),
            PuzzleKind::Rebus => rebus::display(self),
        }
    }
}

/// Payload for adding a puzzle to the repository
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPuzzle {
    /// Canonical answer of the puzzle
    #[garde(length(chars, min = 1, max = MAX_ANSWER_LENGTH))]
    pub answer: String,
    /// Category hint shown to players
    #[garde(length(chars, min = 1, max = MAX_HINT_LENGTH))]
    pub hint: String,
    /// Difficulty tier
    #[garde(skip)]
    pub difficulty: Difficulty,
    /// Presentation family
    #[serde(rename = "type")]
    #[garde(skip)]
    pub kind: PuzzleKind,
    /// Riddle prompt for riddle puzzles
    #[garde(inner(length(chars, max = MAX_LONG_TEXT_LENGTH)))]
    pub long_text: Option<String>,
    /// Image reference for rebus puzzles
    #[garde(inner(length(chars, max = MAX_IMAGE_LENGTH)))]
    pub image: Option<String>,
}

impl NewPuzzle {
    /// Materializes the payload into a stored puzzle with a fresh ID
    pub fn into_puzzle(self) -> Puzzle {
        Puzzle {
            puzzle_id: PuzzleId::new(),
            answer: self.answer,
            hint: self.hint,
            difficulty: self.difficulty,
            kind: self.kind,
            long_text: self.long_text,
            image: self.image,
        }
    }
}

/// Player-facing presentation of a puzzle, generated at game creation
///
/// The display never contains the answer itself; it carries the blanked
/// text, the kind-specific prompt, and the letters offered on the
/// on-screen keyboard.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDisplay {
    /// Answer text with hidden letters replaced by underscores
    pub display: String,
    /// Riddle prompt carried through for riddle puzzles
    pub desc: Option<String>,
    /// Image reference carried through for rebus puzzles
    pub image: Option<String>,
    /// Letters offered on the on-screen keyboard, in alphabet order
    pub letters_available: Vec<char>,
}
