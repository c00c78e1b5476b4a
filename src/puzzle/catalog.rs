//! Starter puzzle catalog
//!
//! A built-in batch of blanks puzzles so a fresh deployment has
//! something to build games from before anyone curates a repository.
//! Difficulty is assigned from the answer length with whitespace
//! ignored.

use itertools::Itertools;

use super::{Difficulty, NewPuzzle, PuzzleKind};

/// Answer length without whitespace at which a starter puzzle is hard
const HARD_LENGTH_MIN: usize = 15;
/// Answer length without whitespace at which a starter puzzle is normal
const NORMAL_LENGTH_MIN: usize = 10;

/// Starter answers, all sharing the same category hint
const BIRDS: [&str; 80] = [
    "Sparrow",
    "Robin",
    "Blue Jay",
    "Cardinal",
    "Crow",
    "Pigeon",
    "Seagull",
    "Duck",
    "Goose",
    "Swan",
    "Hawk",
    "Eagle",
    "Falcon",
    "Owl",
    "Woodpecker",
    "Penguin",
    "Parrot",
    "Canary",
    "Cockatiel",
    "Finch",
    "Cockatoo",
    "Peacock",
    "Turkey",
    "Chicken",
    "Gull",
    "Dove",
    "Albatross",
    "Vulture",
    "Kiwi",
    "Hummingbird",
    "Swallow",
    "Blackbird",
    "Pelican",
    "Quail",
    "Raven",
    "Magpie",
    "Emu",
    "Ostrich",
    "Kestrel",
    "Ibis",
    "Cormorant",
    "Gannet",
    "Heron",
    "Kingfisher",
    "Bald Eagle",
    "Osprey",
    "Wren",
    "Goshawk",
    "Spoonbill",
    "Puffin",
    "Toucan",
    "Shoebill",
    "Barn Owl",
    "Snowy Owl",
    "Great Horned Owl",
    "Red-Tailed Hawk",
    "Northern Mockingbird",
    "Yellow Warbler",
    "Great Blue Heron",
    "White Ibis",
    "Peregrine Falcon",
    "Black-Capped Chickadee",
    "Mallard Duck",
    "Northern Shoveler",
    "Wood Duck",
    "Bald Eagle",
    "Red-Shouldered Hawk",
    "Blue Jay",
    "Turkey Vulture",
    "Northern Harrier",
    "Chipping Sparrow",
    "Northern Flicker",
    "Eastern Phoebe",
    "Brown Thrasher",
    "Red-Winged Blackbird",
    "Eastern Meadowlark",
    "Eastern Bluebird",
    "Song Sparrow",
    "House Finch",
    "White-Crowned Sparrow",
];

/// Grades a starter answer by its length with whitespace ignored
fn grade(answer: &str) -> Difficulty {
    let length = answer.chars().filter(|c| !c.is_whitespace()).count();
    if length >= HARD_LENGTH_MIN {
        Difficulty::Hard
    } else if length >= NORMAL_LENGTH_MIN {
        Difficulty::Normal
    } else {
        Difficulty::Easy
    }
}

/// Produces the starter catalog as repository payloads
///
/// The list contains a few duplicate answers on purpose; the repository
/// upsert collapses them by answer and difficulty.
pub fn starter_puzzles() -> Vec<NewPuzzle> {
    BIRDS
        .iter()
        .map(|answer| NewPuzzle {
            answer: (*answer).to_owned(),
            hint: "Bird".to_owned(),
            difficulty: grade(answer),
            kind: PuzzleKind::Blanks,
            long_text: None,
            image: None,
        })
        .collect_vec()
}
