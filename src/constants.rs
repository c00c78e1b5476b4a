//! Configuration constants for the Pathword game system
//!
//! This module contains all the configuration limits and constraints
//! used throughout the game system to ensure data integrity and
//! provide consistent boundaries for different game components.

/// Game creation and lifecycle configuration constants
pub mod game {
    /// Length of a generated game identifier in base-36 characters
    pub const ID_LENGTH: usize = 8;
    /// Maximum length of the final password in characters
    pub const MAX_PASSWORD_LENGTH: usize = 64;
    /// Maximum length of the host password in characters
    pub const MAX_ADMIN_PASSWORD_LENGTH: usize = 64;
    /// Minimum number of teams in a game
    pub const MIN_TEAM_COUNT: usize = 2;
    /// Maximum number of teams in a game
    pub const MAX_TEAM_COUNT: usize = 4;
    /// Maximum length of a team name in characters
    pub const MAX_TEAM_NAME_LENGTH: usize = 30;
}

/// Branch configuration constants
pub mod branch {
    /// Maximum number of puzzles on a single difficulty path
    pub const MAX_PATH_LENGTH: usize = 10;
    /// Maximum length of a single clue fragment in characters
    pub const MAX_CLUE_LENGTH: usize = 50;
    /// Extra path-sized sets of puzzles drawn beyond one per team,
    /// so assignment never reuses a puzzle within a game
    pub const SPARE_SAMPLE_SETS: usize = 1;
}

/// Puzzle repository configuration constants
pub mod puzzle {
    /// Length of a generated puzzle identifier in base-36 characters
    pub const ID_LENGTH: usize = 12;
    /// Maximum length of a puzzle answer in characters
    pub const MAX_ANSWER_LENGTH: usize = 100;
    /// Maximum length of a puzzle hint in characters
    pub const MAX_HINT_LENGTH: usize = 100;
    /// Maximum length of a riddle prompt in characters
    pub const MAX_LONG_TEXT_LENGTH: usize = 1000;
    /// Maximum length of a rebus image reference in characters
    pub const MAX_IMAGE_LENGTH: usize = 500;
}

/// Blanks display configuration constants
pub mod blanks {
    /// Longest answer that still receives decoy letters on easy
    pub const EASY_SHORT_ANSWER_MAX: usize = 5;
    /// Shortest answer that receives the raised reveal ratio on hard
    pub const HARD_LONG_ANSWER_MIN: usize = 15;
}

/// Player name configuration constants
pub mod names {
    /// Maximum length of a player name in characters
    pub const MAX_NAME_LENGTH: usize = 30;
}
