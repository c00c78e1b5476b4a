//! Branch configuration and path building
//!
//! This module turns a host's per-tier settings into the per-team branch
//! structure stored on a new game: it samples no puzzle twice, attaches
//! clue fragments by assignment position, draws the required flags, and
//! shuffles each path so serve order tells players nothing about clue
//! order.

use std::collections::HashMap;

use enum_map::EnumMap;
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    constants::{
        branch::{MAX_CLUE_LENGTH, MAX_PATH_LENGTH},
        game::{
            MAX_ADMIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH, MAX_TEAM_COUNT,
            MAX_TEAM_NAME_LENGTH, MIN_TEAM_COUNT,
        },
    },
    error::{Error, Result},
    puzzle::{Difficulty, Puzzle, PuzzleDisplay, PuzzleId, PuzzleKind},
};

/// One fragment of the final password's clue set
///
/// The sentinel variant stands for the synthetic clue that, once its
/// puzzle is solved, reveals the password's shape at the final gate
/// instead of contributing a clue word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Clue {
    /// A clue fragment written by the host
    Word(String),
    /// The synthetic shape-revealing clue
    NumLet,
}

impl Clue {
    /// Wire spelling of the synthetic clue
    pub const SENTINEL: &'static str = "numlet";
}

impl From<String> for Clue {
    fn from(text: String) -> Self {
        if text == Self::SENTINEL {
            Self::NumLet
        } else {
            Self::Word(text)
        }
    }
}

impl From<Clue> for String {
    fn from(clue: Clue) -> Self {
        match clue {
            Clue::Word(text) => text,
            Clue::NumLet => Clue::SENTINEL.to_owned(),
        }
    }
}

/// Host-supplied settings for one difficulty tier
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct BranchConfig {
    /// Whether this tier gets paths at all
    #[garde(skip)]
    pub enabled: bool,
    /// Clue fragments distributed across the tier's path by position
    #[garde(custom(validate_clues))]
    pub clues: Vec<String>,
    /// Lower path bound kept for host tooling; the builder always fills
    /// paths to `max_path`
    #[garde(range(max = MAX_PATH_LENGTH))]
    pub min_path: usize,
    /// Number of puzzles on each team's path for this tier
    #[garde(range(min = 1, max = MAX_PATH_LENGTH))]
    pub max_path: usize,
}

/// Validates the clue fragments of one tier
fn validate_clues(clues: &[String], _ctx: &()) -> garde::Result {
    if clues.len() > MAX_PATH_LENGTH {
        return Err(garde::Error::new(format!(
            "at most {MAX_PATH_LENGTH} clues fit on a path"
        )));
    }
    for clue in clues {
        if clue.is_empty() {
            return Err(garde::Error::new("clues cannot be empty"));
        }
        if clue.chars().count() > MAX_CLUE_LENGTH {
            return Err(garde::Error::new(format!(
                "clues are limited to {MAX_CLUE_LENGTH} characters"
            )));
        }
        if clue == Clue::SENTINEL {
            return Err(garde::Error::new(format!(
                "the clue word {:?} is reserved",
                Clue::SENTINEL
            )));
        }
    }
    Ok(())
}

/// Request payload for creating a game
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGame {
    /// The final password teams race to assemble
    #[garde(length(chars, min = 1, max = MAX_PASSWORD_LENGTH))]
    pub password: String,
    /// Credential for host-only operations
    #[garde(length(chars, min = 1, max = MAX_ADMIN_PASSWORD_LENGTH))]
    pub admin_password: String,
    /// Per-tier path settings
    #[garde(custom(validate_branches))]
    pub branches: EnumMap<Difficulty, BranchConfig>,
    /// Competing team names
    #[garde(custom(validate_teams))]
    #[serde(default = "default_teams")]
    pub teams: Vec<String>,
}

/// Default team pair for new games
fn default_teams() -> Vec<String> {
    vec!["red".to_owned(), "blue".to_owned()]
}

/// Validates the per-tier settings as a whole
///
/// Disabled tiers are left unvalidated since the builder never reads
/// them, matching how hosts park half-filled settings on tiers they
/// toggle off.
fn validate_branches(branches: &EnumMap<Difficulty, BranchConfig>, _ctx: &()) -> garde::Result {
    if branches.values().all(|config| !config.enabled) {
        return Err(garde::Error::new("at least one difficulty must be enabled"));
    }
    for (difficulty, config) in branches {
        if !config.enabled {
            continue;
        }
        config
            .validate()
            .map_err(|report| garde::Error::new(format!("{difficulty}: {report}")))?;
        if config.min_path > config.max_path {
            return Err(garde::Error::new(format!(
                "{difficulty}: minimum path exceeds maximum path"
            )));
        }
    }
    Ok(())
}

/// Validates the team name list
fn validate_teams(teams: &[String], _ctx: &()) -> garde::Result {
    if !(MIN_TEAM_COUNT..=MAX_TEAM_COUNT).contains(&teams.len()) {
        return Err(garde::Error::new(format!(
            "between {MIN_TEAM_COUNT} and {MAX_TEAM_COUNT} teams are supported"
        )));
    }
    for team in teams {
        if team.is_empty() {
            return Err(garde::Error::new("team names cannot be empty"));
        }
        if team.chars().count() > MAX_TEAM_NAME_LENGTH {
            return Err(garde::Error::new(format!(
                "team names are limited to {MAX_TEAM_NAME_LENGTH} characters"
            )));
        }
        // the winner field uses this value to mean a draw
        if team == "tie" {
            return Err(garde::Error::new("\"tie\" is a reserved team name"));
        }
    }
    if !teams.iter().all_unique() {
        return Err(garde::Error::new("team names must be unique"));
    }
    Ok(())
}

/// A repository puzzle placed on a team's path
///
/// Carries the puzzle's stored fields plus the per-game pieces: the
/// generated display, the required flag, the clue fragment assigned to
/// its position, and whether a teammate has solved it yet.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPuzzle {
    /// Identifier of the repository puzzle
    pub puzzle_id: PuzzleId,
    /// Whether this puzzle must be solved before the final gate opens
    pub required: bool,
    /// Clue fragment awarded for solving this puzzle
    pub clue: Option<Clue>,
    /// Canonical answer, compared case-insensitively
    pub answer: String,
    /// Category hint shown to players
    pub hint: String,
    /// Presentation family
    #[serde(rename = "type")]
    pub kind: PuzzleKind,
    /// Player-facing presentation
    #[serde(flatten)]
    pub display: PuzzleDisplay,
    /// Whether any teammate has solved this puzzle
    #[serde(default)]
    pub solved: bool,
}

/// One team's paths, keyed by difficulty tier
pub type TeamBranches = EnumMap<Difficulty, Vec<BranchPuzzle>>;

/// Builds every team's paths from tier settings and sampled puzzle pools
///
/// The pools are consumed without replacement, so no puzzle appears
/// twice anywhere in the game. The last enabled tier's clue list gets
/// the shape-revealing sentinel appended before assignment, then each
/// path is shuffled so clue positions stop lining up with serve order.
///
/// # Arguments
///
/// * `teams` - Team names, each of which receives its own paths
/// * `branches` - Validated per-tier settings
/// * `pools` - Sampled puzzles per tier, at least `teams × max_path` each
///
/// # Errors
///
/// Returns `Error::Validation` if no tier is enabled or a pool is too
/// small to fill every team's path.
pub fn build(
    teams: &[String],
    branches: &EnumMap<Difficulty, BranchConfig>,
    mut pools: EnumMap<Difficulty, Vec<Puzzle>>,
) -> Result<HashMap<String, TeamBranches>> {
    let last_enabled = branches
        .iter()
        .filter(|(_, config)| config.enabled)
        .map(|(difficulty, _)| difficulty)
        .last()
        .ok_or_else(|| Error::Validation("at least one difficulty must be enabled".to_owned()))?;

    let clue_lists: EnumMap<Difficulty, Vec<Clue>> = EnumMap::from_fn(|difficulty| {
        let mut clues = branches[difficulty]
            .clues
            .iter()
            .cloned()
            .map(Clue::from)
            .collect_vec();
        if difficulty == last_enabled {
            clues.push(Clue::NumLet);
        }
        clues
    });

    let mut built: HashMap<String, TeamBranches> = teams
        .iter()
        .map(|team| (team.clone(), TeamBranches::default()))
        .collect();

    for (difficulty, config) in branches {
        if !config.enabled {
            continue;
        }
        let pool = &mut pools[difficulty];
        let needed = teams.len() * config.max_path;
        if pool.len() < needed {
            return Err(Error::Validation(format!(
                "not enough {difficulty} puzzles to build every path: need {needed}, sampled {}",
                pool.len()
            )));
        }
        for team in teams {
            let mut path = (0..config.max_path)
                .map(|position| {
                    let puzzle = pool.swap_remove(fastrand::usize(..pool.len()));
                    place(
                        puzzle,
                        position,
                        config.max_path,
                        difficulty,
                        &clue_lists[difficulty],
                    )
                })
                .collect_vec();
            fastrand::shuffle(&mut path);
            if let Some(team_branches) = built.get_mut(team) {
                team_branches[difficulty] = path;
            }
        }
    }

    Ok(built)
}

/// Turns a sampled puzzle into the path entry at `position`
fn place(
    puzzle: Puzzle,
    position: usize,
    max_path: usize,
    difficulty: Difficulty,
    clues: &[Clue],
) -> BranchPuzzle {
    let display = puzzle.display();
    BranchPuzzle {
        puzzle_id: puzzle.puzzle_id,
        required: draw_required(max_path, difficulty, position),
        clue: clues.get(position).cloned(),
        answer: puzzle.answer,
        hint: puzzle.hint,
        kind: puzzle.kind,
        display,
        solved: false,
    }
}

/// Draws whether the entry at `position` must be solved for the gate
///
/// A uniform draw from `0..max_path` must exceed the position plus the
/// tier's modifier, so later positions and harder tiers come out
/// required less often.
fn draw_required(max_path: usize, difficulty: Difficulty, position: usize) -> bool {
    fastrand::usize(..max_path) > position + difficulty.required_modifier()
}
