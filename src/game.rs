//! Game document and read-side aggregations
//!
//! This module contains the persisted game document and everything
//! derived from it for serving: team rosters for the lobby, the answer-
//! free path listing, the final password gate, the results summary, and
//! the host's phase-dependent dashboard view.

use std::{cmp::Reverse, collections::BTreeMap};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::SystemTime;

use crate::{
    branch::{BranchPuzzle, Clue, TeamBranches},
    game_id::GameId,
    player::Player,
    puzzle::{Difficulty, PuzzleDisplay, PuzzleId, PuzzleKind},
};

/// Outcome of a finished game
///
/// Stored and transmitted as a plain string, where `"tie"` is reserved
/// for a draw. Team validation keeps that word out of team names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(from = "String", into = "String")]
pub enum Winner {
    /// The team with the strictly highest total score
    #[display("{_0}")]
    Team(String),
    /// No team had a strictly higher total than every other
    #[display("tie")]
    Tie,
}

impl From<String> for Winner {
    fn from(value: String) -> Self {
        if value == "tie" {
            Self::Tie
        } else {
            Self::Team(value)
        }
    }
}

impl From<Winner> for String {
    fn from(winner: Winner) -> Self {
        winner.to_string()
    }
}

/// A game document
///
/// Built once at creation and mutated in three narrow ways afterwards:
/// marking a path puzzle solved, stamping the start time, and stamping
/// the outcome with the end time.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Join code players enter to find the game
    pub game_id: GameId,
    /// Final password guarding the door, compared case-insensitively
    pub password: String,
    /// Host credential required for host operations
    pub admin_password: String,
    /// Team names in display order
    pub teams: Vec<String>,
    /// Each team's paths, keyed by team name
    pub branches: std::collections::HashMap<String, TeamBranches>,
    /// When the host started the game
    pub start_at: Option<SystemTime>,
    /// When the game ended
    pub end_at: Option<SystemTime>,
    /// Outcome, present once the game has ended
    pub winner: Option<Winner>,
}

impl Game {
    /// Whether the host has started the game
    pub fn has_started(&self) -> bool {
        self.start_at.is_some()
    }

    /// Whether the game has ended
    pub fn has_ended(&self) -> bool {
        self.end_at.is_some()
    }

    /// Looks up a team's paths
    pub fn team_branches(&self, team: &str) -> Option<&TeamBranches> {
        self.branches.get(team)
    }

    /// Finds a puzzle on one team's paths
    ///
    /// # Returns
    ///
    /// The tier, the position within the path, and the entry itself
    pub fn find_puzzle(
        &self,
        team: &str,
        puzzle_id: &PuzzleId,
    ) -> Option<(Difficulty, usize, &BranchPuzzle)> {
        self.team_branches(team)?
            .iter()
            .flat_map(|(difficulty, path)| {
                path.iter()
                    .enumerate()
                    .map(move |(position, entry)| (difficulty, position, entry))
            })
            .find(|(_, _, entry)| entry.puzzle_id == *puzzle_id)
    }

    /// Finds a puzzle on any team's paths, searching teams in display order
    pub fn find_puzzle_anywhere(
        &self,
        puzzle_id: &PuzzleId,
    ) -> Option<(&str, Difficulty, usize, &BranchPuzzle)> {
        self.teams.iter().find_map(|team| {
            self.find_puzzle(team, puzzle_id)
                .map(|(difficulty, position, entry)| {
                    (team.as_str(), difficulty, position, entry)
                })
        })
    }

    /// The password with every letter and digit hidden
    ///
    /// Other characters pass through, so the shape of spaces and
    /// punctuation stays visible.
    pub fn masked_password(&self) -> String {
        self.password
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { '_' } else { c })
            .collect()
    }

    /// Assembles the final gate view for one team
    ///
    /// Collects the clue fragments the team has earned so far. The
    /// password's shape stays hidden behind `"?"` until the team solves
    /// the puzzle carrying the synthetic shape clue.
    pub fn final_puzzle(&self, team: &str) -> Option<FinalPuzzle> {
        let branches = self.team_branches(team)?;
        let mut clues = Vec::new();
        let mut show_shape = false;
        for (_, path) in branches {
            for entry in path {
                match &entry.clue {
                    Some(Clue::NumLet) => show_shape = entry.solved,
                    Some(Clue::Word(word)) if entry.solved => clues.push(word.clone()),
                    _ => {}
                }
            }
        }
        Some(FinalPuzzle {
            display: if show_shape {
                self.masked_password()
            } else {
                "?".to_owned()
            },
            clues,
        })
    }

    /// Assembles the answer-free path listing for one team
    ///
    /// Lists only the entry identifiers with their required flags, plus
    /// each tier's category hints deduplicated in first-seen order.
    /// Tiers with no paths are left out entirely.
    pub fn path_list(&self, team: &str) -> Option<PathList> {
        let branches = self.team_branches(team)?;
        let mut branch_return = BTreeMap::new();
        let mut hints = BTreeMap::new();
        for (difficulty, path) in branches {
            if path.is_empty() {
                continue;
            }
            branch_return.insert(
                difficulty,
                path.iter()
                    .map(|entry| PathEntry {
                        puzzle_id: entry.puzzle_id.clone(),
                        required: entry.required,
                    })
                    .collect(),
            );
            hints.insert(
                difficulty,
                path.iter().map(|entry| entry.hint.clone()).unique().collect(),
            );
        }
        Some(PathList {
            branch_return,
            hints,
        })
    }

    /// Groups player names by team for the lobby view
    ///
    /// Teams appear in display order and players without a team are
    /// left out.
    pub fn lobby(&self, players: &[Player]) -> Vec<TeamRoster> {
        self.teams
            .iter()
            .map(|team| TeamRoster {
                team: team.clone(),
                players: players
                    .iter()
                    .filter(|player| player.team.as_deref() == Some(team))
                    .map(|player| player.name.clone())
                    .sorted()
                    .collect(),
            })
            .collect()
    }

    /// Decides the outcome from the current rosters
    ///
    /// A team wins only with a strictly higher total than every other
    /// team; equal tops are a draw. Players without a team count for
    /// nobody.
    pub fn decide_winner(&self, players: &[Player]) -> Winner {
        let totals = self
            .teams
            .iter()
            .map(|team| {
                let score = players
                    .iter()
                    .filter(|player| player.team.as_deref() == Some(team))
                    .map(|player| player.score)
                    .sum::<u64>();
                (team.clone(), score)
            })
            .sorted_by_key(|&(_, score)| Reverse(score))
            .collect_vec();
        match totals.as_slice() {
            [(first, top), (_, second), ..] if top > second => Winner::Team(first.clone()),
            [(only, _)] => Winner::Team(only.clone()),
            _ => Winner::Tie,
        }
    }

    /// Assembles the results summary
    ///
    /// Rosters follow team display order with players sorted by score,
    /// highest first. The winner is absent until the game has ended.
    pub fn results(&self, players: &[Player]) -> GameResults {
        let teams = self
            .teams
            .iter()
            .map(|team| TeamScores {
                team: team.clone(),
                players: players
                    .iter()
                    .filter(|player| player.team.as_deref() == Some(team))
                    .map(|player| PlayerScore {
                        name: player.name.clone(),
                        score: player.score,
                    })
                    .sorted_by_key(|entry| (Reverse(entry.score), entry.name.clone()))
                    .collect(),
            })
            .collect();
        GameResults {
            winner: self.winner.clone(),
            teams,
        }
    }

    /// Assembles the host dashboard view for the game's current phase
    ///
    /// Before the start it shows the lobby with an extra bucket for
    /// players who have not picked a team. Mid-game it adds the answer
    /// sheet. After the end it shows the outcome with rosters sorted by
    /// score.
    pub fn host_view(&self, players: &[Player]) -> HostView {
        let mut list: Vec<HostRoster> = self
            .teams
            .iter()
            .map(|team| HostRoster {
                team: team.clone(),
                players: Vec::new(),
            })
            .collect();
        if !self.has_started() && !self.has_ended() {
            list.push(HostRoster {
                team: HostRoster::UNASSIGNED.to_owned(),
                players: Vec::new(),
            });
        }
        for player in players {
            let team = player.team.as_deref().unwrap_or(HostRoster::UNASSIGNED);
            let position = match list.iter().position(|roster| roster.team == team) {
                Some(position) => position,
                None => {
                    list.push(HostRoster {
                        team: team.to_owned(),
                        players: Vec::new(),
                    });
                    list.len() - 1
                }
            };
            list[position].players.push(HostPlayer {
                name: player.name.clone(),
                id: player.player_id,
                score: player.score,
            });
        }
        for roster in &mut list {
            roster.players.sort_by_key(|player| player.name.clone());
        }

        if self.has_ended() {
            for roster in &mut list {
                roster
                    .players
                    .sort_by_key(|player| (Reverse(player.score), player.name.clone()));
            }
            HostView::Results {
                winner: self.winner.clone(),
                list,
            }
        } else if self.has_started() {
            HostView::Paths {
                answer_list: self.answer_sheet(),
                list,
            }
        } else {
            HostView::Lobby { list }
        }
    }

    /// Builds the host's answer sheet, keyed by team
    ///
    /// Every path slot appears as `pathway-{tier}-{position}` with
    /// one-based positions, next to a `final` entry holding the
    /// password.
    fn answer_sheet(&self) -> BTreeMap<String, BTreeMap<String, HostAnswer>> {
        self.teams
            .iter()
            .filter_map(|team| Some((team, self.team_branches(team)?)))
            .map(|(team, branches)| {
                let mut sheet = BTreeMap::new();
                sheet.insert(
                    "final".to_owned(),
                    HostAnswer {
                        display: None,
                        answer: self.password.clone(),
                        hint: None,
                    },
                );
                for (difficulty, path) in branches {
                    for (position, entry) in path.iter().enumerate() {
                        sheet.insert(
                            format!("pathway-{difficulty}-{}", position + 1),
                            HostAnswer {
                                display: Some(entry.display.display.clone()),
                                answer: entry.answer.clone(),
                                hint: Some(entry.hint.clone()),
                            },
                        );
                    }
                }
                (team.clone(), sheet)
            })
            .collect()
    }
}

/// The final gate as served to one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPuzzle {
    /// The password's shape, or `"?"` while the shape clue is unsolved
    pub display: String,
    /// Clue fragments the team has earned, in path order
    pub clues: Vec<String>,
}

/// One entry of the answer-free path listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathEntry {
    /// Identifier to request the puzzle by
    pub puzzle_id: PuzzleId,
    /// Whether this slot gates the final door
    pub required: bool,
}

/// The answer-free path listing for one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathList {
    /// Entry identifiers per tier, in path order
    pub branch_return: BTreeMap<Difficulty, Vec<PathEntry>>,
    /// Category hints per tier, deduplicated in first-seen order
    pub hints: BTreeMap<Difficulty, Vec<String>>,
}

/// A path puzzle as served to a player, with the secrets stripped
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleView {
    /// Identifier of the repository puzzle
    pub puzzle_id: PuzzleId,
    /// Whether this slot gates the final door
    pub required: bool,
    /// Category hint shown to players
    pub hint: String,
    /// Presentation family
    #[serde(rename = "type")]
    pub kind: PuzzleKind,
    /// Player-facing presentation
    #[serde(flatten)]
    pub display: PuzzleDisplay,
    /// Whether a teammate has solved this puzzle
    pub solved: bool,
}

impl From<&BranchPuzzle> for PuzzleView {
    fn from(entry: &BranchPuzzle) -> Self {
        Self {
            puzzle_id: entry.puzzle_id.clone(),
            required: entry.required,
            hint: entry.hint.clone(),
            kind: entry.kind,
            display: entry.display.clone(),
            solved: entry.solved,
        }
    }
}

/// One team's player names for the lobby view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRoster {
    /// Team name
    pub team: String,
    /// Names of the players on this team
    pub players: Vec<String>,
}

/// One player's line on the results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    /// Display name
    pub name: String,
    /// Accumulated score
    pub score: u64,
}

/// One team's roster on the results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScores {
    /// Team name
    pub team: String,
    /// Players sorted by score, highest first
    pub players: Vec<PlayerScore>,
}

/// The results summary served to everyone after the game
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResults {
    /// Outcome, absent until the game has ended
    pub winner: Option<Winner>,
    /// Team rosters in display order
    pub teams: Vec<TeamScores>,
}

/// One player's line on the host dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPlayer {
    /// Display name
    pub name: String,
    /// Identifier usable for removal
    pub id: crate::player::PlayerId,
    /// Accumulated score
    pub score: u64,
}

/// One roster bucket on the host dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRoster {
    /// Team name, or the unassigned bucket
    pub team: String,
    /// Players in this bucket
    pub players: Vec<HostPlayer>,
}

impl HostRoster {
    /// Bucket name for players who have not picked a team
    pub const UNASSIGNED: &'static str = "noteam";
}

/// One line of the host's answer sheet
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAnswer {
    /// Served display, absent on the final gate entry
    pub display: Option<String>,
    /// The answer itself
    pub answer: String,
    /// Category hint, absent on the final gate entry
    pub hint: Option<String>,
}

/// The host dashboard view, tagged by game phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostView {
    /// Rosters before the game starts, including the unassigned bucket
    Lobby {
        /// Roster buckets
        list: Vec<HostRoster>,
    },
    /// Rosters and the answer sheet while the game runs
    Paths {
        /// Answer sheet keyed by team
        #[serde(rename = "answerList")]
        answer_list: BTreeMap<String, BTreeMap<String, HostAnswer>>,
        /// Roster buckets
        list: Vec<HostRoster>,
    },
    /// Outcome and score-sorted rosters after the game ends
    Results {
        /// Outcome of the game
        winner: Option<Winner>,
        /// Roster buckets
        list: Vec<HostRoster>,
    },
}
