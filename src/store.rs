//! Storage seams for game, player, and puzzle documents
//!
//! This module defines the traits the engine persists through, plus an
//! in-memory backend useful for tests and single-process deployments.
//! The traits mirror a document store: whole-document reads and writes,
//! a handful of conditional field updates, and random sampling over the
//! puzzle repository. The conditional updates are the concurrency
//! contract; each returns whether this call performed the transition so
//! racing writers can tell who got there first.

use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use itertools::Itertools;
use thiserror::Error;
use web_time::SystemTime;

use crate::{
    game::{Game, Winner},
    game_id::GameId,
    player::{Player, PlayerId},
    puzzle::{Difficulty, NewPuzzle, Puzzle, PuzzleId},
};

/// Error from a store backend
#[derive(Debug, Error)]
#[error("store failure: {0}")]
pub struct StoreError(String);

impl StoreError {
    /// Wraps a backend failure message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Storage seam for game documents
pub trait GameStore {
    /// Persists a freshly built game
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn insert_game(&self, game: &Game) -> Result<(), StoreError>;

    /// Fetches a game by its join code
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn game(&self, game_id: GameId) -> Result<Option<Game>, StoreError>;

    /// Fetches a game only when the host credential matches
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn game_by_admin(
        &self,
        game_id: GameId,
        admin_password: &str,
    ) -> Result<Option<Game>, StoreError>;

    /// Marks one path entry solved unless it already is
    ///
    /// # Returns
    ///
    /// `true` if this call performed the transition; `false` when the
    /// entry was already solved, or the game or entry does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn mark_solved(
        &self,
        game_id: GameId,
        team: &str,
        difficulty: Difficulty,
        position: usize,
    ) -> Result<bool, StoreError>;

    /// Stamps the start time unless the game has already started
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn set_started(&self, game_id: GameId, at: SystemTime) -> Result<bool, StoreError>;

    /// Stamps the outcome and end time unless the game has already ended
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn set_ended(
        &self,
        game_id: GameId,
        winner: &Winner,
        at: SystemTime,
    ) -> Result<bool, StoreError>;
}

/// Storage seam for player documents
pub trait PlayerStore {
    /// Persists a player, replacing any record with the same IDs
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn insert_player(&self, player: &Player) -> Result<(), StoreError>;

    /// Fetches one player of a game
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn player(&self, game_id: GameId, player_id: PlayerId) -> Result<Option<Player>, StoreError>;

    /// Fetches a player of a game by display name, ignoring case
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn player_by_name(&self, game_id: GameId, name: &str) -> Result<Option<Player>, StoreError>;

    /// Fetches every player of a game, in no particular order
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn players(&self, game_id: GameId) -> Result<Vec<Player>, StoreError>;

    /// Sets a player's team
    ///
    /// # Returns
    ///
    /// `false` if the player does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn set_team(&self, game_id: GameId, player_id: PlayerId, team: &str)
    -> Result<bool, StoreError>;

    /// Adds points to a player's score
    ///
    /// # Returns
    ///
    /// `false` if the player does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn add_score(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        points: u64,
    ) -> Result<bool, StoreError>;

    /// Deletes a player
    ///
    /// # Returns
    ///
    /// `false` if the player did not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn remove_player(&self, game_id: GameId, player_id: PlayerId) -> Result<bool, StoreError>;
}

/// Storage seam for the puzzle repository
pub trait PuzzleStore {
    /// Inserts a puzzle, or refreshes the existing one with the same
    /// answer and difficulty
    ///
    /// A matching puzzle keeps its identifier so games already built on
    /// it stay valid.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn upsert_puzzle(&self, puzzle: NewPuzzle) -> Result<Puzzle, StoreError>;

    /// Fetches a puzzle by identifier
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn puzzle(&self, puzzle_id: &PuzzleId) -> Result<Option<Puzzle>, StoreError>;

    /// Samples up to `count` random puzzles of one difficulty
    ///
    /// Sampling is without replacement; fewer puzzles come back when the
    /// repository holds fewer than `count` at that difficulty.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails.
    fn sample(&self, difficulty: Difficulty, count: usize) -> Result<Vec<Puzzle>, StoreError>;
}

/// In-memory backend for every storage seam
///
/// Interior mutability keeps the conditional updates atomic under the
/// write lock, so the solved-once and stamped-once contracts hold across
/// threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<GameId, Game>>,
    players: RwLock<HashMap<(GameId, PlayerId), Player>>,
    puzzles: RwLock<HashMap<PuzzleId, Puzzle>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::new("state lock poisoned"))
}

fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::new("state lock poisoned"))
}

impl GameStore for MemoryStore {
    fn insert_game(&self, game: &Game) -> Result<(), StoreError> {
        write_lock(&self.games)?.insert(game.game_id, game.clone());
        Ok(())
    }

    fn game(&self, game_id: GameId) -> Result<Option<Game>, StoreError> {
        Ok(read_lock(&self.games)?.get(&game_id).cloned())
    }

    fn game_by_admin(
        &self,
        game_id: GameId,
        admin_password: &str,
    ) -> Result<Option<Game>, StoreError> {
        Ok(read_lock(&self.games)?
            .get(&game_id)
            .filter(|game| game.admin_password == admin_password)
            .cloned())
    }

    fn mark_solved(
        &self,
        game_id: GameId,
        team: &str,
        difficulty: Difficulty,
        position: usize,
    ) -> Result<bool, StoreError> {
        let mut games = write_lock(&self.games)?;
        let Some(entry) = games
            .get_mut(&game_id)
            .and_then(|game| game.branches.get_mut(team))
            .and_then(|branches| branches[difficulty].get_mut(position))
        else {
            return Ok(false);
        };
        if entry.solved {
            return Ok(false);
        }
        entry.solved = true;
        Ok(true)
    }

    fn set_started(&self, game_id: GameId, at: SystemTime) -> Result<bool, StoreError> {
        let mut games = write_lock(&self.games)?;
        let Some(game) = games.get_mut(&game_id) else {
            return Ok(false);
        };
        if game.start_at.is_some() {
            return Ok(false);
        }
        game.start_at = Some(at);
        Ok(true)
    }

    fn set_ended(
        &self,
        game_id: GameId,
        winner: &Winner,
        at: SystemTime,
    ) -> Result<bool, StoreError> {
        let mut games = write_lock(&self.games)?;
        let Some(game) = games.get_mut(&game_id) else {
            return Ok(false);
        };
        if game.end_at.is_some() {
            return Ok(false);
        }
        game.end_at = Some(at);
        game.winner = Some(winner.clone());
        Ok(true)
    }
}

impl PlayerStore for MemoryStore {
    fn insert_player(&self, player: &Player) -> Result<(), StoreError> {
        write_lock(&self.players)?.insert((player.game_id, player.player_id), player.clone());
        Ok(())
    }

    fn player(&self, game_id: GameId, player_id: PlayerId) -> Result<Option<Player>, StoreError> {
        Ok(read_lock(&self.players)?
            .get(&(game_id, player_id))
            .cloned())
    }

    fn player_by_name(&self, game_id: GameId, name: &str) -> Result<Option<Player>, StoreError> {
        let wanted = name.to_lowercase();
        Ok(read_lock(&self.players)?
            .values()
            .find(|player| player.game_id == game_id && player.name.to_lowercase() == wanted)
            .cloned())
    }

    fn players(&self, game_id: GameId) -> Result<Vec<Player>, StoreError> {
        Ok(read_lock(&self.players)?
            .values()
            .filter(|player| player.game_id == game_id)
            .cloned()
            .collect())
    }

    fn set_team(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        team: &str,
    ) -> Result<bool, StoreError> {
        let mut players = write_lock(&self.players)?;
        let Some(player) = players.get_mut(&(game_id, player_id)) else {
            return Ok(false);
        };
        player.team = Some(team.to_owned());
        Ok(true)
    }

    fn add_score(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        points: u64,
    ) -> Result<bool, StoreError> {
        let mut players = write_lock(&self.players)?;
        let Some(player) = players.get_mut(&(game_id, player_id)) else {
            return Ok(false);
        };
        player.score += points;
        Ok(true)
    }

    fn remove_player(&self, game_id: GameId, player_id: PlayerId) -> Result<bool, StoreError> {
        Ok(write_lock(&self.players)?
            .remove(&(game_id, player_id))
            .is_some())
    }
}

impl PuzzleStore for MemoryStore {
    fn upsert_puzzle(&self, puzzle: NewPuzzle) -> Result<Puzzle, StoreError> {
        let mut puzzles = write_lock(&self.puzzles)?;
        let existing = puzzles
            .values()
            .find(|stored| {
                stored.answer == puzzle.answer && stored.difficulty == puzzle.difficulty
            })
            .map(|stored| stored.puzzle_id.clone());
        let mut stored = puzzle.into_puzzle();
        if let Some(puzzle_id) = existing {
            stored.puzzle_id = puzzle_id;
        }
        puzzles.insert(stored.puzzle_id.clone(), stored.clone());
        Ok(stored)
    }

    fn puzzle(&self, puzzle_id: &PuzzleId) -> Result<Option<Puzzle>, StoreError> {
        Ok(read_lock(&self.puzzles)?.get(puzzle_id).cloned())
    }

    fn sample(&self, difficulty: Difficulty, count: usize) -> Result<Vec<Puzzle>, StoreError> {
        let mut pool = read_lock(&self.puzzles)?
            .values()
            .filter(|puzzle| puzzle.difficulty == difficulty)
            .cloned()
            .collect_vec();
        fastrand::shuffle(&mut pool);
        pool.truncate(count);
        Ok(pool)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        branch::{BranchPuzzle, TeamBranches},
        puzzle::{PuzzleDisplay, PuzzleKind},
    };

    fn new_puzzle(answer: &str, difficulty: Difficulty) -> NewPuzzle {
        NewPuzzle {
            answer: answer.to_owned(),
            hint: "Bird".to_owned(),
            difficulty,
            kind: PuzzleKind::Blanks,
            long_text: None,
            image: None,
        }
    }

    fn game_with_one_entry() -> Game {
        let mut team_branches = TeamBranches::default();
        team_branches[Difficulty::Easy].push(BranchPuzzle {
            puzzle_id: PuzzleId::new(),
            required: true,
            clue: None,
            answer: "CROW".to_owned(),
            hint: "Bird".to_owned(),
            kind: PuzzleKind::Blanks,
            display: PuzzleDisplay {
                display: "____".to_owned(),
                desc: None,
                image: None,
                letters_available: vec![],
            },
            solved: false,
        });
        let mut branches = HashMap::new();
        branches.insert("red".to_owned(), team_branches);
        Game {
            game_id: GameId::new(),
            password: "Night Owl".to_owned(),
            admin_password: "hunter2".to_owned(),
            teams: vec!["red".to_owned(), "blue".to_owned()],
            branches,
            start_at: None,
            end_at: None,
            winner: None,
        }
    }

    #[test]
    fn test_mark_solved_transitions_only_once() {
        let store = MemoryStore::new();
        let game = game_with_one_entry();
        let game_id = game.game_id;
        store.insert_game(&game).unwrap();

        assert!(store.mark_solved(game_id, "red", Difficulty::Easy, 0).unwrap());
        assert!(!store.mark_solved(game_id, "red", Difficulty::Easy, 0).unwrap());
        assert!(!store.mark_solved(game_id, "red", Difficulty::Easy, 7).unwrap());
        assert!(!store.mark_solved(game_id, "blue", Difficulty::Easy, 0).unwrap());

        let stored = store.game(game_id).unwrap().unwrap();
        assert!(stored.branches["red"][Difficulty::Easy][0].solved);
    }

    #[test]
    fn test_start_and_end_stamp_once() {
        let store = MemoryStore::new();
        let game = game_with_one_entry();
        let game_id = game.game_id;
        store.insert_game(&game).unwrap();

        assert!(store.set_started(game_id, SystemTime::now()).unwrap());
        assert!(!store.set_started(game_id, SystemTime::now()).unwrap());

        let winner = Winner::Team("red".to_owned());
        assert!(store.set_ended(game_id, &winner, SystemTime::now()).unwrap());
        assert!(!store.set_ended(game_id, &Winner::Tie, SystemTime::now()).unwrap());

        let stored = store.game(game_id).unwrap().unwrap();
        assert_eq!(stored.winner, Some(winner));
        assert!(stored.has_started() && stored.has_ended());

        assert!(!store.set_started(GameId::new(), SystemTime::now()).unwrap());
    }

    #[test]
    fn test_game_by_admin_checks_the_credential() {
        let store = MemoryStore::new();
        let game = game_with_one_entry();
        store.insert_game(&game).unwrap();

        assert!(store.game_by_admin(game.game_id, "hunter2").unwrap().is_some());
        assert!(store.game_by_admin(game.game_id, "wrong").unwrap().is_none());
    }

    #[test]
    fn test_upsert_keeps_the_id_of_a_matching_puzzle() {
        let store = MemoryStore::new();
        let first = store
            .upsert_puzzle(new_puzzle("Crow", Difficulty::Easy))
            .unwrap();

        let mut refreshed = new_puzzle("Crow", Difficulty::Easy);
        refreshed.hint = "Corvid".to_owned();
        let second = store.upsert_puzzle(refreshed).unwrap();
        assert_eq!(second.puzzle_id, first.puzzle_id);
        assert_eq!(
            store.puzzle(&first.puzzle_id).unwrap().unwrap().hint,
            "Corvid"
        );

        let harder = store
            .upsert_puzzle(new_puzzle("Crow", Difficulty::Hard))
            .unwrap();
        assert_ne!(harder.puzzle_id, first.puzzle_id);
    }

    #[test]
    fn test_sample_filters_by_difficulty() {
        let store = MemoryStore::new();
        for answer in ["Crow", "Wren", "Lark"] {
            store.upsert_puzzle(new_puzzle(answer, Difficulty::Easy)).unwrap();
        }
        store.upsert_puzzle(new_puzzle("Osprey", Difficulty::Hard)).unwrap();

        let sampled = store.sample(Difficulty::Easy, 10).unwrap();
        assert_eq!(sampled.len(), 3);
        assert!(sampled.iter().all(|p| p.difficulty == Difficulty::Easy));

        assert_eq!(store.sample(Difficulty::Easy, 2).unwrap().len(), 2);
        assert!(store.sample(Difficulty::Normal, 5).unwrap().is_empty());
    }

    #[test]
    fn test_player_name_lookup_ignores_case() {
        let store = MemoryStore::new();
        let game_id = GameId::new();
        let player = Player::new(game_id, "Wren".to_owned());
        store.insert_player(&player).unwrap();

        assert!(store.player_by_name(game_id, "wren").unwrap().is_some());
        assert!(store.player_by_name(game_id, "WREN").unwrap().is_some());
        assert!(store.player_by_name(game_id, "wre").unwrap().is_none());
        assert!(store.player_by_name(GameId::new(), "wren").unwrap().is_none());
    }

    #[test]
    fn test_score_and_team_updates_need_an_existing_player() {
        let store = MemoryStore::new();
        let game_id = GameId::new();
        let player = Player::new(game_id, "Wren".to_owned());
        store.insert_player(&player).unwrap();

        assert!(store.set_team(game_id, player.player_id, "red").unwrap());
        assert!(store.add_score(game_id, player.player_id, 2).unwrap());
        assert!(store.add_score(game_id, player.player_id, 4).unwrap());
        let stored = store.player(game_id, player.player_id).unwrap().unwrap();
        assert_eq!(stored.score, 6);
        assert_eq!(stored.team.as_deref(), Some("red"));

        let stranger = PlayerId::new();
        assert!(!store.set_team(game_id, stranger, "red").unwrap());
        assert!(!store.add_score(game_id, stranger, 1).unwrap());

        assert!(store.remove_player(game_id, player.player_id).unwrap());
        assert!(!store.remove_player(game_id, player.player_id).unwrap());
        assert!(store.players(game_id).unwrap().is_empty());
    }
}
