//! Player identity and name management
//!
//! This module defines the player document stored for every participant,
//! the opaque identifier handed back on join, and the validation rules
//! applied to requested display names before they enter a game.

use std::{fmt::Display, str::FromStr};

use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay, skip_serializing_none};
use thiserror::Error;
use uuid::Uuid;

use crate::{constants::names::MAX_NAME_LENGTH, game_id::GameId};

/// A unique identifier for a player within a game
///
/// Issued when the player joins and quoted back by the client on every
/// subsequent request, so it must stay stable for the whole session.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Creates a new random player ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    /// Creates a new random player ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PlayerId {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PlayerId {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Errors that can occur during name validation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
}

impl From<NameError> for crate::error::Error {
    fn from(error: NameError) -> Self {
        Self::Validation(error.to_string())
    }
}

/// Validates a requested display name and strips surrounding whitespace
///
/// Uniqueness within the game is checked separately against the player
/// store, since it needs the game's current roster.
///
/// # Errors
///
/// Returns a [`NameError`] if the name is too long, empty after
/// trimming, or contains inappropriate content.
pub fn clean_name(name: &str) -> Result<String, NameError> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(NameError::TooLong);
    }
    let name = rustrict::trim_whitespace(name);
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.is_inappropriate() {
        return Err(NameError::Sinful);
    }
    Ok(name.to_owned())
}

/// A player record within a game
///
/// Created teamless on join; the team is filled in when the player picks
/// a side and the score accumulates as they solve puzzles.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Game this player belongs to
    pub game_id: GameId,
    /// Stable identifier quoted by the client on every request
    pub player_id: PlayerId,
    /// Validated display name, unique within the game
    #[serde(rename = "playerName")]
    pub name: String,
    /// Chosen team, absent until the player picks a side
    pub team: Option<String>,
    /// Points accumulated from solved puzzles
    pub score: u64,
}

impl Player {
    /// Creates a teamless player with a fresh ID and a zero score
    pub fn new(game_id: GameId, name: String) -> Self {
        Self {
            game_id,
            player_id: PlayerId::new(),
            name,
            team: None,
            score: 0,
        }
    }
}
