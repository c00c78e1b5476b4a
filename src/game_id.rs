//! Game ID generation and management
//!
//! This module provides functionality for generating and managing unique game IDs
//! that are used to identify game sessions. Game IDs are short uppercase base-36
//! codes so they stay easy to read out loud and to type into a join screen.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::game::ID_LENGTH;

/// Digits of the base-36 alphabet used by game IDs
const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A unique identifier for a game session
///
/// Game IDs are eight random base-36 characters, displayed in uppercase.
/// Lowercase input is accepted when parsing so players can type codes
/// however they like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GameId([u8; ID_LENGTH]);

impl GameId {
    /// Creates a new random game ID
    pub fn new() -> Self {
        let mut code = [0; ID_LENGTH];
        for digit in &mut code {
            *digit = DIGITS[fastrand::usize(..DIGITS.len())];
        }
        Self(code)
    }
}

impl Default for GameId {
    /// Creates a new random game ID (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for GameId {
    /// Formats the game ID as an eight-character uppercase code
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(std::str::from_utf8(&self.0).map_err(|_| std::fmt::Error)?)
    }
}

/// Errors that can occur when parsing a game ID
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseGameIdError {
    /// The string is not exactly [`ID_LENGTH`] characters long
    #[error("game id must be exactly {ID_LENGTH} characters")]
    Length,
    /// The string contains a character outside digits and letters
    #[error("game id may only contain digits and letters")]
    Charset,
}

impl Serialize for GameId {
    /// Serializes the game ID as an uppercase code string
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GameId {
    /// Deserializes a game ID from a code string
    fn deserialize<D>(deserializer: D) -> Result<GameId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        GameId::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

impl FromStr for GameId {
    type Err = ParseGameIdError;

    /// Parses a game ID from a code string, normalizing to uppercase
    ///
    /// # Errors
    ///
    /// Returns a `ParseGameIdError` if the string has the wrong length or
    /// contains characters outside the base-36 alphabet.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut code = [0; ID_LENGTH];
        if s.len() != ID_LENGTH {
            return Err(ParseGameIdError::Length);
        }
        for (digit, c) in code.iter_mut().zip(s.chars()) {
            if !c.is_ascii_alphanumeric() {
                return Err(ParseGameIdError::Charset);
            }
            *digit = c.to_ascii_uppercase() as u8;
        }
        Ok(Self(code))
    }
}
