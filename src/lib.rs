//! # Pathword Game Library
//!
//! This library provides the core game logic for the Pathword team
//! puzzle game. It handles game creation, per-team puzzle paths, answer
//! checking and scoring, clue announcements over team channels, and the
//! final password gate that decides the winner.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]

pub mod constants;

pub mod branch;
pub mod channel;
pub mod error;
pub mod game;
pub mod game_id;
pub mod player;
pub mod puzzle;
pub mod service;
pub mod store;
