//! Pub/sub channel topics and message envelopes
//!
//! This module defines the topics the engine publishes to, the envelope
//! wrapping every message, and the payload shapes carried by lobby and
//! team chat events. The publisher trait abstracts the channel service
//! itself; implementations might back it with any realtime broker, and
//! all publishes are fire-and-forget with no delivery guarantee.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::game_id::GameId;

/// A pub/sub topic the engine publishes to
///
/// The string form is the topic name clients subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum Topic {
    /// Game-wide feed for roster changes and game start
    #[display("lobby-{_0}")]
    Lobby(GameId),
    /// A single team's chat feed, also carrying clue and password events
    #[display("chat-{_0}-{_1}")]
    TeamChat(GameId, String),
}

/// Recognized event names on the channel service
///
/// Some of these are only ever published by clients (chatting, marking
/// presence); they share the namespace so subscribers can match on one
/// enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventName {
    /// A player picked a team
    JoinedTeam,
    /// A player left the game, voluntarily or removed by the host
    LeaveRoom,
    /// A client announced itself on the lobby feed
    EnteredLobby,
    /// The host started the game
    GameStart,
    /// A plain chat message between teammates
    Chat,
    /// A client announced itself on a team chat feed
    Enter,
    /// A teammate solved a puzzle that carried a clue fragment
    GetClue,
    /// The final password was opened and the game is over
    SuccessPassword,
    /// A password attempt bounced off the door
    FailPassword,
}

/// Message envelope published to a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Recognized event name
    pub name: EventName,
    /// Event payload, shaped per event
    pub data: serde_json::Value,
}

impl Envelope {
    /// Wraps a payload under an event name
    pub fn new(name: EventName, data: &impl Serialize) -> Self {
        Self {
            name,
            data: serde_json::to_value(data).expect("default serializer cannot fail"),
        }
    }

    /// Converts the envelope to a JSON string for transmission
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Trait for publishing envelopes to the channel service
///
/// Publishes are fire-and-forget; a lost message is acceptable because
/// the persisted documents stay the source of truth and clients re-fetch.
pub trait ChannelPublisher {
    /// Publishes an envelope to a topic
    ///
    /// # Arguments
    ///
    /// * `topic` - The topic to publish on
    /// * `envelope` - The named event and its payload
    fn publish(&self, topic: &Topic, envelope: &Envelope);
}

impl<C: ChannelPublisher + ?Sized> ChannelPublisher for &C {
    fn publish(&self, topic: &Topic, envelope: &Envelope) {
        (**self).publish(topic, envelope);
    }
}

/// Payload of lobby feed events
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyData {
    /// Human-readable line shown in the lobby feed
    pub display: String,
    /// Name of the player the event concerns
    pub player: Option<String>,
    /// Team the event concerns
    pub team: Option<String>,
    /// Identifier of the player the event concerns
    pub id: Option<String>,
}

/// Payload of team chat feed events
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatData {
    /// Free-form author label, set by clients on plain chat messages
    pub author: Option<String>,
    /// Message text shown in the chat feed
    pub text: String,
    /// Attribution shown next to the message
    pub id: String,
    /// Structured extra carried by clue discoveries
    pub extra: Option<ChatExtra>,
    /// Screen area the event belongs to
    pub area: AreaRef,
}

/// Structured extra of a clue discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatExtra {
    /// The discovered clue fragment
    pub clue: String,
}

/// Screen area reference attached to chat events
///
/// Path slots are named `path-{n}` with one-based positions; the
/// password gate is named `final`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRef {
    /// Area name
    pub name: String,
    /// Optional display label
    pub display: Option<String>,
}

impl AreaRef {
    /// References a path slot by its zero-based position
    pub fn path(position: usize) -> Self {
        Self {
            name: format!("path-{}", position + 1),
            display: Some(String::new()),
        }
    }

    /// References the final password gate
    pub fn final_gate() -> Self {
        Self {
            name: "final".to_owned(),
            display: None,
        }
    }
}
