use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::channels::ChannelId;
use crate::users::UserId;

/// One notification per committed mutation, emitted after both sides of a
/// relation have been updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    UserAdded { id: UserId, hostmask: String },
    UserRemoved { id: UserId, nick: String },
    ChannelAdded { id: ChannelId, name: String },
    ChannelRemoved { id: ChannelId, name: String },
    /// `nick` is the nick after the change.
    User { id: UserId, nick: String, event: UserEvent },
    Channel { id: ChannelId, name: String, event: ChannelEvent },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserEvent {
    UserSet(String),
    HostSet(String),
    NickSet { old: String, new: String },
    RealNameSet(String),
    AwaySet(bool),
    AwayMessageSet(String),
    IdleTimeSet(DateTime<Utc>),
    ServerSet(String),
    IrcOperatorSet(String),
    LastAwayMessageSet(i32),
    UserModesSet(String),
    UserModeAdded(char),
    UserModeRemoved(char),
    ChannelJoined(String),
    ChannelParted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelEvent {
    TopicSet(String),
    PasswordSet(String),
    UserModesSet { nick: String, modes: String },
    UserModeAdded { nick: String, mode: char },
    UserModeRemoved { nick: String, mode: char },
    /// `nicks` and `modes` are parallel lists.
    UsersJoined { nicks: Vec<String>, modes: Vec<String> },
    UserParted { nick: String },
    MemberNickSet { old: String, new: String },
}
