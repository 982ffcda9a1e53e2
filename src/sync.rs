//! Snapshot/delta replication.
//!
//! A remote observer initializes a user or channel from its `init_state`
//! snapshot and afterwards keeps it current by applying the notifications the
//! network emits. The same snapshots are what `init_set_*` imports on the
//! receiving side.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::channels::{Channel, ChannelMut};
use crate::event::{ChannelEvent, UserEvent};
use crate::modes::{add_mode, remove_mode};
use crate::users::{User, UserMut};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    pub nick: String,
    pub user: String,
    pub host: String,
    pub real_name: String,
    pub away: bool,
    pub away_message: String,
    pub idle_time: Option<DateTime<Utc>>,
    pub server: String,
    pub irc_operator: String,
    pub last_away_message: i32,
    pub user_modes: String,
    /// Membership is unordered, so this compares as a set.
    pub channels: BTreeSet<String>,
}

impl UserState {
    pub fn apply(&mut self, event: &UserEvent) {
        match event {
            UserEvent::UserSet(user) => self.user = user.clone(),
            UserEvent::HostSet(host) => self.host = host.clone(),
            UserEvent::NickSet { new, .. } => self.nick = new.clone(),
            UserEvent::RealNameSet(real_name) => self.real_name = real_name.clone(),
            UserEvent::AwaySet(away) => self.away = *away,
            UserEvent::AwayMessageSet(message) => self.away_message = message.clone(),
            UserEvent::IdleTimeSet(idle_time) => self.idle_time = Some(*idle_time),
            UserEvent::ServerSet(server) => self.server = server.clone(),
            UserEvent::IrcOperatorSet(irc_operator) => self.irc_operator = irc_operator.clone(),
            UserEvent::LastAwayMessageSet(n) => self.last_away_message = *n,
            UserEvent::UserModesSet(modes) => self.user_modes = modes.clone(),
            UserEvent::UserModeAdded(mode) => {
                add_mode(&mut self.user_modes, *mode);
            }
            UserEvent::UserModeRemoved(mode) => {
                remove_mode(&mut self.user_modes, *mode);
            }
            UserEvent::ChannelJoined(channel) => {
                self.channels.insert(channel.clone());
            }
            UserEvent::ChannelParted(channel) => {
                self.channels.remove(channel);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    pub name: String,
    pub topic: String,
    pub password: String,
    /// Nick -> modes.
    pub user_modes: BTreeMap<String, String>,
}

impl ChannelState {
    pub fn apply(&mut self, event: &ChannelEvent) {
        match event {
            ChannelEvent::TopicSet(topic) => self.topic = topic.clone(),
            ChannelEvent::PasswordSet(password) => self.password = password.clone(),
            ChannelEvent::UserModesSet { nick, modes } => {
                if let Some(entry) = self.user_modes.get_mut(nick) {
                    *entry = modes.clone();
                }
            }
            ChannelEvent::UserModeAdded { nick, mode } => {
                if let Some(entry) = self.user_modes.get_mut(nick) {
                    add_mode(entry, *mode);
                }
            }
            ChannelEvent::UserModeRemoved { nick, mode } => {
                if let Some(entry) = self.user_modes.get_mut(nick) {
                    remove_mode(entry, *mode);
                }
            }
            ChannelEvent::UsersJoined { nicks, modes } => {
                for (nick, modes) in nicks.iter().zip(modes) {
                    self.user_modes.entry(nick.clone()).or_insert_with(|| modes.clone());
                }
            }
            ChannelEvent::UserParted { nick } => {
                self.user_modes.remove(nick);
            }
            ChannelEvent::MemberNickSet { old, new } => {
                if let Some(modes) = self.user_modes.remove(old) {
                    self.user_modes.insert(new.clone(), modes);
                }
            }
        }
    }
}

impl User<'_> {
    pub fn init_state(&self) -> UserState {
        UserState {
            nick: self.nick().to_string(),
            user: self.user().to_string(),
            host: self.host().to_string(),
            real_name: self.real_name().to_string(),
            away: self.is_away(),
            away_message: self.away_message().to_string(),
            idle_time: Some(self.idle_time()),
            server: self.server().to_string(),
            irc_operator: self.irc_operator().to_string(),
            last_away_message: self.last_away_message(),
            user_modes: self.user_modes().to_string(),
            channels: self.channels().into_iter().collect(),
        }
    }
}

impl UserMut<'_> {
    pub fn init_set_state(&mut self, state: &UserState) {
        self.set_nick(&state.nick);
        self.set_user(&state.user);
        self.set_host(&state.host);
        self.set_real_name(&state.real_name);
        self.set_away(state.away);
        self.set_away_message(&state.away_message);
        if let Some(idle_time) = state.idle_time {
            self.set_idle_time(idle_time);
        }
        self.set_server(&state.server);
        self.set_irc_operator(&state.irc_operator);
        self.set_last_away_message(state.last_away_message);
        self.set_user_modes(&state.user_modes);
        self.init_set_channels(&state.channels);
    }
}

impl Channel<'_> {
    /// Member modes keyed by nick.
    pub fn init_user_modes(&self) -> BTreeMap<String, String> {
        self.irc_users()
            .map(|user| (user.nick().to_string(), self.data.user_modes(user.id()).to_string()))
            .collect()
    }

    pub fn init_state(&self) -> ChannelState {
        ChannelState {
            name: self.name().to_string(),
            topic: self.topic().to_string(),
            password: self.password().to_string(),
            user_modes: self.init_user_modes(),
        }
    }
}

impl ChannelMut<'_> {
    /// Joins the snapshot's users that aren't members yet and sets the modes
    /// of those that are.
    pub fn init_set_user_modes(&mut self, user_modes: &BTreeMap<String, String>) {
        let mut nicks = Vec::new();
        let mut modes = Vec::new();
        for (nick, user_modes) in user_modes {
            let known = self
                .network
                .irc_user(nick)
                .is_some_and(|user| user.is_in(self.id));
            if known {
                self.set_user_modes_by_nick(nick, user_modes);
            } else {
                nicks.push(nick.as_str());
                modes.push(user_modes.as_str());
            }
        }
        self.join_irc_users_by_nick(&nicks, &modes);
    }

    pub fn init_set_state(&mut self, state: &ChannelState) {
        self.set_topic(&state.topic);
        self.set_password(&state.password);
        self.init_set_user_modes(&state.user_modes);
    }
}
