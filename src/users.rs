use std::collections::BTreeSet;
use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::channels::{Channel, ChannelId};
use crate::codec::{Codec, CodecBinding};
use crate::error::Result;
use crate::event::UserEvent;
use crate::hostmask::{host_from_mask, hostmask, nick_from_mask, user_from_mask};
use crate::modes::{add_mode, remove_mode};
use crate::network::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub(crate) u32);

#[derive(Debug, Clone)]
pub struct IrcUser {
    id: UserId,
    network_id: u32,
    object_name: String,

    pub(crate) nick: String,
    user: String,
    host: String,
    real_name: String,

    away: bool,
    away_message: String,
    idle_time: DateTime<Utc>,
    server: String,
    irc_operator: String,
    last_away_message: i32,
    user_modes: String,

    pub(crate) channels: BTreeSet<ChannelId>,
    pub(crate) codecs: CodecBinding,
}

impl IrcUser {
    pub(crate) fn new(id: UserId, mask: &str, network_id: u32) -> Self {
        let mut user = IrcUser {
            id,
            network_id,
            object_name: String::new(),
            nick: nick_from_mask(mask),
            user: user_from_mask(mask),
            host: host_from_mask(mask),
            real_name: String::new(),
            away: false,
            away_message: String::new(),
            idle_time: Utc::now(),
            server: String::new(),
            irc_operator: String::new(),
            last_away_message: 0,
            user_modes: String::new(),
            channels: BTreeSet::new(),
            codecs: CodecBinding::default(),
        };
        user.update_object_name();
        user
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    /// Label the sync layer addresses this user by, `<network id>/<nick>`.
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn real_name(&self) -> &str {
        &self.real_name
    }

    pub fn hostmask(&self) -> String {
        hostmask(&self.nick, &self.user, &self.host)
    }

    pub fn is_away(&self) -> bool {
        self.away
    }

    pub fn away_message(&self) -> &str {
        &self.away_message
    }

    pub fn idle_time(&self) -> DateTime<Utc> {
        self.idle_time
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn irc_operator(&self) -> &str {
        &self.irc_operator
    }

    pub fn last_away_message(&self) -> i32 {
        self.last_away_message
    }

    pub fn user_modes(&self) -> &str {
        &self.user_modes
    }

    pub fn channel_ids(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.channels.iter().copied()
    }

    pub fn is_in(&self, channel: ChannelId) -> bool {
        self.channels.contains(&channel)
    }

    pub fn codec_for_encoding(&self) -> Option<Codec> {
        self.codecs.encoding
    }

    pub fn codec_for_decoding(&self) -> Option<Codec> {
        self.codecs.decoding
    }

    pub(crate) fn update_object_name(&mut self) {
        self.object_name = format!("{}/{}", self.network_id, self.nick);
    }

    fn replace(field: &mut String, value: &str) -> bool {
        if value.is_empty() || field == value {
            return false;
        }
        *field = value.to_string();
        true
    }

    fn set_user(&mut self, user: &str) -> Option<UserEvent> {
        Self::replace(&mut self.user, user).then(|| UserEvent::UserSet(user.to_string()))
    }

    fn set_host(&mut self, host: &str) -> Option<UserEvent> {
        Self::replace(&mut self.host, host).then(|| UserEvent::HostSet(host.to_string()))
    }

    fn set_real_name(&mut self, real_name: &str) -> Option<UserEvent> {
        Self::replace(&mut self.real_name, real_name).then(|| UserEvent::RealNameSet(real_name.to_string()))
    }

    fn set_away(&mut self, away: bool) -> Option<UserEvent> {
        if self.away == away {
            return None;
        }
        self.away = away;
        Some(UserEvent::AwaySet(away))
    }

    fn set_away_message(&mut self, away_message: &str) -> Option<UserEvent> {
        Self::replace(&mut self.away_message, away_message)
            .then(|| UserEvent::AwayMessageSet(away_message.to_string()))
    }

    fn set_idle_time(&mut self, idle_time: DateTime<Utc>) -> Option<UserEvent> {
        if self.idle_time == idle_time {
            return None;
        }
        self.idle_time = idle_time;
        Some(UserEvent::IdleTimeSet(idle_time))
    }

    fn set_server(&mut self, server: &str) -> Option<UserEvent> {
        Self::replace(&mut self.server, server).then(|| UserEvent::ServerSet(server.to_string()))
    }

    fn set_irc_operator(&mut self, irc_operator: &str) -> Option<UserEvent> {
        Self::replace(&mut self.irc_operator, irc_operator)
            .then(|| UserEvent::IrcOperatorSet(irc_operator.to_string()))
    }

    fn set_last_away_message(&mut self, last_away_message: i32) -> Option<UserEvent> {
        if last_away_message <= self.last_away_message {
            return None;
        }
        self.last_away_message = last_away_message;
        Some(UserEvent::LastAwayMessageSet(last_away_message))
    }

    fn set_user_modes(&mut self, modes: &str) -> Option<UserEvent> {
        self.user_modes = modes.to_string();
        Some(UserEvent::UserModesSet(modes.to_string()))
    }

    fn add_user_mode(&mut self, mode: char) -> Option<UserEvent> {
        add_mode(&mut self.user_modes, mode).then_some(UserEvent::UserModeAdded(mode))
    }

    fn remove_user_mode(&mut self, mode: char) -> Option<UserEvent> {
        remove_mode(&mut self.user_modes, mode).then_some(UserEvent::UserModeRemoved(mode))
    }
}

/// Read access to a user together with the network it belongs to.
#[derive(Clone, Copy)]
pub struct User<'a> {
    pub(crate) network: &'a Network,
    pub(crate) data: &'a IrcUser,
}

impl<'a> User<'a> {
    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// Names of the channels this user is in.
    pub fn channels(&self) -> Vec<String> {
        self.irc_channels().map(|channel| channel.name().to_string()).collect()
    }

    pub fn irc_channels(&self) -> impl Iterator<Item = Channel<'a>> + 'a {
        let network = self.network;
        self.data.channels.iter().filter_map(move |id| network.channel(*id))
    }

    pub fn is_me(&self) -> bool {
        self.network.is_me(self.data.id)
    }

    pub fn decode_string(&self, text: &[u8]) -> String {
        self.data.codecs.decode_string(text, self.network.codec_for_decoding())
    }

    pub fn encode_string(&self, string: &str) -> Vec<u8> {
        self.data.codecs.encode_string(string, self.network.codec_for_encoding())
    }
}

impl Deref for User<'_> {
    type Target = IrcUser;

    fn deref(&self) -> &IrcUser {
        self.data
    }
}

/// Mutation access to a user. Every change that sticks emits exactly one
/// [`UserEvent`].
pub struct UserMut<'a> {
    pub(crate) network: &'a mut Network,
    pub(crate) id: UserId,
}

impl UserMut<'_> {
    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn get(&self) -> Option<User<'_>> {
        self.network.user(self.id)
    }

    fn update<F>(&mut self, change: F)
    where
        F: FnOnce(&mut IrcUser) -> Option<UserEvent>,
    {
        let Some(user) = self.network.users.get_mut(&self.id) else {
            return;
        };
        let Some(event) = change(user) else {
            trace!(user = %user.nick, "ignoring redundant user update");
            return;
        };
        let nick = user.nick.clone();
        self.network.emit_user(self.id, nick, event);
    }

    pub fn set_user(&mut self, user: &str) {
        self.update(|u| u.set_user(user))
    }

    pub fn set_host(&mut self, host: &str) {
        self.update(|u| u.set_host(host))
    }

    pub fn set_real_name(&mut self, real_name: &str) {
        self.update(|u| u.set_real_name(real_name))
    }

    /// Renames the user. The nick index and object name are updated before
    /// the notification goes out.
    pub fn set_nick(&mut self, nick: &str) {
        self.network.rename_user(self.id, nick)
    }

    pub fn update_hostmask(&mut self, mask: &str) {
        match self.network.users.get(&self.id) {
            Some(user) if user.hostmask() != mask => {}
            _ => return,
        }
        self.set_user(&user_from_mask(mask));
        self.set_host(&host_from_mask(mask));
    }

    pub fn set_away(&mut self, away: bool) {
        self.update(|u| u.set_away(away))
    }

    pub fn set_away_message(&mut self, away_message: &str) {
        self.update(|u| u.set_away_message(away_message))
    }

    pub fn set_idle_time(&mut self, idle_time: DateTime<Utc>) {
        self.update(|u| u.set_idle_time(idle_time))
    }

    /// Like [`set_idle_time`](Self::set_idle_time), from Unix seconds.
    /// Timestamps chrono can't represent are ignored.
    pub fn set_idle_time_secs(&mut self, secs: i64) {
        match DateTime::<Utc>::from_timestamp(secs, 0) {
            Some(idle_time) => self.set_idle_time(idle_time),
            None => trace!(secs, "ignoring malformed idle time"),
        }
    }

    pub fn set_server(&mut self, server: &str) {
        self.update(|u| u.set_server(server))
    }

    pub fn set_irc_operator(&mut self, irc_operator: &str) {
        self.update(|u| u.set_irc_operator(irc_operator))
    }

    /// Only ever moves forward, so stale or duplicate away replies are dropped.
    pub fn set_last_away_message(&mut self, last_away_message: i32) {
        self.update(|u| u.set_last_away_message(last_away_message))
    }

    pub fn set_user_modes(&mut self, modes: &str) {
        self.update(|u| u.set_user_modes(modes))
    }

    pub fn add_user_mode(&mut self, mode: char) {
        self.update(|u| u.add_user_mode(mode))
    }

    pub fn remove_user_mode(&mut self, mode: char) {
        self.update(|u| u.remove_user_mode(mode))
    }

    pub fn join_channel(&mut self, channel: ChannelId) {
        match self.network.users.get(&self.id) {
            Some(user) if !user.channels.contains(&channel) => {}
            _ => return,
        }
        self.network.join(channel, &[(self.id, String::new())]);
    }

    pub fn join_channel_by_name(&mut self, name: &str) {
        if let Some(channel) = self.network.new_irc_channel(name) {
            self.join_channel(channel);
        }
    }

    pub fn part_channel(&mut self, channel: ChannelId) {
        self.network.part(self.id, channel);
    }

    pub fn part_channel_by_name(&mut self, name: &str) {
        match self.network.require_channel(name) {
            Ok(channel) => self.part_channel(channel),
            Err(err) => warn!(%err, "received part for unknown channel"),
        }
    }

    /// Bulk join used when importing a snapshot.
    pub fn init_set_channels<I, S>(&mut self, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for channel in channels {
            self.join_channel_by_name(channel.as_ref());
        }
    }

    pub fn set_codec_for_encoding(&mut self, label: &str) -> Result<()> {
        let codec = Codec::for_label(label)?;
        if let Some(user) = self.network.users.get_mut(&self.id) {
            user.codecs.encoding = Some(codec);
        }
        Ok(())
    }

    pub fn set_codec_for_decoding(&mut self, label: &str) -> Result<()> {
        let codec = Codec::for_label(label)?;
        if let Some(user) = self.network.users.get_mut(&self.id) {
            user.codecs.decoding = Some(codec);
        }
        Ok(())
    }

    pub fn clear_codecs(&mut self) {
        if let Some(user) = self.network.users.get_mut(&self.id) {
            user.codecs = CodecBinding::default();
        }
    }
}
