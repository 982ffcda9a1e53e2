use std::collections::HashMap;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::codec::{Codec, CodecBinding};
use crate::error::Result;
use crate::event::ChannelEvent;
use crate::modes::{add_mode, remove_mode};
use crate::network::Network;
use crate::users::{User, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub(crate) u32);

#[derive(Debug, Clone)]
pub struct IrcChannel {
    id: ChannelId,
    name: String,
    topic: String,
    password: String,

    /// Member -> mode string. Only edited through the network's join/part
    /// layer so that it always mirrors the members' own channel sets.
    pub(crate) user_modes: HashMap<UserId, String>,
    pub(crate) codecs: CodecBinding,
}

impl IrcChannel {
    pub(crate) fn new(id: ChannelId, name: &str) -> Self {
        IrcChannel {
            id,
            name: name.to_string(),
            topic: String::new(),
            password: String::new(),
            user_modes: HashMap::new(),
            codecs: CodecBinding::default(),
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_known_user(&self, user: UserId) -> bool {
        self.user_modes.contains_key(&user)
    }

    /// Modes `user` holds here, empty for non-members.
    pub fn user_modes(&self, user: UserId) -> &str {
        self.user_modes.get(&user).map(String::as_str).unwrap_or_default()
    }

    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.user_modes.keys().copied()
    }

    pub fn codec_for_encoding(&self) -> Option<Codec> {
        self.codecs.encoding
    }

    pub fn codec_for_decoding(&self) -> Option<Codec> {
        self.codecs.decoding
    }
}

/// Read access to a channel together with the network it belongs to.
#[derive(Clone, Copy)]
pub struct Channel<'a> {
    pub(crate) network: &'a Network,
    pub(crate) data: &'a IrcChannel,
}

impl<'a> Channel<'a> {
    pub fn network(&self) -> &'a Network {
        self.network
    }

    pub fn irc_users(&self) -> impl Iterator<Item = User<'a>> + 'a {
        let network = self.network;
        self.data.user_modes.keys().filter_map(move |id| network.user(*id))
    }

    pub fn user_modes_by_nick(&self, nick: &str) -> &'a str {
        match self.network.irc_user(nick) {
            Some(user) => self.data.user_modes(user.id()),
            None => "",
        }
    }

    /// Whether `mode` is one of the channel user modes the server announced.
    pub fn is_valid_channel_user_mode(&self, mode: char) -> bool {
        self.network.prefix_modes().contains(mode)
    }

    pub fn decode_string(&self, text: &[u8]) -> String {
        self.data.codecs.decode_string(text, self.network.codec_for_decoding())
    }

    pub fn encode_string(&self, string: &str) -> Vec<u8> {
        self.data.codecs.encode_string(string, self.network.codec_for_encoding())
    }
}

impl Deref for Channel<'_> {
    type Target = IrcChannel;

    fn deref(&self) -> &IrcChannel {
        self.data
    }
}

/// Mutation access to a channel.
pub struct ChannelMut<'a> {
    pub(crate) network: &'a mut Network,
    pub(crate) id: ChannelId,
}

impl ChannelMut<'_> {
    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn get(&self) -> Option<Channel<'_>> {
        self.network.channel(self.id)
    }

    fn update<F>(&mut self, change: F)
    where
        F: FnOnce(&mut IrcChannel) -> Option<ChannelEvent>,
    {
        let Some(channel) = self.network.channels.get_mut(&self.id) else {
            return;
        };
        let Some(event) = change(channel) else {
            trace!(channel = %channel.name, "ignoring redundant channel update");
            return;
        };
        let name = channel.name.clone();
        self.network.emit_channel(self.id, name, event);
    }

    /// An empty topic is a cleared topic, so this always notifies.
    pub fn set_topic(&mut self, topic: &str) {
        self.update(|channel| {
            channel.topic = topic.to_string();
            Some(ChannelEvent::TopicSet(topic.to_string()))
        })
    }

    pub fn set_password(&mut self, password: &str) {
        self.update(|channel| {
            channel.password = password.to_string();
            Some(ChannelEvent::PasswordSet(password.to_string()))
        })
    }

    /// Joins every user that isn't a member yet, with the matching entry of
    /// `modes` as its initial mode string.
    pub fn join_irc_users<S: AsRef<str>>(&mut self, users: &[UserId], modes: &[S]) {
        if users.len() != modes.len() {
            warn!(
                users = users.len(),
                modes = modes.len(),
                "number of users does not match number of modes"
            );
            return;
        }
        let members: Vec<(UserId, String)> = users
            .iter()
            .zip(modes)
            .map(|(user, modes)| (*user, modes.as_ref().to_string()))
            .collect();
        self.network.join(self.id, &members);
    }

    /// Like [`join_irc_users`](Self::join_irc_users), creating users that the
    /// network doesn't know yet.
    pub fn join_irc_users_by_nick<N: AsRef<str>, S: AsRef<str>>(&mut self, nicks: &[N], modes: &[S]) {
        if nicks.len() != modes.len() {
            warn!(
                nicks = nicks.len(),
                modes = modes.len(),
                "number of nicks does not match number of modes"
            );
            return;
        }
        let mut users = Vec::with_capacity(nicks.len());
        let mut user_modes = Vec::with_capacity(modes.len());
        for (nick, modes) in nicks.iter().zip(modes) {
            if let Some(user) = self.network.new_irc_user(nick.as_ref()) {
                users.push(user);
                user_modes.push(modes.as_ref());
            }
        }
        self.join_irc_users(&users, &user_modes);
    }

    pub fn join_irc_user(&mut self, user: UserId) {
        self.join_irc_users(&[user], &[""]);
    }

    pub fn join_irc_user_by_nick(&mut self, nick: &str) {
        self.join_irc_users_by_nick(&[nick], &[""]);
    }

    /// Removes `user` from the channel and the channel from `user`.
    pub fn part(&mut self, user: UserId) {
        self.network.part(user, self.id);
    }

    pub fn part_by_nick(&mut self, nick: &str) {
        match self.network.require_user(nick) {
            Ok(user) => self.part(user),
            Err(err) => warn!(%err, "received part for unknown user"),
        }
    }

    pub fn set_user_modes(&mut self, user: UserId, modes: &str) {
        let Some(nick) = self.network.nick_of(user) else {
            return;
        };
        self.update(|channel| {
            let entry = channel.user_modes.get_mut(&user)?;
            *entry = modes.to_string();
            Some(ChannelEvent::UserModesSet { nick, modes: modes.to_string() })
        })
    }

    pub fn set_user_modes_by_nick(&mut self, nick: &str, modes: &str) {
        match self.network.require_user(nick) {
            Ok(user) => self.set_user_modes(user, modes),
            Err(err) => warn!(%err, "received user modes for unknown user"),
        }
    }

    pub fn add_user_mode(&mut self, user: UserId, mode: char) {
        if !self.network.prefix_modes().contains(mode) {
            trace!(%mode, "ignoring unknown channel user mode");
            return;
        }
        let Some(nick) = self.network.nick_of(user) else {
            return;
        };
        self.update(|channel| {
            let entry = channel.user_modes.get_mut(&user)?;
            add_mode(entry, mode).then_some(ChannelEvent::UserModeAdded { nick, mode })
        })
    }

    pub fn add_user_mode_by_nick(&mut self, nick: &str, mode: char) {
        match self.network.require_user(nick) {
            Ok(user) => self.add_user_mode(user, mode),
            Err(err) => warn!(%err, "received user mode for unknown user"),
        }
    }

    pub fn remove_user_mode(&mut self, user: UserId, mode: char) {
        if !self.network.prefix_modes().contains(mode) {
            trace!(%mode, "ignoring unknown channel user mode");
            return;
        }
        let Some(nick) = self.network.nick_of(user) else {
            return;
        };
        self.update(|channel| {
            let entry = channel.user_modes.get_mut(&user)?;
            remove_mode(entry, mode).then_some(ChannelEvent::UserModeRemoved { nick, mode })
        })
    }

    pub fn remove_user_mode_by_nick(&mut self, nick: &str, mode: char) {
        match self.network.require_user(nick) {
            Ok(user) => self.remove_user_mode(user, mode),
            Err(err) => warn!(%err, "received user mode for unknown user"),
        }
    }

    pub fn set_codec_for_encoding(&mut self, label: &str) -> Result<()> {
        let codec = Codec::for_label(label)?;
        if let Some(channel) = self.network.channels.get_mut(&self.id) {
            channel.codecs.encoding = Some(codec);
        }
        Ok(())
    }

    pub fn set_codec_for_decoding(&mut self, label: &str) -> Result<()> {
        let codec = Codec::for_label(label)?;
        if let Some(channel) = self.network.channels.get_mut(&self.id) {
            channel.codecs.decoding = Some(codec);
        }
        Ok(())
    }

    pub fn clear_codecs(&mut self) {
        if let Some(channel) = self.network.channels.get_mut(&self.id) {
            channel.codecs = CodecBinding::default();
        }
    }
}
