//! The session that owns every user and channel of one IRC network.
//!
//! Users and channels never own each other. Membership is stored twice, as
//! the user's channel set and as the channel's member -> modes map, and the
//! join/part layer in this module is the only code that edits either side.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::channels::{Channel, ChannelId, ChannelMut, IrcChannel};
use crate::codec::Codec;
use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::event::{ChannelEvent, Event, UserEvent};
use crate::event_handler::EventHandler;
use crate::hostmask::nick_from_mask;
use crate::users::{IrcUser, User, UserId, UserMut};

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

pub struct Network {
    config: NetworkConfig,
    my_nick: String,
    codec_for_encoding: Codec,
    codec_for_decoding: Codec,

    pub(crate) users: HashMap<UserId, IrcUser>,
    pub(crate) channels: HashMap<ChannelId, IrcChannel>,
    nicks: HashMap<String, UserId>,
    channel_names: HashMap<String, ChannelId>,
    next_id: u32,

    pending_destruction: Vec<UserId>,
    orphans: BTreeSet<UserId>,

    event_handlers: Vec<Arc<dyn EventHandler>>,
}

impl Network {
    pub fn new(config: NetworkConfig) -> Result<Self> {
        Ok(Network {
            codec_for_encoding: Codec::for_label(&config.codec_for_encoding)?,
            codec_for_decoding: Codec::for_label(&config.codec_for_decoding)?,
            my_nick: config.own_nick.clone(),
            config,
            users: HashMap::new(),
            channels: HashMap::new(),
            nicks: HashMap::new(),
            channel_names: HashMap::new(),
            next_id: 0,
            pending_destruction: Vec::new(),
            orphans: BTreeSet::new(),
            event_handlers: Vec::new(),
        })
    }

    pub fn add_event_handler<H: EventHandler + 'static>(&mut self, event_handler: H) {
        self.event_handlers.push(Arc::new(event_handler));
    }

    pub fn network_id(&self) -> u32 {
        self.config.network_id
    }

    pub fn my_nick(&self) -> &str {
        &self.my_nick
    }

    pub fn prefix_modes(&self) -> &str {
        &self.config.prefix_modes
    }

    pub fn codec_for_encoding(&self) -> &Codec {
        &self.codec_for_encoding
    }

    pub fn codec_for_decoding(&self) -> &Codec {
        &self.codec_for_decoding
    }

    pub fn decode_string(&self, text: &[u8]) -> String {
        self.codec_for_decoding.decode(text)
    }

    pub fn encode_string(&self, string: &str) -> Vec<u8> {
        self.codec_for_encoding.encode(string)
    }

    pub fn is_me(&self, user: UserId) -> bool {
        self.users
            .get(&user)
            .is_some_and(|user| user.nick.eq_ignore_ascii_case(&self.my_nick))
    }

    pub fn user(&self, id: UserId) -> Option<User<'_>> {
        self.users.get(&id).map(|data| User { network: self, data })
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<UserMut<'_>> {
        if !self.users.contains_key(&id) {
            return None;
        }
        Some(UserMut { network: self, id })
    }

    pub fn channel(&self, id: ChannelId) -> Option<Channel<'_>> {
        self.channels.get(&id).map(|data| Channel { network: self, data })
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> Option<ChannelMut<'_>> {
        if !self.channels.contains_key(&id) {
            return None;
        }
        Some(ChannelMut { network: self, id })
    }

    pub fn irc_user(&self, nick: &str) -> Option<User<'_>> {
        self.nicks.get(&key(nick)).and_then(|id| self.user(*id))
    }

    pub fn irc_channel(&self, name: &str) -> Option<Channel<'_>> {
        self.channel_names.get(&key(name)).and_then(|id| self.channel(*id))
    }

    pub fn irc_users(&self) -> impl Iterator<Item = User<'_>> {
        self.users.values().map(move |data| User { network: self, data })
    }

    pub fn irc_channels(&self) -> impl Iterator<Item = Channel<'_>> {
        self.channels.values().map(move |data| Channel { network: self, data })
    }

    pub(crate) fn require_user(&self, nick: &str) -> Result<UserId> {
        self.nicks
            .get(&key(nick))
            .copied()
            .ok_or_else(|| Error::UnknownUser(nick.to_string()))
    }

    pub(crate) fn require_channel(&self, name: &str) -> Result<ChannelId> {
        self.channel_names
            .get(&key(name))
            .copied()
            .ok_or_else(|| Error::UnknownChannel(name.to_string()))
    }

    pub(crate) fn nick_of(&self, user: UserId) -> Option<String> {
        self.users.get(&user).map(|user| user.nick.clone())
    }

    /// Looks up the user `mask` names, creating it if needed.
    pub fn new_irc_user(&mut self, mask: &str) -> Option<UserId> {
        let nick = nick_from_mask(mask);
        if nick.is_empty() {
            warn!(mask, "refusing to create user without nick");
            return None;
        }
        if let Some(id) = self.nicks.get(&key(&nick)) {
            return Some(*id);
        }

        let id = UserId(self.next_id);
        self.next_id += 1;
        let user = IrcUser::new(id, mask, self.config.network_id);
        debug!(object_name = user.object_name(), "new user");
        let hostmask = user.hostmask();
        self.users.insert(id, user);
        self.nicks.insert(key(&nick), id);
        self.emit(Event::UserAdded { id, hostmask });
        Some(id)
    }

    pub fn new_irc_channel(&mut self, name: &str) -> Option<ChannelId> {
        if name.is_empty() {
            warn!("refusing to create channel without name");
            return None;
        }
        if let Some(id) = self.channel_names.get(&key(name)) {
            return Some(*id);
        }

        let id = ChannelId(self.next_id);
        self.next_id += 1;
        debug!(channel = name, "new channel");
        self.channels.insert(id, IrcChannel::new(id, name));
        self.channel_names.insert(key(name), id);
        self.emit(Event::ChannelAdded { id, name: name.to_string() });
        Some(id)
    }

    /// Destroys a channel. Members lose the channel without parting it, and
    /// any of them left without channels is scheduled for destruction.
    /// Members still get a `ChannelParted` so mirrors drop the channel too.
    pub fn remove_channel(&mut self, id: ChannelId) {
        let Some(channel) = self.channels.remove(&id) else {
            return;
        };
        self.channel_names.remove(&key(channel.name()));
        debug!(channel = channel.name(), "channel destroyed");

        let mut released = Vec::new();
        for member in channel.user_modes.keys() {
            let Some(user) = self.users.get_mut(member) else {
                continue;
            };
            if !user.channels.remove(&id) {
                continue;
            }
            released.push((*member, user.nick.clone()));
            if user.channels.is_empty() {
                self.schedule_destruction(*member);
            }
        }
        released.sort();
        for (member, nick) in released {
            self.emit_user(member, nick, UserEvent::ChannelParted(channel.name().to_string()));
        }
        self.emit(Event::ChannelRemoved { id, name: channel.name().to_string() });
    }

    /// Destroys a user, e.g. after it quit. Channels drop it first.
    pub fn remove_irc_user(&mut self, id: UserId) {
        let Some(user) = self.users.remove(&id) else {
            return;
        };
        if self.nicks.get(&key(&user.nick)) == Some(&id) {
            self.nicks.remove(&key(&user.nick));
        }
        self.orphans.remove(&id);
        self.pending_destruction.retain(|pending| *pending != id);
        debug!(object_name = user.object_name(), "user destroyed");

        for channel_id in &user.channels {
            let Some(channel) = self.channels.get_mut(channel_id) else {
                continue;
            };
            if channel.user_modes.remove(&id).is_some() {
                let name = channel.name().to_string();
                self.emit_channel(*channel_id, name, ChannelEvent::UserParted { nick: user.nick.clone() });
            }
        }
        self.emit(Event::UserRemoved { id, nick: user.nick });
    }

    fn schedule_destruction(&mut self, id: UserId) {
        if !self.pending_destruction.contains(&id) {
            self.pending_destruction.push(id);
        }
    }

    pub fn pending_destruction(&self) -> &[UserId] {
        &self.pending_destruction
    }

    /// Destroys scheduled users that still have no channels. Returns how
    /// many were destroyed.
    pub fn process_pending_destruction(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_destruction);
        let mut destroyed = 0;
        for id in pending {
            match self.users.get(&id) {
                Some(user) if user.channels.is_empty() => {
                    self.remove_irc_user(id);
                    destroyed += 1;
                }
                _ => {}
            }
        }
        destroyed
    }

    /// Users other than us that parted their last channel. They are eligible
    /// for destruction but only [`reap_orphans`](Self::reap_orphans) removes them.
    pub fn orphaned_users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.orphans.iter().copied()
    }

    pub fn reap_orphans(&mut self) -> usize {
        let orphans = std::mem::take(&mut self.orphans);
        let mut destroyed = 0;
        for id in orphans {
            match self.users.get(&id) {
                Some(user) if user.channels.is_empty() && !self.is_me(id) => {
                    self.remove_irc_user(id);
                    destroyed += 1;
                }
                _ => {}
            }
        }
        destroyed
    }

    pub(crate) fn rename_user(&mut self, id: UserId, nick: &str) {
        let Some(user) = self.users.get_mut(&id) else {
            return;
        };
        if nick.is_empty() || user.nick == nick {
            return;
        }
        if self.nicks.get(&key(nick)).is_some_and(|holder| *holder != id) {
            warn!(old = %user.nick, nick, "refusing nick change onto a known user");
            return;
        }

        let old = std::mem::replace(&mut user.nick, nick.to_string());
        user.update_object_name();
        let channels: Vec<ChannelId> = user.channels.iter().copied().collect();

        if self.nicks.get(&key(&old)) == Some(&id) {
            self.nicks.remove(&key(&old));
        }
        self.nicks.insert(key(nick), id);
        if old.eq_ignore_ascii_case(&self.my_nick) {
            self.my_nick = nick.to_string();
        }

        self.emit_user(id, nick.to_string(), UserEvent::NickSet { old: old.clone(), new: nick.to_string() });
        for channel_id in channels {
            if let Some(channel) = self.channels.get(&channel_id) {
                let name = channel.name().to_string();
                let event = ChannelEvent::MemberNickSet { old: old.clone(), new: nick.to_string() };
                self.emit_channel(channel_id, name, event);
            }
        }
    }

    /// Joins every `(user, modes)` pair that isn't a member yet. Both sides
    /// are updated before any notification goes out.
    pub(crate) fn join(&mut self, channel_id: ChannelId, members: &[(UserId, String)]) {
        let Some(channel) = self.channels.get_mut(&channel_id) else {
            warn!(?channel_id, "join for unknown channel");
            return;
        };
        let name = channel.name().to_string();

        let mut joined = Vec::new();
        for (user_id, modes) in members {
            let Some(user) = self.users.get_mut(user_id) else {
                warn!(?user_id, channel = %name, "join for unknown user");
                continue;
            };
            let in_user = user.channels.contains(&channel_id);
            let in_channel = channel.user_modes.contains_key(user_id);
            if in_user && in_channel {
                continue;
            }
            if in_user != in_channel {
                asymmetric_membership(&user.nick, &name);
            }

            user.channels.insert(channel_id);
            channel.user_modes.entry(*user_id).or_insert_with(|| modes.clone());
            self.orphans.remove(user_id);
            joined.push((*user_id, user.nick.clone(), modes.clone()));
        }

        if joined.is_empty() {
            return;
        }
        for (user_id, nick, _) in &joined {
            self.emit_user(*user_id, nick.clone(), UserEvent::ChannelJoined(name.clone()));
        }
        let (nicks, modes) = joined.into_iter().map(|(_, nick, modes)| (nick, modes)).unzip();
        self.emit_channel(channel_id, name, ChannelEvent::UsersJoined { nicks, modes });
    }

    pub(crate) fn part(&mut self, user_id: UserId, channel_id: ChannelId) {
        let (Some(user), Some(channel)) = (self.users.get_mut(&user_id), self.channels.get_mut(&channel_id)) else {
            return;
        };
        let in_user = user.channels.remove(&channel_id);
        let in_channel = channel.user_modes.remove(&user_id).is_some();
        if !in_user && !in_channel {
            return;
        }
        if in_user != in_channel {
            asymmetric_membership(&user.nick, channel.name());
        }

        let nick = user.nick.clone();
        let name = channel.name().to_string();
        let now_empty = user.channels.is_empty();

        self.emit_user(user_id, nick.clone(), UserEvent::ChannelParted(name.clone()));
        self.emit_channel(channel_id, name, ChannelEvent::UserParted { nick });

        if now_empty {
            if self.is_me(user_id) {
                self.schedule_destruction(user_id);
            } else {
                self.orphans.insert(user_id);
            }
        }
    }

    fn emit(&self, event: Event) {
        for event_handler in &self.event_handlers {
            event_handler.on_event(event.clone());
        }
    }

    pub(crate) fn emit_user(&self, id: UserId, nick: String, event: UserEvent) {
        self.emit(Event::User { id, nick, event });
    }

    pub(crate) fn emit_channel(&self, id: ChannelId, name: String, event: ChannelEvent) {
        self.emit(Event::Channel { id, name, event });
    }
}

/// Membership recorded on only one side. Unreachable through the public API:
/// debug builds stop here, release builds log and let the caller restore
/// symmetry.
fn asymmetric_membership(nick: &str, channel: &str) {
    error!(nick, channel, "membership recorded on one side only");
    debug_assert!(false, "asymmetric membership between {} and {}", nick, channel);
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Clone, Default)]
    pub(crate) struct Recorder(Arc<Mutex<Vec<Event>>>);

    impl Recorder {
        pub(crate) fn take(&self) -> Vec<Event> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl EventHandler for Recorder {
        fn on_event(&self, event: Event) {
            self.0.lock().unwrap().push(event);
        }
    }

    pub(crate) fn network() -> (Network, Recorder) {
        let config = NetworkConfig::builder().network_id(1).own_nick("me").build().unwrap();
        let mut network = Network::new(config).unwrap();
        let recorder = Recorder::default();
        network.add_event_handler(recorder.clone());
        (network, recorder)
    }

    fn assert_symmetric(network: &Network) {
        for user in network.irc_users() {
            for channel in user.channel_ids() {
                assert!(network.channel(channel).unwrap().is_known_user(user.id()));
            }
        }
        for channel in network.irc_channels() {
            for user in channel.user_ids() {
                assert!(network.user(user).unwrap().is_in(channel.id()));
            }
        }
    }

    #[test]
    fn unknown_codec_in_config() {
        let config = NetworkConfig::builder()
            .network_id(1)
            .own_nick("me")
            .codec_for_decoding("klingon")
            .build()
            .unwrap();
        assert!(matches!(Network::new(config), Err(Error::UnknownCodec(_))));
    }

    #[test]
    fn lookups_ignore_case() {
        let (mut network, _) = network();
        let alice = network.new_irc_user("Alice!a@h").unwrap();
        let chan = network.new_irc_channel("#Rust").unwrap();
        assert_eq!(network.new_irc_user("alice"), Some(alice));
        assert_eq!(network.irc_channel("#rust").unwrap().id(), chan);
        assert_eq!(network.irc_user("ALICE").unwrap().hostmask(), "Alice!a@h");
        assert_eq!(network.new_irc_user("!user@host"), None);
        assert_eq!(network.new_irc_channel(""), None);
    }

    #[test]
    fn join_part_symmetry() {
        let (mut network, recorder) = network();
        let alice = network.new_irc_user("alice").unwrap();
        let chan = network.new_irc_channel("#x").unwrap();
        recorder.take();

        let mut user = network.user_mut(alice).unwrap();
        user.join_channel(chan);
        user.join_channel(chan);
        assert!(network.user(alice).unwrap().is_in(chan));
        assert!(network.channel(chan).unwrap().is_known_user(alice));
        assert_symmetric(&network);
        assert_eq!(
            recorder.take(),
            vec![
                Event::User { id: alice, nick: "alice".to_string(), event: UserEvent::ChannelJoined("#x".to_string()) },
                Event::Channel {
                    id: chan,
                    name: "#x".to_string(),
                    event: ChannelEvent::UsersJoined { nicks: vec!["alice".to_string()], modes: vec![String::new()] },
                },
            ]
        );

        let mut user = network.user_mut(alice).unwrap();
        user.part_channel(chan);
        user.part_channel(chan);
        assert!(!network.user(alice).unwrap().is_in(chan));
        assert!(!network.channel(chan).unwrap().is_known_user(alice));
        assert_eq!(
            recorder.take(),
            vec![
                Event::User { id: alice, nick: "alice".to_string(), event: UserEvent::ChannelParted("#x".to_string()) },
                Event::Channel {
                    id: chan,
                    name: "#x".to_string(),
                    event: ChannelEvent::UserParted { nick: "alice".to_string() },
                },
            ]
        );
    }

    #[test]
    fn channel_side_part_updates_user() {
        let (mut network, _) = network();
        let chan = network.new_irc_channel("#x").unwrap();
        network.channel_mut(chan).unwrap().join_irc_users_by_nick(&["alice", "bob"], &["o", "v"]);
        let alice = network.irc_user("alice").unwrap().id();

        network.channel_mut(chan).unwrap().part_by_nick("alice");
        assert!(network.user(alice).unwrap().channels().is_empty());
        assert_eq!(network.channel(chan).unwrap().irc_users().count(), 1);
        assert_symmetric(&network);
    }

    #[test]
    fn join_and_part_by_name() {
        let (mut network, _) = network();
        let alice = network.new_irc_user("alice").unwrap();

        let mut user = network.user_mut(alice).unwrap();
        user.join_channel_by_name("#one");
        user.join_channel_by_name("#two");
        user.part_channel_by_name("#nowhere");
        user.part_channel_by_name("#ONE");

        assert_eq!(network.user(alice).unwrap().channels(), vec!["#two".to_string()]);
        assert_symmetric(&network);
    }

    #[test]
    fn rename_preserves_member_modes() {
        let (mut network, recorder) = network();
        let chan = network.new_irc_channel("#x").unwrap();
        network.channel_mut(chan).unwrap().join_irc_users_by_nick(&["alice"], &["o"]);
        let alice = network.irc_user("alice").unwrap().id();
        recorder.take();

        network.user_mut(alice).unwrap().set_nick("bob");

        let channel = network.channel(chan).unwrap();
        assert_eq!(channel.user_modes_by_nick("bob"), "o");
        assert_eq!(channel.user_modes_by_nick("alice"), "");
        assert_eq!(channel.user_modes(alice), "o");
        assert_eq!(
            recorder.take(),
            vec![
                Event::User {
                    id: alice,
                    nick: "bob".to_string(),
                    event: UserEvent::NickSet { old: "alice".to_string(), new: "bob".to_string() },
                },
                Event::Channel {
                    id: chan,
                    name: "#x".to_string(),
                    event: ChannelEvent::MemberNickSet { old: "alice".to_string(), new: "bob".to_string() },
                },
            ]
        );
    }

    #[test]
    fn rename_onto_known_nick_is_refused() {
        let (mut network, recorder) = network();
        let chan = network.new_irc_channel("#x").unwrap();
        network.channel_mut(chan).unwrap().join_irc_users_by_nick(&["alice", "bob"], &["o", "v"]);
        let alice = network.irc_user("alice").unwrap().id();
        recorder.take();

        network.user_mut(alice).unwrap().set_nick("BOB");
        assert!(recorder.take().is_empty());
        assert_eq!(network.user(alice).unwrap().nick(), "alice");
        assert_eq!(network.irc_user("alice").unwrap().id(), alice);

        let channel = network.channel(chan).unwrap();
        assert_eq!(channel.user_modes_by_nick("alice"), "o");
        assert_eq!(channel.user_modes_by_nick("bob"), "v");

        network.user_mut(alice).unwrap().set_nick("Alice");
        assert_eq!(network.irc_user("alice").unwrap().nick(), "Alice");
    }

    #[test]
    fn renaming_own_user_follows_identity() {
        let (mut network, _) = network();
        let me = network.new_irc_user("me").unwrap();
        assert!(network.is_me(me));

        network.user_mut(me).unwrap().set_nick("me_");
        assert_eq!(network.my_nick(), "me_");
        assert!(network.user(me).unwrap().is_me());
    }

    #[test]
    fn parting_last_channel_orphans_other_users() {
        let (mut network, recorder) = network();
        let alice = network.new_irc_user("alice").unwrap();
        let chan = network.new_irc_channel("#x").unwrap();

        let mut user = network.user_mut(alice).unwrap();
        user.join_channel(chan);
        user.part_channel(chan);

        assert!(network.channel(chan).unwrap().user_ids().next().is_none());
        assert_eq!(network.orphaned_users().collect::<Vec<_>>(), vec![alice]);
        assert!(network.pending_destruction().is_empty());

        recorder.take();
        assert_eq!(network.reap_orphans(), 1);
        assert!(network.user(alice).is_none());
        assert!(network.irc_user("alice").is_none());
        assert_eq!(recorder.take(), vec![Event::UserRemoved { id: alice, nick: "alice".to_string() }]);
    }

    #[test]
    fn rejoining_clears_orphan() {
        let (mut network, _) = network();
        let alice = network.new_irc_user("alice").unwrap();

        let mut user = network.user_mut(alice).unwrap();
        user.join_channel_by_name("#x");
        user.part_channel_by_name("#x");
        user.join_channel_by_name("#y");

        assert_eq!(network.orphaned_users().count(), 0);
        assert_eq!(network.reap_orphans(), 0);
        assert!(network.user(alice).is_some());
    }

    #[test]
    fn parting_last_channel_schedules_own_user() {
        let (mut network, _) = network();
        let me = network.new_irc_user("me").unwrap();

        let mut user = network.user_mut(me).unwrap();
        user.join_channel_by_name("#x");
        user.part_channel_by_name("#x");

        assert_eq!(network.pending_destruction(), &[me]);
        assert_eq!(network.orphaned_users().count(), 0);
        assert_eq!(network.process_pending_destruction(), 1);
        assert!(network.user(me).is_none());
    }

    #[test]
    fn destroyed_channel_releases_members() {
        let (mut network, recorder) = network();
        let chan = network.new_irc_channel("#x").unwrap();
        let other = network.new_irc_channel("#y").unwrap();
        network.channel_mut(chan).unwrap().join_irc_users_by_nick(&["alice", "bob"], &["", ""]);
        network.channel_mut(other).unwrap().join_irc_user_by_nick("bob");
        let alice = network.irc_user("alice").unwrap().id();
        let bob = network.irc_user("bob").unwrap().id();
        recorder.take();

        network.remove_channel(chan);
        assert!(network.irc_channel("#x").is_none());
        assert_eq!(
            recorder.take(),
            vec![
                Event::User { id: alice, nick: "alice".to_string(), event: UserEvent::ChannelParted("#x".to_string()) },
                Event::User { id: bob, nick: "bob".to_string(), event: UserEvent::ChannelParted("#x".to_string()) },
                Event::ChannelRemoved { id: chan, name: "#x".to_string() },
            ]
        );
        assert_eq!(network.pending_destruction(), &[alice]);
        assert_eq!(network.user(bob).unwrap().channels(), vec!["#y".to_string()]);
        assert_symmetric(&network);

        assert_eq!(network.process_pending_destruction(), 1);
        assert!(network.user(alice).is_none());
        assert!(network.user(bob).is_some());
    }

    #[test]
    fn pending_user_that_rejoined_survives() {
        let (mut network, _) = network();
        let chan = network.new_irc_channel("#x").unwrap();
        network.channel_mut(chan).unwrap().join_irc_user_by_nick("alice");
        let alice = network.irc_user("alice").unwrap().id();

        network.remove_channel(chan);
        network.user_mut(alice).unwrap().join_channel_by_name("#y");

        assert_eq!(network.process_pending_destruction(), 0);
        assert!(network.user(alice).is_some());
    }

    #[test]
    fn removed_user_leaves_channels() {
        let (mut network, recorder) = network();
        let chan = network.new_irc_channel("#x").unwrap();
        network.channel_mut(chan).unwrap().join_irc_users_by_nick(&["alice", "bob"], &["o", ""]);
        let alice = network.irc_user("alice").unwrap().id();
        recorder.take();

        network.remove_irc_user(alice);
        assert!(!network.channel(chan).unwrap().is_known_user(alice));
        assert_eq!(network.channel(chan).unwrap().user_modes_by_nick("alice"), "");
        assert_eq!(
            recorder.take(),
            vec![
                Event::Channel {
                    id: chan,
                    name: "#x".to_string(),
                    event: ChannelEvent::UserParted { nick: "alice".to_string() },
                },
                Event::UserRemoved { id: alice, nick: "alice".to_string() },
            ]
        );
        assert_symmetric(&network);
    }

    #[tokio::test]
    async fn events_reach_channel_subscribers() {
        let (mut network, _) = network();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        network.add_event_handler(tx);

        let chan = network.new_irc_channel("#x").unwrap();
        network.channel_mut(chan).unwrap().set_topic("welcome");

        let forward = tokio::spawn(async move {
            let mut events = Vec::new();
            while let Some(event) = rx.recv().await {
                events.push(event);
            }
            events
        });
        drop(network);

        assert_eq!(
            forward.await.unwrap(),
            vec![
                Event::ChannelAdded { id: chan, name: "#x".to_string() },
                Event::Channel { id: chan, name: "#x".to_string(), event: ChannelEvent::TopicSet("welcome".to_string()) },
            ]
        );
    }
}
