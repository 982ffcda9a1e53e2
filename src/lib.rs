//! Live model of IRC session state: users, channels and their membership,
//! kept consistent under a stream of small mutations and replicated to
//! remote observers through snapshots and per-field notifications.

mod channels;
mod codec;
mod config;
mod error;
mod event;
mod event_handler;
mod hostmask;
mod modes;
mod network;
mod sync;
mod users;

pub use channels::{Channel, ChannelId, ChannelMut, IrcChannel};
pub use codec::{Codec, CodecBinding};
pub use config::{NetworkConfig, NetworkConfigBuilder};
pub use error::{Error, Result};
pub use event::{ChannelEvent, Event, UserEvent};
pub use event_handler::EventHandler;
pub use hostmask::{host_from_mask, hostmask, nick_from_mask, user_from_mask};
pub use network::Network;
pub use sync::{ChannelState, UserState};
pub use users::{IrcUser, User, UserId, UserMut};
