use serde::Deserialize;

use crate::error::{Error, Result};

fn default_prefix_modes() -> String {
    "ov".to_string()
}

fn default_codec() -> String {
    "utf-8".to_string()
}

/// Settings the network hands down to its users and channels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NetworkConfig {
    pub network_id: u32,
    pub own_nick: String,
    /// Channel user modes the server advertises in `PREFIX`, e.g. `ov`.
    #[serde(default = "default_prefix_modes")]
    pub prefix_modes: String,
    #[serde(default = "default_codec")]
    pub codec_for_encoding: String,
    #[serde(default = "default_codec")]
    pub codec_for_decoding: String,
}

impl NetworkConfig {
    pub fn builder() -> NetworkConfigBuilder {
        NetworkConfigBuilder::new()
    }

    pub fn from_toml(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }
}

pub struct NetworkConfigBuilder {
    network_id: Option<u32>,
    own_nick: Option<String>,
    prefix_modes: String,
    codec_for_encoding: String,
    codec_for_decoding: String,
}

impl NetworkConfigBuilder {
    pub fn new() -> Self {
        NetworkConfigBuilder {
            network_id: None,
            own_nick: None,
            prefix_modes: default_prefix_modes(),
            codec_for_encoding: default_codec(),
            codec_for_decoding: default_codec(),
        }
    }

    pub fn build(self) -> Result<NetworkConfig> {
        let network_id = match self.network_id {
            Some(network_id) => network_id,
            None => return Err(Error::MissingNetworkId),
        };

        let own_nick = match self.own_nick {
            Some(own_nick) if !own_nick.is_empty() => own_nick,
            _ => return Err(Error::MissingOwnNick),
        };

        Ok(NetworkConfig {
            network_id,
            own_nick,
            prefix_modes: self.prefix_modes,
            codec_for_encoding: self.codec_for_encoding,
            codec_for_decoding: self.codec_for_decoding,
        })
    }

    pub fn network_id(mut self, network_id: u32) -> Self {
        self.network_id = Some(network_id);
        self
    }

    pub fn own_nick<T: Into<String>>(mut self, own_nick: T) -> Self {
        self.own_nick = Some(own_nick.into());
        self
    }

    pub fn prefix_modes<T: Into<String>>(mut self, prefix_modes: T) -> Self {
        self.prefix_modes = prefix_modes.into();
        self
    }

    pub fn codec_for_encoding<T: Into<String>>(mut self, label: T) -> Self {
        self.codec_for_encoding = label.into();
        self
    }

    pub fn codec_for_decoding<T: Into<String>>(mut self, label: T) -> Self {
        self.codec_for_decoding = label.into();
        self
    }
}

impl Default for NetworkConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
