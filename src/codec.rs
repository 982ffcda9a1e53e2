//! Text codecs for users and channels.
//!
//! Every user and channel may override the codec its network uses for
//! turning raw protocol bytes into text and back.

use std::fmt;

use encoding::Encoding;

use crate::error::{Error, Result};

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Codec(&'static Encoding);

impl Codec {
    /// Resolve a WHATWG encoding label such as `utf-8` or `latin1`.
    pub fn for_label(label: &str) -> Result<Self> {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => Ok(Codec(encoding)),
            None => Err(Error::UnknownCodec(label.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Valid UTF-8 is taken as is, anything else goes through the codec.
    pub fn decode(&self, text: &[u8]) -> String {
        if let Ok(text) = std::str::from_utf8(text) {
            return text.to_string();
        }
        let (decoded, _) = self.0.decode_without_bom_handling(text);
        decoded.into_owned()
    }

    pub fn encode(&self, string: &str) -> Vec<u8> {
        let (encoded, _, _) = self.0.encode(string);
        encoded.into_owned()
    }
}

impl Default for Codec {
    fn default() -> Self {
        Codec(encoding::UTF_8)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codec({})", self.name())
    }
}

/// Optional per-entity override of the network's codecs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CodecBinding {
    pub encoding: Option<Codec>,
    pub decoding: Option<Codec>,
}

impl CodecBinding {
    pub fn decode_string(&self, text: &[u8], fallback: &Codec) -> String {
        self.decoding.as_ref().unwrap_or(fallback).decode(text)
    }

    pub fn encode_string(&self, string: &str, fallback: &Codec) -> Vec<u8> {
        self.encoding.as_ref().unwrap_or(fallback).encode(string)
    }
}
