use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config builder is missing a network id! Set it using `builder.network_id(...)`")]
    MissingNetworkId,

    #[error("Config builder is missing the own nick! Set it using `builder.own_nick(...)`")]
    MissingOwnNick,

    #[error("unknown codec: {0}")]
    UnknownCodec(String),

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
