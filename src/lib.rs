pub mod config;
pub mod error;
pub mod hash;
pub mod map;
pub mod ring;
pub mod store;

pub use config::{HashAlgorithm, RingConfig, DEFAULT_REPLICAS};
pub use error::{Error, Result};
pub use map::ConsistentMap;
pub use ring::Ring;
