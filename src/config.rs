use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::hash::{self, Hasher};

/// Virtual nodes per physical node when nothing else is configured.
pub const DEFAULT_REPLICAS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    #[default]
    Crc32,
    Sha256,
}

impl HashAlgorithm {
    pub fn hasher(self) -> Hasher {
        match self {
            HashAlgorithm::Crc32 => hash::default_hasher(),
            HashAlgorithm::Sha256 => Arc::new(hash::generate_hash32),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match &s.trim().to_lowercase()[..] {
            "crc32" | "crc" => Ok(HashAlgorithm::Crc32),
            "sha256" | "sha" => Ok(HashAlgorithm::Sha256),
            other => Err(Error::Parse(format!("unknown hash algorithm '{}'", other))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Crc32 => write!(f, "crc32"),
            HashAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Construction parameters for a ring. Fixed for the ring's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingConfig {
    pub replicas: usize,
    pub hash: HashAlgorithm,
}

impl Default for RingConfig {
    fn default() -> Self {
        RingConfig {
            replicas: DEFAULT_REPLICAS,
            hash: HashAlgorithm::default(),
        }
    }
}

impl RingConfig {
    pub fn new(replicas: usize) -> Self {
        RingConfig {
            replicas,
            ..Default::default()
        }
    }

    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }
}

pub fn parse_replicas(value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Parse(format!("invalid replica count '{}'", value)))
}

#[test]
fn test_parse_hash_algorithm() -> Result<()> {
    assert_eq!("crc32".parse::<HashAlgorithm>()?, HashAlgorithm::Crc32);
    assert_eq!(" SHA256 ".parse::<HashAlgorithm>()?, HashAlgorithm::Sha256);
    assert!("md5".parse::<HashAlgorithm>().is_err());
    Ok(())
}

#[test]
fn test_parse_replicas() -> Result<()> {
    assert_eq!(parse_replicas("100")?, 100);
    assert!(parse_replicas("-1").is_err());
    assert!(parse_replicas("many").is_err());
    Ok(())
}

#[test]
fn test_default_config() {
    let config = RingConfig::default();
    assert_eq!(config.replicas, DEFAULT_REPLICAS);
    assert_eq!(config.hash, HashAlgorithm::Crc32);
    assert_eq!(RingConfig::new(7).with_hash(HashAlgorithm::Sha256).replicas, 7);
}
