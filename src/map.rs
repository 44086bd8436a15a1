//! Ring and store behind one lock.
//!
//! [`ConsistentMap`] is the handle callers share (usually through an `Arc`).
//! Membership changes and key removal take the write lock, lookups take the
//! read lock. [`ConsistentMap::add_key`] checks the ring under the read lock
//! and writes the store under a separate write lock, so the ring may change
//! between the two steps; only "the ring had a node a moment ago" is
//! guaranteed.

use std::sync::RwLock;

use log::{debug, warn};

use crate::config::RingConfig;
use crate::error::Result;
use crate::hash::Hasher;
use crate::ring::Ring;
use crate::store::Store;

#[derive(Debug)]
struct State<V> {
    ring: Ring,
    store: Store<V>,
}

#[derive(Debug)]
pub struct ConsistentMap<V> {
    state: RwLock<State<V>>,
}

impl<V> ConsistentMap<V> {
    /// Empty ring hashing with CRC-32.
    pub fn new(replicas: usize) -> Self {
        Self::from_ring(Ring::new(replicas))
    }

    pub fn with_hasher(replicas: usize, hash: Hasher) -> Self {
        Self::from_ring(Ring::with_hasher(replicas, hash))
    }

    pub fn from_config(config: &RingConfig) -> Self {
        debug!(
            "Creating ring with {} replicas, hash {}",
            config.replicas, config.hash
        );
        Self::with_hasher(config.replicas, config.hash.hasher())
    }

    fn from_ring(ring: Ring) -> Self {
        ConsistentMap {
            state: RwLock::new(State {
                ring,
                store: Store::new(),
            }),
        }
    }

    pub fn add_node(&self, node: &str) -> Result<()> {
        let mut state = self.state.write()?;
        state.ring.add_node(node);
        Ok(())
    }

    /// Stored keys are left in place even if `node` owned them.
    pub fn remove_node(&self, node: &str) -> Result<()> {
        let mut state = self.state.write()?;
        state.ring.remove_node(node);
        Ok(())
    }

    /// Node owning `key`, or `None` if the ring is empty.
    pub fn get_node(&self, key: &str) -> Result<Option<String>> {
        let state = self.state.read()?;
        Ok(state.ring.get_node(key).map(str::to_owned))
    }

    /// Stores `value` under `key` if the ring has at least one node.
    ///
    /// Returns `false` when the ring was empty and the value was dropped.
    pub fn add_key(&self, key: &str, value: V) -> Result<bool> {
        let node = self.get_node(key)?;
        if node.is_none() {
            warn!("No nodes on ring, dropping write for key {}", key);
            return Ok(false);
        }

        let mut state = self.state.write()?;
        state.store.set(key, value);
        Ok(true)
    }

    pub fn remove_key(&self, key: &str) -> Result<Option<V>> {
        let mut state = self.state.write()?;
        Ok(state.store.delete(key))
    }

    /// Reads `key` without consulting the ring.
    pub fn get_key(&self, key: &str) -> Result<Option<V>>
    where
        V: Clone,
    {
        let state = self.state.read()?;
        Ok(state.store.get(key).cloned())
    }

    /// Runs `f` on the value under `key` while the read lock is held.
    pub fn with_key<R>(&self, key: &str, f: impl FnOnce(Option<&V>) -> R) -> Result<R> {
        let state = self.state.read()?;
        Ok(f(state.store.get(key)))
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        let state = self.state.read()?;
        Ok(state.store.contains(key))
    }

    pub fn key_count(&self) -> Result<usize> {
        let state = self.state.read()?;
        Ok(state.store.len())
    }

    pub fn entries(&self) -> Result<Vec<(String, V)>>
    where
        V: Clone,
    {
        let state = self.state.read()?;
        Ok(state.store.list())
    }

    pub fn replicas(&self) -> Result<usize> {
        let state = self.state.read()?;
        Ok(state.ring.replicas())
    }

    /// Number of virtual node positions.
    pub fn len(&self) -> Result<usize> {
        let state = self.state.read()?;
        Ok(state.ring.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        let state = self.state.read()?;
        Ok(state.ring.is_empty())
    }

    pub fn nodes(&self) -> Result<Vec<String>> {
        let state = self.state.read()?;
        Ok(state.ring.nodes())
    }

    pub fn positions(&self) -> Result<Vec<(u32, String)>> {
        let state = self.state.read()?;
        Ok(state.ring.positions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashAlgorithm;
    use crate::error::Error;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct UserData {
        name: String,
        score: u32,
    }

    #[test]
    fn add_get_key_with_struct() -> Result<()> {
        let map = ConsistentMap::new(3);
        map.add_node("NodeA")?;
        map.add_node("NodeB")?;

        let data = UserData {
            name: "Alice".into(),
            score: 100,
        };
        assert!(map.add_key("user123", data.clone())?);
        assert_eq!(map.get_key("user123")?, Some(data));
        Ok(())
    }

    #[test]
    fn non_clone_values_are_readable_in_place() -> Result<()> {
        struct Opaque(u32);

        let map = ConsistentMap::new(3);
        map.add_node("NodeA")?;
        map.add_key("k", Opaque(7))?;

        assert_eq!(map.with_key("k", |v| v.map(|o| o.0))?, Some(7));
        assert!(!map.with_key("missing", |v| v.is_some())?);
        Ok(())
    }

    #[test]
    fn overwrite_keeps_latest_value() -> Result<()> {
        let map = ConsistentMap::new(3);
        map.add_node("NodeA")?;
        map.add_key("k", 1)?;
        map.add_key("k", 2)?;

        assert_eq!(map.get_key("k")?, Some(2));
        assert_eq!(map.key_count()?, 1);
        Ok(())
    }

    #[test]
    fn from_config_uses_configured_hash() -> Result<()> {
        let config = RingConfig::new(5).with_hash(HashAlgorithm::Sha256);
        let map: ConsistentMap<()> = ConsistentMap::from_config(&config);
        map.add_node("A")?;

        let mut expected: Vec<u32> = (0..5)
            .map(|i| crate::hash::generate_hash32(format!("{}A", i).as_bytes()))
            .collect();
        expected.sort_unstable();
        let actual: Vec<u32> = map.positions()?.into_iter().map(|(p, _)| p).collect();

        assert_eq!(map.replicas()?, 5);
        assert_eq!(actual, expected);
        Ok(())
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let map = Arc::new(ConsistentMap::<u32>::new(3));
        let poisoner = Arc::clone(&map);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.state.write();
            panic!("poison the ring lock");
        })
        .join();

        assert!(matches!(map.add_node("A"), Err(Error::Lock(_))));
        assert!(matches!(map.get_key("k"), Err(Error::Lock(_))));
    }
}
