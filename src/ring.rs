//! Virtual-node hash ring.
//!
//! Every physical node is placed on a 32-bit ring `replicas` times, at
//! `hash(i ++ node)` for each replica index `i`. A key belongs to the owner
//! of the first position at or after `hash(key)`, wrapping to the lowest
//! position past the top of the ring.

use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Debug, Formatter};

use log::{debug, trace};

use crate::hash::{self, Hasher};

pub struct Ring {
    replicas: usize,
    hash: Hasher,
    /// Sorted virtual node positions.
    positions: Vec<u32>,
    owners: HashMap<u32, String>,
}

impl Debug for Ring {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ring")
            .field("replicas", &self.replicas)
            .field("positions", &self.positions.len())
            .finish()
    }
}

impl Ring {
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, hash::default_hasher())
    }

    pub fn with_hasher(replicas: usize, hash: Hasher) -> Self {
        Ring {
            replicas,
            hash,
            positions: Vec::new(),
            owners: HashMap::new(),
        }
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Number of virtual node positions on the ring.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Places `replicas` virtual nodes for `node`.
    ///
    /// Adding a node that is already present is not rejected; its positions
    /// are pushed again and it gains weight on the ring.
    pub fn add_node(&mut self, node: &str) {
        for i in 0..self.replicas {
            let position = (self.hash)(format!("{}{}", i, node).as_bytes());
            if let Some(previous) = self.owners.insert(position, node.to_owned()) {
                if previous != node {
                    debug!(
                        "Position {:#010x} of {} taken over by {}",
                        position, previous, node
                    );
                }
            }
            self.positions.push(position);
        }
        self.positions.sort_unstable();

        debug!(
            "Added node {} ({} positions on ring)",
            node,
            self.positions.len()
        );
    }

    /// Drops every position owned by `node`. Unknown nodes are ignored.
    pub fn remove_node(&mut self, node: &str) {
        let before = self.positions.len();
        let owners = &self.owners;
        self.positions
            .retain(|position| owners.get(position).map(String::as_str) != Some(node));
        // Duplicate positions share one entry, so the map is pruned only after the sweep.
        self.owners.retain(|_, owner| owner.as_str() != node);

        if before != self.positions.len() {
            debug!(
                "Removed node {} ({} positions on ring)",
                node,
                self.positions.len()
            );
        }
    }

    /// Owner of `key`, or `None` when the ring has no nodes.
    pub fn get_node(&self, key: &str) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let mut idx = self.positions.partition_point(|&position| position < hash);
        if idx == self.positions.len() {
            idx = 0;
        }

        let node = self.owners.get(&self.positions[idx]).map(String::as_str);
        trace!("Key {} hashed to {:#010x}, owner {:?}", key, hash, node);
        node
    }

    /// Distinct physical nodes, sorted.
    pub fn nodes(&self) -> Vec<String> {
        self.owners
            .values()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// `(position, owner)` pairs in ring order.
    pub fn positions(&self) -> Vec<(u32, String)> {
        self.positions
            .iter()
            .filter_map(|position| {
                self.owners
                    .get(position)
                    .map(|owner| (*position, owner.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn empty_ring_has_no_owner() {
        let ring = Ring::new(3);
        assert!(ring.is_empty());
        assert_eq!(ring.get_node("anything"), None);
    }

    #[test]
    fn positions_are_sorted_and_owned() {
        let mut ring = Ring::new(10);
        ring.add_node("NodeA");
        ring.add_node("NodeB");
        ring.add_node("NodeC");

        let positions = ring.positions();
        assert_eq!(positions.len(), 30);
        assert!(positions.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(ring.nodes(), vec!["NodeA", "NodeB", "NodeC"]);
    }

    #[test]
    fn positions_follow_replica_index_and_name() {
        let mut ring = Ring::new(3);
        ring.add_node("A");

        let mut expected: Vec<u32> = (0..3)
            .map(|i| hash::crc32_ieee(format!("{}A", i).as_bytes()))
            .collect();
        expected.sort_unstable();

        let actual: Vec<u32> = ring.positions().into_iter().map(|(p, _)| p).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn lookup_exact_position_and_wraparound_between_nodes() {
        let hasher: Hasher = Arc::new(|data: &[u8]| -> u32 {
            match data {
                b"0A" => 100,
                b"0B" => 200,
                other => String::from_utf8_lossy(other).parse().unwrap_or(0),
            }
        });
        let mut ring = Ring::with_hasher(1, hasher);
        ring.add_node("A");
        ring.add_node("B");

        assert_eq!(ring.get_node("50"), Some("A"));
        assert_eq!(ring.get_node("100"), Some("A"));
        assert_eq!(ring.get_node("101"), Some("B"));
        assert_eq!(ring.get_node("200"), Some("B"));
        assert_eq!(ring.get_node("201"), Some("A"));
    }

    #[test]
    fn collision_keeps_latest_owner() {
        let hasher: Hasher = Arc::new(|_: &[u8]| -> u32 { 42 });
        let mut ring = Ring::with_hasher(1, hasher);
        ring.add_node("A");
        ring.add_node("B");

        assert_eq!(ring.get_node("key"), Some("B"));
        assert_eq!(ring.nodes(), vec!["B"]);

        ring.remove_node("B");
        assert!(ring.is_empty());
        assert_eq!(ring.get_node("key"), None);
    }

    #[test]
    fn remove_node_clears_all_positions() {
        let mut ring = Ring::new(50);
        ring.add_node("A");
        ring.add_node("B");
        ring.remove_node("A");

        assert_eq!(ring.nodes(), vec!["B"]);
        assert!(ring.positions().iter().all(|(_, owner)| owner == "B"));
        for i in 0..200 {
            assert_eq!(ring.get_node(&format!("key{}", i)), Some("B"));
        }
    }

    #[test]
    fn remove_unknown_node_is_noop() {
        let mut ring = Ring::new(3);
        ring.add_node("A");
        ring.remove_node("Z");
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn duplicate_add_compounds_weight() {
        let mut ring = Ring::new(4);
        ring.add_node("A");
        ring.add_node("A");
        assert_eq!(ring.len(), 8);
        assert_eq!(ring.nodes(), vec!["A"]);

        ring.remove_node("A");
        assert!(ring.is_empty());
    }

    #[test]
    fn zero_replicas_never_gains_positions() {
        let mut ring = Ring::new(0);
        ring.add_node("A");
        assert!(ring.is_empty());
        assert_eq!(ring.get_node("key"), None);
    }
}
