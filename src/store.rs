use std::collections::HashMap;

/// Flat key/value table kept beside the ring.
///
/// Entries are never moved or dropped when ring membership changes.
#[derive(Debug)]
pub struct Store<V> {
    store: HashMap<String, V>,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Store::new()
    }
}

impl<V> Store<V> {
    pub fn new() -> Self {
        Store {
            store: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.store.get(key)
    }

    /// Returns the value previously stored under `key`, if any.
    pub fn set(&mut self, key: &str, value: V) -> Option<V> {
        self.store.insert(key.to_owned(), value)
    }

    pub fn delete(&mut self, key: &str) -> Option<V> {
        self.store.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn list(&self) -> Vec<(String, V)>
    where
        V: Clone,
    {
        self.store
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[test]
fn test_set_get_delete() {
    let mut store = Store::new();
    assert_eq!(store.set("user123", 99), None);
    assert_eq!(store.set("user123", 100), Some(99));
    assert_eq!(store.get("user123"), Some(&100));
    assert_eq!(store.len(), 1);

    assert_eq!(store.delete("user123"), Some(100));
    assert_eq!(store.delete("user123"), None);
    assert!(store.is_empty());
}

#[test]
fn test_list() {
    let mut store = Store::new();
    store.set("a", "1".to_owned());
    store.set("b", "2".to_owned());

    let mut entries = store.list();
    entries.sort();
    assert_eq!(
        entries,
        vec![("a".to_owned(), "1".to_owned()), ("b".to_owned(), "2".to_owned())]
    );
}
