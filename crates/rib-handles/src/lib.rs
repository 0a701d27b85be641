//! C6: the handle-binding layer. Four numeric/string dictionaries (object,
//! light) plus a string-keyed archive map, translating the id a RIB request
//! names a handle by into the opaque [`HandleId`] the backend returned
//! (spec §4.6).

use rib_backend::HandleId;
use std::collections::HashMap;
use tracing::warn;

/// A handle id as it appears on the wire: either an integer or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandleKey {
    Int(i64),
    Str(String),
}

impl From<i64> for HandleKey {
    fn from(v: i64) -> Self {
        HandleKey::Int(v)
    }
}

impl From<String> for HandleKey {
    fn from(v: String) -> Self {
        HandleKey::Str(v)
    }
}

impl From<&str> for HandleKey {
    fn from(v: &str) -> Self {
        HandleKey::Str(v.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Object,
    Light,
    Archive,
}

#[derive(Debug, Default)]
struct Dictionary {
    by_int: HashMap<i64, HandleId>,
    by_str: HashMap<String, HandleId>,
}

impl Dictionary {
    fn bind(&mut self, key: &HandleKey, handle: HandleId, category: Category) {
        let rebound = match key {
            HandleKey::Int(k) => self.by_int.insert(*k, handle).is_some(),
            HandleKey::Str(k) => self.by_str.insert(k.clone(), handle).is_some(),
        };
        if rebound {
            warn!(target: "rib.handles", category = ?category, key = ?key, "handle id rebound in same scope, overwriting");
        }
    }

    fn lookup(&self, key: &HandleKey) -> Option<HandleId> {
        match key {
            HandleKey::Int(k) => self.by_int.get(k).copied(),
            HandleKey::Str(k) => self.by_str.get(k).copied(),
        }
    }

    fn remove(&mut self, key: &HandleKey) {
        match key {
            HandleKey::Int(k) => {
                self.by_int.remove(k);
            }
            HandleKey::Str(k) => {
                self.by_str.remove(k);
            }
        }
    }
}

#[derive(Debug, Clone)]
struct ScopedEntry {
    category: Category,
    key: HandleKey,
}

/// The full set of handle dictionaries for one render context. Writes
/// happen at capture time (`ObjectBegin`, `LightSource`, `AreaLightSource`,
/// `ArchiveBegin`); reads at replay or at `ObjectInstance`/`Illuminate`.
#[derive(Debug, Default)]
pub struct HandleMaps {
    object: Dictionary,
    light: Dictionary,
    archive: Dictionary,
    /// Scope stack: cross-archive handles are released when the macro that
    /// introduced them is discarded (spec §4.6). Each frame lists the keys
    /// bound while it was open.
    scopes: Vec<Vec<ScopedEntry>>,
}

impl HandleMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new binding scope, typically when a macro (object/archive
    /// definition) begins.
    pub fn push_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Discard the innermost scope, releasing every handle bound while it
    /// was open (spec §4.6 "on macro discard the entries are released").
    pub fn pop_scope(&mut self) {
        let Some(entries) = self.scopes.pop() else {
            return;
        };
        for entry in entries {
            match entry.category {
                Category::Object => self.object.remove(&entry.key),
                Category::Light => self.light.remove(&entry.key),
                Category::Archive => self.archive.remove(&entry.key),
            }
        }
    }

    fn note_scope(&mut self, category: Category, key: HandleKey) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(ScopedEntry { category, key });
        }
    }

    pub fn bind_object(&mut self, key: impl Into<HandleKey>, handle: HandleId) {
        let key = key.into();
        self.object.bind(&key, handle, Category::Object);
        self.note_scope(Category::Object, key);
    }

    pub fn bind_light(&mut self, key: impl Into<HandleKey>, handle: HandleId) {
        let key = key.into();
        self.light.bind(&key, handle, Category::Light);
        self.note_scope(Category::Light, key);
    }

    pub fn bind_archive(&mut self, key: impl Into<HandleKey>, handle: HandleId) {
        let key = key.into();
        self.archive.bind(&key, handle, Category::Archive);
        self.note_scope(Category::Archive, key);
    }

    pub fn lookup_object(&self, key: impl Into<HandleKey>) -> Option<HandleId> {
        self.object.lookup(&key.into())
    }

    pub fn lookup_light(&self, key: impl Into<HandleKey>) -> Option<HandleId> {
        self.light.lookup(&key.into())
    }

    pub fn lookup_archive(&self, key: impl Into<HandleKey>) -> Option<HandleId> {
        self.archive.lookup(&key.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_and_looks_up_by_integer() {
        let mut maps = HandleMaps::new();
        maps.bind_object(1i64, HandleId(42));
        assert_eq!(maps.lookup_object(1i64), Some(HandleId(42)));
        assert_eq!(maps.lookup_object(2i64), None);
    }

    #[test]
    fn binds_and_looks_up_by_string() {
        let mut maps = HandleMaps::new();
        maps.bind_light("key1", HandleId(7));
        assert_eq!(maps.lookup_light("key1"), Some(HandleId(7)));
    }

    #[test]
    fn rebinding_overwrites() {
        let mut maps = HandleMaps::new();
        maps.bind_object(1i64, HandleId(1));
        maps.bind_object(1i64, HandleId(2));
        assert_eq!(maps.lookup_object(1i64), Some(HandleId(2)));
    }

    #[test]
    fn scope_discard_releases_bound_handles() {
        let mut maps = HandleMaps::new();
        maps.push_scope();
        maps.bind_archive("chunk.rib", HandleId(9));
        assert_eq!(maps.lookup_archive("chunk.rib"), Some(HandleId(9)));
        maps.pop_scope();
        assert_eq!(maps.lookup_archive("chunk.rib"), None);
    }

    #[test]
    fn handles_outside_any_scope_persist() {
        let mut maps = HandleMaps::new();
        maps.bind_object(5i64, HandleId(5));
        maps.push_scope();
        maps.pop_scope();
        assert_eq!(maps.lookup_object(5i64), Some(HandleId(5)));
    }
}
