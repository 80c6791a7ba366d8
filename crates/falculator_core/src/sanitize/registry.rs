//! Sanitize-scoped registries.
//!
//! Both registries live only for the duration of one sanitize run — they
//! are plain builders owned by the pipeline, so concurrent sanitizes of
//! independent configs can never collide.

use rustc_hash::FxHashSet;

/// Tracks every entity id in one config and mints fresh ones.
///
/// Ids are 8 ascii-alphanumeric characters. Fresh ids come from a counter
/// rendered as lowercase hex, skipping anything already claimed, so
/// generation is deterministic run-to-run.
#[derive(Debug, Default)]
pub struct IdRegistry {
    used: FxHashSet<String>,
    counter: u64,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` has the required shape.
    pub fn is_well_formed(id: &str) -> bool {
        id.len() == 8 && id.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// Claim an existing id. Returns false when the id is malformed or
    /// already taken, in which case the caller should [`assign`] a fresh
    /// one.
    ///
    /// [`assign`]: IdRegistry::assign
    pub fn claim(&mut self, id: &str) -> bool {
        Self::is_well_formed(id) && self.used.insert(id.to_string())
    }

    /// Mint the next free id.
    pub fn assign(&mut self) -> String {
        loop {
            self.counter += 1;
            let id = format!("{:08x}", self.counter);
            if self.used.insert(id.clone()) {
                return id;
            }
        }
    }
}

/// The union of every item's tags, used to validate tag references.
#[derive(Debug, Default)]
pub struct TagRegistry {
    tags: FxHashSet<String>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: &str) {
        self.tags.insert(tag.to_string());
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
