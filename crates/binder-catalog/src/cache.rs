//! Lookup caches keyed by card name

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CatalogResult;
use crate::model::EnrichedCard;

/// Storage for resolved cards, keyed by the name that was looked up
pub trait CardCache {
    /// Cached card for a name
    fn get(&self, name: &str) -> Option<&EnrichedCard>;

    /// Store a card under a name
    fn set(&mut self, name: &str, card: EnrichedCard);

    /// Whether a name is cached
    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Process-local cache
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: HashMap<String, EnrichedCard>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CardCache for MemoryCache {
    fn get(&self, name: &str) -> Option<&EnrichedCard> {
        self.entries.get(name)
    }

    fn set(&mut self, name: &str, card: EnrichedCard) {
        self.entries.insert(name.to_string(), card);
    }
}

/// Cache persisted as one JSON object `{ name: card }`
///
/// The file is read once by [`JsonFileCache::open`]; changes stay in memory
/// until [`JsonFileCache::flush`].
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<String, EnrichedCard>,
    dirty: bool,
}

impl JsonFileCache {
    /// Load the cache at `path`; a missing or blank file is an empty cache
    pub fn open<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "opened card cache");
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Write the cache back as pretty JSON, creating parent directories
    pub fn flush(&mut self) -> CatalogResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        self.dirty = false;

        tracing::debug!(
            path = %self.path.display(),
            entries = self.entries.len(),
            "flushed card cache"
        );
        Ok(())
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are changes not yet flushed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of cached names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CardCache for JsonFileCache {
    fn get(&self, name: &str) -> Option<&EnrichedCard> {
        self.entries.get(name)
    }

    fn set(&mut self, name: &str, card: EnrichedCard) {
        self.entries.insert(name.to_string(), card);
        self.dirty = true;
    }
}
