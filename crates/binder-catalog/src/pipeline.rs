//! Sequential, cache-first card lookup

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use binder_extract::CardRecord;

use crate::cache::CardCache;
use crate::client::CatalogClient;
use crate::error::CatalogResult;
use crate::model::EnrichedCard;

/// Pause between two catalog requests
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// Progress snapshot, reported before each catalog request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchStatus {
    /// Position of the current name among all names, in percent
    pub progress: u8,
    /// `[resolved/total] name`
    pub text: String,
}

impl FetchStatus {
    fn new(index: usize, total: usize, resolved: usize, name: &str) -> Self {
        let progress = if total == 0 {
            0
        } else {
            (index as f64 / total as f64 * 100.0).round() as u8
        };
        Self {
            progress,
            text: format!("[{}/{}] {}", resolved, total, name),
        }
    }
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Cached cards first, then fetched ones, each in record order
    pub cards: Vec<EnrichedCard>,
    /// Names the catalog does not know
    pub missing: Vec<String>,
    /// Cards obtained from the catalog in this run
    pub fetched: usize,
    /// Cards served from the cache
    pub cached: usize,
}

/// Resolves card records against a catalog, one request at a time
pub struct FetchPipeline<C, K> {
    client: C,
    cache: K,
    delay: Duration,
}

impl<C: CatalogClient, K: CardCache> FetchPipeline<C, K> {
    /// Create a pipeline with the default pacing
    pub fn new(client: C, cache: K) -> Self {
        Self {
            client,
            cache,
            delay: DEFAULT_DELAY,
        }
    }

    /// Set the pause taken after every catalog request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The catalog client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The cache
    pub fn cache(&self) -> &K {
        &self.cache
    }

    /// Mutable access to the cache, e.g. to flush it
    pub fn cache_mut(&mut self) -> &mut K {
        &mut self.cache
    }

    /// Give the cache back
    pub fn into_cache(self) -> K {
        self.cache
    }

    /// Resolve every distinct name of `records`
    ///
    /// Cached names are served first without touching the catalog. Each
    /// remaining name costs one lookup followed by the configured pause.
    /// Unknown names end up in [`FetchReport::missing`]; any other catalog
    /// error stops the run.
    pub fn run<F>(
        &mut self,
        records: &[CardRecord],
        mut on_progress: F,
    ) -> CatalogResult<FetchReport>
    where
        F: FnMut(&FetchStatus),
    {
        let names = unique_names(records);
        let total = names.len();
        let mut report = FetchReport::default();

        for name in &names {
            if let Some(card) = self.cache.get(name) {
                report.cards.push(card.clone());
                report.cached += 1;
            }
        }

        for (index, name) in names.iter().enumerate() {
            if self.cache.has(name) {
                continue;
            }

            on_progress(&FetchStatus::new(index, total, report.cards.len(), name));

            let found = match self.client.search_printings(name) {
                Ok(printings) => EnrichedCard::from_printings(&printings),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            };

            match found {
                Some(card) => {
                    self.cache.set(name, card.clone());
                    report.cards.push(card);
                    report.fetched += 1;
                }
                None => {
                    tracing::warn!(name, "card not found in catalog");
                    report.missing.push(name.to_string());
                }
            }

            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }

        tracing::info!(
            total,
            cached = report.cached,
            fetched = report.fetched,
            missing = report.missing.len(),
            "card lookup finished"
        );
        Ok(report)
    }
}

/// Record names without repeats, in first-occurrence order
///
/// Blank names cannot match a card and are left out.
fn unique_names(records: &[CardRecord]) -> Vec<&str> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| r.name.as_str())
        .filter(|name| !name.trim().is_empty())
        .filter(|name| seen.insert(*name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use binder_extract::Status;

    #[test]
    fn test_unique_names() {
        let records = vec![
            CardRecord::new("Opt", Status::Owned),
            CardRecord::new("Bolt", Status::NotOwned),
            CardRecord::new("", Status::NotOwned),
            CardRecord::new("Opt", Status::Uncertain),
            CardRecord::new("  ", Status::NotOwned),
        ];
        assert_eq!(unique_names(&records), vec!["Opt", "Bolt"]);
    }

    #[test]
    fn test_status_text() {
        let status = FetchStatus::new(1, 3, 1, "Bolt");
        assert_eq!(status.progress, 33);
        assert_eq!(status.text, "[1/3] Bolt");
        assert_eq!(FetchStatus::new(0, 0, 0, "").progress, 0);
    }
}
