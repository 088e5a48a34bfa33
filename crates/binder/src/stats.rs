//! Collection statistics

use std::collections::{BTreeMap, HashSet};

use binder_catalog::CardCache;
use binder_extract::{CardRecord, Status};
use serde::Serialize;

/// Key used for cards without color identity
pub const COLORLESS: &str = "C";

/// Key used for cards with more than one identity color
pub const MULTICOLOR: &str = "M";

/// Summary of a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStats {
    /// Number of records
    pub total: usize,
    /// Records per status, every status present
    pub by_status: BTreeMap<Status, usize>,
    /// Owned share of the records for which ownership applies, 0-100
    pub owned_percent: f64,
    /// Owned records per color identity (`W`, `U`, `B`, `R`, `G`, `C`, `M`)
    pub by_color_identity: BTreeMap<String, usize>,
    /// Owned records per set code they were printed in
    pub by_set: BTreeMap<String, usize>,
    /// Record names without catalog data, first occurrence order
    pub unresolved: Vec<String>,
}

impl CollectionStats {
    /// Summarize `records`, using `cards` for catalog-derived figures
    ///
    /// Cards are looked up by the record name, the key [`FetchPipeline`]
    /// stores them under; the catalog's own spelling of the name plays no
    /// part.
    ///
    /// [`FetchPipeline`]: binder_catalog::FetchPipeline
    pub fn compute<K: CardCache + ?Sized>(records: &[CardRecord], cards: &K) -> Self {
        let mut by_status: BTreeMap<Status, usize> = Status::ALL.iter().map(|s| (*s, 0)).collect();
        let mut by_color_identity = BTreeMap::new();
        let mut by_set = BTreeMap::new();
        let mut unresolved = Vec::new();
        let mut seen_unresolved = HashSet::new();

        for record in records {
            *by_status.entry(record.status).or_insert(0) += 1;

            let Some(card) = cards.get(&record.name) else {
                if !record.name.trim().is_empty() && seen_unresolved.insert(record.name.as_str()) {
                    unresolved.push(record.name.clone());
                }
                continue;
            };

            if record.status != Status::Owned {
                continue;
            }

            *by_color_identity
                .entry(identity_key(&card.card.color_identity))
                .or_insert(0) += 1;
            for code in card.set_codes() {
                *by_set.entry(code.to_string()).or_insert(0) += 1;
            }
        }

        let owned = by_status[&Status::Owned];
        let applicable = records.len() - by_status[&Status::NotApplicable];
        let owned_percent = if applicable == 0 {
            0.0
        } else {
            owned as f64 / applicable as f64 * 100.0
        };

        Self {
            total: records.len(),
            by_status,
            owned_percent,
            by_color_identity,
            by_set,
            unresolved,
        }
    }

    /// Number of records with a status
    pub fn count(&self, status: Status) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

fn identity_key(identity: &[String]) -> String {
    match identity {
        [] => COLORLESS.to_string(),
        [single] => single.to_uppercase(),
        _ => MULTICOLOR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binder_catalog::{CatalogCard, EnrichedCard, MemoryCache, SetRef};
    use pretty_assertions::assert_eq;

    fn card(name: &str, identity: &[&str], sets: &[&str]) -> EnrichedCard {
        EnrichedCard {
            card: CatalogCard {
                oracle_id: format!("oracle-{}", name),
                name: name.to_string(),
                uri: String::new(),
                colors: Vec::new(),
                color_identity: identity.iter().map(|c| c.to_string()).collect(),
                uris_by_set: BTreeMap::new(),
            },
            sets: sets
                .iter()
                .map(|s| SetRef {
                    set_name: format!("Set {}", s),
                    set: s.to_string(),
                })
                .collect(),
        }
    }

    fn cache(entries: &[(&str, EnrichedCard)]) -> MemoryCache {
        let mut cache = MemoryCache::new();
        for (name, card) in entries {
            cache.set(name, card.clone());
        }
        cache
    }

    #[test]
    fn test_compute() {
        let records = vec![
            CardRecord::new("Opt", Status::Owned),
            CardRecord::new("lightning bolt", Status::Owned),
            CardRecord::new("Niv-Mizzet, Parun", Status::Owned),
            CardRecord::new("Sol Ring", Status::Owned),
            CardRecord::new("Shock", Status::NotOwned),
            CardRecord::new("Storm Crow", Status::Uncertain),
            CardRecord::new("Storm Crow", Status::NotApplicable),
            CardRecord::new("", Status::NotOwned),
        ];
        let cards = cache(&[
            ("Opt", card("Opt", &["U"], &["XLN", "DOM", "XLN"])),
            ("lightning bolt", card("Lightning Bolt", &["R"], &["M11", "DOM"])),
            ("Niv-Mizzet, Parun", card("Niv-Mizzet, Parun", &["U", "R"], &["GRN"])),
            ("Sol Ring", card("Sol Ring", &[], &["C21"])),
            ("Shock", card("Shock", &["R"], &["M19"])),
        ]);

        let stats = CollectionStats::compute(&records, &cards);
        assert_eq!(stats.total, 8);
        assert_eq!(stats.count(Status::Owned), 4);
        assert_eq!(stats.count(Status::NotOwned), 2);
        assert_eq!(stats.count(Status::Uncertain), 1);
        assert_eq!(stats.count(Status::NotApplicable), 1);
        assert!((stats.owned_percent - 4.0 / 7.0 * 100.0).abs() < 1e-9);

        let colors: Vec<(&str, usize)> = stats
            .by_color_identity
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(colors, vec![("C", 1), ("M", 1), ("R", 1), ("U", 1)]);

        assert_eq!(stats.by_set.get("DOM"), Some(&2));
        assert_eq!(stats.by_set.get("XLN"), Some(&1));
        assert_eq!(stats.by_set.get("M19"), None);
        assert_eq!(stats.unresolved, vec!["Storm Crow".to_string()]);
    }

    #[test]
    fn test_cards_are_found_by_record_name() {
        let records = vec![
            CardRecord::new("Delver of Secrets", Status::Owned),
            CardRecord::new("Opt", Status::Owned),
        ];
        let cards = cache(&[
            (
                "Delver of Secrets",
                card("Delver of Secrets // Insectile Aberration", &["U"], &["ISD"]),
            ),
            // Stored under another spelling than the record uses
            ("OPT", card("Opt", &["U"], &["XLN"])),
        ]);

        let stats = CollectionStats::compute(&records, &cards);
        assert_eq!(stats.by_color_identity.get("U"), Some(&1));
        assert_eq!(stats.by_set.get("ISD"), Some(&1));
        assert_eq!(stats.by_set.get("XLN"), None);
        assert_eq!(stats.unresolved, vec!["Opt".to_string()]);
    }

    #[test]
    fn test_empty_collection() {
        let stats = CollectionStats::compute(&[], &MemoryCache::new());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.by_status.len(), 4);
        assert_eq!(stats.owned_percent, 0.0);
        assert!(stats.unresolved.is_empty());
    }

    #[test]
    fn test_only_not_applicable() {
        let records = vec![CardRecord::new("Opt", Status::NotApplicable)];
        let stats = CollectionStats::compute(&records, &MemoryCache::new());
        assert_eq!(stats.owned_percent, 0.0);
    }
}
