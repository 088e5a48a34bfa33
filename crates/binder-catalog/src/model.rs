//! Catalog data model
//!
//! Field names follow the catalog's JSON so that responses deserialize
//! directly; unknown fields are ignored.

use std::collections::{btree_map, BTreeMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Image links of one printing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUris {
    pub small: String,
    pub normal: String,
    pub large: String,
}

/// One face of a multi-faced card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFace {
    pub name: String,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

/// One printing of a card, as returned by a card search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Printing {
    /// Identity shared by every printing of the same card
    #[serde(default)]
    pub oracle_id: String,
    pub name: String,
    /// API link of this printing
    pub uri: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub color_identity: Vec<String>,
    /// Set code, lower case
    pub set: String,
    pub set_name: String,
    /// Absent on double-faced cards, whose faces carry the images
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub card_faces: Vec<CardFace>,
}

impl Printing {
    /// Images of the printing, falling back to its first illustrated face
    pub fn images(&self) -> Option<&ImageUris> {
        self.image_uris
            .as_ref()
            .or_else(|| self.card_faces.iter().find_map(|f| f.image_uris.as_ref()))
    }

    /// Set code as used for display and lookups (upper case)
    pub fn set_code(&self) -> String {
        self.set.to_uppercase()
    }
}

/// Card fields shared by all its printings, plus images per set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCard {
    pub oracle_id: String,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub color_identity: Vec<String>,
    /// Upper-case set code -> images of the first printing in that set
    #[serde(default)]
    pub uris_by_set: BTreeMap<String, ImageUris>,
}

/// A set a card was printed in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetRef {
    pub set_name: String,
    /// Upper-case set code
    pub set: String,
}

/// A card together with every set it appears in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedCard {
    pub card: CatalogCard,
    pub sets: Vec<SetRef>,
}

impl EnrichedCard {
    /// Fold the printings of one search into a card
    ///
    /// The first printing supplies the card fields. `sets` lists every
    /// printing in result order, so a set appears once per printing.
    /// Returns `None` when there is no printing.
    pub fn from_printings(printings: &[Printing]) -> Option<Self> {
        let first = printings.first()?;

        let mut uris_by_set = BTreeMap::new();
        for printing in printings {
            if let Some(images) = printing.images() {
                uris_by_set
                    .entry(printing.set_code())
                    .or_insert_with(|| images.clone());
            }
        }

        let sets = printings
            .iter()
            .map(|p| SetRef {
                set_name: p.set_name.clone(),
                set: p.set_code(),
            })
            .collect();

        Some(Self {
            card: CatalogCard {
                oracle_id: first.oracle_id.clone(),
                name: first.name.clone(),
                uri: first.uri.clone(),
                colors: first.colors.clone(),
                color_identity: first.color_identity.clone(),
                uris_by_set,
            },
            sets,
        })
    }

    /// Card name as known to the catalog
    pub fn name(&self) -> &str {
        &self.card.name
    }

    /// Distinct set codes in first-appearance order
    pub fn set_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::new();
        for set in &self.sets {
            if !codes.contains(&set.set.as_str()) {
                codes.push(&set.set);
            }
        }
        codes
    }
}

/// A card set (expansion, promo run, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSet {
    /// Set code, lower case as served
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub set_type: String,
    #[serde(default)]
    pub released_at: Option<NaiveDate>,
    #[serde(default)]
    pub card_count: u32,
    #[serde(default)]
    pub icon_svg_uri: Option<String>,
}

/// Sets keyed by upper-case code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetIndex {
    sets: BTreeMap<String, CardSet>,
}

impl SetIndex {
    /// Index a set listing; a later duplicate code replaces an earlier one
    pub fn from_sets<I: IntoIterator<Item = CardSet>>(sets: I) -> Self {
        Self {
            sets: sets
                .into_iter()
                .map(|s| (s.code.to_uppercase(), s))
                .collect(),
        }
    }

    /// Look a set up by code, in any case
    pub fn get(&self, code: &str) -> Option<&CardSet> {
        self.sets.get(&code.to_uppercase())
    }

    /// Number of indexed sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Sets ordered by code
    pub fn iter(&self) -> btree_map::Iter<'_, String, CardSet> {
        self.sets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn images(tag: &str) -> ImageUris {
        ImageUris {
            small: format!("https://img.example/small/{}.jpg", tag),
            normal: format!("https://img.example/normal/{}.jpg", tag),
            large: format!("https://img.example/large/{}.jpg", tag),
        }
    }

    fn printing(set: &str, set_name: &str, tag: Option<&str>) -> Printing {
        Printing {
            oracle_id: "oracle-opt".into(),
            name: "Opt".into(),
            uri: format!("https://api.example/cards/{}", set),
            colors: vec!["U".into()],
            color_identity: vec!["U".into()],
            set: set.into(),
            set_name: set_name.into(),
            image_uris: tag.map(images),
            card_faces: Vec::new(),
        }
    }

    #[test]
    fn test_from_printings() {
        let printings = vec![
            printing("dom", "Dominaria", Some("dom-1")),
            printing("xln", "Ixalan", Some("xln")),
            printing("dom", "Dominaria", Some("dom-2")),
        ];

        let card = EnrichedCard::from_printings(&printings).unwrap();
        assert_eq!(card.name(), "Opt");
        assert_eq!(card.card.uri, "https://api.example/cards/dom");
        assert_eq!(
            card.sets,
            vec![
                SetRef { set_name: "Dominaria".into(), set: "DOM".into() },
                SetRef { set_name: "Ixalan".into(), set: "XLN".into() },
                SetRef { set_name: "Dominaria".into(), set: "DOM".into() },
            ]
        );
        assert_eq!(card.set_codes(), vec!["DOM", "XLN"]);
        // First printing per set wins
        assert_eq!(card.card.uris_by_set["DOM"], images("dom-1"));
        assert_eq!(card.card.uris_by_set.len(), 2);
    }

    #[test]
    fn test_from_printings_empty() {
        assert!(EnrichedCard::from_printings(&[]).is_none());
    }

    #[test]
    fn test_face_images_are_used() {
        let mut dfc = printing("isd", "Innistrad", None);
        dfc.card_faces = vec![
            CardFace { name: "Delver of Secrets".into(), image_uris: Some(images("front")) },
            CardFace { name: "Insectile Aberration".into(), image_uris: Some(images("back")) },
        ];
        let bare = printing("m20", "Core Set 2020", None);

        let card = EnrichedCard::from_printings(&[dfc, bare]).unwrap();
        assert_eq!(card.card.uris_by_set.get("ISD"), Some(&images("front")));
        assert!(!card.card.uris_by_set.contains_key("M20"));
        assert_eq!(card.set_codes(), vec!["ISD", "M20"]);
    }

    #[test]
    fn test_decode_printing_ignores_unknown_fields() {
        let json = r#"{
            "object": "card",
            "oracle_id": "b34bb2dc",
            "name": "Lightning Bolt",
            "uri": "https://api.example/cards/1",
            "colors": ["R"],
            "color_identity": ["R"],
            "set": "m11",
            "set_name": "Magic 2011",
            "image_uris": {"small": "s", "normal": "n", "large": "l", "png": "p"},
            "prices": {"usd": "1.00"}
        }"#;

        let printing: Printing = serde_json::from_str(json).unwrap();
        assert_eq!(printing.set_code(), "M11");
        assert_eq!(printing.images().map(|i| i.normal.as_str()), Some("n"));
    }

    #[test]
    fn test_set_index() {
        let json = r#"[
            {"code": "dom", "name": "Dominaria", "set_type": "expansion", "released_at": "2018-04-27", "card_count": 280, "icon_svg_uri": "https://svgs.example/dom.svg"},
            {"code": "pdom", "name": "Dominaria Promos", "set_type": "promo", "card_count": 45}
        ]"#;
        let sets: Vec<CardSet> = serde_json::from_str(json).unwrap();
        let index = SetIndex::from_sets(sets);

        assert_eq!(index.len(), 2);
        let dom = index.get("DOM").unwrap();
        assert_eq!(dom.released_at, NaiveDate::from_ymd_opt(2018, 4, 27));
        assert_eq!(index.get("pdom").unwrap().released_at, None);
        assert!(index.get("xln").is_none());
        let codes: Vec<&str> = index.iter().map(|(code, _)| code.as_str()).collect();
        assert_eq!(codes, vec!["DOM", "PDOM"]);
    }
}
