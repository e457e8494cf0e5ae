use std::collections::HashSet;
use lazy_static::lazy_static;

use super::category::WasteCategory;

// Every keyword is also matched as a substring of the whole label, so short
// words that hide inside ImageNet class names ("can" in "pelican", "box" in
// "boxer", "lid" in "slide", "bag" in "cabbage") are left out.
const RECYCLABLE_KEYWORDS: &[&str] = &[
    "bottle", "plastic", "canister", "aluminum", "glass", "jar", "paper", "cardboard",
    "carton", "container", "newspaper", "magazine", "envelope", "cup", "packet",
    "foil", "metal", "steel", "beer", "soda", "jug", "crate", "tray",
];

const ORGANIC_KEYWORDS: &[&str] = &[
    "banana", "apple", "orange", "lemon", "pineapple", "strawberry", "pomegranate",
    "mushroom", "broccoli", "cauliflower", "cabbage", "cucumber", "zucchini",
    "squash", "pepper", "corn", "artichoke", "potato", "bread", "bagel", "pretzel",
    "pizza", "burrito", "hotdog", "sandwich", "meat", "flower", "plant",
    "vegetable", "fruit", "peel", "coffee", "acorn", "compost",
];

const HAZARDOUS_KEYWORDS: &[&str] = &[
    "battery", "chemical", "paint", "aerosol", "spray", "pesticide",
    "fluorescent", "syringe", "needle", "medicine", "thermometer", "telephone",
    "cellphone", "smartphone", "laptop", "computer", "monitor", "television",
    "remote", "charger", "cable", "gasoline", "fuel", "lighter", "solvent",
    "toxic", "mercury", "bleach", "printer",
];

lazy_static! {
    static ref RECYCLABLE: HashSet<&'static str> = RECYCLABLE_KEYWORDS.iter().copied().collect();
    static ref ORGANIC: HashSet<&'static str> = ORGANIC_KEYWORDS.iter().copied().collect();
    static ref HAZARDOUS: HashSet<&'static str> = HAZARDOUS_KEYWORDS.iter().copied().collect();
}

/// Read-only view over the static keyword set of one scored category.
#[derive(Debug, Clone, Copy)]
pub struct KeywordSet {
    category: WasteCategory,
    words: &'static [&'static str],
    lookup: &'static HashSet<&'static str>,
}

impl KeywordSet {
    /// The category every hit in this set is credited to
    pub fn category(&self) -> WasteCategory {
        self.category
    }

    /// Exact membership test for a single normalized token
    pub fn contains_token(&self, token: &str) -> bool {
        self.lookup.contains(token)
    }

    /// Keywords in declaration order
    pub fn words(&self) -> impl Iterator<Item = &'static str> {
        self.words.iter().copied()
    }
}

/// The process-wide keyword tables, one per scored category.
///
/// The three sets are meant to be disjoint but this is not enforced; a word
/// present in two sets credits both categories.
pub struct KeywordTable;

impl KeywordTable {
    /// Packaging and container materials
    pub fn recyclable() -> KeywordSet {
        KeywordSet {
            category: WasteCategory::Recyclable,
            words: RECYCLABLE_KEYWORDS,
            lookup: &RECYCLABLE,
        }
    }

    /// Food, produce and plant matter
    pub fn organic() -> KeywordSet {
        KeywordSet {
            category: WasteCategory::Organic,
            words: ORGANIC_KEYWORDS,
            lookup: &ORGANIC,
        }
    }

    /// Electronics, batteries and chemicals
    pub fn hazardous() -> KeywordSet {
        KeywordSet {
            category: WasteCategory::Hazardous,
            words: HAZARDOUS_KEYWORDS,
            lookup: &HAZARDOUS,
        }
    }

    /// All sets in the fixed scoring order: recyclable, organic, hazardous
    pub fn sets() -> [KeywordSet; 3] {
        [Self::recyclable(), Self::organic(), Self::hazardous()]
    }
}
