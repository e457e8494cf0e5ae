use std::fmt;
use serde::{Deserialize, Serialize};

/// Waste category reported for an image.
///
/// `Unknown` is the scorer abstaining; it never carries score mass of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
    Recyclable,
    Organic,
    Hazardous,
    Unknown,
}

impl WasteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recyclable => "recyclable",
            Self::Organic => "organic",
            Self::Hazardous => "hazardous",
            Self::Unknown => "unknown",
        }
    }

    /// Short explanation shown next to the category
    pub fn description(&self) -> &'static str {
        match self {
            Self::Recyclable => "Recyclable material such as plastic, paper, glass or metal packaging.",
            Self::Organic => "Organic waste such as food scraps and plant matter that can be composted.",
            Self::Hazardous => "Hazardous waste such as batteries, electronics or chemicals that needs special handling.",
            Self::Unknown => "The model is uncertain about this item and could not pick a category with confidence.",
        }
    }

    /// Disposal tips, most important first
    pub fn tips(&self) -> &'static [&'static str] {
        match self {
            Self::Recyclable => &[
                "Rinse containers to remove food residue before recycling.",
                "Flatten cardboard boxes to save space in the bin.",
                "Check local rules for which plastic types are accepted.",
            ],
            Self::Organic => &[
                "Put it in the compost or green waste bin.",
                "Remove stickers, plastic wrap and other packaging first.",
                "Avoid composting meat or dairy unless your local service accepts it.",
            ],
            Self::Hazardous => &[
                "Do not put it in household trash or recycling bins.",
                "Take it to a hazardous waste or e-waste collection point.",
                "Tape battery terminals and keep leaking items sealed.",
            ],
            Self::Unknown => &[
                "Take a clearer photo in good lighting.",
                "Center the item and fill most of the frame with it.",
                "Photograph one item at a time against a plain background.",
            ],
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized score distribution over the three concrete categories.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryScoreVector {
    pub recyclable: f64,
    pub organic: f64,
    pub hazardous: f64,
}

impl CategoryScoreVector {
    pub fn new(recyclable: f64, organic: f64, hazardous: f64) -> Self {
        Self { recyclable, organic, hazardous }
    }

    pub fn get(&self, category: WasteCategory) -> f64 {
        match category {
            WasteCategory::Recyclable => self.recyclable,
            WasteCategory::Organic => self.organic,
            WasteCategory::Hazardous => self.hazardous,
            WasteCategory::Unknown => 0.0,
        }
    }

    pub fn sum(&self) -> f64 {
        self.recyclable + self.organic + self.hazardous
    }

    /// Entries in the fixed order recyclable, organic, hazardous
    pub fn entries(&self) -> [(WasteCategory, f64); 3] {
        [
            (WasteCategory::Recyclable, self.recyclable),
            (WasteCategory::Organic, self.organic),
            (WasteCategory::Hazardous, self.hazardous),
        ]
    }

    /// Entries ordered by score, highest first. Equal scores keep the fixed order.
    pub fn ranked(&self) -> [(WasteCategory, f64); 3] {
        let mut entries = self.entries();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries
    }
}

/// Outcome of scoring one prediction list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: WasteCategory,
    /// Integer percentage in 0..=99
    pub confidence: u8,
    pub description: String,
    pub tips: Vec<String>,
    pub scores: CategoryScoreVector,
}

impl ClassificationResult {
    pub(crate) fn for_category(category: WasteCategory, confidence: u8, scores: CategoryScoreVector) -> Self {
        Self {
            category,
            confidence,
            description: category.description().to_string(),
            tips: category.tips().iter().map(|t| t.to_string()).collect(),
            scores,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.category == WasteCategory::Unknown
    }
}
