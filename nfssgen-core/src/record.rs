//! Font records and the attribute store (made by FontLab https://www.fontlab.com/)

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::tokens::{is_numeral_tag, AxisSet, REGULAR};

/// Vendor label used when a font carries no usable vendor URL.
pub const GENERIC_VENDOR: &str = "generic";

/// Subfamily tokens that describe weight.
pub const WEIGHT_TOKENS: &[&str] = &[
    "regular",
    "thin",
    "extralight",
    "light",
    "book",
    "medium",
    "demibold",
    "semibold",
    "bold",
    "extrabold",
    "black",
    "heavy",
];

/// Subfamily tokens that describe width.
pub const WIDTH_TOKENS: &[&str] = &[
    "regular",
    "condensed",
    "cond",
    "cn",
    "semicondensed",
    "narrow",
    "semiextended",
    "extended",
];

/// Subfamily tokens that describe the variant (shape).
pub const VARIANT_TOKENS: &[&str] = &["regular", "italic", "it", "slanted", "oblique", "outline"];

/// Attributes reported by a metadata oracle for one font file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontAttributes {
    pub postscript_name: String,
    pub filename: PathBuf,
    pub family: String,
    /// Free-text subfamily, e.g. `"Semibold Italic"` or `"BoldCn"`.
    pub subfamily: String,
    #[serde(default)]
    pub vendor_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    /// Optical size range in points, `(low, high]` as stored in the font.
    #[serde(default)]
    pub optical_size: Option<(f64, f64)>,
}

/// Optical size interval `[low, high)` in decipoints.
///
/// Built from the font's `(low, high]` range by moving both bounds up one
/// decipoint, the granularity of the `size` feature parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OpticalRange {
    pub low: u32,
    pub high: u32,
}

impl OpticalRange {
    /// Convert a `(low, high]` range given in points.
    pub fn from_source_points(low: f64, high: f64) -> Self {
        Self {
            low: to_decipoints(low) + 1,
            high: to_decipoints(high) + 1,
        }
    }

    pub fn low_label(&self) -> String {
        decipoints_label(self.low)
    }

    pub fn high_label(&self) -> String {
        decipoints_label(self.high)
    }

    /// Key form of an optional range: `low-high`, or empty when unrestricted.
    pub fn key(range: Option<&OpticalRange>) -> String {
        range.map(ToString::to_string).unwrap_or_default()
    }
}

impl fmt::Display for OpticalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low_label(), self.high_label())
    }
}

fn to_decipoints(points: f64) -> u32 {
    (points * 10.0).round().max(0.0) as u32
}

fn decipoints_label(value: u32) -> String {
    format!("{}.{}", value / 10, value % 10)
}

/// One font file, reduced to what classification and naming need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontRecord {
    /// PostScript name; unique per font file.
    pub id: String,
    pub family: String,
    pub subfamily: Vec<String>,
    pub weight: AxisSet,
    pub width: AxisSet,
    pub variant: AxisSet,
    pub features: BTreeSet<String>,
    pub optical_size: Option<OpticalRange>,
    pub vendor: String,
    pub filename: PathBuf,
}

impl FontRecord {
    /// Build a record from oracle attributes.
    ///
    /// When the font has no numeral-style feature, every synthetic option in
    /// `fake_options` is added so the numeral option group still has a choice.
    pub fn from_attributes(attrs: FontAttributes, fake_options: &[String]) -> Self {
        let subfamily = subfamily_tokens(&attrs.subfamily);
        let axis = |table: &[&str]| {
            AxisSet::new(
                subfamily
                    .iter()
                    .filter(|t| table.contains(&t.as_str()))
                    .cloned(),
            )
        };
        let weight = axis(WEIGHT_TOKENS);
        let width = axis(WIDTH_TOKENS);
        let variant = axis(VARIANT_TOKENS);

        let mut features: BTreeSet<String> = attrs
            .features
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if !features.iter().any(|f| is_numeral_tag(f)) {
            features.extend(fake_options.iter().cloned());
        }

        Self {
            id: attrs.postscript_name,
            family: attrs.family,
            weight,
            width,
            variant,
            subfamily,
            features,
            optical_size: attrs
                .optical_size
                .map(|(low, high)| OpticalRange::from_source_points(low, high)),
            vendor: vendor_label(attrs.vendor_url.as_deref()),
            filename: attrs.filename,
        }
    }
}

/// Split a subfamily string into lowercase style tokens.
///
/// `"SemiboldIt"` and `"Semibold It"` both give `["semibold", "it"]`;
/// `roman` reads as `regular` and `extra X` folds into `extraX`.
pub fn subfamily_tokens(raw: &str) -> Vec<String> {
    static CAMEL: OnceLock<Regex> = OnceLock::new();
    let camel = CAMEL.get_or_init(|| Regex::new(r"([a-z])([A-Z])").expect("static regex"));

    let spaced = camel.replace_all(raw, "$1 $2").to_lowercase();
    let mut tokens = spaced.split_whitespace().map(|t| {
        if t == "roman" {
            REGULAR.to_string()
        } else {
            t.to_string()
        }
    });

    let mut merged = Vec::new();
    while let Some(token) = tokens.next() {
        if token == "extra" {
            if let Some(next) = tokens.next() {
                merged.push(format!("extra{next}"));
                continue;
            }
        }
        merged.push(token);
    }
    merged
}

/// Reduce a vendor URL to its bare domain label (`http://www.adobe.com` → `adobe`).
pub fn vendor_label(url: Option<&str>) -> String {
    static DOMAIN: OnceLock<Regex> = OnceLock::new();
    let domain = DOMAIN
        .get_or_init(|| Regex::new(r"(\w*)\.(com|net|org|edu|de|fr|co\.uk)").expect("static regex"));

    url.and_then(|u| domain.captures(u))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| GENERIC_VENDOR.to_string())
}

/// PostScript name → record. Storage and lookup only.
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    records: BTreeMap<String, FontRecord>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, returning the one it replaced if the id was taken.
    pub fn insert(&mut self, record: FontRecord) -> Option<FontRecord> {
        self.records.insert(record.id.clone(), record)
    }

    pub fn get(&self, id: &str) -> Option<&FontRecord> {
        self.records.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FontRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
