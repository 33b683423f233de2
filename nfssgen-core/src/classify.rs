//! Grouping of font records by family and style axes (made by FontLab https://www.fontlab.com/)

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::{FontRecord, OpticalRange};
use crate::tokens::AxisSet;

/// Bucket key: one family at one weight, width, and variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ClassKey {
    pub family: String,
    pub weight: AxisSet,
    pub width: AxisSet,
    pub variant: AxisSet,
}

impl ClassKey {
    pub fn of(record: &FontRecord) -> Self {
        Self {
            family: record.family.clone(),
            weight: record.weight.clone(),
            width: record.width.clone(),
            variant: record.variant.clone(),
        }
    }
}

/// A font placed in a bucket, together with its optical size range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedFont {
    pub id: String,
    pub optical_size: Option<OpticalRange>,
}

/// (family, weight, width, variant) → fonts, in insertion order per bucket.
///
/// Fonts sharing a bucket are optical-size siblings of the same style.
#[derive(Debug, Clone, Default)]
pub struct ClassificationIndex {
    buckets: BTreeMap<ClassKey, Vec<ClassifiedFont>>,
}

impl ClassificationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `record` under its key. Classifying the same font again is a no-op.
    pub fn classify(&mut self, record: &FontRecord) {
        let bucket = self.buckets.entry(ClassKey::of(record)).or_default();
        if bucket.iter().any(|f| f.id == record.id) {
            return;
        }
        bucket.push(ClassifiedFont {
            id: record.id.clone(),
            optical_size: record.optical_size,
        });
    }

    pub fn get(&self, key: &ClassKey) -> Option<&[ClassifiedFont]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClassKey, &[ClassifiedFont])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FontAttributes;
    use std::path::PathBuf;

    fn record(id: &str, subfamily: &str, optical: Option<(f64, f64)>) -> FontRecord {
        FontRecord::from_attributes(
            FontAttributes {
                postscript_name: id.to_string(),
                filename: PathBuf::from(format!("/fonts/{id}.otf")),
                family: "Minion Pro".to_string(),
                subfamily: subfamily.to_string(),
                vendor_url: None,
                features: vec!["onum".to_string()],
                optical_size: optical,
            },
            &[],
        )
    }

    #[test]
    fn optical_siblings_share_a_bucket() {
        let mut index = ClassificationIndex::new();
        index.classify(&record("MinionPro-Capt", "Regular", Some((6.0, 8.4))));
        index.classify(&record("MinionPro-Regular", "Regular", Some((8.4, 13.0))));
        index.classify(&record("MinionPro-It", "Italic", None));

        assert_eq!(index.len(), 2);
        let key = ClassKey::of(&record("x", "Regular", None));
        let fonts = index.get(&key).expect("regular bucket");
        assert_eq!(fonts.len(), 2);
        assert_eq!(fonts[0].id, "MinionPro-Capt");
        assert_eq!(fonts[1].optical_size.map(|r| r.to_string()).as_deref(), Some("8.5-13.1"));
    }

    #[test]
    fn classify_is_idempotent() {
        let mut index = ClassificationIndex::new();
        let font = record("MinionPro-Bold", "Bold", None);
        index.classify(&font);
        index.classify(&font);

        let fonts = index.get(&ClassKey::of(&font)).expect("bucket");
        assert_eq!(fonts.len(), 1);
    }
}
