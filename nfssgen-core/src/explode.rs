//! Berry naming: exploding classified fonts into NFSS variants (made by FontLab https://www.fontlab.com/)
//!
//! Every font in the classification index is crossed with every option
//! combination it supports. Each pairing gets an extended family key, a
//! series code (weight + width), a shape code (variant), and an external font
//! name, and lands in the [`ExplodedIndex`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classify::{ClassKey, ClassificationIndex};
use crate::config::{CategoryTable, Config, OptionCategory};
use crate::error::Result;
use crate::record::{AttributeStore, FontRecord, OpticalRange};
use crate::tokens::{TokenList, SEP};

/// Series code for plain weight and width.
pub const MEDIUM_SERIES: &str = "m";
/// Shape code for an upright, unadorned variant.
pub const NORMAL_SHAPE: &str = "n";
/// Irregular Berry shape for italic small caps.
pub const ITALIC_SMALL_CAPS_SHAPE: &str = "si";

const ITALIC_TOKENS: &[&str] = &["italic", "it"];
const SMALL_CAPS_TOKEN: &str = "smcp";

/// Base family plus the family-forming options of one variant.
///
/// Never empty: the base family is always the first element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FamilyKey(Vec<String>);

impl FamilyKey {
    pub fn new(base: impl Into<String>) -> Self {
        Self(vec![base.into()])
    }

    pub fn with_options<I, S>(base: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut key = Self::new(base);
        for option in options {
            key.push(option);
        }
        key
    }

    pub fn push(&mut self, option: impl Into<String>) {
        self.0.push(option.into());
    }

    pub fn base(&self) -> &str {
        &self.0[0]
    }

    pub fn options(&self) -> &[String] {
        &self.0[1..]
    }
}

impl TryFrom<Vec<String>> for FamilyKey {
    type Error = String;

    fn try_from(parts: Vec<String>) -> std::result::Result<Self, Self::Error> {
        if parts.is_empty() {
            return Err("family key needs a base family name".to_string());
        }
        Ok(Self(parts))
    }
}

impl From<FamilyKey> for Vec<String> {
    fn from(key: FamilyKey) -> Self {
        key.0
    }
}

impl fmt::Display for FamilyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(SEP))
    }
}

/// Leaf address in the exploded index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExplodedKey {
    pub family: FamilyKey,
    pub series: String,
    pub shape: String,
    pub optical: Option<OpticalRange>,
}

impl ExplodedKey {
    pub fn optical_key(&self) -> String {
        OpticalRange::key(self.optical.as_ref())
    }
}

impl fmt::Display for ExplodedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.family, self.series, self.shape)?;
        if let Some(range) = &self.optical {
            write!(f, "/{range}")?;
        }
        Ok(())
    }
}

/// One installable variant: a font file plus the options that shape it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplodedFont {
    /// PostScript name of the source font.
    pub source: String,
    pub filename: PathBuf,
    pub family: String,
    pub vendor: String,
    /// External (TFM) font name, e.g. `LY1-MinionPro-Regular-onum-kern-liga`.
    pub font_name: String,
    /// Feature tags passed to the converter, family-forming ones first.
    pub options: Vec<String>,
}

impl ExplodedFont {
    /// Converter flags enabling the options, as in `-fonum -fkern `.
    pub fn cmdline_options(&self) -> String {
        self.options.iter().map(|o| format!("-f{o} ")).collect()
    }
}

/// Two different fonts resolved to the same leaf; the later one won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub key: ExplodedKey,
    pub replaced: String,
    pub replacement: String,
}

/// (family, series, shape, optical range) → variant.
#[derive(Debug, Clone, Default)]
pub struct ExplodedIndex {
    leaves: BTreeMap<ExplodedKey, ExplodedFont>,
    collisions: Vec<Collision>,
}

impl ExplodedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a variant; a later insert at the same key replaces the earlier one.
    ///
    /// Replacements coming from a different source font are logged and kept
    /// in [`ExplodedIndex::collisions`].
    pub fn insert(&mut self, key: ExplodedKey, font: ExplodedFont) -> Option<ExplodedFont> {
        let replacement = font.source.clone();
        let previous = self.leaves.insert(key.clone(), font);
        if let Some(prev) = &previous {
            if prev.source != replacement {
                log::warn!(
                    "{key}: {} replaces {} (same family, series, shape and optical size)",
                    replacement,
                    prev.source
                );
                self.collisions.push(Collision {
                    key,
                    replaced: prev.source.clone(),
                    replacement,
                });
            }
        }
        previous
    }

    pub fn get(&self, key: &ExplodedKey) -> Option<&ExplodedFont> {
        self.leaves.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExplodedKey, &ExplodedFont)> {
        self.leaves.iter()
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Distinct extended families, in key order.
    pub fn families(&self) -> Vec<&FamilyKey> {
        let mut families: Vec<&FamilyKey> = self.leaves.keys().map(|k| &k.family).collect();
        families.dedup();
        families
    }

    pub fn family_leaves<'a>(
        &'a self,
        family: &'a FamilyKey,
    ) -> impl Iterator<Item = (&'a ExplodedKey, &'a ExplodedFont)> + 'a {
        self.leaves.iter().filter(move |(k, _)| &k.family == family)
    }

    /// Series code → shape codes present for one family.
    pub fn shapes_by_series(&self, family: &FamilyKey) -> BTreeMap<String, BTreeSet<String>> {
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (key, _) in self.family_leaves(family) {
            map.entry(key.series.clone())
                .or_default()
                .insert(key.shape.clone());
        }
        map
    }
}

/// Series code from the extended weight and width tokens.
///
/// Tokens are taken weight first, in first-seen order; `{regular}` alone (or
/// nothing) is the medium series `m`.
pub fn series_code(weight: &TokenList, width: &TokenList, config: &Config) -> Result<String> {
    let mut tokens = weight.clone();
    tokens.extend(width.iter().map(str::to_string));
    if tokens.is_regular() {
        return Ok(MEDIUM_SERIES.to_string());
    }

    let mut series = String::new();
    for token in tokens.iter() {
        series.push_str(config.code(token)?);
    }
    Ok(series)
}

/// Shape code from the extended variant tokens.
///
/// Italic together with small caps is the irregular `si`, emitted before
/// the codes of any remaining tokens.
pub fn shape_code(variant: &TokenList, config: &Config) -> Result<String> {
    if variant.is_regular() {
        return Ok(NORMAL_SHAPE.to_string());
    }

    let mut tokens = variant.clone();
    let mut shape = String::new();
    let italic = ITALIC_TOKENS.iter().any(|t| tokens.contains(t));
    if italic && tokens.contains(SMALL_CAPS_TOKEN) {
        for t in ITALIC_TOKENS {
            tokens.remove(t);
        }
        tokens.remove(SMALL_CAPS_TOKEN);
        shape.push_str(ITALIC_SMALL_CAPS_SHAPE);
    }

    for token in tokens.iter() {
        shape.push_str(config.code(token)?);
    }
    Ok(shape)
}

/// Names option combinations and fills the exploded index.
pub struct Exploder<'a> {
    config: &'a Config,
    categories: CategoryTable,
}

impl<'a> Exploder<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            categories: config.categories()?,
        })
    }

    /// Name one (font, combination) pairing.
    pub fn name_variant(
        &self,
        class: &ClassKey,
        record: &FontRecord,
        combination: &[String],
    ) -> Result<(ExplodedKey, ExplodedFont)> {
        let mut family = FamilyKey::new(record.family.clone());
        let mut weight = TokenList::from(&class.weight);
        let mut width = TokenList::from(&class.width);
        let mut variant = TokenList::from(&class.variant);
        let mut name_options: Vec<String> = Vec::new();

        for token in combination {
            match self.categories.category(token) {
                Some(OptionCategory::Global) => name_options.push(token.clone()),
                Some(OptionCategory::Family) => family.push(token.clone()),
                Some(OptionCategory::Weight) => {
                    weight.push(token.clone());
                    name_options.push(token.clone());
                }
                Some(OptionCategory::Width) => {
                    width.push(token.clone());
                    name_options.push(token.clone());
                }
                Some(OptionCategory::Variant) => {
                    variant.push(token.clone());
                    name_options.push(token.clone());
                }
                Some(OptionCategory::Synthetic) | None => {}
            }
        }

        let series = series_code(&weight, &width, self.config)?;
        let shape = shape_code(&variant, self.config)?;

        let mut options: Vec<String> = family.options().to_vec();
        options.extend(name_options);

        let mut name_parts = vec![self.config.encoding.clone(), record.id.clone()];
        name_parts.extend(options.iter().cloned());

        let key = ExplodedKey {
            family,
            series,
            shape,
            optical: record.optical_size,
        };
        let font = ExplodedFont {
            source: record.id.clone(),
            filename: record.filename.clone(),
            family: record.family.clone(),
            vendor: record.vendor.clone(),
            font_name: name_parts.join(SEP),
            options,
        };
        Ok((key, font))
    }

    /// Explode every classified font; returns the number of variants named.
    pub fn explode_into(
        &self,
        classes: &ClassificationIndex,
        store: &AttributeStore,
        index: &mut ExplodedIndex,
    ) -> Result<usize> {
        let grammar = self.config.grammar();
        let mut named = 0;

        for (class, fonts) in classes.iter() {
            for placed in fonts {
                let Some(record) = store.get(&placed.id) else {
                    log::warn!("{} is classified but missing from the store", placed.id);
                    continue;
                };

                let mut combinations = grammar.combinations_for(&record.features).peekable();
                if combinations.peek().is_none() {
                    log::warn!("{}: no option combination applies, skipping", record.id);
                }

                for combination in combinations {
                    let (key, font) = self.name_variant(class, record, &combination)?;
                    log::debug!("{} [{}] -> {key}", record.id, combination.join(","));
                    index.insert(key, font);
                    named += 1;
                }
            }
        }

        Ok(named)
    }
}
