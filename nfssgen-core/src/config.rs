//! User-settable configuration: encoding, option grammar, and Berry tables (made by FontLab https://www.fontlab.com/)

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::breakout::OptionGrammar;
use crate::error::{NfssError, Result};

/// Encoding identifier plus what the converter needs to produce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingSpec {
    /// Two-character Berry designation (e.g. `8y` for LY1).
    pub berry: String,
    /// Extra `otftotfm` arguments selecting the encoding.
    pub commandline: String,
}

/// What an option token does to the variant it is selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionCategory {
    /// Applied to every font; only shows up in the font name and flags.
    Global,
    /// Forms a separate font family (oldstyle figures, swashes, ...).
    Family,
    Weight,
    Width,
    Variant,
    /// Placeholder that keeps a combination non-empty; never named or passed on.
    Synthetic,
}

impl fmt::Display for OptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OptionCategory::Global => "global",
            OptionCategory::Family => "family-forming",
            OptionCategory::Weight => "weight-modifying",
            OptionCategory::Width => "width-modifying",
            OptionCategory::Variant => "variant-modifying",
            OptionCategory::Synthetic => "synthetic",
        };
        f.write_str(label)
    }
}

/// Token → category lookup built from a validated [`Config`].
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    categories: BTreeMap<String, OptionCategory>,
}

impl CategoryTable {
    pub fn category(&self, token: &str) -> Option<OptionCategory> {
        self.categories.get(token).copied()
    }
}

/// Everything a run needs to know besides the fonts themselves.
///
/// Missing fields in a config file fall back to [`Config::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub encoding: String,
    pub encodings: BTreeMap<String, EncodingSpec>,
    /// Directory below `$TEXMFHOME` receiving `.fd` and `.sty` files.
    pub local_fonts_dir: String,
    /// One choice is picked from every group; `""` means "skip this group".
    pub option_groups: Vec<Vec<String>>,
    pub global_options: Vec<String>,
    pub family_options: Vec<String>,
    pub weight_options: Vec<String>,
    pub width_options: Vec<String>,
    pub variant_options: Vec<String>,
    pub fake_options: Vec<String>,
    /// Option and subfamily tokens to their Berry codes.
    pub codes: BTreeMap<String, String>,
    /// Family name (as reported by the font) to its three-letter Berry ID.
    pub berry_names: BTreeMap<String, String>,
    /// Default scale factor per family name.
    pub scaled: BTreeMap<String, f64>,
    /// Make oldstyle figures the package default when a font has them.
    pub oldstyle_default: bool,
}

fn strings(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn table(raw: &[(&str, &str)]) -> BTreeMap<String, String> {
    raw.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        let mut encodings = BTreeMap::new();
        encodings.insert(
            "LY1".to_string(),
            EncodingSpec {
                berry: "8y".to_string(),
                commandline: "-e texnansx".to_string(),
            },
        );

        Self {
            encoding: "LY1".to_string(),
            encodings,
            local_fonts_dir: "/tex/latex/localfonts/".to_string(),
            option_groups: vec![
                strings(&["kern"]),
                strings(&["liga"]),
                strings(&["lnum", "onum", "swsh", "sinf", "sups", "pnum", "fakenum"]),
                strings(&["smcp", ""]),
            ],
            global_options: strings(&["kern", "liga"]),
            family_options: strings(&["lnum", "onum", "swsh", "sinf", "sups", "pnum"]),
            weight_options: Vec::new(),
            width_options: Vec::new(),
            variant_options: strings(&["smcp"]),
            fake_options: strings(&["fakenum"]),
            codes: table(&[
                // OpenType features
                ("lnum", "x"),
                ("onum", "j"),
                ("fakenum", ""),
                ("swsh", "w"),
                ("sinf", "0"),
                ("sups", "1"),
                ("pnum", "2"),
                ("smcp", "sc"),
                // weights
                ("thin", "ul"),
                ("extralight", "el"),
                ("light", "l"),
                ("book", "m"),
                ("medium", "mb"),
                ("demibold", "db"),
                ("semibold", "sb"),
                ("bold", "b"),
                ("extrabold", "eb"),
                ("black", "eb"),
                ("heavy", "eb"),
                // widths
                ("condensed", "c"),
                ("cond", "c"),
                ("cn", "c"),
                ("narrow", "n"),
                ("semicondensed", "sc"),
                ("semiextended", "sx"),
                ("extended", "x"),
                // variants
                ("italic", "it"),
                ("it", "it"),
                ("slanted", "sl"),
                ("oblique", "sl"),
                ("outline", "ol"),
                ("regular", ""),
            ]),
            berry_names: table(&[
                ("Minion Pro", "pmn"),
                ("Myriad Pro", "pmy"),
                ("Adobe Garamond Pro", "pag"),
                ("Garamond Premier Pro", "pad"),
                ("Adobe Caslon Pro", "pac"),
                ("Adobe Jenson Pro", "paj"),
                ("Adobe Text Pro", "ptx"),
                ("Adobe Monospace", "pt9"),
                ("Utopia Std", "put"),
                ("Warnock Pro", "pwp"),
                ("Kepler Std", "pkp"),
                ("Prestige Elite Std", "ppe"),
                ("Calibri", "jk0"),
                ("Cambria", "jk1"),
                ("Candara", "jk2"),
                ("Consolas", "jk3"),
                ("Constantia", "jk4"),
                ("Corbel", "jk5"),
                ("MetaPro", "0m2"),
                ("Arno Pro", "pa0"),
                ("ScalaSansPro", "0sa"),
                ("Hypatia Sans Pro", "phy"),
                ("ITC Berkeley Oldstyle Std", "iby"),
                ("Zapfino Extra LT Pro", "lzf"),
                ("Bickham Script Std", "pik"),
                ("CaslonAntique", "9ca"),
                ("FlemishScript BT", "bf0"),
                ("Liberation Sans", "fla"),
                ("Liberation Serif", "flr"),
                ("Liberation Mono", "flm"),
                ("Montag", "fm9"),
                ("Times NR MT Std", "mnt"),
                ("Bree", "fe3"),
                ("Ronnia", "fr5"),
                ("Sabon LT Std", "lsb"),
                ("Inconsolata", "fi4"),
                ("Inconsolata XL", "fix"),
                ("Hack", "fhk"),
                ("QuioscoOne", "fq1"),
                ("TeX Gyre Bonum", "qbk"),
                ("TeX Gyre Pagella", "qpl"),
                ("TeX Gyre Termes", "qtm"),
                ("TeX Gyre Heros", "qhv"),
                ("TeX Gyre Heros Cn", "qhx"),
                ("TeX Gyre Cursor", "qcr"),
                ("TeX Gyre Schola", "qcs"),
                ("TeX Gyre Adventor", "qag"),
                ("TeX Gyre Chorus", "qzc"),
            ]),
            scaled: BTreeMap::new(),
            oldstyle_default: true,
        }
    }
}

impl Config {
    /// Read a JSON config file and validate it.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating config {}", path.display()))?;
        Ok(config)
    }

    pub fn grammar(&self) -> OptionGrammar {
        OptionGrammar::new(self.option_groups.clone())
    }

    pub fn encoding_spec(&self) -> Result<&EncodingSpec> {
        self.encodings
            .get(&self.encoding)
            .ok_or_else(|| NfssError::MissingEncoding(self.encoding.clone()))
    }

    /// Berry code for an option or subfamily token.
    pub fn code(&self, token: &str) -> Result<&str> {
        self.codes
            .get(token)
            .map(String::as_str)
            .ok_or_else(|| NfssError::MissingCode {
                token: token.to_string(),
                table: "codes",
            })
    }

    pub fn berry_name(&self, family: &str) -> Result<&str> {
        self.berry_names
            .get(family)
            .map(String::as_str)
            .ok_or_else(|| NfssError::MissingBerryName {
                family: family.to_string(),
            })
    }

    /// Build the token → category table.
    ///
    /// Synthetic tokens may also appear in another list and stay synthetic;
    /// any other token listed twice is rejected.
    pub fn categories(&self) -> Result<CategoryTable> {
        let mut categories: BTreeMap<String, OptionCategory> = BTreeMap::new();
        let lists = [
            (&self.global_options, OptionCategory::Global),
            (&self.family_options, OptionCategory::Family),
            (&self.weight_options, OptionCategory::Weight),
            (&self.width_options, OptionCategory::Width),
            (&self.variant_options, OptionCategory::Variant),
        ];

        for (tokens, category) in lists {
            for token in tokens {
                if self.fake_options.contains(token) {
                    continue;
                }
                if let Some(first) = categories.get(token) {
                    if *first != category {
                        return Err(NfssError::ConflictingCategory {
                            token: token.clone(),
                            first: *first,
                            second: category,
                        });
                    }
                }
                categories.insert(token.clone(), category);
            }
        }

        for token in &self.fake_options {
            categories.insert(token.clone(), OptionCategory::Synthetic);
        }

        Ok(CategoryTable { categories })
    }

    /// Check internal consistency before any font is processed.
    pub fn validate(&self) -> Result<()> {
        self.encoding_spec()?;
        let categories = self.categories()?;
        for token in self.option_groups.iter().flatten() {
            if !token.is_empty() && categories.category(token).is_none() {
                return Err(NfssError::UncategorizedOption(token.clone()));
            }
        }
        Ok(())
    }
}
