//! Font metadata oracles: `otfinfo` and pre-extracted attribute files (made by FontLab https://www.fontlab.com/)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use regex::Regex;

use crate::error::NfssError;
use crate::record::FontAttributes;

/// Oldest `otfinfo` with `--info` support.
pub const MIN_OTFINFO_VERSION: (u32, u32) = (2, 38);

/// Source of per-file font attributes.
///
/// Implementations are shared across extraction threads.
pub trait MetadataOracle: Sync {
    /// Whether the file holds TrueType or CFF outlines.
    fn is_valid_font(&self, path: &Path) -> Result<bool>;

    fn extract(&self, path: &Path) -> Result<FontAttributes>;
}

/// Oracle backed by the `otfinfo` tool from LCDF Typetools.
#[derive(Debug, Clone)]
pub struct Otfinfo {
    program: PathBuf,
}

impl Default for Otfinfo {
    fn default() -> Self {
        Self::new("otfinfo")
    }
}

impl Otfinfo {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn invocation(&self, args: &[&str]) -> String {
        format!("{} {}", self.program.display(), args.join(" "))
    }

    fn output(&self, args: &[&str], font: Option<&Path>) -> Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(font) = font {
            cmd.arg(font);
        }
        cmd.output()
            .with_context(|| format!("running {}", self.invocation(args)))
    }

    fn run(&self, args: &[&str], font: Option<&Path>) -> Result<String> {
        let output = self.output(args, font)?;
        if !output.status.success() {
            return Err(NfssError::ToolFailed {
                tool: self.invocation(args),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Installed version as `(major, minor)`.
    pub fn version(&self) -> Result<(u32, u32)> {
        let text = self.run(&["--version"], None)?;
        parse_version(&text).ok_or_else(|| anyhow!("cannot read otfinfo version from {text:?}"))
    }

    pub fn check_version(&self) -> Result<()> {
        let (major, minor) = self.version()?;
        if (major, minor) < MIN_OTFINFO_VERSION {
            return Err(anyhow!(
                "otfinfo {major}.{minor} is too old; version {}.{} or newer is required",
                MIN_OTFINFO_VERSION.0,
                MIN_OTFINFO_VERSION.1
            ));
        }
        log::debug!("otfinfo version {major}.{minor}");
        Ok(())
    }
}

impl MetadataOracle for Otfinfo {
    /// A file `otfinfo` cannot open is reported as invalid, not as an error.
    fn is_valid_font(&self, path: &Path) -> Result<bool> {
        let output = self.output(&["-qt"], Some(path))?;
        if !output.status.success() {
            log::warn!(
                "{} rejected {}: {}",
                self.invocation(&["-qt"]),
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(false);
        }
        Ok(has_outline_table(&String::from_utf8_lossy(&output.stdout)))
    }

    fn extract(&self, path: &Path) -> Result<FontAttributes> {
        let postscript_name = self.run(&["--postscript-name"], Some(path))?.trim().to_string();
        if postscript_name.is_empty() {
            return Err(NfssError::MalformedOutput {
                tool: "otfinfo --postscript-name",
                path: path.to_path_buf(),
                detail: "empty PostScript name".to_string(),
            }
            .into());
        }

        let info = parse_info(&self.run(&["--info"], Some(path))?);
        let family = info.family.ok_or_else(|| NfssError::MalformedOutput {
            tool: "otfinfo --info",
            path: path.to_path_buf(),
            detail: "no Family line".to_string(),
        })?;

        let features = parse_features(&self.run(&["--features"], Some(path))?);
        let optical_size = parse_optical_size(&self.run(&["--optical-size"], Some(path))?);

        Ok(FontAttributes {
            postscript_name,
            filename: path.to_path_buf(),
            family,
            subfamily: info.subfamily.unwrap_or_default(),
            vendor_url: info.vendor_url,
            features,
            optical_size,
        })
    }
}

/// Name fields pulled from `otfinfo --info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoFields {
    pub family: Option<String>,
    pub subfamily: Option<String>,
    pub vendor_url: Option<String>,
}

/// Parse `Key:   value` lines; preferred (typographic) names beat legacy ones.
pub fn parse_info(text: &str) -> InfoFields {
    static LINE: OnceLock<Regex> = OnceLock::new();
    let line_re = LINE.get_or_init(|| Regex::new(r"^(.*?):\s+(.*)$").expect("static regex"));

    let mut fields = InfoFields::default();
    let mut preferred_family = None;
    let mut preferred_subfamily = None;

    for line in text.lines() {
        let Some(caps) = line_re.captures(line.trim_end()) else {
            continue;
        };
        let value = caps[2].trim().to_string();
        match caps[1].trim() {
            "Family" => fields.family = Some(value),
            "Preferred family" => preferred_family = Some(value),
            "Subfamily" => fields.subfamily = Some(value),
            "Preferred subfamily" => preferred_subfamily = Some(value),
            "Vendor URL" => fields.vendor_url = Some(value),
            _ => {}
        }
    }

    if preferred_family.is_some() {
        fields.family = preferred_family;
    }
    if preferred_subfamily.is_some() {
        fields.subfamily = preferred_subfamily;
    }
    fields
}

/// Feature tags from `otfinfo --features`: the first four characters per line.
pub fn parse_features(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for line in text.lines() {
        let tag: String = line.chars().take(4).collect();
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// The `(low, high]` size range from `otfinfo --optical-size`, in points.
pub fn parse_optical_size(text: &str) -> Option<(f64, f64)> {
    static RANGE: OnceLock<Regex> = OnceLock::new();
    let range = RANGE.get_or_init(|| {
        Regex::new(r"size range \(([\d.]+) pt, ([\d.]+) pt\]").expect("static regex")
    });

    let caps = range.captures(text)?;
    let low = caps[1].parse().ok()?;
    let high = caps[2].parse().ok()?;
    Some((low, high))
}

pub fn parse_version(text: &str) -> Option<(u32, u32)> {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    let version = VERSION.get_or_init(|| Regex::new(r"([0-9]+)\.([0-9]+)").expect("static regex"));

    let caps = version.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// `glyf` marks TrueType outlines, `CFF` PostScript ones.
pub fn has_outline_table(table_listing: &str) -> bool {
    table_listing
        .lines()
        .any(|line| line.contains("glyf") || line.contains("CFF"))
}

/// Oracle serving attributes extracted ahead of time, stored as a JSON array.
///
/// Relative `filename` entries resolve against the file's own directory.
#[derive(Debug, Clone, Default)]
pub struct AttributeFile {
    entries: BTreeMap<PathBuf, FontAttributes>,
}

impl AttributeFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading attributes {}", path.display()))?;
        let entries: Vec<FontAttributes> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing attributes {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        Ok(Self::from_entries(entries.into_iter().map(|mut attrs| {
            if attrs.filename.is_relative() {
                attrs.filename = base.join(&attrs.filename);
            }
            attrs
        })))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = FontAttributes>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|attrs| (attrs.filename.clone(), attrs))
                .collect(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &FontAttributes> {
        self.entries.values()
    }

    /// Every file the attribute file knows about.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataOracle for AttributeFile {
    fn is_valid_font(&self, path: &Path) -> Result<bool> {
        Ok(self.entries.contains_key(path))
    }

    fn extract(&self, path: &Path) -> Result<FontAttributes> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no attributes recorded for {}", path.display()))
    }
}
