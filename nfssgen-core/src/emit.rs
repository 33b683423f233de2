//! Emission of NFSS font definition (`.fd`) and package (`.sty`) files (made by FontLab https://www.fontlab.com/)

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::explode::{ExplodedIndex, FamilyKey};
use crate::record::OpticalRange;
use crate::tokens::{letterize, nice_font_name};

/// Who generated the files and when; goes into each file header.
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    pub config: &'a Config,
    pub generator: &'a str,
    /// Date in LaTeX's `YYYY/MM/DD` form.
    pub date: &'a str,
}

/// A generated file, ready to be written below the local fonts directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub name: String,
    pub contents: String,
}

/// All `.fd` files (one per extended family) and `.sty` files (one per typeface).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Emission {
    pub fd_files: Vec<GeneratedFile>,
    pub sty_files: Vec<GeneratedFile>,
}

impl Emission {
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.fd_files.iter().chain(self.sty_files.iter())
    }
}

/// `series/shape` declared as an alias of another, already present `series/shape`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub series: String,
    pub shape: String,
    pub from_series: String,
    pub from_shape: String,
}

impl Substitution {
    fn new(series: &str, shape: &str, from_series: &str, from_shape: &str) -> Self {
        Self {
            series: series.to_string(),
            shape: shape.to_string(),
            from_series: from_series.to_string(),
            from_shape: from_shape.to_string(),
        }
    }
}

/// Infer fallbacks for series/shape pairs a family does not provide.
///
/// - slanted stands in for a missing italic and italic for a missing slanted;
/// - without `bx`, every `b` shape also serves as `bx` (and `b/it` as `bx/sl`
///   when `b` has no slanted);
/// - with `sb` but neither `b` nor `bx`, every `sb` shape serves as both.
pub fn substitutions(shapes: &BTreeMap<String, BTreeSet<String>>) -> Vec<Substitution> {
    let mut subs = Vec::new();
    let has = |series: &str, shape: &str| shapes.get(series).is_some_and(|s| s.contains(shape));

    for (replacement, missing) in [("sl", "it"), ("it", "sl")] {
        for series in shapes.keys() {
            if has(series, replacement) && !has(series, missing) {
                subs.push(Substitution::new(series, missing, series, replacement));
            }
        }
    }

    if let Some(bold) = shapes.get("b") {
        if !shapes.contains_key("bx") {
            for shape in bold {
                subs.push(Substitution::new("bx", shape, "b", shape));
            }
            if bold.contains("it") && !bold.contains("sl") {
                subs.push(Substitution::new("bx", "sl", "b", "it"));
            }
        }
    }

    if let Some(semibold) = shapes.get("sb") {
        if !shapes.contains_key("b") && !shapes.contains_key("bx") {
            for target in ["b", "bx"] {
                for shape in semibold {
                    subs.push(Substitution::new(target, shape, "sb", shape));
                }
            }
        }
    }

    subs
}

/// NFSS family name: Berry ID plus the codes of the family-forming options.
pub fn nfss_family(config: &Config, family: &FamilyKey) -> Result<String> {
    let mut name = config.berry_name(family.base())?.to_string();
    for option in family.options() {
        name.push_str(config.code(option)?);
    }
    Ok(name)
}

/// Render the `.fd` file for one extended family.
pub fn render_fd(ctx: &EmitContext<'_>, index: &ExplodedIndex, family: &FamilyKey) -> Result<GeneratedFile> {
    let config = ctx.config;
    let encoding = &config.encoding;
    let berry = config.berry_name(family.base())?;
    let scale_macro = letterize(berry);
    let nfss = nfss_family(config, family)?;
    let file_base = format!("{}{}", encoding.to_lowercase(), nfss);

    let mut out = String::new();
    writeln!(out, "% Autogenerated by {} on {}", ctx.generator, ctx.date)?;
    writeln!(
        out,
        "\\ProvidesFile{{{file_base}.fd}}[{} {encoding}/{family}]",
        ctx.date
    )?;
    writeln!(out, "\\expandafter\\ifx\\csname {scale_macro}@scaled\\endcsname\\relax")?;
    match config.scaled.get(family.base()) {
        Some(scale) => {
            writeln!(out, "  \\edef\\{scale_macro}@scaled{{s*[{scale:.6}]}}%")?;
        }
        None => {
            writeln!(out, "  \\let\\{scale_macro}@scaled\\@empty")?;
        }
    }
    writeln!(out, "\\fi")?;
    writeln!(out, "\n\\DeclareFontFamily{{{encoding}}}{{{nfss}}}{{}}")?;

    let mut shapes: BTreeMap<(&str, &str), Vec<(Option<OpticalRange>, &str)>> = BTreeMap::new();
    for (key, font) in index.family_leaves(family) {
        shapes
            .entry((key.series.as_str(), key.shape.as_str()))
            .or_default()
            .push((key.optical, font.font_name.as_str()));
    }

    for ((series, shape), sizes) in &shapes {
        writeln!(out, "\\DeclareFontShape{{{encoding}}}{{{nfss}}}{{{series}}}{{{shape}}}{{")?;
        for (spec, name) in size_specs(&format!("{nfss}/{series}/{shape}"), sizes) {
            writeln!(out, "  <{spec}>  \\{scale_macro}@scaled  {name}")?;
        }
        writeln!(out, "}}{{}}")?;
    }

    for sub in substitutions(&index.shapes_by_series(family)) {
        writeln!(
            out,
            "\\DeclareFontShape{{{encoding}}}{{{nfss}}}{{{}}}{{{}}}{{",
            sub.series, sub.shape
        )?;
        writeln!(out, "  <->  sub * {nfss}/{}/{}", sub.from_series, sub.from_shape)?;
        writeln!(out, "}}{{}}")?;
    }

    writeln!(out, "\n\\endinput")?;

    Ok(GeneratedFile {
        name: format!("{file_base}.fd"),
        contents: out,
    })
}

/// NFSS size specs paired with font names for the optical siblings of one
/// series/shape.
///
/// `sizes` is in ascending range order. A lone font covers every size (`-`);
/// otherwise the smallest range is open below and the largest open above.
/// Fonts without a range are dropped when ranged siblings exist.
fn size_specs<'a>(shape: &str, sizes: &[(Option<OpticalRange>, &'a str)]) -> Vec<(String, &'a str)> {
    let ranged: Vec<(OpticalRange, &str)> = sizes
        .iter()
        .filter_map(|(range, name)| range.map(|r| (r, *name)))
        .collect();
    if ranged.is_empty() || sizes.len() == 1 {
        return sizes.iter().map(|(_, name)| ("-".to_string(), *name)).collect();
    }
    if ranged.len() < sizes.len() {
        log::warn!(
            "{shape}: dropping {} font(s) without an optical size range in favor of ranged siblings",
            sizes.len() - ranged.len()
        );
    }
    if ranged.len() == 1 {
        return vec![("-".to_string(), ranged[0].1)];
    }

    let last = ranged.len() - 1;
    ranged
        .iter()
        .enumerate()
        .map(|(i, (range, name))| {
            let (low, high) = (range.low_label(), range.high_label());
            let spec = if i == 0 {
                format!("-{high}")
            } else if i == last {
                format!("{low}-")
            } else {
                format!("{low}-{high}")
            };
            (spec, *name)
        })
        .collect()
}

/// Render the `.sty` package for one typeface (base family).
///
/// `family_options` lists the family-forming options of each extended family
/// of that typeface.
pub fn render_sty(ctx: &EmitContext<'_>, base: &str, family_options: &[Vec<String>]) -> Result<GeneratedFile> {
    let config = ctx.config;
    let berry = config.berry_name(base)?;
    let macro_name = letterize(berry);
    let sty_name = nice_font_name(base);
    let has_option = |tag: &str| family_options.iter().any(|o| o.iter().any(|t| t == tag));

    let mut out = String::new();
    writeln!(out, "% Autogenerated by {} on {}", ctx.generator, ctx.date)?;
    writeln!(out, "\\NeedsTeXFormat{{LaTeX2e}}")?;
    writeln!(out, "\\ProvidesPackage{{{sty_name}}}[{} {base}]", ctx.date)?;
    writeln!(out, "\\RequirePackage[{}]{{fontenc}}", config.encoding)?;
    writeln!(out, "\\RequirePackage{{textcomp}}")?;
    writeln!(out, "\\RequirePackage{{xkeyval}}")?;
    writeln!(out, "\\RequirePackage{{nfssext}}")?;

    if has_option("sups") {
        writeln!(out, "\\def\\@makefnmark{{\\hbox{{\\sustyle\\@thefnmark}}}}")?;
        if has_option("sinf") {
            writeln!(out, "\\providecommand*{{\\textfrac}}[2]{{%")?;
            writeln!(out, "  \\textsu{{#1}}%")?;
            writeln!(out, "  \\textfractionsolidus")?;
            writeln!(out, "  \\textin{{#2}}}}")?;
        }
    }

    let scale = config.scaled.get(base).copied().unwrap_or(1.0);
    writeln!(
        out,
        "\\define@key{{{macro_name}}}{{scaled}}[{scale:?}]{{\\def\\{macro_name}@scaled{{s*[#1]}}}}"
    )?;
    writeln!(
        out,
        "\\define@key{{{macro_name}}}{{family}}[rm]{{\\def\\{macro_name}@family{{#1}}}}"
    )?;
    writeln!(out, "\\DeclareOption*{{%")?;
    writeln!(out, "  \\begingroup")?;
    writeln!(out, "  \\edef\\x{{\\endgroup")?;
    writeln!(out, "    \\noexpand\\setkeys{{{macro_name}}}{{\\CurrentOption}}}}%")?;
    writeln!(out, "  \\x}}")?;

    let oldstyle = if has_option("onum") { Some(config.code("onum")?) } else { None };
    let lining = if has_option("lnum") { Some(config.code("lnum")?) } else { None };
    let fallback = match config.fake_options.first() {
        Some(fake) => config.code(fake)?,
        None => "",
    };
    let default_style = match (oldstyle, lining) {
        (Some(o), _) if config.oldstyle_default => o,
        (_, Some(l)) => l,
        (Some(o), None) => o,
        (None, None) => fallback,
    };
    writeln!(out, "\\newcommand*{{\\{macro_name}@style}}{{{default_style}}}")?;

    for (option, code) in [("oldstyle", oldstyle), ("lining", lining)] {
        if let Some(code) = code {
            writeln!(out, "\\DeclareOption{{{option}}}{{%")?;
            writeln!(out, "  \\renewcommand*{{\\{macro_name}@style}}{{{code}}}%")?;
            writeln!(out, "}}")?;
        }
    }
    out.push('\n');

    writeln!(out, "\\newcommand*{{\\{macro_name}@default}}{{%")?;
    writeln!(out, "  \\renewcommand*{{\\rmdefault}}{{{berry}\\{macro_name}@style}}%")?;
    writeln!(out, "}}\n")?;

    for family in ["rm", "sf", "tt"] {
        writeln!(out, "\\DeclareOption{{{family}}}{{%")?;
        writeln!(out, "  \\renewcommand*{{\\{macro_name}@default}}{{}}%")?;
        writeln!(
            out,
            "  \\renewcommand*{{\\{family}default}}{{{berry}\\{macro_name}@style}}%"
        )?;
        writeln!(out, "}}\n")?;
    }

    writeln!(out, "\\ProcessOptions*")?;
    writeln!(out, "\\{macro_name}@default")?;
    writeln!(out, "\\endinput")?;

    Ok(GeneratedFile {
        name: format!("{sty_name}.sty"),
        contents: out,
    })
}

/// Render every `.fd` and `.sty` file for the exploded index.
///
/// Fails on the first family without a Berry ID.
pub fn render_all(ctx: &EmitContext<'_>, index: &ExplodedIndex) -> Result<Emission> {
    let mut emission = Emission::default();
    let mut typefaces: BTreeMap<&str, Vec<Vec<String>>> = BTreeMap::new();

    for family in index.families() {
        typefaces
            .entry(family.base())
            .or_default()
            .push(family.options().to_vec());
        let fd = render_fd(ctx, index, family)?;
        log::info!("generating {}", fd.name);
        emission.fd_files.push(fd);
    }

    for (base, options) in &typefaces {
        let sty = render_sty(ctx, base, options)?;
        log::info!("generating {}", sty.name);
        emission.sty_files.push(sty);
    }

    Ok(emission)
}
