use std::path::PathBuf;

use nfssgen_core::config::Config;
use nfssgen_core::explode::{series_code, shape_code, FamilyKey};
use nfssgen_core::pipeline::Pipeline;
use nfssgen_core::record::FontAttributes;
use nfssgen_core::tokens::TokenList;

fn minion(name: &str, subfamily: &str, features: &[&str]) -> FontAttributes {
    FontAttributes {
        postscript_name: name.to_string(),
        filename: PathBuf::from(format!("/fonts/{name}.otf")),
        family: "Minion Pro".to_string(),
        subfamily: subfamily.to_string(),
        vendor_url: Some("http://www.adobe.com/type/".to_string()),
        features: features.iter().map(|f| f.to_string()).collect(),
        optical_size: None,
    }
}

fn grammar(config: &mut Config, groups: &[&[&str]]) {
    config.option_groups = groups
        .iter()
        .map(|g| g.iter().map(|t| t.to_string()).collect())
        .collect();
}

#[test]
fn minion_regular_with_oldstyle_and_small_caps() {
    let mut config = Config::default();
    grammar(&mut config, &[&["kern"], &["liga"], &["lnum", "onum"], &["smcp", ""]]);
    let mut pipeline = Pipeline::new(config).expect("pipeline");
    pipeline.add_attributes(minion("MinionPro-Regular", "Regular", &["kern", "liga", "onum", "smcp"]));

    assert_eq!(pipeline.explode().expect("explode"), 2);

    let leaves: Vec<_> = pipeline.exploded().iter().collect();
    assert_eq!(leaves.len(), 2);
    for (key, _) in &leaves {
        assert_eq!(key.family, FamilyKey::with_options("Minion Pro", ["onum"]));
        assert_eq!(key.series, "m");
        assert_eq!(key.optical, None);
    }

    let (normal_key, normal) = leaves[0];
    assert_eq!(normal_key.shape, "n");
    assert_eq!(normal.font_name, "LY1-MinionPro-Regular-onum-kern-liga");
    assert_eq!(normal.cmdline_options(), "-fonum -fkern -fliga ");

    let (caps_key, caps) = leaves[1];
    assert_eq!(caps_key.shape, "sc");
    assert_eq!(caps.font_name, "LY1-MinionPro-Regular-onum-kern-liga-smcp");
    assert_eq!(caps.vendor, "adobe");
}

#[test]
fn bold_extended_is_bx_and_regular_variant_is_n() {
    let config = Config::default();
    let weight: TokenList = ["bold"].into_iter().collect();
    let width: TokenList = ["extended"].into_iter().collect();
    assert_eq!(series_code(&weight, &width, &config).expect("series"), "bx");

    let regular: TokenList = ["regular"].into_iter().collect();
    assert_eq!(series_code(&regular, &regular, &config).expect("series"), "m");
    assert_eq!(shape_code(&regular, &config).expect("shape"), "n");
}

#[test]
fn italic_small_caps_uses_the_si_shape() {
    let config = Config::default();
    let variant: TokenList = ["italic", "smcp"].into_iter().collect();
    let shape = shape_code(&variant, &config).expect("shape");
    assert!(shape.starts_with("si"));
    assert!(!shape.contains("it"));
    assert!(!shape.contains("sc"));

    let mut pipeline = Pipeline::new(Config::default()).expect("pipeline");
    pipeline.add_attributes(minion("MinionPro-It", "Italic", &["kern", "liga", "onum", "smcp"]));
    pipeline.explode().expect("explode");
    let shapes: Vec<&str> = pipeline
        .exploded()
        .iter()
        .map(|(k, _)| k.shape.as_str())
        .collect();
    assert_eq!(shapes, vec!["it", "si"]);
}

#[test]
fn synthetic_numerals_are_invisible_but_keep_fonts_processable() {
    let mut config = Config::default();
    grammar(&mut config, &[&["lnum", "onum", "fakenum"]]);
    let mut pipeline = Pipeline::new(config).expect("pipeline");
    pipeline.add_attributes(minion("MinionPro-Bold", "Bold", &["kern", "liga"]));

    assert_eq!(pipeline.explode().expect("explode"), 1);
    let (key, font) = pipeline.exploded().iter().next().expect("one leaf");
    assert_eq!(key.family, FamilyKey::new("Minion Pro"));
    assert_eq!(key.series, "b");
    assert_eq!(key.shape, "n");
    assert_eq!(font.font_name, "LY1-MinionPro-Bold");
    assert!(font.options.is_empty());
    assert_eq!(font.cmdline_options(), "");
}

#[test]
fn later_font_with_the_same_key_overwrites_the_leaf() {
    let mut pipeline = Pipeline::new(Config::default()).expect("pipeline");
    pipeline.add_attributes(minion("MinionPro-Regular", "Regular", &["kern", "liga", "lnum"]));
    pipeline.add_attributes(minion("MinionPro-Display", "Regular", &["kern", "liga", "lnum"]));

    pipeline.explode().expect("explode");
    let exploded = pipeline.exploded();
    assert_eq!(exploded.len(), 1);
    let (_, font) = exploded.iter().next().expect("leaf");
    assert_eq!(font.source, "MinionPro-Display");

    let collisions = exploded.collisions();
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0].replaced, "MinionPro-Regular");
    assert_eq!(collisions[0].replacement, "MinionPro-Display");
}

#[test]
fn missing_code_aborts_the_run() {
    let mut config = Config::default();
    config.codes.remove("semibold");
    let mut pipeline = Pipeline::new(config).expect("pipeline");
    pipeline.add_attributes(minion("MinionPro-Semibold", "Semibold", &["kern", "liga", "onum"]));

    let err = pipeline.explode().unwrap_err();
    assert!(err.to_string().contains("'semibold'"));
}
