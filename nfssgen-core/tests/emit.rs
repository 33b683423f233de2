use std::path::PathBuf;

use nfssgen_core::config::Config;
use nfssgen_core::emit::Emission;
use nfssgen_core::pipeline::Pipeline;
use nfssgen_core::record::FontAttributes;

fn minion(name: &str, subfamily: &str, features: &[&str], optical: Option<(f64, f64)>) -> FontAttributes {
    FontAttributes {
        postscript_name: name.to_string(),
        filename: PathBuf::from(format!("/fonts/{name}.otf")),
        family: "Minion Pro".to_string(),
        subfamily: subfamily.to_string(),
        vendor_url: None,
        features: features.iter().map(|f| f.to_string()).collect(),
        optical_size: optical,
    }
}

fn emit(config: Config, fonts: Vec<FontAttributes>) -> Emission {
    let mut pipeline = Pipeline::new(config).expect("pipeline");
    for font in fonts {
        pipeline.add_attributes(font);
    }
    pipeline.explode().expect("explode");
    pipeline.emit("nfssgen", "2024/05/01").expect("emit")
}

fn kern_only() -> Config {
    Config {
        option_groups: vec![vec!["kern".to_string()]],
        ..Config::default()
    }
}

#[test]
fn optical_siblings_share_one_font_shape() {
    let emission = emit(
        kern_only(),
        vec![
            minion("MinionPro-Regular", "Regular", &["kern"], Some((8.4, 13.0))),
            minion("MinionPro-Capt", "Caption", &["kern"], Some((6.0, 8.4))),
            minion("MinionPro-Subh", "Subhead", &["kern"], Some((13.0, 19.0))),
        ],
    );

    assert_eq!(emission.fd_files.len(), 1);
    let fd = &emission.fd_files[0];
    assert_eq!(fd.name, "ly1pmn.fd");
    let expected = "\
\\DeclareFontShape{LY1}{pmn}{m}{n}{
  <-8.5>  \\pmn@scaled  LY1-MinionPro-Capt-kern
  <8.5-13.1>  \\pmn@scaled  LY1-MinionPro-Regular-kern
  <13.1->  \\pmn@scaled  LY1-MinionPro-Subh-kern
}{}
";
    assert!(fd.contents.contains(expected), "{}", fd.contents);
    assert!(fd.contents.starts_with("% Autogenerated by nfssgen on 2024/05/01\n"));
    assert!(fd.contents.contains("\\DeclareFontFamily{LY1}{pmn}{}"));
    assert!(fd.contents.trim_end().ends_with("\\endinput"));
}

#[test]
fn missing_slanted_is_substituted_from_italic() {
    let emission = emit(
        kern_only(),
        vec![
            minion("MinionPro-Regular", "Regular", &["kern"], None),
            minion("MinionPro-It", "Italic", &["kern"], None),
        ],
    );

    let fd = &emission.fd_files[0].contents;
    assert!(fd.contains("  <->  \\pmn@scaled  LY1-MinionPro-It-kern\n"));
    assert!(fd.contains("\\DeclareFontShape{LY1}{pmn}{m}{sl}{\n  <->  sub * pmn/m/it\n}{}"));
}

#[test]
fn family_forming_options_get_their_own_fd_and_share_a_sty() {
    let emission = emit(
        Config::default(),
        vec![minion("MinionPro-Regular", "Regular", &["kern", "liga", "lnum", "onum"], None)],
    );

    let fd_names: Vec<&str> = emission.fd_files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fd_names, vec!["ly1pmnx.fd", "ly1pmnj.fd"]);

    assert_eq!(emission.sty_files.len(), 1);
    let sty = &emission.sty_files[0];
    assert_eq!(sty.name, "minion.sty");
    assert!(sty.contents.contains("\\ProvidesPackage{minion}"));
    assert!(sty.contents.contains("\\newcommand*{\\pmn@style}{j}"));
    assert!(sty.contents.contains("\\DeclareOption{oldstyle}{%"));
    assert!(sty.contents.contains("\\DeclareOption{lining}{%"));
    assert!(sty.contents.contains("\\renewcommand*{\\sfdefault}{pmn\\pmn@style}%"));
    assert!(!sty.contents.contains("\\textfrac"));
}

#[test]
fn lining_is_the_default_when_oldstyle_is_not_preferred() {
    let config = Config {
        oldstyle_default: false,
        ..Config::default()
    };
    let emission = emit(
        config,
        vec![minion("MinionPro-Regular", "Regular", &["kern", "liga", "lnum", "onum"], None)],
    );
    assert!(emission.sty_files[0]
        .contents
        .contains("\\newcommand*{\\pmn@style}{x}"));
}

#[test]
fn unknown_family_fails_emission_with_a_hint() {
    let mut pipeline = Pipeline::new(Config::default()).expect("pipeline");
    let mut font = minion("Nowhere-Regular", "Regular", &["kern", "liga", "onum"], None);
    font.family = "Nowhere Sans".to_string();
    pipeline.add_attributes(font);
    pipeline.explode().expect("explode");

    let err = pipeline.emit("nfssgen", "2024/05/01").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("'Nowhere Sans'"));
    assert!(message.contains("berry_names"));
}
