//! nfssgen-core: The patient tailor of LaTeX font families
//!
//! Hand it a drawer full of OpenType fonts and it measures every one: family,
//! weight, width, slope, optical size, and the features tucked inside. Then it
//! cuts each font into every NFSS variant those features allow and sews on a
//! Berry name, so `\textsc` and oldstyle figures just work in LaTeX.
//!
//! ## Four Fittings
//!
//! **Measuring**: asking each font who it is
//! - Talks to `otfinfo`, or reads attributes someone wrote down earlier
//! - Splits subfamilies like `SemiboldIt` into honest style words
//! - Turns optical size ranges into exact decipoint intervals
//!
//! **Sorting**: putting like with like
//! - Buckets fonts by family, weight, width, and variant
//! - Optical siblings share a bucket and keep their ranges
//!
//! **Cutting**: every option combination a font can wear
//! - Walks the option grammar lazily, one choice per group
//! - Folds family-forming options into the family, the rest into the name
//! - Computes Berry series and shape codes, including the quirky `si`
//!
//! **Finishing**: files and commands for TeX
//! - One `.fd` file per extended family, with substitution rules
//! - One `.sty` package per typeface
//! - One `otftotfm` invocation per variant
//!
//! ## A Sample Fitting
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use nfssgen_core::config::Config;
//! use nfssgen_core::oracle::Otfinfo;
//! use nfssgen_core::pipeline::{LoadOptions, Pipeline};
//!
//! let mut pipeline = Pipeline::new(Config::default())?;
//! pipeline.load(
//!     &[PathBuf::from("/Library/Fonts/Minion Pro")],
//!     &Otfinfo::default(),
//!     &LoadOptions::default(),
//! )?;
//! pipeline.explode()?;
//!
//! for command in pipeline.commands()? {
//!     println!("{command}");
//! }
//! #
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## The Cast of Characters
//!
//! - [`config::Config`]: encoding, option grammar, and Berry tables
//! - [`record::FontRecord`]: what one font file told us about itself
//! - [`classify::ClassificationIndex`]: fonts grouped by style
//! - [`explode::ExplodedIndex`]: every named variant, ready to install
//! - [`pipeline::Pipeline`]: the run that ties them together
//!
//! ---
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod breakout;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod emit;
pub mod error;
pub mod explode;
pub mod install;
pub mod oracle;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod tokens;

pub use error::{NfssError, Result};
