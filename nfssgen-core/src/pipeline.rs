//! One run from font files to exploded variants (made by FontLab https://www.fontlab.com/)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::classify::ClassificationIndex;
use crate::config::Config;
use crate::discovery::{FontDiscovery, PathDiscovery};
use crate::emit::{render_all, EmitContext, Emission};
use crate::explode::{ExplodedIndex, Exploder};
use crate::install::{plan_commands, ConversionCommand};
use crate::oracle::MetadataOracle;
use crate::record::{AttributeStore, FontAttributes, FontRecord};

#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    pub follow_symlinks: bool,
    pub recursive: bool,
    pub jobs: Option<usize>,
}

/// Owns the attribute store and both indices for one run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    store: AttributeStore,
    classes: ClassificationIndex,
    exploded: ExplodedIndex,
}

impl Pipeline {
    pub fn new(config: Config) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store: AttributeStore::new(),
            classes: ClassificationIndex::new(),
            exploded: ExplodedIndex::new(),
        })
    }

    /// Discover fonts under `paths`, extract their attributes, and classify them.
    ///
    /// Extraction runs in parallel; records enter the store in filename order.
    /// Returns the number of fonts added.
    pub fn load(
        &mut self,
        paths: &[PathBuf],
        oracle: &dyn MetadataOracle,
        opts: &LoadOptions,
    ) -> Result<usize> {
        let candidates = PathDiscovery::new(paths.iter().cloned())
            .follow_symlinks(opts.follow_symlinks)
            .recursive(opts.recursive)
            .discover()?;

        let run_extract = || -> Result<Vec<FontAttributes>> {
            let extracted: Result<Vec<Option<FontAttributes>>> = candidates
                .par_iter()
                .map(|path| extract_one(oracle, path))
                .collect();
            let mut attrs: Vec<FontAttributes> = extracted?.into_iter().flatten().collect();
            attrs.sort_by(|a, b| a.filename.cmp(&b.filename));
            Ok(attrs)
        };

        let attrs = if let Some(jobs) = opts.jobs {
            let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
            pool.install(run_extract)?
        } else {
            run_extract()?
        };

        let mut added = 0;
        for a in attrs {
            if self.add_attributes(a).is_some() {
                added += 1;
            }
        }
        log::info!("loaded {added} of {} candidate files", candidates.len());
        Ok(added)
    }

    /// Record and classify one font.
    ///
    /// A second file with an already-loaded PostScript name is skipped.
    pub fn add_attributes(&mut self, attrs: FontAttributes) -> Option<&FontRecord> {
        if let Some(existing) = self.store.get(&attrs.postscript_name) {
            log::warn!(
                "skipping {}: {} was already loaded from {}",
                attrs.filename.display(),
                attrs.postscript_name,
                existing.filename.display()
            );
            return None;
        }

        let record = FontRecord::from_attributes(attrs, &self.config.fake_options);
        log::debug!(
            "{}: {} {}/{}/{}",
            record.id,
            record.family,
            record.weight,
            record.width,
            record.variant
        );
        self.classes.classify(&record);
        let id = record.id.clone();
        self.store.insert(record);
        self.store.get(&id)
    }

    /// Rebuild the exploded index from the current classification.
    pub fn explode(&mut self) -> crate::error::Result<usize> {
        let exploder = Exploder::new(&self.config)?;
        let mut exploded = ExplodedIndex::new();
        let named = exploder.explode_into(&self.classes, &self.store, &mut exploded)?;
        log::info!(
            "{named} variants named, {} leaves, {} collisions",
            exploded.len(),
            exploded.collisions().len()
        );
        self.exploded = exploded;
        Ok(named)
    }

    pub fn commands(&self) -> crate::error::Result<Vec<ConversionCommand>> {
        plan_commands(&self.config, &self.exploded)
    }

    pub fn emit(&self, generator: &str, date: &str) -> crate::error::Result<Emission> {
        let ctx = EmitContext {
            config: &self.config,
            generator,
            date,
        };
        render_all(&ctx, &self.exploded)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &AttributeStore {
        &self.store
    }

    pub fn classes(&self) -> &ClassificationIndex {
        &self.classes
    }

    pub fn exploded(&self) -> &ExplodedIndex {
        &self.exploded
    }
}

fn extract_one(oracle: &dyn MetadataOracle, path: &Path) -> Result<Option<FontAttributes>> {
    let valid = oracle
        .is_valid_font(path)
        .with_context(|| format!("checking font {}", path.display()))?;
    if !valid {
        log::warn!("skipping {}: not a readable TrueType or CFF font", path.display());
        return Ok(None);
    }
    let attrs = oracle
        .extract(path)
        .with_context(|| format!("reading font {}", path.display()))?;
    log::debug!("{} -> {}", path.display(), attrs.postscript_name);
    Ok(Some(attrs))
}
