//! Dependency-ordered hashing of tracked files.
//!
//! A file's textual references to other tracked files are resolved before the
//! file itself is fingerprinted, so every recorded hash covers final content.
//! A shared visited set bounds the recursion to one pass per file and breaks
//! reference cycles.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, Options};
use crate::fingerprint;
use crate::manifest::{Manifest, ManifestError};
use crate::naming;
use crate::pattern::ReferencePattern;
use crate::rewriter;

#[derive(Error, Debug)]
pub enum HashError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to place {from} at {to}: {source}")]
    PlaceFile {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to compile reference pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Outcome counts for one run over every file group.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub failed_groups: usize,
    pub rewritten: usize,
}

/// One batch of tracked files sharing a visited set and reference pattern.
pub struct Batch<'a> {
    opts: &'a Options,
    pattern: &'a ReferencePattern,
    /// Canonical key -> source path on disk, for resolving references.
    sources: &'a HashMap<String, PathBuf>,
    visited: HashSet<PathBuf>,
}

impl<'a> Batch<'a> {
    pub fn new(
        opts: &'a Options,
        pattern: &'a ReferencePattern,
        sources: &'a HashMap<String, PathBuf>,
    ) -> Self {
        Self {
            opts,
            pattern,
            sources,
            visited: HashSet::new(),
        }
    }

    /// Hash one tracked file, recursing into any tracked file it references
    /// so that references are rewritten against final names first.
    pub fn process(&mut self, file: &Path, manifest: &mut Manifest) -> Result<(), HashError> {
        if self.visited.contains(file) {
            return Ok(());
        }
        // Track both spellings: a file renamed mid-run no longer
        // canonicalizes, but may still be named by its original path.
        if let Ok(canonical) = fs::canonicalize(file)
            && !self.visited.insert(canonical)
        {
            return Ok(());
        }
        self.visited.insert(file.to_path_buf());

        self.opts.validate()?;

        // Bootstrap an empty `{}` so the manifest exists even if every file
        // ends up skipped.
        if !self.opts.json_file.exists() {
            manifest.save(&self.opts.json_file)?;
        }

        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %file.display(), error = %e, "source missing or unreadable, skipping");
                return Ok(());
            }
        };

        // Binary content carries no textual references.
        let bytes = match self.opts.encoding.decode(bytes) {
            Ok(text) => self.resolve_references(file, text, manifest)?.into_bytes(),
            Err(bytes) => bytes,
        };

        let fingerprint = fingerprint::fingerprint(&bytes, self.opts.algorithm, self.opts.length);
        if naming::already_hashed(file, &fingerprint) {
            debug!(path = %file.display(), "filename already carries current fingerprint");
            return Ok(());
        }

        let new_name = naming::hashed_filename(file, &fingerprint, self.opts.suffix);
        let dest = file.with_file_name(&new_name);
        if dest.exists() {
            debug!(path = %dest.display(), "hashed output already exists");
            return Ok(());
        }

        if !self.opts.json_only {
            let place_err = |source| HashError::PlaceFile {
                from: file.to_path_buf(),
                to: dest.clone(),
                source,
            };
            if self.opts.rename {
                fs::rename(file, &dest).map_err(place_err)?;
            } else {
                fs::copy(file, &dest).map_err(place_err)?;
            }
            info!(from = %file.display(), to = %new_name, "hashed");
        }

        let key = naming::canonical_key(file, self.opts);
        let value = naming::manifest_value(file, &new_name, self.opts);
        let superseded = manifest.insert(key, value);
        if self.opts.clear
            && let Some(previous) = superseded
        {
            self.clear_stale(file, &previous);
        }
        manifest.save(&self.opts.json_file)?;
        Ok(())
    }

    /// Recursively hash every tracked file this content mentions, then swap
    /// the mentions for their manifest values. Writes the file back only
    /// when a replacement changed something.
    fn resolve_references(
        &mut self,
        file: &Path,
        text: String,
        manifest: &mut Manifest,
    ) -> Result<String, HashError> {
        let mut mentioned: Vec<String> = Vec::new();
        for matched in self.pattern.matches(&text) {
            let clean = self.clean_key(matched);
            if !mentioned.contains(&clean) {
                mentioned.push(clean);
            }
        }
        if mentioned.is_empty() {
            return Ok(text);
        }

        for key in &mentioned {
            if let Some(source) = self.sources.get(key).cloned() {
                self.process(&source, manifest)?;
            }
        }

        let pattern = self.pattern;
        let rewritten = pattern.replace_all(&text, |matched| {
            let clean = self.clean_key(matched);
            match manifest.get(&clean) {
                Some(value) => value.to_string(),
                None => clean,
            }
        });
        if rewritten != text {
            fs::write(file, &rewritten).map_err(|source| HashError::WriteFile {
                path: file.to_path_buf(),
                source,
            })?;
            debug!(path = %file.display(), "rewrote references");
        }
        Ok(rewritten)
    }

    /// Canonical clean form of a match. An exact key wins over stripping, so
    /// a tracked name whose stem looks like a fingerprint is never mangled.
    fn clean_key(&self, matched: &str) -> String {
        if self.sources.contains_key(matched) {
            matched.to_string()
        } else {
            self.pattern.strip_hash(matched)
        }
    }

    /// Best-effort deletion of the previously hashed file.
    fn clear_stale(&self, file: &Path, previous: &str) {
        let stale = if self.opts.full_path {
            Path::new(&self.opts.remove_from_path).join(previous)
        } else {
            match file.parent() {
                Some(dir) => dir.join(previous),
                None => PathBuf::from(previous),
            }
        };
        if stale.exists() && fs::remove_file(&stale).is_ok() {
            info!(path = %stale.display(), "deleted old version");
        }
    }
}

/// Hash every group of tracked files, then rewrite the scan-only consumers.
///
/// A configuration error fails the remaining files of its group; everything
/// else is handled per file. The only run-fatal conditions are an unreadable
/// or unparsable manifest and an uncompilable reference pattern.
pub fn run(groups: &[Vec<PathBuf>], scan: &[PathBuf], opts: &Options) -> Result<RunSummary, RunError> {
    let mut summary = RunSummary::default();

    let mut sources: HashMap<String, PathBuf> = HashMap::new();
    for file in groups.iter().flatten() {
        sources.insert(naming::canonical_key(file, opts), file.clone());
    }
    if sources.is_empty() {
        warn!("src does not exist");
        return Ok(summary);
    }

    let mut manifest = Manifest::load(&opts.json_file)?;
    let keys: Vec<String> = sources.keys().cloned().collect();
    let pattern = ReferencePattern::build(&keys, opts.length)?;

    let mut batch = Batch::new(opts, &pattern, &sources);
    for group in groups {
        let mut group_failed = false;
        for file in group {
            match batch.process(file, &mut manifest) {
                Ok(()) => summary.processed += 1,
                Err(HashError::Config(e)) => {
                    error!("{e}");
                    group_failed = true;
                    break;
                }
                Err(e) => warn!(path = %file.display(), "{e}"),
            }
        }
        if group_failed {
            summary.failed_groups += 1;
        }
    }

    for file in scan {
        match rewriter::rewrite_file(file, &pattern, &manifest) {
            Ok(true) => {
                info!(path = %file.display(), "updated references");
                summary.rewritten += 1;
            }
            Ok(false) => {}
            Err(e) => warn!(path = %file.display(), error = %e, "failed to rewrite"),
        }
    }

    Ok(summary)
}
