mod config;
mod fingerprint;
mod hasher;
mod logging;
mod manifest;
mod naming;
mod pattern;
mod rewriter;
mod sources;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};

use config::{ConfigError, Options};

#[derive(Parser)]
#[command(name = "assethash")]
#[command(about = "Rename asset files with a content hash and rewrite references for long-term caching")]
struct Cli {
    /// Glob patterns for the files to fingerprint; each pattern forms a group
    #[arg(required = true, value_name = "GLOB")]
    patterns: Vec<String>,

    /// Glob patterns for files to scan for references without hashing them
    #[arg(long, value_name = "GLOB")]
    scan: Vec<String>,

    /// Digest algorithm: md5, sha256, sha512 or xxh3
    #[arg(long, default_value = "sha256")]
    algorithm: String,

    /// Text encoding used when scanning content for references
    #[arg(long, default_value = "utf8")]
    encoding: String,

    /// Manifest file recording original -> hashed names
    #[arg(long, default_value = "assets-hash.json", value_name = "FILE")]
    json_file: PathBuf,

    /// Update the manifest without copying or renaming files
    #[arg(long)]
    json_only: bool,

    /// Number of fingerprint characters embedded in filenames
    #[arg(long, default_value_t = 8)]
    length: usize,

    /// Rename files in place instead of copying
    #[arg(long)]
    rename: bool,

    /// Delete the previously hashed file once superseded
    #[arg(long)]
    clear: bool,

    /// Place the fingerprint after the basename instead of before
    #[arg(long)]
    suffix: bool,

    /// Record bare filenames in the manifest instead of full paths
    #[arg(long)]
    bare_names: bool,

    /// Path prefix stripped from recorded manifest paths
    #[arg(long, default_value = "", value_name = "PREFIX")]
    remove_from_path: String,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    let opts = match build_options(&cli) {
        Ok(opts) => opts,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let groups = match expand(&cli.patterns, &opts) {
        Ok(groups) => groups,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let scan = match expand(&cli.scan, &opts) {
        Ok(groups) => groups.into_iter().flatten().collect::<Vec<_>>(),
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match hasher::run(&groups, &scan, &opts) {
        Ok(summary) if summary.failed_groups > 0 => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn build_options(cli: &Cli) -> Result<Options, ConfigError> {
    Ok(Options {
        algorithm: cli.algorithm.parse()?,
        encoding: cli.encoding.parse()?,
        json_file: cli.json_file.clone(),
        json_only: cli.json_only,
        length: cli.length,
        rename: cli.rename,
        clear: cli.clear,
        full_path: !cli.bare_names,
        remove_from_path: cli.remove_from_path.clone(),
        suffix: cli.suffix,
    })
}

/// Expand each pattern into one file group, dropping the manifest itself if
/// a pattern happens to cover it.
fn expand(patterns: &[String], opts: &Options) -> Result<Vec<Vec<PathBuf>>, sources::GlobError> {
    let mut groups = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let mut files = sources::list_files(Path::new("."), pattern)?;
        files.retain(|f| *f != opts.json_file);
        if files.is_empty() {
            warn!(pattern = %pattern, "no files matched");
            continue;
        }
        groups.push(files);
    }
    Ok(groups)
}
