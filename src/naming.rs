//! Derives hashed filenames and manifest key/value pairs.

use std::path::Path;

use crate::config::Options;

/// Source maps are referenced by bare filename in trailing comments, so their
/// manifest entries never carry a directory.
const SOURCE_MAP_EXT: &str = "map";

pub fn is_source_map(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_MAP_EXT)
}

/// `logo.png` + `a1b2c3d4` -> `a1b2c3d4.logo.png`, or `logo.a1b2c3d4.png`
/// in suffix mode.
pub fn hashed_filename(path: &Path, fingerprint: &str, suffix: bool) -> String {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if suffix => format!("{stem}.{fingerprint}.{ext}"),
        Some((stem, ext)) => format!("{fingerprint}.{stem}.{ext}"),
        None if suffix => format!("{name}.{fingerprint}"),
        None => format!("{fingerprint}.{name}"),
    }
}

/// True when the filename already embeds the current fingerprint, meaning the
/// file was hashed by a previous run and its content has not changed.
pub fn already_hashed(path: &Path, fingerprint: &str) -> bool {
    file_name(path).contains(fingerprint)
}

/// Manifest key for a tracked file: directory-qualified path or bare filename.
pub fn canonical_key(path: &Path, opts: &Options) -> String {
    let name = file_name(path);
    if is_source_map(path) || !opts.full_path {
        return name;
    }
    joined_path(path, &name, opts)
}

/// Manifest value: the hashed name, carrying the directory when configured.
pub fn manifest_value(path: &Path, new_name: &str, opts: &Options) -> String {
    if is_source_map(path) || !opts.full_path {
        return new_name.to_string();
    }
    joined_path(path, new_name, opts)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Forward-slash join of the prefix-stripped directory and a filename.
fn joined_path(path: &Path, name: &str, opts: &Options) -> String {
    let dir = path
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    let dir = if opts.remove_from_path.is_empty() {
        dir
    } else {
        dir.replacen(&opts.remove_from_path, "", 1)
    };
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
