//! Rewrites references inside consumer files that are not themselves hashed.

use std::fs;
use std::io;
use std::path::Path;

use crate::manifest::Manifest;
use crate::pattern::ReferencePattern;

/// Replace stale or unhashed references with current manifest values.
///
/// A match whose clean form has no manifest entry is normalized back to the
/// clean form, so hashes left over from earlier builds never survive. Returns
/// whether the file was written; running twice with an unchanged manifest
/// writes nothing the second time.
pub fn rewrite_file(
    path: &Path,
    pattern: &ReferencePattern,
    manifest: &Manifest,
) -> io::Result<bool> {
    let text = fs::read_to_string(path)?;

    let rewritten = pattern.replace_all(&text, |matched| {
        let clean = if manifest.get(matched).is_some() {
            matched.to_string()
        } else {
            pattern.strip_hash(matched)
        };
        match manifest.get(&clean) {
            Some(value) => value.to_string(),
            None => clean,
        }
    });

    if rewritten == text {
        return Ok(false);
    }
    fs::write(path, rewritten.as_bytes())?;
    Ok(true)
}
