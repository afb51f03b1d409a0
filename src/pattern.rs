//! Builds the combined pattern matching tracked names and hashed variants.
//!
//! One pattern is compiled per run and reused for both self-reference
//! detection during hashing and consumer-file rewriting. For every tracked
//! key it matches the pristine name as well as names with a fingerprint
//! embedded before the basename or before the final extension, so stale
//! hashes from earlier builds are recognized even without a manifest hit.

use regex::Regex;

pub struct ReferencePattern {
    regex: Regex,
    strip: Regex,
}

impl ReferencePattern {
    /// Compile one alternation over every tracked key.
    ///
    /// Branches are sorted longest-key-first: alternation in the regex crate
    /// is leftmost-first, and `app.js.map` must win over its prefix `app.js`.
    pub fn build(keys: &[String], length: usize) -> Result<Self, regex::Error> {
        let hash = format!("(?:[a-f0-9]{{{length}}}\\.)?");
        let mut sorted: Vec<&String> = keys.iter().collect();
        sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let branches: Vec<String> = sorted.iter().map(|key| branch(key, &hash)).collect();
        let regex = Regex::new(&branches.join("|"))?;
        let strip = Regex::new(&format!(r"(^|[./])[a-f0-9]{{{length}}}\."))?;
        Ok(Self { regex, strip })
    }

    /// All occurrences of tracked names (or hashed variants) in `text`.
    pub fn matches<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> {
        self.regex.find_iter(text).map(|m| m.as_str())
    }

    /// Replace every occurrence using `replacement`, which receives the
    /// matched text.
    pub fn replace_all(&self, text: &str, mut replacement: impl FnMut(&str) -> String) -> String {
        self.regex
            .replace_all(text, |caps: &regex::Captures| replacement(&caps[0]))
            .into_owned()
    }

    /// Remove an embedded fingerprint fragment, recovering the clean name:
    /// `a1b2c3d4.logo.png` and `logo.a1b2c3d4.png` both become `logo.png`.
    pub fn strip_hash(&self, name: &str) -> String {
        self.strip.replace(name, "$1").into_owned()
    }
}

/// `assets/logo.png` -> `assets/(?:hash\.)?logo\.(?:hash\.)?png`
fn branch(key: &str, hash: &str) -> String {
    let (dir, name) = match key.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, key),
    };

    let mut out = String::new();
    if let Some(dir) = dir {
        out.push_str(&regex::escape(dir));
        out.push('/');
    }
    out.push_str(hash);
    match name.rsplit_once('.') {
        Some((stem, ext)) => {
            out.push_str(&regex::escape(stem));
            out.push_str("\\.");
            out.push_str(hash);
            out.push_str(&regex::escape(ext));
        }
        None => out.push_str(&regex::escape(name)),
    }
    out
}
