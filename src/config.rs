//! Run configuration: digest choice, naming options, manifest location.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("{} needs to be a JSON file", .0.display())]
    ManifestNotJson(PathBuf),

    #[error("Hash length must be between 1 and 64, got {0}")]
    InvalidLength(usize),
}

/// Digest used for fingerprinting file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    Md5,
    #[default]
    Sha256,
    Sha512,
    Xxh3,
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            "xxh3" => Ok(Self::Xxh3),
            other => Err(ConfigError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Text decoding applied before scanning content for references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
}

impl Encoding {
    /// Decode file bytes to text. A file that does not decode carries no
    /// textual references; the caller gets its bytes back untouched.
    pub fn decode(self, bytes: Vec<u8>) -> Result<String, Vec<u8>> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes).map_err(|e| e.into_bytes()),
        }
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            other => Err(ConfigError::UnsupportedEncoding(other.to_string())),
        }
    }
}

/// Options for one run. Immutable once the run starts.
#[derive(Debug, Clone)]
pub struct Options {
    pub algorithm: Algorithm,
    pub encoding: Encoding,
    /// Manifest file recording `canonical name -> hashed name`.
    pub json_file: PathBuf,
    /// Update the manifest without touching files on disk.
    pub json_only: bool,
    /// Fingerprint length in hex characters.
    pub length: usize,
    /// Move files instead of copying them.
    pub rename: bool,
    /// Delete the previously hashed file once superseded.
    pub clear: bool,
    /// Record directory-qualified paths instead of bare filenames.
    pub full_path: bool,
    /// Prefix stripped from recorded directories.
    pub remove_from_path: String,
    /// Place the fingerprint after the basename instead of before.
    pub suffix: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            encoding: Encoding::default(),
            json_file: PathBuf::from("assets-hash.json"),
            json_only: false,
            length: 8,
            rename: false,
            clear: false,
            full_path: true,
            remove_from_path: String::new(),
            suffix: false,
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.json_file.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(ConfigError::ManifestNotJson(self.json_file.clone()));
        }
        if self.length == 0 || self.length > 64 {
            return Err(ConfigError::InvalidLength(self.length));
        }
        Ok(())
    }
}
