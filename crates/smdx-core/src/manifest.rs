//! Manifest of a directory of SMDX definition files
//!
//! Each definition file is listed with the MD5 of its content, in the layout
//! SunSpec publishes (`<file name=".." md5=".."/>`). The manifest itself is
//! hashed into a `.md5` sidecar so consumers can check the index before
//! trusting it.

use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::SmdxError;

/// Where and how to build a manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Directory holding the definition files
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Manifest file name, written inside `path`
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// File name prefixes to leave out (hidden files are always skipped)
    #[serde(default = "default_exclude_prefixes")]
    pub exclude_prefixes: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            file_name: default_file_name(),
            exclude_prefixes: default_exclude_prefixes(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("./smdx")
}

fn default_file_name() -> String {
    "manifest.xml".to_string()
}

fn default_exclude_prefixes() -> Vec<String> {
    vec!["manifest".to_string()]
}

impl ManifestConfig {
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(&self.file_name)
    }

    /// Path of the file holding the manifest's own hash
    pub fn digest_path(&self) -> PathBuf {
        self.path.join(format!("{}.md5", self.file_name))
    }

    fn is_excluded(&self, name: &str) -> bool {
        name.starts_with('.') || self.exclude_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

/// One listed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@md5")]
    pub md5: String,
}

/// Manifest document, entries sorted by file name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "manifest")]
pub struct Manifest {
    #[serde(default)]
    pub file: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parse a manifest from XML
    pub fn from_xml(xml: &str) -> Result<Self, SmdxError> {
        from_str(xml).map_err(|e| SmdxError::Parse(e.to_string()))
    }

    /// Serialize to XML
    pub fn to_xml(&self) -> Result<String, SmdxError> {
        let xml = to_string(self).map_err(|e| SmdxError::Serialize(e.to_string()))?;
        Ok(format!("<?xml version='1.0'?>\n{}\n", xml))
    }

    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.file.iter().find(|e| e.name == name)
    }

    /// Write the manifest and its digest sidecar, returning the manifest's hash
    pub fn write(&self, config: &ManifestConfig) -> Result<String, SmdxError> {
        let xml = self.to_xml()?;
        let digest = md5_hex(xml.as_bytes());
        std::fs::write(config.manifest_path(), &xml)?;
        std::fs::write(config.digest_path(), format!("{}\n", digest))?;

        info!(
            path = %config.manifest_path().display(),
            files = self.file.len(),
            md5 = %digest,
            "Wrote manifest"
        );
        Ok(digest)
    }
}

/// Hash every eligible file in the configured directory
pub fn scan(config: &ManifestConfig) -> Result<Manifest, SmdxError> {
    let mut entries = Vec::new();

    for dir_entry in std::fs::read_dir(&config.path)? {
        let dir_entry = dir_entry?;
        if !dir_entry.file_type()?.is_file() {
            continue;
        }
        let name = dir_entry.file_name().to_string_lossy().into_owned();
        if config.is_excluded(&name) {
            debug!(file = %name, "Skipping excluded file");
            continue;
        }

        let md5 = hash_file(&dir_entry.path())?;
        debug!(file = %name, md5 = %md5, "Hashed definition file");
        entries.push(ManifestEntry { name, md5 });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Manifest { file: entries })
}

fn hash_file(path: &Path) -> Result<String, SmdxError> {
    let content = std::fs::read(path)?;
    Ok(md5_hex(&content))
}

/// Compute MD5 hash of data and return as hex string
pub fn md5_hex(data: &[u8]) -> String {
    use md5::{Digest, Md5};
    let mut hasher = Md5::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}
