//! Upload directory holding the current PDF
//!
//! Every accepted upload replaces whatever was there before, so the
//! directory holds at most one document at a time.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Extensions accepted for upload
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

/// True iff the name has an extension and it is an allowed one (case-insensitive)
pub fn is_allowed(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied name to a safe single path component
pub fn sanitize_filename(name: &str) -> Result<String> {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars =
        UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("Invalid regex"));

    let flattened: String = name
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
        .collect();

    let cleaned = unsafe_chars.replace_all(&flattened, "");
    let cleaned = cleaned.trim_start_matches(['.', '_']);

    if cleaned.is_empty() {
        return Err(Error::invalid_input(format!("Invalid file name: {:?}", name)));
    }

    Ok(cleaned.to_string())
}

/// SHA-256 of uploaded bytes, hex encoded
pub fn content_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Directory holding at most one current upload
#[derive(Debug, Clone)]
pub struct UploadArea {
    dir: PathBuf,
}

impl UploadArea {
    /// Open the area, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Upload directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove every file, link and sub-directory
    pub async fn clear(&self) -> Result<()> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                tokio::fs::remove_dir_all(&path).await?;
            } else {
                tokio::fs::remove_file(&path).await?;
            }
        }
        tracing::info!("Uploads folder cleared: {}", self.dir.display());
        Ok(())
    }

    /// Clear the directory, then save `data` under the sanitized `filename`
    pub async fn replace(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        if !is_allowed(filename) {
            return Err(Error::UnsupportedFileType(filename.to_string()));
        }
        let filename = sanitize_filename(filename)?;
        if !is_allowed(&filename) {
            return Err(Error::invalid_input(format!("Invalid file name: {}", filename)));
        }

        self.clear().await?;

        let path = self.dir.join(&filename);
        tokio::fs::write(&path, data).await?;
        tracing::info!("File uploaded: {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }

    /// Names of stored `.pdf` files, sorted
    pub async fn list_pdfs(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.to_lowercase().ends_with(".pdf") {
                files.push(name);
            }
        }
        files.sort();
        Ok(files)
    }
}
