//! Upload directory layout
//!
//! Uploads and generated documents share one flat directory. Thumbnails go
//! into a per-session subdirectory unless shared thumbnails are configured,
//! in which case they sit next to the documents.

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

const THUMBNAIL_DIR: &str = "thumbnails";
const MODIFIED_PREFIX: &str = "modified_";
const FINAL_PREFIX: &str = "final_";

/// Where the thumbnails of one upload are written
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailDir {
    /// Session namespace, `None` for the shared layout
    pub session: Option<String>,
    pub path: PathBuf,
}

/// Storage root and naming rules
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    shared_thumbnails: bool,
}

impl Storage {
    /// Open the storage root, creating it if needed
    pub fn new(config: &StorageConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.root)?;
        Ok(Self {
            root: config.root.clone(),
            shared_thumbnails: config.shared_thumbnails,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reduce a client-supplied name to a single safe path component
    pub fn sanitize_filename(name: &str) -> Result<String> {
        let base = name
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or_default()
            .trim();
        if base.is_empty() || base == "." || base == ".." || base.contains('\0') {
            return Err(Error::PathAccessDenied {
                path: name.to_string(),
            });
        }
        Ok(base.to_string())
    }

    pub fn modified_name(filename: &str) -> String {
        format!("{}{}", MODIFIED_PREFIX, filename)
    }

    pub fn final_name(filename: &str) -> String {
        format!("{}{}", FINAL_PREFIX, filename)
    }

    /// Path a file with this (sanitized) name is stored at, existing or not
    pub fn path_for(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.root.join(Self::sanitize_filename(filename)?))
    }

    /// Write uploaded bytes; returns the stored path
    pub fn save_upload(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(filename)?;
        std::fs::write(&path, data)?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "Stored upload");
        Ok(path)
    }

    /// Path of an existing stored file
    pub fn existing(&self, filename: &str) -> Result<PathBuf> {
        let path = self.path_for(filename)?;
        if !path.is_file() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        Ok(path)
    }

    /// Create the thumbnail directory for a new upload
    pub fn new_thumbnail_dir(&self) -> Result<ThumbnailDir> {
        if self.shared_thumbnails {
            return Ok(ThumbnailDir {
                session: None,
                path: self.root.clone(),
            });
        }
        let session = uuid::Uuid::new_v4().to_string();
        let path = self.root.join(THUMBNAIL_DIR).join(&session);
        std::fs::create_dir_all(&path)?;
        Ok(ThumbnailDir {
            session: Some(session),
            path,
        })
    }

    /// Path of an existing thumbnail, from a session namespace or the shared layout
    pub fn thumbnail(&self, session: Option<&str>, image_name: &str) -> Result<PathBuf> {
        let file = Self::sanitize_filename(image_name)?;
        let path = match session {
            Some(session) => self
                .root
                .join(THUMBNAIL_DIR)
                .join(Self::sanitize_filename(session)?)
                .join(file),
            None => self.root.join(file),
        };
        if !path.is_file() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        Ok(path)
    }
}

/// File name of the thumbnail for `image_name`
pub fn thumbnail_file_name(image_name: &str) -> String {
    format!("{}.png", image_name)
}
