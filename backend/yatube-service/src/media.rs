//! Uploaded post images on the local filesystem.
//!
//! Files live under `<root>/posts/` and are referred to by their name
//! relative to the root (`posts/small.gif`), which is what posts store.

use mime::Mime;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

const UPLOAD_DIR: &str = "posts";
const SUFFIX_LEN: usize = 7;
const MAX_ATTEMPTS: usize = 8;

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store an upload and return its media name. An existing file with
    /// the same name is never overwritten; a random suffix is added instead.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let dir = self.root.join(UPLOAD_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let (stem, extension) = split_name(&sanitize(original_name));
        for attempt in 0..MAX_ATTEMPTS {
            let file_name = if attempt == 0 {
                join_name(&stem, extension.as_deref())
            } else {
                join_name(&format!("{}_{}", stem, random_suffix()), extension.as_deref())
            };

            let path = dir.join(&file_name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    let name = format!("{}/{}", UPLOAD_DIR, file_name);
                    tracing::debug!(%name, size = bytes.len(), "media file stored");
                    return Ok(name);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Media(format!(
            "could not find a free name for upload '{}'",
            original_name
        )))
    }

    /// Read a stored file. Names that try to leave the media root are
    /// treated as missing.
    pub async fn open(&self, name: &str) -> Result<Option<(Vec<u8>, Mime)>> {
        let relative = Path::new(name);
        if name.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Ok(None);
        }

        let path = self.root.join(relative);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let bytes = tokio::fs::read(&path).await?;
        Ok(Some((bytes, content_type(name))))
    }
}

fn sanitize(original_name: &str) -> String {
    // browsers may send a full client-side path
    let base = original_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

fn split_name(name: &str) -> (String, Option<String>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            (stem.to_string(), Some(ext.to_ascii_lowercase()))
        }
        _ => (name.to_string(), None),
    }
}

fn join_name(stem: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem.to_string(),
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}

fn content_type(name: &str) -> Mime {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "gif" => mime::IMAGE_GIF,
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "bmp" => mime::IMAGE_BMP,
        "webp" => "image/webp"
            .parse()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
