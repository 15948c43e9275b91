//! Image input resolution.
//!
//! Callers hand the validator either raw bytes, a local path, or a URL.
//! Resolution happens once per validation; the bytes feed both stages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors resolving an image input to bytes.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to fetch image {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("image fetch from {url} returned status {status}")]
    FetchStatus { url: String, status: u16 },
}

/// An image as the caller supplies it.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Raw image bytes.
    Bytes(Vec<u8>),
    /// Local file path.
    Path(PathBuf),
    /// HTTP(S) URL.
    Url(String),
}

impl ImageSource {
    /// Resolve the source to raw bytes.
    pub async fn resolve(&self) -> Result<Vec<u8>, ImageError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Path(path) => tokio::fs::read(path).await.map_err(|source| {
                ImageError::Read {
                    path: path.clone(),
                    source,
                }
            }),
            Self::Url(url) => {
                let response = reqwest::get(url).await.map_err(|source| {
                    ImageError::Fetch {
                        url: url.clone(),
                        source,
                    }
                })?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ImageError::FetchStatus {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                let bytes = response.bytes().await.map_err(|source| ImageError::Fetch {
                    url: url.clone(),
                    source,
                })?;
                Ok(bytes.to_vec())
            }
        }
    }

    /// Human-readable reference for log entries, when the source has one.
    pub fn reference(&self) -> Option<String> {
        match self {
            Self::Bytes(_) => None,
            Self::Path(path) => Some(path.display().to_string()),
            Self::Url(url) => Some(url.clone()),
        }
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&std::path::Path> for ImageSource {
    fn from(path: &std::path::Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}
