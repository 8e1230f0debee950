//! Profile photo attachment.
//!
//! Photos are size-checked from file metadata before any bytes are read, and
//! the read itself stops one byte past the limit, so an oversized file is
//! never pulled into memory.

use std::fmt;
use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt};

/// Largest accepted photo, in bytes (1 MiB).
pub const MAX_PHOTO_BYTES: u64 = 1_048_576;

/// Errors raised while attaching a photo.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoError {
    /// The file exceeds [`MAX_PHOTO_BYTES`].
    #[error("photo must be 1 MB or smaller (got {size} bytes)")]
    TooLarge {
        /// Observed size in bytes.
        size: u64,
    },
    /// The file extension does not name a supported image type.
    #[error("photo must be a PNG, JPEG, GIF or WebP image")]
    UnsupportedType {
        /// File name that was rejected.
        file_name: String,
    },
    /// Reading the file failed.
    #[error("failed to read photo at {path}: {message}")]
    Read {
        /// Path that could not be read.
        path: String,
        /// Underlying I/O error.
        message: String,
    },
}

/// Image attached to a registration draft.
///
/// ## Invariants
/// - `media_type` is an `image/*` type derived from the file name.
/// - The size limit is checked by [`crate::domain::validate_draft`] as well
///   as by [`Photo::load`], so photos built from raw bytes are still gated.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    file_name: String,
    media_type: &'static str,
    bytes: Vec<u8>,
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Photo {
    /// Wrap in-memory image bytes, deriving the media type from `file_name`.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError::UnsupportedType`] for non-image extensions.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, PhotoError> {
        let file_name = file_name.into();
        let media_type = media_type_for(&file_name).ok_or_else(|| PhotoError::UnsupportedType {
            file_name: file_name.clone(),
        })?;
        Ok(Self {
            file_name,
            media_type,
            bytes,
        })
    }

    /// Read a photo from disk after checking its size and type.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoError::TooLarge`] when the metadata reports more than
    /// [`MAX_PHOTO_BYTES`] or the file grows past it while being read,
    /// [`PhotoError::UnsupportedType`] for non-image extensions and
    /// [`PhotoError::Read`] on I/O failure.
    pub async fn load(path: &Path) -> Result<Self, PhotoError> {
        let read_error = |error: std::io::Error| PhotoError::Read {
            path: path.display().to_string(),
            message: error.to_string(),
        };
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if media_type_for(&file_name).is_none() {
            return Err(PhotoError::UnsupportedType { file_name });
        }

        let file = tokio::fs::File::open(path).await.map_err(read_error)?;
        let size = file.metadata().await.map_err(read_error)?.len();
        if size > MAX_PHOTO_BYTES {
            return Err(PhotoError::TooLarge { size });
        }

        let bytes = read_at_most(file, MAX_PHOTO_BYTES)
            .await
            .map_err(read_error)?;
        if bytes.len() as u64 > MAX_PHOTO_BYTES {
            return Err(PhotoError::TooLarge {
                size: bytes.len() as u64,
            });
        }
        Self::from_bytes(file_name, bytes)
    }

    /// Original file name, sent with the multipart part.
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// `image/*` media type of the photo.
    pub const fn media_type(&self) -> &'static str {
        self.media_type
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Size of the photo in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Read at most `limit + 1` bytes so an overrun is detectable without
/// buffering the rest.
async fn read_at_most<R>(reader: R, limit: u64) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader.take(limit + 1).read_to_end(&mut bytes).await?;
    Ok(bytes)
}

fn media_type_for(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_string_lossy()
        .to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
