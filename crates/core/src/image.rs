//! Image payloads for plate detection
//!
//! Images travel as `data:<mime>;base64,<payload>` URIs. The detection
//! endpoint only wants the payload after the comma.

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

const NOT_AN_IMAGE: &str = "Please select an image file (JPG, PNG, WEBP)";

/// An image encoded as a data URI
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    uri: String,
}

impl ImageData {
    /// Encode raw bytes with a known MIME type
    pub fn from_bytes(bytes: &[u8], mime: &str) -> Result<Self> {
        if !mime.starts_with("image/") {
            return Err(Error::InvalidImage(NOT_AN_IMAGE.into()));
        }
        if bytes.is_empty() {
            return Err(Error::InvalidImage("Image file is empty".into()));
        }

        Ok(Self {
            uri: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        })
    }

    /// Read and encode an image file.
    ///
    /// The type is sniffed from the file's leading bytes, falling back to
    /// the extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mime = sniff_mime(&bytes)
            .or_else(|| mime_from_extension(path))
            .ok_or_else(|| Error::InvalidImage(NOT_AN_IMAGE.into()))?;

        tracing::debug!(path = %path.display(), mime, size = bytes.len(), "Loaded image");
        Self::from_bytes(&bytes, mime)
    }

    pub fn data_uri(&self) -> &str {
        &self.uri
    }

    /// MIME type between `data:` and `;base64`
    pub fn mime(&self) -> &str {
        self.uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .unwrap_or_default()
    }

    /// Base64 payload with the data-URI prefix stripped
    pub fn base64_payload(&self) -> &str {
        self.uri
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or_default()
    }

    /// Decoded size in bytes
    pub fn decoded_len(&self) -> usize {
        STANDARD
            .decode(self.base64_payload())
            .map(|b| b.len())
            .unwrap_or(0)
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("mime", &self.mime())
            .field("payload_len", &self.base64_payload().len())
            .finish()
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'B', b'M', ..] => Some("image/bmp"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
