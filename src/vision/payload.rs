use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::vision::error::VisionError;

/// Shape of an inline image string: `data:image/<fmt>;base64,<payload>`.
/// The payload must be non-empty base64 characters; decodability is left
/// to the remote service.
static DATA_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/([A-Za-z]+);base64,([A-Za-z0-9+/=]+)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Jpg,
    Png,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    /// Format for a file extension, used when ingesting images from disk.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpeg" => Some(ImageFormat::Jpeg),
            "jpg" => Some(ImageFormat::Jpg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = VisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageFormat::from_extension(s).ok_or_else(|| {
            VisionError::InvalidImageFormat(format!(
                "Unsupported image format '{}' (expected jpeg, jpg or png)",
                s
            ))
        })
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated inline image, ready to be embedded into a prompt.
/// Constructed once per call and never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    format: ImageFormat,
    encoded_data: String,
}

impl ImagePayload {
    /// Parse and validate a `data:image/...;base64,...` string.
    ///
    /// Pure string parsing, no I/O. The format token is matched
    /// case-insensitively and normalized to lowercase.
    pub fn parse(raw: &str) -> Result<Self, VisionError> {
        let captures = DATA_URL_RE.captures(raw).ok_or_else(|| {
            VisionError::InvalidImageFormat(
                "Image must be a data:image/<jpeg|jpg|png>;base64,<payload> string".to_string(),
            )
        })?;

        let format: ImageFormat = captures[1].parse()?;
        Ok(Self {
            format,
            encoded_data: captures[2].to_string(),
        })
    }

    pub fn from_bytes(format: ImageFormat, bytes: &[u8]) -> Self {
        Self {
            format,
            encoded_data: STANDARD.encode(bytes),
        }
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn encoded_data(&self) -> &str {
        &self.encoded_data
    }

    /// The normalized data URL embedded into the outbound prompt.
    pub fn data_url(&self) -> String {
        format!("data:image/{};base64,{}", self.format, self.encoded_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_formats() {
        for fmt in ["jpeg", "jpg", "png"] {
            let raw = format!("data:image/{};base64,aGVsbG8=", fmt);
            let payload = ImagePayload::parse(&raw).unwrap();
            assert_eq!(payload.format().as_str(), fmt);
            assert_eq!(payload.encoded_data(), "aGVsbG8=");
        }
    }

    #[test]
    fn normalizes_format_case() {
        let payload = ImagePayload::parse("data:image/JPEG;base64,aGVsbG8=").unwrap();
        assert_eq!(payload.format(), ImageFormat::Jpeg);
        assert_eq!(payload.data_url(), "data:image/jpeg;base64,aGVsbG8=");
    }

    #[test]
    fn rejects_unsupported_format() {
        let err = ImagePayload::parse("data:image/gif;base64,aGVsbG8=").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn rejects_malformed_input() {
        for raw in [
            "",
            "aGVsbG8=",
            "data:image/png;base64,",
            "data:image/;base64,aGVsbG8=",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/png,aGVsbG8=",
            " data:image/png;base64,aGVsbG8=",
            "data:image/png;base64,aGVs bG8=",
        ] {
            let err = ImagePayload::parse(raw).unwrap_err();
            assert!(err.is_invalid_input(), "expected rejection for {:?}", raw);
        }
    }

    #[test]
    fn data_url_round_trips() {
        let raw = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(ImagePayload::parse(raw).unwrap().data_url(), raw);
    }

    #[test]
    fn from_bytes_encodes_standard_base64() {
        let payload = ImagePayload::from_bytes(ImageFormat::Png, b"hello");
        assert_eq!(payload.encoded_data(), "aGVsbG8=");
        assert_eq!(payload.data_url(), "data:image/png;base64,aGVsbG8=");
    }
}
