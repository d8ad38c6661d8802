//! Profile images.

use std::fmt;

/// Largest accepted avatar upload, in bytes.
pub const AVATAR_MAX_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarValidationError {
    UnsupportedContentType,
    Empty,
    TooLarge { max: usize },
}

impl fmt::Display for AvatarValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedContentType => {
                write!(f, "avatar must be a png, jpeg, gif or webp image")
            }
            Self::Empty => write!(f, "avatar must not be empty"),
            Self::TooLarge { max } => write!(f, "avatar must be at most {max} bytes"),
        }
    }
}

impl std::error::Error for AvatarValidationError {}

impl AvatarValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedContentType => "unsupported_content_type",
            Self::Empty => "empty",
            Self::TooLarge { .. } => "too_large",
        }
    }
}

/// Image formats accepted for avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl AvatarFormat {
    pub fn from_content_type(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub fn from_extension(value: &str) -> Option<Self> {
        [Self::Png, Self::Jpeg, Self::Gif, Self::Webp]
            .into_iter()
            .find(|format| format.extension() == value)
    }
}

/// Uploaded avatar image.
///
/// # Examples
/// ```
/// use blog_backend::domain::{AvatarFormat, AvatarImage};
///
/// let image = AvatarImage::new("image/png", vec![0x89, b'P', b'N', b'G']).unwrap();
/// assert_eq!(image.format(), AvatarFormat::Png);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarImage {
    format: AvatarFormat,
    bytes: Vec<u8>,
}

impl AvatarImage {
    pub fn new(content_type: &str, bytes: Vec<u8>) -> Result<Self, AvatarValidationError> {
        let format = AvatarFormat::from_content_type(content_type)
            .ok_or(AvatarValidationError::UnsupportedContentType)?;
        if bytes.is_empty() {
            return Err(AvatarValidationError::Empty);
        }
        if bytes.len() > AVATAR_MAX_BYTES {
            return Err(AvatarValidationError::TooLarge {
                max: AVATAR_MAX_BYTES,
            });
        }
        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> AvatarFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
