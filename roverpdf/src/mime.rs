//! MIME types accepted for file-backed entries.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::RoverError;

/// `application/pdf`
pub const PDF: &str = "application/pdf";
/// `image/png`
pub const PNG: &str = "image/png";
/// `image/jpeg`
pub const JPEG: &str = "image/jpeg";
/// `image/bmp`
pub const BMP: &str = "image/bmp";

/// A MIME type from the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeType {
    /// Portable Document Format.
    Pdf,
    /// PNG raster image.
    Png,
    /// JPEG raster image.
    Jpeg,
    /// Windows bitmap.
    Bmp,
}

impl MimeType {
    /// Every admissible type.
    pub const ALL: [MimeType; 4] = [Self::Pdf, Self::Bmp, Self::Jpeg, Self::Png];

    /// The canonical MIME string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => PDF,
            Self::Png => PNG,
            Self::Jpeg => JPEG,
            Self::Bmp => BMP,
        }
    }

    /// True for raster image types.
    pub fn is_image(&self) -> bool {
        self.as_str().starts_with("image/")
    }

    /// Infer the type from a file extension.
    ///
    /// Returns `None` for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MimeType {
    type Err = RoverError;

    /// Parse a declared MIME type against the allow-list.
    ///
    /// Only the exact allow-list strings match. The returned error carries
    /// an empty path; callers with a path should use
    /// [`RoverError::unsupported_mime_type`] instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mime| mime.as_str() == s)
            .ok_or_else(|| RoverError::unsupported_mime_type(Default::default(), s))
    }
}
