use std::{
    fmt,
    path::{Path, PathBuf},
};

use image::{DynamicImage, ImageFormat};

use crate::foundation::error::{ReelError, ReelResult};

/// File extensions accepted for path sources.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Where a still image comes from. Decoding is deferred to the processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Memory { label: String, bytes: Vec<u8> },
}

impl ImageSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn memory(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Memory {
            label: label.into(),
            bytes,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Path(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
            Self::Memory { label, .. } => label.clone(),
        }
    }

    /// Read and decode the source. Only JPEG and PNG are accepted.
    pub fn decode(&self) -> ReelResult<DynamicImage> {
        match self {
            Self::Path(path) => {
                check_extension(path)?;
                let bytes = std::fs::read(path).map_err(|source| ReelError::Io {
                    index: None,
                    path: path.clone(),
                    source,
                })?;
                decode_image(&bytes)
            }
            Self::Memory { bytes, .. } => decode_image(bytes),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// Decode an in-memory JPEG or PNG.
pub fn decode_image(bytes: &[u8]) -> ReelResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(ReelError::unsupported_format("empty image data"));
    }
    let format = image::guess_format(bytes)
        .map_err(|e| ReelError::unsupported_format(format!("unrecognized image data: {e}")))?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(ReelError::unsupported_format(format!(
            "{format:?} images are not supported (expected JPEG or PNG)"
        )));
    }
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ReelError::unsupported_format(format!("decode {format:?}: {e}")))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ReelError::InvalidDimensions {
            index: None,
            width: img.width(),
            height: img.height(),
        });
    }
    Ok(img)
}

fn check_extension(path: &Path) -> ReelResult<()> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(());
    }
    Err(ReelError::unsupported_format(format!(
        "invalid file type '{}': only JPEG and PNG are supported",
        path.display()
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
