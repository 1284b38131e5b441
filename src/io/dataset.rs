//! Accepted historical-dataset formats.
//!
//! Parsing happens upstream; this only gates which uploads are accepted
//! before their extracted series reach the engine.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// File formats accepted for historical load data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Parquet,
    Xlsx,
}

/// Rejected dataset upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unsupported dataset \"{file_name}\": expected one of {expected}",
    expected = DatasetFormat::EXTENSIONS.join(", ")
)]
pub struct UnsupportedDataset {
    pub file_name: String,
}

impl DatasetFormat {
    pub const EXTENSIONS: &[&str] = &["csv", "parquet", "xlsx"];

    /// Detects the format from a file name's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedDataset` for any other or missing extension.
    pub fn from_file_name(file_name: &str) -> Result<Self, UnsupportedDataset> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") => Ok(Self::Parquet),
            Some("xlsx") => Ok(Self::Xlsx),
            _ => Err(UnsupportedDataset {
                file_name: file_name.to_string(),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
            Self::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
