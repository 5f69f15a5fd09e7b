use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, PvmxError>;

#[derive(Debug, thiserror::Error)]
pub enum PvmxError {
    #[error("Upstream IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid PVMX archive magic: expected {expected:X?}, found {found:X?}")]
    InvalidMagic { expected: [u8; 4], found: [u8; 4] },
    #[error("Unsupported PVMX archive version: {0}")]
    UnsupportedVersion(u8),
    #[error("Invalid UTF-8 in entry name")]
    InvalidName(#[from] std::string::FromUtf8Error),

    #[error("Invalid entry range: offset={offset}, size={size}, file_size={file_size}")]
    InvalidEntryRange { offset: u64, size: u64, file_size: u64 },

    #[error("Invalid texture index entry on line {line} (missing comma?)")]
    MissingComma { line: u32 },
    #[error("Invalid format for texture dimensions on line {line}: {text}")]
    InvalidDimensions { line: u32, text: String },
    #[error("Invalid {field} on line {line}: {value}")]
    InvalidNumber {
        line: u32,
        field: &'static str,
        value: String,
    },
}

impl PvmxError {
    /// Attach the offending path to an IO error.
    pub(crate) fn io_at(path: &Path, e: std::io::Error) -> Self {
        Self::Io(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
    }
}
