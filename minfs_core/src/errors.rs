use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinfsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("short write: expected {expected} bytes, wrote {written}")]
    ShortWrite { expected: usize, written: usize },

    #[error("short read: expected {expected} bytes, got {read}")]
    ShortRead { expected: usize, read: usize },

    #[error("device too small: {blocks} blocks, need at least {required}")]
    DeviceTooSmall { blocks: u64, required: u64 },

    #[error("bit index {index} out of range for bitmap of {capacity} bits")]
    BitmapOutOfBounds { index: u64, capacity: u64 },

    #[error("filename too long: {len} bytes (max {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("invalid superblock: {0}")]
    InvalidSuperblock(String),

    #[error("corrupt image: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, MinfsError>;
