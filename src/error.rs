//! Error type untuk codec dan archive.
//!
//! Operasi identitas (`get_id`, `set_id`, `is_packet`) tidak pernah gagal;
//! hanya layer di atasnya yang memakai `Error`.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Truncated buffer: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("Not an aelmPkt: tag is {found}, expected 488000002")]
    NotAelmPacket { found: u32 },
    #[error("Field {field}: expected {expected} elements, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Archive capacity must be greater than zero")]
    InvalidCapacity,
    #[error("Archive full ({capacity} slots)")]
    ArchiveFull { capacity: u64 },
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: u64, len: u64 },
    #[error("Invalid archive: {0}")]
    BadArchive(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
