//! Storage module: archive paket di atas mmap
//!
//! Prinsip desain:
//! - Zero-Copy: slot dibaca langsung dari mapping
//! - Fixed slots: setiap slot tepat satu paket, tanpa framing
//! - Self-describing: header menyimpan packet id, ukuran, dan byte order

mod archive;

pub use archive::{PacketArchive, ARCHIVE_HEADER_SIZE};
