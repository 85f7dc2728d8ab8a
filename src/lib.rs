//! aelm-rtdn - AELM RTDN Telemetry Packet
//!
//! Arsitektur:
//! - Fixed Layout: `aelmPkt` 2032 bytes, schema version 2
//! - Self-Identifying: tag `488000002` di akhir record
//! - Zero-Copy: frame dan slot archive dibaca langsung dari buffer/mmap
//! - Byte Order Eksplisit: little-endian default, big-endian tersedia

pub mod error;
pub mod protocol;
pub mod storage;

pub use error::{Error, Result};
pub use protocol::{AelmPacket, ByteOrder, PACKET_SIZE, RTDN_ID};
pub use storage::PacketArchive;
