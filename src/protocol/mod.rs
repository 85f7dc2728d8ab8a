//! Protocol Layer: layout `aelmPkt` dan codec binary
//!
//! Prinsip desain:
//! - Fixed layout: 2032 bytes, urutan field dikunci oleh schema version 2
//! - Self-identifying: tag `488000002` di akhir record
//! - Byte order eksplisit: little-endian default, big-endian tersedia
//! - No allocation: encode/decode langsung ke/dari buffer

mod codec;
mod frame;
mod layout;
mod packet;
mod record;

pub use codec::{decode, decode_checked, encode_into, to_bytes, ByteOrder, Decoder, Encoder, Packets};
pub use frame::{peek_tag, Frame, PacketKind};
pub use layout::{field, FieldDesc, FieldKind, PacketMeta, FIELDS, META};
pub use packet::{
    AelmPacket, AVAILABLE_WORDS, ID_OFFSET, METADATA_VERSION, PACKET_SIZE, RF_CHANNELS, RTDN_ID,
    RTDN_PVC, RTDN_VERSION, SATURATED_WORDS,
};
pub use record::PacketRecord;
