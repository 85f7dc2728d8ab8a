//! Klasifikasi frame di channel RTDN yang campur
//!
//! Setiap frame 2032 bytes; 4 bytes terakhir adalah tag identitas.
//! Tag bisa dibaca tanpa decode seluruh record.

use super::codec::{decode_checked, ByteOrder};
use super::packet::{AelmPacket, ID_OFFSET, PACKET_SIZE, RTDN_ID};
use crate::error::{Error, Result};

/// Baca tag identitas dari raw bytes (zero-copy).
///
/// Returns None kalau buffer lebih pendek dari satu paket.
#[inline(always)]
pub fn peek_tag(bytes: &[u8], order: ByteOrder) -> Option<u32> {
    let word: [u8; 4] = bytes.get(ID_OFFSET..PACKET_SIZE)?.try_into().ok()?;
    Some(order.read_u32(word))
}

/// Keluarga paket RTDN, dibedakan dari tag trailing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Aelm,
    Foreign(u32),
}

impl PacketKind {
    #[inline(always)]
    pub fn from_tag(tag: u32) -> Self {
        if tag == RTDN_ID {
            Self::Aelm
        } else {
            Self::Foreign(tag)
        }
    }
}

/// Satu frame (tepat `PACKET_SIZE` bytes) dari stream
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    bytes: &'a [u8],
    order: ByteOrder,
}

impl<'a> Frame<'a> {
    /// Ambil frame dari awal buffer. Bytes setelah `PACKET_SIZE` diabaikan.
    pub fn new(bytes: &'a [u8], order: ByteOrder) -> Result<Self> {
        if bytes.len() < PACKET_SIZE {
            return Err(Error::Truncated {
                expected: PACKET_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: &bytes[..PACKET_SIZE],
            order,
        })
    }

    #[inline(always)]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline(always)]
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    #[inline(always)]
    pub fn tag(&self) -> u32 {
        // Frame selalu PACKET_SIZE bytes, fallback tidak pernah terpakai
        peek_tag(self.bytes, self.order).unwrap_or(0)
    }

    #[inline(always)]
    pub fn kind(&self) -> PacketKind {
        PacketKind::from_tag(self.tag())
    }

    #[inline(always)]
    pub fn is_aelm(&self) -> bool {
        self.kind() == PacketKind::Aelm
    }

    /// Decode ke `AelmPacket`; gagal dengan `NotAelmPacket` untuk frame asing
    pub fn decode(&self) -> Result<AelmPacket> {
        decode_checked(self.bytes, self.order)
    }
}
