//! Encoder/Decoder dengan byte order eksplisit
//!
//! Semua field `aelmPkt` adalah 4-byte word, jadi konversi byte order
//! cukup swap per word di atas layout native. Tidak lewat aritmetika
//! float: NaN payload dan Inf lolos bit-for-bit.
//!
//! Encoder menulis ke pre-allocated buffer, tidak ada alokasi setelah
//! inisialisasi.

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use zerocopy::IntoBytes;

use super::frame::Frame;
use super::packet::{AelmPacket, PACKET_SIZE};
use crate::error::{Error, Result};

/// Byte order di wire. Default little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order platform ini
    #[inline(always)]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    #[inline(always)]
    pub fn is_native(self) -> bool {
        self == Self::native()
    }

    #[inline(always)]
    pub fn read_u32(self, word: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(word),
            Self::Big => u32::from_be_bytes(word),
        }
    }

    /// Kode numerik untuk header archive (0 = little, 1 = big)
    pub const fn code(self) -> u32 {
        match self {
            Self::Little => 0,
            Self::Big => 1,
        }
    }

    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Little),
            1 => Some(Self::Big),
            _ => None,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Little => f.write_str("le"),
            Self::Big => f.write_str("be"),
        }
    }
}

impl FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "le" | "little" => Ok(Self::Little),
            "be" | "big" => Ok(Self::Big),
            other => Err(format!("unknown byte order '{}' (expected le or be)", other)),
        }
    }
}

#[inline(always)]
fn swap_words(buf: &mut [u8]) {
    for word in buf.chunks_exact_mut(4) {
        word.reverse();
    }
}

/// Encode ke `out[..PACKET_SIZE]`
#[inline(always)]
pub fn encode_into(packet: &AelmPacket, order: ByteOrder, out: &mut [u8]) -> Result<()> {
    if out.len() < PACKET_SIZE {
        return Err(Error::Truncated {
            expected: PACKET_SIZE,
            actual: out.len(),
        });
    }
    let dst = &mut out[..PACKET_SIZE];
    dst.copy_from_slice(packet.as_bytes());
    if !order.is_native() {
        swap_words(dst);
    }
    Ok(())
}

/// Encode ke array baru
pub fn to_bytes(packet: &AelmPacket, order: ByteOrder) -> [u8; PACKET_SIZE] {
    let mut out = [0u8; PACKET_SIZE];
    out.copy_from_slice(packet.as_bytes());
    if !order.is_native() {
        swap_words(&mut out);
    }
    out
}

/// Decode satu paket dari awal buffer. Tag tidak dicek.
#[inline(always)]
pub fn decode(bytes: &[u8], order: ByteOrder) -> Result<AelmPacket> {
    if bytes.len() < PACKET_SIZE {
        return Err(Error::Truncated {
            expected: PACKET_SIZE,
            actual: bytes.len(),
        });
    }
    let mut packet = AelmPacket::new();
    let dst = packet.as_mut_bytes();
    dst.copy_from_slice(&bytes[..PACKET_SIZE]);
    if !order.is_native() {
        swap_words(dst);
    }
    Ok(packet)
}

/// Seperti `decode`, tapi gagal kalau tag bukan `RTDN_ID`
pub fn decode_checked(bytes: &[u8], order: ByteOrder) -> Result<AelmPacket> {
    let packet = decode(bytes, order)?;
    if !packet.is_packet() {
        return Err(Error::NotAelmPacket {
            found: packet.get_id(),
        });
    }
    Ok(packet)
}

/// Pre-allocated encoder buffer
///
/// Paket ditulis back-to-back, tanpa framing tambahan: ukuran tetap
/// sudah cukup untuk memisahkan frame.
pub struct Encoder {
    buffer: Box<[u8]>,
    write_pos: usize,
    order: ByteOrder,
}

impl Encoder {
    /// Membuat encoder dengan buffer size tertentu (bytes)
    pub fn new(capacity: usize, order: ByteOrder) -> Self {
        Self {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            write_pos: 0,
            order,
        }
    }

    /// Encoder yang muat tepat `packets` paket
    pub fn with_packet_capacity(packets: usize, order: ByteOrder) -> Self {
        Self::new(packets * PACKET_SIZE, order)
    }

    /// Reset encoder untuk reuse
    #[inline(always)]
    pub fn reset(&mut self) {
        self.write_pos = 0;
    }

    #[inline(always)]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Encode satu paket.
    ///
    /// Returns slice ke encoded data, atau None jika buffer penuh.
    #[inline(always)]
    pub fn encode(&mut self, packet: &AelmPacket) -> Option<&[u8]> {
        if self.available() < PACKET_SIZE {
            return None;
        }

        let start = self.write_pos;
        let end = start + PACKET_SIZE;
        encode_into(packet, self.order, &mut self.buffer[start..end]).ok()?;
        self.write_pos = end;

        Some(&self.buffer[start..end])
    }

    /// Encode batch: semua masuk atau tidak sama sekali
    pub fn encode_batch(&mut self, packets: &[AelmPacket]) -> Option<&[u8]> {
        if packets.is_empty() || self.available() < packets.len() * PACKET_SIZE {
            return None;
        }

        let start = self.write_pos;
        for packet in packets {
            let end = self.write_pos + PACKET_SIZE;
            encode_into(packet, self.order, &mut self.buffer[self.write_pos..end]).ok()?;
            self.write_pos = end;
        }

        Some(&self.buffer[start..self.write_pos])
    }

    /// Get current buffer content
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.write_pos]
    }

    /// Available space in buffer
    #[inline(always)]
    pub fn available(&self) -> usize {
        self.buffer.len() - self.write_pos
    }

    /// Jumlah paket yang sudah di-encode
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.write_pos / PACKET_SIZE
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.write_pos == 0
    }
}

/// Zero-copy decoder untuk stream frame back-to-back
pub struct Decoder<'a> {
    buffer: &'a [u8],
    read_pos: usize,
    order: ByteOrder,
    tail_reported: bool,
}

impl<'a> Decoder<'a> {
    #[inline(always)]
    pub fn new(buffer: &'a [u8], order: ByteOrder) -> Self {
        Self {
            buffer,
            read_pos: 0,
            order,
            tail_reported: false,
        }
    }

    /// Frame berikutnya (zero-copy). Frame parsial di ekor menghentikan iterasi.
    #[inline(always)]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Frame<'a>> {
        let buffer: &'a [u8] = self.buffer;
        let rest = &buffer[self.read_pos..];
        if rest.len() < PACKET_SIZE {
            // Warning sekali saja per stream
            if !rest.is_empty() && !self.tail_reported {
                warn!("trailing partial frame: {} bytes", rest.len());
                self.tail_reported = true;
            }
            return None;
        }

        let frame = Frame::new(rest, self.order).ok()?;
        self.read_pos += PACKET_SIZE;
        Some(frame)
    }

    /// Iterator paket AELM saja; frame asing di-skip
    pub fn packets(self) -> Packets<'a> {
        Packets { decoder: self }
    }

    /// Remaining bytes (termasuk frame parsial)
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.read_pos)
    }
}

/// Iterator paket AELM dari `Decoder`
pub struct Packets<'a> {
    decoder: Decoder<'a>,
}

impl<'a> Iterator for Packets<'a> {
    type Item = AelmPacket;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.decoder.next() {
            match frame.decode() {
                Ok(packet) => return Some(packet),
                Err(e) => debug!("skipping frame: {}", e),
            }
        }
        None
    }
}
