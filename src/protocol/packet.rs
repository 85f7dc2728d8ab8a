//! AELM RTDN Packet (`aelmPkt`, schema version 2)
//!
//! Layout (2032 bytes, fixed, tanpa padding):
//! ┌─────────────────────────────────────────────────────┐
//! │ sequenceNo, sampleTime            (2 × u32)         │
//! │ available[3], saturated[5]        (8 × u32)         │
//! │ RFdevHz[488]                      (488 × f32)       │
//! │ AEfreq, DampingRaw, DampingNorm,  (4 × f32)         │
//! │ TimeDamping                                         │
//! │ *_sta status codes                (5 × u32)         │
//! │ aelmPkt_488000002 (identity tag)  (1 × u32)         │
//! └─────────────────────────────────────────────────────┘
//!
//! Tag identitas ada di akhir record, jadi consumer di channel yang
//! campur bisa cek tipe paket dengan satu perbandingan integer sebelum
//! menafsirkan sisa bytes.

use std::mem;

use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

/// Packet-value-class code
pub const RTDN_PVC: u32 = 488;
/// Numeric packet type ID (opaque, bukan hasil hitungan dari PVC/version)
pub const RTDN_ID: u32 = 488_000_002;
/// Schema version
pub const RTDN_VERSION: u32 = 2;
/// aelmPkt metadata version
pub const METADATA_VERSION: u32 = 2;

pub const RF_CHANNELS: usize = 488;
pub const AVAILABLE_WORDS: usize = 3;
pub const SATURATED_WORDS: usize = 5;

/// Ukuran record di wire
pub const PACKET_SIZE: usize = 2032;
/// Offset tag identitas (4 bytes terakhir)
pub const ID_OFFSET: usize = PACKET_SIZE - 4;

/// Satu sample telemetry AELM.
///
/// `#[repr(C)]` dan semua field 4-byte word, jadi layout native identik
/// dengan wire layout (modulo byte order).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct AelmPacket {
    /// `sequenceNo`
    pub sequence_no: u32,
    /// `sampleTime`
    pub sample_time: u32,
    /// `available`: bitfield region yang terisi
    pub available: [u32; AVAILABLE_WORDS],
    /// `saturated`: bitfield channel yang saturasi
    pub saturated: [u32; SATURATED_WORDS],
    /// `RFdevHz`: deviasi RF per channel (Hz)
    pub rf_dev_hz: [f32; RF_CHANNELS],
    /// `AEfreq`
    pub ae_freq: f32,
    /// `DampingRaw`
    pub damping_raw: f32,
    /// `DampingNorm`
    pub damping_norm: f32,
    /// `TimeDamping`
    pub time_damping: f32,
    /// `RFdevHz_sta`
    pub rf_dev_hz_sta: u32,
    /// `AEfreq_sta`
    pub ae_freq_sta: u32,
    /// `DampingRaw_sta`
    pub damping_raw_sta: u32,
    /// `DampingNorm_sta`
    pub damping_norm_sta: u32,
    /// `TimeDamping_sta`
    pub time_damping_sta: u32,
    /// `aelmPkt_488000002`: sama dengan `RTDN_ID` kalau paket valid
    pub id_tag: u32,
}

const _: () = assert!(mem::size_of::<AelmPacket>() == PACKET_SIZE);
const _: () = assert!(mem::offset_of!(AelmPacket, id_tag) == ID_OFFSET);

impl Default for AelmPacket {
    fn default() -> Self {
        Self::new()
    }
}

impl AelmPacket {
    /// Record kosong (semua bytes nol). Tag = 0, jadi belum valid.
    #[inline(always)]
    pub fn new() -> Self {
        Self::new_zeroed()
    }

    /// Record kosong dengan tag identitas sudah di-set
    #[inline(always)]
    pub fn with_id() -> Self {
        let mut packet = Self::new();
        packet.set_id();
        packet
    }

    /// Nilai tag apa adanya (tidak pernah gagal)
    #[inline(always)]
    pub fn get_id(&self) -> u32 {
        self.id_tag
    }

    /// Tulis `RTDN_ID` ke tag, menimpa nilai sebelumnya
    #[inline(always)]
    pub fn set_id(&mut self) {
        self.id_tag = RTDN_ID;
    }

    /// True hanya jika tag == `RTDN_ID`.
    ///
    /// Cek tipe saja: tidak ada checksum atau validasi field lain.
    #[inline(always)]
    pub fn is_packet(&self) -> bool {
        self.id_tag == RTDN_ID
    }

    /// Bit `index` dari bitfield `available` (96 bits)
    pub fn available_bit(&self, index: usize) -> Option<bool> {
        flag_bit(&self.available, index)
    }

    /// Bit `index` dari bitfield `saturated` (160 bits)
    pub fn saturated_bit(&self, index: usize) -> Option<bool> {
        flag_bit(&self.saturated, index)
    }

    /// Returns false kalau `index` di luar bitfield
    pub fn set_available_bit(&mut self, index: usize, on: bool) -> bool {
        set_flag_bit(&mut self.available, index, on)
    }

    /// Returns false kalau `index` di luar bitfield
    pub fn set_saturated_bit(&mut self, index: usize, on: bool) -> bool {
        set_flag_bit(&mut self.saturated, index, on)
    }
}

#[inline(always)]
fn flag_bit(words: &[u32], index: usize) -> Option<bool> {
    words.get(index / 32).map(|w| (w >> (index % 32)) & 1 != 0)
}

#[inline(always)]
fn set_flag_bit(words: &mut [u32], index: usize, on: bool) -> bool {
    match words.get_mut(index / 32) {
        Some(w) => {
            let mask = 1u32 << (index % 32);
            if on {
                *w |= mask;
            } else {
                *w &= !mask;
            }
            true
        }
        None => false,
    }
}
