//! Field layout table untuk `aelmPkt`
//!
//! Deskripsi statis setiap field (nama wire, tipe elemen, jumlah elemen,
//! offset). Dipakai tool untuk dump/inspeksi dan untuk mengecek bahwa
//! struct Rust cocok dengan layout header C yang di-generate.

use serde::Serialize;

use super::packet::{
    AVAILABLE_WORDS, METADATA_VERSION, PACKET_SIZE, RF_CHANNELS, RTDN_ID, RTDN_PVC, RTDN_VERSION,
    SATURATED_WORDS,
};

/// Tipe elemen field. Semuanya 4 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Uint32,
    Float32,
}

impl FieldKind {
    pub const fn element_size(self) -> usize {
        4
    }

    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDesc {
    pub name: &'static str,
    pub kind: FieldKind,
    pub elements: usize,
    pub offset: usize,
}

impl FieldDesc {
    pub const fn size(&self) -> usize {
        self.elements * self.kind.element_size()
    }

    pub const fn end(&self) -> usize {
        self.offset + self.size()
    }
}

/// Metadata manifest paket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PacketMeta {
    pub name: &'static str,
    pub pvc: u32,
    pub id: u32,
    pub version: u32,
    pub metadata_version: u32,
    pub size: usize,
}

pub const META: PacketMeta = PacketMeta {
    name: "aelmPkt",
    pvc: RTDN_PVC,
    id: RTDN_ID,
    version: RTDN_VERSION,
    metadata_version: METADATA_VERSION,
    size: PACKET_SIZE,
};

const fn build(names: [(&'static str, FieldKind, usize); 15]) -> [FieldDesc; 15] {
    let mut out = [FieldDesc {
        name: "",
        kind: FieldKind::Uint32,
        elements: 0,
        offset: 0,
    }; 15];
    let mut offset = 0;
    let mut i = 0;
    while i < names.len() {
        let (name, kind, elements) = names[i];
        out[i] = FieldDesc {
            name,
            kind,
            elements,
            offset,
        };
        offset += elements * kind.element_size();
        i += 1;
    }
    out
}

/// Semua field dalam urutan wire
pub const FIELDS: [FieldDesc; 15] = build([
    ("sequenceNo", FieldKind::Uint32, 1),
    ("sampleTime", FieldKind::Uint32, 1),
    ("available", FieldKind::Uint32, AVAILABLE_WORDS),
    ("saturated", FieldKind::Uint32, SATURATED_WORDS),
    ("RFdevHz", FieldKind::Float32, RF_CHANNELS),
    ("AEfreq", FieldKind::Float32, 1),
    ("DampingRaw", FieldKind::Float32, 1),
    ("DampingNorm", FieldKind::Float32, 1),
    ("TimeDamping", FieldKind::Float32, 1),
    ("RFdevHz_sta", FieldKind::Uint32, 1),
    ("AEfreq_sta", FieldKind::Uint32, 1),
    ("DampingRaw_sta", FieldKind::Uint32, 1),
    ("DampingNorm_sta", FieldKind::Uint32, 1),
    ("TimeDamping_sta", FieldKind::Uint32, 1),
    ("aelmPkt_488000002", FieldKind::Uint32, 1),
]);

const _: () = assert!(FIELDS[FIELDS.len() - 1].end() == PACKET_SIZE);

/// Cari field berdasarkan nama wire (case-sensitive)
pub fn field(name: &str) -> Option<&'static FieldDesc> {
    FIELDS.iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packet::{AelmPacket, ID_OFFSET};
    use std::mem::offset_of;

    #[test]
    fn test_word_counts_match_header() {
        let words = |kind: FieldKind| -> usize {
            FIELDS
                .iter()
                .filter(|f| f.kind == kind)
                .map(|f| f.elements)
                .sum()
        };
        // sequenceNo, sampleTime, available[3], saturated[5], 5x _sta, tag
        assert_eq!(words(FieldKind::Uint32), 16);
        // RFdevHz[488] + 4 skalar
        assert_eq!(words(FieldKind::Float32), 492);
        assert_eq!(16 * 4 + 492 * 4, PACKET_SIZE);
        assert_eq!(PACKET_SIZE, 2032);
        assert_eq!(ID_OFFSET, 2028);
    }

    #[test]
    fn test_offsets_match_struct() {
        let expected = [
            offset_of!(AelmPacket, sequence_no),
            offset_of!(AelmPacket, sample_time),
            offset_of!(AelmPacket, available),
            offset_of!(AelmPacket, saturated),
            offset_of!(AelmPacket, rf_dev_hz),
            offset_of!(AelmPacket, ae_freq),
            offset_of!(AelmPacket, damping_raw),
            offset_of!(AelmPacket, damping_norm),
            offset_of!(AelmPacket, time_damping),
            offset_of!(AelmPacket, rf_dev_hz_sta),
            offset_of!(AelmPacket, ae_freq_sta),
            offset_of!(AelmPacket, damping_raw_sta),
            offset_of!(AelmPacket, damping_norm_sta),
            offset_of!(AelmPacket, time_damping_sta),
            offset_of!(AelmPacket, id_tag),
        ];
        for (desc, offset) in FIELDS.iter().zip(expected) {
            assert_eq!(desc.offset, offset, "offset of {}", desc.name);
        }
    }

    #[test]
    fn test_fields_are_contiguous() {
        assert_eq!(FIELDS[0].offset, 0);
        for pair in FIELDS.windows(2) {
            assert_eq!(pair[0].end(), pair[1].offset);
        }
        assert_eq!(FIELDS.iter().map(FieldDesc::size).sum::<usize>(), 2032);
    }

    #[test]
    fn test_field_lookup() {
        let tag = field("aelmPkt_488000002").unwrap();
        assert_eq!(tag.offset, ID_OFFSET);
        assert_eq!(tag.offset, 2028);

        let rf = field("RFdevHz").unwrap();
        assert_eq!(rf.kind, FieldKind::Float32);
        assert_eq!(rf.elements, 488);
        assert_eq!(rf.offset, 40);

        assert!(field("rfdevhz").is_none());
    }

    #[test]
    fn test_meta() {
        assert_eq!(META.pvc, 488);
        assert_eq!(META.id, 488000002);
        assert_eq!(META.version, 2);
        assert_eq!(META.metadata_version, 2);
        assert_eq!(META.size, 2032);
    }
}
