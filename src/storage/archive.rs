//! Memory-Mapped Packet Archive
//!
//! File = header 64 bytes + `capacity` slot berukuran `PACKET_SIZE`.
//! Setiap slot berisi satu paket yang sudah di-encode dengan byte order
//! archive, jadi `frame()` bisa mengembalikan slice langsung dari page
//! cache tanpa copy.
//!
//! ┌──────────────────────────────────────────┐
//! │ ArchiveHeader (64 bytes, native-endian)  │
//! ├──────────────────────────────────────────┤
//! │ slot 0 (2032 bytes)                      │
//! │ slot 1 ...                               │
//! └──────────────────────────────────────────┘

use std::fs::OpenOptions;
use std::path::Path;

use log::info;
use memmap2::{MmapMut, MmapOptions};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::{Error, Result};
use crate::protocol::{decode, encode_into, AelmPacket, ByteOrder, PACKET_SIZE, RTDN_ID};

/// Header di awal file archive
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
struct ArchiveHeader {
    magic: u64,
    format_version: u32,
    packet_id: u32,
    packet_size: u32,
    byte_order: u32,
    capacity: u64,
    count: u64,
    _reserved: [u8; 24],
}

const MAGIC: u64 = u64::from_le_bytes(*b"AELMARC1");
const FORMAT_VERSION: u32 = 1;
pub const ARCHIVE_HEADER_SIZE: usize = std::mem::size_of::<ArchiveHeader>();

const _: () = assert!(ARCHIVE_HEADER_SIZE == 64);

fn file_size(capacity: u64) -> Result<usize> {
    capacity
        .checked_mul(PACKET_SIZE as u64)
        .and_then(|slots| slots.checked_add(ARCHIVE_HEADER_SIZE as u64))
        .and_then(|total| usize::try_from(total).ok())
        .ok_or_else(|| Error::BadArchive(format!("capacity {} too large", capacity)))
}

/// Mmap-backed archive untuk paket AELM
#[derive(Debug)]
pub struct PacketArchive {
    mmap: MmapMut,
    header: ArchiveHeader,
    order: ByteOrder,
}

impl PacketArchive {
    /// Membuat archive baru (file lama di-truncate)
    ///
    /// # Arguments
    /// * `path` - Path ke file archive
    /// * `capacity` - Jumlah slot paket (harus > 0)
    /// * `order` - Byte order paket di dalam slot
    pub fn create<P: AsRef<Path>>(path: P, capacity: u64, order: ByteOrder) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity);
        }
        let total_size = file_size(capacity)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.as_ref())?;
        file.set_len(total_size as u64)?;

        // SAFETY: File dibuka read/write dan panjangnya sudah di-set
        let mmap = unsafe { MmapOptions::new().len(total_size).map_mut(&file)? };

        let header = ArchiveHeader {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            packet_id: RTDN_ID,
            packet_size: PACKET_SIZE as u32,
            byte_order: order.code(),
            capacity,
            count: 0,
            _reserved: [0; 24],
        };

        let mut archive = Self {
            mmap,
            header,
            order,
        };
        archive.sync_header();

        info!(
            "created archive {} ({} slots, {})",
            path.as_ref().display(),
            capacity,
            order
        );
        Ok(archive)
    }

    /// Membuka archive yang sudah ada dan memvalidasi header-nya
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path.as_ref())?;
        let file_len = file.metadata()?.len();
        if file_len < ARCHIVE_HEADER_SIZE as u64 {
            return Err(Error::BadArchive(format!(
                "file too small ({} bytes)",
                file_len
            )));
        }

        // SAFETY: File dibuka read/write; panjang divalidasi di bawah
        let mmap = unsafe { MmapOptions::new().map_mut(&file)? };

        let (header, _) = ArchiveHeader::read_from_prefix(&mmap[..])
            .map_err(|_| Error::BadArchive("unreadable header".into()))?;

        if header.magic != MAGIC {
            return Err(Error::BadArchive("bad magic".into()));
        }
        if header.format_version != FORMAT_VERSION {
            return Err(Error::BadArchive(format!(
                "unsupported format version {}",
                header.format_version
            )));
        }
        if header.packet_id != RTDN_ID || header.packet_size as usize != PACKET_SIZE {
            return Err(Error::BadArchive(format!(
                "archive holds packet {} of {} bytes",
                header.packet_id, header.packet_size
            )));
        }
        let order = ByteOrder::from_code(header.byte_order).ok_or_else(|| {
            Error::BadArchive(format!("unknown byte order code {}", header.byte_order))
        })?;
        if header.capacity == 0 || header.count > header.capacity {
            return Err(Error::BadArchive(format!(
                "count {} / capacity {}",
                header.count, header.capacity
            )));
        }
        if (mmap.len() as u64) < file_size(header.capacity)? as u64 {
            return Err(Error::BadArchive("file shorter than capacity".into()));
        }

        info!(
            "opened archive {} ({}/{} slots, {})",
            path.as_ref().display(),
            header.count,
            header.capacity,
            order
        );
        Ok(Self {
            mmap,
            header,
            order,
        })
    }

    #[inline(always)]
    fn slot_offset(index: u64) -> usize {
        ARCHIVE_HEADER_SIZE + index as usize * PACKET_SIZE
    }

    fn sync_header(&mut self) {
        self.mmap[..ARCHIVE_HEADER_SIZE].copy_from_slice(self.header.as_bytes());
    }

    /// Tambah paket ke slot berikutnya.
    ///
    /// Returns index slot. Paket disimpan apa adanya, termasuk yang tag-nya
    /// bukan `RTDN_ID`.
    pub fn append(&mut self, packet: &AelmPacket) -> Result<u64> {
        let index = self.header.count;
        if index >= self.header.capacity {
            return Err(Error::ArchiveFull {
                capacity: self.header.capacity,
            });
        }

        let start = Self::slot_offset(index);
        encode_into(packet, self.order, &mut self.mmap[start..start + PACKET_SIZE])?;

        // Count di-update setelah slot lengkap
        self.header.count = index + 1;
        self.sync_header();

        Ok(index)
    }

    /// Raw bytes slot `index` (zero-copy)
    #[inline(always)]
    pub fn frame(&self, index: u64) -> Option<&[u8]> {
        if index >= self.header.count {
            return None;
        }
        let start = Self::slot_offset(index);
        Some(&self.mmap[start..start + PACKET_SIZE])
    }

    pub fn get(&self, index: u64) -> Result<AelmPacket> {
        let bytes = self.frame(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.header.count,
        })?;
        decode(bytes, self.order)
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<AelmPacket>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    #[inline(always)]
    pub fn len(&self) -> u64 {
        self.header.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.header.count == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> u64 {
        self.header.capacity
    }

    #[inline(always)]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Flush mapping ke disk
    pub fn flush(&self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("aelm_{}_{}.arc", name, std::process::id()))
    }

    fn sample(seq: u32) -> AelmPacket {
        let mut packet = AelmPacket::with_id();
        packet.sequence_no = seq;
        packet.rf_dev_hz[seq as usize % 488] = seq as f32 * 0.5;
        packet
    }

    #[test]
    fn test_archive_basic() {
        let path = temp_path("basic");

        {
            let mut archive = PacketArchive::create(&path, 4, ByteOrder::Little).unwrap();
            assert!(archive.is_empty());

            assert_eq!(archive.append(&sample(1)).unwrap(), 0);
            assert_eq!(archive.append(&sample(2)).unwrap(), 1);
            assert_eq!(archive.len(), 2);

            let packet = archive.get(1).unwrap();
            assert_eq!(packet.sequence_no, 2);
            assert!(packet.is_packet());
            assert!(archive.frame(2).is_none());
        }

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_archive_persistence() {
        let path = temp_path("persistence");

        // Write data
        {
            let mut archive = PacketArchive::create(&path, 8, ByteOrder::Big).unwrap();
            for seq in 10..13 {
                archive.append(&sample(seq)).unwrap();
            }
            archive.flush().unwrap();
        }

        // Reopen and verify
        {
            let archive = PacketArchive::open(&path).unwrap();
            assert_eq!(archive.len(), 3);
            assert_eq!(archive.capacity(), 8);
            assert_eq!(archive.byte_order(), ByteOrder::Big);

            let seqs: Vec<u32> = archive.iter().map(|p| p.unwrap().sequence_no).collect();
            assert_eq!(seqs, vec![10, 11, 12]);
            assert_eq!(archive.get(0).unwrap(), sample(10));

            // Slot disimpan big-endian
            let frame = archive.frame(0).unwrap();
            assert_eq!(frame[..4], 10u32.to_be_bytes());
        }

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_archive_full() {
        let path = temp_path("full");

        {
            let mut archive = PacketArchive::create(&path, 1, ByteOrder::Little).unwrap();
            archive.append(&sample(1)).unwrap();
            let err = archive.append(&sample(2)).unwrap_err();
            assert!(matches!(err, Error::ArchiveFull { capacity: 1 }));
            assert!(matches!(
                archive.get(5),
                Err(Error::IndexOutOfRange { index: 5, len: 1 })
            ));
        }

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_archive_zero_capacity() {
        let path = temp_path("zero");
        assert!(matches!(
            PacketArchive::create(&path, 0, ByteOrder::Little),
            Err(Error::InvalidCapacity)
        ));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_archive_bad_magic() {
        let path = temp_path("badmagic");
        fs::write(&path, vec![0xABu8; 4096]).unwrap();

        assert!(matches!(
            PacketArchive::open(&path),
            Err(Error::BadArchive(_))
        ));

        fs::write(&path, b"short").unwrap();
        assert!(matches!(
            PacketArchive::open(&path),
            Err(Error::BadArchive(_))
        ));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_archive_keeps_foreign_tag() {
        let path = temp_path("foreign");

        {
            let mut archive = PacketArchive::create(&path, 2, ByteOrder::Little).unwrap();
            let mut packet = sample(1);
            packet.id_tag = 42;
            archive.append(&packet).unwrap();

            let back = archive.get(0).unwrap();
            assert!(!back.is_packet());
            assert_eq!(back.get_id(), 42);
        }

        fs::remove_file(&path).ok();
    }

    /// Buat archive 2 slot, lalu timpa `bytes` di `offset` header
    fn patched_archive(name: &str, offset: usize, bytes: &[u8]) -> PathBuf {
        let path = temp_path(name);
        {
            let mut archive = PacketArchive::create(&path, 2, ByteOrder::Little).unwrap();
            archive.append(&sample(1)).unwrap();
            archive.flush().unwrap();
        }
        let mut data = fs::read(&path).unwrap();
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
        fs::write(&path, data).unwrap();
        path
    }

    fn bad_archive_reason(path: &Path) -> String {
        match PacketArchive::open(path) {
            Err(Error::BadArchive(reason)) => reason,
            other => panic!("expected BadArchive, got {:?}", other.map(|a| a.len())),
        }
    }

    #[test]
    fn test_archive_rejects_other_packet_id() {
        let path = patched_archive("other_id", 12, &321_000_004u32.to_ne_bytes());
        assert!(bad_archive_reason(&path).contains("321000004"));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_archive_rejects_other_packet_size() {
        let path = patched_archive("other_size", 16, &2028u32.to_ne_bytes());
        assert!(bad_archive_reason(&path).contains("2028 bytes"));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_archive_rejects_unknown_byte_order() {
        let path = patched_archive("bad_order", 20, &7u32.to_ne_bytes());
        assert!(bad_archive_reason(&path).contains("byte order code 7"));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_archive_rejects_count_over_capacity() {
        let path = patched_archive("over_count", 32, &3u64.to_ne_bytes());
        assert!(bad_archive_reason(&path).contains("count 3 / capacity 2"));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_archive_rejects_truncated_file() {
        let path = patched_archive("truncated", 0, &MAGIC.to_ne_bytes());
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(file_size(2).unwrap() as u64 - 1).unwrap();
        drop(file);

        assert_eq!(bad_archive_reason(&path), "file shorter than capacity");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_archive_header_offsets() {
        assert_eq!(std::mem::offset_of!(ArchiveHeader, packet_id), 12);
        assert_eq!(std::mem::offset_of!(ArchiveHeader, packet_size), 16);
        assert_eq!(std::mem::offset_of!(ArchiveHeader, byte_order), 20);
        assert_eq!(std::mem::offset_of!(ArchiveHeader, count), 32);
    }
}
