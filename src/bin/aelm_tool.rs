//! AELM Packet Tool - generate, inspect and archive `aelmPkt` frames
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin aelm_tool -- generate --out stream.bin --count 100
//! cargo run --release --bin aelm_tool -- inspect stream.bin
//! cargo run --release --bin aelm_tool -- archive --input stream.bin --out packets.arc
//! cargo run --release --bin aelm_tool -- show packets.arc --index 0
//! cargo run --release --bin aelm_tool -- layout --json
//! ```
//!
//! # Options
//!
//! - `--order le|be` - Byte order of frames (default: le)
//! - `RUST_LOG=debug` - Log skipped frames and archive activity

use std::fs;
use std::path::{Path, PathBuf};

use aelm_rtdn::protocol::{
    AelmPacket, ByteOrder, Decoder, Encoder, PacketKind, PacketRecord, AVAILABLE_WORDS, FIELDS,
    META, RF_CHANNELS,
};
use aelm_rtdn::PacketArchive;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "aelm_tool", about = "Inspect and produce AELM RTDN packets")]
struct Opt {
    /// Byte order of packet frames (le or be)
    #[arg(short, long, global = true, default_value = "le")]
    order: ByteOrder,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print manifest constants and the field layout
    Layout {
        #[arg(long)]
        json: bool,
    },
    /// Write synthetic packets as a raw frame stream
    Generate {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 10)]
        count: u32,
        #[arg(long, default_value_t = 1)]
        start_seq: u32,
        /// Sample period in ms
        #[arg(long, default_value_t = 1)]
        period: u32,
    },
    /// Decode a raw frame stream
    Inspect {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Copy the AELM frames of a raw stream into a packet archive
    Archive {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Slot count (default: number of AELM frames in input)
        #[arg(long)]
        capacity: Option<u64>,
    },
    /// Print an archive summary or one archived packet
    Show {
        archive: PathBuf,
        #[arg(long)]
        index: Option<u64>,
    },
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let opt = Opt::parse();

    match opt.cmd {
        Command::Layout { json } => layout(json),
        Command::Generate {
            out,
            count,
            start_seq,
            period,
        } => generate(&out, count, start_seq, period, opt.order),
        Command::Inspect { file, json } => inspect(&file, json, opt.order),
        Command::Archive {
            input,
            out,
            capacity,
        } => archive(&input, &out, capacity, opt.order),
        Command::Show { archive, index } => show(&archive, index),
    }
}

fn layout(json: bool) -> anyhow::Result<()> {
    if json {
        let doc = serde_json::json!({ "meta": META, "fields": FIELDS });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!(
        "{} (PVC {}, ID {}, version {}, metadata {}) - {} bytes",
        META.name, META.pvc, META.id, META.version, META.metadata_version, META.size
    );
    println!("{:<20} {:<8} {:>6} {:>7}", "field", "type", "count", "offset");
    for f in FIELDS.iter() {
        println!(
            "{:<20} {:<8} {:>6} {:>7}",
            f.name,
            f.kind.type_name(),
            f.elements,
            f.offset
        );
    }
    Ok(())
}

/// Synthetic sample: deviasi RF sinusoidal per channel
fn synthetic_packet(seq: u32, period: u32) -> AelmPacket {
    let mut packet = AelmPacket::with_id();
    packet.sequence_no = seq;
    packet.sample_time = seq.wrapping_mul(period);
    packet.available = [u32::MAX; AVAILABLE_WORDS];
    for (i, v) in packet.rf_dev_hz.iter_mut().enumerate() {
        let phase = (seq as f32 + i as f32) * (std::f32::consts::TAU / RF_CHANNELS as f32);
        *v = 25.0 * phase.sin();
    }
    packet.ae_freq = 50.0 + 0.01 * (seq % 100) as f32;
    packet.damping_raw = 0.05;
    packet.damping_norm = 0.5;
    packet.time_damping = 0.02;
    packet
}

/// Encode `count` paket synthetic; sequence number wrap di u32::MAX
fn generate_stream(count: u32, start_seq: u32, period: u32, order: ByteOrder) -> Encoder {
    let mut encoder = Encoder::with_packet_capacity(count as usize, order);
    for i in 0..count {
        let seq = start_seq.wrapping_add(i);
        // Kapasitas pas untuk `count` paket, jadi encode tidak pernah None
        let _ = encoder.encode(&synthetic_packet(seq, period));
    }
    encoder
}

fn generate(
    out: &Path,
    count: u32,
    start_seq: u32,
    period: u32,
    order: ByteOrder,
) -> anyhow::Result<()> {
    let encoder = generate_stream(count, start_seq, period, order);
    if encoder.len() != count as usize {
        bail!("encoded {} of {} packets", encoder.len(), count);
    }

    fs::write(out, encoder.as_bytes())
        .with_context(|| format!("Failed to write {}", out.display()))?;
    info!("wrote {} packets ({}) to {}", encoder.len(), order, out.display());
    println!("✅ {} packets -> {}", encoder.len(), out.display());
    Ok(())
}

/// Satu baris hasil inspeksi stream
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Entry {
    Packet(PacketRecord),
    Foreign {
        index: usize,
        #[serde(rename = "foreignTag")]
        tag: u32,
    },
}

fn scan(data: &[u8], order: ByteOrder) -> anyhow::Result<Vec<Entry>> {
    let mut decoder = Decoder::new(data, order);
    let mut entries = Vec::new();
    let mut index = 0usize;

    while let Some(frame) = decoder.next() {
        let entry = match frame.kind() {
            PacketKind::Aelm => Entry::Packet(PacketRecord::from(&frame.decode()?)),
            PacketKind::Foreign(tag) => Entry::Foreign { index, tag },
        };
        entries.push(entry);
        index += 1;
    }
    Ok(entries)
}

fn inspect(file: &Path, json: bool, order: ByteOrder) -> anyhow::Result<()> {
    let data = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let entries = scan(&data, order)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (index, entry) in entries.iter().enumerate() {
        match entry {
            Entry::Packet(record) => {
                let saturated: u32 = record.saturated.iter().map(|w| w.count_ones()).sum();
                println!(
                    "#{:<6} seq={:<8} time={:<10} AEfreq={:<10.4} DampingNorm={:<8.4} saturated={}",
                    index,
                    record.sequence_no,
                    record.sample_time,
                    record.ae_freq,
                    record.damping_norm,
                    saturated
                );
            }
            Entry::Foreign { tag, .. } => {
                println!("#{:<6} foreign packet (tag {})", index, tag);
            }
        }
    }
    Ok(())
}

/// Archive frame AELM dari `data`. Kapasitas dicek sebelum file dibuat,
/// jadi kegagalan tidak meninggalkan archive setengah jadi.
fn archive_stream(
    data: &[u8],
    out: &Path,
    capacity: Option<u64>,
    order: ByteOrder,
) -> anyhow::Result<PacketArchive> {
    let packets: Vec<AelmPacket> = Decoder::new(data, order).packets().collect();

    let capacity = capacity.unwrap_or(packets.len() as u64);
    if capacity != 0 && capacity < packets.len() as u64 {
        bail!(
            "capacity {} too small for {} packets",
            capacity,
            packets.len()
        );
    }
    let mut archive = PacketArchive::create(out, capacity, order)
        .with_context(|| format!("Failed to create archive {}", out.display()))?;

    for packet in &packets {
        archive.append(packet)?;
    }
    archive.flush()?;
    Ok(archive)
}

fn archive(
    input: &Path,
    out: &Path,
    capacity: Option<u64>,
    order: ByteOrder,
) -> anyhow::Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let archive = archive_stream(&data, out, capacity, order)?;

    println!(
        "✅ archived {}/{} slots -> {}",
        archive.len(),
        archive.capacity(),
        out.display()
    );
    Ok(())
}

fn show(path: &Path, index: Option<u64>) -> anyhow::Result<()> {
    let archive = PacketArchive::open(path)
        .with_context(|| format!("Failed to open archive {}", path.display()))?;

    if let Some(index) = index {
        let packet = archive.get(index)?;
        println!("{}", serde_json::to_string_pretty(&PacketRecord::from(&packet))?);
        return Ok(());
    }

    println!("Archive:   {}", path.display());
    println!("Slots:     {}/{}", archive.len(), archive.capacity());
    println!("Order:     {}", archive.byte_order());
    if !archive.is_empty() {
        let first = archive.get(0)?;
        let last = archive.get(archive.len() - 1)?;
        println!("Sequence:  {}..={}", first.sequence_no, last.sequence_no);
        println!("Time:      {}..={}", first.sample_time, last.sample_time);
    }
    Ok(())
}
