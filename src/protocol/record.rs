//! Bentuk JSON dari `aelmPkt`
//!
//! Array fixed-size dipetakan ke `Vec` supaya serde bisa handle 488
//! elemen; panjangnya dicek balik saat konversi ke `AelmPacket`.
//! NaN/Inf tidak bisa direpresentasikan di JSON (jadi `null`), pakai
//! codec binary untuk jalur bit-exact.

use serde::{Deserialize, Serialize};

use super::packet::{AelmPacket, AVAILABLE_WORDS, RF_CHANNELS, SATURATED_WORDS};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    #[serde(rename = "sequenceNo")]
    pub sequence_no: u32,
    #[serde(rename = "sampleTime")]
    pub sample_time: u32,
    pub available: Vec<u32>,
    pub saturated: Vec<u32>,
    #[serde(rename = "RFdevHz")]
    pub rf_dev_hz: Vec<f32>,
    #[serde(rename = "AEfreq")]
    pub ae_freq: f32,
    #[serde(rename = "DampingRaw")]
    pub damping_raw: f32,
    #[serde(rename = "DampingNorm")]
    pub damping_norm: f32,
    #[serde(rename = "TimeDamping")]
    pub time_damping: f32,
    #[serde(rename = "RFdevHz_sta")]
    pub rf_dev_hz_sta: u32,
    #[serde(rename = "AEfreq_sta")]
    pub ae_freq_sta: u32,
    #[serde(rename = "DampingRaw_sta")]
    pub damping_raw_sta: u32,
    #[serde(rename = "DampingNorm_sta")]
    pub damping_norm_sta: u32,
    #[serde(rename = "TimeDamping_sta")]
    pub time_damping_sta: u32,
    #[serde(rename = "aelmPkt_488000002")]
    pub id_tag: u32,
}

impl From<&AelmPacket> for PacketRecord {
    fn from(p: &AelmPacket) -> Self {
        Self {
            sequence_no: p.sequence_no,
            sample_time: p.sample_time,
            available: p.available.to_vec(),
            saturated: p.saturated.to_vec(),
            rf_dev_hz: p.rf_dev_hz.to_vec(),
            ae_freq: p.ae_freq,
            damping_raw: p.damping_raw,
            damping_norm: p.damping_norm,
            time_damping: p.time_damping,
            rf_dev_hz_sta: p.rf_dev_hz_sta,
            ae_freq_sta: p.ae_freq_sta,
            damping_raw_sta: p.damping_raw_sta,
            damping_norm_sta: p.damping_norm_sta,
            time_damping_sta: p.time_damping_sta,
            id_tag: p.id_tag,
        }
    }
}

fn fixed<T: Copy, const N: usize>(field: &'static str, v: &[T]) -> Result<[T; N], Error> {
    v.try_into().map_err(|_| Error::LengthMismatch {
        field,
        expected: N,
        actual: v.len(),
    })
}

impl TryFrom<PacketRecord> for AelmPacket {
    type Error = Error;

    fn try_from(r: PacketRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            sequence_no: r.sequence_no,
            sample_time: r.sample_time,
            available: fixed::<u32, AVAILABLE_WORDS>("available", &r.available)?,
            saturated: fixed::<u32, SATURATED_WORDS>("saturated", &r.saturated)?,
            rf_dev_hz: fixed::<f32, RF_CHANNELS>("RFdevHz", &r.rf_dev_hz)?,
            ae_freq: r.ae_freq,
            damping_raw: r.damping_raw,
            damping_norm: r.damping_norm,
            time_damping: r.time_damping,
            rf_dev_hz_sta: r.rf_dev_hz_sta,
            ae_freq_sta: r.ae_freq_sta,
            damping_raw_sta: r.damping_raw_sta,
            damping_norm_sta: r.damping_norm_sta,
            time_damping_sta: r.time_damping_sta,
            id_tag: r.id_tag,
        })
    }
}
