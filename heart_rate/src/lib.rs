//! # Heart rate
//!
//! Decoding of the Bluetooth GATT Heart Rate Measurement characteristic (`0x2A37`)
//! and the session average shown in a workout summary.
//!
//! Flags byte layout:
//!
//! - bit 0 - heart rate value is `u16` instead of `u8`
//! - bit 1 - sensor contact detected
//! - bit 2 - sensor contact status is supported
//! - bit 3 - energy expended (`u16`, kJ) is present
//! - bit 4 - one or more RR intervals (`u16`, 1/1024 s) are present
//!
//! All multi-byte fields are little endian.

const FLAG_HR_U16: u8 = 0x01;
const FLAG_CONTACT_DETECTED: u8 = 0x02;
const FLAG_CONTACT_SUPPORTED: u8 = 0x04;
const FLAG_ENERGY_EXPENDED: u8 = 0x08;
const FLAG_RR_INTERVAL: u8 = 0x10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeasurementError {
    #[error("Empty heart rate measurement")]
    Empty,

    #[error("Truncated heart rate measurement: needed {needed} bytes, got {len}")]
    Truncated { needed: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeartRateMeasurement {
    /// Beats per minute
    pub bpm: u16,
    /// `None` if the sensor doesn't report contact status
    pub sensor_contact: Option<bool>,
    pub energy_expended_kj: Option<u16>,
    /// RR intervals in 1/1024 of a second
    pub rr_intervals: Vec<u16>,
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16, MeasurementError> {
    match data.get(offset..offset + 2) {
        Some(&[low, high]) => Ok(u16::from_le_bytes([low, high])),
        _ => {
            tracing::trace!(len = data.len(), offset, "heart rate packet is too short");

            Err(MeasurementError::Truncated {
                needed: offset + 2,
                len: data.len(),
            })
        }
    }
}

/// Decode a Heart Rate Measurement notification.
///
/// A trailing odd byte in the RR interval list is ignored.
pub fn parse_measurement(data: &[u8]) -> Result<HeartRateMeasurement, MeasurementError> {
    let Some(&flags) = data.first() else {
        return Err(MeasurementError::Empty);
    };

    let mut offset = 1;

    let bpm = if flags & FLAG_HR_U16 != 0 {
        let bpm = read_u16(data, offset)?;
        offset += 2;
        bpm
    } else {
        let bpm = data.get(offset).copied().ok_or(MeasurementError::Truncated {
            needed: offset + 1,
            len: data.len(),
        })?;
        offset += 1;
        u16::from(bpm)
    };

    let sensor_contact = match flags & FLAG_CONTACT_SUPPORTED != 0 {
        true => Some(flags & FLAG_CONTACT_DETECTED != 0),
        false => None,
    };

    let energy_expended_kj = match flags & FLAG_ENERGY_EXPENDED != 0 {
        true => {
            let energy = read_u16(data, offset)?;
            offset += 2;
            Some(energy)
        }
        false => None,
    };

    let rr_intervals = match flags & FLAG_RR_INTERVAL != 0 {
        true => data
            .get(offset..)
            .unwrap_or_default()
            .chunks_exact(2)
            .map(|this| u16::from_le_bytes([this[0], this[1]]))
            .collect(),
        false => Vec::new(),
    };

    Ok(HeartRateMeasurement {
        bpm,
        sensor_contact,
        energy_expended_kj,
        rr_intervals,
    })
}

/// Average heart rate over a session rounded to the nearest beat.
///
/// Zero readings mean no monitor was paired at that moment and are skipped.
pub fn average_heart_rate(heart_rates: impl IntoIterator<Item = u16>) -> Option<u16> {
    let (sum, count) = heart_rates
        .into_iter()
        .filter(|this| *this > 0)
        .fold((0u64, 0u64), |(sum, count), this| {
            (sum + u64::from(this), count + 1)
        });

    if count == 0 {
        return None;
    }

    Some((sum as f64 / count as f64).round() as u16)
}
