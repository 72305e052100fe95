use crate::libs::error::error::AnchorError;

const FULL_SCALE: f64 = 32767.0;

/// Converts one period of I and Q samples into the interleaved little-endian
/// 16-bit byte buffer the transmit core consumes. Each channel is normalized
/// to full scale independently, rounded half away from zero, zero-padded on
/// the right to `target_length` pairs, then interleaved I-first. The DAC takes
/// 12-bit values carried in these 16-bit slots.
pub fn encode(i_samples: &[f64], q_samples: &[f64], target_length: usize)
    -> Result<Vec<u8>, AnchorError> {
    if i_samples.len() != q_samples.len() {
        return Err(AnchorError::InvalidInput(format!(
            "I length {} != Q length {}", i_samples.len(), q_samples.len())));
    }
    if i_samples.len() > target_length {
        return Err(AnchorError::InvalidInput(format!(
            "An input of {} sample pairs does not fit a {} pair buffer",
            i_samples.len(), target_length)));
    }
    let i_scaled = scale_to_full_range(i_samples)?;
    let q_scaled = scale_to_full_range(q_samples)?;

    let mut bytes = Vec::with_capacity(target_length * 2 * std::mem::size_of::<i16>());
    for n in 0..target_length {
        let i = i_scaled.get(n).copied().unwrap_or(0);
        let q = q_scaled.get(n).copied().unwrap_or(0);
        bytes.extend_from_slice(&i.to_le_bytes());
        bytes.extend_from_slice(&q.to_le_bytes());
    }
    Ok(bytes)
}

fn scale_to_full_range(samples: &[f64]) -> Result<Vec<i16>, AnchorError> {
    if samples.is_empty() {
        return Err(AnchorError::InvalidInput("Cannot encode an empty channel".to_string()));
    }
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == 0.0 {
        return Err(AnchorError::InvalidInput(
            "Channel maximum is zero; cannot scale a degenerate sequence".to_string()));
    }
    Ok(samples.iter().map(|s| (s / max * FULL_SCALE).round() as i16).collect())
}

#[cfg(test)]
#[path = "./sample_encoder_spec.rs"]
mod sample_encoder_spec;
