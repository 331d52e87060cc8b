//! Microphone sample conversion and the outbound volume gate.
//!
//! Capture hands us normalized f32 samples; the wire carries 16-bit little
//! endian signed mono PCM at 16 kHz. Frames quieter than the volume
//! threshold are not sent at all.

use tracing::debug;

/// Capture and wire sample rate.
pub const SAMPLE_RATE_HZ: u32 = 16_000;

/// Mean-amplitude percentage below which a frame is considered silence.
pub const DEFAULT_VOLUME_THRESHOLD: f32 = 5.0;

/// Convert normalized f32 samples to 16-bit LE signed PCM.
///
/// Samples are clamped to [-1.0, 1.0] first. Negative and positive halves
/// scale against their respective i16 extremes so -1.0 maps to -32768 and
/// 1.0 to 32767.
pub fn pcm16le_from_f32(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let s = sample.clamp(-1.0, 1.0);
        let value = if s < 0.0 {
            (s * 0x8000 as f32) as i16
        } else {
            (s * 0x7FFF as f32) as i16
        };
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

/// Decode 16-bit LE signed PCM back to i16 samples. A trailing odd byte is
/// dropped.
pub fn i16_from_pcm16le(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Mean absolute amplitude of a frame, as a percentage of full scale.
pub fn volume_percent(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s.abs()).sum();
    sum / samples.len() as f32 * 100.0
}

/// Drops frames below the silence threshold and encodes the rest.
#[derive(Debug)]
pub struct VolumeGate {
    threshold: f32,
}

impl VolumeGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Encode a frame for transmission, or `None` if it is silence.
    pub fn encode(&self, samples: &[f32]) -> Option<Vec<u8>> {
        let volume = volume_percent(samples);
        if volume <= self.threshold {
            debug!("frame below volume threshold ({:.1}%), dropped", volume);
            return None;
        }
        Some(pcm16le_from_f32(samples))
    }
}
