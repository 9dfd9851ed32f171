//! PCM wire encoding for the live transport.
//!
//! Outbound: captured f32 samples in [-1, 1] become signed 16-bit
//! little-endian PCM, base64-encoded, tagged with the input sample rate.
//! Inbound: base64 PCM from the service is rebuilt into f32 samples at the
//! configured output rate. Input and output rates are independent.

use anyhow::{Context, Result};
use base64::Engine;

use crate::transport::MediaPayload;

/// Decoded model speech, ready for the playback scheduler.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Convert f32 samples in [-1, 1] to i16 PCM.
///
/// Scaling is asymmetric (negative x32768, positive x32767) so both range
/// boundaries map onto representable i16 values.
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&sample| {
            let s = sample.clamp(-1.0, 1.0);
            if s < 0.0 {
                (s * 32768.0) as i16
            } else {
                (s * 32767.0) as i16
            }
        })
        .collect()
}

/// Base64-encode f32 samples as i16 little-endian PCM.
pub fn encode_pcm(samples: &[f32]) -> String {
    let pcm_bytes: Vec<u8> = f32_to_i16(samples)
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();

    base64::engine::general_purpose::STANDARD.encode(&pcm_bytes)
}

/// Build the wire payload for one captured audio block.
pub fn pcm_payload(samples: &[f32], sample_rate: u32) -> MediaPayload {
    MediaPayload {
        mime_type: format!("audio/pcm;rate={}", sample_rate),
        data: encode_pcm(samples),
    }
}

/// Decode a base64 PCM chunk into f32 samples at the given output rate.
///
/// The chunk itself carries no rate information; the caller supplies the
/// service's fixed output rate.
pub fn decode_audio(data: &str, output_sample_rate: u32) -> Result<DecodedAudio> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .context("audio chunk is not valid base64")?;

    if bytes.len() % 2 != 0 {
        anyhow::bail!("audio chunk has odd byte length {}", bytes.len());
    }

    let samples: Vec<f32> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect();

    Ok(DecodedAudio {
        samples,
        sample_rate: output_sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_clamps_out_of_range_samples() {
        let pcm = f32_to_i16(&[-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_eq!(pcm, vec![i16::MIN, i16::MIN, 0, i16::MAX, i16::MAX]);
    }

    #[test]
    fn conversion_scales_asymmetrically() {
        let pcm = f32_to_i16(&[-0.5, 0.5]);
        assert_eq!(pcm[0], -16384); // -0.5 * 32768
        assert_eq!(pcm[1], 16383); // 0.5 * 32767, truncated
    }

    #[test]
    fn payload_carries_input_rate() {
        let payload = pcm_payload(&[0.0; 8], 16000);
        assert_eq!(payload.mime_type, "audio/pcm;rate=16000");
        assert!(!payload.data.is_empty());
    }

    #[test]
    fn decode_rescales_by_32768() {
        let encoded = encode_pcm(&[-1.0, 0.0]);
        let decoded = decode_audio(&encoded, 24000).unwrap();
        assert_eq!(decoded.samples, vec![-1.0, 0.0]);
    }

    #[test]
    fn decode_preserves_caller_rate() {
        let encoded = encode_pcm(&[0.25; 2400]);
        let decoded = decode_audio(&encoded, 24000).unwrap();
        assert_eq!(decoded.sample_rate, 24000);
        assert!((decoded.duration_secs() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn decode_rejects_odd_length() {
        let data = base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]);
        assert!(decode_audio(&data, 24000).is_err());
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        assert!(decode_audio("not base64!!!", 24000).is_err());
    }
}
