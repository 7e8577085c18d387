use base64::Engine;
use thiserror::Error;

use super::format::{parse_format, AudioFormat};

/// Size of the canonical PCM WAV header
pub const WAV_HEADER_LEN: usize = 44;

/// Largest payload whose RIFF chunk size still fits in 32 bits
pub const MAX_PAYLOAD_LEN: usize = (u32::MAX - 36) as usize;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("failed to decode base64 audio: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("PCM payload of {0} bytes does not fit in a WAV container")]
    PayloadTooLarge(usize),
}

/// A complete, playable WAV file held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavBuffer {
    bytes: Vec<u8>,
    format: AudioFormat,
}

impl WavBuffer {
    /// Header and payload as one contiguous buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Raw PCM bytes following the header
    pub fn payload(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_LEN..]
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Playback duration in seconds
    pub fn duration_secs(&self) -> f64 {
        let byte_rate = self.format.byte_rate();
        if byte_rate == 0 {
            return 0.0;
        }
        self.payload().len() as f64 / byte_rate as f64
    }
}

/// Build the 44-byte RIFF/WAVE header for `data_len` bytes of PCM.
///
/// All multi-byte fields are little-endian. `data_len` must not exceed
/// [`MAX_PAYLOAD_LEN`], otherwise the RIFF size field (`data_len + 36`)
/// cannot be represented; [`synthesize`] rejects such payloads before
/// calling this.
pub fn build_header(data_len: u32, format: &AudioFormat) -> [u8; WAV_HEADER_LEN] {
    debug_assert!(
        data_len as usize <= MAX_PAYLOAD_LEN,
        "PCM payload of {} bytes overflows the RIFF size field",
        data_len
    );

    let mut header = [0u8; WAV_HEADER_LEN];

    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&data_len.wrapping_add(36).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes()); // PCM fmt chunk size
    header[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_len.to_le_bytes());

    header
}

/// Join base64 PCM chunks into a WAV buffer described by `mime_type`.
///
/// Chunks are concatenated before decoding, so a chunk boundary may fall
/// anywhere inside a base64 quantum.
pub fn synthesize<S: AsRef<str>>(chunks: &[S], mime_type: &str) -> Result<WavBuffer, WavError> {
    let mut combined = String::with_capacity(chunks.iter().map(|c| c.as_ref().len()).sum());
    for chunk in chunks {
        combined.push_str(chunk.as_ref());
    }
    let payload = base64::engine::general_purpose::STANDARD.decode(combined.as_bytes())?;

    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(WavError::PayloadTooLarge(payload.len()));
    }

    let format = parse_format(mime_type);
    let header = build_header(payload.len() as u32, &format);

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + payload.len());
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&payload);

    Ok(WavBuffer { bytes, format })
}
