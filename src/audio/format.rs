/// MIME type assumed when no chunk in a turn declares one
pub const DEFAULT_MIME_TYPE: &str = "audio/L16;rate=24000";

pub const DEFAULT_CHANNELS: u16 = 1;
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 16;

/// Raw PCM layout declared by a MIME type such as `audio/L16;rate=24000`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Number of channels (always mono for streamed model audio)
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
        }
    }
}

impl AudioFormat {
    /// Bytes per second of audio
    pub fn byte_rate(&self) -> u32 {
        let rate = self.sample_rate as u64 * self.channels as u64 * self.bits_per_sample as u64 / 8;
        rate as u32
    }

    /// Bytes per sample frame (all channels)
    pub fn block_align(&self) -> u16 {
        (self.channels as u32 * self.bits_per_sample as u32 / 8) as u16
    }
}

/// Parse a raw PCM MIME type into an [`AudioFormat`].
///
/// Only the `L<bits>` subtype and the `rate` parameter are recognised.
/// Anything missing or unparseable keeps its default; this never fails.
pub fn parse_format(mime_type: &str) -> AudioFormat {
    let mut format = AudioFormat::default();

    let mut parts = mime_type.split(';').map(str::trim);
    let primary = parts.next().unwrap_or_default();

    if let Some(subtype) = primary.split('/').nth(1) {
        let subtype = subtype.trim();
        if let Some(bits) = subtype
            .strip_prefix('L')
            .or_else(|| subtype.strip_prefix('l'))
            .and_then(parse_leading_digits::<u16>)
        {
            format.bits_per_sample = bits;
        }
    }

    for param in parts {
        let mut kv = param.splitn(2, '=').map(str::trim);
        let key = kv.next().unwrap_or_default();
        if key != "rate" {
            continue;
        }
        if let Some(rate) = kv.next().and_then(parse_leading_digits::<u32>) {
            format.sample_rate = rate;
        }
    }

    format
}

/// Parse the run of ASCII digits at the start of `s` (`"16bit"` → 16).
/// Returns `None` for no digits or on overflow.
fn parse_leading_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    s[..end].parse().ok()
}
