pub mod file;
pub mod format;
pub mod wav;

pub use file::AudioFile;
pub use format::{parse_format, AudioFormat, DEFAULT_MIME_TYPE};
pub use wav::{build_header, synthesize, WavBuffer, WavError, MAX_PAYLOAD_LEN, WAV_HEADER_LEN};
