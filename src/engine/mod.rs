//! Sample Source Engine
//!
//! Loading and access for timestamped 16-bit PCM recordings:
//! - WAV container reading
//! - Comment header metadata (start time, channel scales)
//! - In-memory and mapped recording buffers
//! - Borrowed sample views

pub mod buffer;
pub mod header;
pub mod io;
pub mod source;
pub mod timestamp;

pub use buffer::{InMemoryBuffer, LoadStrategy, MappedBuffer, SampleBuffer};
pub use header::{HeaderMetadata, HeaderWarning, CHANNELS_MAX, MAX_COMMENT_LINES};
pub use io::{read_container, InfoText, WavInfo};
pub use source::{Frame, SampleSource, SampleView};
pub use timestamp::{format_timestamp, parse_timestamp};
