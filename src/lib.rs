//! wavsource - timestamped multi-channel sample source
//!
//! Loads 16-bit PCM WAV recordings whose comment field carries a start time
//! and per-channel scale factors, and exposes bounds-checked views over the
//! interleaved samples.
//!
//! ```no_run
//! use wavsource::SampleSource;
//!
//! let source = SampleSource::open("recording.wav")?;
//! let view = source.read(0, 100)?;
//! for frame in view.frames_iter().take(100) {
//!     let x = frame.get(0).and_then(|s| source.scaled(s, 0));
//!     println!("{:?}", x);
//! }
//! # Ok::<(), wavsource::SourceError>(())
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;

pub use config::SourceOptions;
pub use engine::{LoadStrategy, SampleSource, SampleView};
pub use error::{Result, SourceError};
