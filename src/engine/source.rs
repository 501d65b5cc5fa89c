//! Sample source
//!
//! Loads a 16-bit PCM recording in full and hands out borrowed views over
//! its interleaved samples. Views borrow the source, so it cannot be closed
//! while one is alive.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{error, info, warn};

use crate::config::SourceOptions;
use crate::engine::buffer::SampleBuffer;
use crate::engine::header::{HeaderMetadata, CHANNELS_MAX};
use crate::engine::io::{read_container, InfoText, WavInfo};
use crate::engine::timestamp::format_timestamp;
use crate::error::{Result, SourceError};

/// Bytes in one sample of one channel.
pub const BYTES_PER_SAMPLE: usize = 2;

/// A fully loaded recording.
pub struct SampleSource {
    scale: [f32; CHANNELS_MAX],
    info: InfoText,
    data_start_offset: usize,
    num_channels: usize,
    num_samples: usize,
    sample_rate: u32,
    start_time: f64,
    buffer: Option<Box<dyn SampleBuffer>>,
}

impl std::fmt::Debug for SampleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleSource")
            .field("num_channels", &self.num_channels)
            .field("num_samples", &self.num_samples)
            .field("sample_rate", &self.sample_rate)
            .field("start_time", &self.start_time)
            .field("data_start_offset", &self.data_start_offset)
            .field("buffer_len", &self.buffer_len())
            .finish()
    }
}

impl SampleSource {
    /// Open a recording with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, &SourceOptions::default())
    }

    /// Open a recording, parse its comment header and load its bytes.
    ///
    /// # Errors
    /// * `NoInput` - If the file cannot be opened
    /// * `DataFormat` - If the container is unreadable, or not 16-bit,
    ///   1..=`CHANNELS_MAX` channel PCM with a non-zero sample rate
    /// * `Resource` - If the buffer cannot be allocated or mapped
    /// * `Io` - If the file cannot be read in full
    pub fn open_with_options(path: impl AsRef<Path>, options: &SourceOptions) -> Result<Self> {
        let path = path.as_ref();
        Self::load(path, options).map_err(|e| {
            error!("ERROR: {}", e);
            e
        })
    }

    fn load(path: &Path, options: &SourceOptions) -> Result<Self> {
        info!("SAMPLESOURCE: Loading header: {}", path.display());

        let mut file = File::open(path).map_err(|e| SourceError::NoInput {
            path: path.display().to_string(),
            source: Some(e),
        })?;

        let wav = read_container(&mut BufReader::new(&mut file))?;
        validate_format(&wav)?;

        let header = HeaderMetadata::parse(&wav.info.comment);
        for warning in &header.warnings {
            warn!("WARNING: {}", warning);
        }

        let data_start_offset = usize::try_from(wav.data_offset)
            .map_err(|_| SourceError::data_format("data offset out of range"))?;

        let length = file.metadata()?.len();
        let buffer = options.strategy.load(file, length)?;

        info!(
            "SAMPLESOURCE: {} channels, {} samples at {} Hz, starting {}",
            wav.channels,
            wav.num_samples,
            wav.sample_rate,
            format_timestamp(header.start_time)
        );

        Ok(SampleSource {
            scale: header.scale,
            info: wav.info,
            data_start_offset,
            num_channels: wav.channels as usize,
            num_samples: wav.num_samples as usize,
            sample_rate: wav.sample_rate,
            start_time: header.start_time,
            buffer: Some(buffer),
        })
    }

    /// Borrow the samples from frame `index` onwards.
    ///
    /// At least `min_count` frames must exist from `index`; the view
    /// extends to the end of the sample data.
    ///
    /// # Errors
    /// * `Closed` - If the source has been closed
    /// * `OutOfRange` - If fewer than `min_count` frames follow `index`
    pub fn read(&self, index: usize, min_count: usize) -> Result<SampleView<'_>> {
        let bytes = self
            .buffer
            .as_ref()
            .ok_or(SourceError::Closed)?
            .as_bytes();

        let span = self.span();
        let available = self.available_frames(bytes.len());
        let out_of_range = || SourceError::OutOfRange {
            index,
            count: min_count,
            available,
        };

        let end_frame = index.checked_add(min_count).ok_or_else(out_of_range)?;
        if end_frame > available {
            return Err(out_of_range());
        }

        let offset = self.data_start_offset + index * span;
        let end = self.data_start_offset + available * span;

        Ok(SampleView {
            bytes: &bytes[offset..end],
            offset,
            channels: self.num_channels,
        })
    }

    /// Release the loaded bytes. Closing twice is a no-op.
    pub fn close(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            info!("SAMPLESOURCE: Releasing {} bytes", buffer.len());
        }
    }

    /// Frames readable from a buffer of `buffer_len` bytes.
    fn available_frames(&self, buffer_len: usize) -> usize {
        let present = buffer_len.saturating_sub(self.data_start_offset) / self.span();
        present.min(self.num_samples)
    }

    pub fn is_open(&self) -> bool {
        self.buffer.is_some()
    }

    /// Length of the loaded buffer, 0 once closed.
    pub fn buffer_len(&self) -> usize {
        self.buffer.as_ref().map_or(0, |buffer| buffer.len())
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of frames in the recording.
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Byte offset of the first sample within the buffer.
    pub fn data_start_offset(&self) -> usize {
        self.data_start_offset
    }

    /// Bytes between a sample and the same channel in the next frame.
    pub fn span(&self) -> usize {
        BYTES_PER_SAMPLE * self.num_channels
    }

    /// Start of the recording in seconds since the Unix epoch, 0 if unknown.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Wall-clock time of frame `index`.
    pub fn time_at(&self, index: usize) -> f64 {
        self.start_time + index as f64 / self.sample_rate as f64
    }

    pub fn duration_secs(&self) -> f64 {
        self.num_samples as f64 / self.sample_rate as f64
    }

    /// Scale of `channel`, or `None` past the recording's channels.
    pub fn scale(&self, channel: usize) -> Option<f32> {
        (channel < self.num_channels).then(|| self.scale[channel])
    }

    /// Scales of the recording's channels.
    pub fn scales(&self) -> &[f32] {
        &self.scale[..self.num_channels]
    }

    /// Convert a raw sample of `channel` to physical units.
    pub fn scaled(&self, sample: i16, channel: usize) -> Option<f32> {
        self.scale(channel).map(|scale| sample as f32 * scale)
    }

    pub fn info(&self) -> &InfoText {
        &self.info
    }
}

/// Validate the format fields of a container.
fn validate_format(wav: &WavInfo) -> Result<()> {
    if wav.bytes_per_channel as usize != BYTES_PER_SAMPLE {
        return Err(SourceError::data_format(format!(
            "format not supported ({} bytes/channel, expected 2 = 16-bit)",
            wav.bytes_per_channel
        )));
    }
    if wav.channels < 1 || wav.channels as usize > CHANNELS_MAX {
        return Err(SourceError::data_format(format!(
            "format not supported ({} channels, expected at least 1 and no more than {})",
            wav.channels, CHANNELS_MAX
        )));
    }
    if wav.sample_rate < 1 {
        return Err(SourceError::data_format(format!(
            "format not supported ({} frequency)",
            wav.sample_rate
        )));
    }
    Ok(())
}

/// Interleaved samples borrowed from a [`SampleSource`].
#[derive(Debug, Clone, Copy)]
pub struct SampleView<'a> {
    bytes: &'a [u8],
    offset: usize,
    channels: usize,
}

impl<'a> SampleView<'a> {
    /// Byte offset of the first sample within the source buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes between successive samples of one channel.
    pub fn span(&self) -> usize {
        BYTES_PER_SAMPLE * self.channels
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames in the view.
    pub fn frames(&self) -> usize {
        self.bytes.len() / self.span()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn sample(&self, frame: usize, channel: usize) -> Option<i16> {
        self.frame(frame)?.get(channel)
    }

    pub fn frame(&self, frame: usize) -> Option<Frame<'a>> {
        let start = frame.checked_mul(self.span())?;
        let bytes = self.bytes.get(start..start.checked_add(self.span())?)?;
        Some(Frame { bytes })
    }

    pub fn frames_iter(&self) -> impl Iterator<Item = Frame<'a>> + 'a {
        self.bytes
            .chunks_exact(self.span())
            .map(|bytes| Frame { bytes })
    }

    /// Every sample of one channel, or `None` if there is no such channel.
    pub fn channel(&self, channel: usize) -> Option<impl Iterator<Item = i16> + 'a> {
        if channel >= self.channels {
            return None;
        }
        let at = channel * BYTES_PER_SAMPLE;
        Some(
            self.bytes
                .chunks_exact(self.span())
                .map(move |frame| i16::from_le_bytes([frame[at], frame[at + 1]])),
        )
    }
}

/// One sample per channel.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    pub fn len(&self) -> usize {
        self.bytes.len() / BYTES_PER_SAMPLE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, channel: usize) -> Option<i16> {
        let at = channel.checked_mul(BYTES_PER_SAMPLE)?;
        let b = self.bytes.get(at..at + BYTES_PER_SAMPLE)?;
        Some(i16::from_le_bytes([b[0], b[1]]))
    }

    pub fn iter(&self) -> impl Iterator<Item = i16> + 'a {
        self.bytes
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::InMemoryBuffer;
    use pretty_assertions::assert_eq;

    /// An in-memory source with `header` filler bytes before the samples.
    fn source_from_samples(channels: usize, header: usize, samples: &[i16]) -> SampleSource {
        let mut bytes = vec![0xAA; header];
        bytes.extend(samples.iter().flat_map(|s| s.to_le_bytes()));

        let mut scale = [1.0; CHANNELS_MAX];
        scale[0] = 0.5;

        SampleSource {
            scale,
            info: InfoText::default(),
            data_start_offset: header,
            num_channels: channels,
            num_samples: samples.len() / channels,
            sample_rate: 100,
            start_time: 1_577_836_800.0,
            buffer: Some(Box::new(InMemoryBuffer::from(bytes))),
        }
    }

    #[test]
    fn test_read_offset_and_span() {
        let source = source_from_samples(3, 44, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);

        let view = source.read(2, 1).unwrap();
        assert_eq!(view.offset(), 44 + 2 * 2 * 3);
        assert_eq!(view.span(), 6);
        assert_eq!(view.frames(), 2);
        assert_eq!(view.sample(0, 0), Some(7));
        assert_eq!(view.sample(1, 2), Some(12));
        assert_eq!(view.sample(2, 0), None);
        assert_eq!(view.sample(0, 3), None);
    }

    #[test]
    fn test_read_channel_and_frames() {
        let source = source_from_samples(2, 0, &[1, -1, 2, -2, 3, -3]);
        let view = source.read(0, 3).unwrap();

        let right: Vec<i16> = view.channel(1).unwrap().collect();
        assert_eq!(right, vec![-1, -2, -3]);
        assert!(view.channel(2).is_none());

        let frames: Vec<Vec<i16>> = view.frames_iter().map(|f| f.iter().collect()).collect();
        assert_eq!(frames, vec![vec![1, -1], vec![2, -2], vec![3, -3]]);
        assert_eq!(view.frame(1).unwrap().len(), 2);
    }

    #[test]
    fn test_read_out_of_range() {
        let source = source_from_samples(2, 0, &[1, -1, 2, -2, 3, -3]);

        assert!(source.read(3, 0).is_ok());
        assert!(source.read(1, 2).is_ok());
        assert!(matches!(
            source.read(2, 2),
            Err(SourceError::OutOfRange {
                index: 2,
                count: 2,
                available: 3
            })
        ));
        assert!(matches!(
            source.read(usize::MAX, 1),
            Err(SourceError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_read_bounded_by_buffer() {
        let mut source = source_from_samples(1, 0, &[1, 2, 3]);
        // Header claims more frames than the file holds
        source.num_samples = 10;

        assert!(source.read(0, 3).is_ok());
        assert!(matches!(
            source.read(0, 4),
            Err(SourceError::OutOfRange { available: 3, .. })
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut source = source_from_samples(1, 0, &[1, 2, 3]);
        assert_eq!(source.buffer_len(), 6);

        source.close();
        assert_eq!(source.buffer_len(), 0);
        assert!(!source.is_open());

        source.close();
        assert_eq!(source.buffer_len(), 0);
        assert!(matches!(source.read(0, 1), Err(SourceError::Closed)));
    }

    #[test]
    fn test_scales_and_time() {
        let source = source_from_samples(2, 0, &[100, 100]);

        assert_eq!(source.scales(), &[0.5, 1.0]);
        assert_eq!(source.scale(2), None);
        assert_eq!(source.scaled(100, 0), Some(50.0));
        assert_eq!(source.time_at(50), 1_577_836_800.5);
        assert_eq!(source.duration_secs(), 0.01);
    }

    #[test]
    fn test_validate_format() {
        let mut wav = WavInfo {
            channels: 2,
            bytes_per_channel: 2,
            sample_rate: 100,
            num_samples: 0,
            data_offset: 44,
            data_len: 0,
            info: InfoText::default(),
        };
        assert!(validate_format(&wav).is_ok());

        wav.sample_rate = 0;
        assert!(matches!(
            validate_format(&wav),
            Err(SourceError::DataFormat { .. })
        ));

        wav.sample_rate = 100;
        wav.channels = 0;
        assert!(validate_format(&wav).is_err());

        wav.channels = CHANNELS_MAX as u16 + 1;
        assert!(validate_format(&wav).is_err());

        wav.channels = CHANNELS_MAX as u16;
        wav.bytes_per_channel = 3;
        let err = validate_format(&wav).unwrap_err();
        assert!(err.to_string().contains("3 bytes/channel"));
    }
}
