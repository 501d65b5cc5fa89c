//! WAV container reading
//!
//! Format fields come from `hound`. It does not expose where the sample
//! payload starts or the `LIST`/`INFO` text fields, so a second pass walks
//! the RIFF chunks for those.

use std::io::{Read, Seek, SeekFrom};

use hound::WavReader;
use log::debug;

use crate::error::{Result, SourceError};

/// Maximum length in bytes of each INFO text field.
pub const INFO_TEXT_CAPACITY: usize = 1024;

const RIFF: &[u8; 4] = b"RIFF";
const WAVE: &[u8; 4] = b"WAVE";
const DATA: &[u8; 4] = b"data";
const LIST: &[u8; 4] = b"LIST";
const INFO: &[u8; 4] = b"INFO";

/// Text fields from the `LIST`/`INFO` chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoText {
    /// `IART`
    pub artist: String,
    /// `INAM`
    pub name: String,
    /// `ICMT`
    pub comment: String,
    /// `ICRD`
    pub date: String,
}

/// Everything the sample source needs to know about a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub channels: u16,
    pub bytes_per_channel: u16,
    pub sample_rate: u32,
    /// Number of frames (samples per channel).
    pub num_samples: u32,
    /// Absolute byte offset of the first sample.
    pub data_offset: u64,
    /// Bytes of sample data actually present in the file.
    pub data_len: u64,
    pub info: InfoText,
}

/// Parse the container and return its format fields and INFO text.
///
/// The reader may be at any position; it is left at an unspecified one.
///
/// # Errors
/// * `DataFormat` - If the file is not a readable WAV container
/// * `Io` - If seeking or reading the underlying file fails
pub fn read_container<R: Read + Seek>(reader: &mut R) -> Result<WavInfo> {
    reader.seek(SeekFrom::Start(0))?;

    let (spec, num_samples) = {
        let wav = WavReader::new(&mut *reader).map_err(|e| SourceError::DataFormat {
            reason: format!("cannot parse container ({})", e),
            source: Some(Box::new(e)),
        })?;
        (wav.spec(), wav.duration())
    };

    let layout = walk_chunks(reader)?;

    Ok(WavInfo {
        channels: spec.channels,
        bytes_per_channel: spec.bits_per_sample.div_ceil(8),
        sample_rate: spec.sample_rate,
        num_samples,
        data_offset: layout.data_offset,
        data_len: layout.data_len,
        info: layout.info,
    })
}

struct ChunkLayout {
    data_offset: u64,
    data_len: u64,
    info: InfoText,
}

fn walk_chunks<R: Read + Seek>(reader: &mut R) -> Result<ChunkLayout> {
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let mut riff = [0u8; 12];
    if end < riff.len() as u64 {
        return Err(SourceError::data_format("file too small for a RIFF header"));
    }
    reader.read_exact(&mut riff)?;
    if &riff[0..4] != RIFF || &riff[8..12] != WAVE {
        return Err(SourceError::data_format("missing RIFF/WAVE header"));
    }

    let mut pos = riff.len() as u64;
    let mut data = None;
    let mut info = InfoText::default();

    while pos + 8 <= end {
        reader.seek(SeekFrom::Start(pos))?;
        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;

        let id = [header[0], header[1], header[2], header[3]];
        let size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as u64;
        let body = pos + 8;
        let available = size.min(end - body);

        debug!(
            "chunk '{}' at {} ({} bytes)",
            String::from_utf8_lossy(&id),
            pos,
            size
        );

        if &id == DATA && data.is_none() {
            data = Some((body, available));
        } else if &id == LIST && available >= 4 {
            let mut list = vec![0u8; available as usize];
            reader.read_exact(&mut list)?;
            if &list[0..4] == INFO {
                parse_info_list(&list[4..], &mut info);
            }
        }

        // Chunks are word aligned
        pos = body + size + (size & 1);
    }

    let (data_offset, data_len) =
        data.ok_or_else(|| SourceError::data_format("no 'data' chunk found"))?;

    Ok(ChunkLayout {
        data_offset,
        data_len,
        info,
    })
}

/// Fill `info` from the sub-chunks of a `LIST`/`INFO` body.
fn parse_info_list(bytes: &[u8], info: &mut InfoText) {
    let mut pos = 0usize;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes([
            bytes[pos + 4],
            bytes[pos + 5],
            bytes[pos + 6],
            bytes[pos + 7],
        ]) as usize;
        let start = pos + 8;
        let end = start.saturating_add(size).min(bytes.len());
        let value = &bytes[start..end];

        match id {
            b"IART" => info.artist = info_text(value),
            b"INAM" => info.name = info_text(value),
            b"ICMT" => info.comment = info_text(value),
            b"ICRD" => info.date = info_text(value),
            _ => {}
        }

        pos = start.saturating_add(size).saturating_add(size & 1);
    }
}

/// Decode a NUL-terminated INFO value, truncated to [`INFO_TEXT_CAPACITY`].
fn info_text(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let mut text = String::from_utf8_lossy(&bytes[..len]).into_owned();

    if text.len() > INFO_TEXT_CAPACITY {
        let mut cut = INFO_TEXT_CAPACITY;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn chunk(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        if body.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn fmt_pcm(channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
        let block_align = channels * bits.div_ceil(8);
        let mut body = Vec::new();
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&channels.to_le_bytes());
        body.extend_from_slice(&sample_rate.to_le_bytes());
        body.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
        body.extend_from_slice(&block_align.to_le_bytes());
        body.extend_from_slice(&bits.to_le_bytes());
        chunk(b"fmt ", &body)
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = RIFF.to_vec();
        out.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
        out.extend_from_slice(WAVE);
        out.extend_from_slice(&body);
        out
    }

    fn info_list(fields: &[(&[u8; 4], &str)]) -> Vec<u8> {
        let mut body = INFO.to_vec();
        for (id, text) in fields {
            let mut value = text.as_bytes().to_vec();
            value.push(0);
            body.extend_from_slice(&chunk(id, &value));
        }
        chunk(LIST, &body)
    }

    #[test]
    fn test_read_stereo_with_info() {
        let samples: Vec<u8> = [1i16, -1, 2, -2, 3, -3]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let bytes = riff(&[
            fmt_pcm(2, 100, 16),
            info_list(&[
                (b"IART", "Recorder 7"),
                (b"ICMT", "Time: 2020-01-01 00:00:00\nScale-1: 8"),
            ]),
            chunk(DATA, &samples),
        ]);

        let info = read_container(&mut Cursor::new(bytes)).unwrap();

        assert_eq!(info.channels, 2);
        assert_eq!(info.bytes_per_channel, 2);
        assert_eq!(info.sample_rate, 100);
        assert_eq!(info.num_samples, 3);
        assert_eq!(info.data_len, 12);
        assert_eq!(info.info.artist, "Recorder 7");
        assert_eq!(info.info.comment, "Time: 2020-01-01 00:00:00\nScale-1: 8");
        assert_eq!(info.info.name, "");

        // RIFF header (12) + fmt (8 + 16) + data chunk header (8), plus the LIST
        let list_len = info_list(&[
            (b"IART", "Recorder 7"),
            (b"ICMT", "Time: 2020-01-01 00:00:00\nScale-1: 8"),
        ])
        .len() as u64;
        assert_eq!(info.data_offset, 12 + 24 + list_len + 8);
    }

    #[test]
    fn test_info_after_data_chunk() {
        let bytes = riff(&[
            fmt_pcm(1, 8000, 16),
            chunk(DATA, &[0, 0, 1, 0]),
            info_list(&[(b"INAM", "late"), (b"ICRD", "2020-01-01")]),
        ]);

        let info = read_container(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(info.data_offset, 12 + 24 + 8);
        assert_eq!(info.info.name, "late");
        assert_eq!(info.info.date, "2020-01-01");
    }

    #[test]
    fn test_eight_bit_reports_one_byte_per_channel() {
        let bytes = riff(&[fmt_pcm(1, 8000, 8), chunk(DATA, &[128, 128])]);
        let info = read_container(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(info.bytes_per_channel, 1);
    }

    #[test]
    fn test_not_a_wav_file() {
        let result = read_container(&mut Cursor::new(b"definitely not a wav file".to_vec()));
        assert!(matches!(result, Err(SourceError::DataFormat { .. })));
    }

    #[test]
    fn test_walk_requires_data_chunk() {
        let bytes = riff(&[fmt_pcm(1, 8000, 16)]);
        let result = walk_chunks(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(SourceError::DataFormat { .. })));
    }

    #[test]
    fn test_truncated_data_chunk_reports_available_bytes() {
        let mut bytes = riff(&[fmt_pcm(1, 8000, 16), chunk(DATA, &[0; 8])]);
        bytes.truncate(bytes.len() - 4);
        let layout = walk_chunks(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(layout.data_len, 4);
    }

    #[test]
    fn test_info_text_stops_at_nul_and_truncates() {
        assert_eq!(info_text(b"abc\0def"), "abc");

        let long = "é".repeat(INFO_TEXT_CAPACITY);
        let text = info_text(long.as_bytes());
        assert!(text.len() <= INFO_TEXT_CAPACITY);
        assert!(text.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_parse_info_list_keeps_truncated_subchunk() {
        let mut body = chunk(b"IART", b"ok\0");
        body.extend_from_slice(b"ICMT");
        body.extend_from_slice(&1000u32.to_le_bytes());
        body.extend_from_slice(b"partial");

        let mut info = InfoText::default();
        parse_info_list(&body, &mut info);
        assert_eq!(info.artist, "ok");
        assert_eq!(info.comment, "partial");
    }
}
