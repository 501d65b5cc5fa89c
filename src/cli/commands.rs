//! CLI Command Implementations

use std::io::{self, Write};
use std::path::Path;

use log::info;

use crate::config::SourceOptions;
use crate::engine::{format_timestamp, SampleSource};
use crate::error::Result;

/// Print a summary of a recording.
pub fn info(path: &Path, options: &SourceOptions) -> Result<()> {
    let mut source = SampleSource::open_with_options(path, options)?;
    write_info(&source, &mut io::stdout().lock())?;
    source.close();
    Ok(())
}

/// Print frames of a recording.
pub fn dump(
    path: &Path,
    options: &SourceOptions,
    start: usize,
    count: Option<usize>,
    scaled: bool,
) -> Result<()> {
    let mut source = SampleSource::open_with_options(path, options)?;
    write_frames(&source, &mut io::stdout().lock(), start, count, scaled)?;
    source.close();
    Ok(())
}

pub fn write_info<W: Write>(source: &SampleSource, out: &mut W) -> Result<()> {
    let info = source.info();

    writeln!(out, "Channels:     {}", source.num_channels())?;
    writeln!(out, "Sample rate:  {} Hz", source.sample_rate())?;
    writeln!(out, "Samples:      {}", source.num_samples())?;
    writeln!(out, "Duration:     {:.3} s", source.duration_secs())?;
    writeln!(out, "Start time:   {}", format_timestamp(source.start_time()))?;
    writeln!(out, "Data offset:  {}", source.data_start_offset())?;
    for (channel, scale) in source.scales().iter().enumerate() {
        writeln!(out, "Scale-{}:      {}", channel + 1, scale)?;
    }
    writeln!(out, "Artist:       {}", info.artist)?;
    writeln!(out, "Name:         {}", info.name)?;
    writeln!(out, "Date:         {}", info.date)?;
    for line in info.comment.lines() {
        writeln!(out, "Comment:      {}", line)?;
    }

    Ok(())
}

/// Write `count` frames from `start` (default: to the end), one per line.
pub fn write_frames<W: Write>(
    source: &SampleSource,
    out: &mut W,
    start: usize,
    count: Option<usize>,
    scaled: bool,
) -> Result<()> {
    let count = count.unwrap_or_else(|| source.num_samples().saturating_sub(start));
    info!("Dumping {} frames from {}", count, start);

    let view = source.read(start, count)?;
    for frame in view.frames_iter().take(count) {
        let fields: Vec<String> = frame
            .iter()
            .enumerate()
            .map(|(channel, sample)| match source.scaled(sample, channel) {
                Some(value) if scaled => value.to_string(),
                _ => sample.to_string(),
            })
            .collect();
        writeln!(out, "{}", fields.join(","))?;
    }

    Ok(())
}
