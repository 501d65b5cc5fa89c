//! Recording byte buffers
//!
//! A sample source holds the whole recording, either read into the heap
//! or mapped read-only from the file. Both sit behind [`SampleBuffer`].

use std::fs::File;
use std::io::{Read, Seek};

use log::info;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SourceError};

/// Read-only access to the bytes of a loaded recording.
pub trait SampleBuffer: Send + Sync {
    fn as_bytes(&self) -> &[u8];

    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a recording is brought into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStrategy {
    /// Allocate a buffer and read the whole file.
    Read,
    /// Map the file read-only; pages load on first access.
    Map,
}

impl Default for LoadStrategy {
    fn default() -> Self {
        if cfg!(feature = "mmap") {
            LoadStrategy::Map
        } else {
            LoadStrategy::Read
        }
    }
}

impl LoadStrategy {
    /// Load `len` bytes of `file` from its start.
    ///
    /// The file handle is consumed and closed before this returns,
    /// whether or not loading succeeds.
    pub fn load(self, mut file: File, len: u64) -> Result<Box<dyn SampleBuffer>> {
        match self {
            LoadStrategy::Read => {
                info!("SAMPLESOURCE: Allocating and reading {} bytes...", len);
                file.rewind()?;
                Ok(Box::new(InMemoryBuffer::read_from(file, len)?))
            }
            LoadStrategy::Map => {
                info!("SAMPLESOURCE: Mapping {} bytes...", len);
                Ok(Box::new(MappedBuffer::map(file, len)?))
            }
        }
    }
}

/// Recording bytes owned on the heap.
#[derive(Debug)]
pub struct InMemoryBuffer {
    bytes: Vec<u8>,
}

impl InMemoryBuffer {
    /// Read exactly `len` bytes from `reader`.
    ///
    /// # Errors
    /// * `Resource` - If a buffer of `len` bytes cannot be allocated
    /// * `Io` - If the reader runs out before `len` bytes
    pub fn read_from<R: Read>(mut reader: R, len: u64) -> Result<Self> {
        let size = usize::try_from(len).map_err(|_| SourceError::Resource {
            details: format!("Problem allocating {} bytes", len),
        })?;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|e| SourceError::Resource {
                details: format!("Problem allocating {} bytes: {}", len, e),
            })?;
        bytes.resize(size, 0);

        reader.read_exact(&mut bytes)?;

        Ok(InMemoryBuffer { bytes })
    }
}

impl From<Vec<u8>> for InMemoryBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        InMemoryBuffer { bytes }
    }
}

impl SampleBuffer for InMemoryBuffer {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Recording bytes mapped read-only from the file.
#[derive(Debug)]
pub struct MappedBuffer {
    map: Mmap,
}

impl MappedBuffer {
    /// Map the first `len` bytes of `file`.
    ///
    /// # Errors
    /// * `Resource` - If the mapping cannot be established
    pub fn map(file: File, len: u64) -> Result<Self> {
        let size = usize::try_from(len).map_err(|_| SourceError::Resource {
            details: format!("Problem mapping {} bytes", len),
        })?;

        // SAFETY: the map is private and read-only. Truncating the file from
        // another process while it is mapped is outside what we support.
        let map = unsafe { memmap2::MmapOptions::new().len(size).map(&file) }.map_err(|e| {
            SourceError::Resource {
                details: format!("Problem mapping {} bytes: {}", len, e),
            }
        })?;

        Ok(MappedBuffer { map })
    }
}

impl SampleBuffer for MappedBuffer {
    fn as_bytes(&self) -> &[u8] {
        &self.map
    }
}
