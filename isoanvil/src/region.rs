use std::convert::TryFrom;
use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::{GzDecoder, ZlibDecoder};
use log::warn;
use num_enum::TryFromPrimitive;

use crate::{Error, Result};

/// the size in bytes of a 'sector' in a region file. Sectors are Minecraft's
/// size unit for chunks. The offset table addresses chunk payloads in whole
/// sectors.
pub(crate) const SECTOR_SIZE: usize = 4096;

/// chunk slots per region file (32 x 32).
pub(crate) const REGION_CHUNKS: usize = 1024;

/// size of the header preceding each chunk's compressed data.
pub(crate) const CHUNK_HEADER_SIZE: usize = 5;

/// Upper bound on one chunk's compressed payload. Chunks larger than this are
/// skipped rather than grown for; one oversized chunk must not balloon the
/// scratch buffers for the rest of the run.
pub const COMPRESSED_BUFFER: usize = 1 << 20;

/// Upper bound on one chunk's inflated NBT, same policy as
/// [`COMPRESSED_BUFFER`].
pub const DECOMPRESSED_BUFFER: usize = 1 << 20;

/// Various compression schemes that NBT data is typically compressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum CompressionScheme {
    Gzip = 1,
    Zlib = 2,
    Uncompressed = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLocation {
    /// The offset, in units of 4kiB sectors, into the region file this chunk
    /// is located at. Offset 0 means the chunk is absent.
    pub offset: u64,

    /// The number of 4kiB sectors that this chunk occupies in the region file.
    pub sectors: u64,
}

impl ChunkLocation {
    fn absent(&self) -> bool {
        // an offset of zero points into the header, the convention for "no
        // chunk here"
        self.offset == 0
    }
}

/// Encodes how the NBT data of one chunk is compressed.
#[derive(Debug)]
struct ChunkMeta {
    compressed_len: u32,
    compression_scheme: CompressionScheme,
}

impl ChunkMeta {
    fn new(data: &[u8]) -> Result<Self> {
        if data.len() < CHUNK_HEADER_SIZE {
            return Err(Error::InsufficientData);
        }

        let mut buf = &data[..CHUNK_HEADER_SIZE];
        let len = buf.read_u32::<BigEndian>()?;
        let scheme = buf.read_u8()?;
        let scheme = CompressionScheme::try_from(scheme).map_err(|_| Error::InvalidChunkMeta)?;

        if len == 0 {
            return Err(Error::InvalidChunkMeta);
        }

        Ok(Self {
            compressed_len: len - 1, // this len includes the compression byte.
            compression_scheme: scheme,
        })
    }
}

/// Scratch space for one chunk's compressed and inflated bytes, reused across
/// every chunk of a region pass. The contents are only valid until the next
/// chunk is read.
pub struct Buffers {
    compressed: Vec<u8>,
    inflated: Vec<u8>,
}

impl Buffers {
    pub fn new() -> Self {
        Self {
            compressed: Vec::with_capacity(COMPRESSED_BUFFER),
            inflated: Vec::with_capacity(DECOMPRESSED_BUFFER),
        }
    }
}

impl Default for Buffers {
    fn default() -> Self {
        Self::new()
    }
}

/// A Minecraft region: 32 x 32 chunks worth of compressed NBT behind an
/// offset table. Reading assumes a seek to 0 is the start of the region.
pub struct Region<S> {
    stream: S,
    locations: Vec<ChunkLocation>,
}

impl<S> Region<S>
where
    S: Read + Seek,
{
    /// Load a region from an existing stream. Only the offset table is read
    /// up front; chunk payloads are read from the underlying stream when
    /// visited.
    pub fn from_stream(mut stream: S) -> Result<Self> {
        let mut header = [0u8; SECTOR_SIZE];
        stream.seek(SeekFrom::Start(0))?;
        stream.read_exact(&mut header).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::InsufficientData
            } else {
                Error::IO(e)
            }
        })?;

        let mut locations = Vec::with_capacity(REGION_CHUNKS);
        for it in 0..REGION_CHUNKS {
            let word = u32::from_be_bytes([
                header[it * 4],
                header[it * 4 + 1],
                header[it * 4 + 2],
                header[it * 4 + 3],
            ]);
            locations.push(ChunkLocation {
                offset: (word >> 8) as u64,
                sectors: (word & 0xff) as u64,
            });
        }

        Ok(Self { stream, locations })
    }

    /// The location of the chunk at region-local coordinates, both 0..32.
    pub fn chunk_location(&self, x: usize, z: usize) -> Result<ChunkLocation> {
        if x >= 32 || z >= 32 {
            return Err(Error::InvalidOffset(x, z));
        }

        Ok(self.locations[x + z * 32])
    }

    /// Visit every chunk present in this region, handing the callback the
    /// region-local chunk coordinates and the inflated NBT bytes. Absent
    /// slots are passed over; unreadable or oversized slots are logged and
    /// skipped. A bad chunk never aborts the pass.
    pub fn for_each_chunk<F>(&mut self, buffers: &mut Buffers, mut callback: F)
    where
        F: FnMut(usize, usize, &[u8]),
    {
        for it in 0..REGION_CHUNKS {
            let loc = self.locations[it];
            if loc.absent() {
                continue;
            }

            // Slot order in the table is z-major.
            let (x, z) = (it & 31, it >> 5);
            match self.inflate_chunk(loc.offset, buffers) {
                Ok(()) => callback(x, z, &buffers.inflated),
                Err(e) => warn!("skipping chunk slot ({}, {}): {}", x, z, e),
            }
        }
    }

    fn inflate_chunk(&mut self, offset_sectors: u64, buffers: &mut Buffers) -> Result<()> {
        self.stream
            .seek(SeekFrom::Start(offset_sectors * SECTOR_SIZE as u64))?;

        let mut header = [0u8; CHUNK_HEADER_SIZE];
        self.stream.read_exact(&mut header)?;
        let meta = ChunkMeta::new(&header)?;

        let len = meta.compressed_len as usize;
        if len > COMPRESSED_BUFFER {
            return Err(Error::ChunkTooLarge(len));
        }

        buffers.compressed.resize(len, 0);
        self.stream.read_exact(&mut buffers.compressed[..])?;

        // Reading one byte over the cap distinguishes "filled it exactly"
        // from "would not fit".
        buffers.inflated.clear();
        let limit = DECOMPRESSED_BUFFER as u64 + 1;
        let written = match meta.compression_scheme {
            CompressionScheme::Zlib => ZlibDecoder::new(&buffers.compressed[..])
                .take(limit)
                .read_to_end(&mut buffers.inflated)?,
            CompressionScheme::Gzip => GzDecoder::new(&buffers.compressed[..])
                .take(limit)
                .read_to_end(&mut buffers.inflated)?,
            CompressionScheme::Uncompressed => {
                buffers.inflated.extend_from_slice(&buffers.compressed);
                buffers.compressed.len()
            }
        };

        if written > DECOMPRESSED_BUFFER {
            return Err(Error::ChunkTooLarge(written));
        }

        Ok(())
    }
}
