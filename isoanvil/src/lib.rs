//! For reading Minecraft's region format, Anvil, and rendering a rectangle of
//! world into an isometric projection.
//!
//! [`Region`] extracts per-chunk NBT from an `.mca` file. [`Terrain`] loads
//! every chunk of a world rectangle into a dense store that [`block`]-level
//! accessors and the [`draw_map`] traversal query. The actual bitmap lives
//! behind the [`ImageSink`] trait.
//!
//! [`block`]: Terrain::block

mod blockstates;
mod canvas;
mod chunk;
mod region;
mod render;
mod terrain;

pub use blockstates::*;
pub use canvas::*;
pub use chunk::*;
pub use region::*;
pub use render::*;
pub use terrain::*;

#[cfg(test)]
mod test;

#[derive(Debug)]
pub enum Error {
    InsufficientData,
    IO(std::io::Error),
    InvalidOffset(usize, usize),
    InvalidChunkMeta,
    ChunkTooLarge(usize),
    ImageAlloc(usize, usize),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IO(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InsufficientData => f.write_str("insufficient data to parse region header"),
            Error::IO(e) => f.write_fmt(format_args!("io error: {:?}", e)),
            Error::InvalidOffset(x, z) => {
                f.write_fmt(format_args!("invalid offset: x = {}, z = {}", x, z))
            }
            Error::InvalidChunkMeta => {
                f.write_str("compression scheme was not recognised for chunk")
            }
            Error::ChunkTooLarge(len) => {
                f.write_fmt(format_args!("chunk of {} bytes exceeds scratch buffer", len))
            }
            Error::ImageAlloc(w, h) => {
                f.write_fmt(format_args!("could not allocate a {}x{} bitmap", w, h))
            }
        }
    }
}

impl std::error::Error for Error {}
