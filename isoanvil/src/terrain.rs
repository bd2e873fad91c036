use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use isonbt::{Value, AIR};
use log::warn;

use crate::blockstates::{block_at_post116, block_at_pre116};
use crate::chunk::{canonicalize, SectionKind};
use crate::region::{Buffers, Region};

/// An inclusive rectangle of world-block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub min_x: i32,
    pub max_x: i32,
    pub min_z: i32,
    pub max_z: i32,
}

/// The chunk holding a block coordinate. Arithmetic shift, so negative
/// coordinates land in the right chunk.
pub fn chunk_of(block: i32) -> i32 {
    block >> 4
}

/// The region holding a chunk coordinate.
pub fn region_of(chunk: i32) -> i32 {
    chunk >> 5
}

/// Vertical extent of one chunk as observed while decoding. `top` is the
/// slab-aligned block height just above the last populated section,
/// saturated to 255; `bottom` is the lowest populated section index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeightRange {
    pub top: u8,
    pub bottom: u8,
}

/// Every chunk of one world rectangle, decoded and canonicalized. The store
/// owns the section vectors; block lookups borrow from it.
pub struct Terrain {
    rect: Rectangle,
    min_cx: i32,
    min_cz: i32,
    width: usize,
    depth: usize,
    chunks: Vec<Vec<Value>>,
    heights: Vec<HeightRange>,
    bounds: HeightRange,
    palette_names: HashSet<String>,
}

impl Terrain {
    /// An empty store sized to the rectangle. Every chunk renders as air
    /// until [`Terrain::load`] fills it.
    pub fn new(rect: Rectangle) -> Self {
        let min_cx = chunk_of(rect.min_x);
        let min_cz = chunk_of(rect.min_z);
        let width = (chunk_of(rect.max_x) - min_cx + 1) as usize;
        let depth = (chunk_of(rect.max_z) - min_cz + 1) as usize;

        Self {
            rect,
            min_cx,
            min_cz,
            width,
            depth,
            chunks: vec![Vec::new(); width * depth],
            heights: vec![HeightRange::default(); width * depth],
            bounds: HeightRange::default(),
            palette_names: HashSet::new(),
        }
    }

    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    /// Index of a chunk coordinate in the dense grid, None outside the
    /// rectangle.
    pub fn chunk_index(&self, cx: i32, cz: i32) -> Option<usize> {
        if cx < self.min_cx || cz < self.min_cz {
            return None;
        }
        let x = (cx - self.min_cx) as usize;
        let z = (cz - self.min_cz) as usize;
        if x >= self.width || z >= self.depth {
            return None;
        }
        Some(x + z * self.width)
    }

    /// Parse every region file overlapping the rectangle into the store.
    /// Missing region files and undecodable chunks are logged and skipped;
    /// loading never fails outright.
    pub fn load(&mut self, region_dir: &Path) {
        let mut buffers = Buffers::new();

        let max_cx = chunk_of(self.rect.max_x);
        let max_cz = chunk_of(self.rect.max_z);

        for rx in region_of(self.min_cx)..=region_of(max_cx) {
            for rz in region_of(self.min_cz)..=region_of(max_cz) {
                let path = region_dir.join(format!("r.{}.{}.mca", rx, rz));

                let file = match File::open(&path) {
                    Ok(file) => file,
                    Err(_) => {
                        warn!("region file {} does not exist, skipping", path.display());
                        continue;
                    }
                };

                match Region::from_stream(file) {
                    Ok(mut region) => self.load_region(&mut region, rx, rz, &mut buffers),
                    Err(e) => warn!("unreadable region {}: {}", path.display(), e),
                }
            }
        }
    }

    fn load_region<S>(&mut self, region: &mut Region<S>, rx: i32, rz: i32, buffers: &mut Buffers)
    where
        S: Read + Seek,
    {
        region.for_each_chunk(buffers, |x, z, data| {
            let cx = (rx << 5) + x as i32;
            let cz = (rz << 5) + z as i32;

            let index = match self.chunk_index(cx, cz) {
                Some(index) => index,
                None => return, // chunk outside the rectangle
            };

            let tree = match isonbt::from_bytes(data) {
                Ok(tree) => tree,
                Err(e) => {
                    warn!("undecodable chunk ({}, {}): {}", cx, cz, e);
                    return;
                }
            };

            let (sections, range) = canonicalize(tree, &mut self.palette_names);
            if range.top > self.bounds.top {
                self.bounds.top = range.top;
            }
            self.heights[index] = range;
            self.chunks[index] = sections;
        });
    }

    /// The palette entry at absolute block coordinates, or the air sentinel
    /// when the position is unloaded, unpopulated, or malformed.
    pub fn block(&self, x: i32, y: i32, z: i32) -> &Value {
        let index = match self.chunk_index(chunk_of(x), chunk_of(z)) {
            Some(index) => index,
            None => return &AIR,
        };

        // negative y wraps to a huge slab index and falls out here
        let section = match self.chunks[index].get((y >> 4) as usize) {
            Some(section) => section,
            None => return &AIR,
        };

        match SectionKind::of(section) {
            SectionKind::Pre116 => block_at_pre116(section, x as usize, y as usize, z as usize),
            SectionKind::Post116 => block_at_post116(section, x as usize, y as usize, z as usize),
            SectionKind::Skip => &AIR,
        }
    }

    /// The highest slab-aligned block height seen anywhere in the store.
    pub fn max_height(&self) -> u8 {
        self.bounds.top
    }

    pub fn min_height(&self) -> u8 {
        slab_to_block(self.bounds.bottom)
    }

    /// Highest renderable block height of the column's chunk; 0 for columns
    /// outside the loaded rectangle.
    pub fn max_height_at(&self, x: i32, z: i32) -> u8 {
        self.chunk_index(chunk_of(x), chunk_of(z))
            .map(|index| self.heights[index].top)
            .unwrap_or(0)
    }

    pub fn min_height_at(&self, x: i32, z: i32) -> u8 {
        self.chunk_index(chunk_of(x), chunk_of(z))
            .map(|index| slab_to_block(self.heights[index].bottom))
            .unwrap_or(0)
    }

    /// Every palette name encountered while loading; lets the color loader
    /// resolve only colors the map will ask for.
    pub fn palette_names(&self) -> &HashSet<String> {
        &self.palette_names
    }

    #[cfg(test)]
    pub(crate) fn put_chunk(&mut self, cx: i32, cz: i32, sections: Vec<Value>, range: HeightRange) {
        let index = self.chunk_index(cx, cz).expect("chunk in rect");
        if range.top > self.bounds.top {
            self.bounds.top = range.top;
        }
        self.heights[index] = range;
        self.chunks[index] = sections;
    }
}

/// Block height of a section index. Only defined for the bottom 16 slabs;
/// saturates above that.
fn slab_to_block(slab: u8) -> u8 {
    ((slab as u16) * 16).min(255) as u8
}
