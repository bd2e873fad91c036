//! The pieces the `isomap` binary wires around the render core: the block
//! color table and the PNG-backed image sink.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;
use isoanvil::ImageSink;
use isonbt::Value;
use log::debug;
use serde::Deserialize;

pub type Rgba = [u8; 4];

/// Blocks nobody gave us a color for render as this, loudly pink.
const MISSING_COLOR: Rgba = [255, 0, 255, 255];

/// Shade multipliers for the three visible faces of a block sprite, top
/// first.
const FACE_SHADE: [u32; 3] = [255, 220, 180];

const DEFAULT_COLORS: &str = include_str!("colors.json");

/// Maps palette block names to colors.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct ColorMap {
    colors: HashMap<String, Rgba>,
}

impl ColorMap {
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Drop every color the loaded terrain never mentions, so lookups during
    /// the render walk a table sized to the map.
    pub fn retain_needed(&mut self, needed: &HashSet<String>) {
        self.colors.retain(|name, _| needed.contains(name));
    }

    /// The color for one palette entry. None means "paint nothing": air and
    /// absent blocks. Unknown blocks get [`MISSING_COLOR`] so they show up
    /// on the map instead of vanishing.
    pub fn pick(&self, block: &Value) -> Option<Rgba> {
        let name = block.child("Name").as_str()?;

        if name == "minecraft:air" || name == "minecraft:cave_air" {
            return None;
        }

        match self.colors.get(name) {
            Some(color) => Some(*color),
            None => {
                debug!("no color for {}", name);
                Some(MISSING_COLOR)
            }
        }
    }
}

/// The built-in color table.
pub fn load_colors() -> anyhow::Result<ColorMap> {
    serde_json::from_str(DEFAULT_COLORS).context("embedded color table is invalid")
}

/// A user-supplied color table with the same JSON shape as the built-in one.
pub fn load_colors_from(path: &Path) -> anyhow::Result<ColorMap> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("could not read color file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("could not parse color file {}", path.display()))
}

/// An [`ImageSink`] drawing 4x4 block sprites into an RGBA bitmap and saving
/// it as a PNG.
pub struct PngSink {
    colors: ColorMap,
    path: PathBuf,
    img: Option<RgbaImage>,
}

impl PngSink {
    pub fn new(colors: ColorMap, path: PathBuf) -> Self {
        Self {
            colors,
            path,
            img: None,
        }
    }

    fn put(img: &mut RgbaImage, x: usize, y: usize, color: Rgba) {
        // out-of-bounds pixels are silently dropped
        if x < img.width() as usize && y < img.height() as usize {
            img.put_pixel(x as u32, y as u32, image::Rgba(color));
        }
    }
}

fn shaded(color: Rgba, shade: u32) -> Rgba {
    [
        (color[0] as u32 * shade / 255) as u8,
        (color[1] as u32 * shade / 255) as u8,
        (color[2] as u32 * shade / 255) as u8,
        color[3],
    ]
}

impl ImageSink for PngSink {
    fn create(&mut self, width: usize, height: usize) -> bool {
        if width > u32::MAX as usize || height > u32::MAX as usize {
            return false;
        }
        self.img = Some(RgbaImage::new(width as u32, height as u32));
        true
    }

    fn set_pixel(&mut self, x: usize, y: usize, block: &Value, _shade: u8) {
        let img = match self.img.as_mut() {
            Some(img) => img,
            None => return,
        };
        let color = match self.colors.pick(block) {
            Some(color) => color,
            None => return,
        };

        // a 4-wide top face over two 2-wide side faces
        let top = shaded(color, FACE_SHADE[0]);
        let left = shaded(color, FACE_SHADE[1]);
        let right = shaded(color, FACE_SHADE[2]);

        for dx in 0..4 {
            Self::put(img, x + dx, y, top);
        }
        for dy in 1..4 {
            for dx in 0..2 {
                Self::put(img, x + dx, y + dy, left);
            }
            for dx in 2..4 {
                Self::put(img, x + dx, y + dy, right);
            }
        }
    }

    fn save(&mut self) -> io::Result<()> {
        match self.img.as_ref() {
            Some(img) => img
                .save(&self.path)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e)),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "no bitmap was created",
            )),
        }
    }
}
