//! Shared test fixtures plus the scenario tests that exercise the whole
//! region -> chunk -> terrain pipeline against synthesized region files.


use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use isonbt::Value;

use crate::blockstates::div_ceil;
use crate::{
    bits_per_block, Buffers, Error, ImageSink, Rectangle, Region, Terrain, COMPRESSED_BUFFER,
};

pub(crate) use builder::RegionBuilder;

pub(crate) fn compound(entries: Vec<(&str, Value)>) -> Value {
    Value::Compound(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect(),
    )
}

pub(crate) fn palette_of(len: usize) -> Value {
    Value::List(
        (0..len)
            .map(|i| {
                Value::Compound(HashMap::from([(
                    "Name".to_owned(),
                    Value::String(format!("minecraft:block{}", i)),
                )]))
            })
            .collect(),
    )
}

/// A section compound with a generated palette of `palette_len` entries
/// named `minecraft:block{i}`.
pub(crate) fn section_of(y: i8, palette_len: usize, states: Vec<i64>) -> Value {
    compound(vec![
        ("Y", Value::Byte(y)),
        ("Palette", palette_of(palette_len)),
        ("BlockStates", Value::LongArray(states)),
    ])
}

/// The chunk tree shape the decoder consumes: Level -> Sections.
pub(crate) fn chunk_tree(sections: Vec<Value>) -> Value {
    compound(vec![(
        "Level",
        compound(vec![("Sections", Value::List(sections))]),
    )])
}

pub(crate) fn name_of(block: &Value) -> &str {
    block.child("Name").as_str().unwrap_or("")
}

/// Pre-1.16 packing: indices end to end, straddling longs.
pub(crate) fn pack_pre116(values: &[usize], bits: usize) -> Vec<i64> {
    let mut words = vec![0u64; div_ceil(values.len() * bits, 64)];
    for (i, v) in values.iter().enumerate() {
        let bit_pos = i * bits;
        let w = bit_pos >> 6;
        let shift = bit_pos & 63;
        words[w] |= (*v as u64) << shift;
        if shift + bits > 64 {
            words[w + 1] |= (*v as u64) >> (64 - shift);
        }
    }
    words.into_iter().map(|w| w as i64).collect()
}

/// Post-1.16 packing: whole indices per long, top bits padded.
pub(crate) fn pack_post116(values: &[usize], bits: usize) -> Vec<i64> {
    let per_long = 64 / bits;
    let mut words = vec![0u64; div_ceil(values.len(), per_long)];
    for (i, v) in values.iter().enumerate() {
        words[i / per_long] |= (*v as u64) << ((i % per_long) * bits);
    }
    words.into_iter().map(|w| w as i64).collect()
}

pub(crate) struct Pixel {
    pub x: usize,
    pub y: usize,
    pub name: String,
}

/// An [`ImageSink`] that just remembers what it was told to do.
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub created: Vec<(usize, usize)>,
    pub pixels: Vec<Pixel>,
    pub saves: usize,
    pub refuse_create: bool,
}

impl ImageSink for RecordingSink {
    fn create(&mut self, width: usize, height: usize) -> bool {
        if self.refuse_create {
            return false;
        }
        self.created.push((width, height));
        true
    }

    fn set_pixel(&mut self, x: usize, y: usize, block: &Value, _shade: u8) {
        self.pixels.push(Pixel {
            x,
            y,
            name: name_of(block).to_owned(),
        });
    }

    fn save(&mut self) -> std::io::Result<()> {
        self.saves += 1;
        Ok(())
    }
}

/// A full-stone chunk: palette `[block0, block1]`, every cell at index 1.
fn stone_chunk() -> Value {
    chunk_tree(vec![section_of(0, 2, pack_post116(&[1; 4096], 4))])
}

fn collect_chunks(region_bytes: Vec<u8>) -> Vec<(usize, usize, Value)> {
    let mut region = Region::from_stream(Cursor::new(region_bytes)).unwrap();
    let mut buffers = Buffers::new();
    let mut out = Vec::new();
    region.for_each_chunk(&mut buffers, |x, z, data| {
        out.push((x, z, isonbt::from_bytes(data).unwrap()));
    });
    out
}

fn temp_region_dir(name: &str, regions: &[((i32, i32), Vec<u8>)]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("isoanvil-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    for ((rx, rz), bytes) in regions {
        fs::write(dir.join(format!("r.{}.{}.mca", rx, rz)), bytes).unwrap();
    }
    dir
}

#[test]
fn region_hands_back_inflated_chunks() {
    let bytes = RegionBuilder::new()
        .chunk(0, 0, &stone_chunk())
        .gzip_chunk(31, 5, &stone_chunk())
        .build();

    let chunks = collect_chunks(bytes);
    assert_eq!(chunks.len(), 2);
    assert_eq!((chunks[0].0, chunks[0].1), (0, 0));
    assert_eq!((chunks[1].0, chunks[1].1), (31, 5));

    for (_, _, tree) in &chunks {
        let sections = tree.child("Level").child("Sections").as_list();
        assert_eq!(sections.len(), 1);
    }
}

#[test]
fn bad_slots_are_skipped_not_fatal() {
    let bytes = RegionBuilder::new()
        .raw_chunk(0, 0, 9, vec![1, 2, 3]) // unknown compression scheme
        .raw_chunk(1, 0, 2, vec![0xde, 0xad]) // not a zlib stream
        .chunk(2, 0, &stone_chunk())
        .build();

    let chunks = collect_chunks(bytes);
    assert_eq!(chunks.len(), 1);
    assert_eq!((chunks[0].0, chunks[0].1), (2, 0));
}

#[test]
fn oversized_chunks_are_skipped() {
    // compressed payload over the scratch cap
    let big = vec![0u8; COMPRESSED_BUFFER + 1];
    let bytes = RegionBuilder::new()
        .raw_chunk(0, 0, 2, big)
        .chunk(1, 0, &stone_chunk())
        .build();
    let chunks = collect_chunks(bytes);
    assert_eq!(chunks.len(), 1);

    // payload that inflates over the cap
    let huge = {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;
        use std::io::Write;
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&vec![0u8; 2 << 20]).unwrap();
        enc.finish().unwrap()
    };
    let bytes = RegionBuilder::new()
        .raw_chunk(0, 0, 2, huge)
        .chunk(1, 0, &stone_chunk())
        .build();
    let chunks = collect_chunks(bytes);
    assert_eq!(chunks.len(), 1);
    assert_eq!((chunks[0].0, chunks[0].1), (1, 0));
}

#[test]
fn short_region_header_is_insufficient_data() {
    let r = Region::from_stream(Cursor::new(vec![0u8; 100]));
    assert!(matches!(r, Err(Error::InsufficientData)));
}

#[test]
fn out_of_range_chunk_location() {
    let region = Region::from_stream(Cursor::new(RegionBuilder::new().build())).unwrap();
    assert!(matches!(
        region.chunk_location(32, 0),
        Err(Error::InvalidOffset(32, 0))
    ));
    assert!(matches!(
        region.chunk_location(0, 32),
        Err(Error::InvalidOffset(0, 32))
    ));
    assert_eq!(region.chunk_location(0, 0).unwrap().offset, 0);
}

#[test]
fn terrain_load_decodes_both_packings_alike() {
    // chunk (0,0) pre-1.16 packed, chunk (1,0) post-1.16 packed, identical
    // logical content at 5 bits per index
    let values: Vec<usize> = (0..4096).map(|i| i % 17).collect();
    let pre = chunk_tree(vec![section_of(0, 17, pack_pre116(&values, 5))]);
    let post = chunk_tree(vec![section_of(0, 17, pack_post116(&values, 5))]);

    let bytes = RegionBuilder::new()
        .chunk(0, 0, &pre)
        .chunk(1, 0, &post)
        .build();
    let dir = temp_region_dir("packings", &[((0, 0), bytes)]);

    let rect = Rectangle {
        min_x: 0,
        max_x: 31,
        min_z: 0,
        max_z: 15,
    };
    let mut terrain = Terrain::new(rect);
    terrain.load(&dir);

    for y in 0..16 {
        for z in 0..16 {
            for x in 0..16 {
                let a = terrain.block(x, y, z);
                let b = terrain.block(x + 16, y, z);
                assert!(!a.is_end());
                assert_eq!(name_of(a), name_of(b), "at ({}, {}, {})", x, y, z);
            }
        }
    }

    assert!(terrain.palette_names().contains("minecraft:block16"));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn garbage_chunks_do_not_poison_the_store() {
    let bytes = RegionBuilder::new()
        .raw_chunk(0, 0, 3, vec![0xff; 64]) // stored, but not NBT
        .chunk(1, 0, &stone_chunk())
        .build();
    let dir = temp_region_dir("garbage", &[((0, 0), bytes)]);

    let rect = Rectangle {
        min_x: 0,
        max_x: 31,
        min_z: 0,
        max_z: 15,
    };
    let mut terrain = Terrain::new(rect);
    terrain.load(&dir);

    assert!(terrain.block(0, 0, 0).is_end());
    assert_eq!(terrain.max_height_at(0, 0), 0);
    assert_eq!(name_of(terrain.block(16, 0, 0)), "minecraft:block1");

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn missing_middle_region_leaves_flanks_intact() {
    // regions 0 and 2 exist, region 1 of the rect does not
    let left = RegionBuilder::new().chunk(0, 0, &stone_chunk()).build();
    let right = RegionBuilder::new().chunk(0, 0, &stone_chunk()).build();
    let dir = temp_region_dir("missing-middle", &[((0, 0), left), ((2, 0), right)]);

    let rect = Rectangle {
        min_x: 0,
        max_x: 1535,
        min_z: 0,
        max_z: 15,
    };
    let mut spanning = Terrain::new(rect);
    spanning.load(&dir);

    // middle region renders as nothing
    assert_eq!(spanning.max_height_at(512, 0), 0);
    assert!(spanning.block(512, 0, 0).is_end());

    // flanking chunks match a run over just their own rect
    let mut solo = Terrain::new(Rectangle {
        min_x: 0,
        max_x: 15,
        min_z: 0,
        max_z: 15,
    });
    solo.load(&dir);

    for y in 0..16 {
        for z in 0..16 {
            for x in 0..16 {
                assert_eq!(
                    name_of(spanning.block(x, y, z)),
                    name_of(solo.block(x, y, z))
                );
                assert_eq!(name_of(spanning.block(x + 1024, y, z)), "minecraft:block1");
            }
        }
    }

    assert_eq!(spanning.max_height_at(0, 0), 16);
    assert_eq!(spanning.max_height_at(1024, 0), 16);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn bits_per_block_matches_packing_expectations() {
    // the classifier depends on these two lengths never colliding for
    // bits > 4
    for &len in &[17usize, 33, 257] {
        let bits = bits_per_block(len);
        assert_ne!(bits * 64, div_ceil(4096, 64 / bits));
    }
}
