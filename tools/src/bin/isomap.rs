use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{App, Arg, ArgMatches};

use isoanvil::{draw_map, IsometricCanvas, Orientation, OrientedMap, Rectangle, Terrain};
use tools::{load_colors, load_colors_from, PngSink};

fn main() {
    env_logger::init();

    let matches = App::new("isomap")
        .about("Renders a rectangle of a Minecraft world as an isometric PNG.")
        .arg(
            Arg::with_name("from")
                .long("from")
                .value_names(&["X", "Z"])
                .number_of_values(2)
                .allow_hyphen_values(true)
                .required(true)
                .help("block coordinates to start rendering at"),
        )
        .arg(
            Arg::with_name("to")
                .long("to")
                .value_names(&["X", "Z"])
                .number_of_values(2)
                .allow_hyphen_values(true)
                .required(true)
                .help("block coordinates to stop rendering at (inclusive)"),
        )
        .arg(
            Arg::with_name("min")
                .long("min")
                .takes_value(true)
                .default_value("0")
                .help("minimum Y of blocks to render"),
        )
        .arg(
            Arg::with_name("max")
                .long("max")
                .takes_value(true)
                .default_value("255")
                .help("maximum Y of blocks to render"),
        )
        .arg(
            Arg::with_name("file")
                .long("file")
                .takes_value(true)
                .default_value("output.png")
                .help("output file name"),
        )
        .arg(
            Arg::with_name("colors")
                .long("colors")
                .takes_value(true)
                .help("JSON color table overriding the built-in one"),
        )
        .arg(
            Arg::with_name("offset-y")
                .long("offset-y")
                .takes_value(true)
                .default_value("3")
                .help("pixel rows between vertically adjacent blocks"),
        )
        .arg(
            Arg::with_name("memlimit")
                .long("memlimit")
                .takes_value(true)
                .default_value("2147483648")
                .help("refuse to render when the bitmap would exceed this many bytes"),
        )
        .arg(Arg::with_name("nw").long("nw").help("view from the north-west (default)"))
        .arg(Arg::with_name("ne").long("ne").help("view from the north-east"))
        .arg(Arg::with_name("se").long("se").help("view from the south-east"))
        .arg(Arg::with_name("sw").long("sw").help("view from the south-west"))
        .arg(
            Arg::with_name("world")
                .takes_value(true)
                .required(true)
                .help("path of the world to render"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn coord_pair(matches: &ArgMatches, name: &str) -> anyhow::Result<(i32, i32)> {
    let mut values = match matches.values_of(name) {
        Some(values) => values,
        None => bail!("--{} needs two integer arguments", name),
    };
    let x = values.next().unwrap_or_default();
    let z = values.next().unwrap_or_default();
    Ok((
        x.parse()
            .with_context(|| format!("--{} needs two integers, got {:?}", name, x))?,
        z.parse()
            .with_context(|| format!("--{} needs two integers, got {:?}", name, z))?,
    ))
}

fn orientation(matches: &ArgMatches) -> Orientation {
    if matches.is_present("ne") {
        Orientation::NE
    } else if matches.is_present("se") {
        Orientation::SE
    } else if matches.is_present("sw") {
        Orientation::SW
    } else {
        Orientation::NW
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let (from_x, from_z) = coord_pair(matches, "from")?;
    let (to_x, to_z) = coord_pair(matches, "to")?;

    if to_x < from_x || to_z < from_z {
        bail!("nothing to render: --from X Z has to be <= --to X Z");
    }

    let min_y: u8 = matches
        .value_of("min")
        .unwrap_or_default()
        .parse()
        .context("--min needs an integer in 0..=255")?;
    let max_y: u8 = matches
        .value_of("max")
        .unwrap_or_default()
        .parse()
        .context("--max needs an integer in 0..=255")?;
    if max_y <= min_y {
        bail!("nothing to render: --min Y has to be < --max Y");
    }

    let offset_y: usize = matches
        .value_of("offset-y")
        .unwrap_or_default()
        .parse()
        .context("--offset-y needs a positive integer")?;
    if offset_y == 0 {
        bail!("--offset-y has to be at least 1");
    }

    let memlimit: u64 = matches
        .value_of("memlimit")
        .unwrap_or_default()
        .parse()
        .context("--memlimit needs a byte count")?;

    let world = PathBuf::from(matches.value_of("world").unwrap_or_default());
    if !world.exists() {
        bail!("no world at {}", world.display());
    }

    let rect = Rectangle {
        min_x: from_x,
        max_x: to_x,
        min_z: from_z,
        max_z: to_z,
    };
    let orientation = orientation(matches);
    let map = OrientedMap::new(rect, orientation);
    let canvas = IsometricCanvas::new(rect, orientation, min_y, max_y, offset_y);

    let bitmap_bytes = canvas.image_width() as u64 * canvas.image_height() as u64 * 4;
    if bitmap_bytes > memlimit {
        bail!(
            "not enough memory for the image: {} bytes needed, {} allowed",
            bitmap_bytes,
            memlimit
        );
    }

    let mut colors = match matches.value_of("colors") {
        Some(path) => load_colors_from(path.as_ref())?,
        None => load_colors()?,
    };

    let mut terrain = Terrain::new(rect);
    terrain.load(&world.join("region"));
    colors.retain_needed(terrain.palette_names());

    let out_file = PathBuf::from(matches.value_of("file").unwrap_or_default());
    let mut sink = PngSink::new(colors, out_file.clone());
    draw_map(&terrain, &map, &canvas, &mut sink)
        .with_context(|| format!("could not render to {}", out_file.display()))?;

    println!("Job complete.");
    Ok(())
}
