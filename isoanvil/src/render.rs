use isonbt::Value;

use crate::{Error, IsometricCanvas, OrientedMap, Result, Terrain};

/// Where pixels go. The renderer decides order and position; the sink owns
/// the bitmap and decides how, and whether, to paint a block.
pub trait ImageSink {
    /// Allocate the output bitmap. Returning false aborts the render.
    fn create(&mut self, width: usize, height: usize) -> bool;

    /// Paint one block. The sink must ignore out-of-bounds coordinates, and
    /// is handed air blocks too (an End value): painting nothing for those
    /// is its call.
    fn set_pixel(&mut self, x: usize, y: usize, block: &Value, shade: u8);

    /// Flush the bitmap out.
    fn save(&mut self) -> std::io::Result<()>;
}

/// Drive a full render: allocate the bitmap, traverse the canvas, save.
///
/// Drawing must follow a fixed order so that no pixel is ever written behind
/// one already present. Per canvas diagonal the columns come out as
///
/// ```text
///   0
///  3 1
/// 5 4 2
/// ```
///
/// and every column is drawn bottom-up, so with a positive `offset_y` each
/// block lands after everything it may occlude: the pixel positions sharing
/// its bitmap column belong to columns further back or blocks further down,
/// all visited earlier.
pub fn draw_map<S>(
    terrain: &Terrain,
    map: &OrientedMap,
    canvas: &IsometricCanvas,
    sink: &mut S,
) -> Result<()>
where
    S: ImageSink,
{
    let width = canvas.image_width();
    let height = canvas.image_height();
    if !sink.create(width, height) {
        return Err(Error::ImageAlloc(width, height));
    }

    for x in 0..=canvas.size_x {
        for z in 0..=canvas.size_z {
            let bmp_x = 2 * (canvas.size_z + x) - 2 * z;
            let (world_x, world_z) = map.world_coords(x, z);

            let top = terrain.max_height_at(world_x, world_z).min(canvas.max_y);
            for y in canvas.min_y..top {
                let bmp_y =
                    height - 4 + x + z - canvas.size_x - canvas.size_z - y as usize * canvas.offset_y;

                let block = terrain.block(world_x, y as i32, world_z);
                sink.set_pixel(bmp_x, bmp_y, block, 0);
            }
        }
    }

    sink.save()?;
    Ok(())
}
