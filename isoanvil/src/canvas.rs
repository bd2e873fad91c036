use crate::Rectangle;

/// Which world corner faces the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    NW,
    NE,
    SE,
    SW,
}

impl Orientation {
    /// Unit steps from the back corner towards the viewer, one per world
    /// axis.
    pub fn vectors(self) -> (i32, i32) {
        match self {
            Orientation::NW => (1, 1),
            Orientation::SE => (-1, -1),
            Orientation::NE => (1, -1),
            Orientation::SW => (-1, 1),
        }
    }

    /// For NE and SW the canvas axes are swapped relative to world X/Z.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Orientation::NE | Orientation::SW)
    }
}

/// Maps canvas coordinates onto world columns for one orientation. Pure: the
/// same canvas position always names the same column, and canvas (0, 0) is
/// the world corner drawn furthest back in the projection.
#[derive(Debug, Clone, Copy)]
pub struct OrientedMap {
    orientation: Orientation,
    anchor_x: i32,
    anchor_z: i32,
    vx: i32,
    vz: i32,
}

impl OrientedMap {
    pub fn new(rect: Rectangle, orientation: Orientation) -> Self {
        let (vx, vz) = orientation.vectors();
        Self {
            orientation,
            anchor_x: if vx > 0 { rect.min_x } else { rect.max_x },
            anchor_z: if vz > 0 { rect.min_z } else { rect.max_z },
            vx,
            vz,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The world column under a canvas position.
    pub fn world_coords(&self, canvas_x: usize, canvas_z: usize) -> (i32, i32) {
        let (along_x, along_z) = if self.orientation.swaps_axes() {
            (canvas_z, canvas_x)
        } else {
            (canvas_x, canvas_z)
        };

        (
            self.anchor_x + along_x as i32 * self.vx,
            self.anchor_z + along_z as i32 * self.vz,
        )
    }
}

/// The virtual 2D grid driving the isometric traversal, plus the vertical
/// window to render. `size_x`/`size_z` are the rectangle extents minus one
/// (a canvas walks 0..=size), exchanged when the orientation swaps axes.
#[derive(Debug, Clone, Copy)]
pub struct IsometricCanvas {
    pub size_x: usize,
    pub size_z: usize,
    pub min_y: u8,
    pub max_y: u8,
    pub offset_y: usize,
}

impl IsometricCanvas {
    pub fn new(
        rect: Rectangle,
        orientation: Orientation,
        min_y: u8,
        max_y: u8,
        offset_y: usize,
    ) -> Self {
        let mut size_x = (rect.max_x - rect.min_x) as usize;
        let mut size_z = (rect.max_z - rect.min_z) as usize;
        if orientation.swaps_axes() {
            std::mem::swap(&mut size_x, &mut size_z);
        }

        Self {
            size_x,
            size_z,
            min_y,
            max_y,
            offset_y,
        }
    }

    /// Bitmap width: each canvas diagonal is two pixels apart, plus the
    /// 4-pixel block sprite.
    pub fn image_width(&self) -> usize {
        2 * (self.size_x + self.size_z) + 4
    }

    /// Bitmap height: one pixel row per canvas step, `offset_y` rows per
    /// block of altitude, plus the sprite.
    pub fn image_height(&self) -> usize {
        self.size_x + self.size_z + self.max_y as usize * self.offset_y + 4
    }
}
