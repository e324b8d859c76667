use crate::bounds::BoundingBox;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// State of a single voxel.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Voxel {
    #[default]
    Free = 0,
    Occupied = 255,
}

/// One `width × height` raster layer of the voxel domain.
///
/// Pixel `(x, y)` covers the unit square `[x, x + 1) × [y, y + 1)` and is stored
/// row-major at `x + y * width`.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    width: usize,
    height: usize,
    pixels: Vec<Voxel>,
}

impl Layer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Voxel::Free; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Voxel> {
        if x < self.width && y < self.height {
            Some(self.pixels[x + y * self.width])
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[Voxel] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Voxel::Free);
    }

    /// Marks every pixel whose center lies within `radius` of `(cx, cy)` as occupied.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        if radius.is_nan() || radius < 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let r_sq = radius * radius;
        // Pixel centers sit at half-integer coordinates.
        let x_lo = (cx - radius - 0.5).ceil().max(0.0);
        let x_hi = (cx + radius - 0.5).floor().min((self.width - 1) as f64);
        let y_lo = (cy - radius - 0.5).ceil().max(0.0);
        let y_hi = (cy + radius - 0.5).floor().min((self.height - 1) as f64);
        if x_lo > x_hi || y_lo > y_hi {
            return;
        }

        for py in (y_lo as usize)..=(y_hi as usize) {
            let dy = py as f64 + 0.5 - cy;
            let row = py * self.width;
            for px in (x_lo as usize)..=(x_hi as usize) {
                let dx = px as f64 + 0.5 - cx;
                if dx * dx + dy * dy <= r_sq {
                    self.pixels[row + px] = Voxel::Occupied;
                }
            }
        }
    }

    pub fn count(&self, value: Voxel) -> usize {
        self.pixels.iter().filter(|&&v| v == value).count()
    }
}

/// The voxelized domain: `depth + 1` independent raster layers of `width × height`.
///
/// Layer `i` holds the cross sections of the plane `z = i`, so a domain of depth
/// `Z` is sampled at `Z + 1` planes including both faces.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelSpace {
    width: usize,
    height: usize,
    depth: usize,
    layers: Vec<Layer>,
}

impl VoxelSpace {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            layers: (0..=depth).map(|_| Layer::new(width, height)).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Continuous extent of the domain, `[0, X] × [0, Y] × [0, Z]`.
    pub fn bounds(&self) -> BoundingBox<3> {
        BoundingBox::new(
            [0.0, 0.0, 0.0],
            [self.width as f64, self.height as f64, self.depth as f64],
        )
    }

    /// Continuous domain volume `X · Y · Z`.
    pub fn domain_volume(&self) -> f64 {
        self.bounds().volume()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Voxel at `(x, y)` in layer `z`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<Voxel> {
        self.layers.get(z)?.get(x, y)
    }

    /// Fills a disk in layer `layer`. Calls for layers outside `[0, Z]` are ignored.
    pub fn rasterize_circle(&mut self, layer: usize, cx: f64, cy: f64, radius: f64) {
        if let Some(l) = self.layers.get_mut(layer) {
            l.fill_circle(cx, cy, radius);
        }
    }

    /// Resets every voxel to free.
    pub fn clear(&mut self) {
        self.layers.iter_mut().for_each(Layer::clear);
    }

    /// Number of voxels equal to `value` across all layers.
    pub fn count_voxels(&self, value: Voxel) -> usize {
        self.layers.iter().map(|l| l.count(value)).sum()
    }

    /// `X · Y · (Z + 1)`.
    pub fn total_voxels(&self) -> usize {
        self.width * self.height * self.layers.len()
    }

    /// Fraction of free voxels, in `[0, 1]`.
    pub fn porosity(&self) -> f64 {
        let total = self.total_voxels();
        if total == 0 {
            return 1.0;
        }
        self.count_voxels(Voxel::Free) as f64 / total as f64
    }

    /// Porosity of `count` equal, non-overlapping spheres of `radius`, computed
    /// analytically against the voxel volume. Only meaningful as a control value
    /// for packings without overlap.
    pub fn analytic_porosity(&self, count: usize, radius: f64) -> f64 {
        let volume = self.total_voxels() as f64;
        let solid = count as f64 * 4.0 / 3.0 * PI * radius.powi(3);
        (volume - solid) / volume
    }
}
