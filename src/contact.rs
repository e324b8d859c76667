//! Contact distribution analysis on a rasterized packing.
//!
//! Free voxels are labelled with their 6-connected step distance to the nearest
//! occupied voxel; local maxima of that field are the pockets where a new sphere
//! could rest.

use crate::voxel::{Voxel, VoxelSpace};
use log::debug;

/// Discrete distance bands over a voxel space, stored as `x + y·X + z·X·Y`.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceField {
    width: usize,
    height: usize,
    layers: usize,
    values: Vec<u32>,
    passes: usize,
}

impl DistanceField {
    /// Value of a free voxel no band has reached; also marks detected pockets.
    pub const UNREACHED: u32 = u32::MAX;

    /// Labels occupied voxels with band 0 and grows bands into free space.
    ///
    /// Pass `k` assigns band `k + 1` to every unreached 6-neighbor of a band `k`
    /// voxel, so a voxel never loses a nearer band. Propagation ends once every
    /// voxel is reached or a pass reaches nothing new.
    pub fn propagate(space: &VoxelSpace) -> Self {
        let (width, height, layers) = (space.width(), space.height(), space.layer_count());
        let mut values = Vec::with_capacity(width * height * layers);
        let mut frontier = Vec::new();
        for layer in space.layers() {
            for &voxel in layer.pixels() {
                if voxel == Voxel::Occupied {
                    frontier.push(values.len());
                    values.push(0);
                } else {
                    values.push(Self::UNREACHED);
                }
            }
        }

        let mut field = Self {
            width,
            height,
            layers,
            values,
            passes: 0,
        };
        let mut remaining = field.values.len() - frontier.len();
        let mut next = Vec::new();
        while remaining > 0 && !frontier.is_empty() {
            let band = field.passes as u32 + 1;
            for &idx in &frontier {
                for n in field.face_neighbors(idx).into_iter().flatten() {
                    if field.values[n] == Self::UNREACHED {
                        field.values[n] = band;
                        next.push(n);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            remaining -= next.len();
            field.passes += 1;
            std::mem::swap(&mut frontier, &mut next);
            next.clear();
        }
        debug!(
            "distance field: {} passes, {} voxels unreached",
            field.passes, remaining
        );
        field
    }

    /// Indices of the in-bounds 6-neighbors of `idx`.
    fn face_neighbors(&self, idx: usize) -> [Option<usize>; 6] {
        let (w, h, l) = (self.width, self.height, self.layers);
        let plane = w * h;
        let (x, y, z) = (idx % w, (idx / w) % h, idx / plane);
        [
            (x > 0).then(|| idx - 1),
            (x + 1 < w).then(|| idx + 1),
            (y > 0).then(|| idx - w),
            (y + 1 < h).then(|| idx + w),
            (z > 0).then(|| idx - plane),
            (z + 1 < l).then(|| idx + plane),
        ]
    }

    fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        (x < self.width && y < self.height && z < self.layers)
            .then(|| x + y * self.width + z * self.width * self.height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layer_count(&self) -> usize {
        self.layers
    }

    /// Number of propagation passes that reached new voxels.
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u32> {
        self.index(x, y, z).map(|i| self.values[i])
    }

    /// Band values of layer `z`, row-major.
    pub fn layer(&self, z: usize) -> Option<&[u32]> {
        let plane = self.width * self.height;
        (z < self.layers).then(|| &self.values[z * plane..(z + 1) * plane])
    }

    pub fn count(&self, value: u32) -> usize {
        self.values.iter().filter(|&&v| v == value).count()
    }

    /// Whether every in-bounds 26-neighbor of `(x, y, z)` holds at most `band`.
    fn dominates_neighborhood(&self, x: usize, y: usize, z: usize, band: u32) -> bool {
        for dz in -1i64..=1 {
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    let (nx, ny, nz) = (x as i64 + dx, y as i64 + dy, z as i64 + dz);
                    if nx < 0 || ny < 0 || nz < 0 {
                        continue;
                    }
                    if let Some(v) = self.get(nx as usize, ny as usize, nz as usize) {
                        if v > band {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }
}

/// Finds local maxima of the free-space bands.
///
/// Interior layers `1..=Z-1` are scanned layer by layer, row by row. A reached free
/// voxel is a pocket when none of its 26 neighbors lies further from the solid.
/// Each pocket is stamped [`DistanceField::UNREACHED`] as soon as it is found, so
/// a flat plateau yields pockets spaced at least two voxels apart.
pub fn detect_pockets(field: &mut DistanceField) -> Vec<[usize; 3]> {
    let mut pockets = Vec::new();
    for z in 1..field.layers.saturating_sub(1) {
        for y in 0..field.height {
            for x in 0..field.width {
                let idx = x + y * field.width + z * field.width * field.height;
                let band = field.values[idx];
                if band == 0 || band == DistanceField::UNREACHED {
                    continue;
                }
                if field.dominates_neighborhood(x, y, z, band) {
                    pockets.push([x, y, z]);
                    field.values[idx] = DistanceField::UNREACHED;
                }
            }
        }
    }
    debug!("detected {} pockets", pockets.len());
    pockets
}

/// Display color of a distance band as RGB bytes.
///
/// Band 0 is white and each further band darkens by 20000 in the packed
/// `0xRRGGBB` value; unreached voxels are black.
pub fn band_color(band: u32) -> [u8; 3] {
    if band == DistanceField::UNREACHED {
        return [0, 0, 0];
    }
    let packed = 0xFF_FF_FFu32.saturating_sub(band.saturating_mul(20_000));
    [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
}

/// Distance field and pocket list of one voxel space.
#[derive(Clone, Debug)]
pub struct ContactField {
    field: DistanceField,
    pockets: Vec<[usize; 3]>,
}

impl ContactField {
    pub fn analyze(space: &VoxelSpace) -> Self {
        let mut field = DistanceField::propagate(space);
        let pockets = detect_pockets(&mut field);
        Self { field, pockets }
    }

    /// The field after pocket stamping.
    pub fn field(&self) -> &DistanceField {
        &self.field
    }

    /// Pockets as `[x, y, z]` in discovery order.
    pub fn pockets(&self) -> &[[usize; 3]] {
        &self.pockets
    }

    pub fn into_pockets(self) -> Vec<[usize; 3]> {
        self.pockets
    }
}
