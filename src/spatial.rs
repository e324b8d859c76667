use crate::bounds::BoundingBox;
use crate::point::Point3D;

/// A spatial index over sphere centers based on a uniform grid.
///
/// The domain spanned by the centers is divided into cubic bins whose side is
/// at least the largest search distance that will be queried, so a proximity
/// query only has to visit the 27 bins surrounding the query point.
pub struct SphereGrid {
    /// Number of bins along the X axis.
    pub grid_res_x: usize,
    /// Number of bins along the Y axis.
    pub grid_res_y: usize,
    /// Number of bins along the Z axis.
    pub grid_res_z: usize,
    /// Scale factor for coordinates to grid index.
    pub grid_scale: f64,
    /// Maximum valid index per axis.
    pub grid_limit: [f64; 3],
    /// Minimum corner of the indexed region.
    pub min: [f64; 3],
    /// The grid bins, each containing a list of sphere indices.
    pub grid_bins: Vec<Vec<usize>>,
}

impl SphereGrid {
    /// Bins `centers` into cells of side `cell_size`.
    pub fn new(centers: &[Point3D], cell_size: f64) -> Self {
        let bounds = BoundingBox::around(centers.iter().map(Point3D::to_array))
            .unwrap_or(BoundingBox::new([0.0; 3], [0.0; 3]));
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        let res = |axis: usize| ((bounds.extent(axis) / cell_size).floor() as usize + 1).max(1);
        let (nx, ny, nz) = (res(0), res(1), res(2));

        let mut grid = SphereGrid {
            grid_res_x: nx,
            grid_res_y: ny,
            grid_res_z: nz,
            grid_scale: 1.0 / cell_size,
            grid_limit: [
                (nx as f64) - 1e-5,
                (ny as f64) - 1e-5,
                (nz as f64) - 1e-5,
            ],
            min: bounds.min,
            grid_bins: vec![Vec::new(); nx * ny * nz],
        };
        for (i, c) in centers.iter().enumerate() {
            let bin = grid.get_bin_index(c);
            grid.grid_bins[bin].push(i);
        }
        grid
    }

    fn cell_of(&self, p: &Point3D) -> [usize; 3] {
        let coords = p.to_array();
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            cell[axis] = ((coords[axis] - self.min[axis]) * self.grid_scale)
                .clamp(0.0, self.grid_limit[axis]) as usize;
        }
        cell
    }

    /// Calculates the linear index of the bin containing `p`.
    pub fn get_bin_index(&self, p: &Point3D) -> usize {
        let [ix, iy, iz] = self.cell_of(p);
        ix + iy * self.grid_res_x + iz * self.grid_res_x * self.grid_res_y
    }

    /// Visits every indexed sphere whose bin touches the neighborhood of `p`.
    ///
    /// Candidates are not distance filtered; the visitor does the exact test.
    pub fn visit_candidates<F>(&self, p: &Point3D, mut visitor: F)
    where
        F: FnMut(usize),
    {
        let [ix, iy, iz] = self.cell_of(p);
        let range = |i: usize, n: usize| i.saturating_sub(1)..=(i + 1).min(n - 1);
        for bz in range(iz, self.grid_res_z) {
            for by in range(iy, self.grid_res_y) {
                for bx in range(ix, self.grid_res_x) {
                    let bin = bx + by * self.grid_res_x + bz * self.grid_res_x * self.grid_res_y;
                    for &j in &self.grid_bins[bin] {
                        visitor(j);
                    }
                }
            }
        }
    }
}
