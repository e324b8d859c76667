use crate::bounds::BoundingBox;
use crate::config::{Distribution, PackingConfig};
use crate::error::{Error, Result};
use crate::neighbors::NeighborGraph;
use crate::point::Point3D;
use crate::sphere::Sphere;
use crate::voxel::VoxelSpace;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution as _};
use rayon::prelude::*;
use serde::Serialize;
use std::f64::consts::PI;

/// Draws sphere radii from the configured distribution.
#[derive(Clone, Debug)]
pub enum RadiusSampler {
    Uniform { min: f64, max: f64 },
    Beta { min: f64, max: f64, beta: Beta<f64> },
}

impl RadiusSampler {
    pub fn from_config(config: &PackingConfig) -> Result<Self> {
        let (min, max) = (config.min_radius, config.max_radius);
        match config.distribution {
            Distribution::Uniform => Ok(RadiusSampler::Uniform { min, max }),
            Distribution::Beta => {
                let beta = Beta::new(config.beta_p, config.beta_q)
                    .map_err(|e| Error::invalid_config(format!("beta distribution: {e}")))?;
                Ok(RadiusSampler::Beta { min, max, beta })
            }
        }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match self {
            RadiusSampler::Uniform { min, max } => rng.r#gen::<f64>() * (max - min) + min,
            RadiusSampler::Beta { min, max, beta } => beta.sample(rng) * (max - min) + min,
        }
    }
}

/// Outcome of [`SpherePacking::reach_target_porosity`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TuningReport {
    /// Porosity before the first growth pass.
    pub initial_porosity: f64,
    /// Porosity after the last pass.
    pub porosity: f64,
    /// Number of growth passes performed.
    pub iterations: usize,
    /// Upper bound of the per-pass growth factor.
    pub growth_factor: f64,
    /// Whether the target was reached within the iteration cap.
    pub converged: bool,
}

/// A random sphere packing together with its voxelized microstructure.
///
/// This struct manages:
/// - The **spheres**, appended during seeding and never removed.
/// - The **neighbor graph** used by the surface estimator.
/// - The **voxel space** the cross sections are rasterized into.
/// - The **random generator** driving seeding, jitter and growth.
pub struct SpherePacking {
    config: PackingConfig,
    spheres: Vec<Sphere>,
    neighbors: NeighborGraph,
    space: VoxelSpace,
    rng: StdRng,
}

impl SpherePacking {
    /// Creates an empty packing for a validated configuration.
    pub fn new(config: PackingConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let space = VoxelSpace::new(config.width, config.height, config.depth);
        Ok(Self {
            config,
            spheres: Vec::new(),
            neighbors: NeighborGraph::default(),
            space,
            rng,
        })
    }

    /// Creates a packing from an existing sphere list, e.g. one read back from CSV.
    pub fn from_spheres(config: PackingConfig, spheres: Vec<Sphere>) -> Result<Self> {
        let mut packing = Self::new(config)?;
        packing.spheres = spheres;
        Ok(packing)
    }

    pub fn config(&self) -> &PackingConfig {
        &self.config
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn space(&self) -> &VoxelSpace {
        &self.space
    }

    pub fn neighbors(&self) -> &NeighborGraph {
        &self.neighbors
    }

    pub fn push_sphere(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    /// Mean of the radius distribution.
    pub fn expected_radius(&self) -> f64 {
        self.config.expected_radius()
    }

    /// Mean outer radius over all spheres, `0` for an empty packing.
    pub fn mean_outer_radius(&self) -> f64 {
        if self.spheres.is_empty() {
            return 0.0;
        }
        self.spheres.iter().map(Sphere::outer_radius).sum::<f64>() / self.spheres.len() as f64
    }

    /// Current voxel porosity.
    pub fn porosity(&self) -> f64 {
        self.space.porosity()
    }

    /// Fills the floor of the domain with one layer of spheres.
    ///
    /// Spheres are laid out in rows along Y, rows advancing along X by the
    /// hexagonal row distance `2 E[r] sin 60°` plus the gap `eps · max_radius`.
    /// Every other row starts half a sphere further along Y. Each sphere rests on
    /// the floor (`z = r`) and is then jittered by up to `eps · max_radius` per axis.
    /// Returns the number of spheres placed.
    pub fn fill_bottom_layer(&mut self) -> Result<usize> {
        let sampler = RadiusSampler::from_config(&self.config)?;
        let max_r = self.config.max_radius;
        let min_r = self.config.min_radius;
        let eps = self.config.eps;
        let expected = self.expected_radius();

        let margin = max_r * eps;
        let gap = eps * max_r;
        let step_x = 2.0 * expected * 60f64.to_radians().sin() + gap;
        let step_y = 2.0 * expected + gap;
        let width = self.config.width as f64;
        let height = self.config.height as f64;

        let before = self.spheres.len();
        let mut row = 0usize;
        let mut x = margin;
        while x <= width - margin {
            let mut y = margin;
            while y <= height - margin {
                if row % 2 == 1 && y <= margin * 1.0001 {
                    y = min_r + gap;
                    if y > height - margin {
                        break;
                    }
                }
                let radius = sampler.sample(&mut self.rng);
                let mut sphere = Sphere::new(Point3D::new(x, y, radius), radius);
                sphere.jitter(2.0 * max_r * eps, &mut self.rng);
                self.spheres.push(sphere);
                y += step_y;
            }
            row += 1;
            x += step_x;
        }

        let placed = self.spheres.len() - before;
        info!("seeded {} spheres in {} rows", placed, row);
        Ok(placed)
    }

    /// Redraws every layer from scratch with the current outer radii.
    ///
    /// Layer `i` receives a disk of radius `sqrt(r² - h²)` for every sphere whose
    /// center lies within the domain footprint and whose distance `h` to the plane
    /// `z = i` does not exceed its outer radius `r`. Layers are independent and are
    /// drawn in parallel.
    pub fn rasterize_cross_sections(&mut self) -> Result<()> {
        if self.spheres.is_empty() {
            return Err(Error::EmptySphereList);
        }
        let bounds = self.space.bounds();
        let footprint = BoundingBox::new([bounds.min[0], bounds.min[1]], [bounds.max[0], bounds.max[1]]);
        let spheres = &self.spheres;

        self.space
            .layers_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, layer)| {
                layer.clear();
                let plane = i as f64;
                for sphere in spheres {
                    let c = sphere.center();
                    if !footprint.contains(&[c.x, c.y]) {
                        continue;
                    }
                    if let Some(r) = sphere.cross_section_radius(plane) {
                        layer.fill_circle(c.x, c.y, r);
                    }
                }
            });
        Ok(())
    }

    /// Grows random outer radii until the voxel porosity drops to the configured target.
    ///
    /// The growth factor is the ratio between the radius that `n` equal spheres
    /// would need to fill `(1 - target)` of the domain and the expected radius,
    /// clamped to at least 1. Each pass draws `max(n / 4, 1)` spheres (with
    /// replacement) and scales each drawn outer radius by a uniform factor in `[1, factor]`,
    /// then redraws all cross sections. Expects the cross sections to be current.
    pub fn reach_target_porosity(&mut self) -> Result<TuningReport> {
        let n = self.spheres.len();
        if n == 0 {
            return Err(Error::EmptySphereList);
        }
        let target = self.config.target_porosity;
        let max_iterations = self.config.max_iterations;

        let solid_volume = self.space.domain_volume() * (1.0 - target);
        let target_radius = (3.0 * solid_volume / (4.0 * PI * n as f64)).cbrt();
        let factor = (target_radius / self.expected_radius()).max(1.0);
        let picks = (n / 4).max(1);

        let initial_porosity = self.space.porosity();
        let mut porosity = initial_porosity;
        let mut iterations = 0;
        info!("porosity {:.4}, target {:.4}, growth factor {:.4}", porosity, target, factor);

        while porosity > target && iterations < max_iterations {
            for _ in 0..picks {
                let k = self.rng.gen_range(0..n);
                let r = self.spheres[k].outer_radius();
                let grown = r * (1.0 + self.rng.r#gen::<f64>() * (factor - 1.0));
                self.spheres[k].grow_outer_radius(grown);
            }
            self.rasterize_cross_sections()?;
            porosity = self.space.porosity();
            iterations += 1;
            debug!("growth pass {}: porosity {:.4}", iterations, porosity);
        }

        let converged = porosity <= target;
        if !converged {
            warn!(
                "stopped after {} growth passes without reaching porosity {} (current {:.4})",
                iterations, target, porosity
            );
        }
        Ok(TuningReport {
            initial_porosity,
            porosity,
            iterations,
            growth_factor: factor,
            converged,
        })
    }

    /// Rebuilds the neighbor graph from the current sphere positions.
    pub fn connect_neighbors(&mut self) {
        self.neighbors = NeighborGraph::from_proximity(&self.spheres);
        debug!("connected {} neighbor pairs", self.neighbors.edge_count());
    }

    /// Records spheres `a` and `b` as neighbors of each other.
    pub fn add_neighbor(&mut self, a: usize, b: usize) {
        self.neighbors.ensure_count(self.spheres.len());
        self.neighbors.add(a, b);
    }

    /// Monte-Carlo estimate of the specific surface area.
    ///
    /// Every sphere contributes `test_points` surface samples; a sample counts as
    /// free unless it lies inside the inner ball of one of the sphere's neighbors.
    /// The neighbor graph is rebuilt first when it does not cover every sphere.
    /// `Sv = 4 pi rho r_mean² accepted / (n (test_points - 1))` with `rho = n / V`.
    pub fn specific_surface(&mut self, test_points: usize) -> Result<f64> {
        let n = self.spheres.len();
        if n == 0 {
            return Err(Error::EmptySphereList);
        }
        if test_points < 2 {
            return Err(Error::invalid_config("at least two test points per sphere are required"));
        }
        if self.neighbors.len() != n {
            self.connect_neighbors();
        }

        let spheres = &self.spheres;
        let neighbors = &self.neighbors;
        let accepted: u64 = spheres
            .par_iter()
            .enumerate()
            .map(|(i, sphere)| {
                sphere
                    .sample_points(test_points)
                    .iter()
                    .filter(|p| !neighbors.neighbors(i).any(|j| spheres[j].contains_inner(p)))
                    .count() as u64
            })
            .sum();

        let rho = n as f64 / self.space.domain_volume();
        let r_mean = self.mean_outer_radius();
        let sv = 4.0 * PI * rho * r_mean * r_mean * accepted as f64 / (n as f64 * (test_points - 1) as f64);
        debug!("specific surface: {} accepted samples, Sv = {}", accepted, sv);
        Ok(sv)
    }
}
