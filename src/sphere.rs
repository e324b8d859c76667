use crate::error::{Error, Result};
use crate::point::Point3D;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A sphere of the packing.
///
/// The inner radius is fixed at construction and drives generation, spacing and
/// neighbor thresholds. The outer radius is what gets rasterized; porosity tuning
/// grows it and it never drops below the inner radius.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    center: Point3D,
    inner_radius: f64,
    outer_radius: f64,
}

impl Sphere {
    pub fn new(center: Point3D, radius: f64) -> Self {
        Self {
            center,
            inner_radius: radius,
            outer_radius: radius,
        }
    }

    pub fn center(&self) -> &Point3D {
        &self.center
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    /// Sets the outer radius, rejecting values below the inner radius.
    pub fn set_outer_radius(&mut self, radius: f64) -> Result<()> {
        if radius < self.inner_radius {
            return Err(Error::RadiusBelowInner {
                inner: self.inner_radius,
                outer: radius,
            });
        }
        self.outer_radius = radius;
        Ok(())
    }

    /// Raises the outer radius to `radius` if that is larger.
    pub fn grow_outer_radius(&mut self, radius: f64) {
        if radius > self.outer_radius {
            self.outer_radius = radius;
        }
    }

    /// Moves the center by independent uniform offsets in `[-eps/2, eps/2]` per axis.
    /// No collision check is done.
    pub fn jitter<R: Rng>(&mut self, eps: f64, rng: &mut R) {
        let mut offset = || (-1.0 + 2.0 * rng.r#gen::<f64>()) * eps * 0.5;
        let (dx, dy, dz) = (offset(), offset(), offset());
        self.center.translate(dx, dy, dz);
    }

    /// Distance between the two inner surfaces. Negative values mean overlap.
    pub fn surface_distance_to(&self, other: &Sphere) -> f64 {
        self.center.distance(&other.center) - self.inner_radius - other.inner_radius
    }

    /// Checks whether `point` lies strictly inside the inner ball.
    pub fn contains_inner(&self, point: &Point3D) -> bool {
        self.center.distance(point) < self.inner_radius
    }

    /// Radius of the outer cross section in the plane `z = layer`, if the plane cuts the sphere.
    pub fn cross_section_radius(&self, layer: f64) -> Option<f64> {
        let h = (self.center.z - layer).abs();
        let r = self.outer_radius;
        if h <= r {
            Some((r * r - h * h).sqrt())
        } else {
            None
        }
    }

    /// Partitions the inner surface into roughly `count` patches of equal area and
    /// returns one point per patch.
    ///
    /// Latitude bands of height `d_theta` are laid out along the polar angle; each
    /// band is split into points evenly spaced in azimuth so that every patch has
    /// side length close to `sqrt(4 pi r^2 / count)`.
    pub fn sample_points(&self, count: usize) -> Vec<Point3D> {
        if count == 0 || self.inner_radius <= 0.0 {
            return Vec::new();
        }
        let r = self.inner_radius;
        let area = 4.0 * PI * r * r / count as f64;
        let d = area.sqrt();

        let m_theta = (PI * r / d).round() as usize;
        if m_theta == 0 {
            return Vec::new();
        }
        let d_theta = PI * r / m_theta as f64;
        let d_phi = area / d_theta;

        let mut points = Vec::with_capacity(count + m_theta);
        for m in 0..m_theta {
            let theta = PI * (m as f64 + 0.5) / m_theta as f64;
            let (sin_t, cos_t) = theta.sin_cos();
            let m_phi = (2.0 * PI * sin_t * r / d_phi).round() as usize;
            for n in 0..m_phi {
                let phi = 2.0 * PI * n as f64 / m_phi as f64;
                let (sin_p, cos_p) = phi.sin_cos();
                points.push(Point3D::new(
                    self.center.x + r * sin_t * cos_p,
                    self.center.y + r * sin_t * sin_p,
                    self.center.z + r * cos_t,
                ));
            }
        }
        points
    }
}
