/// Generic axis-aligned bounding box for N-dimensional space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: [f64; D],
    pub max: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all `points`. Returns `None` for an empty iterator.
    pub fn around<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; D]>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::new(first, first);
        for p in iter {
            for axis in 0..D {
                bounds.min[axis] = bounds.min[axis].min(p[axis]);
                bounds.max[axis] = bounds.max[axis].max(p[axis]);
            }
        }
        Some(bounds)
    }

    /// Checks whether `point` lies inside the box, boundary included.
    pub fn contains(&self, point: &[f64; D]) -> bool {
        (0..D).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// Side length along `axis`.
    pub fn extent(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Product of all side lengths.
    pub fn volume(&self) -> f64 {
        (0..D).map(|axis| self.extent(axis)).product()
    }
}
