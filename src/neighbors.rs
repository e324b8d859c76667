use crate::sphere::Sphere;
use crate::spatial::SphereGrid;
use std::collections::BTreeSet;

/// Undirected neighbor relation between spheres, keyed by index into the sphere list.
///
/// Adding an edge always records both directions and repeated additions are no-ops.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NeighborGraph {
    adjacency: Vec<BTreeSet<usize>>,
}

impl NeighborGraph {
    /// An edgeless graph over `count` spheres.
    pub fn with_count(count: usize) -> Self {
        Self {
            adjacency: vec![BTreeSet::new(); count],
        }
    }

    /// Connects every pair of spheres whose centers are closer than twice the sum
    /// of their inner radii (`4r` for equal spheres): close enough that a third
    /// sphere of comparable size could touch both.
    pub fn from_proximity(spheres: &[Sphere]) -> Self {
        let mut graph = Self::with_count(spheres.len());
        if spheres.is_empty() {
            return graph;
        }
        let max_radius = spheres.iter().map(Sphere::inner_radius).fold(0.0, f64::max);
        let centers: Vec<_> = spheres.iter().map(|s| *s.center()).collect();
        let grid = SphereGrid::new(&centers, 4.0 * max_radius);

        for (i, a) in spheres.iter().enumerate() {
            grid.visit_candidates(a.center(), |j| {
                if j <= i {
                    return;
                }
                let b = &spheres[j];
                let limit = 2.0 * (a.inner_radius() + b.inner_radius());
                if a.center().distance_sq(b.center()) < limit * limit {
                    graph.add(i, j);
                }
            });
        }
        graph
    }

    /// Number of spheres the graph was built for.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Extends the graph to cover at least `count` spheres.
    pub fn ensure_count(&mut self, count: usize) {
        if self.adjacency.len() < count {
            self.adjacency.resize(count, BTreeSet::new());
        }
    }

    /// Records `a` and `b` as neighbors of each other. Self loops are ignored.
    pub fn add(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.ensure_count(a.max(b) + 1);
        self.adjacency[a].insert(b);
        self.adjacency[b].insert(a);
    }

    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.get(index).into_iter().flat_map(|set| set.iter().copied())
    }

    pub fn degree(&self, index: usize) -> usize {
        self.adjacency.get(index).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.adjacency.get(a).is_some_and(|set| set.contains(&b))
    }

    /// Total number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }
}
