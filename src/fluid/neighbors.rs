//! Neighbor candidates for the relaxation solver.

use bevy::prelude::*;

use super::particle::Particle;
use super::spatial::SpatialGrid;

/// Strategy for finding a particle's neighbors.
#[derive(Clone, Copy, Debug)]
pub enum NeighborQuery<'a> {
    /// Scan every particle and keep those within `radius`.
    BruteForce { radius: f32 },
    /// Use the particle's own grid bucket as is.
    Grid(&'a SpatialGrid),
}

impl<'a> NeighborQuery<'a> {
    /// Picks grid lookup when a grid is present.
    pub fn new(radius: f32, grid: Option<&'a SpatialGrid>) -> Self {
        match grid {
            Some(grid) => NeighborQuery::Grid(grid),
            None => NeighborQuery::BruteForce { radius },
        }
    }

    /// Indices of the candidate neighbors of `particles[index]`, in particle
    /// order.
    ///
    /// Brute force excludes any particle at exactly the same position as the
    /// query, which also drops a distinct particle sitting on top of it. Grid
    /// mode returns the whole bucket, the queried particle included, and an
    /// empty set for a particle outside the grid.
    pub fn neighbors(&self, index: usize, particles: &[Particle]) -> Vec<usize> {
        let Some(particle) = particles.get(index) else {
            return Vec::new();
        };
        match *self {
            NeighborQuery::BruteForce { radius } => {
                brute_force(particle.position, particles, radius)
            }
            NeighborQuery::Grid(grid) => grid.cell_of(particle).to_vec(),
        }
    }

    /// Same as [`neighbors`](Self::neighbors) without collecting.
    pub fn has_neighbors(&self, index: usize, particles: &[Particle]) -> bool {
        let Some(particle) = particles.get(index) else {
            return false;
        };
        match *self {
            NeighborQuery::BruteForce { radius } => particles
                .iter()
                .any(|other| is_within(particle.position, other.position, radius)),
            NeighborQuery::Grid(grid) => !grid.cell_of(particle).is_empty(),
        }
    }
}

fn brute_force(position: Vec2, particles: &[Particle], radius: f32) -> Vec<usize> {
    particles
        .iter()
        .enumerate()
        .filter(|(_, other)| is_within(position, other.position, radius))
        .map(|(j, _)| j)
        .collect()
}

#[inline]
fn is_within(position: Vec2, other: Vec2, radius: f32) -> bool {
    position.distance(other) < radius && other != position
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particles_at(positions: &[Vec2]) -> Vec<Particle> {
        positions.iter().copied().map(Particle::new).collect()
    }

    #[test]
    fn test_brute_force_radius() {
        let particles = particles_at(&[
            Vec2::ZERO,
            Vec2::new(0.5, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 2.0),
        ]);
        let query = NeighborQuery::new(1.0, None);

        // Exactly at the radius is out.
        assert_eq!(query.neighbors(0, &particles), vec![1]);
        assert_eq!(query.neighbors(1, &particles), vec![0, 2]);
        assert!(query.neighbors(3, &particles).is_empty());
        assert!(!query.has_neighbors(3, &particles));
    }

    #[test]
    fn test_brute_force_excludes_coincident_particles() {
        let particles = particles_at(&[Vec2::ZERO, Vec2::ZERO, Vec2::new(0.1, 0.0)]);
        let query = NeighborQuery::new(1.0, None);

        assert_eq!(query.neighbors(0, &particles), vec![2]);
        assert_eq!(query.neighbors(1, &particles), vec![2]);
        assert_eq!(query.neighbors(2, &particles), vec![0, 1]);
    }

    #[test]
    fn test_grid_returns_own_bucket() {
        let mut particles = particles_at(&[
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-0.1, -0.1),
        ]);
        let mut grid = SpatialGrid::new(2.0, 2);
        grid.rebuild(&mut particles);
        let query = NeighborQuery::new(0.5, Some(&grid));

        // Bucket contents regardless of distance, self included.
        assert_eq!(query.neighbors(0, &particles), vec![0, 2]);
        assert_eq!(query.neighbors(1, &particles), vec![1]);
        assert!(query.has_neighbors(1, &particles));
    }

    #[test]
    fn test_grid_outside_particle_has_no_neighbors() {
        let mut particles = particles_at(&[Vec2::new(5.0, 0.0), Vec2::new(4.9, 0.0)]);
        let mut grid = SpatialGrid::new(2.0, 2);
        grid.rebuild(&mut particles);
        let query = NeighborQuery::Grid(&grid);

        assert!(query.neighbors(0, &particles).is_empty());
        assert!(!query.has_neighbors(0, &particles));
    }

    #[test]
    fn test_grid_matches_brute_force_in_one_cell() {
        let mut particles = particles_at(&[
            Vec2::new(0.2, 0.2),
            Vec2::new(0.5, 0.4),
            Vec2::new(0.9, 0.1),
        ]);
        let mut grid = SpatialGrid::new(2.0, 2);
        grid.rebuild(&mut particles);

        let brute = NeighborQuery::new(1.0, None);
        let gridded = NeighborQuery::new(1.0, Some(&grid));

        for i in 0..particles.len() {
            let mut expected = brute.neighbors(i, &particles);
            expected.push(i);
            expected.sort_unstable();
            assert_eq!(gridded.neighbors(i, &particles), expected);
        }
    }
}
