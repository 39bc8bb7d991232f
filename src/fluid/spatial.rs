//! Uniform grid for neighbor search.
//!
//! The grid covers the square `[-R, R)²` with `n × n` equal cells and is
//! rebuilt from scratch every frame. Cell ids are row-major with x as the
//! outer index: `id = ix * n + iy`. Intervals are half-open, so a particle
//! sitting exactly on a cell edge belongs to the cell starting at that edge,
//! and a particle at `+R` is outside the grid.
//!
//! In grid mode the neighbor set of a particle is its own bucket, the particle
//! itself included. Neighbors closer than `h` that fall in an adjacent cell
//! are missed. This keeps the lookup O(1) at the cost of accuracy near cell
//! edges; choose cells at least `h` wide to limit the error.

use bevy::prelude::*;

use super::particle::Particle;

/// Uniform bucket grid over the simulation domain.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    /// Half-extent of the covered domain.
    half_extent: f32,
    /// Cells per axis.
    cells_per_axis: usize,
    /// Side length of one cell.
    cell_size: f32,
    /// Cell id -> particle indices, in particle order.
    buckets: Vec<Vec<usize>>,
}

impl SpatialGrid {
    /// Create an empty grid. `cells_per_axis` must be positive and
    /// `half_extent` finite and positive; the simulation validates both.
    pub fn new(half_extent: f32, cells_per_axis: usize) -> Self {
        let cells_per_axis = cells_per_axis.max(1);
        Self {
            half_extent,
            cells_per_axis,
            cell_size: 2.0 * half_extent / cells_per_axis as f32,
            buckets: vec![Vec::new(); cells_per_axis * cells_per_axis],
        }
    }

    pub fn cells_per_axis(&self) -> usize {
        self.cells_per_axis
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    /// Total number of buckets.
    pub fn cell_count(&self) -> usize {
        self.buckets.len()
    }

    /// Cell id for a position, or `None` outside `[-R, R)²`.
    pub fn cell_index(&self, position: Vec2) -> Option<usize> {
        let ix = self.axis_index(position.x)?;
        let iy = self.axis_index(position.y)?;
        Some(ix * self.cells_per_axis + iy)
    }

    fn axis_index(&self, coordinate: f32) -> Option<usize> {
        if !(coordinate >= -self.half_extent && coordinate < self.half_extent) {
            return None;
        }
        // `coordinate + R` can round up to `2R` just below the upper edge.
        let local = coordinate + self.half_extent;
        let index = (local / self.cell_size).floor() as usize;
        Some(index.min(self.cells_per_axis - 1))
    }

    /// Empty every bucket, keeping their allocations.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Clear the grid and bucket every particle by its current position.
    ///
    /// Each particle's `cell_id` is updated; particles outside the domain get
    /// `None` and are not placed in any bucket. Returns how many were left
    /// out.
    pub fn rebuild(&mut self, particles: &mut [Particle]) -> usize {
        self.clear();
        let mut outside = 0;
        for (i, particle) in particles.iter_mut().enumerate() {
            particle.cell_id = self.cell_index(particle.position);
            match particle.cell_id {
                Some(cell) => self.buckets[cell].push(i),
                None => outside += 1,
            }
        }
        outside
    }

    /// Particles bucketed in the given cell.
    pub fn bucket(&self, cell: usize) -> &[usize] {
        self.buckets.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The bucket a particle was placed in on the last rebuild. Empty when the
    /// particle was outside the grid.
    pub fn cell_of(&self, particle: &Particle) -> &[usize] {
        match particle.cell_id {
            Some(cell) => self.bucket(cell),
            None => &[],
        }
    }

    /// Number of non-empty buckets.
    pub fn occupied_cells(&self) -> usize {
        self.buckets.iter().filter(|bucket| !bucket.is_empty()).count()
    }
}
