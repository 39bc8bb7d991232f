//! Wall collisions against the square simulation domain.
//!
//! The walls sit `wall_inset` inside the domain edge. Each of the four walls is
//! checked on its own against the particle's current position, so a particle
//! pushed back from one wall is checked again against the opposite one.

use bevy::prelude::*;

use super::params::{BoundaryPolicy, SimulationConfig};
use super::particle::Particle;

/// Keeps particles inside `[-wall, wall]²`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryResolver {
    /// Wall position on each axis.
    pub wall: f32,
    pub policy: BoundaryPolicy,
}

impl BoundaryResolver {
    pub fn new(half_extent: f32, wall_inset: f32, policy: BoundaryPolicy) -> Self {
        Self {
            wall: half_extent - wall_inset,
            policy,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.half_extent, config.wall_inset, config.boundary)
    }

    /// Check if a point is inside the walls.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x.abs() <= self.wall && point.y.abs() <= self.wall
    }

    /// Resolve wall collisions for one particle. Returns whether any wall was
    /// hit.
    pub fn resolve(&self, particle: &mut Particle) -> bool {
        let Particle {
            position,
            previous_position,
            velocity,
            ..
        } = particle;

        let hit_x = self.resolve_axis(&mut position.x, &mut previous_position.x, &mut velocity.x);
        let hit_y = self.resolve_axis(&mut position.y, &mut previous_position.y, &mut velocity.y);
        hit_x || hit_y
    }

    /// Resolve every particle. Returns how many touched a wall.
    pub fn resolve_all(&self, particles: &mut [Particle]) -> usize {
        particles
            .iter_mut()
            .map(|particle| self.resolve(particle))
            .filter(|&hit| hit)
            .count()
    }

    fn resolve_axis(&self, position: &mut f32, previous: &mut f32, velocity: &mut f32) -> bool {
        let mut hit = false;

        if *position > self.wall {
            self.push_back(position, previous, velocity, self.wall);
            hit = true;
        }
        if *position < -self.wall {
            self.push_back(position, previous, velocity, -self.wall);
            hit = true;
        }

        hit
    }

    fn push_back(&self, position: &mut f32, previous: &mut f32, velocity: &mut f32, wall: f32) {
        // Positions are clamped because the step may have started outside
        // the walls, or the mirrored overshoot may cross the opposite wall.
        match self.policy {
            BoundaryPolicy::Stop => {
                *position = previous.clamp(-self.wall, self.wall);
            }
            BoundaryPolicy::Bounce { restitution } => {
                // The previous position is placed after the clamp so that the
                // re-derived velocity comes out reversed.
                let travel = *position - *previous;
                *position = (2.0 * wall - *position).clamp(-self.wall, self.wall);
                *previous = *position + restitution * travel;
                *velocity = -*velocity * restitution;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving(from: Vec2, to: Vec2, dt: f32) -> Particle {
        let mut particle = Particle::new(to).with_velocity((to - from) / dt);
        particle.previous_position = from;
        particle
    }

    #[test]
    fn test_contains() {
        let boundary = BoundaryResolver::new(4.5, 0.25, BoundaryPolicy::Stop);

        assert!(boundary.contains(Vec2::new(4.25, -4.25)));
        assert!(!boundary.contains(Vec2::new(4.3, 0.0)));
    }

    #[test]
    fn test_stop_snaps_to_previous() {
        let boundary = BoundaryResolver::new(4.5, 0.25, BoundaryPolicy::Stop);
        let mut particle = moving(Vec2::new(4.2, 1.0), Vec2::new(4.4, 1.1), 0.1);

        assert!(boundary.resolve(&mut particle));

        assert_eq!(particle.position, Vec2::new(4.2, 1.1));
    }

    #[test]
    fn test_walls_are_checked_independently() {
        let boundary = BoundaryResolver::new(4.5, 0.25, BoundaryPolicy::Stop);
        let mut particle = moving(Vec2::new(-4.0, -4.0), Vec2::new(-4.6, -4.4), 0.1);

        boundary.resolve(&mut particle);

        assert_eq!(particle.position, Vec2::new(-4.0, -4.0));
    }

    #[test]
    fn test_stop_clamps_when_previous_is_outside() {
        let boundary = BoundaryResolver::new(4.5, 0.25, BoundaryPolicy::Stop);
        let mut particle = moving(Vec2::new(9.0, 0.0), Vec2::new(8.0, 0.0), 0.1);

        boundary.resolve(&mut particle);

        assert_eq!(particle.position.x, 4.25);
    }

    #[test]
    fn test_bounce_inverts_velocity() {
        let policy = BoundaryPolicy::Bounce { restitution: 1.0 };
        let boundary = BoundaryResolver::new(4.5, 0.25, policy);
        let dt = 0.1;
        let mut particle = moving(Vec2::new(0.0, -4.0), Vec2::new(0.0, -4.5), dt);

        assert!(boundary.resolve(&mut particle));

        assert!((particle.position.y + 4.0).abs() < 1e-5);
        assert!((particle.velocity.y - 5.0).abs() < 1e-4);
        // What the stepper will derive from the positions.
        let derived = (particle.position - particle.previous_position) / dt;
        assert!((derived.y - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounce_restitution_scales_rebound() {
        let policy = BoundaryPolicy::Bounce { restitution: 0.5 };
        let boundary = BoundaryResolver::new(4.5, 0.0, policy);
        let dt = 0.1;
        let mut particle = moving(Vec2::new(4.0, 0.0), Vec2::new(5.0, 0.0), dt);

        boundary.resolve(&mut particle);

        assert!((particle.position.x - 4.0).abs() < 1e-5);
        assert!((particle.velocity.x + 5.0).abs() < 1e-4);
        let derived = (particle.position - particle.previous_position) / dt;
        assert!((derived.x + 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounce_keeps_rebound_speed_when_clamped() {
        let policy = BoundaryPolicy::Bounce { restitution: 0.5 };
        let boundary = BoundaryResolver::new(4.5, 0.25, policy);
        let dt = 0.1;
        // The mirrored position lands far beyond the opposite wall.
        let mut particle = moving(Vec2::ZERO, Vec2::new(20.0, 0.0), dt);

        assert!(boundary.resolve(&mut particle));

        assert_eq!(particle.position.x, -4.25);
        assert!((particle.velocity.x + 100.0).abs() < 1e-3);
        let derived = (particle.position - particle.previous_position) / dt;
        assert!((derived.x + 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_positions_end_inside_domain() {
        let policies = [
            BoundaryPolicy::Stop,
            BoundaryPolicy::Bounce { restitution: 1.0 },
            BoundaryPolicy::Bounce { restitution: 0.0 },
        ];
        let starts = [
            (Vec2::ZERO, Vec2::new(20.0, -20.0)),
            (Vec2::new(10.0, 10.0), Vec2::new(12.0, -11.0)),
            (Vec2::new(-4.4, 4.4), Vec2::new(-4.6, 4.6)),
            (Vec2::new(1.0, 1.0), Vec2::new(1.5, 0.5)),
        ];

        for policy in policies {
            let boundary = BoundaryResolver::new(4.5, 0.25, policy);
            for (from, to) in starts {
                let mut particle = moving(from, to, 0.016);
                boundary.resolve(&mut particle);

                assert!(particle.position.x.abs() <= 4.5, "{policy:?} {from} -> {to}");
                assert!(particle.position.y.abs() <= 4.5, "{policy:?} {from} -> {to}");
            }
        }
    }

    #[test]
    fn test_resolve_all_counts_hits() {
        let boundary = BoundaryResolver::new(4.5, 0.25, BoundaryPolicy::Stop);
        let mut particles = vec![
            moving(Vec2::ZERO, Vec2::new(0.1, 0.0), 0.1),
            moving(Vec2::new(4.0, 0.0), Vec2::new(4.3, 0.0), 0.1),
            moving(Vec2::new(0.0, -4.0), Vec2::new(0.0, -4.3), 0.1),
        ];

        assert_eq!(boundary.resolve_all(&mut particles), 2);
    }
}
