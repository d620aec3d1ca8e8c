use std::{f32::consts::TAU, mem::offset_of, ops::RangeInclusive};

use glam::{Vec2, Vec4};
use rand::Rng;

pub const PARTICLE_COUNT: u32 = 1000;
/// Upper bound accepted on the command line, keeps the host copy at 32 MiB
pub const MAX_PARTICLES: u32 = 1 << 20;

/// Half-width of the square particles spawn in
pub const SPAWN_EXTENT: f32 = 0.8;
/// Half-width of the square particles wrap around in (normalized device space)
#[cfg(test)]
pub const DOMAIN_EXTENT: f32 = 1.0;

pub const COLOR_RANGE: RangeInclusive<f32> = 0.6..=1.0;
pub const SPEED_RANGE: RangeInclusive<f32> = 0.002..=0.006;

/// A single point, laid out to match `Particle` in `motion.wgsl`.
///
/// Only `position` changes after spawning.
#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Vec4,
}

const _: () = assert!(
    std::mem::size_of::<Particle>() == 32,
    "size of Particle does not match WGSL"
);
const _: () = assert!(
    offset_of!(Particle, velocity) == 8,
    "offset of Particle.velocity does not match WGSL"
);
const _: () = assert!(
    offset_of!(Particle, color) == 16,
    "offset of Particle.color does not match WGSL"
);

impl Particle {
    pub const STRIDE: u64 = std::mem::size_of::<Particle>() as u64;
    pub const POSITION_OFFSET: u64 = offset_of!(Particle, position) as u64;
    pub const COLOR_OFFSET: u64 = offset_of!(Particle, color) as u64;

    pub fn random(rng: &mut impl Rng) -> Self {
        let position = Vec2::new(
            rng.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
            rng.gen_range(-SPAWN_EXTENT..=SPAWN_EXTENT),
        );
        let color = Vec4::new(
            rng.gen_range(COLOR_RANGE),
            rng.gen_range(COLOR_RANGE),
            rng.gen_range(COLOR_RANGE),
            1.0,
        );

        let speed = rng.gen_range(SPEED_RANGE);
        let angle = rng.gen_range(0.0..TAU);

        Self {
            position,
            velocity: Vec2::from_angle(angle) * speed,
            color,
        }
    }

    /// Host mirror of the `motion.wgsl` kernel: one step, then wrap each
    /// axis to the opposite edge.
    #[cfg(test)]
    pub fn advance(&mut self) {
        self.position += self.velocity;

        self.position.x = wrap(self.position.x);
        self.position.y = wrap(self.position.y);
    }
}

#[cfg(test)]
fn wrap(mut value: f32) -> f32 {
    if value > DOMAIN_EXTENT {
        value = -DOMAIN_EXTENT;
    }
    if value < -DOMAIN_EXTENT {
        value = DOMAIN_EXTENT;
    }

    value
}

pub fn generate_particles(rng: &mut impl Rng, num_particles: u32) -> Vec<Particle> {
    (0..num_particles).map(|_| Particle::random(rng)).collect()
}

#[cfg(test)]
pub fn advance_all(particles: &mut [Particle]) {
    particles.iter_mut().for_each(Particle::advance);
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn particle_at(position: Vec2, velocity: Vec2) -> Particle {
        Particle {
            position,
            velocity,
            color: Vec4::ONE,
        }
    }

    #[test]
    fn spawn_positions_stay_inside_the_spawn_square() {
        let particles = generate_particles(&mut StdRng::seed_from_u64(1), PARTICLE_COUNT);

        for p in &particles {
            assert!((-SPAWN_EXTENT..=SPAWN_EXTENT).contains(&p.position.x), "{p:?}");
            assert!((-SPAWN_EXTENT..=SPAWN_EXTENT).contains(&p.position.y), "{p:?}");
        }
    }

    #[test]
    fn spawn_colors_are_light_and_opaque() {
        let particles = generate_particles(&mut StdRng::seed_from_u64(2), PARTICLE_COUNT);

        for p in &particles {
            assert!(COLOR_RANGE.contains(&p.color.x), "{p:?}");
            assert!(COLOR_RANGE.contains(&p.color.y), "{p:?}");
            assert!(COLOR_RANGE.contains(&p.color.z), "{p:?}");
            assert_eq!(p.color.w, 1.0);
        }
    }

    #[test]
    fn spawn_speeds_are_in_range() {
        let particles = generate_particles(&mut StdRng::seed_from_u64(3), PARTICLE_COUNT);

        // cos/sin rounding can push the length a hair past the bounds
        const EPSILON: f32 = 1e-7;
        for p in &particles {
            let speed = p.velocity.length();
            assert!(
                speed >= SPEED_RANGE.start() - EPSILON && speed <= SPEED_RANGE.end() + EPSILON,
                "speed {speed} out of range"
            );
        }
    }

    #[test]
    fn spawn_directions_are_uniform() {
        const SAMPLES: usize = 100_000;
        const BUCKETS: usize = 16;

        let mut rng = StdRng::seed_from_u64(4);
        let mut histogram = [0usize; BUCKETS];
        for _ in 0..SAMPLES {
            let velocity = Particle::random(&mut rng).velocity;
            let angle = velocity.y.atan2(velocity.x).rem_euclid(TAU);
            let bucket = ((angle / TAU) * BUCKETS as f32) as usize;
            histogram[bucket.min(BUCKETS - 1)] += 1;
        }

        let expected = SAMPLES / BUCKETS;
        let tolerance = expected / 12;
        for (i, count) in histogram.iter().enumerate() {
            assert!(
                count.abs_diff(expected) <= tolerance,
                "bucket {i} has {count} samples, expected about {expected}"
            );
        }
    }

    #[test]
    fn color_and_velocity_never_change() {
        let spawned = generate_particles(&mut StdRng::seed_from_u64(5), PARTICLE_COUNT);
        let mut particles = spawned.clone();

        for _ in 0..2000 {
            advance_all(&mut particles);
        }

        assert_eq!(particles.len(), PARTICLE_COUNT as usize);
        for (now, then) in particles.iter().zip(&spawned) {
            assert_eq!(now.color, then.color);
            assert_eq!(now.velocity, then.velocity);
            assert!(now.position.abs().max_element() <= DOMAIN_EXTENT);
        }
    }

    #[test]
    fn crossing_the_right_edge_wraps_to_the_left() {
        let mut p = particle_at(Vec2::new(0.999, 0.0), Vec2::new(0.01, 0.0));
        p.advance();

        assert_eq!(p.position.x, -1.0);
        assert!((p.position.x - (-1.0 + 0.009)).abs() < 0.01);
        assert_eq!(p.position.y, 0.0);
    }

    #[test]
    fn crossing_the_left_edge_wraps_to_the_right() {
        let mut p = particle_at(Vec2::new(-0.999, 0.5), Vec2::new(-0.01, 0.0));
        p.advance();

        assert_eq!(p.position, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn crossing_vertical_edges_wraps() {
        let mut top = particle_at(Vec2::new(0.25, 0.998), Vec2::new(0.0, 0.005));
        let mut bottom = particle_at(Vec2::new(0.25, -0.998), Vec2::new(0.0, -0.005));
        top.advance();
        bottom.advance();

        assert_eq!(top.position, Vec2::new(0.25, -1.0));
        assert_eq!(bottom.position, Vec2::new(0.25, 1.0));
    }

    #[test]
    fn landing_exactly_on_an_edge_does_not_wrap() {
        let mut p = particle_at(Vec2::new(0.5, 0.0), Vec2::new(0.5, 0.0));
        p.advance();

        assert_eq!(p.position.x, 1.0);
    }

    #[test]
    fn one_tick_moves_each_particle_by_its_velocity() {
        let spawned = generate_particles(&mut StdRng::seed_from_u64(0xB01D), 4);
        let mut particles = spawned.clone();

        advance_all(&mut particles);

        assert_eq!(particles.len(), 4);
        for (now, then) in particles.iter().zip(&spawned) {
            assert_eq!(now.position, then.position + then.velocity);
        }
    }

    #[test]
    fn same_seed_spawns_same_particles() {
        let a = generate_particles(&mut StdRng::seed_from_u64(9), 16);
        let b = generate_particles(&mut StdRng::seed_from_u64(9), 16);

        assert_eq!(a, b);
    }
}
