//! Decorative river particles
//!
//! Same spawn / move / destroy pattern as obstacles, without collision.
//! Purely cosmetic: nothing here feeds back into the session.

use std::collections::VecDeque;

use glam::Vec3;
use rand::Rng;

use super::state::EntityId;
use crate::config::RiverConfig;
use crate::error::SimResult;
use crate::present::{Color, Command, Material, Transform, VisualKind};

/// Palette for water droplets
const WATER_COLORS: [Color; 4] = [Color::Blue, Color::Azure, Color::Cyan, Color::Turquoise];

#[derive(Debug, Clone)]
pub struct WaterParticle {
    pub id: EntityId,
    pub pos: Vec3,
    pub dir: Vec3,
    pub speed: f32,
    /// Seconds left before the particle is destroyed
    pub life: f32,
}

/// A stream of particles emitted every frame
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: RiverConfig,
    particles: VecDeque<WaterParticle>,
    next_id: EntityId,
}

impl ParticleField {
    pub fn new(config: RiverConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            particles: VecDeque::new(),
            next_id: 1,
        })
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> impl Iterator<Item = &WaterParticle> {
        self.particles.iter()
    }

    /// Move live particles, expire dead ones, then emit this frame's batch
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> SimResult<Vec<Command>> {
        crate::check_dt(dt)?;
        let mut commands = Vec::new();
        if dt == 0.0 {
            return Ok(commands);
        }

        self.particles.retain_mut(|p| {
            p.pos += p.dir * p.speed * dt;
            p.life -= dt;
            if p.life <= 0.0 {
                commands.push(Command::Destroy { entity: p.id });
                false
            } else {
                commands.push(Command::Move {
                    entity: p.id,
                    position: p.pos,
                });
                true
            }
        });

        for _ in 0..self.config.particles_per_frame {
            if self.particles.len() >= self.config.max_particles {
                match self.particles.pop_front() {
                    Some(oldest) => commands.push(Command::Destroy { entity: oldest.id }),
                    None => break,
                }
            }
            commands.push(self.emit(rng));
        }

        Ok(commands)
    }

    fn emit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Command {
        let cfg = &self.config;
        let offset = Vec3::new(
            rng.random_range(-cfg.lateral_jitter..=cfg.lateral_jitter),
            0.0,
            rng.random_range(-cfg.depth_jitter..=cfg.depth_jitter),
        );
        let pos = cfg.start_pos + offset;
        let dir = Vec3::new(0.0, 0.0, rng.random_range(0.5..=1.0));
        let speed = rng.random_range(cfg.min_speed..=cfg.max_speed);
        let size = rng.random_range(0.1..=0.3);
        let alpha = rng.random_range(0.5..=0.8);
        let color = WATER_COLORS[rng.random_range(0..WATER_COLORS.len())];

        let id = self.next_id;
        self.next_id += 1;
        self.particles.push_back(WaterParticle {
            id,
            pos,
            dir,
            speed,
            life: cfg.lifetime,
        });

        Command::Spawn {
            entity: id,
            kind: VisualKind::WaterParticle,
            transform: Transform {
                position: pos,
                scale: Vec3::splat(size),
            },
            material: Material { color, alpha },
        }
    }
}
