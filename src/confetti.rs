use egui::{pos2, vec2, Color32, Painter, Pos2, Rect, Stroke};
use rand::Rng;

const PARTICLE_COUNT: usize = 100;
const MIN_DELAY: f32 = 0.0;
const MAX_DELAY: f32 = 0.5;
const MIN_DURATION: f32 = 2.0;
const MAX_DURATION: f32 = 4.0;
const PARTICLE_SIZE: f32 = 10.0;

const PALETTE: [Color32; 7] = [
    Color32::from_rgb(0xff, 0xc1, 0x07),
    Color32::from_rgb(0xe9, 0x1e, 0x63),
    Color32::from_rgb(0x9c, 0x27, 0xb0),
    Color32::from_rgb(0x21, 0x96, 0xf3),
    Color32::from_rgb(0x00, 0xbc, 0xd4),
    Color32::from_rgb(0x8b, 0xc3, 0x4a),
    Color32::from_rgb(0xff, 0x57, 0x22),
];

#[derive(Clone, Copy)]
enum ParticleShape {
    Square,
    Triangle,
    Ribbon,
}

struct Particle {
    start: Pos2,
    end: Pos2,
    color: Color32,
    shape: ParticleShape,
    delay: f32,
    duration: f32,
}

/// A one-shot celebration effect: particles rain from the upper half of
/// the area and fall past its bottom edge on staggered timers.
pub struct ConfettiBurst {
    particles: Vec<Particle>,
    elapsed: f32,
    lifetime: f32,
}

impl ConfettiBurst {
    pub fn new<R: Rng>(area: Rect, rng: &mut R) -> Self {
        let width = area.width();
        let height = area.height();
        let mut particles = Vec::with_capacity(PARTICLE_COUNT);
        for _ in 0..PARTICLE_COUNT {
            let shape_roll: f32 = rng.gen();
            let shape = if shape_roll < 0.3 {
                ParticleShape::Square
            } else if shape_roll < 0.6 {
                ParticleShape::Triangle
            } else {
                ParticleShape::Ribbon
            };
            particles.push(Particle {
                start: pos2(
                    area.min.x + rng.gen_range(0.0..width),
                    area.min.y + rng.gen_range(0.0..height * 0.5),
                ),
                // Wider spread than the area so pieces drift off both sides.
                end: pos2(
                    area.min.x + rng.gen_range(0.0..width * 1.5) - width * 0.25,
                    area.max.y + 50.0,
                ),
                color: PALETTE[rng.gen_range(0..PALETTE.len())],
                shape,
                delay: rng.gen_range(MIN_DELAY..MAX_DELAY),
                duration: rng.gen_range(MIN_DURATION..MAX_DURATION),
            });
        }
        Self {
            particles,
            elapsed: 0.0,
            lifetime: MAX_DELAY + MAX_DURATION,
        }
    }

    /// Advances the effect; returns false once every particle has
    /// fallen out.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        self.elapsed < self.lifetime
    }

    pub fn draw(&self, painter: &Painter) {
        for particle in &self.particles {
            let t = (self.elapsed - particle.delay) / particle.duration;
            if !(0.0..1.0).contains(&t) {
                continue;
            }
            let center = particle.start + (particle.end - particle.start) * t;
            let half = PARTICLE_SIZE * 0.5;
            match particle.shape {
                ParticleShape::Square => {
                    painter.rect_filled(
                        Rect::from_center_size(center, vec2(PARTICLE_SIZE, PARTICLE_SIZE)),
                        0.0,
                        particle.color,
                    );
                }
                ParticleShape::Triangle => {
                    painter.add(egui::epaint::PathShape::convex_polygon(
                        vec![
                            pos2(center.x, center.y - half),
                            pos2(center.x + half, center.y + half),
                            pos2(center.x - half, center.y + half),
                        ],
                        particle.color,
                        Stroke::NONE,
                    ));
                }
                ParticleShape::Ribbon => {
                    painter.rect_filled(
                        Rect::from_center_size(center, vec2(PARTICLE_SIZE * 0.6, PARTICLE_SIZE * 1.4)),
                        0.0,
                        particle.color,
                    );
                }
            }
        }
    }
}
