//! Occupancy grid race tracks
//!
//! One cell per unit. Cells marked as wall are hits for wall rays; points
//! outside the grid end a cast as a miss.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::sensor::{Boundary, FieldBounds, HitTest};

#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    walls: Vec<bool>,
    /// Where and which way a vehicle starts
    pub start: (DVec2, f64),
}

impl OccupancyGrid {
    /// Build from a predicate over cell centers
    pub fn from_fn(width: usize, height: usize, mut is_wall: impl FnMut(DVec2) -> bool) -> Self {
        let mut walls = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                walls.push(is_wall(DVec2::new(x as f64 + 0.5, y as f64 + 0.5)));
            }
        }
        Self {
            width,
            height,
            walls,
            start: (DVec2::new(width as f64 / 2.0, height as f64 / 2.0), 90f64.to_radians()),
        }
    }

    /// Ring-shaped track around the grid center with seeded wobble in its
    /// inner and outer walls
    pub fn ring(width: usize, height: usize, lane_width: f64, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let center = DVec2::new(width as f64 / 2.0, height as f64 / 2.0);
        let outer_base = (width.min(height) as f64 / 2.0) - 10.0;
        let inner_base = (outer_base - lane_width).max(1.0);

        // low-frequency radial wobble: a few sine harmonics with random phase
        let harmonics: Vec<(f64, f64, f64)> = (2..5)
            .map(|k| (k as f64, rng.random_range(0.0..TAU), rng.random_range(0.0..=lane_width * 0.08)))
            .collect();
        let wobble = move |theta: f64| -> f64 {
            harmonics
                .iter()
                .map(|(k, phase, amp)| amp * (k * theta + phase).sin())
                .sum()
        };

        let mut grid = Self::from_fn(width, height, |p| {
            let offset = p - center;
            let r = offset.length();
            let theta = offset.x.atan2(offset.y);
            let w = wobble(theta);
            r >= outer_base + w || r <= inner_base + w
        });

        // start on the +x side of the lane, heading along +y (counter-clockwise)
        let start_theta = std::f64::consts::FRAC_PI_2;
        let mid = (outer_base + inner_base) / 2.0 + wobble(start_theta);
        grid.start = (center + DVec2::new(mid, 0.0), 0.0);
        log::info!(
            "Generated ring track {}x{} (lane {:.0}, seed {})",
            width,
            height,
            lane_width,
            seed
        );
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> FieldBounds {
        FieldBounds::new(self.width as f64, self.height as f64)
    }

    /// Wall lookup; anything outside the grid counts as wall
    pub fn is_wall(&self, p: DVec2) -> bool {
        if p.x < 0.0 || p.y < 0.0 {
            return true;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        if x >= self.width || y >= self.height {
            return true;
        }
        self.walls[y * self.width + x]
    }
}

impl Boundary for OccupancyGrid {
    fn contains(&self, p: DVec2) -> bool {
        self.bounds().contains(p)
    }
}

impl HitTest for OccupancyGrid {
    fn is_hit(&self, p: DVec2) -> bool {
        self.is_wall(p)
    }
}
