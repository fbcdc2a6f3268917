//! Obstacle inference from a flat painted background.
//!
//! The background is cut into square cells; a cell that is mostly
//! transparent (water or void around the painted island) becomes an
//! obstacle, grown by a small margin and kept inside the image.

use bevy::prelude::*;
use std::path::Path;

use crate::config::InferenceConfig;
use crate::shared::*;

/// Row-major alpha channel of a decoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMask {
    pub width: u32,
    pub height: u32,
    pub alpha: Vec<u8>,
}

impl AlphaMask {
    pub fn new(width: u32, height: u32, alpha: Vec<u8>) -> Self {
        Self {
            width,
            height,
            alpha,
        }
    }

    /// Decodes a PNG and keeps only its alpha channel.
    pub fn load(path: &Path) -> Result<Self, FarmError> {
        let image = image::ImageReader::open(path)
            .map_err(|e| FarmError::AssetMissing(format!("{}: {e}", path.display())))?
            .decode()
            .map_err(|e| FarmError::AssetMissing(format!("{}: {e}", path.display())))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        let alpha = image.pixels().map(|p| p.0[3]).collect();
        Ok(Self::new(width, height, alpha))
    }

    fn opaque_in(&self, left: u32, top: u32, w: u32, h: u32, threshold: u8) -> u32 {
        let mut count = 0;
        for y in top..top + h {
            let row = (y * self.width) as usize;
            for x in left..left + w {
                if self.alpha.get(row + x as usize).copied().unwrap_or(0) > threshold {
                    count += 1;
                }
            }
        }
        count
    }
}

/// Returns an obstacle for every cell whose opaque-pixel ratio is below
/// `config.solid_ratio`. `cell` is clamped up to `config.min_cell`.
pub fn infer_obstacles(mask: &AlphaMask, cell: u32, config: &InferenceConfig) -> Vec<Rect> {
    let cell = cell.max(config.min_cell).max(1);
    let bounds = Rect::new(0.0, 0.0, mask.width as f32, mask.height as f32);
    let mut obstacles = Vec::new();

    for top in (0..mask.height).step_by(cell as usize) {
        let h = cell.min(mask.height - top);
        for left in (0..mask.width).step_by(cell as usize) {
            let w = cell.min(mask.width - left);
            let area = w * h;
            if area == 0 {
                continue;
            }
            let ratio = mask.opaque_in(left, top, w, h, config.alpha_threshold) as f32 / area as f32;
            if ratio < config.solid_ratio {
                let rect = rect_xywh(left as f32, top as f32, w as f32, h as f32);
                let grown = inflate_rect(rect, config.margin, config.margin);
                obstacles.push(clamp_rect_inside(grown, bounds));
            }
        }
    }

    obstacles
}
