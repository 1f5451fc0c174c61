//! Light sources.

use glint_math::{Color, Vec3};
use serde::Deserialize;

/// A light source. Scene order is significant: lights are shaded in the
/// order they were added.
///
/// In scene files lights are tagged by type:
///
/// ```json
/// { "type": "point", "position": [0, 4, 0], "intensity": [10, 10, 10] }
/// { "type": "directional", "direction": [0, 1, 0], "intensity": [1, 1, 1] }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Light {
    /// Omnidirectional light with inverse-square falloff.
    Point { position: Vec3, intensity: Color },

    /// Light at infinity. `direction` points from the surface toward the
    /// light and need not be normalized.
    Directional { direction: Vec3, intensity: Color },
}

impl Light {
    /// Create a point light.
    pub fn point(position: Vec3, intensity: Color) -> Self {
        Light::Point {
            position,
            intensity,
        }
    }

    /// Create a directional light.
    pub fn directional(direction: Vec3, intensity: Color) -> Self {
        Light::Directional {
            direction,
            intensity,
        }
    }

    /// Radiant intensity (RGB).
    pub fn intensity(&self) -> Color {
        match *self {
            Light::Point { intensity, .. } | Light::Directional { intensity, .. } => intensity,
        }
    }

    /// Unnormalized vector from `point` toward the light and the
    /// attenuation factor for it.
    ///
    /// Point lights fall off as `1 / |l|^2`; directional lights do not
    /// attenuate.
    pub fn incident(&self, point: Vec3) -> (Vec3, f32) {
        match *self {
            Light::Point { position, .. } => {
                let l = position - point;
                (l, 1.0 / l.dot(l))
            }
            Light::Directional { direction, .. } => (direction, 1.0),
        }
    }

    /// How far a shadow ray toward this light has to travel before an
    /// occluder stops counting. Infinite for directional lights.
    pub fn distance_from(&self, point: Vec3) -> f32 {
        match *self {
            Light::Point { position, .. } => (position - point).length(),
            Light::Directional { .. } => f32::INFINITY,
        }
    }
}
