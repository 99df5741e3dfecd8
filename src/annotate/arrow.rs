use std::f64::consts::{FRAC_PI_2, PI};

use super::types::Point;

// Keeps the arc away from the degenerate angles 0 and pi, where the
// circumscribed radius is undefined or infinite.
const ANGLE_EPSILON: f64 = 1e-6;

/// Curvature configuration for a connector arrow, passed by value into the
/// path builder. `clockwise: None` means a straight line; `angle` is the
/// opening angle the chord subtends at the arc's center, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcStyle {
    pub clockwise: Option<bool>,
    pub angle: f64,
}

impl Default for ArcStyle {
    fn default() -> Self {
        Self {
            clockwise: None,
            angle: FRAC_PI_2,
        }
    }
}

impl ArcStyle {
    pub fn straight() -> Self {
        Self::default()
    }

    pub fn curved(clockwise: bool) -> Self {
        Self {
            clockwise: Some(clockwise),
            ..Self::default()
        }
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }
}

/// Build the SVG path for an arrow between two pixel points.
///
/// Straight arrows emit a plain move + line. Curved arrows emit a relative
/// elliptical-arc command whose radius is derived from the chord length and
/// the configured opening angle: the default quarter-circle-ish sweep at
/// `angle = pi/2`, flatter and longer-radius as the angle shrinks.
pub fn arrow_path(source: Point, target: Point, style: &ArcStyle) -> String {
    let Some(clockwise) = style.clockwise else {
        return format!("M {},{} L {},{}", source.x, source.y, target.x, target.y);
    };

    let angle = style.angle.clamp(ANGLE_EPSILON, PI - ANGLE_EPSILON);

    let dx = target.x - source.x;
    let dy = target.y - source.y;
    let chord = dx.hypot(dy);

    // Distance from the chord at which it subtends `angle`, then the
    // circumscribed radius through both endpoints.
    let distance = chord / (2.0 * (angle / 2.0).tan());
    let radius = distance.hypot(chord / 2.0);

    format!(
        "M {},{} a {},{} 0 0,{} {},{}",
        source.x,
        source.y,
        radius,
        radius,
        if clockwise { 1 } else { 0 },
        dx,
        dy,
    )
}
