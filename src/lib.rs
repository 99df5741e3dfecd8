//! Free-floating chart annotations with optional swoopy connector arrows.
//!
//! The core lives in [`annotate`]: pure conversions between chart data space,
//! pixel space, and percent-of-chart-size space, scale inversion for placing
//! annotations at a pointer position, and SVG arc paths for the arrows.
//! [`renderer`] draws a scene (data, scales, annotations) to an SVG string on
//! top of that core.

pub mod annotate;
pub mod fonts;
pub mod renderer;
pub mod theme;
pub mod xml;
