use super::scale::Scale;
use super::types::{Annotation, AnnotationBox, Arrow, ArrowSide, Point};

/// Box width when the annotation has no stored width.
pub const DEFAULT_ANNOTATION_WIDTH: f64 = 155.0;

/// Default pixel distance of an arrow handle from the annotation edge, so a
/// fresh arrow starts just outside the box instead of on top of the text.
pub const HANDLE_OFFSET_PX: f64 = 12.0;

/// Live scale state of the host chart: both scales plus the pixel size of
/// the plot area. Percent offsets are resolved against `width`/`height`.
#[derive(Debug, Clone)]
pub struct ChartScales {
    pub x: Scale,
    pub y: Scale,
    pub width: f64,
    pub height: f64,
}

/// Parse a CSS-style pixel size ("155px") into its numeric prefix.
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '-' && c != '+' && c != '.')
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Pixel bounding box of an annotation under the current scales.
pub fn annotation_box(anno: &Annotation, scales: &ChartScales) -> AnnotationBox {
    let left = scales.x.position(&anno.x) + anno.dx / 100.0 * scales.width;
    let top = scales.y.position(&anno.y) + anno.dy / 100.0 * scales.height;

    let width = anno
        .width
        .as_deref()
        .and_then(parse_px)
        .unwrap_or(DEFAULT_ANNOTATION_WIDTH);

    AnnotationBox { left, top, width }
}

/// Pixel position where an arrow leaves its annotation.
///
/// East arrows hang off the right edge, west arrows off the left; a missing
/// stored source falls back to the handle defaults. `anno_height` centers the
/// default y on the rendered box when known.
pub fn arrow_source(
    anno: &Annotation,
    arrow: &Arrow,
    scales: &ChartScales,
    anno_height: f64,
) -> Point {
    let b = annotation_box(anno, scales);

    let default_dx = match arrow.side {
        ArrowSide::West => -HANDLE_OFFSET_PX,
        ArrowSide::East => HANDLE_OFFSET_PX,
    };
    let source = arrow.source.unwrap_or_default();
    let dx = source.dx.unwrap_or(default_dx);
    let dy = source.dy.unwrap_or(anno_height / 2.0);

    let x = match arrow.side {
        ArrowSide::East => b.left + b.width + dx,
        ArrowSide::West => b.left + dx,
    };

    Point::new(x, b.top + dy)
}

/// Pixel position an arrow points at. The target lives in data space so it
/// tracks the chart; its percent offsets place it inside an ordinal band.
pub fn arrow_target(arrow: &Arrow, scales: &ChartScales) -> Point {
    Point::new(
        scales.x.position(&arrow.target.x) + arrow.target.dx / 100.0 * scales.width,
        scales.y.position(&arrow.target.y) + arrow.target.dy / 100.0 * scales.height,
    )
}

/// Edge-relative `dx` to store for a dragged arrow source. Exact inverse of
/// the `arrow_source` offset arithmetic for the given side.
pub fn source_dx_from_pixel(
    pixel_x: f64,
    anno: &Annotation,
    side: ArrowSide,
    scales: &ChartScales,
) -> f64 {
    let b = annotation_box(anno, scales);
    match side {
        ArrowSide::East => pixel_x - (b.left + b.width),
        ArrowSide::West => pixel_x - b.left,
    }
}

/// Top-relative `dy` to store for a dragged arrow source.
pub fn source_dy_from_pixel(pixel_y: f64, anno: &Annotation, scales: &ChartScales) -> f64 {
    pixel_y - annotation_box(anno, scales).top
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::types::{ArrowSource, ArrowTarget, DataValue};
    use proptest::prelude::*;

    fn scales() -> ChartScales {
        ChartScales {
            x: Scale::linear([0.0, 10.0], [0.0, 500.0]),
            y: Scale::linear([0.0, 100.0], [400.0, 0.0]),
            width: 500.0,
            height: 400.0,
        }
    }

    fn anno() -> Annotation {
        Annotation {
            id: 1,
            x: DataValue::Number(4.0),
            y: DataValue::Number(50.0),
            dx: 10.0,
            dy: -5.0,
            text: "note".to_string(),
            width: None,
            arrows: Vec::new(),
        }
    }

    fn east_arrow(source: Option<ArrowSource>) -> Arrow {
        Arrow {
            side: ArrowSide::East,
            clockwise: Some(true),
            source,
            target: ArrowTarget {
                x: DataValue::Number(8.0),
                y: DataValue::Number(20.0),
                dx: 0.0,
                dy: 0.0,
            },
        }
    }

    #[test]
    fn box_position_combines_data_space_and_percent_offsets() {
        let b = annotation_box(&anno(), &scales());
        // x: 4 of [0,10] -> 200px, plus 10% of 500
        assert_eq!(b.left, 250.0);
        // y: 50 of [0,100] over [400,0] -> 200px, minus 5% of 400
        assert_eq!(b.top, 180.0);
    }

    #[test]
    fn box_width_defaults_to_155() {
        assert_eq!(annotation_box(&anno(), &scales()).width, 155.0);

        let mut sized = anno();
        sized.width = Some("200px".to_string());
        assert_eq!(annotation_box(&sized, &scales()).width, 200.0);
    }

    #[test]
    fn parse_px_takes_the_numeric_prefix() {
        assert_eq!(parse_px("155px"), Some(155.0));
        assert_eq!(parse_px("72.5px"), Some(72.5));
        assert_eq!(parse_px(" 90 "), Some(90.0));
        assert_eq!(parse_px("px"), None);
    }

    #[test]
    fn default_source_sits_just_outside_the_edge() {
        let b = annotation_box(&anno(), &scales());

        let east = arrow_source(&anno(), &east_arrow(None), &scales(), 40.0);
        assert_eq!(east.x, b.left + b.width + HANDLE_OFFSET_PX);
        assert_eq!(east.y, b.top + 20.0);

        let mut west_arrow = east_arrow(None);
        west_arrow.side = ArrowSide::West;
        let west = arrow_source(&anno(), &west_arrow, &scales(), 40.0);
        assert_eq!(west.x, b.left - HANDLE_OFFSET_PX);
    }

    #[test]
    fn explicit_source_offsets_are_edge_relative() {
        let b = annotation_box(&anno(), &scales());
        let arrow = east_arrow(Some(ArrowSource {
            dx: Some(-3.0),
            dy: Some(7.0),
        }));

        let p = arrow_source(&anno(), &arrow, &scales(), 0.0);
        assert_eq!(p.x, b.left + b.width - 3.0);
        assert_eq!(p.y, b.top + 7.0);
    }

    #[test]
    fn target_resolves_data_space_plus_percent_offsets() {
        let mut arrow = east_arrow(None);
        arrow.target.dx = 2.0;
        arrow.target.dy = -1.0;

        let p = arrow_target(&arrow, &scales());
        // x: 8 of [0,10] -> 400px, plus 2% of 500
        assert_eq!(p.x, 410.0);
        // y: 20 of [0,100] over [400,0] -> 320px, minus 1% of 400
        assert_eq!(p.y, 316.0);
    }

    #[test]
    fn source_offsets_round_trip_through_the_inverses() {
        for side in [ArrowSide::East, ArrowSide::West] {
            let mut arrow = east_arrow(Some(ArrowSource {
                dx: Some(21.5),
                dy: Some(-8.25),
            }));
            arrow.side = side;

            let p = arrow_source(&anno(), &arrow, &scales(), 0.0);
            assert_eq!(source_dx_from_pixel(p.x, &anno(), side, &scales()), 21.5);
            assert_eq!(source_dy_from_pixel(p.y, &anno(), &scales()), -8.25);
        }
    }

    proptest! {
        #[test]
        fn round_trip_holds_for_arbitrary_offsets(
            dx in -500.0f64..500.0,
            dy in -500.0f64..500.0,
            east in any::<bool>(),
        ) {
            let side = if east { ArrowSide::East } else { ArrowSide::West };
            let mut arrow = east_arrow(Some(ArrowSource { dx: Some(dx), dy: Some(dy) }));
            arrow.side = side;

            let p = arrow_source(&anno(), &arrow, &scales(), 0.0);
            let dx_back = source_dx_from_pixel(p.x, &anno(), side, &scales());
            let dy_back = source_dy_from_pixel(p.y, &anno(), &scales());

            prop_assert!((dx_back - dx).abs() < 1e-9);
            prop_assert!((dy_back - dy).abs() < 1e-9);
        }
    }
}
