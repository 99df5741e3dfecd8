use super::coords::{ChartScales, source_dx_from_pixel, source_dy_from_pixel};
use super::types::{Annotation, Arrow, ArrowSide, ArrowSource, Point};

/// Seed text for a freshly created annotation.
pub const PLACEHOLDER_TEXT: &str = "Enter your note here...";

const DEFAULT_WIDTH_PX: &str = "155px";

/// Create an annotation at a pointer position.
///
/// Both axes are inverted through their scales; the residual percent offsets
/// become `dx`/`dy` so the annotation floats inside an ordinal band instead
/// of snapping to its start. A pointer that lands before the first band of an
/// ordinal scale has no data value to anchor to, which is reported as an
/// error rather than stored. The id is caller-assigned; uniqueness is the
/// caller's contract.
pub fn new_annotation(pointer: Point, id: u64, scales: &ChartScales) -> Result<Annotation, String> {
    let (x, dx) = scales.x.invert(pointer.x);
    let (y, dy) = scales.y.invert(pointer.y);

    let x = x.ok_or_else(|| {
        format!(
            "pointer x {} is before the first band of the x scale",
            pointer.x
        )
    })?;
    let y = y.ok_or_else(|| {
        format!(
            "pointer y {} is before the first band of the y scale",
            pointer.y
        )
    })?;

    Ok(Annotation {
        id,
        x,
        y,
        dx,
        dy,
        text: PLACEHOLDER_TEXT.to_string(),
        width: Some(DEFAULT_WIDTH_PX.to_string()),
        arrows: Vec::new(),
    })
}

/// Move an annotation so its anchor tracks the pointer.
///
/// The pointer is re-inverted on every call instead of accumulating pixel
/// deltas, so repeated calls with the same position are idempotent and long
/// drags cannot drift. An axis that inverts to nothing (pointer before the
/// first ordinal band) keeps its previous stored position.
pub fn move_to_pixel(anno: &mut Annotation, pointer: Point, scales: &ChartScales) {
    let (x, dx) = scales.x.invert(pointer.x);
    if let Some(x) = x {
        anno.x = x;
        anno.dx = dx;
    }

    let (y, dy) = scales.y.invert(pointer.y);
    if let Some(y) = y {
        anno.y = y;
        anno.dy = dy;
    }
}

/// Attach an arrow, replacing any existing arrow on the same side.
pub fn set_arrow(anno: &mut Annotation, arrow: Arrow) {
    match anno.arrow_mut(arrow.side) {
        Some(existing) => *existing = arrow,
        None => anno.arrows.push(arrow),
    }
}

/// Remove the arrow on `side`. Returns whether one was removed.
pub fn remove_arrow(anno: &mut Annotation, side: ArrowSide) -> bool {
    let before = anno.arrows.len();
    anno.arrows.retain(|a| a.side != side);
    anno.arrows.len() < before
}

/// Persist a dragged arrow start: convert the pixel position back into
/// edge-relative offsets through the coordinate inverses.
pub fn resource_arrow(anno: &mut Annotation, side: ArrowSide, pixel: Point, scales: &ChartScales) {
    let dx = source_dx_from_pixel(pixel.x, anno, side, scales);
    let dy = source_dy_from_pixel(pixel.y, anno, scales);

    if let Some(arrow) = anno.arrow_mut(side) {
        arrow.source = Some(ArrowSource {
            dx: Some(dx),
            dy: Some(dy),
        });
    }
}

/// Persist a dragged arrow end: re-invert the pixel position into data space
/// plus percent residuals. Axes that invert to nothing keep their previous
/// target, mirroring `move_to_pixel`.
pub fn retarget_arrow(anno: &mut Annotation, side: ArrowSide, pixel: Point, scales: &ChartScales) {
    let (x, dx) = scales.x.invert(pixel.x);
    let (y, dy) = scales.y.invert(pixel.y);

    if let Some(arrow) = anno.arrow_mut(side) {
        if let Some(x) = x {
            arrow.target.x = x;
            arrow.target.dx = dx;
        }
        if let Some(y) = y {
            arrow.target.y = y;
            arrow.target.dy = dy;
        }
    }
}

/// Store a new box width as a pixel size string.
pub fn set_width(anno: &mut Annotation, width_px: f64) {
    anno.width = Some(format!("{}px", width_px));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::scale::Scale;
    use crate::annotate::types::{ArrowTarget, DataValue};

    fn linear_scales() -> ChartScales {
        ChartScales {
            x: Scale::linear([0.0, 10.0], [0.0, 500.0]),
            y: Scale::linear([0.0, 100.0], [400.0, 0.0]),
            width: 500.0,
            height: 400.0,
        }
    }

    fn ordinal_x_scales() -> ChartScales {
        ChartScales {
            x: Scale::ordinal(vec!["a".into(), "b".into(), "c".into()], [10.0, 100.0]),
            y: Scale::linear([0.0, 100.0], [400.0, 0.0]),
            width: 100.0,
            height: 400.0,
        }
    }

    fn arrow(side: ArrowSide) -> Arrow {
        Arrow {
            side,
            clockwise: Some(true),
            source: None,
            target: ArrowTarget {
                x: DataValue::Number(1.0),
                y: DataValue::Number(1.0),
                dx: 0.0,
                dy: 0.0,
            },
        }
    }

    #[test]
    fn factory_is_deterministic_and_fully_populated() {
        let scales = linear_scales();
        let a = new_annotation(Point::new(250.0, 100.0), 7, &scales).unwrap();
        let b = new_annotation(Point::new(250.0, 100.0), 7, &scales).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.id, 7);
        assert_eq!(a.x, DataValue::Number(5.0));
        assert_eq!(a.y, DataValue::Number(75.0));
        assert_eq!(a.dx, 0.0);
        assert_eq!(a.dy, 0.0);
        assert_eq!(a.text, PLACEHOLDER_TEXT);
        assert_eq!(a.width.as_deref(), Some("155px"));
        assert!(a.arrows.is_empty());
    }

    #[test]
    fn fresh_annotations_serialize_under_the_configured_field_names() {
        use crate::annotate::types::{FieldConfig, annotation_to_json};

        let scales = linear_scales();
        let anno = new_annotation(Point::new(250.0, 100.0), 7, &scales).unwrap();

        let fields = FieldConfig {
            x: "year".to_string(),
            y: "count".to_string(),
        };
        let record = annotation_to_json(&anno, &fields);

        assert_eq!(record["year"], 5.0);
        assert_eq!(record["count"], 75.0);
        assert_eq!(record["text"], PLACEHOLDER_TEXT);
    }

    #[test]
    fn factory_keeps_ordinal_residual_offsets() {
        let scales = ordinal_x_scales();
        // band "b" starts at 40px; 15px further in a 100px extent
        let a = new_annotation(Point::new(55.0, 200.0), 1, &scales).unwrap();

        assert_eq!(a.x, DataValue::Text("b".to_string()));
        assert!((a.dx - 15.0).abs() < 1e-9);
    }

    #[test]
    fn creating_before_first_band_is_an_error() {
        let scales = ordinal_x_scales();
        let err = new_annotation(Point::new(5.0, 200.0), 1, &scales).unwrap_err();
        assert!(err.contains("first band"), "unexpected error: {}", err);
    }

    #[test]
    fn moving_reinverts_instead_of_accumulating() {
        let scales = linear_scales();
        let mut anno = new_annotation(Point::new(100.0, 100.0), 1, &scales).unwrap();

        move_to_pixel(&mut anno, Point::new(300.0, 50.0), &scales);
        let once = anno.clone();
        move_to_pixel(&mut anno, Point::new(300.0, 50.0), &scales);

        assert_eq!(anno, once);
        assert_eq!(anno.x, DataValue::Number(6.0));
    }

    #[test]
    fn moving_before_first_band_keeps_the_previous_anchor() {
        let scales = ordinal_x_scales();
        let mut anno = new_annotation(Point::new(55.0, 200.0), 1, &scales).unwrap();
        let anchored = anno.x.clone();

        move_to_pixel(&mut anno, Point::new(2.0, 100.0), &scales);

        assert_eq!(anno.x, anchored);
        // the y axis is linear and still follows the pointer
        assert_eq!(anno.y, DataValue::Number(75.0));
    }

    #[test]
    fn one_arrow_per_side() {
        let scales = linear_scales();
        let mut anno = new_annotation(Point::new(100.0, 100.0), 1, &scales).unwrap();

        set_arrow(&mut anno, arrow(ArrowSide::East));
        set_arrow(&mut anno, arrow(ArrowSide::West));
        assert_eq!(anno.arrows.len(), 2);

        let mut replacement = arrow(ArrowSide::East);
        replacement.clockwise = None;
        set_arrow(&mut anno, replacement);

        assert_eq!(anno.arrows.len(), 2);
        assert_eq!(anno.arrow(ArrowSide::East).unwrap().clockwise, None);

        assert!(remove_arrow(&mut anno, ArrowSide::East));
        assert!(!remove_arrow(&mut anno, ArrowSide::East));
        assert_eq!(anno.arrows.len(), 1);
    }

    #[test]
    fn resourcing_stores_edge_relative_offsets() {
        let scales = linear_scales();
        let mut anno = new_annotation(Point::new(100.0, 100.0), 1, &scales).unwrap();
        set_arrow(&mut anno, arrow(ArrowSide::East));

        let b = crate::annotate::coords::annotation_box(&anno, &scales);
        resource_arrow(
            &mut anno,
            ArrowSide::East,
            Point::new(b.left + b.width + 30.0, b.top + 12.0),
            &scales,
        );

        let source = anno.arrow(ArrowSide::East).unwrap().source.unwrap();
        assert_eq!(source.dx, Some(30.0));
        assert_eq!(source.dy, Some(12.0));
    }

    #[test]
    fn retargeting_reinverts_into_data_space() {
        let scales = linear_scales();
        let mut anno = new_annotation(Point::new(100.0, 100.0), 1, &scales).unwrap();
        set_arrow(&mut anno, arrow(ArrowSide::West));

        retarget_arrow(&mut anno, ArrowSide::West, Point::new(450.0, 40.0), &scales);

        let target = &anno.arrow(ArrowSide::West).unwrap().target;
        assert_eq!(target.x, DataValue::Number(9.0));
        assert_eq!(target.y, DataValue::Number(90.0));
        assert_eq!(target.dx, 0.0);
    }
}
