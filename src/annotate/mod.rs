mod arrow;
mod coords;
mod editor;
mod scale;
mod shared;
mod types;

pub use arrow::{ArcStyle, arrow_path};
pub use coords::{
    ChartScales, DEFAULT_ANNOTATION_WIDTH, HANDLE_OFFSET_PX, annotation_box, arrow_source,
    arrow_target, parse_px, source_dx_from_pixel, source_dy_from_pixel,
};
pub use editor::{
    PLACEHOLDER_TEXT, move_to_pixel, new_annotation, remove_arrow, resource_arrow, retarget_arrow,
    set_arrow, set_width,
};
pub use scale::Scale;
pub use shared::SharedRef;
pub use types::{
    Annotation, AnnotationBox, Arrow, ArrowSide, ArrowSource, ArrowTarget, DataValue, FieldConfig,
    Point, annotation_from_json, annotation_to_json, arrow_from_json, arrow_to_json,
    target_from_json, target_to_json,
};
