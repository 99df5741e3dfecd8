use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A coordinate in chart data space: numeric for continuous scales,
/// text for ordinal categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Number(f64),
    Text(String),
}

impl DataValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DataValue::Number(n) => Some(*n),
            DataValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Number(_) => None,
            DataValue::Text(s) => Some(s),
        }
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Number(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Text(value)
    }
}

/// Names of the JSON fields holding the x and y data values. Datasets bring
/// their own field names ("date"/"value", "year"/"count", ...), so annotation
/// records are keyed by these rather than by fixed names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub x: String,
    pub y: String,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            x: "x".to_string(),
            y: "y".to_string(),
        }
    }
}

/// Which side of the annotation box an arrow leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowSide {
    West,
    East,
}

/// Pixel offsets of an arrow's start relative to the annotation edge.
/// `dx` is measured from the right edge for east arrows and from the left
/// edge for west arrows; missing values fall back to the handle defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArrowSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dy: Option<f64>,
}

/// Where an arrow points, in data space plus optional percent-of-chart
/// offsets. The percent offsets let a target float inside an ordinal band
/// instead of snapping to the band's start pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowTarget {
    pub x: DataValue,
    pub y: DataValue,
    pub dx: f64,
    pub dy: f64,
}

/// A connector arrow owned by an annotation. `clockwise: None` draws a
/// straight line instead of an arc.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub side: ArrowSide,
    pub clockwise: Option<bool>,
    pub source: Option<ArrowSource>,
    pub target: ArrowTarget,
}

/// A free-floating text annotation anchored to a data position.
///
/// `dx`/`dy` are percentages of chart width/height, not pixels, which keeps
/// the stored position resolution-independent. `width` is a CSS-style pixel
/// size string ("155px").
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: u64,
    pub x: DataValue,
    pub y: DataValue,
    pub dx: f64,
    pub dy: f64,
    pub text: String,
    pub width: Option<String>,
    pub arrows: Vec<Arrow>,
}

impl Annotation {
    /// The arrow on `side`, if one exists. At most one arrow per side.
    pub fn arrow(&self, side: ArrowSide) -> Option<&Arrow> {
        self.arrows.iter().find(|a| a.side == side)
    }

    pub fn arrow_mut(&mut self, side: ArrowSide) -> Option<&mut Arrow> {
        self.arrows.iter_mut().find(|a| a.side == side)
    }
}

/// Pixel-space bounding box of an annotation, derived from the live scales.
/// Never persisted: it changes whenever the chart resizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
}

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ============================================
// JSON boundary adapter
// ============================================
//
// Stored annotation records keep the external dynamic-key contract: the x/y
// data values live under the dataset's own field names. Internally the model
// is the typed pair above, so (de)serialization goes through these adapters
// rather than derived impls.

fn value_field(map: &Map<String, Value>, key: &str) -> Result<DataValue, String> {
    let value = map
        .get(key)
        .ok_or_else(|| format!("missing data field '{}'", key))?;
    serde_json::from_value(value.clone())
        .map_err(|e| format!("data field '{}' is not a number or string: {}", key, e))
}

fn number_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

pub fn target_to_json(target: &ArrowTarget, fields: &FieldConfig) -> Value {
    let mut map = Map::new();
    map.insert(
        fields.x.clone(),
        serde_json::to_value(&target.x).unwrap_or(Value::Null),
    );
    map.insert(
        fields.y.clone(),
        serde_json::to_value(&target.y).unwrap_or(Value::Null),
    );
    if target.dx != 0.0 {
        map.insert("dx".to_string(), target.dx.into());
    }
    if target.dy != 0.0 {
        map.insert("dy".to_string(), target.dy.into());
    }
    Value::Object(map)
}

pub fn target_from_json(value: &Value, fields: &FieldConfig) -> Result<ArrowTarget, String> {
    let map = value
        .as_object()
        .ok_or_else(|| "arrow target must be an object".to_string())?;

    Ok(ArrowTarget {
        x: value_field(map, &fields.x)?,
        y: value_field(map, &fields.y)?,
        dx: number_field(map, "dx").unwrap_or(0.0),
        dy: number_field(map, "dy").unwrap_or(0.0),
    })
}

pub fn arrow_to_json(arrow: &Arrow, fields: &FieldConfig) -> Value {
    let mut map = Map::new();
    map.insert(
        "side".to_string(),
        serde_json::to_value(arrow.side).unwrap_or(Value::Null),
    );
    map.insert(
        "clockwise".to_string(),
        match arrow.clockwise {
            Some(cw) => Value::Bool(cw),
            None => Value::Null,
        },
    );
    if let Some(source) = &arrow.source {
        map.insert(
            "source".to_string(),
            serde_json::to_value(source).unwrap_or(Value::Null),
        );
    }
    map.insert("target".to_string(), target_to_json(&arrow.target, fields));
    Value::Object(map)
}

pub fn arrow_from_json(value: &Value, fields: &FieldConfig) -> Result<Arrow, String> {
    let map = value
        .as_object()
        .ok_or_else(|| "arrow must be an object".to_string())?;

    let side: ArrowSide = map
        .get("side")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| format!("invalid arrow side: {}", e))?
        .ok_or_else(|| "arrow is missing 'side'".to_string())?;

    // Absent and explicit-null both mean a straight line.
    let clockwise = map.get("clockwise").and_then(Value::as_bool);

    let source = map
        .get("source")
        .filter(|v| !v.is_null())
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| format!("invalid arrow source: {}", e))?;

    let target = map
        .get("target")
        .ok_or_else(|| "arrow is missing 'target'".to_string())
        .and_then(|v| target_from_json(v, fields))?;

    Ok(Arrow {
        side,
        clockwise,
        source,
        target,
    })
}

pub fn annotation_to_json(anno: &Annotation, fields: &FieldConfig) -> Value {
    let mut map = Map::new();
    map.insert("id".to_string(), anno.id.into());
    map.insert(
        fields.x.clone(),
        serde_json::to_value(&anno.x).unwrap_or(Value::Null),
    );
    map.insert(
        fields.y.clone(),
        serde_json::to_value(&anno.y).unwrap_or(Value::Null),
    );
    map.insert("dx".to_string(), anno.dx.into());
    map.insert("dy".to_string(), anno.dy.into());
    map.insert("text".to_string(), anno.text.clone().into());
    if let Some(width) = &anno.width {
        map.insert("width".to_string(), width.clone().into());
    }
    map.insert(
        "arrows".to_string(),
        Value::Array(
            anno.arrows
                .iter()
                .map(|a| arrow_to_json(a, fields))
                .collect(),
        ),
    );
    Value::Object(map)
}

pub fn annotation_from_json(value: &Value, fields: &FieldConfig) -> Result<Annotation, String> {
    let map = value
        .as_object()
        .ok_or_else(|| "annotation must be an object".to_string())?;

    let id = map
        .get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| "annotation is missing a numeric 'id'".to_string())?;

    let arrows = match map.get("arrows") {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            let mut arrows = Vec::with_capacity(items.len());
            for item in items {
                let arrow = arrow_from_json(item, fields)?;
                if arrows.iter().any(|a: &Arrow| a.side == arrow.side) {
                    return Err(format!(
                        "annotation {} has more than one arrow on one side",
                        id
                    ));
                }
                arrows.push(arrow);
            }
            arrows
        }
        Some(_) => return Err(format!("annotation {}: 'arrows' must be an array", id)),
    };

    Ok(Annotation {
        id,
        x: value_field(map, &fields.x)?,
        y: value_field(map, &fields.y)?,
        dx: number_field(map, "dx").unwrap_or(0.0),
        dy: number_field(map, "dy").unwrap_or(0.0),
        text: map
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        width: map
            .get("width")
            .and_then(Value::as_str)
            .map(str::to_string),
        arrows,
    })
}
