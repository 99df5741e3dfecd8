use serde::Deserialize;
use serde_json::Value;

use crate::annotate::{
    AnnotationBox, ArcStyle, Annotation, ChartScales, DataValue, FieldConfig, Scale,
    annotation_box, annotation_from_json, arrow_path, arrow_source, arrow_target,
};
use crate::fonts::TextMeasure;
use crate::theme::ChartTheme;
use crate::xml::escape_xml;

const MARGIN_LEFT: f64 = 46.0;
const MARGIN_RIGHT: f64 = 14.0;
const MARGIN_TOP: f64 = 14.0;
const MARGIN_BOTTOM: f64 = 30.0;

const LINEAR_TICK_COUNT: usize = 5;
const BAR_INSET_FRACTION: f64 = 0.1;
const ARROWHEAD_SIZE: f64 = 7.0;

/// Scale description as it appears in a scene file; the pixel range is
/// assigned from the chart size when the scene is loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScaleSpec {
    Linear { domain: [f64; 2] },
    Ordinal { domain: Vec<DataValue> },
}

impl ScaleSpec {
    fn into_scale(self, range: [f64; 2]) -> Scale {
        match self {
            ScaleSpec::Linear { domain } => Scale::linear(domain, range),
            ScaleSpec::Ordinal { domain } => Scale::ordinal(domain, range),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub x: DataValue,
    pub y: DataValue,
}

#[derive(Debug, Deserialize)]
struct SceneFile {
    width: f64,
    height: f64,
    #[serde(default)]
    fields: FieldConfig,
    x_scale: ScaleSpec,
    y_scale: ScaleSpec,
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    annotations: Vec<Value>,
}

/// A chart plus its annotations, loaded from JSON and validated against the
/// scales. Data and annotation records use the scene's own field names for
/// their x/y values (see `FieldConfig`).
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub fields: FieldConfig,
    pub scales: ChartScales,
    pub data: Vec<DataPoint>,
    pub annotations: Vec<Annotation>,
}

impl Scene {
    pub fn from_json(content: &str) -> Result<Self, String> {
        let file: SceneFile =
            serde_json::from_str(content).map_err(|e| format!("Failed to parse scene: {}", e))?;

        if file.width <= MARGIN_LEFT + MARGIN_RIGHT || file.height <= MARGIN_TOP + MARGIN_BOTTOM {
            return Err(format!(
                "Chart size {}x{} leaves no plot area",
                file.width, file.height
            ));
        }

        let x_range = [MARGIN_LEFT, file.width - MARGIN_RIGHT];
        let y_range = match file.y_scale {
            // numeric y axes grow upward, so the pixel range is flipped
            ScaleSpec::Linear { .. } => [file.height - MARGIN_BOTTOM, MARGIN_TOP],
            ScaleSpec::Ordinal { .. } => [MARGIN_TOP, file.height - MARGIN_BOTTOM],
        };

        let scales = ChartScales {
            x: file.x_scale.into_scale(x_range),
            y: file.y_scale.into_scale(y_range),
            width: file.width - MARGIN_LEFT - MARGIN_RIGHT,
            height: file.height - MARGIN_TOP - MARGIN_BOTTOM,
        };

        let mut data = Vec::with_capacity(file.data.len());
        for (idx, record) in file.data.iter().enumerate() {
            let map = record
                .as_object()
                .ok_or_else(|| format!("data record {} is not an object", idx))?;
            let x = field_value(map, &file.fields.x, idx)?;
            let y = field_value(map, &file.fields.y, idx)?;
            data.push(DataPoint { x, y });
        }

        let mut annotations = Vec::with_capacity(file.annotations.len());
        for record in &file.annotations {
            annotations.push(annotation_from_json(record, &file.fields)?);
        }

        let scene = Scene {
            width: file.width,
            height: file.height,
            fields: file.fields,
            scales,
            data,
            annotations,
        };
        scene.validate()?;
        Ok(scene)
    }

    /// Fail fast on values that don't fit their scale, so the geometry
    /// functions never see a contract violation.
    fn validate(&self) -> Result<(), String> {
        for (idx, point) in self.data.iter().enumerate() {
            check_on_scale(&self.scales.x, &point.x, &format!("data record {}", idx))?;
            check_on_scale(&self.scales.y, &point.y, &format!("data record {}", idx))?;
        }

        for anno in &self.annotations {
            let what = format!("annotation {}", anno.id);
            check_on_scale(&self.scales.x, &anno.x, &what)?;
            check_on_scale(&self.scales.y, &anno.y, &what)?;

            for arrow in &anno.arrows {
                let what = format!("annotation {} arrow target", anno.id);
                check_on_scale(&self.scales.x, &arrow.target.x, &what)?;
                check_on_scale(&self.scales.y, &arrow.target.y, &what)?;
            }
        }

        Ok(())
    }
}

fn field_value(
    map: &serde_json::Map<String, Value>,
    key: &str,
    idx: usize,
) -> Result<DataValue, String> {
    let value = map
        .get(key)
        .ok_or_else(|| format!("data record {} is missing field '{}'", idx, key))?;
    serde_json::from_value(value.clone())
        .map_err(|e| format!("data record {} field '{}': {}", idx, key, e))
}

fn check_on_scale(scale: &Scale, value: &DataValue, what: &str) -> Result<(), String> {
    if scale.position(value).is_nan() {
        return Err(format!("{} has value {:?} that its scale cannot place", what, value));
    }
    Ok(())
}

struct NoteLayout {
    bbox: AnnotationBox,
    lines: Vec<String>,
    height: f64,
}

/// Renders a scene to an SVG string: background, axes, the data series, then
/// each annotation's arrows and text box. All geometry comes from the
/// coordinate engine; this layer only assembles markup.
pub struct ChartRenderer<T: TextMeasure> {
    theme: ChartTheme,
    measure: T,
    svg_content: String,
}

impl<T: TextMeasure> ChartRenderer<T> {
    pub fn new(theme: ChartTheme, measure: T) -> Self {
        Self {
            theme,
            measure,
            svg_content: String::new(),
        }
    }

    pub fn render(&mut self, scene: &Scene) -> Result<String, String> {
        self.svg_content.clear();

        self.render_axes(scene);
        self.render_series(scene);

        for anno in &scene.annotations {
            let layout = self.layout_note(anno, scene);
            self.render_arrows(anno, scene, layout.height);
            self.render_note(anno, &layout);
        }

        Ok(self.finalize_svg(scene))
    }

    fn render_axes(&mut self, scene: &Scene) {
        let bottom = scene.height - MARGIN_BOTTOM;
        let right = scene.width - MARGIN_RIGHT;

        self.svg_content.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1" />"#,
            MARGIN_LEFT, bottom, right, bottom, self.theme.axis_color,
        ));
        self.svg_content.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1" />"#,
            MARGIN_LEFT, MARGIN_TOP, MARGIN_LEFT, bottom, self.theme.axis_color,
        ));

        for (label, x) in axis_ticks(&scene.scales.x) {
            self.svg_content.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1" />"#,
                x,
                bottom,
                x,
                bottom + 4.0,
                self.theme.axis_color,
            ));
            self.draw_text(
                x,
                bottom + 4.0 + self.theme.font_size_axis as f64,
                &label,
                self.theme.font_size_axis,
                &self.theme.axis_color.clone(),
                "middle",
            );
        }

        for (label, y) in axis_ticks(&scene.scales.y) {
            self.svg_content.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1" />"#,
                MARGIN_LEFT,
                y,
                right,
                y,
                self.theme.grid_color,
            ));
            self.draw_text(
                MARGIN_LEFT - 6.0,
                y + self.theme.font_size_axis as f64 * 0.35,
                &label,
                self.theme.font_size_axis,
                &self.theme.axis_color.clone(),
                "end",
            );
        }
    }

    fn render_series(&mut self, scene: &Scene) {
        if scene.data.is_empty() {
            return;
        }

        match &scene.scales.x {
            Scale::Ordinal { .. } => self.render_bars(scene),
            Scale::Linear { .. } => self.render_line(scene),
        }
    }

    fn render_bars(&mut self, scene: &Scene) {
        let step = scene.scales.x.step();
        let inset = step * BAR_INSET_FRACTION;
        let baseline = scene.height - MARGIN_BOTTOM;

        for point in &scene.data {
            let x = scene.scales.x.position(&point.x) + inset;
            let top = scene.scales.y.position(&point.y);

            self.svg_content.push_str(&format!(
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" />"#,
                x,
                top,
                step - inset * 2.0,
                (baseline - top).max(0.0),
                self.theme.series_color,
            ));
        }
    }

    fn render_line(&mut self, scene: &Scene) {
        let points: Vec<String> = scene
            .data
            .iter()
            .map(|p| {
                format!(
                    "{:.2},{:.2}",
                    scene.scales.x.position(&p.x),
                    scene.scales.y.position(&p.y)
                )
            })
            .collect();

        self.svg_content.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2" />"#,
            points.join(" "),
            self.theme.series_color,
        ));
    }

    fn layout_note(&mut self, anno: &Annotation, scene: &Scene) -> NoteLayout {
        let bbox = annotation_box(anno, &scene.scales);
        let font_size = self.theme.font_size_note;
        let max_width = (bbox.width - self.theme.note_padding as f64 * 2.0).max(1.0) as f32;

        let lines = self.wrap_text(&anno.text, max_width, font_size);
        let line_height = (font_size * self.theme.line_height) as f64;
        let height = lines.len() as f64 * line_height + self.theme.note_padding as f64 * 2.0;

        NoteLayout { bbox, lines, height }
    }

    fn render_note(&mut self, _anno: &Annotation, layout: &NoteLayout) {
        let NoteLayout { bbox, lines, height } = layout;

        self.svg_content.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" fill="{}" stroke="{}" stroke-width="1" />"#,
            bbox.left,
            bbox.top,
            bbox.width,
            height,
            self.theme.note_radius,
            self.theme.note_bg_color,
            self.theme.note_border_color,
        ));

        let font_size = self.theme.font_size_note;
        let line_height = (font_size * self.theme.line_height) as f64;
        let text_x = bbox.left + self.theme.note_padding as f64;
        let color = self.theme.note_text_color.clone();

        for (idx, line) in lines.iter().enumerate() {
            let y = bbox.top
                + self.theme.note_padding as f64
                + font_size as f64
                + idx as f64 * line_height;
            self.draw_text(text_x, y, line, font_size, &color, "start");
        }
    }

    fn render_arrows(&mut self, anno: &Annotation, scene: &Scene, note_height: f64) {
        for arrow in &anno.arrows {
            let source = arrow_source(anno, arrow, &scene.scales, note_height);
            let target = arrow_target(arrow, &scene.scales);

            let style = match arrow.clockwise {
                Some(clockwise) => ArcStyle::curved(clockwise),
                None => ArcStyle::straight(),
            };

            self.svg_content.push_str(&format!(
                r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.2}" marker-end="url(#arrowhead)" />"#,
                arrow_path(source, target, &style),
                self.theme.arrow_color,
                self.theme.arrow_stroke_width,
            ));
        }
    }

    fn wrap_text(&mut self, text: &str, max_width: f32, font_size: f32) -> Vec<String> {
        let mut lines = Vec::new();

        for raw_line in text.lines() {
            let mut current = String::new();
            for word in raw_line.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{} {}", current, word)
                };

                let (width, _) = self.measure.measure_text(&candidate, font_size);
                if width > max_width && !current.is_empty() {
                    lines.push(current);
                    current = word.to_string();
                } else {
                    current = candidate;
                }
            }
            lines.push(current);
        }

        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }

    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        font_size: f32,
        fill: &str,
        anchor: &str,
    ) {
        self.svg_content.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{:.2}" fill="{}" text-anchor="{}">{}</text>"#,
            x,
            y,
            font_size,
            fill,
            anchor,
            escape_xml(text),
        ));
    }

    fn finalize_svg(&self, scene: &Scene) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
                r#"<defs><marker id="arrowhead" viewBox="0 0 10 10" refX="8" refY="5" "#,
                r#"markerWidth="{m}" markerHeight="{m}" orient="auto-start-reverse">"#,
                r#"<path d="M 0,0 L 10,5 L 0,10 z" fill="{arrow}" /></marker></defs>"#,
                r#"<rect width="100%" height="100%" fill="{bg}" />{content}</svg>"#,
            ),
            w = scene.width,
            h = scene.height,
            m = ARROWHEAD_SIZE,
            arrow = self.theme.arrow_color,
            bg = self.theme.background_color,
            content = self.svg_content,
        )
    }
}

fn fmt_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Tick labels and pixel positions for an axis. Linear axes get evenly
/// spaced ticks across the domain; ordinal axes get one tick per band,
/// centered in it.
fn axis_ticks(scale: &Scale) -> Vec<(String, f64)> {
    match scale {
        Scale::Linear { domain, .. } => {
            let span = domain[1] - domain[0];
            (0..LINEAR_TICK_COUNT)
                .map(|i| {
                    let value = domain[0] + span * i as f64 / (LINEAR_TICK_COUNT - 1) as f64;
                    (
                        fmt_tick(value),
                        scale.position(&DataValue::Number(value)),
                    )
                })
                .collect()
        }
        Scale::Ordinal { domain, .. } => {
            let half_step = scale.step() / 2.0;
            domain
                .iter()
                .map(|entry| {
                    let label = match entry {
                        DataValue::Number(n) => fmt_tick(*n),
                        DataValue::Text(s) => s.clone(),
                    };
                    (label, scale.position(entry) + half_step)
                })
                .collect()
        }
    }
}
