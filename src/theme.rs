use serde::{Deserialize, Serialize};

const LIGHT_BACKGROUND: &str = "#ffffff";
const LIGHT_AXIS: &str = "#8a8f98";
const LIGHT_GRID: &str = "#e4e7eb";
const LIGHT_SERIES: &str = "#2563eb";
const LIGHT_NOTE_TEXT: &str = "#1f2328";
const LIGHT_NOTE_BG: &str = "#fffbe6";
const LIGHT_NOTE_BORDER: &str = "#d9d2a8";
const LIGHT_ARROW: &str = "#57606a";

const DARK_BACKGROUND: &str = "#1e1e2e";
const DARK_AXIS: &str = "#7f849c";
const DARK_GRID: &str = "#313244";
const DARK_SERIES: &str = "#89b4fa";
const DARK_NOTE_TEXT: &str = "#cdd6f4";
const DARK_NOTE_BG: &str = "#302d41";
const DARK_NOTE_BORDER: &str = "#45475a";
const DARK_ARROW: &str = "#a6adc8";

const FONT_SIZE_NOTE: f32 = 13.0;
const FONT_SIZE_AXIS: f32 = 11.0;
const LINE_HEIGHT: f32 = 1.4;
const NOTE_PADDING: f32 = 6.0;
const NOTE_RADIUS: f32 = 3.0;
const ARROW_STROKE_WIDTH: f32 = 1.5;

/// Visual style for the chart surface and its annotations. Every field has a
/// default, so a theme file only needs to override what it cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartTheme {
    pub background_color: String,
    pub axis_color: String,
    pub grid_color: String,
    pub series_color: String,
    pub note_text_color: String,
    pub note_bg_color: String,
    pub note_border_color: String,
    pub arrow_color: String,

    pub font_size_note: f32,
    pub font_size_axis: f32,
    pub line_height: f32,

    pub note_padding: f32,
    pub note_radius: f32,
    pub arrow_stroke_width: f32,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl ChartTheme {
    pub fn light() -> Self {
        ChartTheme {
            background_color: LIGHT_BACKGROUND.to_string(),
            axis_color: LIGHT_AXIS.to_string(),
            grid_color: LIGHT_GRID.to_string(),
            series_color: LIGHT_SERIES.to_string(),
            note_text_color: LIGHT_NOTE_TEXT.to_string(),
            note_bg_color: LIGHT_NOTE_BG.to_string(),
            note_border_color: LIGHT_NOTE_BORDER.to_string(),
            arrow_color: LIGHT_ARROW.to_string(),

            font_size_note: FONT_SIZE_NOTE,
            font_size_axis: FONT_SIZE_AXIS,
            line_height: LINE_HEIGHT,

            note_padding: NOTE_PADDING,
            note_radius: NOTE_RADIUS,
            arrow_stroke_width: ARROW_STROKE_WIDTH,
        }
    }

    pub fn dark() -> Self {
        ChartTheme {
            background_color: DARK_BACKGROUND.to_string(),
            axis_color: DARK_AXIS.to_string(),
            grid_color: DARK_GRID.to_string(),
            series_color: DARK_SERIES.to_string(),
            note_text_color: DARK_NOTE_TEXT.to_string(),
            note_bg_color: DARK_NOTE_BG.to_string(),
            note_border_color: DARK_NOTE_BORDER.to_string(),
            arrow_color: DARK_ARROW.to_string(),

            font_size_note: FONT_SIZE_NOTE,
            font_size_axis: FONT_SIZE_AXIS,
            line_height: LINE_HEIGHT,

            note_padding: NOTE_PADDING,
            note_radius: NOTE_RADIUS,
            arrow_stroke_width: ARROW_STROKE_WIDTH,
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self, String> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::light()),
            "dark" => Ok(Self::dark()),
            other => Err(format!(
                "Unknown built-in theme '{}'. Available: light, dark",
                other
            )),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse theme TOML: {}", e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse theme YAML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::ChartTheme;

    #[test]
    fn partial_toml_falls_back_to_defaults_per_field() {
        let theme = ChartTheme::from_toml(r##"series_color = "#ff0000""##).unwrap();

        assert_eq!(theme.series_color, "#ff0000");
        assert_eq!(theme.background_color, ChartTheme::light().background_color);
        assert_eq!(theme.font_size_note, ChartTheme::light().font_size_note);
    }

    #[test]
    fn yaml_and_toml_agree() {
        let from_toml = ChartTheme::from_toml(r##"arrow_color = "#123456""##).unwrap();
        let from_yaml = ChartTheme::from_yaml(r##"arrow_color: "#123456""##).unwrap();

        assert_eq!(from_toml.arrow_color, from_yaml.arrow_color);
    }

    #[test]
    fn builtin_lookup_is_case_insensitive() {
        let dark = ChartTheme::from_builtin(" Dark ").unwrap();
        assert_eq!(dark.background_color, ChartTheme::dark().background_color);
        assert!(ChartTheme::from_builtin("solarized").is_err());
    }
}
