use std::collections::HashMap;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
}

/// Measures a single line of annotation/label text. The renderer does its
/// own word wrapping on top of these widths.
pub trait TextMeasure {
    /// Returns (width, height) in pixels.
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32);
}

pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: HashMap<MeasureKey, (f32, f32)>,
}

impl CosmicTextMeasure {
    pub fn new() -> Result<Self, String> {
        Ok(Self {
            font_system: FontSystem::new(),
            cache: HashMap::new(),
        })
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let line_height = font_size * 1.2;
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height,
            },
        );

        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new().family(Family::SansSerif);
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let mut total_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        for run in buffer.layout_runs() {
            total_width = total_width.max(run.line_w);
            total_height += run.line_height;
        }

        let measured = (total_width, total_height);
        self.cache.insert(key, measured);
        measured
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new().expect("Failed to initialize font system")
    }
}

/// Fixed-advance measure for deterministic layout in tests and headless
/// environments without fonts.
#[derive(Debug, Clone, Copy)]
pub struct FixedTextMeasure {
    /// Glyph advance as a fraction of the font size.
    pub advance: f32,
}

impl Default for FixedTextMeasure {
    fn default() -> Self {
        Self { advance: 0.55 }
    }
}

impl TextMeasure for FixedTextMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        let width = text.chars().count() as f32 * self.advance * font_size;
        (width, font_size * 1.2)
    }
}
