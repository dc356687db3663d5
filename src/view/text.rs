use super::{ElementId, ElementKind, UiTree};
use cosmic_text::{Align, Attrs, Buffer, FontSystem, Metrics, Shaping, Wrap};
use glam::Vec2;
use std::cell::RefCell;
use std::ops::Range;

thread_local! {
    static SHARED_FONT_SYSTEM: RefCell<FontSystem> = RefCell::new(FontSystem::new());
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    /// Multiplier applied to the font size.
    pub line_height: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 1.2,
        }
    }
}

impl TextStyle {
    pub fn line_height_px(&self) -> f32 {
        (self.font_size * self.line_height.max(0.1)).max(1.0)
    }
}

/// One visual line after wrapping. `range` indexes bytes of the source text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub range: Range<usize>,
    pub width: f32,
    pub top: f32,
    pub height: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextMeasure {
    pub size: Vec2,
    pub lines: Vec<TextLine>,
}

/// String measurement used by row-flow, content-fit and label rendering.
pub trait FontMetrics {
    fn measure(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> TextMeasure;
}

/// Shaping-free approximation good enough for layout without a font database.
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimatedMetrics;

fn estimate_char_width_px(ch: char, font_size: f32) -> f32 {
    if ch == '\t' {
        return font_size * 2.0;
    }
    if ch.is_whitespace() {
        return font_size * 0.33;
    }
    if ch.is_ascii() {
        return font_size * 0.56;
    }
    font_size * 1.0
}

fn usable_width(max_width: Option<f32>) -> Option<f32> {
    max_width.filter(|width| width.is_finite() && *width > 0.0)
}

impl EstimatedMetrics {
    fn wrap_paragraph(
        paragraph: &str,
        base: usize,
        font_size: f32,
        limit: Option<f32>,
        out: &mut Vec<(Range<usize>, f32)>,
    ) {
        let mut line_start = 0;
        let mut width = 0.0_f32;
        // Byte index just past the last whitespace on this line, and the width up to it.
        let mut last_break: Option<(usize, f32)> = None;
        for (index, ch) in paragraph.char_indices() {
            let advance = estimate_char_width_px(ch, font_size);
            if let Some(limit) = limit {
                if index > line_start && width + advance > limit {
                    match last_break.take() {
                        Some((break_at, break_width)) if break_at > line_start => {
                            out.push((base + line_start..base + break_at, break_width));
                            width -= break_width;
                            line_start = break_at;
                        }
                        _ => {
                            out.push((base + line_start..base + index, width));
                            width = 0.0;
                            line_start = index;
                        }
                    }
                }
            }
            width += advance;
            if ch.is_whitespace() {
                last_break = Some((index + ch.len_utf8(), width));
            }
        }
        out.push((base + line_start..base + paragraph.len(), width));
    }
}

impl FontMetrics for EstimatedMetrics {
    fn measure(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> TextMeasure {
        let limit = usable_width(max_width);
        let mut spans = Vec::new();
        let mut paragraph_start = 0;
        for paragraph in text.split('\n') {
            Self::wrap_paragraph(paragraph, paragraph_start, style.font_size, limit, &mut spans);
            paragraph_start += paragraph.len() + 1;
        }

        let line_height = style.line_height_px();
        let lines: Vec<TextLine> = spans
            .into_iter()
            .enumerate()
            .map(|(index, (range, width))| TextLine {
                range,
                width,
                top: index as f32 * line_height,
                height: line_height,
            })
            .collect();
        let width = lines.iter().map(|line| line.width).fold(0.0, f32::max);
        TextMeasure {
            size: Vec2::new(width, lines.len() as f32 * line_height),
            lines,
        }
    }
}

/// Measures with real shaping through `cosmic-text`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CosmicTextMetrics;

impl CosmicTextMetrics {
    fn with_shared_font_system<R>(f: impl FnOnce(&mut FontSystem) -> R) -> R {
        SHARED_FONT_SYSTEM.with(|slot| f(&mut slot.borrow_mut()))
    }
}

impl FontMetrics for CosmicTextMetrics {
    fn measure(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> TextMeasure {
        let paragraph_starts: Vec<usize> = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self::with_shared_font_system(|font_system| {
            let font_size = style.font_size.max(1.0);
            let mut buffer = Buffer::new(
                font_system,
                Metrics::new(font_size, style.line_height_px()),
            );
            buffer.set_wrap(font_system, Wrap::WordOrGlyph);
            buffer.set_size(font_system, usable_width(max_width), None);
            buffer.set_text(
                font_system,
                text,
                &Attrs::new(),
                Shaping::Advanced,
                Some(Align::Left),
            );
            buffer.shape_until_scroll(font_system, false);

            let mut lines = Vec::new();
            let mut bottom = 0.0_f32;
            for run in buffer.layout_runs() {
                let base = paragraph_starts.get(run.line_i).copied().unwrap_or(text.len());
                let range = match (run.glyphs.first(), run.glyphs.last()) {
                    (Some(first), Some(last)) => base + first.start..base + last.end,
                    _ => base..base,
                };
                bottom = bottom.max(run.line_top + run.line_height);
                lines.push(TextLine {
                    range,
                    width: run.line_w,
                    top: run.line_top,
                    height: run.line_height,
                });
            }
            let width = lines.iter().map(|line| line.width).fold(0.0, f32::max);
            TextMeasure {
                size: Vec2::new(width, bottom),
                lines,
            }
        })
    }
}

impl UiTree {
    pub fn set_font_metrics(&mut self, metrics: impl FontMetrics + 'static) {
        self.metrics = Box::new(metrics);
    }

    pub fn measure_text(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> TextMeasure {
        self.metrics.measure(text, style, max_width)
    }

    /// Label size after flow. Auto-sized labels adopt their measured size
    /// within `max_width` and tag themselves `Resize` when it changes.
    pub(crate) fn flow_size(&mut self, id: ElementId, max_width: f32) -> Vec2 {
        let Some(element) = self.elements.get(id) else {
            return Vec2::ZERO;
        };
        let padding = element.layout.padding;
        let measured = match &element.kind {
            ElementKind::Label(label) if label.auto_size => {
                let content_width = (max_width - padding.horizontal()).max(0.0);
                let size = self
                    .metrics
                    .measure(&label.text, &label.style, Some(content_width))
                    .size;
                Some(size + Vec2::new(padding.horizontal(), padding.vertical()))
            }
            _ => None,
        };
        let current = element.layout.pixel_size;
        match measured {
            Some(size) if !super::vec2_approx_eq(size, current) => {
                if let Some(element) = self.elements.get_mut(id) {
                    element.layout.pixel_size = size;
                }
                self.set_dirty(id, super::DirtyKind::Resize);
                size
            }
            _ => current,
        }
    }

    /// Re-wraps a label's text inside its settled content box.
    pub(crate) fn render_label(&mut self, id: ElementId) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        let content_width = element.layout.content_size().x.max(0.0);
        if let ElementKind::Label(label) = &mut element.kind {
            let measure = self
                .metrics
                .measure(&label.text, &label.style, Some(content_width));
            label.lines = measure.lines;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EstimatedMetrics, FontMetrics, TextStyle};

    fn style() -> TextStyle {
        TextStyle {
            font_size: 10.0,
            line_height: 1.5,
        }
    }

    #[test]
    fn estimated_width_uses_per_character_classes() {
        let measure = EstimatedMetrics.measure("ab c", &style(), None);
        assert_eq!(measure.lines.len(), 1);
        let expected = 5.6 + 5.6 + 3.3 + 5.6;
        assert!((measure.size.x - expected).abs() < 0.001);
        assert!((measure.size.y - 15.0).abs() < 0.001);
    }

    #[test]
    fn wraps_at_last_whitespace_within_width() {
        // "hello world" at 5.6px per letter: "hello " is 31.3px, "world" 28px.
        let measure = EstimatedMetrics.measure("hello world", &style(), Some(40.0));
        assert_eq!(measure.lines.len(), 2);
        assert_eq!(measure.lines[0].range, 0..6);
        assert_eq!(measure.lines[1].range, 6..11);
        assert!((measure.lines[1].top - 15.0).abs() < 0.001);
    }

    #[test]
    fn breaks_long_words_per_glyph() {
        let measure = EstimatedMetrics.measure("abcdefgh", &style(), Some(20.0));
        let ranges: Vec<_> = measure.lines.iter().map(|line| line.range.clone()).collect();
        assert_eq!(ranges, vec![0..3, 3..6, 6..8]);
    }

    #[test]
    fn hard_newlines_start_paragraphs() {
        let measure = EstimatedMetrics.measure("a\nbc", &style(), None);
        assert_eq!(measure.lines.len(), 2);
        assert_eq!(measure.lines[1].range, 2..4);
    }

    #[test]
    fn empty_text_still_occupies_one_line() {
        let measure = EstimatedMetrics.measure("", &style(), Some(100.0));
        assert_eq!(measure.lines.len(), 1);
        assert_eq!(measure.size.x, 0.0);
        assert!((measure.size.y - 15.0).abs() < 0.001);
    }
}
