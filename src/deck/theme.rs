//! Built-in fallback theme.
//!
//! When no usable branded template exists, slides are synthesized from this
//! fixed dark theme: deep navy background, accent bars, pill-style bullet
//! rows, and a cycling four-color accent palette. The renderer is
//! behaviorally interchangeable with a loaded template: it populates the same
//! placeholder-tagged text regions with the same semantics.

use crate::common::RGBColor;
use crate::common::unit::{inches, points};
use crate::deck::shapes::{Align, Placeholder, PlaceholderType, Shape, SlideShapes, TextFormat};
use crate::deck::{SlideSource, font};
use crate::outline::OutlineSlide;
use crate::pptx::{SLIDE_HEIGHT, SLIDE_WIDTH};

/// Deep navy slide background.
pub const BG_DARK: RGBColor = RGBColor::new(0x0F, 0x17, 0x2A);
/// Slightly lighter navy behind bullet rows.
pub const BULLET_BG: RGBColor = RGBColor::new(0x1A, 0x27, 0x45);
pub const WHITE: RGBColor = RGBColor::new(0xFF, 0xFF, 0xFF);
pub const LIGHT_GRAY: RGBColor = RGBColor::new(0xD0, 0xD8, 0xE8);
/// Muted blue used for the title-slide tagline.
pub const TAGLINE_BLUE: RGBColor = RGBColor::new(0x92, 0xBC, 0xF5);

/// Accent colors cycled across content slides: blue, purple, teal, amber.
pub const ACCENT_PALETTE: [RGBColor; 4] = [
    RGBColor::new(0x35, 0x8E, 0xF1),
    RGBColor::new(0x7C, 0x3A, 0xED),
    RGBColor::new(0x22, 0xC1, 0xA3),
    RGBColor::new(0xF5, 0x9E, 0x0B),
];

/// Bullet rows drawn as individual pills; further bullets share the last row.
const MAX_BULLET_ROWS: usize = 6;

/// Deterministic accent for a content slide position. Same index always
/// yields the same color, for templates and the fallback theme alike.
#[inline]
pub fn accent_for(index: usize) -> RGBColor {
    ACCENT_PALETTE[index % ACCENT_PALETTE.len()]
}

/// The built-in theme as a slide source.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTheme;

impl FallbackTheme {
    pub fn new() -> Self {
        Self
    }
}

impl SlideSource for FallbackTheme {
    fn title_slide(&self, title: &str, subtitle: &str) -> SlideShapes {
        let accent = ACCENT_PALETTE[0];
        let accent2 = ACCENT_PALETTE[1];
        let mut slide = SlideShapes {
            background: Some(BG_DARK),
            shapes: Vec::with_capacity(7),
        };

        // Accent frame: top, bottom, and left edge bars.
        slide.shapes.push(Shape::Rectangle {
            x: 0,
            y: 0,
            width: SLIDE_WIDTH,
            height: inches(0.07),
            fill: accent,
        });
        slide.shapes.push(Shape::Rectangle {
            x: 0,
            y: inches(7.43),
            width: SLIDE_WIDTH,
            height: inches(0.07),
            fill: accent2,
        });
        slide.shapes.push(Shape::Rectangle {
            x: 0,
            y: 0,
            width: inches(0.07),
            height: SLIDE_HEIGHT,
            fill: accent2,
        });

        // Large decorative circle bleeding off the right edge.
        slide.shapes.push(Shape::Ellipse {
            x: inches(8.5),
            y: inches(1.5),
            width: inches(5.0),
            height: inches(5.0),
            fill: accent,
        });

        slide.shapes.push(Shape::TextBox {
            x: inches(0.8),
            y: inches(2.5),
            width: inches(8.0),
            height: inches(1.8),
            paragraphs: vec![title.to_string()],
            format: TextFormat::default()
                .font(font::BODY)
                .size(52.0)
                .bold(true)
                .color(WHITE),
            placeholder: Some(Placeholder::new(PlaceholderType::CenteredTitle)),
            bullet_color: None,
        });

        // Short underline between title and tagline.
        slide.shapes.push(Shape::Rectangle {
            x: inches(0.8),
            y: inches(4.35),
            width: inches(3.0),
            height: points(3.0),
            fill: accent,
        });

        slide.shapes.push(Shape::TextBox {
            x: inches(0.8),
            y: inches(4.5),
            width: inches(7.0),
            height: inches(0.6),
            paragraphs: vec![subtitle.to_string()],
            format: TextFormat::default()
                .font(font::BODY)
                .size(18.0)
                .italic(true)
                .color(TAGLINE_BLUE),
            placeholder: Some(Placeholder::new(PlaceholderType::Subtitle)),
            bullet_color: None,
        });

        slide
    }

    fn content_slide(&self, content: &OutlineSlide, index: usize, accent: RGBColor) -> SlideShapes {
        let mut slide = SlideShapes {
            background: Some(BG_DARK),
            shapes: Vec::with_capacity(6 + content.bullets.len() * 3),
        };

        slide.shapes.push(Shape::Rectangle {
            x: 0,
            y: 0,
            width: SLIDE_WIDTH,
            height: inches(0.08),
            fill: accent,
        });
        slide.shapes.push(Shape::Rectangle {
            x: 0,
            y: 0,
            width: inches(0.4),
            height: SLIDE_HEIGHT,
            fill: accent,
        });

        slide.shapes.push(Shape::TextBox {
            x: inches(0.7),
            y: inches(0.25),
            width: inches(12.3),
            height: inches(0.9),
            paragraphs: vec![content.title.clone()],
            format: TextFormat::default()
                .font(font::BODY)
                .size(34.0)
                .bold(true)
                .color(WHITE),
            placeholder: Some(Placeholder::new(PlaceholderType::Title)),
            bullet_color: None,
        });

        // Divider under the heading.
        slide.shapes.push(Shape::Rectangle {
            x: inches(0.7),
            y: inches(1.15),
            width: inches(11.5),
            height: points(2.0),
            fill: accent,
        });

        // Slide number badge in the top-right corner.
        slide.shapes.push(Shape::Rectangle {
            x: inches(12.3),
            y: inches(0.25),
            width: inches(0.8),
            height: inches(0.6),
            fill: accent,
        });
        slide.shapes.push(Shape::TextBox {
            x: inches(12.3),
            y: inches(0.25),
            width: inches(0.8),
            height: inches(0.6),
            paragraphs: vec![format!("{:02}", index + 1)],
            format: TextFormat::default()
                .font(font::BODY)
                .size(16.0)
                .bold(true)
                .color(WHITE)
                .align(Align::Center),
            placeholder: None,
            bullet_color: None,
        });

        let y_start = inches(1.4);
        let row_height = inches(0.7);
        let rows = content.bullets.len().min(MAX_BULLET_ROWS);

        for row in 0..rows {
            let y = y_start + row as i64 * row_height;

            slide.shapes.push(Shape::Rectangle {
                x: inches(0.7),
                y,
                width: inches(11.5),
                height: inches(0.58),
                fill: BULLET_BG,
            });
            slide.shapes.push(Shape::Rectangle {
                x: inches(0.85),
                y: y + inches(0.2),
                width: inches(0.12),
                height: inches(0.18),
                fill: accent,
            });

            // The last visual row absorbs any overflow bullets so no text is
            // ever dropped from the package.
            let paragraphs: Vec<String> = if row + 1 == rows {
                content.bullets[row..].to_vec()
            } else {
                vec![content.bullets[row].clone()]
            };

            slide.shapes.push(Shape::TextBox {
                x: inches(1.15),
                y: y + points(2.0),
                width: inches(11.0),
                height: inches(0.55),
                paragraphs,
                format: TextFormat::default()
                    .font(font::BODY)
                    .size(18.0)
                    .color(LIGHT_GRAY),
                placeholder: Some(Placeholder::with_idx(PlaceholderType::Body, row as u32 + 1)),
                bullet_color: None,
            });
        }

        slide
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_slide(bullets: &[&str]) -> OutlineSlide {
        OutlineSlide {
            title: "Revenue Growth".into(),
            bullets: bullets.iter().map(|b| b.to_string()).collect(),
        }
    }

    #[test]
    fn test_accent_cycles_palette() {
        assert_eq!(accent_for(0), ACCENT_PALETTE[0]);
        assert_eq!(accent_for(3), ACCENT_PALETTE[3]);
        assert_eq!(accent_for(4), ACCENT_PALETTE[0]);
        assert_eq!(accent_for(9), ACCENT_PALETTE[1]);
    }

    #[test]
    fn test_title_slide_regions() {
        let theme = FallbackTheme::new();
        let slide = theme.title_slide("Q3 Business Review", "AI-Powered Presentation");

        let title_idx = slide.placeholder_index(|t| t.is_title()).unwrap();
        assert_eq!(
            slide.shapes[title_idx].paragraphs(),
            ["Q3 Business Review".to_string()]
        );
        let sub_idx = slide
            .placeholder_index(|t| t == PlaceholderType::Subtitle)
            .unwrap();
        assert_eq!(
            slide.shapes[sub_idx].paragraphs(),
            ["AI-Powered Presentation".to_string()]
        );
        assert_eq!(slide.background, Some(BG_DARK));
    }

    #[test]
    fn test_content_slide_bullet_rows_preserve_order() {
        let theme = FallbackTheme::new();
        let slide = theme.content_slide(&sample_slide(&["one", "two", "three"]), 0, accent_for(0));

        let bullets: Vec<&str> = slide
            .shapes
            .iter()
            .filter(|s| {
                s.placeholder()
                    .map(|p| p.ph_type == PlaceholderType::Body)
                    .unwrap_or(false)
            })
            .flat_map(|s| s.paragraphs().iter().map(|p| p.as_str()))
            .collect();
        assert_eq!(bullets, ["one", "two", "three"]);
    }

    #[test]
    fn test_overflow_bullets_fold_into_last_row() {
        let theme = FallbackTheme::new();
        let many: Vec<String> = (1..=8).map(|i| format!("point {}", i)).collect();
        let content = OutlineSlide {
            title: "Dense".into(),
            bullets: many.clone(),
        };
        let slide = theme.content_slide(&content, 2, accent_for(2));

        let body_boxes: Vec<&Shape> = slide
            .shapes
            .iter()
            .filter(|s| {
                s.placeholder()
                    .map(|p| p.ph_type == PlaceholderType::Body)
                    .unwrap_or(false)
            })
            .collect();
        assert_eq!(body_boxes.len(), 6);
        let all: Vec<String> = body_boxes
            .iter()
            .flat_map(|s| s.paragraphs().iter().cloned())
            .collect();
        assert_eq!(all, many);
        // Last row holds the overflow.
        assert_eq!(body_boxes[5].paragraphs().len(), 3);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let theme = FallbackTheme::new();
        let content = sample_slide(&["alpha", "beta"]);
        let a = theme.content_slide(&content, 5, accent_for(5));
        let b = theme.content_slide(&content, 5, accent_for(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_badge_shows_one_based_slide_number() {
        let theme = FallbackTheme::new();
        let slide = theme.content_slide(&sample_slide(&["x"]), 0, accent_for(0));
        let badge = slide
            .shapes
            .iter()
            .find(|s| s.paragraphs() == ["01".to_string()]);
        assert!(badge.is_some());
    }
}
