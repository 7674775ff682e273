//! Branded template loading.
//!
//! A template is an ordinary presentation package with exactly two reference
//! slides: a title layout and a content layout with a bullet region. Loading
//! extracts both as immutable prototypes; composition clones a prototype per
//! slide and rewrites only its placeholder regions, so every other branded
//! shape (logos, bars, footers) survives untouched.
//!
//! Any defect in the file (missing, not a package, wrong slide count, no
//! usable regions) fails closed with
//! [`Error::TemplateInvalid`](crate::common::Error::TemplateInvalid) so the
//! caller can fall back to the built-in theme.

use crate::common::RGBColor;
use crate::common::error::{Error, Result};
use crate::common::unit::inches;
use crate::deck::SlideSource;
use crate::deck::shapes::{PlaceholderType, Shape, SlideShapes, TextFormat};
use crate::outline::OutlineSlide;
use crate::pptx::reader::{PackageReader, ParsedShape};
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;

/// Reference layouts extracted from a branded template.
///
/// Prototypes are never mutated after load, only cloned per composed slide.
#[derive(Debug, Clone)]
pub struct TemplateHandle {
    title_proto: SlideShapes,
    content_proto: SlideShapes,
    title_region: usize,
    subtitle_region: Option<usize>,
    heading_region: Option<usize>,
    body_region: usize,
}

impl TemplateHandle {
    /// Load a template from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = PackageReader::open(path)
            .map_err(|e| Error::TemplateInvalid(format!("{}: {}", path.display(), e)))?;
        Self::from_package(reader)
    }

    /// Extract the reference layouts from an opened package.
    pub fn from_package<R: Read + Seek>(mut reader: PackageReader<R>) -> Result<Self> {
        if reader.slide_count() != 2 {
            return Err(Error::TemplateInvalid(format!(
                "expected exactly 2 reference slides (title, content), found {}",
                reader.slide_count()
            )));
        }

        let title_proto = load_prototype(&mut reader, 0)?;
        let content_proto = load_prototype(&mut reader, 1)?;

        let (title_region, subtitle_region) = title_regions(&title_proto)?;
        let (heading_region, body_region) = content_regions(&content_proto)?;

        Ok(Self {
            title_proto,
            content_proto,
            title_region,
            subtitle_region,
            heading_region,
            body_region,
        })
    }
}

impl SlideSource for TemplateHandle {
    fn title_slide(&self, title: &str, subtitle: &str) -> SlideShapes {
        let mut slide = self.title_proto.clone();
        slide.shapes[self.title_region].set_paragraphs(vec![title.to_string()]);
        match self.subtitle_region {
            Some(index) => slide.shapes[index].set_paragraphs(vec![subtitle.to_string()]),
            None => debug!("template title layout has no subtitle region, skipping attribution"),
        }
        slide
    }

    fn content_slide(&self, content: &OutlineSlide, _index: usize, accent: RGBColor) -> SlideShapes {
        let mut slide = self.content_proto.clone();
        match self.heading_region {
            Some(index) => slide.shapes[index].set_paragraphs(vec![content.title.clone()]),
            None => debug!(
                slide_title = %content.title,
                "template content layout has no heading region, skipping slide title"
            ),
        }
        let body = &mut slide.shapes[self.body_region];
        body.set_paragraphs(content.bullets.clone());
        body.set_bullet_color(accent);
        slide
    }
}

/// Convert one template slide into a prototype, dropping shapes that cannot
/// be represented (pictures, exotic geometry without a solid fill).
fn load_prototype<R: Read + Seek>(
    reader: &mut PackageReader<R>,
    index: usize,
) -> Result<SlideShapes> {
    let background = reader
        .slide_background(index)
        .map_err(|e| Error::TemplateInvalid(e.to_string()))?;
    let parsed = reader
        .slide_shapes(index)
        .map_err(|e| Error::TemplateInvalid(e.to_string()))?;

    Ok(SlideShapes {
        background,
        shapes: parsed.iter().filter_map(convert_shape).collect(),
    })
}

fn convert_shape(shape: &ParsedShape) -> Option<Shape> {
    let is_text = shape.placeholder.is_some() || !shape.paragraphs.is_empty();
    if is_text {
        let (dx, dy, dw, dh) = default_geometry(shape);
        return Some(Shape::TextBox {
            x: shape.x.unwrap_or(dx),
            y: shape.y.unwrap_or(dy),
            width: shape.width.unwrap_or(dw),
            height: shape.height.unwrap_or(dh),
            paragraphs: shape.paragraphs.clone(),
            format: TextFormat {
                font: shape.font.clone(),
                size: shape.size,
                bold: shape.bold,
                italic: shape.italic,
                color: shape.color,
                align: Default::default(),
            },
            placeholder: shape.placeholder,
            bullet_color: None,
        });
    }

    let fill = shape.fill?;
    let (x, y) = (shape.x?, shape.y?);
    let (width, height) = (shape.width?, shape.height?);
    match shape.geometry.as_deref() {
        Some("ellipse") => Some(Shape::Ellipse {
            x,
            y,
            width,
            height,
            fill,
        }),
        _ => Some(Shape::Rectangle {
            x,
            y,
            width,
            height,
            fill,
        }),
    }
}

/// Fallback geometry for placeholder boxes that inherit theirs from the
/// template's own layout parts, which are not consulted.
fn default_geometry(shape: &ParsedShape) -> (i64, i64, i64, i64) {
    match shape.placeholder.map(|p| p.ph_type) {
        Some(PlaceholderType::CenteredTitle) => {
            (inches(0.8), inches(2.5), inches(8.0), inches(1.8))
        },
        Some(PlaceholderType::Subtitle) => (inches(0.8), inches(4.5), inches(7.0), inches(0.6)),
        Some(PlaceholderType::Title) => (inches(0.7), inches(0.25), inches(12.3), inches(0.9)),
        _ => (inches(0.7), inches(1.4), inches(11.5), inches(4.9)),
    }
}

/// Indices of all text boxes in z-order.
fn text_box_indices(slide: &SlideShapes) -> Vec<usize> {
    slide
        .shapes
        .iter()
        .enumerate()
        .filter(|(_, s)| matches!(s, Shape::TextBox { .. }))
        .map(|(i, _)| i)
        .collect()
}

/// Locate the title (required) and subtitle (optional) regions on the title
/// layout. Untagged templates fall back to z-order: first text box is the
/// title, the next one the subtitle.
fn title_regions(slide: &SlideShapes) -> Result<(usize, Option<usize>)> {
    let boxes = text_box_indices(slide);
    let title = slide
        .placeholder_index(|t| t.is_title())
        .or_else(|| boxes.first().copied())
        .ok_or_else(|| {
            Error::TemplateInvalid("title layout has no title text region".into())
        })?;
    let subtitle = slide
        .placeholder_index(|t| t == PlaceholderType::Subtitle)
        .or_else(|| boxes.iter().copied().find(|&i| i != title));
    Ok((title, subtitle))
}

/// Locate the heading (optional) and bullet body (required) regions on the
/// content layout.
fn content_regions(slide: &SlideShapes) -> Result<(Option<usize>, usize)> {
    let boxes = text_box_indices(slide);
    let heading = slide.placeholder_index(|t| t.is_title());
    let body = slide
        .placeholder_index(|t| t == PlaceholderType::Body)
        .or_else(|| match heading {
            Some(h) => boxes.iter().copied().find(|&i| i != h),
            None if boxes.len() >= 2 => Some(boxes[1]),
            None => boxes.first().copied(),
        })
        .ok_or_else(|| {
            Error::TemplateInvalid("content layout has no bullet text region".into())
        })?;
    // An untagged single-box layout serves as body, not heading.
    let heading = heading.or_else(|| boxes.iter().copied().find(|&i| i != body));
    Ok((heading, body))
}
