//! Package reader: reopen a `.pptx` and extract per-slide text and shapes.
//!
//! Used by the template loader to pull reference layouts out of a branded
//! file, and by round-trip verification to read back what the writer
//! produced. Slides are addressed in presentation order (numeric part
//! order), not archive order.

use crate::common::RGBColor;
use crate::common::error::{Error, Result};
use crate::deck::shapes::{Placeholder, PlaceholderType};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// A text-bearing or decorative shape parsed from a slide part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedShape {
    /// Placeholder tag, if the shape is a tagged region
    pub placeholder: Option<Placeholder>,
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Paragraph texts in document order
    pub paragraphs: Vec<String>,
    /// Formatting from the first run, where present
    pub font: Option<String>,
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<RGBColor>,
    /// Preset geometry name from `<a:prstGeom prst="..."/>`
    pub geometry: Option<String>,
    /// Solid fill of the shape body, where present
    pub fill: Option<RGBColor>,
}

impl ParsedShape {
    /// Whether the shape carries any text at all.
    pub fn has_text(&self) -> bool {
        !self.paragraphs.is_empty()
    }
}

/// Text content of one slide, grouped by placeholder semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideText {
    /// Primary heading (`ctrTitle` or `title` placeholder)
    pub title: Option<String>,
    /// Subtitle/attribution region
    pub subtitle: Option<String>,
    /// Bullet paragraphs from `body` placeholders, document order
    pub bullets: Vec<String>,
    /// Text from untagged shapes (badges, decorations)
    pub other: Vec<String>,
}

/// Reads slides out of a presentation package.
pub struct PackageReader<R: Read + Seek> {
    archive: ZipArchive<R>,
    slide_names: Vec<String>,
}

impl PackageReader<BufReader<File>> {
    /// Open a package from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> PackageReader<R> {
    /// Open a package from any seekable reader.
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(|e| Error::Zip(e.to_string()))?;

        // Collect slide parts and order them by slide number; archive order
        // is not meaningful.
        let mut numbered: Vec<(usize, String)> = archive
            .file_names()
            .filter_map(|name| {
                let rest = name.strip_prefix("ppt/slides/slide")?;
                let number: usize = rest.strip_suffix(".xml")?.parse().ok()?;
                Some((number, name.to_string()))
            })
            .collect();
        numbered.sort_by_key(|(number, _)| *number);

        Ok(Self {
            slide_names: numbered.into_iter().map(|(_, name)| name).collect(),
            archive,
        })
    }

    /// Number of slides in presentation order.
    pub fn slide_count(&self) -> usize {
        self.slide_names.len()
    }

    /// Raw XML of slide `index` (0-based, presentation order).
    pub fn slide_xml(&mut self, index: usize) -> Result<String> {
        let name = self
            .slide_names
            .get(index)
            .ok_or_else(|| Error::Zip(format!("no slide at index {}", index)))?
            .clone();
        let mut part = self
            .archive
            .by_name(&name)
            .map_err(|e| Error::Zip(e.to_string()))?;
        let mut xml = String::new();
        part.read_to_string(&mut xml)?;
        Ok(xml)
    }

    /// Parsed shapes of slide `index`.
    pub fn slide_shapes(&mut self, index: usize) -> Result<Vec<ParsedShape>> {
        let xml = self.slide_xml(index)?;
        parse_shapes(xml.as_bytes())
    }

    /// Solid background color of slide `index`, if one is set.
    pub fn slide_background(&mut self, index: usize) -> Result<Option<RGBColor>> {
        let xml = self.slide_xml(index)?;
        parse_background(xml.as_bytes())
    }

    /// Semantically grouped text of slide `index`.
    pub fn slide_text(&mut self, index: usize) -> Result<SlideText> {
        let shapes = self.slide_shapes(index)?;
        let mut text = SlideText::default();

        for shape in &shapes {
            if !shape.has_text() {
                continue;
            }
            match shape.placeholder.map(|p| p.ph_type) {
                Some(t) if t.is_title() => {
                    if text.title.is_none() {
                        text.title = Some(shape.paragraphs.join("\n"));
                    }
                },
                Some(PlaceholderType::Subtitle) => {
                    if text.subtitle.is_none() {
                        text.subtitle = Some(shape.paragraphs.join("\n"));
                    }
                },
                Some(PlaceholderType::Body) => {
                    text.bullets.extend(shape.paragraphs.iter().cloned());
                },
                _ => {
                    text.other.extend(shape.paragraphs.iter().cloned());
                },
            }
        }

        Ok(text)
    }
}

/// Parse the shapes of a slide part.
pub(crate) fn parse_shapes(xml: &[u8]) -> Result<Vec<ParsedShape>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut shapes = Vec::new();
    let mut current: Option<ParsedShape> = None;
    let mut paragraph: Option<String> = None;
    let mut in_text_run = false;
    let mut in_run_props = false;
    let mut in_shape_props = false;
    let mut in_text_body = false;
    let mut seen_run_props = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let tag = e.local_name();
                match tag.as_ref() {
                    b"sp" => {
                        current = Some(ParsedShape::default());
                        seen_run_props = false;
                        in_shape_props = false;
                        in_text_body = false;
                    },
                    b"spPr" => {
                        in_shape_props = current.is_some();
                    },
                    b"txBody" => {
                        in_text_body = current.is_some();
                    },
                    b"prstGeom" => {
                        if in_shape_props
                            && let Some(ref mut shape) = current
                        {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"prst" {
                                    shape.geometry =
                                        Some(String::from_utf8_lossy(&attr.value).to_string());
                                }
                            }
                        }
                    },
                    b"ph" => {
                        if let Some(ref mut shape) = current {
                            let mut ph_type = PlaceholderType::Body;
                            let mut idx = None;
                            for attr in e.attributes().flatten() {
                                let value = String::from_utf8_lossy(&attr.value).to_string();
                                match attr.key.as_ref() {
                                    // A ph without a type attribute (or with
                                    // one we do not model) is a body region.
                                    b"type" => {
                                        ph_type = PlaceholderType::parse(&value)
                                            .unwrap_or(PlaceholderType::Body);
                                    },
                                    b"idx" => idx = value.parse().ok(),
                                    _ => {},
                                }
                            }
                            shape.placeholder = Some(Placeholder { ph_type, idx });
                        }
                    },
                    b"off" => {
                        if let Some(ref mut shape) = current {
                            for attr in e.attributes().flatten() {
                                let value = String::from_utf8_lossy(&attr.value).to_string();
                                match attr.key.as_ref() {
                                    b"x" => shape.x = value.parse().ok(),
                                    b"y" => shape.y = value.parse().ok(),
                                    _ => {},
                                }
                            }
                        }
                    },
                    b"ext" => {
                        if let Some(ref mut shape) = current {
                            for attr in e.attributes().flatten() {
                                let value = String::from_utf8_lossy(&attr.value).to_string();
                                match attr.key.as_ref() {
                                    b"cx" => shape.width = value.parse().ok(),
                                    b"cy" => shape.height = value.parse().ok(),
                                    _ => {},
                                }
                            }
                        }
                    },
                    b"p" => {
                        if current.is_some() {
                            paragraph = Some(String::new());
                        }
                    },
                    b"t" => {
                        in_text_run = paragraph.is_some();
                    },
                    b"rPr" => {
                        if let Some(ref mut shape) = current {
                            if !seen_run_props {
                                seen_run_props = true;
                                for attr in e.attributes().flatten() {
                                    let value = String::from_utf8_lossy(&attr.value).to_string();
                                    match attr.key.as_ref() {
                                        b"sz" => {
                                            shape.size =
                                                value.parse::<f64>().ok().map(|v| v / 100.0);
                                        },
                                        b"b" => shape.bold = Some(value == "1"),
                                        b"i" => shape.italic = Some(value == "1"),
                                        _ => {},
                                    }
                                }
                                in_run_props = true;
                            }
                        }
                    },
                    b"latin" => {
                        if in_run_props
                            && let Some(ref mut shape) = current
                        {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"typeface" {
                                    shape.font =
                                        Some(String::from_utf8_lossy(&attr.value).to_string());
                                }
                            }
                        }
                    },
                    b"srgbClr" => {
                        if let Some(ref mut shape) = current {
                            let mut parsed = None;
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"val" {
                                    parsed = RGBColor::from_hex(&String::from_utf8_lossy(
                                        &attr.value,
                                    ));
                                }
                            }
                            if in_run_props && shape.color.is_none() {
                                shape.color = parsed;
                            } else if in_shape_props && !in_text_body && shape.fill.is_none() {
                                shape.fill = parsed;
                            }
                        }
                    },
                    _ => {},
                }
            },
            Ok(Event::Text(ref t)) => {
                if in_text_run
                    && let Some(ref mut text) = paragraph
                {
                    text.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            },
            // Escaped characters arrive as separate reference events, not as
            // part of the surrounding text.
            Ok(Event::GeneralRef(ref e)) => {
                if in_text_run
                    && let Some(ref mut text) = paragraph
                {
                    match &**e as &[u8] {
                        b"amp" => text.push('&'),
                        b"lt" => text.push('<'),
                        b"gt" => text.push('>'),
                        b"quot" => text.push('"'),
                        b"apos" => text.push('\''),
                        _ => {
                            if let Some(ch) = e
                                .resolve_char_ref()
                                .map_err(|err| Error::Xml(err.to_string()))?
                            {
                                text.push(ch);
                            }
                        },
                    }
                }
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"sp" => {
                    if let Some(shape) = current.take() {
                        shapes.push(shape);
                    }
                },
                b"p" => {
                    if let Some(text) = paragraph.take()
                        && !text.is_empty()
                        && let Some(ref mut shape) = current
                    {
                        shape.paragraphs.push(text);
                    }
                },
                b"t" => in_text_run = false,
                b"rPr" => in_run_props = false,
                b"spPr" => in_shape_props = false,
                b"txBody" => in_text_body = false,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(shapes)
}

/// Parse the slide's solid background fill from `<p:bg>`, if present.
pub(crate) fn parse_background(xml: &[u8]) -> Result<Option<RGBColor>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut in_bg = false;
    let mut background = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let tag = e.local_name();
                if tag.as_ref() == b"bg" {
                    in_bg = true;
                } else if in_bg && tag.as_ref() == b"srgbClr" && background.is_none() {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"val" {
                            background =
                                RGBColor::from_hex(&String::from_utf8_lossy(&attr.value));
                        }
                    }
                }
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"bg" {
                    break;
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(background)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{FallbackTheme, compose};
    use crate::outline::{Outline, OutlineSlide};
    use crate::pptx::writer::write_package;
    use std::io::Cursor;

    fn packaged(outline: &Outline) -> PackageReader<Cursor<Vec<u8>>> {
        let deck = compose(outline, &FallbackTheme::new()).unwrap();
        let mut buf = Vec::new();
        write_package(Cursor::new(&mut buf), &deck).unwrap();
        PackageReader::from_reader(Cursor::new(buf)).unwrap()
    }

    fn sample_outline() -> Outline {
        Outline {
            title: "Q3 Business Review".into(),
            slides: vec![OutlineSlide {
                title: "Revenue Growth".into(),
                bullets: vec!["Up 20% YoY".into(), "Expansion into 3 new markets".into()],
            }],
        }
    }

    #[test]
    fn test_slide_count_and_order() {
        let outline = Outline {
            title: "Deck".into(),
            slides: (1..=11)
                .map(|i| OutlineSlide {
                    title: format!("Slide {}", i),
                    bullets: vec![format!("Point {}", i)],
                })
                .collect(),
        };
        let mut reader = packaged(&outline);
        assert_eq!(reader.slide_count(), 12);
        // Slide 11 would sort before slide 2 lexically; numeric order must win.
        let text = reader.slide_text(2).unwrap();
        assert_eq!(text.title.as_deref(), Some("Slide 2"));
        let text = reader.slide_text(11).unwrap();
        assert_eq!(text.title.as_deref(), Some("Slide 11"));
    }

    #[test]
    fn test_round_trip_title_and_bullets() {
        let outline = sample_outline();
        let mut reader = packaged(&outline);

        let title = reader.slide_text(0).unwrap();
        assert_eq!(title.title.as_deref(), Some("Q3 Business Review"));
        assert_eq!(title.subtitle.as_deref(), Some("AI-Powered Presentation"));

        let content = reader.slide_text(1).unwrap();
        assert_eq!(content.title.as_deref(), Some("Revenue Growth"));
        assert_eq!(
            content.bullets,
            vec!["Up 20% YoY".to_string(), "Expansion into 3 new markets".to_string()]
        );
    }

    #[test]
    fn test_entity_references_resolved_in_text_runs() {
        let xml = concat!(
            "<p:sld><p:cSld><p:spTree><p:sp><p:txBody>",
            "<a:p><a:r><a:t>R&amp;D &lt;Q3&gt; &#8226; &quot;plan&quot;</a:t></a:r></a:p>",
            "</p:txBody></p:sp></p:spTree></p:cSld></p:sld>",
        );
        let shapes = parse_shapes(xml.as_bytes()).unwrap();
        assert_eq!(
            shapes[0].paragraphs,
            vec!["R&D <Q3> \u{2022} \"plan\"".to_string()]
        );
    }

    #[test]
    fn test_round_trip_preserves_special_characters() {
        let outline = Outline {
            title: "R&D <Review>".into(),
            slides: vec![OutlineSlide {
                title: "\"Quotes\" & 'apostrophes'".into(),
                bullets: vec!["5 > 3 & 2 < 4".into()],
            }],
        };
        let mut reader = packaged(&outline);
        assert_eq!(reader.slide_text(0).unwrap().title.as_deref(), Some("R&D <Review>"));
        let content = reader.slide_text(1).unwrap();
        assert_eq!(content.title.as_deref(), Some("\"Quotes\" & 'apostrophes'"));
        assert_eq!(content.bullets, vec!["5 > 3 & 2 < 4".to_string()]);
    }

    #[test]
    fn test_parsed_shape_formatting() {
        let mut reader = packaged(&sample_outline());
        let shapes = reader.slide_shapes(0).unwrap();
        let title = shapes
            .iter()
            .find(|s| s.placeholder.map(|p| p.ph_type.is_title()).unwrap_or(false))
            .unwrap();
        assert_eq!(title.size, Some(52.0));
        assert_eq!(title.bold, Some(true));
        assert_eq!(title.font.as_deref(), Some("Calibri"));
        assert!(title.x.is_some() && title.width.is_some());
    }

    #[test]
    fn test_background_and_decoration_fill_parsed() {
        let mut reader = packaged(&sample_outline());
        assert_eq!(
            reader.slide_background(0).unwrap(),
            Some(RGBColor::new(0x0F, 0x17, 0x2A))
        );
        let shapes = reader.slide_shapes(1).unwrap();
        let accent_bar = shapes
            .iter()
            .find(|s| !s.has_text() && s.geometry.as_deref() == Some("rect"))
            .unwrap();
        // First content slide uses the first palette accent.
        assert_eq!(accent_bar.fill, Some(RGBColor::new(0x35, 0x8E, 0xF1)));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = PackageReader::from_reader(Cursor::new(b"not a zip".to_vec()))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Zip(_)));
    }

    #[test]
    fn test_missing_slide_index() {
        let mut reader = packaged(&sample_outline());
        assert!(reader.slide_xml(5).is_err());
    }
}
