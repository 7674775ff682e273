/// Shape model for composed slides and its XML emission.
use crate::common::error::{Error, Result};
use crate::common::RGBColor;
use std::fmt::Write as FmtWrite;

/// Escape XML special characters.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Placeholder kinds carried through the package so a reopened slide can be
/// read back semantically (title vs. bullets) rather than positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderType {
    /// Centered title on the title slide (`ctrTitle`)
    CenteredTitle,
    /// Heading on a content slide (`title`)
    Title,
    /// Subtitle/attribution region (`subTitle`)
    Subtitle,
    /// Bullet body region (`body`)
    Body,
}

impl PlaceholderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderType::CenteredTitle => "ctrTitle",
            PlaceholderType::Title => "title",
            PlaceholderType::Subtitle => "subTitle",
            PlaceholderType::Body => "body",
        }
    }

    /// Parse a `<p:ph type="..."/>` value. Unknown types map to `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ctrTitle" => Some(PlaceholderType::CenteredTitle),
            "title" => Some(PlaceholderType::Title),
            "subTitle" => Some(PlaceholderType::Subtitle),
            "body" => Some(PlaceholderType::Body),
            _ => None,
        }
    }

    /// Whether this placeholder carries a slide's primary heading text.
    pub fn is_title(&self) -> bool {
        matches!(self, PlaceholderType::CenteredTitle | PlaceholderType::Title)
    }
}

/// A placeholder tag on a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub ph_type: PlaceholderType,
    /// Placeholder index, required when several body regions share a slide
    pub idx: Option<u32>,
}

impl Placeholder {
    pub fn new(ph_type: PlaceholderType) -> Self {
        Self { ph_type, idx: None }
    }

    pub fn with_idx(ph_type: PlaceholderType, idx: u32) -> Self {
        Self {
            ph_type,
            idx: Some(idx),
        }
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
            Align::Right => "r",
        }
    }
}

/// Run-level text formatting applied uniformly to a text box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFormat {
    /// Font family (e.g. "Calibri")
    pub font: Option<String>,
    /// Font size in points
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<RGBColor>,
    pub align: Align,
}

impl TextFormat {
    /// Builder method: set font.
    pub fn font(mut self, font: &str) -> Self {
        self.font = Some(font.to_string());
        self
    }

    /// Builder method: set font size in points.
    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    /// Builder method: set bold.
    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Builder method: set italic.
    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Builder method: set text color.
    pub fn color(mut self, color: RGBColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Builder method: set alignment.
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// A shape on a composed slide.
///
/// Geometry is in EMUs. Text boxes hold one or more paragraphs; a paragraph
/// per bullet preserves bullet order through serialization and back.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    TextBox {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        paragraphs: Vec<String>,
        format: TextFormat,
        placeholder: Option<Placeholder>,
        /// When set, paragraphs render with a bullet glyph in this color.
        /// This is the only accent-sensitive part of a text box.
        bullet_color: Option<RGBColor>,
    },
    Rectangle {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        fill: RGBColor,
    },
    Ellipse {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        fill: RGBColor,
    },
}

impl Shape {
    /// Create a plain text box with a single paragraph.
    pub fn text_box(text: &str, x: i64, y: i64, width: i64, height: i64) -> Self {
        Shape::TextBox {
            x,
            y,
            width,
            height,
            paragraphs: vec![text.to_string()],
            format: TextFormat::default(),
            placeholder: None,
            bullet_color: None,
        }
    }

    /// The placeholder tag, if this shape is a tagged text box.
    pub fn placeholder(&self) -> Option<Placeholder> {
        match self {
            Shape::TextBox { placeholder, .. } => *placeholder,
            _ => None,
        }
    }

    /// Paragraph texts, empty for non-text shapes.
    pub fn paragraphs(&self) -> &[String] {
        match self {
            Shape::TextBox { paragraphs, .. } => paragraphs,
            _ => &[],
        }
    }

    /// Replace the text content of a text box. No-op on other shapes.
    pub fn set_paragraphs(&mut self, texts: Vec<String>) {
        if let Shape::TextBox { paragraphs, .. } = self {
            *paragraphs = texts;
        }
    }

    /// Set the bullet glyph color of a text box. No-op on other shapes.
    pub fn set_bullet_color(&mut self, color: RGBColor) {
        if let Shape::TextBox { bullet_color, .. } = self {
            *bullet_color = Some(color);
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Shape::TextBox { placeholder, .. } => match placeholder.map(|p| p.ph_type) {
                Some(PlaceholderType::CenteredTitle) | Some(PlaceholderType::Title) => "Title",
                Some(PlaceholderType::Subtitle) => "Subtitle",
                Some(PlaceholderType::Body) => "Content Placeholder",
                None => "Text Box",
            },
            Shape::Rectangle { .. } => "Rectangle",
            Shape::Ellipse { .. } => "Ellipse",
        }
    }

    /// Generate XML for this shape.
    pub(crate) fn to_xml(&self, xml: &mut String, shape_id: u32) -> Result<()> {
        match self {
            Shape::TextBox {
                x,
                y,
                width,
                height,
                paragraphs,
                format,
                placeholder,
                bullet_color,
            } => {
                xml.push_str("<p:sp>");
                xml.push_str("<p:nvSpPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="{} {}"/>"#,
                    shape_id,
                    self.display_name(),
                    shape_id
                )
                .map_err(|e| Error::Xml(e.to_string()))?;
                match placeholder {
                    Some(ph) => {
                        xml.push_str("<p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr>");
                        xml.push_str("<p:nvPr>");
                        match ph.idx {
                            Some(idx) => write!(
                                xml,
                                r#"<p:ph type="{}" idx="{}"/>"#,
                                ph.ph_type.as_str(),
                                idx
                            ),
                            None => write!(xml, r#"<p:ph type="{}"/>"#, ph.ph_type.as_str()),
                        }
                        .map_err(|e| Error::Xml(e.to_string()))?;
                        xml.push_str("</p:nvPr>");
                    },
                    None => {
                        xml.push_str("<p:cNvSpPr txBox=\"1\"/>");
                        xml.push_str("<p:nvPr/>");
                    },
                }
                xml.push_str("</p:nvSpPr>");

                xml.push_str("<p:spPr>");
                xml.push_str("<a:xfrm>");
                write!(xml, r#"<a:off x="{}" y="{}"/>"#, x, y)
                    .map_err(|e| Error::Xml(e.to_string()))?;
                write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, width, height)
                    .map_err(|e| Error::Xml(e.to_string()))?;
                xml.push_str("</a:xfrm>");
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                xml.push_str("</p:spPr>");

                xml.push_str("<p:txBody>");
                xml.push_str(r#"<a:bodyPr wrap="square" rtlCol="0"/>"#);
                xml.push_str("<a:lstStyle/>");

                if paragraphs.is_empty() {
                    xml.push_str("<a:p/>");
                }
                for text in paragraphs {
                    xml.push_str("<a:p>");
                    self.write_paragraph_props(xml, format, *bullet_color)?;
                    xml.push_str("<a:r>");
                    self.write_run_props(xml, format)?;
                    write!(xml, "<a:t>{}</a:t>", escape_xml(text))
                        .map_err(|e| Error::Xml(e.to_string()))?;
                    xml.push_str("</a:r>");
                    xml.push_str("</a:p>");
                }

                xml.push_str("</p:txBody>");
                xml.push_str("</p:sp>");
            },
            Shape::Rectangle {
                x,
                y,
                width,
                height,
                fill,
            } => {
                self.write_fill_shape(xml, shape_id, "rect", *x, *y, *width, *height, *fill)?;
            },
            Shape::Ellipse {
                x,
                y,
                width,
                height,
                fill,
            } => {
                self.write_fill_shape(xml, shape_id, "ellipse", *x, *y, *width, *height, *fill)?;
            },
        }

        Ok(())
    }

    fn write_paragraph_props(
        &self,
        xml: &mut String,
        format: &TextFormat,
        bullet_color: Option<RGBColor>,
    ) -> Result<()> {
        if format.align == Align::Left && bullet_color.is_none() {
            return Ok(());
        }
        if format.align == Align::Left {
            xml.push_str("<a:pPr>");
        } else {
            write!(xml, r#"<a:pPr algn="{}">"#, format.align.as_str())
                .map_err(|e| Error::Xml(e.to_string()))?;
        }
        if let Some(color) = bullet_color {
            write!(
                xml,
                r#"<a:buClr><a:srgbClr val="{}"/></a:buClr>"#,
                color.to_hex()
            )
            .map_err(|e| Error::Xml(e.to_string()))?;
            xml.push_str(r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/>"#);
        }
        xml.push_str("</a:pPr>");
        Ok(())
    }

    fn write_run_props(&self, xml: &mut String, format: &TextFormat) -> Result<()> {
        xml.push_str("<a:rPr lang=\"en-US\" dirty=\"0\"");

        if let Some(size) = format.size {
            write!(xml, " sz=\"{}\"", (size * 100.0) as u32)
                .map_err(|e| Error::Xml(e.to_string()))?;
        }
        if let Some(true) = format.bold {
            xml.push_str(" b=\"1\"");
        }
        if let Some(true) = format.italic {
            xml.push_str(" i=\"1\"");
        }

        xml.push('>');

        if let Some(color) = format.color {
            write!(
                xml,
                "<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>",
                color.to_hex()
            )
            .map_err(|e| Error::Xml(e.to_string()))?;
        }
        if let Some(ref font) = format.font {
            write!(xml, "<a:latin typeface=\"{}\"/>", escape_xml(font))
                .map_err(|e| Error::Xml(e.to_string()))?;
        }

        xml.push_str("</a:rPr>");
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_fill_shape(
        &self,
        xml: &mut String,
        shape_id: u32,
        geometry: &str,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        fill: RGBColor,
    ) -> Result<()> {
        xml.push_str("<p:sp>");
        xml.push_str("<p:nvSpPr>");
        write!(
            xml,
            r#"<p:cNvPr id="{}" name="{} {}"/>"#,
            shape_id,
            self.display_name(),
            shape_id
        )
        .map_err(|e| Error::Xml(e.to_string()))?;
        xml.push_str("<p:cNvSpPr/>");
        xml.push_str("<p:nvPr/>");
        xml.push_str("</p:nvSpPr>");

        xml.push_str("<p:spPr>");
        xml.push_str("<a:xfrm>");
        write!(xml, r#"<a:off x="{}" y="{}"/>"#, x, y).map_err(|e| Error::Xml(e.to_string()))?;
        write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, width, height)
            .map_err(|e| Error::Xml(e.to_string()))?;
        xml.push_str("</a:xfrm>");
        write!(xml, r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#, geometry)
            .map_err(|e| Error::Xml(e.to_string()))?;
        xml.push_str("<a:solidFill>");
        write!(xml, r#"<a:srgbClr val="{}"/>"#, fill.to_hex())
            .map_err(|e| Error::Xml(e.to_string()))?;
        xml.push_str("</a:solidFill>");
        xml.push_str(r#"<a:ln><a:noFill/></a:ln>"#);
        xml.push_str("</p:spPr>");
        xml.push_str("</p:sp>");
        Ok(())
    }
}

/// All shapes for one rendered slide, plus its background fill.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideShapes {
    /// Solid background color; `None` inherits from the layout
    pub background: Option<RGBColor>,
    /// Shapes in z-order (first is bottom-most)
    pub shapes: Vec<Shape>,
}

impl SlideShapes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the first text box tagged with a placeholder satisfying `pred`.
    pub fn placeholder_index(&self, pred: impl Fn(PlaceholderType) -> bool) -> Option<usize> {
        self.shapes
            .iter()
            .position(|s| s.placeholder().map(|p| pred(p.ph_type)).unwrap_or(false))
    }

    /// Generate the full slide part XML.
    pub(crate) fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
        );
        xml.push_str("<p:cSld>");

        if let Some(bg) = self.background {
            xml.push_str("<p:bg><p:bgPr><a:solidFill>");
            write!(xml, r#"<a:srgbClr val="{}"/>"#, bg.to_hex())
                .map_err(|e| Error::Xml(e.to_string()))?;
            xml.push_str("</a:solidFill><a:effectLst/></p:bgPr></p:bg>");
        }

        xml.push_str("<p:spTree>");
        xml.push_str("<p:nvGrpSpPr>");
        xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
        xml.push_str("<p:cNvGrpSpPr/>");
        xml.push_str("<p:nvPr/>");
        xml.push_str("</p:nvGrpSpPr>");
        xml.push_str("<p:grpSpPr>");
        xml.push_str("<a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>");
        xml.push_str("<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm>");
        xml.push_str("</p:grpSpPr>");

        // Group shape uses id=1, so content shapes start at id=2.
        for (index, shape) in self.shapes.iter().enumerate() {
            shape.to_xml(&mut xml, index as u32 + 2)?;
        }

        xml.push_str("</p:spTree>");
        xml.push_str("</p:cSld>");
        xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
        xml.push_str("</p:sld>");

        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("R&D <Q3>"), "R&amp;D &lt;Q3&gt;");
    }

    #[test]
    fn test_text_box_xml() {
        let mut slide = SlideShapes::new();
        slide.shapes.push(Shape::text_box(
            "Hello",
            914_400,
            914_400,
            1_828_800,
            457_200,
        ));
        let xml = slide.to_xml().unwrap();
        assert!(xml.contains("<p:sld"));
        assert!(xml.contains("<a:t>Hello</a:t>"));
        assert!(xml.contains(r#"<a:off x="914400" y="914400"/>"#));
        assert!(xml.contains("txBox=\"1\""));
    }

    #[test]
    fn test_placeholder_emitted() {
        let mut slide = SlideShapes::new();
        let mut title = Shape::text_box("Deck", 0, 0, 100, 100);
        if let Shape::TextBox { placeholder, .. } = &mut title {
            *placeholder = Some(Placeholder::new(PlaceholderType::CenteredTitle));
        }
        slide.shapes.push(title);
        let xml = slide.to_xml().unwrap();
        assert!(xml.contains(r#"<p:ph type="ctrTitle"/>"#));
        assert!(xml.contains("spLocks"));
    }

    #[test]
    fn test_bullet_color_emitted_per_paragraph() {
        let mut slide = SlideShapes::new();
        let mut body = Shape::text_box("First", 0, 0, 100, 100);
        body.set_paragraphs(vec!["First".into(), "Second".into()]);
        body.set_bullet_color(RGBColor::new(0x35, 0x8E, 0xF1));
        slide.shapes.push(body);
        let xml = slide.to_xml().unwrap();
        assert_eq!(xml.matches("<a:buClr>").count(), 2);
        assert!(xml.contains(r#"<a:srgbClr val="358EF1"/>"#));
    }

    #[test]
    fn test_background_fill() {
        let slide = SlideShapes {
            background: Some(RGBColor::new(0x0F, 0x17, 0x2A)),
            shapes: Vec::new(),
        };
        let xml = slide.to_xml().unwrap();
        assert!(xml.contains(r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="0F172A"/>"#));
    }

    #[test]
    fn test_rectangle_and_ellipse_geometry() {
        let mut slide = SlideShapes::new();
        slide.shapes.push(Shape::Rectangle {
            x: 0,
            y: 0,
            width: 10,
            height: 20,
            fill: RGBColor::new(1, 2, 3),
        });
        slide.shapes.push(Shape::Ellipse {
            x: 5,
            y: 5,
            width: 30,
            height: 30,
            fill: RGBColor::new(4, 5, 6),
        });
        let xml = slide.to_xml().unwrap();
        assert!(xml.contains(r#"<a:prstGeom prst="rect">"#));
        assert!(xml.contains(r#"<a:prstGeom prst="ellipse">"#));
        // Group shape is id 1, content shapes follow.
        assert!(xml.contains(r#"id="2" name="Rectangle 2""#));
        assert!(xml.contains(r#"id="3" name="Ellipse 3""#));
    }
}
