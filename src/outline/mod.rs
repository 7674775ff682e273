//! Validated outline types consumed by composition.
//!
//! The language-model collaborator returns loosely structured JSON. Nothing
//! downstream of this module ever sees that raw shape: an outline must pass
//! through [`Outline::from_value`] (or [`Outline::from_model_text`]), which
//! converts it into typed data and rejects any deviation with
//! [`Error::OutlineInvalid`](crate::common::Error::OutlineInvalid) instead of
//! letting partial fields propagate.

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Lower bound on content slides per deck.
pub const MIN_CONTENT_SLIDES: usize = 1;
/// Upper bound on content slides per deck.
pub const MAX_CONTENT_SLIDES: usize = 14;

/// One titled bullet group, rendered as a single content slide.
///
/// The wire shape uses `content` for the bullet list, matching the model
/// response contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSlide {
    /// Slide heading (non-empty once validated)
    pub title: String,
    /// Ordered bullet paragraphs (at least one once validated)
    #[serde(rename = "content")]
    pub bullets: Vec<String>,
}

/// The validated, structured content for one generation request: a deck
/// title plus an ordered list of content slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Deck title, shown on the title slide
    pub title: String,
    /// Ordered content slides
    pub slides: Vec<OutlineSlide>,
}

impl Outline {
    /// Convert a raw JSON value into a validated outline.
    ///
    /// Fails with `OutlineInvalid` if the value does not deserialize into the
    /// expected shape or violates the content contract.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slidesmith::outline::Outline;
    ///
    /// let raw = serde_json::json!({
    ///     "title": "Q3 Business Review",
    ///     "slides": [
    ///         {"title": "Revenue Growth", "content": ["Up 20% YoY"]}
    ///     ]
    /// });
    /// let outline = Outline::from_value(raw).unwrap();
    /// assert_eq!(outline.slides.len(), 1);
    /// ```
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let outline: Outline = serde_json::from_value(value)
            .map_err(|e| Error::OutlineInvalid(format!("malformed outline: {}", e)))?;
        outline.validate()?;
        Ok(outline)
    }

    /// Convert raw model output text into a validated outline.
    ///
    /// Models routinely wrap JSON in Markdown code fences despite being asked
    /// not to; fences are stripped before parsing. Any remaining parse
    /// failure is `OutlineInvalid`.
    pub fn from_model_text(text: &str) -> Result<Self> {
        let stripped = strip_code_fences(text);
        let value: serde_json::Value = serde_json::from_str(stripped)
            .map_err(|e| Error::OutlineInvalid(format!("model output is not JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Check the content contract: non-empty deck title, slide count within
    /// bounds, every slide with a non-empty title and at least one non-empty
    /// bullet.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::OutlineInvalid("deck title is empty".into()));
        }
        if self.slides.len() < MIN_CONTENT_SLIDES || self.slides.len() > MAX_CONTENT_SLIDES {
            return Err(Error::OutlineInvalid(format!(
                "expected between {} and {} content slides, got {}",
                MIN_CONTENT_SLIDES,
                MAX_CONTENT_SLIDES,
                self.slides.len()
            )));
        }
        for (index, slide) in self.slides.iter().enumerate() {
            if slide.title.trim().is_empty() {
                return Err(Error::OutlineInvalid(format!(
                    "slide {} has an empty title",
                    index + 1
                )));
            }
            if slide.bullets.is_empty() {
                return Err(Error::OutlineInvalid(format!(
                    "slide {} has no bullets",
                    index + 1
                )));
            }
            if slide.bullets.iter().any(|b| b.trim().is_empty()) {
                return Err(Error::OutlineInvalid(format!(
                    "slide {} has an empty bullet",
                    index + 1
                )));
            }
        }
        Ok(())
    }
}

/// Strip Markdown code fences (```json ... ```) from model output.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
