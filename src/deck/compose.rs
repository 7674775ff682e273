//! The composition orchestrator: validated outline + slide source in, fully
//! populated deck out.

use crate::common::Result;
use crate::deck::shapes::SlideShapes;
use crate::deck::{SlideSource, theme};
use crate::outline::Outline;

/// Fixed product attribution shown on the title slide's secondary region.
pub const ATTRIBUTION: &str = "AI-Powered Presentation";

/// A fully composed, in-memory deck: one title slide followed by the content
/// slides in outline order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedDeck {
    /// Deck title (also written to the package core properties)
    pub title: String,
    /// Rendered slides, title slide first
    pub slides: Vec<SlideShapes>,
}

impl ComposedDeck {
    /// Total rendered slide count, title slide included.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// Compose an outline into a deck using the given slide source.
///
/// The outline is re-validated so an invalid one can never reach rendering,
/// regardless of how it was constructed. Content slide `i` gets the accent
/// `ACCENT_PALETTE[i % len]`; accents affect decoration colors only.
///
/// # Examples
///
/// ```rust
/// use slidesmith::deck::{FallbackTheme, compose};
/// use slidesmith::outline::{Outline, OutlineSlide};
///
/// let outline = Outline {
///     title: "Q3 Business Review".into(),
///     slides: vec![OutlineSlide {
///         title: "Revenue Growth".into(),
///         bullets: vec!["Up 20% YoY".into()],
///     }],
/// };
/// let deck = compose(&outline, &FallbackTheme::new()).unwrap();
/// assert_eq!(deck.slide_count(), 2);
/// ```
pub fn compose(outline: &Outline, source: &dyn SlideSource) -> Result<ComposedDeck> {
    outline.validate()?;

    let mut slides = Vec::with_capacity(outline.slides.len() + 1);
    slides.push(source.title_slide(&outline.title, ATTRIBUTION));
    for (index, content) in outline.slides.iter().enumerate() {
        slides.push(source.content_slide(content, index, theme::accent_for(index)));
    }

    Ok(ComposedDeck {
        title: outline.title.clone(),
        slides,
    })
}
