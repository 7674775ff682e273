//! Deck composition: outline in, fully populated slides out.
//!
//! The composer is written against one capability, [`SlideSource`]: produce a
//! title slide and a content slide. A loaded branded template
//! ([`template::TemplateHandle`]) and the built-in theme
//! ([`theme::FallbackTheme`]) are the two implementations; the caller selects
//! one per composition and the composer never knows which it got.

pub mod compose;
pub mod shapes;
pub mod template;
pub mod theme;

// Re-exports
pub use compose::{ComposedDeck, compose};
pub use shapes::{Shape, SlideShapes};
pub use template::TemplateHandle;
pub use theme::FallbackTheme;

use crate::common::RGBColor;
use crate::outline::OutlineSlide;

/// Fixed fonts used by synthesized slides.
pub mod font {
    pub const BODY: &str = "Calibri";
}

/// A source of slide shapes: either a cloned branded template or the
/// synthesized fallback theme.
pub trait SlideSource {
    /// Produce the title slide with the deck title and an attribution line.
    fn title_slide(&self, title: &str, subtitle: &str) -> SlideShapes;

    /// Produce content slide `index` (0-based). `accent` is the
    /// deterministic color hint for this position; implementations apply it
    /// to decorations only, never to text content.
    fn content_slide(&self, content: &OutlineSlide, index: usize, accent: RGBColor) -> SlideShapes;
}
