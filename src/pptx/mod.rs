//! OPC package layer: serializing composed decks to `.pptx` and reading
//! them (or branded templates) back.

pub mod reader;
pub mod scaffold;
pub mod writer;

// Re-exports
pub use reader::{PackageReader, ParsedShape, SlideText};
pub use writer::PackageWriter;

/// Slide width in EMUs (13.333 inches, 16:9 widescreen).
pub const SLIDE_WIDTH: i64 = 12_192_000;
/// Slide height in EMUs (7.5 inches).
pub const SLIDE_HEIGHT: i64 = 6_858_000;
