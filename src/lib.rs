//! # slidesmith
//!
//! A deterministic slide-deck assembly engine: structured outlines in, valid
//! PowerPoint (`.pptx`) packages out.
//!
//! The crate is organized as a pipeline:
//!
//! - [`outline`] — parse and validate outlines, including raw model output
//!   wrapped in code fences.
//! - [`deck`] — compose an outline into slides, using either a branded
//!   template ([`deck::TemplateHandle`]) or the built-in dark theme
//!   ([`deck::FallbackTheme`]).
//! - [`pptx`] — serialize composed decks into OPC packages and read packages
//!   back.
//! - [`store`] — hand out packages by unguessable token with TTL-based
//!   expiry.
//! - [`service`] — the assembled pipeline behind one request/response API.
//!
//! ## Quick start
//!
//! ```rust
//! use slidesmith::deck::{FallbackTheme, compose};
//! use slidesmith::outline::Outline;
//! use slidesmith::pptx::PackageWriter;
//!
//! # fn main() -> slidesmith::Result<()> {
//! let outline = Outline::from_model_text(
//!     r#"{"title": "Q3 Business Review",
//!         "slides": [{"title": "Revenue Growth",
//!                     "content": ["Up 20% YoY", "3 new markets"]}]}"#,
//! )?;
//! let deck = compose(&outline, &FallbackTheme::new())?;
//! # let dir = tempfile::tempdir().unwrap();
//! let path = PackageWriter::new(dir.path()).write(&deck)?;
//! assert!(path.ends_with("Q3_Business_Review.pptx"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Full pipeline
//!
//! [`service::DeckService`] wires everything together: it validates the
//! request, parses model output, falls back to the theme when the template
//! is unusable, writes the package atomically and registers it for
//! download.
//!
//! ```rust
//! use slidesmith::service::{DeckService, GenerateRequest, ServiceConfig};
//!
//! # fn main() -> slidesmith::Result<()> {
//! # let dir = tempfile::tempdir().unwrap();
//! let service = DeckService::new(ServiceConfig::new(dir.path()));
//! let mut request = GenerateRequest::new("Q3 Review", vec!["Highlights".into()]);
//! request.num_slides = 2;
//!
//! let response = service.generate(
//!     &request,
//!     r#"{"title": "Q3 Review", "slides": [{"title": "Highlights",
//!         "content": ["Record quarter"]}]}"#,
//! )?;
//! let (filename, bytes) = service.download(&response.token)?;
//! assert_eq!(filename, "Q3_Review.pptx");
//! assert!(!bytes.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod deck;
pub mod outline;
pub mod pptx;
pub mod service;
pub mod store;

// Re-exports
pub use common::{Error, Result};
pub use deck::{ComposedDeck, FallbackTheme, TemplateHandle, compose};
pub use outline::Outline;
pub use pptx::{PackageReader, PackageWriter};
pub use service::{DeckService, GenerateRequest, GenerateResponse, ServiceConfig};
pub use store::ArtifactStore;
