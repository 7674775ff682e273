//! Deck generation service: request validation, model-output parsing,
//! composition, packaging and token-based download, wired together behind a
//! small API surface.
//!
//! The model call itself lives outside this crate; callers bring the raw
//! model text (built from [`outline_prompt`]) and get back a packaged deck
//! registered in the artifact store.

use crate::common::error::{Error, Result};
use crate::deck::{FallbackTheme, SlideSource, TemplateHandle, compose};
use crate::outline::{Outline, OutlineSlide};
use crate::pptx::PackageWriter;
use crate::store::{Artifact, ArtifactStore};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

/// Request bounds for the total slide count, title slide included.
pub const MIN_SLIDES: u32 = 2;
pub const MAX_SLIDES: u32 = 15;

const DEFAULT_SLIDES: u32 = 5;

/// Requested voice for the generated outline. Affects only the prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Executive,
    Technical,
    Academic,
    Sales,
    Simple,
}

impl Tone {
    /// The tone-and-audience instruction woven into the prompt.
    fn instruction(&self) -> &'static str {
        match self {
            Tone::Professional => {
                "Write in a professional, formal business tone. Use precise, \
                 concise language suitable for corporate stakeholders."
            },
            Tone::Executive => {
                "Write for a C-suite executive audience. Use strategic, \
                 high-level language, focus on business impact, ROI, and \
                 outcomes, and be direct and authoritative."
            },
            Tone::Technical => {
                "Write for a technical audience of engineers, developers, and \
                 analysts. Use specific technical terminology, include \
                 implementation details, and reference best practices."
            },
            Tone::Academic => {
                "Write in an academic tone. Use formal language, reference \
                 evidence-based insights, and structure content logically \
                 with clear arguments."
            },
            Tone::Sales => {
                "Write in a persuasive, energetic sales tone. Emphasize \
                 benefits, value propositions, customer outcomes, and calls \
                 to action."
            },
            Tone::Simple => {
                "Write in simple, clear language that anyone can understand. \
                 Avoid jargon, use short sentences and relatable examples."
            },
        }
    }
}

/// A deck generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Deck title, shown on the title slide and used for the filename
    pub title: String,
    /// Topics the model should distribute across the content slides
    pub topics: Vec<String>,
    /// Total slides including the title slide
    #[serde(default = "default_slides")]
    pub num_slides: u32,
    /// Free-text background woven into the prompt when non-empty
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub tone: Tone,
}

fn default_slides() -> u32 {
    DEFAULT_SLIDES
}

impl GenerateRequest {
    pub fn new(title: impl Into<String>, topics: Vec<String>) -> Self {
        Self {
            title: title.into(),
            topics,
            num_slides: DEFAULT_SLIDES,
            context: String::new(),
            tone: Tone::default(),
        }
    }

    /// Reject empty titles, empty topic lists and out-of-bounds slide counts.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::OutlineInvalid("title must not be empty".into()));
        }
        if self.topics.iter().all(|t| t.trim().is_empty()) {
            return Err(Error::OutlineInvalid(
                "at least one non-empty topic is required".into(),
            ));
        }
        if !(MIN_SLIDES..=MAX_SLIDES).contains(&self.num_slides) {
            return Err(Error::OutlineInvalid(format!(
                "num_slides must be between {} and {}, got {}",
                MIN_SLIDES, MAX_SLIDES, self.num_slides
            )));
        }
        Ok(())
    }
}

/// Outcome of a successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Deck title, as requested
    pub title: String,
    /// The validated content slides, for previewing before download
    pub slides: Vec<OutlineSlide>,
    /// Filename the download will carry
    pub filename: String,
    /// Download token for the artifact store
    pub token: String,
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory packaged decks are written into
    pub output_dir: PathBuf,
    /// Optional branded template; invalid or missing files fall back to the
    /// built-in theme
    pub template_path: Option<PathBuf>,
    /// Artifact lifetime in the store
    pub artifact_ttl: Duration,
}

impl ServiceConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            template_path: None,
            artifact_ttl: crate::store::DEFAULT_TTL,
        }
    }

    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    pub fn with_artifact_ttl(mut self, ttl: Duration) -> Self {
        self.artifact_ttl = ttl;
        self
    }
}

/// Build the instruction text a model should be given for `request`.
///
/// The reply format it asks for is exactly what
/// [`Outline::from_model_text`] parses.
pub fn outline_prompt(request: &GenerateRequest) -> String {
    let content_slides = request.num_slides - 1;
    let context_block = if request.context.trim().is_empty() {
        String::new()
    } else {
        format!(
            "Additional context about this presentation:\n{}\n\
             Use this context to make the content more specific, relevant, \
             and accurate.\n",
            request.context.trim()
        )
    };
    format!(
        "Create a presentation outline for a slide deck titled \"{title}\".\n\
         {context_block}\
         Topics to cover: {topics}.\n\
         Tone and audience: {tone}\n\
         Generate exactly {n} content slides (the title slide is not one of \
         them), distributing the topics logically across all of them. If \
         there are fewer topics than slides, expand each topic with deeper \
         sub-topics and detail.\n\
         Respond with only a JSON object, no markdown and no code fences, \
         shaped as {{\"title\": \"...\", \"slides\": [{{\"title\": \"...\", \
         \"content\": [\"...\", \"...\"]}}]}} with exactly {n} entries in \
         \"slides\", each with 3 to 5 bullet points written as complete, \
         informative sentences.",
        title = request.title,
        context_block = context_block,
        topics = request.topics.join(", "),
        tone = request.tone.instruction(),
        n = content_slides,
    )
}

/// The assembled deck generation pipeline.
#[derive(Debug, Clone)]
pub struct DeckService {
    writer: PackageWriter,
    template_path: Option<PathBuf>,
    store: ArtifactStore,
}

impl DeckService {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            writer: PackageWriter::new(config.output_dir),
            template_path: config.template_path,
            store: ArtifactStore::new(config.artifact_ttl),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Turn raw model text into a packaged, downloadable deck.
    ///
    /// The outline is parsed from `model_text`, checked against the request
    /// (a model that returns the wrong slide count is an invalid outline),
    /// composed with the configured template or the fallback theme, written
    /// to disk and registered in the store. Nothing is registered on any
    /// failure path. The response carries the validated content slides so
    /// callers can preview the deck before downloading it.
    pub fn generate(&self, request: &GenerateRequest, model_text: &str) -> Result<GenerateResponse> {
        request.validate()?;

        let parsed = Outline::from_model_text(model_text)?;
        let expected = (request.num_slides - 1) as usize;
        if parsed.slides.len() != expected {
            return Err(Error::OutlineInvalid(format!(
                "model returned {} content slides, expected {}",
                parsed.slides.len(),
                expected
            )));
        }

        // The requested title is authoritative; the model's restatement of
        // it is discarded.
        let outline = Outline {
            title: request.title.clone(),
            slides: parsed.slides,
        };

        let deck = compose(&outline, self.slide_source()?.as_ref())?;
        let path = self.writer.write(&deck)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "presentation.pptx".to_string());
        let token = self.store.register(path, filename.clone());

        info!(title = %outline.title, slides = deck.slide_count(), "deck generated");
        Ok(GenerateResponse {
            title: outline.title,
            slides: outline.slides,
            filename,
            token,
        })
    }

    /// Look up a previously generated deck and read its bytes.
    ///
    /// An unknown or expired token is [`Error::NotFound`]. A registered
    /// artifact whose file cannot be read is a server-side fault and
    /// surfaces as [`Error::Io`] instead.
    pub fn download(&self, token: &str) -> Result<(String, Vec<u8>)> {
        let Artifact { path, filename } = self.store.retrieve(token)?;
        let bytes = std::fs::read(&path).map_err(|e| {
            error!(path = %path.display(), error = %e, "registered artifact is unreadable");
            Error::Io(e)
        })?;
        Ok((filename, bytes))
    }

    /// Probe the configured template on every generation so edits to the
    /// file take effect without a restart. Recoverable failures degrade to
    /// the theme; anything else propagates.
    fn slide_source(&self) -> Result<Box<dyn SlideSource>> {
        if let Some(path) = &self.template_path {
            match TemplateHandle::load(path) {
                Ok(template) => return Ok(Box::new(template)),
                Err(e) if e.is_recoverable() => {
                    warn!(template = %path.display(), error = %e, "template unusable, using fallback theme");
                },
                Err(e) => return Err(e),
            }
        }
        Ok(Box::new(FallbackTheme::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::PackageReader;
    use std::io::Cursor;

    fn model_text(content_slides: usize) -> String {
        let slides: Vec<String> = (0..content_slides)
            .map(|i| {
                format!(
                    r#"{{"title": "Section {}", "content": ["First point", "Second point"]}}"#,
                    i + 1
                )
            })
            .collect();
        format!(
            r#"{{"title": "Q3 Business Review", "slides": [{}]}}"#,
            slides.join(",")
        )
    }

    fn sample_request() -> GenerateRequest {
        GenerateRequest::new(
            "Q3 Business Review",
            vec!["Revenue".into(), "Expansion".into()],
        )
    }

    fn service() -> (tempfile::TempDir, DeckService) {
        let dir = tempfile::tempdir().unwrap();
        let service = DeckService::new(ServiceConfig::new(dir.path()));
        (dir, service)
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: GenerateRequest = serde_json::from_str(
            r#"{"title": "Rust memory safety", "topics": ["Ownership", "Borrowing"]}"#,
        )
        .unwrap();
        assert_eq!(request.num_slides, 5);
        assert_eq!(request.tone, Tone::Professional);
        assert!(request.context.is_empty());
    }

    #[test]
    fn test_request_full_wire_shape() {
        let request: GenerateRequest = serde_json::from_str(
            r#"{"title": "Launch Plan", "topics": ["Timeline", "Budget"],
                "num_slides": 6, "context": "Internal kickoff for the platform team",
                "tone": "executive"}"#,
        )
        .unwrap();
        assert_eq!(request.num_slides, 6);
        assert_eq!(request.tone, Tone::Executive);
        assert_eq!(request.context, "Internal kickoff for the platform team");
    }

    #[test]
    fn test_all_tones_parse() {
        for (name, tone) in [
            ("professional", Tone::Professional),
            ("executive", Tone::Executive),
            ("technical", Tone::Technical),
            ("academic", Tone::Academic),
            ("sales", Tone::Sales),
            ("simple", Tone::Simple),
        ] {
            let parsed: Tone = serde_json::from_str(&format!("\"{}\"", name)).unwrap();
            assert_eq!(parsed, tone);
        }
    }

    #[test]
    fn test_request_bounds() {
        let mut request = sample_request();
        request.num_slides = 1;
        assert!(request.validate().is_err());
        request.num_slides = 16;
        assert!(request.validate().is_err());
        request.num_slides = 2;
        assert!(request.validate().is_ok());
        request.topics = vec!["  ".into()];
        assert!(request.validate().is_err());
        request.topics = vec!["Revenue".into()];
        request.title = "  ".into();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_prompt_carries_request_fields() {
        let mut request = GenerateRequest::new(
            "Rust memory safety",
            vec!["Borrow checker".into(), "Lifetimes".into()],
        );
        request.num_slides = 7;
        request.tone = Tone::Technical;
        let prompt = outline_prompt(&request);
        assert!(prompt.contains("exactly 6 content slides"));
        assert!(prompt.contains("Borrow checker, Lifetimes"));
        assert!(prompt.contains("technical audience"));
        assert!(prompt.contains("\"Rust memory safety\""));
        assert!(!prompt.contains("Additional context"));

        request.context = "Conference talk for systems programmers".into();
        let prompt = outline_prompt(&request);
        assert!(prompt.contains("Additional context"));
        assert!(prompt.contains("Conference talk for systems programmers"));
    }

    #[test]
    fn test_generate_produces_downloadable_package() {
        let (_dir, service) = service();
        let mut request = sample_request();
        request.num_slides = 4;

        let response = service.generate(&request, &model_text(3)).unwrap();
        assert_eq!(response.title, "Q3 Business Review");
        assert_eq!(response.slides.len(), 3);
        assert_eq!(response.slides[0].title, "Section 1");
        assert_eq!(response.slides[0].bullets, vec!["First point", "Second point"]);
        assert_eq!(response.filename, "Q3_Business_Review.pptx");

        let (filename, bytes) = service.download(&response.token).unwrap();
        assert_eq!(filename, response.filename);

        let mut reader = PackageReader::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.slide_count(), 4);
        let text = reader.slide_text(0).unwrap();
        assert_eq!(text.title.as_deref(), Some("Q3 Business Review"));
    }

    #[test]
    fn test_response_serializes_slides_as_content_objects() {
        let (_dir, service) = service();
        let mut request = sample_request();
        request.num_slides = 3;

        let response = service.generate(&request, &model_text(2)).unwrap();
        let value = serde_json::to_value(&response).unwrap();
        let slides = value["slides"].as_array().unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0]["title"], "Section 1");
        assert_eq!(slides[0]["content"][0], "First point");
    }

    #[test]
    fn test_request_title_overrides_model_title() {
        let (_dir, service) = service();
        let mut request =
            GenerateRequest::new("Board Deck", vec!["Revenue".into()]);
        request.num_slides = 2;

        // model_text titles itself "Q3 Business Review"; the request wins.
        let response = service.generate(&request, &model_text(1)).unwrap();
        assert_eq!(response.title, "Board Deck");
        assert_eq!(response.filename, "Board_Deck.pptx");
    }

    #[test]
    fn test_fenced_model_output_accepted() {
        let (_dir, service) = service();
        let mut request = sample_request();
        request.num_slides = 2;
        let fenced = format!("```json\n{}\n```", model_text(1));
        assert!(service.generate(&request, &fenced).is_ok());
    }

    #[test]
    fn test_slide_count_mismatch_is_invalid_outline() {
        let (_dir, service) = service();
        let mut request = sample_request();
        request.num_slides = 5;
        let err = service.generate(&request, &model_text(2)).unwrap_err();
        assert!(matches!(err, Error::OutlineInvalid(_)));
    }

    #[test]
    fn test_failed_generation_registers_nothing() {
        let (_dir, service) = service();
        let request = sample_request();
        assert!(service.generate(&request, "not json at all").is_err());
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_unusable_template_falls_back_to_theme() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("brand.pptx");
        std::fs::write(&template, b"not a package").unwrap();

        let config = ServiceConfig::new(dir.path()).with_template(&template);
        let service = DeckService::new(config);
        let mut request = sample_request();
        request.num_slides = 2;

        let response = service.generate(&request, &model_text(1)).unwrap();
        let (_, bytes) = service.download(&response.token).unwrap();
        let mut reader = PackageReader::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.slide_count(), 2);
    }

    #[test]
    fn test_download_unknown_token() {
        let (_dir, service) = service();
        let err = service.download("no-such-token").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_missing_file_is_not_reported_as_expired() {
        let (_dir, service) = service();
        let mut request = sample_request();
        request.num_slides = 2;

        let response = service.generate(&request, &model_text(1)).unwrap();
        let artifact = service.store().retrieve(&response.token).unwrap();
        std::fs::remove_file(&artifact.path).unwrap();

        let err = service.download(&response.token).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_expired_artifact_not_downloadable() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::new(dir.path()).with_artifact_ttl(Duration::ZERO);
        let service = DeckService::new(config);
        let mut request = sample_request();
        request.num_slides = 2;

        let response = service.generate(&request, &model_text(1)).unwrap();
        let err = service.download(&response.token).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
