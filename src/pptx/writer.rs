//! Package writer: serializes a composed deck into a `.pptx` on disk.
//!
//! The package is written to a uniquely named temporary file and atomically
//! renamed into place, so no reader ever observes a half-written package. A
//! drop guard removes the temporary file on every failure path, including
//! serialization errors.

use crate::common::error::{Error, Result};
use crate::deck::ComposedDeck;
use crate::pptx::scaffold;
use chrono::Utc;
use rand::RngExt;
use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use zip::{CompressionMethod, write::FileOptions};

/// Writes composed decks into an output directory.
#[derive(Debug, Clone)]
pub struct PackageWriter {
    output_dir: PathBuf,
}

impl PackageWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Serialize `deck` and atomically move it into the output directory.
    ///
    /// Returns the final file path. Any failure during serialization or the
    /// rename surfaces as [`Error::WriteFailed`] with the underlying cause,
    /// and the temporary file is removed.
    pub fn write(&self, deck: &ComposedDeck) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| Error::WriteFailed(format!("creating output directory: {}", e)))?;

        let filename = package_filename(&deck.title);
        let final_path = self.output_dir.join(&filename);

        let mut suffix = [0u8; 8];
        rand::rng().fill(&mut suffix);
        let tmp_path = self
            .output_dir
            .join(format!(".{}.{}.tmp", filename, hex::encode(suffix)));
        let guard = TempFileGuard::new(tmp_path.clone());

        let file = File::create(&tmp_path)
            .map_err(|e| Error::WriteFailed(format!("creating temp file: {}", e)))?;
        write_package(BufWriter::new(file), deck)
            .map_err(|e| Error::WriteFailed(e.to_string()))?;

        fs::rename(&tmp_path, &final_path)
            .map_err(|e| Error::WriteFailed(format!("renaming into place: {}", e)))?;
        guard.disarm();

        Ok(final_path)
    }
}

/// Serialize a composed deck into any writer as a complete package.
pub fn write_package<W: Write + Seek>(writer: W, deck: &ComposedDeck) -> Result<()> {
    let mut zip = zip::ZipWriter::new(writer);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);
    let slide_count = deck.slides.len();

    let mut add = |zip: &mut zip::ZipWriter<W>, name: &str, content: &str| -> Result<()> {
        zip.start_file(name, options)
            .map_err(|e| Error::Zip(e.to_string()))?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    };

    add(
        &mut zip,
        "[Content_Types].xml",
        &scaffold::content_types_xml(slide_count),
    )?;
    add(&mut zip, "_rels/.rels", &scaffold::root_rels_xml())?;
    add(
        &mut zip,
        "ppt/presentation.xml",
        &scaffold::presentation_xml(slide_count),
    )?;
    add(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        &scaffold::presentation_rels_xml(slide_count),
    )?;
    add(
        &mut zip,
        "ppt/slideMasters/slideMaster1.xml",
        &scaffold::slide_master_xml(),
    )?;
    add(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &scaffold::slide_master_rels_xml(),
    )?;
    add(
        &mut zip,
        "ppt/slideLayouts/slideLayout1.xml",
        &scaffold::slide_layout_xml(),
    )?;
    add(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &scaffold::slide_layout_rels_xml(),
    )?;
    add(&mut zip, "ppt/theme/theme1.xml", &scaffold::theme_xml())?;

    let slide_rels = scaffold::slide_rels_xml();
    for (index, slide) in deck.slides.iter().enumerate() {
        let slide_xml = slide.to_xml()?;
        add(
            &mut zip,
            &format!("ppt/slides/slide{}.xml", index + 1),
            &slide_xml,
        )?;
        add(
            &mut zip,
            &format!("ppt/slides/_rels/slide{}.xml.rels", index + 1),
            &slide_rels,
        )?;
    }

    add(
        &mut zip,
        "docProps/core.xml",
        &scaffold::core_props_xml(&deck.title, Utc::now()),
    )?;
    add(&mut zip, "docProps/app.xml", &scaffold::app_props_xml())?;

    zip.finish().map_err(|e| Error::Zip(e.to_string()))?;
    Ok(())
}

/// Derive a filesystem-safe `.pptx` filename from the deck title.
///
/// Alphanumerics, `_` and `-` survive; everything else (spaces included)
/// becomes `_`. An empty result falls back to `presentation.pptx`.
pub fn package_filename(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = safe.trim_matches('_');
    if trimmed.is_empty() {
        "presentation.pptx".to_string()
    } else {
        format!("{}.pptx", trimmed)
    }
}

/// Removes the temporary file on drop unless disarmed after a successful
/// rename.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            // The temp file may never have been created.
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{FallbackTheme, compose};
    use crate::outline::{Outline, OutlineSlide};
    use std::io::Cursor;
    use zip::ZipArchive;

    fn sample_deck() -> ComposedDeck {
        let outline = Outline {
            title: "Q3 Business Review".into(),
            slides: vec![OutlineSlide {
                title: "Revenue Growth".into(),
                bullets: vec!["Up 20% YoY".into(), "Expansion into 3 new markets".into()],
            }],
        };
        compose(&outline, &FallbackTheme::new()).unwrap()
    }

    #[test]
    fn test_package_filename_sanitization() {
        assert_eq!(package_filename("Q3 Business Review"), "Q3_Business_Review.pptx");
        assert_eq!(package_filename("a/b\\c"), "a_b_c.pptx");
        assert_eq!(package_filename("???"), "presentation.pptx");
        assert_eq!(package_filename(""), "presentation.pptx");
    }

    #[test]
    fn test_write_package_lists_expected_parts() {
        let mut buf = Vec::new();
        write_package(Cursor::new(&mut buf), &sample_deck()).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(buf)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
            "docProps/core.xml",
            "docProps/app.xml",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {}", name);
        }
        assert!(archive.by_name("ppt/slides/slide3.xml").is_err());
    }

    #[test]
    fn test_write_creates_file_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let writer = PackageWriter::new(dir.path());
        let path = writer.write(&sample_deck()).unwrap();

        assert!(path.exists());
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Q3_Business_Review.pptx"
        );
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_temp_guard_removes_file_on_failure_path() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join(".orphan.tmp");
        fs::write(&tmp, b"partial").unwrap();
        {
            let _guard = TempFileGuard::new(tmp.clone());
        }
        assert!(!tmp.exists());
    }

    #[test]
    fn test_write_into_missing_directory_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("generated").join("decks");
        let writer = PackageWriter::new(&nested);
        let path = writer.write(&sample_deck()).unwrap();
        assert!(path.starts_with(&nested));
    }
}
