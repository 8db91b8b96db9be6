//! Embedded TrueType faces and text measurement.
//!
//! DejaVu Sans ships inside the binary so bullets and accented Latin,
//! Greek and Cyrillic text render without setup. `--font`/`--bold-font`
//! swap in another TrueType file, e.g. a CJK face.

use std::path::Path;

use md2pdf_core::error::{ConvertError, Result};
use md2pdf_core::options::ConversionOptions;
use printpdf::{FontId, ParsedFont, PdfDocument};

static REGULAR: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans.ttf"
));
static BOLD: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans-Bold.ttf"
));

/// Points to millimetres.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

/// Advance used for glyphs the face reports no width for, in em.
const FALLBACK_ADVANCE_EM: f32 = 0.5;

/// A parsed face and its id in the document being built.
pub struct Face {
    pub parsed: ParsedFont,
    pub id: FontId,
}

impl Face {
    fn parse(bytes: &[u8], origin: &Path) -> Result<ParsedFont> {
        let mut warnings = Vec::new();
        let parsed = ParsedFont::from_bytes(bytes, 0, &mut warnings);
        for warning in &warnings {
            log::debug!("font {}: {:?}", origin.display(), warning);
        }
        parsed.ok_or_else(|| ConvertError::Font {
            path: origin.to_path_buf(),
            reason: "not a usable TrueType/OpenType font".to_string(),
        })
    }

    fn read(path: &Path) -> Result<ParsedFont> {
        let bytes = std::fs::read(path).map_err(|e| ConvertError::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&bytes, path)
    }

    /// Width of `text` set at `font_size` pt, in mm.
    pub fn width_mm(&self, text: &str, font_size: f32) -> f32 {
        let units_per_em = f32::from(self.parsed.font_metrics.units_per_em.max(1));
        let units: f32 = text.chars().map(|c| self.advance_units(c, units_per_em)).sum();
        units / units_per_em * font_size * MM_PER_PT
    }

    fn advance_units(&self, c: char, units_per_em: f32) -> f32 {
        if c == ' ' {
            if let Some(space) = self.parsed.get_space_width() {
                return space as f32;
            }
        }
        let advance = self
            .parsed
            .lookup_glyph_index(c as u32)
            .map(|gid| self.parsed.get_horizontal_advance(gid))
            .unwrap_or(0);
        if advance == 0 {
            units_per_em * FALLBACK_ADVANCE_EM
        } else {
            f32::from(advance)
        }
    }

    /// Characters of `text` this face has no glyph for.
    pub fn missing_glyphs(&self, text: &str) -> Vec<char> {
        let mut missing: Vec<char> = text
            .chars()
            .filter(|c| !c.is_whitespace() && self.parsed.lookup_glyph_index(*c as u32).is_none())
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}

/// The regular and bold faces registered with one document.
pub struct Fonts {
    pub regular: Face,
    pub bold: Face,
}

impl Fonts {
    /// Parse the configured faces and register them with `doc`.
    ///
    /// A custom regular face without a bold one is used for headings too,
    /// so a CJK font covers the whole document.
    pub fn load(doc: &mut PdfDocument, options: &ConversionOptions) -> Result<Self> {
        let regular = match &options.font {
            Some(path) => Face::read(path)?,
            None => Face::parse(REGULAR, Path::new("DejaVuSans.ttf"))?,
        };
        let regular_id = doc.add_font(&regular);
        let regular = Face {
            parsed: regular,
            id: regular_id,
        };

        let bold = match (&options.bold_font, &options.font) {
            (Some(path), _) => {
                let parsed = Face::read(path)?;
                let id = doc.add_font(&parsed);
                Face { parsed, id }
            }
            (None, Some(_)) => Face {
                parsed: regular.parsed.clone(),
                id: regular.id.clone(),
            },
            (None, None) => {
                let parsed = Face::parse(BOLD, Path::new("DejaVuSans-Bold.ttf"))?;
                let id = doc.add_font(&parsed);
                Face { parsed, id }
            }
        };

        Ok(Self { regular, bold })
    }

    pub fn face(&self, bold: bool) -> &Face {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled() -> Fonts {
        let mut doc = PdfDocument::new("fonts");
        Fonts::load(&mut doc, &ConversionOptions::default()).unwrap()
    }

    #[test]
    fn test_bundled_faces_cover_bullet_and_accents() {
        let fonts = bundled();
        assert_ne!(fonts.regular.id, fonts.bold.id);
        assert!(fonts.regular.missing_glyphs("\u{2022} Über café Ωμέγα").is_empty());
        assert!(fonts.bold.missing_glyphs("\u{2022} Über").is_empty());
    }

    #[test]
    fn test_cjk_is_missing_from_bundled_face() {
        let fonts = bundled();
        assert_eq!(fonts.regular.missing_glyphs("漢字 漢"), vec!['字', '漢']);
    }

    #[test]
    fn test_width_scales_with_size_and_length() {
        let fonts = bundled();
        let face = &fonts.regular;
        let w12 = face.width_mm("Hello", 12.0);
        assert!(w12 > 0.0);
        assert!((face.width_mm("Hello", 24.0) - 2.0 * w12).abs() < 1e-3);
        assert!(face.width_mm("Hello world", 12.0) > w12);
        assert!(face.width_mm("W", 12.0) > face.width_mm("i", 12.0));
        assert!(face.width_mm(" ", 12.0) > 0.0);
        assert!(fonts.bold.width_mm("Hello", 12.0) >= w12);
    }

    #[test]
    fn test_unreadable_font_path() {
        let mut doc = PdfDocument::new("fonts");
        let options = ConversionOptions {
            font: Some("does/not/exist.ttf".into()),
            ..Default::default()
        };
        let err = Fonts::load(&mut doc, &options).err().unwrap();
        assert!(matches!(err, ConvertError::Font { .. }));
        assert!(err.to_string().contains("does/not/exist.ttf"));
    }

    #[test]
    fn test_garbage_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.ttf");
        std::fs::write(&path, b"not a font at all").unwrap();
        let mut doc = PdfDocument::new("fonts");
        let options = ConversionOptions {
            font: Some(path),
            ..Default::default()
        };
        assert!(matches!(
            Fonts::load(&mut doc, &options),
            Err(ConvertError::Font { .. })
        ));
    }

    #[test]
    fn test_custom_regular_is_reused_for_bold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.ttf");
        std::fs::write(&path, BOLD).unwrap();
        let mut doc = PdfDocument::new("fonts");
        let options = ConversionOptions {
            font: Some(path),
            ..Default::default()
        };
        let fonts = Fonts::load(&mut doc, &options).unwrap();
        assert_eq!(fonts.regular.id, fonts.bold.id);
    }
}
