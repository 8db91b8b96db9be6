//! Conversion options and the per-invocation conversion request.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Base font size used when neither a config file nor the CLI sets one.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Settings that shape a conversion. Loaded from config files, then
/// overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    pub page_size: PageSize,
    pub font_size: f32,
    pub engine: Engine,
    pub text_source: TextSource,
    /// TrueType/OpenType file for body text in the direct engine. The
    /// bundled DejaVu Sans is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    /// Face for headings. Falls back to `font` when only that is set, and to
    /// the bundled DejaVu Sans Bold when neither is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold_font: Option<PathBuf>,
    /// Ordered renderer candidates for [`Engine::External`]; the first one
    /// found on the system wins.
    pub renderers: Vec<RendererCandidate>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            font_size: DEFAULT_FONT_SIZE,
            engine: Engine::Direct,
            text_source: TextSource::Tree,
            font: None,
            bold_font: None,
            renderers: default_renderers(),
        }
    }
}

impl ConversionOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(ConvertError::InvalidOption(format!(
                "font size must be a positive number, got {}",
                self.font_size
            )));
        }
        if self.engine == Engine::External && self.renderers.is_empty() {
            return Err(ConvertError::InvalidOption(
                "the external engine needs at least one renderer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Physical page size of the produced PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::A4, PageSize::Letter, PageSize::Legal];

    /// Page width and height in millimetres.
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PageSize {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ConvertError::InvalidOption(format!(
                    "unknown page size '{}' (expected A4, Letter or Legal)",
                    s
                ))
            })
    }
}

impl TryFrom<String> for PageSize {
    type Error = ConvertError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PageSize> for String {
    fn from(size: PageSize) -> Self {
        size.name().to_string()
    }
}

/// Which conversion engine produces the PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    /// Lay out classified text lines directly with the PDF page builder.
    #[default]
    Direct,
    /// Render styled HTML and hand it to an external renderer.
    External,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Direct => f.write_str("direct"),
            Engine::External => f.write_str("external"),
        }
    }
}

impl FromStr for Engine {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Engine::Direct),
            "external" => Ok(Engine::External),
            other => Err(ConvertError::InvalidOption(format!(
                "unknown engine '{}' (expected direct or external)",
                other
            ))),
        }
    }
}

/// Where the direct engine takes its text lines from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextSource {
    /// Lines flattened from the Markdown event stream.
    #[default]
    Tree,
    /// Lines recovered by stripping tags from the rendered HTML.
    Html,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::Tree => f.write_str("tree"),
            TextSource::Html => f.write_str("html"),
        }
    }
}

impl FromStr for TextSource {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(TextSource::Tree),
            "html" => Ok(TextSource::Html),
            other => Err(ConvertError::InvalidOption(format!(
                "unknown text source '{}' (expected tree or html)",
                other
            ))),
        }
    }
}

/// Command-line dialect of an external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RendererKind {
    Wkhtmltopdf,
    /// Chrome, Chromium or any browser accepting `--print-to-pdf`.
    Chromium,
}

impl RendererKind {
    /// Guess the dialect from a program name or path.
    pub fn infer(program: &str) -> Self {
        let file_name = Path::new(program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(program);
        if file_name.to_ascii_lowercase().contains("wkhtmltopdf") {
            RendererKind::Wkhtmltopdf
        } else {
            RendererKind::Chromium
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererCandidate {
    pub kind: RendererKind,
    /// Bare command name (looked up on `PATH`) or a path to the binary.
    pub program: String,
}

impl RendererCandidate {
    pub fn new(kind: RendererKind, program: impl Into<String>) -> Self {
        Self {
            kind,
            program: program.into(),
        }
    }

    /// Candidate whose kind is inferred from the program name.
    pub fn from_program(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            kind: RendererKind::infer(&program),
            program,
        }
    }
}

/// Renderer search order: the dedicated converter first, then browsers.
pub fn default_renderers() -> Vec<RendererCandidate> {
    vec![
        RendererCandidate::new(RendererKind::Wkhtmltopdf, "wkhtmltopdf"),
        RendererCandidate::new(
            RendererKind::Chromium,
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        ),
        RendererCandidate::new(
            RendererKind::Chromium,
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ),
        RendererCandidate::new(RendererKind::Chromium, "chromium"),
        RendererCandidate::new(RendererKind::Chromium, "google-chrome"),
    ]
}

/// One conversion: where to read, where to write, and how.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: ConversionOptions,
}

impl ConversionRequest {
    /// Validate the inputs and fill in the default output path.
    ///
    /// Does no I/O, so a missing input is reported before anything touches
    /// the filesystem.
    pub fn resolve(
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        options: ConversionOptions,
    ) -> Result<Self> {
        let input = require_input(input)?;
        options.validate()?;

        let output = output
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| derive_output_path(&input));

        Ok(Self {
            input,
            output,
            options,
        })
    }
}

/// Reject a missing or empty input path.
pub fn require_input(input: Option<PathBuf>) -> Result<PathBuf> {
    input.filter(|p| !p.as_os_str().is_empty()).ok_or_else(|| {
        ConvertError::Usage("input file is required. Use -i flag to specify input file.".to_string())
    })
}

/// Replace the final extension of `input` with `.pdf`.
///
/// A leading dot does not start an extension, so `.notes` becomes
/// `.notes.pdf` rather than a bare `.pdf`.
pub fn derive_output_path(input: &Path) -> PathBuf {
    input.with_extension("pdf")
}
