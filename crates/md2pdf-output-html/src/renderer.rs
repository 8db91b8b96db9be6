//! External HTML-to-PDF renderers: discovery and invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use md2pdf_core::error::{ConvertError, Result};
use md2pdf_core::options::{PageSize, RendererCandidate, RendererKind};

/// A renderer candidate that was found on this system.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRenderer {
    pub candidate: RendererCandidate,
    pub path: PathBuf,
}

/// Pick the first candidate that exists on this system. Bare names are
/// searched on `PATH`, names with a separator are used as given.
pub fn select_renderer(candidates: &[RendererCandidate]) -> Result<ResolvedRenderer> {
    select_with(candidates, |program| which::which(program))
}

/// Pick the first candidate `locate` resolves to an executable.
pub fn select_with<F>(candidates: &[RendererCandidate], locate: F) -> Result<ResolvedRenderer>
where
    F: Fn(&str) -> which::Result<PathBuf>,
{
    for candidate in candidates {
        match locate(&candidate.program) {
            Ok(path) => {
                log::info!("Using renderer {}", path.display());
                return Ok(ResolvedRenderer {
                    candidate: candidate.clone(),
                    path,
                });
            }
            Err(e) => log::debug!("Renderer not found: {}: {}", candidate.program, e),
        }
    }

    let tried = candidates
        .iter()
        .map(|c| c.program.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Err(ConvertError::RendererNotFound { tried })
}

/// Arguments that make `kind` render `html_path` into `output_path`.
pub fn renderer_args(
    kind: RendererKind,
    html_path: &Path,
    output_path: &Path,
    page_size: PageSize,
) -> Vec<OsString> {
    match kind {
        RendererKind::Wkhtmltopdf => vec![
            "--page-size".into(),
            page_size.name().into(),
            "--encoding".into(),
            "UTF-8".into(),
            html_path.into(),
            output_path.into(),
        ],
        RendererKind::Chromium => {
            let mut print_to = OsString::from("--print-to-pdf=");
            print_to.push(output_path);
            vec![
                "--headless".into(),
                "--disable-gpu".into(),
                print_to,
                html_path.into(),
            ]
        }
    }
}

impl ResolvedRenderer {
    /// Run the renderer and wait for it. No timeout is applied.
    pub fn render(&self, html_path: &Path, output_path: &Path, page_size: PageSize) -> Result<()> {
        let args = renderer_args(self.candidate.kind, html_path, output_path, page_size);
        log::debug!("Running {} {:?}", self.path.display(), args);

        let output = Command::new(&self.path)
            .args(&args)
            .output()
            .map_err(|source| ConvertError::RendererSpawn {
                program: self.candidate.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConvertError::RendererFailed {
                program: self.candidate.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
