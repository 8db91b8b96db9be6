//! Pipeline orchestrator: input plugin, then output plugin.
//!
//! A run is a single synchronous pass:
//!   Phase 1 (0-50%): Input plugin → SourceDocument
//!   Phase 2 (50-100%): Output plugin → PDF

use log::info;

use crate::error::{ConvertError, Result};
use crate::options::ConversionRequest;
use crate::plugin::{InputPlugin, OutputPlugin, ProgressReporter};

/// The conversion pipeline orchestrator.
pub struct Pipeline {
    input_plugin: Box<dyn InputPlugin>,
    output_plugin: Box<dyn OutputPlugin>,
    progress_reporter: Option<ProgressReporter>,
}

impl Pipeline {
    pub fn new(input_plugin: Box<dyn InputPlugin>, output_plugin: Box<dyn OutputPlugin>) -> Self {
        Self {
            input_plugin,
            output_plugin,
            progress_reporter: None,
        }
    }

    /// Set a progress reporter callback.
    pub fn set_progress_reporter(&mut self, reporter: ProgressReporter) {
        self.progress_reporter = Some(reporter);
    }

    /// Run the conversion described by `request`.
    pub fn run(&self, request: &ConversionRequest) -> Result<()> {
        let options = &request.options;
        if self.output_plugin.engine() != options.engine {
            return Err(ConvertError::Pipeline(format!(
                "{} cannot run the {} engine",
                self.output_plugin.name(),
                options.engine
            )));
        }

        self.report_progress(0.0, "Starting conversion...");

        info!("Running {} input plugin...", self.input_plugin.name());
        let doc = self.input_plugin.convert(&request.input, options)?;
        self.report_progress(0.5, "Input parsing complete");

        info!("Running {} output plugin...", self.output_plugin.name());
        self.report_progress(0.5, &format!("Creating {}...", self.output_plugin.name()));
        self.output_plugin.convert(&doc, &request.output, options)?;

        self.report_progress(1.0, "Conversion complete");
        info!("PDF written to {}", request.output.display());

        Ok(())
    }

    fn report_progress(&self, fraction: f64, message: &str) {
        if let Some(ref reporter) = self.progress_reporter {
            reporter(fraction, message);
        }
    }
}

/// Builder for constructing a pipeline.
pub struct PipelineBuilder {
    input_plugin: Option<Box<dyn InputPlugin>>,
    output_plugin: Option<Box<dyn OutputPlugin>>,
    progress_reporter: Option<ProgressReporter>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            input_plugin: None,
            output_plugin: None,
            progress_reporter: None,
        }
    }

    pub fn input(mut self, plugin: Box<dyn InputPlugin>) -> Self {
        self.input_plugin = Some(plugin);
        self
    }

    pub fn output(mut self, plugin: Box<dyn OutputPlugin>) -> Self {
        self.output_plugin = Some(plugin);
        self
    }

    pub fn progress_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let input_plugin = self
            .input_plugin
            .ok_or_else(|| ConvertError::Pipeline("No input plugin specified".to_string()))?;
        let output_plugin = self
            .output_plugin
            .ok_or_else(|| ConvertError::Pipeline("No output plugin specified".to_string()))?;

        let mut pipeline = Pipeline::new(input_plugin, output_plugin);
        if let Some(reporter) = self.progress_reporter {
            pipeline.set_progress_reporter(reporter);
        }
        Ok(pipeline)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
