//! Fluent builder for constructing a [`Survey`].

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use sp_core::SurveyConfig;
use sp_design::{Design, DesignGenerator, alternative_label, load_or_generate};
use sp_output::{CsvSink, RecordLayout, ResponseRecorder, ResponseSink};
use sp_session::SessionStore;

use crate::{Survey, SurveyError, SurveyResult};

/// Fluent builder for [`Survey<S>`].
///
/// # Required inputs
///
/// - [`SurveyConfig`] — sizes, seed, catalog, file locations
/// - a sink constructor, given the [`RecordLayout`] the design implies
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                                             |
/// |---------------|-----------------------------------------------------|
/// | `.design(d)`  | Load `config.design_path`, or generate and save it  |
///
/// # Example
///
/// ```rust,ignore
/// let survey = SurveyBuilder::new(config)
///     .design(design)
///     .build(|layout| MemorySink::new(layout))?;
/// ```
pub struct SurveyBuilder {
    config: SurveyConfig,
    design: Option<Design>,
}

impl SurveyBuilder {
    pub fn new(config: SurveyConfig) -> Self {
        Self { config, design: None }
    }

    /// Use an already generated design instead of the artifact on disk.
    ///
    /// It is still validated against the configured catalog and sizes.
    pub fn design(mut self, design: Design) -> Self {
        self.design = Some(design);
        self
    }

    /// Build with the CSV sink at `config.responses_path`.
    pub fn build_csv(self) -> SurveyResult<Survey<CsvSink>> {
        let path = self.config.responses_path.clone();
        self.build(|layout| CsvSink::new(path, layout))
    }

    /// Validate the config, resolve the design, create and initialise the
    /// sink, and return a ready survey.
    pub fn build<S, F>(self, make_sink: F) -> SurveyResult<Survey<S>>
    where
        S: ResponseSink,
        F: FnOnce(RecordLayout) -> S,
    {
        let config = self.config;
        config.validate()?;

        // ── Resolve the design ────────────────────────────────────────────
        let design = match self.design {
            Some(design) => {
                design.validate(&config.catalog, config.n_alternatives)?;
                design
            }
            None => {
                let generator =
                    DesignGenerator::new(&config.catalog).with_max_attempts(config.max_attempts);
                load_or_generate(
                    &config.design_path,
                    &generator,
                    config.n_scenarios,
                    config.n_alternatives,
                    config.seed,
                )?
            }
        };
        if design.len() != config.n_scenarios {
            return Err(SurveyError::DesignMismatch {
                expected: config.n_scenarios,
                got:      design.len(),
            });
        }

        // ── Sink ──────────────────────────────────────────────────────────
        let labels: Vec<String> = (0..config.n_alternatives).map(alternative_label).collect();
        let sink = make_sink(RecordLayout::new(&config.catalog, &labels));
        sink.init()?;

        info!(
            scenarios    = design.len(),
            alternatives = config.n_alternatives,
            "survey ready"
        );

        Ok(Survey {
            design:   Arc::new(design),
            catalog:  config.catalog,
            sessions: SessionStore::with_max_idle(Duration::from_secs(config.session_idle_secs)),
            recorder: ResponseRecorder::new(sink),
        })
    }
}
