//! Flattening a completed session into long-format rows.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use sp_core::{Answers, RespondentId, Section};
use sp_design::Design;
use sp_session::SessionState;

use crate::writer::ResponseSink;
use crate::{OutputResult, ResponseRecord};

/// Summary of one persisted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordReceipt {
    pub respondent_id: RespondentId,
    pub timestamp:     DateTime<Utc>,
    pub rows:          usize,
}

/// Builds one [`ResponseRecord`] per scenario and appends them to a sink.
pub struct ResponseRecorder<S: ResponseSink> {
    sink: S,
}

impl<S: ResponseSink> ResponseRecorder<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Persist `session` against `design` as one batch.
    ///
    /// Mints a fresh respondent id and a single timestamp for all rows.  The
    /// session is not modified; clearing it once this returns `Ok` is the
    /// caller's job, so a failed write can be retried.
    pub fn record(&self, session: &SessionState, design: &Design) -> OutputResult<RecordReceipt> {
        let respondent_id = RespondentId::new_v4();
        let timestamp = Utc::now();
        let records = Self::flatten(session, design, respondent_id, timestamp);

        if let Err(e) = self.sink.append_batch(&records) {
            error!(%respondent_id, error = %e, "failed to persist responses");
            return Err(e);
        }
        info!(%respondent_id, rows = records.len(), "responses recorded");
        Ok(RecordReceipt { respondent_id, timestamp, rows: records.len() })
    }

    /// Pure flattening step: one row per scenario, in scenario-id order.
    ///
    /// Sections never submitted and scenarios never answered become empty
    /// cells rather than errors.
    pub fn flatten(
        session:       &SessionState,
        design:        &Design,
        respondent_id: RespondentId,
        timestamp:     DateTime<Utc>,
    ) -> Vec<ResponseRecord> {
        let section = |s: Section| session.section(s).cloned().unwrap_or_default();
        let demographics: Answers = section(Section::Demographics);
        let mobility: Answers = section(Section::Mobility);
        let attitudes: Answers = section(Section::Attitudes);

        let mut scenarios: Vec<_> = design.scenarios().iter().collect();
        scenarios.sort_by_key(|s| s.scenario_id);

        scenarios
            .into_iter()
            .map(|scenario| ResponseRecord {
                respondent_id,
                timestamp,
                demographics: demographics.clone(),
                mobility:     mobility.clone(),
                attitudes:    attitudes.clone(),
                scenario_id:  scenario.scenario_id,
                alternatives: scenario
                    .iter()
                    .map(|(label, alt)| (label.to_owned(), alt.clone()))
                    .collect(),
                choice: session.choice(scenario.scenario_id).unwrap_or_default().to_owned(),
            })
            .collect()
    }
}
