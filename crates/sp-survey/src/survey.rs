//! The [`Survey`] orchestrator.

use std::sync::Arc;

use tracing::{debug, info, warn};

use sp_core::{AttributeCatalog, FormData, SessionToken};
use sp_design::{Design, Scenario};
use sp_output::{ResponseRecorder, ResponseSink};
use sp_session::{Gate, SessionState, SessionStore, Stage, Transition, lock_session};

use crate::SurveyResult;

/// What the shell should render or do next.
#[derive(Clone, Debug, PartialEq)]
pub enum View {
    /// Show the questionnaire form for this stage.
    Page(Stage),
    /// Show one choice scenario.  `index` is 1-based.
    Choice {
        scenario: Scenario,
        index:    usize,
        total:    usize,
    },
    /// Send the respondent to this stage instead.
    Redirect(Stage),
    /// Thank-you page.
    Done,
}

/// A running survey: one shared design, the in-flight sessions, and the
/// response sink.
///
/// `Survey` is `Send + Sync`; request threads share it by reference.
pub struct Survey<S: ResponseSink> {
    pub(crate) design:   Arc<Design>,
    pub(crate) catalog:  AttributeCatalog,
    pub(crate) sessions: SessionStore,
    pub(crate) recorder: ResponseRecorder<S>,
}

impl<S: ResponseSink> Survey<S> {
    pub fn design(&self) -> &Arc<Design> {
        &self.design
    }

    pub fn catalog(&self) -> &AttributeCatalog {
        &self.catalog
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn sink(&self) -> &S {
        self.recorder.sink()
    }

    /// Number of choice scenarios per respondent.
    pub fn total(&self) -> usize {
        self.design.len()
    }

    /// Start a new respondent.
    pub fn open_session(&self) -> SessionToken {
        self.sessions.open()
    }

    /// The stage a returning respondent should continue at.
    pub fn resume(&self, token: SessionToken) -> Stage {
        self.inspect(token, |state| state.resume_stage(self.total()))
    }

    /// Run `f` on the session for `token`.  An unknown token reads as an
    /// empty session and is not registered.
    fn inspect<T>(&self, token: SessionToken, f: impl FnOnce(&SessionState) -> T) -> T {
        match self.sessions.get(token) {
            Some(handle) => {
                let state = lock_session(&handle);
                f(&state)
            }
            None => f(&SessionState::new()),
        }
    }

    /// Resolve a page request.  Never fails; a missing prerequisite becomes
    /// [`View::Redirect`].
    pub fn view(&self, token: SessionToken, stage: Stage) -> View {
        if stage == Stage::Done {
            return View::Done;
        }
        match self.inspect(token, |state| state.gate(stage, self.total())) {
            Gate::Redirect(to) => {
                debug!(%token, from = %stage, %to, "view redirected");
                View::Redirect(to)
            }
            Gate::Open => self.page(stage),
        }
    }

    fn page(&self, stage: Stage) -> View {
        match stage {
            Stage::Choice(id) => match self.design.scenario(id) {
                Some(scenario) => View::Choice {
                    scenario: scenario.clone(),
                    index:    id.0 as usize,
                    total:    self.total(),
                },
                None => View::Redirect(Stage::Attitudes),
            },
            Stage::Done => View::Done,
            other => View::Page(other),
        }
    }

    /// Store the answers posted for `stage`.
    ///
    /// Returns `Redirect(next)` after a stored answer or a failed guard, and
    /// `Done` once the attitudes submission has been durably recorded.  If
    /// the sink write fails the error is returned and the session is kept
    /// intact, so posting attitudes again retries the write.
    pub fn submit(&self, token: SessionToken, stage: Stage, form: &FormData) -> SurveyResult<View> {
        let handle = match self.sessions.get(token) {
            Some(handle) => handle,
            None => {
                // Only a submission that would be accepted opens a session.
                if let Gate::Redirect(to) = SessionState::new().gate(stage, self.total()) {
                    warn!(%token, from = %stage, %to, "submit without a session");
                    return Ok(View::Redirect(to));
                }
                self.sessions.checkout(token)
            }
        };
        let mut state = lock_session(&handle);

        match state.submit(stage, form, self.total()) {
            Transition::Advance(next) => Ok(View::Redirect(next)),
            Transition::Redirect(to) => {
                warn!(%token, from = %stage, %to, "submit rejected by stage gate");
                Ok(View::Redirect(to))
            }
            Transition::Complete => {
                let receipt = self.recorder.record(&state, &self.design)?;
                state.clear();
                drop(state);
                self.sessions.discard(token);
                info!(
                    %token,
                    respondent_id = %receipt.respondent_id,
                    rows = receipt.rows,
                    "survey completed"
                );
                Ok(View::Done)
            }
        }
    }
}
