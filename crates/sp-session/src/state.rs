//! Per-respondent answer accumulator and the stage gate.
//!
//! # Entry guards
//!
//! | Stage        | Guard                         | On submit                              |
//! |--------------|-------------------------------|----------------------------------------|
//! | Demographics | —                             | store → `Mobility`                     |
//! | Mobility     | demographics present          | store, reset choices → `Choice(1)`     |
//! | Choice(k)    | mobility present, 1 ≤ k ≤ N   | store label for k → `Choice(k+1)` / `Attitudes` |
//! | Attitudes    | exactly N choices             | store → [`Transition::Complete`]       |
//!
//! A failed guard yields a redirect to the earliest unsatisfied prerequisite,
//! resolved transitively.  An out-of-range `Choice(k)` is a completion signal
//! and redirects straight to `Attitudes`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use sp_core::answers::CHOICE_FIELD;
use sp_core::{Answers, FormData, ScenarioId, Section};

use crate::Stage;

/// Outcome of checking a stage's entry guard.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Gate {
    /// The guard holds; the stage may be shown or submitted.
    Open,
    /// Send the respondent here instead.
    Redirect(Stage),
}

/// Outcome of a stage submission.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Transition {
    /// Answers stored; continue with the given stage.
    Advance(Stage),
    /// Guard failed; nothing stored.
    Redirect(Stage),
    /// Attitudes stored; the session is complete and must now be persisted
    /// and cleared by the caller.
    Complete,
}

/// Answers collected so far for one respondent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    demographics: Option<Answers>,
    mobility:     Option<Answers>,
    choices:      BTreeMap<ScenarioId, String>,
    attitudes:    Option<Answers>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn demographics(&self) -> Option<&Answers> {
        self.demographics.as_ref()
    }

    pub fn mobility(&self) -> Option<&Answers> {
        self.mobility.as_ref()
    }

    pub fn attitudes(&self) -> Option<&Answers> {
        self.attitudes.as_ref()
    }

    /// Answers of `section`, if submitted.
    pub fn section(&self, section: Section) -> Option<&Answers> {
        match section {
            Section::Demographics => self.demographics(),
            Section::Mobility     => self.mobility(),
            Section::Attitudes    => self.attitudes(),
        }
    }

    pub fn choices(&self) -> &BTreeMap<ScenarioId, String> {
        &self.choices
    }

    pub fn choice(&self, id: ScenarioId) -> Option<&str> {
        self.choices.get(&id).map(String::as_str)
    }

    /// `true` when nothing has been answered (fresh or cleared session).
    pub fn is_empty(&self) -> bool {
        self.demographics.is_none()
            && self.mobility.is_none()
            && self.choices.is_empty()
            && self.attitudes.is_none()
    }

    /// Irrecoverably wipe every answer.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ── Gate ──────────────────────────────────────────────────────────────

    /// Check the entry guard of `stage` for a design of `total` scenarios.
    pub fn gate(&self, stage: Stage, total: usize) -> Gate {
        match stage {
            Stage::Demographics | Stage::Done => Gate::Open,
            Stage::Mobility => {
                if self.demographics.is_some() {
                    Gate::Open
                } else {
                    self.redirect_to(Stage::Demographics, total)
                }
            }
            Stage::Choice(k) => {
                if self.mobility.is_none() {
                    self.redirect_to(Stage::Mobility, total)
                } else if !k.in_range(total) {
                    Gate::Redirect(Stage::Attitudes)
                } else {
                    Gate::Open
                }
            }
            Stage::Attitudes => {
                if self.choices.len() == total {
                    Gate::Open
                } else {
                    self.redirect_to(Stage::Choice(ScenarioId::FIRST), total)
                }
            }
        }
    }

    /// Redirect to `target`, or further back if `target`'s own guard fails.
    fn redirect_to(&self, target: Stage, total: usize) -> Gate {
        match self.gate(target, total) {
            Gate::Open => Gate::Redirect(target),
            redirect => redirect,
        }
    }

    /// The stage a returning respondent should continue with.
    pub fn resume_stage(&self, total: usize) -> Stage {
        if self.demographics.is_none() {
            return Stage::Demographics;
        }
        if self.mobility.is_none() {
            return Stage::Mobility;
        }
        (1..=total as u32)
            .map(ScenarioId)
            .find(|id| !self.choices.contains_key(id))
            .map_or(Stage::Attitudes, Stage::Choice)
    }

    // ── Submission ────────────────────────────────────────────────────────

    /// Store the answers for `stage` and report where to go next.
    ///
    /// The entry guard is checked first; on failure nothing is stored.
    /// Re-submitting `Choice(k)` overwrites the earlier answer for `k`.
    /// Re-submitting `Mobility` starts the choice block over.
    pub fn submit(&mut self, stage: Stage, form: &FormData, total: usize) -> Transition {
        if let Gate::Redirect(target) = self.gate(stage, total) {
            debug!(%stage, %target, "submit redirected");
            return Transition::Redirect(target);
        }

        let transition = match stage {
            Stage::Demographics => {
                self.demographics = Some(Answers::from_form(Section::Demographics, form));
                Transition::Advance(Stage::Mobility)
            }
            Stage::Mobility => {
                self.mobility = Some(Answers::from_form(Section::Mobility, form));
                self.choices.clear();
                Transition::Advance(Stage::Choice(ScenarioId::FIRST))
            }
            Stage::Choice(k) => {
                let label = form.get(CHOICE_FIELD).cloned().unwrap_or_default();
                self.choices.insert(k, label);
                if (k.0 as usize) < total {
                    Transition::Advance(Stage::Choice(k.next()))
                } else {
                    Transition::Advance(Stage::Attitudes)
                }
            }
            Stage::Attitudes => {
                self.attitudes = Some(Answers::from_form(Section::Attitudes, form));
                Transition::Complete
            }
            Stage::Done => Transition::Redirect(Stage::Done),
        };

        debug!(%stage, ?transition, "stage submitted");
        transition
    }
}
