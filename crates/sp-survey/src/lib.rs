//! `sp-survey` — the one entry point an HTTP shell needs.
//!
//! # Request flow
//!
//! ```text
//! GET  stage  → Survey::view    → gate → Page | Choice | Redirect | Done
//! POST stage  → Survey::submit  → gate → store answers → Redirect(next)
//!                                        └ Attitudes: record batch → clear → Done
//! ```
//!
//! The shell owns cookies, templates and form parsing.  It hands the core a
//! [`SessionToken`](sp_core::SessionToken), a [`Stage`](sp_session::Stage)
//! and the posted fields, and renders the returned [`View`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sp_core::SurveyConfig;
//! use sp_survey::{SurveyBuilder, View};
//!
//! let survey = SurveyBuilder::new(SurveyConfig::default()).build_csv()?;
//! let token = survey.open_session();
//! match survey.view(token, Stage::Demographics) {
//!     View::Page(stage) => render(stage),
//!     View::Redirect(stage) => redirect(stage.path()),
//!     ..
//! }
//! ```

pub mod builder;
pub mod error;
pub mod survey;

#[cfg(test)]
mod tests;

pub use builder::SurveyBuilder;
pub use error::{SurveyError, SurveyResult};
pub use survey::{Survey, View};
