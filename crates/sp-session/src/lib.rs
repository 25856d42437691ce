//! `sp-session` — one respondent's pass through the questionnaire.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`stage`]  | `Stage`, route paths                                      |
//! | [`state`]  | `SessionState`, `Gate`, `Transition`                      |
//! | [`store`]  | `SessionStore`, `SessionHandle`                           |
//!
//! # Stage order
//!
//! ```text
//! Demographics → Mobility → Choice(1) → … → Choice(N) → Attitudes → Done
//! ```
//!
//! Entering a stage whose prerequisite is missing never fails: the gate
//! answers with a redirect to the earliest stage that still needs answers.

pub mod stage;
pub mod state;
pub mod store;

#[cfg(test)]
mod tests;

pub use stage::Stage;
pub use state::{Gate, SessionState, Transition};
pub use store::{DEFAULT_MAX_IDLE, SessionHandle, SessionStore, lock_session};
