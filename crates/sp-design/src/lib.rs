//! `sp-design` — the fixed catalog of choice scenarios every respondent sees.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`design`]    | `Alternative`, `Scenario`, `Design`                       |
//! | [`counter`]   | `LevelUsageCounter`, `BalanceReport`                      |
//! | [`generator`] | `DesignGenerator` (balanced greedy assignment)            |
//! | [`io`]        | `save_design`, `load_design`, `load_or_generate`          |
//! | [`error`]     | `DesignError`, `DesignResult<T>`                          |
//!
//! # Balancing model (summary)
//!
//! ```text
//! for each scenario, for each alternative slot (≤ max_attempts tries):
//!     level[attr] = argmin_l  usage[attr][l] + U[0,1)
//!     accept if the level tuple is new within the scenario
//! fallback: uniformly random alternative, not counted
//! ```
//!
//! Least-used levels win, the uniform draw breaks ties randomly.  This
//! approximates level balance across the design; it is not an orthogonal or
//! D-optimal design solver.

pub mod counter;
pub mod design;
pub mod error;
pub mod generator;
pub mod io;


pub use counter::{AttributeBalance, BalanceReport, LevelUsageCounter};
pub use design::{Alternative, Design, Scenario, alternative_label};
pub use error::{DesignError, DesignResult};
pub use generator::DesignGenerator;
pub use io::{load_design, load_design_reader, load_or_generate, save_design};
