//! `sp-core` — foundational types for the `sp_survey` stated-preference toolkit.
//!
//! This crate is a dependency of every other `sp-*` crate.  It has no `sp-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `ScenarioId`, `RespondentId`, `SessionToken`            |
//! | [`catalog`]   | `Level`, `Attribute`, `AttributeCatalog`                |
//! | [`answers`]   | `Section`, `FormData`, `Answers`                        |
//! | [`rng`]       | `DesignRng` (seeded, reproducible)                      |
//! | [`config`]    | `SurveyConfig` (TOML)                                   |
//! | [`error`]     | `CoreError`, `CoreResult`                               |

pub mod answers;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use answers::{Answers, FormData, Section};
pub use catalog::{Attribute, AttributeCatalog, Level};
pub use config::SurveyConfig;
pub use error::{CoreError, CoreResult};
pub use ids::{RespondentId, ScenarioId, SessionToken};
pub use rng::DesignRng;
