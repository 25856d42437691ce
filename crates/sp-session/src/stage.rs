//! Questionnaire stages and their route paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use sp_core::ScenarioId;

/// One page of the questionnaire, in strict linear order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Demographics,
    Mobility,
    /// The `k`-th choice scenario.  `k` may be out of range on input; the
    /// gate routes such requests to `Attitudes`.
    Choice(ScenarioId),
    Attitudes,
    /// Terminal: the submission has been persisted.
    Done,
}

impl Stage {
    /// The route the shell serves this stage under.
    pub fn path(self) -> String {
        match self {
            Stage::Demographics => "/survey/demographics".into(),
            Stage::Mobility     => "/survey/mobility".into(),
            Stage::Choice(k)    => format!("/survey/choice/{k}"),
            Stage::Attitudes    => "/survey/attitudes".into(),
            Stage::Done         => "/survey/thankyou".into(),
        }
    }

    /// Inverse of [`Stage::path`].  `None` for unknown routes.
    pub fn from_path(path: &str) -> Option<Stage> {
        let rest = path.trim_end_matches('/').strip_prefix("/survey/")?;
        match rest {
            "demographics" => Some(Stage::Demographics),
            "mobility"     => Some(Stage::Mobility),
            "attitudes"    => Some(Stage::Attitudes),
            "thankyou"     => Some(Stage::Done),
            _ => rest
                .strip_prefix("choice/")
                .and_then(|k| k.parse::<u32>().ok())
                .map(|k| Stage::Choice(ScenarioId(k))),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Demographics => f.write_str("demographics"),
            Stage::Mobility     => f.write_str("mobility"),
            Stage::Choice(k)    => write!(f, "choice[{k}]"),
            Stage::Attitudes    => f.write_str("attitudes"),
            Stage::Done         => f.write_str("done"),
        }
    }
}
