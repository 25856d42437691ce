//! Strongly typed identifier wrappers.
//!
//! `ScenarioId` is a 1-based position in the design (`1..=N`).  The two
//! UUID-backed ids are opaque: `RespondentId` is minted once per completed
//! submission, `SessionToken` once per respondent interaction.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── ScenarioId ────────────────────────────────────────────────────────────────

/// 1-based scenario number, as shown to respondents and written to the sink.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(pub u32);

impl ScenarioId {
    pub const FIRST: ScenarioId = ScenarioId(1);

    /// Zero-based position in `Design::scenarios`.  `None` for id 0.
    #[inline]
    pub fn index(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }

    /// Build from a zero-based position.
    #[inline]
    pub fn from_index(i: usize) -> Self {
        ScenarioId(i as u32 + 1)
    }

    /// `true` if `1 <= self <= total`.
    #[inline]
    pub fn in_range(self, total: usize) -> bool {
        self.0 >= 1 && (self.0 as usize) <= total
    }

    #[inline]
    pub fn next(self) -> ScenarioId {
        ScenarioId(self.0 + 1)
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── UUID-backed ids ───────────────────────────────────────────────────────────

/// Generate an opaque UUID v4 wrapper.
macro_rules! uuid_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh random identifier.
            #[inline]
            pub fn new_v4() -> Self {
                $name(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map($name)
            }
        }
    };
}

uuid_id! {
    /// Identifier shared by every row of one completed submission.
    pub struct RespondentId;
}

uuid_id! {
    /// Opaque handle the shell stores client-side (cookie, header…) to find
    /// its respondent's in-flight session.
    pub struct SessionToken;
}
