//! Questionnaire sections and the answers collected for them.
//!
//! The shell hands the core a plain `field → value` mapping per submitted
//! page ([`FormData`]).  Each [`Section`] owns a fixed field list; building an
//! [`Answers`] from a form keeps only those fields and ignores the rest.
//! Fields the respondent left out stay absent and are written as empty cells.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inbound page submission: field name → string value.
pub type FormData = BTreeMap<String, String>;

/// Form field carrying the chosen alternative label on a choice page.
pub const CHOICE_FIELD: &str = "choice";

/// The free-form questionnaire sections surrounding the choice experiment.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Demographics,
    Mobility,
    Attitudes,
}

impl Section {
    /// All sections in sink column order.
    pub const ALL: [Section; 3] = [Section::Demographics, Section::Mobility, Section::Attitudes];

    /// Field names collected by this section, in sink column order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Section::Demographics => &["age", "gender", "location", "license", "car_availability"],
            Section::Mobility => &[
                "main_mode",
                "commute_distance_km",
                "pt_frequency",
                "sharing_experience",
            ],
            Section::Attitudes => &[
                "env_awareness",
                "tech_affinity",
                "autonomous_openness",
                "price_sensitivity",
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Demographics => "demographics",
            Section::Mobility     => "mobility",
            Section::Attitudes    => "attitudes",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers for one section.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Answers(BTreeMap<String, String>);

impl Answers {
    /// Keep the fields of `section` present in `form`.
    pub fn from_form(section: Section, form: &FormData) -> Self {
        let map = section
            .fields()
            .iter()
            .filter_map(|&field| form.get(field).map(|v| (field.to_owned(), v.clone())))
            .collect();
        Answers(map)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Value of `field`, or `""` when it was never answered.
    pub fn get_or_empty(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
