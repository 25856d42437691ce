//! The long-format response row and its column layout.

use chrono::{DateTime, SecondsFormat, Utc};

use sp_core::{Answers, AttributeCatalog, RespondentId, ScenarioId, Section};
use sp_design::Alternative;

/// One (respondent, scenario) row, fully denormalised.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    pub respondent_id: RespondentId,
    pub timestamp:     DateTime<Utc>,
    pub demographics:  Answers,
    pub mobility:      Answers,
    pub attitudes:     Answers,
    pub scenario_id:   ScenarioId,
    /// The scenario's alternatives in label order (A, B, C).
    pub alternatives:  Vec<(String, Alternative)>,
    /// Chosen label; empty if the scenario was never answered.
    pub choice:        String,
}

impl ResponseRecord {
    pub fn section(&self, section: Section) -> &Answers {
        match section {
            Section::Demographics => &self.demographics,
            Section::Mobility     => &self.mobility,
            Section::Attitudes    => &self.attitudes,
        }
    }
}

/// Fixed column order shared by every row of a sink.
///
/// ```text
/// respondent_id, timestamp,
/// <demographics fields>, <mobility fields>, <attitude fields>,
/// scenario_id,
/// alt_a_<attr>… , alt_b_<attr>…, alt_c_<attr>…,
/// choice
/// ```
///
/// With the mobility catalog and three alternatives this is 32 columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    attributes: Vec<String>,
    labels:     Vec<String>,
}

impl RecordLayout {
    pub fn new(catalog: &AttributeCatalog, labels: &[String]) -> Self {
        Self {
            attributes: catalog.names().map(str::to_owned).collect(),
            labels:     labels.to_vec(),
        }
    }

    pub fn header(&self) -> Vec<String> {
        let mut cols: Vec<String> = vec!["respondent_id".into(), "timestamp".into()];
        cols.extend(
            Section::ALL
                .iter()
                .flat_map(|s| s.fields())
                .map(|&f| f.to_owned()),
        );
        cols.push("scenario_id".into());
        for label in &self.labels {
            let prefix = label.to_lowercase();
            cols.extend(self.attributes.iter().map(|attr| format!("alt_{prefix}_{attr}")));
        }
        cols.push("choice".into());
        cols
    }

    pub fn width(&self) -> usize {
        2 + Section::ALL.iter().map(|s| s.fields().len()).sum::<usize>()
            + 1
            + self.labels.len() * self.attributes.len()
            + 1
    }

    /// Render `record` as cells in header order.  Absent answers and
    /// attributes become empty cells.
    pub fn cells(&self, record: &ResponseRecord) -> Vec<String> {
        let mut cells = Vec::with_capacity(self.width());
        cells.push(record.respondent_id.to_string());
        cells.push(format_timestamp(&record.timestamp));
        for &section in &Section::ALL {
            let answers = record.section(section);
            cells.extend(section.fields().iter().map(|f| answers.get_or_empty(f).to_owned()));
        }
        cells.push(record.scenario_id.to_string());
        for label in &self.labels {
            let alt = record
                .alternatives
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, alt)| alt);
            cells.extend(self.attributes.iter().map(|attr| {
                alt.and_then(|a| a.get(attr))
                    .map(ToString::to_string)
                    .unwrap_or_default()
            }));
        }
        cells.push(record.choice.clone());
        cells
    }
}

/// RFC 3339, UTC, microsecond precision.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
