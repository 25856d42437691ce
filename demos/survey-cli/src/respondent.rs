//! Synthetic respondents for load and smoke testing.
//!
//! Each respondent walks the survey exactly as the web shell would: request
//! a stage, follow redirects, post a form, repeat until `Done`.

use anyhow::{Result, bail};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use sp_core::FormData;
use sp_output::ResponseSink;
use sp_session::Stage;
use sp_survey::{Survey, View};

pub struct SyntheticRespondent {
    rng: SmallRng,
}

impl SyntheticRespondent {
    pub fn new(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed) }
    }

    /// Complete one survey.  Returns the number of scenarios answered.
    pub fn run<S: ResponseSink>(&mut self, survey: &Survey<S>) -> Result<usize> {
        let token = survey.open_session();
        let mut stage = Stage::Demographics;
        let mut answered = 0;

        // A clean run takes N + 4 rounds.
        let max_rounds = 2 * (survey.total() + 4);
        for _ in 0..max_rounds {
            let form = match survey.view(token, stage) {
                View::Done => return Ok(answered),
                View::Redirect(to) => {
                    stage = to;
                    continue;
                }
                View::Choice { scenario, .. } => {
                    let labels: Vec<&str> = scenario.labels().collect();
                    let label = labels.choose(&mut self.rng).copied().unwrap_or_default();
                    answered += 1;
                    FormData::from([("choice".to_owned(), label.to_owned())])
                }
                View::Page(page) => self.form(page),
            };
            stage = match survey.submit(token, stage, &form)? {
                View::Redirect(next) => next,
                _ => Stage::Done,
            };
        }
        bail!("respondent {token} did not reach the end of the survey")
    }

    fn form(&mut self, stage: Stage) -> FormData {
        let pairs: Vec<(&str, String)> = match stage {
            Stage::Demographics => vec![
                ("age", self.rng.gen_range(18..=79).to_string()),
                ("gender", self.pick(&["female", "male", "diverse"])),
                ("location", self.pick(&["urban", "suburban", "rural"])),
                ("license", self.pick(&["yes", "no"])),
                ("car_availability", self.pick(&["always", "sometimes", "never"])),
            ],
            Stage::Mobility => vec![
                ("main_mode", self.pick(&["car", "public_transit", "bike", "walk"])),
                ("commute_distance_km", self.rng.gen_range(1..=60).to_string()),
                ("pt_frequency", self.pick(&["daily", "weekly", "monthly", "never"])),
                ("sharing_experience", self.pick(&["yes", "no"])),
            ],
            Stage::Attitudes => vec![
                ("env_awareness", self.likert()),
                ("tech_affinity", self.likert()),
                ("autonomous_openness", self.likert()),
                ("price_sensitivity", self.likert()),
            ],
            Stage::Choice(_) | Stage::Done => Vec::new(),
        };
        pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
    }

    fn pick(&mut self, options: &[&str]) -> String {
        options.choose(&mut self.rng).copied().unwrap_or_default().to_owned()
    }

    fn likert(&mut self) -> String {
        self.rng.gen_range(1..=5).to_string()
    }
}
