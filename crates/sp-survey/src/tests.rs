//! Integration tests for sp-survey.

use std::path::Path;

use tempfile::TempDir;

use sp_core::{AttributeCatalog, FormData, ScenarioId, SessionToken, SurveyConfig};
use sp_design::DesignGenerator;
use sp_output::{CsvSink, MemorySink, OutputError, OutputResult, RecordLayout, ResponseRecord, ResponseSink};
use sp_session::{Stage, lock_session};

use crate::{Survey, SurveyBuilder, SurveyError, View};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn config_in(dir: &Path) -> SurveyConfig {
    SurveyConfig {
        design_path:    dir.join("design").join("choice_sets.json"),
        responses_path: dir.join("data").join("responses.csv"),
        ..SurveyConfig::default()
    }
}

fn memory_survey() -> Survey<MemorySink> {
    let design = DesignGenerator::new(&AttributeCatalog::mobility()).generate(12, 3, 42).unwrap();
    SurveyBuilder::new(SurveyConfig::default())
        .design(design)
        .build(MemorySink::new)
        .unwrap()
}

/// Drive `token` through every stage up to (not including) attitudes.
fn answer_until_attitudes<S: ResponseSink>(survey: &Survey<S>, token: SessionToken, label: &str) {
    let next = survey
        .submit(token, Stage::Demographics, &form(&[("age", "35"), ("gender", "f")]))
        .unwrap();
    assert_eq!(next, View::Redirect(Stage::Mobility));
    let next = survey
        .submit(token, Stage::Mobility, &form(&[("main_mode", "bike")]))
        .unwrap();
    assert_eq!(next, View::Redirect(Stage::Choice(ScenarioId(1))));
    for k in 1..=12 {
        survey
            .submit(token, Stage::Choice(ScenarioId(k)), &form(&[("choice", label)]))
            .unwrap();
    }
}

fn attitudes() -> FormData {
    form(&[("env_awareness", "5"), ("tech_affinity", "3")])
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records().map(|r| r.unwrap()).collect()
}

/// Fails until `fail` is cleared, then behaves like a `MemorySink`.
struct FlakySink {
    inner: MemorySink,
    fail:  std::sync::atomic::AtomicBool,
}

impl ResponseSink for FlakySink {
    fn layout(&self) -> &RecordLayout {
        self.inner.layout()
    }
    fn init(&self) -> OutputResult<()> {
        Ok(())
    }
    fn append_batch(&self, records: &[ResponseRecord]) -> OutputResult<()> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(OutputError::Io(std::io::Error::other("disk full")));
        }
        self.inner.append_batch(records)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn generates_and_saves_design_on_first_start() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let survey = SurveyBuilder::new(config.clone()).build_csv().unwrap();
        assert_eq!(survey.total(), 12);
        assert!(config.design_path.exists());
        // The header is written at startup.
        let text = std::fs::read_to_string(&config.responses_path).unwrap();
        assert!(text.starts_with("respondent_id,timestamp,"));
    }

    #[test]
    fn restart_reuses_saved_design() {
        let dir = TempDir::new().unwrap();
        let first = SurveyBuilder::new(config_in(dir.path())).build_csv().unwrap();
        let second = SurveyBuilder::new(SurveyConfig { seed: 7, ..config_in(dir.path()) })
            .build_csv()
            .unwrap();
        assert_eq!(**first.design(), **second.design());
    }

    #[test]
    fn wrong_size_design_is_rejected() {
        let design = DesignGenerator::new(&AttributeCatalog::mobility()).generate(6, 3, 42).unwrap();
        let result = SurveyBuilder::new(SurveyConfig::default()).design(design).build(MemorySink::new);
        assert!(matches!(
            result,
            Err(SurveyError::DesignMismatch { expected: 12, got: 6 })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SurveyConfig { n_scenarios: 0, ..SurveyConfig::default() };
        let result = SurveyBuilder::new(config).build(MemorySink::new);
        assert!(matches!(result, Err(SurveyError::Core(_))));
    }
}

// ── View / gating ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod view_tests {
    use super::*;

    #[test]
    fn fresh_session_starts_at_demographics() {
        let survey = memory_survey();
        let token = survey.open_session();
        assert_eq!(survey.view(token, Stage::Demographics), View::Page(Stage::Demographics));
        assert_eq!(survey.view(token, Stage::Mobility), View::Redirect(Stage::Demographics));
        assert_eq!(survey.resume(token), Stage::Demographics);
    }

    #[test]
    fn choice_view_carries_scenario() {
        let survey = memory_survey();
        let token = survey.open_session();
        survey.submit(token, Stage::Demographics, &FormData::new()).unwrap();
        survey.submit(token, Stage::Mobility, &FormData::new()).unwrap();

        match survey.view(token, Stage::Choice(ScenarioId(3))) {
            View::Choice { scenario, index, total } => {
                assert_eq!(scenario.scenario_id, ScenarioId(3));
                assert_eq!(index, 3);
                assert_eq!(total, 12);
                assert_eq!(scenario.labels().collect::<Vec<_>>(), ["A", "B", "C"]);
            }
            other => panic!("expected a choice view, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_choice_redirects_to_attitudes() {
        let survey = memory_survey();
        let token = survey.open_session();
        survey.submit(token, Stage::Demographics, &FormData::new()).unwrap();
        survey.submit(token, Stage::Mobility, &FormData::new()).unwrap();
        assert_eq!(survey.view(token, Stage::Choice(ScenarioId(13))), View::Redirect(Stage::Attitudes));
    }

    #[test]
    fn attitudes_gated_on_all_choices() {
        let survey = memory_survey();
        let token = survey.open_session();
        survey.submit(token, Stage::Demographics, &FormData::new()).unwrap();
        survey.submit(token, Stage::Mobility, &FormData::new()).unwrap();
        for k in 1..=11 {
            survey.submit(token, Stage::Choice(ScenarioId(k)), &form(&[("choice", "B")])).unwrap();
        }
        assert_eq!(survey.view(token, Stage::Attitudes), View::Redirect(Stage::Choice(ScenarioId(1))));
    }

    #[test]
    fn unknown_token_gets_empty_session() {
        let survey = memory_survey();
        let token = SessionToken::new_v4();
        assert_eq!(survey.view(token, Stage::Choice(ScenarioId(5))), View::Redirect(Stage::Demographics));
        assert_eq!(survey.view(token, Stage::Done), View::Done);
        assert_eq!(survey.resume(token), Stage::Demographics);
        assert!(survey.sessions().is_empty());
    }

    #[test]
    fn anonymous_page_views_are_not_stored() {
        let survey = memory_survey();
        for _ in 0..1000 {
            survey.view(SessionToken::new_v4(), Stage::Mobility);
        }
        assert!(survey.sessions().is_empty());
    }

    #[test]
    fn only_accepted_submits_register_a_token() {
        let survey = memory_survey();
        let stray = SessionToken::new_v4();
        let next = survey.submit(stray, Stage::Choice(ScenarioId(4)), &form(&[("choice", "A")])).unwrap();
        assert_eq!(next, View::Redirect(Stage::Demographics));
        assert!(survey.sessions().is_empty());

        let fresh = SessionToken::new_v4();
        let next = survey.submit(fresh, Stage::Demographics, &form(&[("age", "50")])).unwrap();
        assert_eq!(next, View::Redirect(Stage::Mobility));
        assert_eq!(survey.sessions().len(), 1);
        assert_eq!(survey.resume(fresh), Stage::Mobility);
    }
}

// ── Submit / completion ───────────────────────────────────────────────────────

#[cfg(test)]
mod submit_tests {
    use super::*;

    #[test]
    fn gated_submit_stores_nothing() {
        let survey = memory_survey();
        let token = survey.open_session();
        let next = survey.submit(token, Stage::Attitudes, &attitudes()).unwrap();
        assert_eq!(next, View::Redirect(Stage::Demographics));
        assert!(survey.sink().is_empty());
    }

    #[test]
    fn end_to_end_csv() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let survey = SurveyBuilder::new(config.clone()).build_csv().unwrap();
        let token = survey.open_session();

        answer_until_attitudes(&survey, token, "A");
        assert_eq!(survey.view(token, Stage::Attitudes), View::Page(Stage::Attitudes));
        let done = survey.submit(token, Stage::Attitudes, &attitudes()).unwrap();
        assert_eq!(done, View::Done);

        let rows = read_rows(&config.responses_path);
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|r| r.len() == 32));
        assert!(rows.iter().all(|r| r[0] == rows[0][0] && r[1] == rows[0][1]));
        let ids: Vec<&str> = rows.iter().map(|r| &r[15]).collect();
        let expected: Vec<String> = (1..=12).map(|k| k.to_string()).collect();
        assert_eq!(ids, expected);
        assert!(rows.iter().all(|r| &r[31] == "A"));
        assert!(rows.iter().all(|r| &r[2] == "35" && &r[11] == "5"));

        // Session is gone; the same token starts over.
        assert!(survey.sessions().get(token).is_none());
        assert_eq!(survey.resume(token), Stage::Demographics);
    }

    #[test]
    fn second_attitudes_submit_does_not_persist_again() {
        let survey = memory_survey();
        let token = survey.open_session();
        answer_until_attitudes(&survey, token, "C");
        assert_eq!(survey.submit(token, Stage::Attitudes, &attitudes()).unwrap(), View::Done);
        let again = survey.submit(token, Stage::Attitudes, &attitudes()).unwrap();
        assert_eq!(again, View::Redirect(Stage::Demographics));
        assert_eq!(survey.sink().len(), 12);
    }

    #[test]
    fn sink_failure_keeps_session_for_retry() {
        let design = DesignGenerator::new(&AttributeCatalog::mobility()).generate(12, 3, 42).unwrap();
        let survey = SurveyBuilder::new(SurveyConfig::default())
            .design(design)
            .build(|layout| FlakySink {
                inner: MemorySink::new(layout),
                fail:  std::sync::atomic::AtomicBool::new(true),
            })
            .unwrap();
        let token = survey.open_session();
        answer_until_attitudes(&survey, token, "B");

        let result = survey.submit(token, Stage::Attitudes, &attitudes());
        assert!(matches!(result, Err(SurveyError::Output(_))));
        assert!(survey.sink().inner.is_empty());
        // Choices and attitudes survived the failed write.
        let handle = survey.sessions().get(token).unwrap();
        {
            let state = lock_session(&handle);
            assert_eq!(state.choices().len(), 12);
            assert!(state.attitudes().is_some());
        }
        assert_eq!(survey.resume(token), Stage::Attitudes);

        survey.sink().fail.store(false, std::sync::atomic::Ordering::SeqCst);
        assert_eq!(survey.submit(token, Stage::Attitudes, &attitudes()).unwrap(), View::Done);
        let rows = survey.sink().inner.records();
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|r| r.choice == "B"));
    }

    #[test]
    fn resubmitting_mobility_resets_choices() {
        let survey = memory_survey();
        let token = survey.open_session();
        answer_until_attitudes(&survey, token, "A");
        survey.submit(token, Stage::Mobility, &form(&[("main_mode", "car")])).unwrap();
        assert_eq!(survey.view(token, Stage::Attitudes), View::Redirect(Stage::Choice(ScenarioId(1))));
    }
}

// ── Concurrency ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod concurrency_tests {
    use super::*;

    #[test]
    fn two_respondents_two_threads() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let survey = SurveyBuilder::new(config.clone()).build_csv().unwrap();

        std::thread::scope(|s| {
            for label in ["A", "B"] {
                let survey = &survey;
                s.spawn(move || {
                    let token = survey.open_session();
                    answer_until_attitudes(survey, token, label);
                    survey.submit(token, Stage::Attitudes, &attitudes()).unwrap();
                });
            }
        });

        let rows = read_rows(&config.responses_path);
        assert_eq!(rows.len(), 24);
        for chunk in rows.chunks(12) {
            assert!(chunk.iter().all(|r| r[0] == chunk[0][0]));
            assert!(chunk.iter().all(|r| r[31] == chunk[0][31]));
        }
        assert_ne!(&rows[0][0], &rows[12][0]);
        assert!(survey.sessions().is_empty());
    }

    #[test]
    fn survey_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Survey<CsvSink>>();
        assert_send_sync::<Survey<MemorySink>>();
    }
}
