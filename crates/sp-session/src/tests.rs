//! Unit tests for sp-session.

use sp_core::{FormData, ScenarioId};

use crate::{Gate, SessionState, Stage, Transition};

// ── Helpers ───────────────────────────────────────────────────────────────────

const N: usize = 12;

fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn choice(label: &str) -> FormData {
    form(&[("choice", label)])
}

fn demographics_form() -> FormData {
    form(&[("age", "34"), ("gender", "f"), ("location", "urban"), ("license", "yes"), ("car_availability", "always")])
}

fn mobility_form() -> FormData {
    form(&[("main_mode", "pt"), ("commute_distance_km", "12"), ("pt_frequency", "daily"), ("sharing_experience", "no")])
}

/// Session with demographics and mobility answered, no choices yet.
fn after_mobility() -> SessionState {
    let mut s = SessionState::new();
    s.submit(Stage::Demographics, &demographics_form(), N);
    s.submit(Stage::Mobility, &mobility_form(), N);
    s
}

/// Session with the first `n` choices answered "A".
fn with_choices(n: u32) -> SessionState {
    let mut s = after_mobility();
    for k in 1..=n {
        s.submit(Stage::Choice(ScenarioId(k)), &choice("A"), N);
    }
    s
}

// ── Gate ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod gate {
    use super::*;

    #[test]
    fn demographics_always_open() {
        assert_eq!(SessionState::new().gate(Stage::Demographics, N), Gate::Open);
    }

    #[test]
    fn mobility_without_demographics_redirects() {
        let s = SessionState::new();
        assert_eq!(s.gate(Stage::Mobility, N), Gate::Redirect(Stage::Demographics));
    }

    #[test]
    fn choice_without_mobility_redirects_to_mobility() {
        let mut s = SessionState::new();
        s.submit(Stage::Demographics, &demographics_form(), N);
        assert_eq!(
            s.gate(Stage::Choice(ScenarioId(5)), N),
            Gate::Redirect(Stage::Mobility)
        );
    }

    #[test]
    fn choice_on_empty_session_redirects_to_demographics() {
        let s = SessionState::new();
        assert_eq!(
            s.gate(Stage::Choice(ScenarioId(5)), N),
            Gate::Redirect(Stage::Demographics)
        );
    }

    #[test]
    fn attitudes_with_eleven_choices_redirects_to_first_choice() {
        let s = with_choices(11);
        assert_eq!(
            s.gate(Stage::Attitudes, N),
            Gate::Redirect(Stage::Choice(ScenarioId(1)))
        );
    }

    #[test]
    fn attitudes_with_all_choices_open() {
        assert_eq!(with_choices(12).gate(Stage::Attitudes, N), Gate::Open);
    }

    #[test]
    fn out_of_range_choice_routes_to_attitudes() {
        let s = after_mobility();
        assert_eq!(s.gate(Stage::Choice(ScenarioId(0)), N), Gate::Redirect(Stage::Attitudes));
        assert_eq!(s.gate(Stage::Choice(ScenarioId(13)), N), Gate::Redirect(Stage::Attitudes));
        assert_eq!(s.gate(Stage::Choice(ScenarioId(12)), N), Gate::Open);
    }

    #[test]
    fn done_always_open() {
        assert_eq!(SessionState::new().gate(Stage::Done, N), Gate::Open);
    }
}

// ── Submission ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod submit {
    use super::*;

    #[test]
    fn stages_advance_in_order() {
        let mut s = SessionState::new();
        assert_eq!(
            s.submit(Stage::Demographics, &demographics_form(), N),
            Transition::Advance(Stage::Mobility)
        );
        assert_eq!(
            s.submit(Stage::Mobility, &mobility_form(), N),
            Transition::Advance(Stage::Choice(ScenarioId(1)))
        );
        for k in 1..12 {
            assert_eq!(
                s.submit(Stage::Choice(ScenarioId(k)), &choice("B"), N),
                Transition::Advance(Stage::Choice(ScenarioId(k + 1)))
            );
        }
        assert_eq!(
            s.submit(Stage::Choice(ScenarioId(12)), &choice("B"), N),
            Transition::Advance(Stage::Attitudes)
        );
        assert_eq!(
            s.submit(Stage::Attitudes, &form(&[("env_awareness", "5")]), N),
            Transition::Complete
        );
        assert_eq!(s.attitudes().unwrap().get("env_awareness"), Some("5"));
    }

    #[test]
    fn resubmitted_choice_overwrites() {
        let mut s = after_mobility();
        s.submit(Stage::Choice(ScenarioId(3)), &choice("A"), N);
        s.submit(Stage::Choice(ScenarioId(3)), &choice("B"), N);
        assert_eq!(s.choices().len(), 1);
        assert_eq!(s.choice(ScenarioId(3)), Some("B"));
    }

    #[test]
    fn gated_submit_stores_nothing() {
        let mut s = SessionState::new();
        assert_eq!(
            s.submit(Stage::Mobility, &mobility_form(), N),
            Transition::Redirect(Stage::Demographics)
        );
        assert!(s.is_empty());
    }

    #[test]
    fn out_of_range_submit_stores_nothing() {
        let mut s = after_mobility();
        assert_eq!(
            s.submit(Stage::Choice(ScenarioId(13)), &choice("A"), N),
            Transition::Redirect(Stage::Attitudes)
        );
        assert!(s.choices().is_empty());
    }

    #[test]
    fn missing_choice_field_is_stored_empty() {
        let mut s = after_mobility();
        s.submit(Stage::Choice(ScenarioId(1)), &FormData::new(), N);
        assert_eq!(s.choice(ScenarioId(1)), Some(""));
    }

    #[test]
    fn resubmitting_mobility_restarts_choices() {
        let mut s = with_choices(4);
        s.submit(Stage::Mobility, &mobility_form(), N);
        assert!(s.choices().is_empty());
    }

    #[test]
    fn attitudes_submit_before_choices_redirects() {
        let mut s = with_choices(3);
        assert_eq!(
            s.submit(Stage::Attitudes, &FormData::new(), N),
            Transition::Redirect(Stage::Choice(ScenarioId(1)))
        );
        assert!(s.attitudes().is_none());
    }

    #[test]
    fn clear_wipes_everything() {
        let mut s = with_choices(12);
        s.submit(Stage::Attitudes, &FormData::new(), N);
        assert!(!s.is_empty());
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s, SessionState::default());
    }
}

// ── Resume ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod resume {
    use super::*;

    #[test]
    fn resume_points() {
        assert_eq!(SessionState::new().resume_stage(N), Stage::Demographics);
        let mut s = SessionState::new();
        s.submit(Stage::Demographics, &demographics_form(), N);
        assert_eq!(s.resume_stage(N), Stage::Mobility);
        assert_eq!(after_mobility().resume_stage(N), Stage::Choice(ScenarioId(1)));
        assert_eq!(with_choices(5).resume_stage(N), Stage::Choice(ScenarioId(6)));
        assert_eq!(with_choices(12).resume_stage(N), Stage::Attitudes);
    }

    #[test]
    fn resume_skips_answered_gaps() {
        let mut s = after_mobility();
        s.submit(Stage::Choice(ScenarioId(1)), &choice("A"), N);
        s.submit(Stage::Choice(ScenarioId(3)), &choice("A"), N);
        assert_eq!(s.resume_stage(N), Stage::Choice(ScenarioId(2)));
    }
}

// ── Stage paths ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod stage {
    use super::*;

    #[test]
    fn path_round_trip() {
        for stage in [
            Stage::Demographics,
            Stage::Mobility,
            Stage::Choice(ScenarioId(7)),
            Stage::Attitudes,
            Stage::Done,
        ] {
            assert_eq!(Stage::from_path(&stage.path()), Some(stage));
        }
    }

    #[test]
    fn unknown_paths() {
        assert_eq!(Stage::from_path("/admin/data"), None);
        assert_eq!(Stage::from_path("/survey/choice/x"), None);
        assert_eq!(Stage::from_path("/survey/choice/3/"), Some(Stage::Choice(ScenarioId(3))));
    }

    #[test]
    fn display() {
        assert_eq!(Stage::Choice(ScenarioId(4)).to_string(), "choice[4]");
        assert!(Stage::Done.is_terminal());
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use std::sync::Arc;
    use std::time::Duration;

    use sp_core::SessionToken;

    use super::*;
    use crate::{SessionStore, lock_session};

    #[test]
    fn open_issues_distinct_tokens() {
        let store = SessionStore::new();
        let a = store.open();
        let b = store.open();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn checkout_returns_same_session() {
        let store = SessionStore::new();
        let token = store.open();
        let h1 = store.checkout(token);
        lock_session(&h1).submit(Stage::Demographics, &demographics_form(), N);
        let h2 = store.checkout(token);
        assert!(Arc::ptr_eq(&h1, &h2));
        assert!(lock_session(&h2).demographics().is_some());
    }

    #[test]
    fn checkout_unknown_token_creates_empty_session() {
        let store = SessionStore::new();
        let token = SessionToken::new_v4();
        assert!(store.get(token).is_none());
        let handle = store.checkout(token);
        assert!(lock_session(&handle).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.open();
        let b = store.open();
        lock_session(&store.checkout(a)).submit(Stage::Demographics, &demographics_form(), N);
        assert!(lock_session(&store.checkout(b)).is_empty());
    }

    #[test]
    fn discard_removes() {
        let store = SessionStore::new();
        let token = store.open();
        assert!(store.discard(token).is_some());
        assert!(store.discard(token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn prune_drops_idle_sessions() {
        let store = SessionStore::new();
        let idle = store.open();
        let busy = store.open();
        let held = store.checkout(busy);

        assert_eq!(store.prune(Duration::from_secs(3600)), 0);
        assert_eq!(store.len(), 2);

        // Everything is idle at a zero limit, but a checked-out session stays.
        assert_eq!(store.prune(Duration::ZERO), 1);
        assert!(store.get(idle).is_none());
        assert!(store.get(busy).is_some());
        drop(held);
        assert_eq!(store.prune(Duration::ZERO), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn idle_sessions_expire_on_later_requests() {
        let store = SessionStore::with_max_idle(Duration::from_millis(200));
        for _ in 0..100 {
            store.open();
        }
        assert_eq!(store.len(), 100);
        std::thread::sleep(Duration::from_millis(400));
        let fresh = store.open();
        assert_eq!(store.len(), 1);
        assert!(store.get(fresh).is_some());
    }

    #[test]
    fn get_never_creates() {
        let store = SessionStore::new();
        for _ in 0..10 {
            assert!(store.get(SessionToken::new_v4()).is_none());
        }
        assert!(store.is_empty());
    }
}
