//! Integration tests for the timer engine driving a real store.
//!
//! Simulates focus/break cycles with a manual clock and checks what ends up
//! persisted.

use std::cell::Cell;
use std::rc::Rc;

use studytrack_core::{
    Event, ManualClock, MemoryBackend, SqliteBackend, StudyStore, TimerEngine, TimerMode,
    TimerSettings, TimerState,
};

#[test]
fn full_pomodoro_cycle_persists_focus_time_only() {
    let mut store = StudyStore::new(MemoryBackend::new()).unwrap();
    let goal = store.add_goal("physics", 2.0, false).unwrap();
    let settings = TimerSettings {
        cycles_before_long_break: 2,
        ..TimerSettings::default()
    };
    let clock = ManualClock::new();
    let commits = Rc::new(Cell::new(0));

    {
        let mut engine = TimerEngine::with_clock(&mut store, settings, clock.clone());
        let counter = Rc::clone(&commits);
        engine.on_session_committed(move |_| counter.set(counter.get() + 1));

        engine
            .start(TimerMode::Focus, 25, Some("physics".into()))
            .unwrap();
        let mut modes = Vec::new();
        for _ in 0..4 {
            let minutes = engine.settings().minutes_for(engine.mode());
            if engine.state() == TimerState::Expired {
                engine.start_next().unwrap();
            }
            // Tick once per simulated minute.
            for _ in 0..minutes {
                clock.advance_secs(60);
                if let Some(Event::TimerExpired { next_mode, .. }) = engine.tick().unwrap() {
                    modes.push(next_mode);
                }
            }
        }
        assert_eq!(
            modes,
            [
                TimerMode::ShortBreak,
                TimerMode::Focus,
                TimerMode::LongBreak,
                TimerMode::Focus
            ]
        );
    }

    assert_eq!(commits.get(), 2);
    assert_eq!(store.get_total_study_minutes(), 50);
    let goals = store.list_goals();
    assert_eq!(goals[0].id, goal.id);
    assert_eq!(goals[0].completed_minutes, 50);
}

#[test]
fn interrupted_session_is_salvaged_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studytrack.db");
    let clock = ManualClock::new();

    {
        let mut store = StudyStore::new(SqliteBackend::open_at(&path).unwrap()).unwrap();
        let mut engine =
            TimerEngine::with_clock(&mut store, TimerSettings::default(), clock.clone());
        engine.start(TimerMode::Focus, 45, Some("math".into())).unwrap();
        clock.advance_secs(10 * 60);
        engine.pause().unwrap();
        clock.advance_secs(60 * 60);
        engine.resume();
        clock.advance_secs(7 * 60 + 30);
        // Engine dropped here, as when the app is closed mid-session.
    }

    let store = StudyStore::new(SqliteBackend::open_at(&path).unwrap()).unwrap();
    let sessions = store.list_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration_minutes, 17);
    assert_eq!(store.get_total_study_minutes(), 17);
}

#[test]
fn running_ninety_seconds_then_reset_commits_one_minute() {
    let mut store = StudyStore::new(MemoryBackend::new()).unwrap();
    let clock = ManualClock::new();
    {
        let mut engine =
            TimerEngine::with_clock(&mut store, TimerSettings::default(), clock.clone());
        engine.start(TimerMode::Focus, 25, Some("biology".into())).unwrap();
        for _ in 0..90 {
            clock.advance_secs(1);
            engine.tick().unwrap();
        }
        engine.reset(None).unwrap();
        assert_eq!(engine.accumulated_ms(), 0);
        engine.teardown().unwrap();
    }
    assert_eq!(store.list_sessions().len(), 1);
    assert_eq!(store.get_subject_total_time("biology"), 1);
}
