use anyhow::Result;
use chrono::NaiveDate;
use marathon_coach_lib::{
    store, AppState, CoachError, Dialog, ImportError, LogForm, PlanPosition, Units,
    ValidationError, View, ViewError,
};
use rusqlite::Connection;

const SCHEDULE: &str = "\
Week,Mon,Tue,Wed,Thu,Fri,Sat,Sun
Week 1,Rest,5k Easy,Intervals,Rest,5k Easy,Rest,10k Long
Week 2,Rest,6k Easy,Tempo,Rest,6k Easy,Rest,12k Long
";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn plan_start() -> NaiveDate {
    ymd(2024, 1, 8)
}

// Wednesday of week 1
fn today() -> NaiveDate {
    ymd(2024, 1, 10)
}

fn empty_state() -> Result<AppState> {
    let conn = Connection::open_in_memory()?;
    store::init_store(&conn)?;
    Ok(AppState::load(conn, today()))
}

fn imported_state() -> Result<AppState> {
    let mut state = empty_state()?;
    state.import_plan(plan_start(), SCHEDULE)?;
    state.dismiss_dialog()?;
    Ok(state)
}

fn form(distance: &str) -> LogForm {
    LogForm {
        distance: distance.to_string(),
        duration: "00:30:00".to_string(),
        pace: "6:00".to_string(),
        units: Units::Metric,
        ..Default::default()
    }
}

fn notice_text(state: &AppState) -> Option<(String, String)> {
    match state.dialog().dialog() {
        Dialog::Notice(notice) => Some((notice.title.clone(), notice.message.clone())),
        _ => None,
    }
}

#[test]
fn test_fresh_store_starts_on_import() -> Result<()> {
    let state = empty_state()?;
    assert_eq!(state.view(), View::Import);
    assert!(state.plan().is_none());
    assert!(state.logs().is_empty());
    assert!(!state.dialog().is_open());
    assert_eq!(state.locate(today()), PlanPosition::NotLoaded);
    Ok(())
}

#[test]
fn test_import_moves_to_dashboard_after_notice() -> Result<()> {
    let mut state = empty_state()?;
    let weeks = state.import_plan(plan_start(), SCHEDULE)?;
    assert_eq!(weeks, 2);
    assert_eq!(state.view(), View::Dashboard);
    assert_eq!(
        notice_text(&state),
        Some((
            "Success".to_string(),
            "Successfully imported 2 weeks of training data, starting 2024-01-08.".to_string()
        ))
    );

    // navigation is refused until the notice is dismissed
    assert_eq!(state.open_today(), Err(ViewError::DialogOpen));
    state.dismiss_dialog()?;

    let position = state.locate(today());
    assert_eq!(position.week_label(), Some("Week 1"));
    assert_eq!(position.activity(), Some("Intervals"));
    Ok(())
}

#[test]
fn test_import_rejects_bad_input_without_changes() -> Result<()> {
    let mut state = empty_state()?;

    let err = state.import_plan(ymd(2024, 1, 9), SCHEDULE).unwrap_err();
    assert_eq!(
        err,
        CoachError::Import(ImportError::StartNotMonday(ymd(2024, 1, 9)))
    );

    let err = state
        .import_plan(plan_start(), "Week,Mon,Tue\nWeek 1,Rest,Run\n")
        .unwrap_err();
    assert!(matches!(err, CoachError::Import(ImportError::InvalidHeader(_))));

    let err = state.import_plan(plan_start(), "").unwrap_err();
    assert_eq!(err, CoachError::Import(ImportError::EmptyFile));

    assert!(state.plan().is_none());
    assert_eq!(state.view(), View::Import);
    assert!(!state.dialog().is_open());
    Ok(())
}

#[test]
fn test_open_today_and_submit_log() -> Result<()> {
    let mut state = imported_state()?;
    assert_eq!(state.open_today()?, View::LogEntry { date: today() });

    state.submit_log(&form("8.5"))?;
    // stays on the form until the acknowledgement is dismissed
    assert_eq!(state.view(), View::LogEntry { date: today() });
    let (title, message) = notice_text(&state).unwrap();
    assert_eq!(title, "Success");
    assert_eq!(message, "Workout for 2024-01-10 has been successfully logged!");

    assert_eq!(state.dismiss_dialog()?, View::Dashboard);
    let entry = state.entry(today()).unwrap();
    assert_eq!(entry.planned_activity, "Intervals");
    assert!((entry.log.distance - 8.5).abs() < f64::EPSILON);

    // logged today opens the detail view
    assert_eq!(state.open_today()?, View::Detail { date: today() });
    Ok(())
}

#[test]
fn test_editing_a_past_day_reports_update() -> Result<()> {
    let mut state = imported_state()?;
    let monday = plan_start();

    state.show_full_plan()?;
    assert_eq!(state.select_day(monday)?, View::LogEntry { date: monday });
    state.submit_log(&form("3"))?;
    assert_eq!(state.dismiss_dialog()?, View::FullPlan);

    assert_eq!(state.select_day(monday)?, View::Detail { date: monday });
    assert_eq!(state.edit()?, View::LogEntry { date: monday });
    state.submit_log(&form("4"))?;
    let (_, message) = notice_text(&state).unwrap();
    assert_eq!(message, "Workout for 2024-01-08 has been successfully updated!");
    state.dismiss_dialog()?;

    assert_eq!(state.logs().len(), 1);
    assert!((state.entry(monday).unwrap().log.distance - 4.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn test_invalid_form_changes_nothing() -> Result<()> {
    let mut state = imported_state()?;
    state.open_today()?;

    let err = state.submit_log(&form("")).unwrap_err();
    assert_eq!(
        err,
        CoachError::Validation(ValidationError::MissingField("Distance"))
    );
    let bad_link = LogForm {
        external_link: "not a url".to_string(),
        ..form("5")
    };
    assert!(matches!(
        state.submit_log(&bad_link),
        Err(CoachError::Validation(ValidationError::InvalidField { .. }))
    ));

    assert!(state.logs().is_empty());
    assert!(!state.dialog().is_open());
    assert_eq!(state.view(), View::LogEntry { date: today() });
    Ok(())
}

#[test]
fn test_delete_confirm_removes_log() -> Result<()> {
    let mut state = imported_state()?;
    state.open_today()?;
    state.submit_log(&form("5"))?;
    state.dismiss_dialog()?;
    state.open_today()?;

    state.request_delete()?;
    assert!(state.dialog().is_pending());
    assert_eq!(state.dialog().primary_label(), "Yes, Delete");
    assert_eq!(state.dialog().cancel_label(), Some("Cancel"));
    match state.dialog().dialog() {
        Dialog::Confirm(pending) => {
            assert_eq!(pending.title, "Confirm Delete");
            assert_eq!(
                pending.message,
                "Are you sure you want to delete the workout log for 2024-01-10?"
            );
        }
        other => panic!("expected a confirmation, got {other:?}"),
    }

    // deletion navigates right away and then acknowledges
    assert_eq!(state.dismiss_dialog()?, View::Dashboard);
    assert!(!state.is_logged(today()));
    assert_eq!(
        notice_text(&state),
        Some((
            "Deleted".to_string(),
            "The log for 2024-01-10 has been removed.".to_string()
        ))
    );
    assert_eq!(state.dialog().primary_label(), "Close");
    assert_eq!(state.dialog().cancel_label(), None);

    state.dismiss_dialog()?;
    assert_eq!(state.view(), View::Dashboard);
    assert_eq!(state.locate(today()).log(), None);
    Ok(())
}

#[test]
fn test_delete_cancel_keeps_log() -> Result<()> {
    let mut state = imported_state()?;
    let monday = plan_start();
    state.show_full_plan()?;
    state.select_day(monday)?;
    state.submit_log(&form("5"))?;
    state.dismiss_dialog()?;
    state.select_day(monday)?;

    state.request_delete()?;
    assert_eq!(state.cancel_dialog()?, View::Detail { date: monday });
    assert!(state.is_logged(monday));
    assert!(!state.dialog().is_open());

    // deleting a past day lands on the plan grid
    state.request_delete()?;
    assert_eq!(state.dismiss_dialog()?, View::FullPlan);
    assert!(!state.is_logged(monday));
    Ok(())
}

#[test]
fn test_delete_requires_a_log() -> Result<()> {
    let mut state = imported_state()?;
    state.open_today()?;
    assert!(matches!(
        state.request_delete(),
        Err(ViewError::InvalidTransition { .. })
    ));
    assert_eq!(state.cancel_dialog(), Err(ViewError::NoDialog));
    assert_eq!(state.dismiss_dialog(), Err(ViewError::NoDialog));
    Ok(())
}

#[test]
fn test_select_day_outside_plan_is_rejected() -> Result<()> {
    let mut state = imported_state()?;
    state.show_full_plan()?;
    assert_eq!(
        state.select_day(ymd(2024, 1, 7)),
        Err(ViewError::OutsidePlan(ymd(2024, 1, 7)))
    );
    assert_eq!(
        state.select_day(ymd(2024, 1, 22)),
        Err(ViewError::OutsidePlan(ymd(2024, 1, 22)))
    );
    assert_eq!(state.view(), View::FullPlan);
    assert!(state.select_day(ymd(2024, 1, 21)).is_ok());
    Ok(())
}

#[test]
fn test_back_navigation() -> Result<()> {
    let mut state = imported_state()?;

    state.open_today()?;
    assert_eq!(state.back()?, View::Dashboard);

    state.show_full_plan()?;
    state.select_day(ymd(2024, 1, 16))?;
    assert_eq!(state.back()?, View::FullPlan);
    assert_eq!(state.back()?, View::Dashboard);
    assert!(matches!(
        state.back(),
        Err(ViewError::InvalidTransition { .. })
    ));

    state.open_import()?;
    assert_eq!(state.back()?, View::Dashboard);
    Ok(())
}

#[test]
fn test_navigation_without_plan_is_refused() -> Result<()> {
    let mut state = empty_state()?;
    assert_eq!(state.open_today(), Err(ViewError::NoPlanLoaded));
    assert_eq!(state.show_full_plan(), Err(ViewError::NoPlanLoaded));
    assert_eq!(state.select_day(today()), Err(ViewError::NoPlanLoaded));
    assert!(matches!(
        state.back(),
        Err(ViewError::InvalidTransition { .. })
    ));
    Ok(())
}

#[test]
fn test_reimport_keeps_logs() -> Result<()> {
    let mut state = imported_state()?;
    state.open_today()?;
    state.submit_log(&form("5"))?;
    state.dismiss_dialog()?;

    state.open_import()?;
    let next_plan = "Week,Mon,Tue,Wed,Thu,Fri,Sat,Sun\nBase,A,B,C,D,E,F,G\n";
    assert_eq!(state.import_plan(plan_start(), next_plan)?, 1);
    state.dismiss_dialog()?;

    // the snapshot keeps the activity planned when the log was written
    assert_eq!(state.entry(today()).unwrap().planned_activity, "Intervals");
    assert_eq!(state.locate(today()).activity(), Some("C"));
    assert!(state.locate(today()).log().is_some());
    Ok(())
}

#[test]
fn test_state_survives_reload() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("coach.sqlite");
    {
        let conn = store::open_store(&path)?;
        store::init_store(&conn)?;
        let mut state = AppState::load(conn, today());
        state.import_plan(plan_start(), SCHEDULE)?;
        state.dismiss_dialog()?;
        state.open_today()?;
        state.submit_log(&form("7"))?;
        state.dismiss_dialog()?;
    }

    let conn = store::open_store(&path)?;
    let state = AppState::load(conn, today());
    assert_eq!(state.view(), View::Dashboard);
    assert!(!state.dialog().is_open());
    assert_eq!(state.plan().unwrap().start_date, plan_start());
    assert_eq!(state.plan().unwrap().weeks.len(), 2);
    assert!(state.is_logged(today()));
    Ok(())
}

#[test]
fn test_corrupt_schedule_raises_one_notice() -> Result<()> {
    let conn = Connection::open_in_memory()?;
    store::init_store(&conn)?;
    store::put_record(&conn, store::PLAN_KEY, "{not json")?;
    store::put_record(&conn, store::START_DATE_KEY, "2024-01-08")?;
    store::put_record(
        &conn,
        store::LOGS_KEY,
        r#"{"2024-01-09":{"plan":"5k Easy","log":{"distance":5.0,"duration":"00:30:00","pace":"6:00"}},"2024-02-30":{"plan":"x","log":{"distance":1.0,"duration":"00:10:00","pace":"10:00"}}}"#,
    )?;

    let mut state = AppState::load(conn, today());
    assert!(state.plan().is_none());
    assert_eq!(state.view(), View::Import);
    assert_eq!(state.logs().len(), 1);
    assert!(state.is_logged(ymd(2024, 1, 9)));

    let (title, _) = notice_text(&state).unwrap();
    assert_eq!(title, "Data Error");
    state.dismiss_dialog()?;
    assert!(!state.dialog().is_open());
    Ok(())
}

#[test]
fn test_raising_delete_twice_keeps_single_confirmation() -> Result<()> {
    let mut state = imported_state()?;
    state.open_today()?;
    state.submit_log(&form("5"))?;
    state.dismiss_dialog()?;
    state.open_today()?;

    state.request_delete()?;
    // a second request while one is pending is refused
    assert_eq!(state.request_delete(), Err(ViewError::DialogOpen));
    state.dismiss_dialog()?;
    state.dismiss_dialog()?;
    assert!(!state.dialog().is_open());
    assert_eq!(state.dismiss_dialog(), Err(ViewError::NoDialog));
    Ok(())
}

#[test]
fn test_imperial_form_is_stored_in_km() -> Result<()> {
    let mut state = imported_state()?;
    state.open_today()?;
    let miles = LogForm {
        units: Units::Imperial,
        ..form("10")
    };
    state.submit_log(&miles)?;
    state.dismiss_dialog()?;
    let km = state.entry(today()).unwrap().log.distance;
    assert!((km - 16.0934).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_edit_keeps_fields_not_retyped() -> Result<()> {
    let mut state = imported_state()?;
    state.open_today()?;
    let first = LogForm {
        avg_heart_rate: "148".to_string(),
        ..form("9")
    };
    state.submit_log(&first)?;
    state.dismiss_dialog()?;

    state.open_today()?;
    state.edit()?;
    let mut edit = LogForm::for_day(state.entry(today()).map(|e| &e.log), Units::Metric);
    edit.pace = "5:40".to_string();
    state.submit_log(&edit)?;
    state.dismiss_dialog()?;

    let log = &state.entry(today()).unwrap().log;
    assert_eq!(log.pace, "5:40");
    assert_eq!(log.avg_heart_rate, Some(148));
    assert_eq!(log.duration, "00:30:00");
    assert!((log.distance - 9.0).abs() < 1e-9);
    Ok(())
}
