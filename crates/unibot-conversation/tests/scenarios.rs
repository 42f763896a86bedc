//! End-to-end conversation scenarios.

use chrono::NaiveTime;
use mockall::mock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::sync::Arc;
use unibot_conversation::dispatch::GREETINGS;
use unibot_conversation::{Assistant, ExportFormat, Session};
use unibot_core::{AppConfig, ScheduleRecord, ScheduleStore};
use unibot_nlp::{BackendRegistry, Intent, IntentPredictor, NlpError};

mock! {
    pub Predictor {}

    impl IntentPredictor for Predictor {
        fn predict(&self, text: &str) -> unibot_nlp::Result<Intent>;
    }
}

fn at(h: u32, m: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, 0)
}

fn fixed(intent: Intent) -> Arc<MockPredictor> {
    let mut predictor = MockPredictor::new();
    predictor.expect_predict().returning(move |_| Ok(intent));
    Arc::new(predictor)
}

fn session(records: Vec<ScheduleRecord>, predictor: Arc<MockPredictor>) -> Session {
    let assistant = Assistant::with_components(
        &AppConfig::default(),
        ScheduleStore::new(records),
        &BackendRegistry::with_builtins(),
        predictor,
    )
    .unwrap();
    assistant.session_with_rng(Box::new(StdRng::seed_from_u64(42)))
}

fn single_lecture() -> Vec<ScheduleRecord> {
    vec![ScheduleRecord::lecture(
        "CS101",
        "Dr. Ada Lovelace",
        "Monday",
        at(9, 0),
        "201",
    )]
}

#[test]
fn class_schedule_for_named_course() {
    let mut session = session(single_lecture(), fixed(Intent::ClassSchedule));

    let entities = session.extract_entities("When is CS101?").unwrap();
    assert_eq!(entities.course.as_deref(), Some("CS101"));

    let response = session.generate_response("When is CS101?", &entities).unwrap();
    assert!(response.contains("CS101"));
    assert!(response.contains("09:00"));
    assert!(response.contains("201"));
}

#[test]
fn class_schedule_without_course_asks_for_one() {
    let mut session = session(single_lecture(), fixed(Intent::ClassSchedule));
    assert_eq!(
        session.handle_turn("When is it?"),
        "Which course's schedule would you like to know?"
    );
}

#[test]
fn conflicting_lectures_are_listed_together() {
    let records = vec![
        ScheduleRecord::lecture("CS101", "Dr. Ada Lovelace", "Tuesday", at(10, 0), "201"),
        ScheduleRecord::lecture("MATH101", "Alan Turing", "Tuesday", at(10, 0), "202"),
        ScheduleRecord::lecture("PHYS101", "Marie Curie", "Tuesday", at(13, 0), "203"),
    ];
    let mut session = session(records, fixed(Intent::ScheduleConflict));

    assert_eq!(
        session.handle_turn("Any clashes?"),
        "⚠️ Schedule conflicts:\n- Tuesday at 10:00: CS101, MATH101"
    );
}

#[test]
fn followup_reuses_previous_course() {
    let records = vec![
        ScheduleRecord::lecture("CS101", "Dr. Ada Lovelace", "Pazartesi", at(9, 0), "201"),
        ScheduleRecord::lecture("CS101", "Dr. Ada Lovelace", "Cuma", at(14, 0), "UZEM"),
    ];
    let mut session = session(records, fixed(Intent::ClassSchedule));
    session.handle_turn("When is CS101?");

    let english_day = session.extract_entities("What about on Friday?").unwrap();
    assert_eq!(english_day.course.as_deref(), Some("CS101"));
    assert_eq!(english_day.day.as_deref(), Some("Friday"));

    let entities = session.extract_entities("What about on Cuma?").unwrap();
    assert_eq!(entities.course.as_deref(), Some("CS101"));
    assert_eq!(entities.day.as_deref(), Some("Cuma"));

    assert_eq!(
        session.generate_response("What about on Cuma?", &entities).unwrap(),
        "📚 Schedule for CS101:\n- Cuma at 14:00 in room UZEM"
    );
}

#[test]
fn turn_without_subject_inherits_course() {
    let mut session = session(single_lecture(), fixed(Intent::RoomInfo));
    session.handle_turn("CS101 ne zaman?");

    let reply = session.ask("peki cuma günü nerede?").unwrap();
    assert_eq!(reply.intent, Intent::RoomInfo);
    assert_eq!(reply.entities.course.as_deref(), Some("CS101"));
    assert_eq!(reply.entities.day.as_deref(), Some("Cuma"));
    assert_eq!(reply.response, "No room info found for CS101.");
}

#[test]
fn invalid_input_is_reported_and_session_survives() {
    let mut session = session(single_lecture(), fixed(Intent::ClassSchedule));

    let reply = session.handle_turn("   ");
    assert_eq!(reply, "⚠️ Error: Validation error: Query cannot be empty");
    assert!(session.context().is_empty());

    assert!(session.handle_turn("When is CS101?").contains("09:00"));
    assert_eq!(session.context().len(), 1);
}

#[test]
fn predictor_failure_leaves_context_untouched() {
    let mut predictor = MockPredictor::new();
    predictor
        .expect_predict()
        .returning(|_| Err(NlpError::classification("model offline")));
    let mut session = session(single_lecture(), Arc::new(predictor));

    assert_eq!(
        session.handle_turn("When is CS101?"),
        "⚠️ Error: Classification error: model offline"
    );
    assert!(session.context().is_empty());
}

#[test]
fn greeting_is_one_of_the_candidates() {
    let mut session = session(single_lecture(), fixed(Intent::Greeting));
    for _ in 0..5 {
        let reply = session.handle_turn("hello");
        assert!(GREETINGS.contains(&reply.as_str()), "unexpected greeting {}", reply);
    }
}

#[test]
fn history_is_bounded_and_exportable() {
    let mut session = session(single_lecture(), fixed(Intent::ClassSchedule));
    for i in 0..7 {
        session.handle_turn(&format!("When is CS101? ({})", i));
    }
    assert_eq!(session.context().len(), 5);

    let markdown = session.export_history(ExportFormat::Markdown).unwrap();
    assert_eq!(markdown.matches("## class_schedule").count(), 5);
    assert!(!markdown.contains("(1)"));

    session.reset();
    assert!(session.context().is_empty());
    assert_eq!(session.context().last_course(), None);
}

#[test]
fn sessions_do_not_share_context() {
    let assistant = Assistant::with_components(
        &AppConfig::default(),
        ScheduleStore::new(single_lecture()),
        &BackendRegistry::with_builtins(),
        fixed(Intent::ClassSchedule),
    )
    .unwrap();

    let mut first = assistant.new_session();
    let mut second = assistant.new_session();
    first.handle_turn("When is CS101?");

    assert_eq!(
        second.handle_turn("When is it?"),
        "Which course's schedule would you like to know?"
    );
    assert_ne!(first.id(), second.id());
}

#[test]
fn bootstrap_from_schedule_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"[
            {{"Course": "CS101", "Teacher": "Dr. Ada Lovelace", "Day": "Pazartesi",
              "Time": "09.00-10.50", "Room": 201, "Exam Type": "Lecture",
              "Exam Date": null, "Exam Time": null}},
            {{"Course": "CS101", "Teacher": "Dr. Ada Lovelace", "Day": null,
              "Time": null, "Room": null, "Exam Type": "Midterm",
              "Exam Date": "12.11.2024", "Exam Time": "13:00"}}
        ]"#
    )
    .unwrap();

    let config = AppConfig::default().with_schedule_path(file.path());
    let assistant = Assistant::bootstrap(&config).unwrap();
    let mut session = assistant.session_with_rng(Box::new(StdRng::seed_from_u64(1)));

    assert_eq!(
        session.handle_turn("When is CS101?"),
        "📚 Schedule for CS101:\n- Pazartesi at 09:00 in room 201"
    );
    assert_eq!(
        session.handle_turn("When is the CS101 midterm?"),
        "📝 Exam info for CS101:\n- Midterm on 12.11.2024 at 13:00"
    );
    assert_eq!(
        session.handle_turn("Who are you? What is your name?"),
        "I'm Unibot, your friendly university schedule assistant! 😊"
    );
}
