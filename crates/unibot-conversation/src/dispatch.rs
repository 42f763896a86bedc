//! Intent dispatch engine.
//!
//! Every intent maps to a handler function through a lookup table. Handlers
//! share one signature: they read the turn's entities, the conversation
//! context and the schedule, and return the formatted answer. The context is
//! always updated before a handler runs.

use crate::context::ConversationContext;
use crate::Result;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use unibot_core::{format_clock, ExamCategory, ExamType, ScheduleQuery, ScheduleRecord, ScheduleStore};
use unibot_nlp::{Entities, EntityVocabulary, Intent, IntentPredictor};

pub const GREETINGS: &[&str] = &[
    "Merhaba! 📚 How can I assist you today?",
    "Hi! Ready to help with your schedule. 😊",
];

pub const GOODBYES: &[&str] = &["Görüşürüz! 👋", "Bye! Take care! 😊"];

pub const THANKS_REPLIES: &[&str] = &["Rica ederim! 😊", "You're welcome!"];

pub const WEATHER_REPLIES: &[&str] = &[
    "Hava durumu? ☀️ Check your window or a weather app!",
    "Weather? I’m just predict sunny vibes! 😎",
];

pub const ACADEMIC_CALENDAR_REPLY: &str =
    "📅 Academic calendar: Please check the university website for exact dates.";

pub const NAME_REPLY: &str = "I'm Unibot, your friendly university schedule assistant! 😊";

pub const UNKNOWN_REPLY: &str = "Sorry, I didn't understand. Could you clarify?";

pub const NO_CONFLICTS_REPLY: &str = "No schedule conflicts found.";

/// Read-only view a handler works from.
pub struct DispatchInput<'a> {
    pub entities: &'a Entities,
    pub context: &'a ConversationContext,
    pub store: &'a ScheduleStore,
    pub vocabulary: &'a EntityVocabulary,
}

impl DispatchInput<'_> {
    /// The turn's course, else the last course seen in the session.
    pub fn course(&self) -> Option<&str> {
        self.entities.course.as_deref().or_else(|| self.context.last_course())
    }

    pub fn teacher(&self) -> Option<&str> {
        self.entities.teacher.as_deref().or_else(|| self.context.last_teacher())
    }

    pub fn day(&self) -> Option<&str> {
        self.entities.day.as_deref().or_else(|| self.context.last_day())
    }
}

pub type Handler = fn(&DispatchInput<'_>, &mut dyn RngCore) -> String;

/// Builds the intent -> handler table.
pub fn handler_table() -> HashMap<Intent, Handler> {
    let entries: [(Intent, Handler); 16] = [
        (Intent::Greeting, greeting),
        (Intent::Goodbye, goodbye),
        (Intent::Thanks, thanks),
        (Intent::ClassSchedule, class_schedule),
        (Intent::ExamInfo, exam_info),
        (Intent::TeacherInfo, teacher_info),
        (Intent::RoomInfo, room_info),
        (Intent::DailySchedule, daily_schedule),
        (Intent::ScheduleConflict, schedule_conflict),
        (Intent::TeacherSchedule, teacher_schedule),
        (Intent::CourseAvailability, course_availability),
        (Intent::SectionInfo, section_info),
        (Intent::AcademicCalendar, academic_calendar),
        (Intent::SmalltalkWeather, smalltalk_weather),
        (Intent::SmalltalkName, smalltalk_name),
        (Intent::Unknown, unknown),
    ];
    entries.into_iter().collect()
}

/// Classifies a turn, records it in the context and formats the answer.
pub struct ResponseEngine {
    store: Arc<ScheduleStore>,
    vocabulary: Arc<EntityVocabulary>,
    predictor: Arc<dyn IntentPredictor>,
    handlers: HashMap<Intent, Handler>,
}

impl ResponseEngine {
    pub fn new(
        store: Arc<ScheduleStore>,
        vocabulary: Arc<EntityVocabulary>,
        predictor: Arc<dyn IntentPredictor>,
    ) -> Self {
        Self {
            store,
            vocabulary,
            predictor,
            handlers: handler_table(),
        }
    }

    pub fn predict(&self, text: &str) -> Result<Intent> {
        Ok(self.predictor.predict(text)?)
    }

    #[instrument(skip(self, entities, context, rng))]
    pub fn respond(
        &self,
        text: &str,
        entities: &Entities,
        context: &mut ConversationContext,
        rng: &mut dyn RngCore,
    ) -> Result<String> {
        let intent = self.predict(text)?;
        context.record(text, intent, entities);
        debug!(intent = %intent, "Dispatching");

        let handler = self.handlers.get(&intent).copied().unwrap_or(unknown);
        let input = DispatchInput {
            entities,
            context,
            store: &self.store,
            vocabulary: &self.vocabulary,
        };
        Ok(handler(&input, rng))
    }
}

fn pick(candidates: &[&'static str], rng: &mut dyn RngCore) -> String {
    candidates.choose(rng).copied().unwrap_or_default().to_string()
}

/// Joins a header and its lines, trimming trailing whitespace.
fn render(header: String, lines: impl Iterator<Item = String>) -> String {
    let mut out = header;
    for line in lines {
        out.push('\n');
        out.push_str(&line);
    }
    out.trim().to_string()
}

fn lectures(store: &ScheduleStore, query: ScheduleQuery) -> Vec<&ScheduleRecord> {
    store.filter(&query.category(ExamCategory::Lecture))
}

fn greeting(_: &DispatchInput<'_>, rng: &mut dyn RngCore) -> String {
    pick(GREETINGS, rng)
}

fn goodbye(_: &DispatchInput<'_>, rng: &mut dyn RngCore) -> String {
    pick(GOODBYES, rng)
}

fn thanks(_: &DispatchInput<'_>, rng: &mut dyn RngCore) -> String {
    pick(THANKS_REPLIES, rng)
}

fn class_schedule(input: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    let Some(course) = input.course() else {
        return "Which course's schedule would you like to know?".to_string();
    };

    let rows = lectures(input.store, ScheduleQuery::new().course(course).maybe_day(input.day()));
    if rows.is_empty() {
        return format!("No schedule found for {}.", course);
    }

    render(
        format!("📚 Schedule for {}:", course),
        rows.iter()
            .filter(|r| r.time.is_some() && !r.day.is_empty())
            .map(|r| format!("- {} at {} in room {}", r.day, format_clock(r.time), r.room)),
    )
}

fn exam_info(input: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    let Some(course) = input.course() else {
        return "Which course's exam info would you like?".to_string();
    };

    let mut query = ScheduleQuery::new().course(course).category(ExamCategory::Exam);
    if let Some(exam_type) = input
        .entities
        .exam_type
        .as_deref()
        .and_then(ExamType::from_keyword)
        .filter(ExamType::is_exam)
    {
        query = query.exam_type(exam_type);
    }

    let rows = input.store.filter(&query);
    if rows.is_empty() {
        return format!("No exam info found for {}.", course);
    }

    render(
        format!("📝 Exam info for {}:", course),
        rows.iter().filter_map(|r| {
            let date = r.exam_date?;
            Some(format!(
                "- {} on {} at {}",
                r.exam_type,
                date.format("%d.%m.%Y"),
                format_clock(r.exam_time)
            ))
        }),
    )
}

fn teacher_info(input: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    let Some(teacher) = input.teacher() else {
        return "Which teacher would you like info about?".to_string();
    };

    let rows = lectures(input.store, ScheduleQuery::new().teacher(teacher));
    if rows.is_empty() {
        return format!("No courses found for {}.", teacher);
    }

    let mut courses: Vec<&str> = Vec::new();
    for row in rows {
        if !courses.contains(&row.course.as_str()) {
            courses.push(&row.course);
        }
    }
    format!("👨‍🏫 {} teaches: {}", teacher, courses.join(", "))
}

fn room_info(input: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    let Some(course) = input.course() else {
        return "Which course's room info would you like?".to_string();
    };

    let rows = lectures(input.store, ScheduleQuery::new().course(course).maybe_day(input.day()));
    if rows.is_empty() {
        return format!("No room info found for {}.", course);
    }

    render(
        format!("🏫 Rooms for {}:", course),
        rows.iter()
            .filter(|r| !r.room.is_empty() && r.time.is_some())
            .map(|r| format!("- {} at {} in room {}", r.day, format_clock(r.time), r.room)),
    )
}

fn daily_schedule(input: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    let Some(day) = input.day() else {
        return "Which day's schedule would you like?".to_string();
    };

    let rows = lectures(input.store, ScheduleQuery::new().day(day));
    if rows.is_empty() {
        return format!("No classes found for {}.", day);
    }

    render(
        format!("📅 Schedule for {}:", day),
        rows.iter().filter(|r| r.time.is_some()).map(|r| {
            format!(
                "- {} at {} in room {} (Teacher: {})",
                r.course,
                format_clock(r.time),
                r.room,
                r.teacher
            )
        }),
    )
}

fn schedule_conflict(input: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    let conflicts = input.store.find_conflicts();
    if conflicts.is_empty() {
        return NO_CONFLICTS_REPLY.to_string();
    }

    render(
        "⚠️ Schedule conflicts:".to_string(),
        conflicts.iter().map(|c| {
            format!(
                "- {} at {}: {}",
                c.day,
                format_clock(Some(c.time)),
                c.courses.join(", ")
            )
        }),
    )
}

fn teacher_schedule(input: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    let Some(teacher) = input.teacher() else {
        return "Which teacher's schedule would you like to know about?".to_string();
    };

    let rows = lectures(input.store, ScheduleQuery::new().teacher(teacher));
    if rows.is_empty() {
        return format!("No schedule found for {}.", teacher);
    }

    render(
        format!("👨‍🏫 {}'s teaching schedule:", teacher),
        rows.iter()
            .filter(|r| r.time.is_some() && !r.day.is_empty())
            .map(|r| {
                format!(
                    "- {} on {} at {} in room {}",
                    r.course,
                    r.day,
                    format_clock(r.time),
                    r.room
                )
            }),
    )
}

fn course_availability(input: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    match input.course() {
        Some(course) if input.vocabulary.has_course(course) => {
            format!("✅ {} is available this semester.", course)
        }
        Some(course) => format!("❌ {} is not available this semester.", course),
        None => "Which course are you checking?".to_string(),
    }
}

fn section_info(input: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    let Some(course) = input.course() else {
        return "Which course's sections would you like?".to_string();
    };

    let sections = input.vocabulary.courses_containing(course);
    if sections.is_empty() {
        return format!("No sections found for {}.", course);
    }
    format!("📚 Available sections: {}", sections.join(", "))
}

fn academic_calendar(_: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    ACADEMIC_CALENDAR_REPLY.to_string()
}

fn smalltalk_weather(_: &DispatchInput<'_>, rng: &mut dyn RngCore) -> String {
    pick(WEATHER_REPLIES, rng)
}

fn smalltalk_name(_: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    NAME_REPLY.to_string()
}

fn unknown(_: &DispatchInput<'_>, _: &mut dyn RngCore) -> String {
    UNKNOWN_REPLY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use unibot_core::MatchingConfig;

    struct FixedIntent(Intent);

    impl IntentPredictor for FixedIntent {
        fn predict(&self, _: &str) -> unibot_nlp::Result<Intent> {
            Ok(self.0)
        }
    }

    fn at(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    fn store() -> ScheduleStore {
        ScheduleStore::new(vec![
            ScheduleRecord::lecture("CS101", "Dr. Ada Lovelace", "Monday", at(9, 0), "201"),
            ScheduleRecord::lecture("CS101", "Dr. Ada Lovelace", "Wednesday", at(13, 30), "202"),
            ScheduleRecord::lecture("CS101-B", "Dr. Ada Lovelace", "Tuesday", None, "203"),
            ScheduleRecord::lecture("MATH101", "Alan Turing", "Monday", at(11, 0), "UZEM"),
            ScheduleRecord::exam(
                "CS101",
                "Dr. Ada Lovelace",
                ExamType::Midterm,
                NaiveDate::from_ymd_opt(2024, 11, 12),
                at(10, 0),
            ),
            ScheduleRecord::exam(
                "CS101",
                "Dr. Ada Lovelace",
                ExamType::Final,
                NaiveDate::from_ymd_opt(2025, 1, 14),
                None,
            ),
        ])
    }

    struct Harness {
        store: ScheduleStore,
        vocabulary: EntityVocabulary,
        context: ConversationContext,
    }

    impl Harness {
        fn new() -> Self {
            let store = store();
            let vocabulary = EntityVocabulary::build(&store, &MatchingConfig::default().title_prefixes);
            Self {
                store,
                vocabulary,
                context: ConversationContext::default(),
            }
        }

        fn call(&self, handler: Handler, entities: Entities) -> String {
            let input = DispatchInput {
                entities: &entities,
                context: &self.context,
                store: &self.store,
                vocabulary: &self.vocabulary,
            };
            handler(&input, &mut StdRng::seed_from_u64(7))
        }
    }

    #[test]
    fn test_table_covers_every_intent() {
        let table = handler_table();
        for intent in Intent::ALL {
            assert!(table.contains_key(&intent), "missing handler for {}", intent);
        }
    }

    #[test]
    fn test_class_schedule() {
        let h = Harness::new();
        assert_eq!(
            h.call(class_schedule, Entities::new().with_course("CS101")),
            "📚 Schedule for CS101:\n- Monday at 09:00 in room 201\n- Wednesday at 13:30 in room 202"
        );
        assert_eq!(
            h.call(class_schedule, Entities::new().with_course("CS101").with_day("Monday")),
            "📚 Schedule for CS101:\n- Monday at 09:00 in room 201"
        );
        assert_eq!(
            h.call(class_schedule, Entities::new().with_course("BIO1")),
            "No schedule found for BIO1."
        );
        assert_eq!(
            h.call(class_schedule, Entities::new()),
            "Which course's schedule would you like to know?"
        );
    }

    #[test]
    fn test_rows_without_time_are_skipped() {
        let h = Harness::new();
        assert_eq!(
            h.call(class_schedule, Entities::new().with_course("CS101-B")),
            "📚 Schedule for CS101-B:"
        );
    }

    #[test]
    fn test_exam_info_narrowing() {
        let h = Harness::new();
        assert_eq!(
            h.call(exam_info, Entities::new().with_course("CS101")),
            "📝 Exam info for CS101:\n- Midterm on 12.11.2024 at 10:00\n- Final on 14.01.2025 at time not set"
        );
        assert_eq!(
            h.call(exam_info, Entities::new().with_course("CS101").with_exam_type("vize")),
            "📝 Exam info for CS101:\n- Midterm on 12.11.2024 at 10:00"
        );
        // a bare trigger word does not narrow
        assert!(h
            .call(exam_info, Entities::new().with_course("CS101").with_exam_type("exam"))
            .contains("Final"));
        assert_eq!(
            h.call(exam_info, Entities::new().with_course("CS101").with_exam_type("makeup")),
            "No exam info found for CS101."
        );
        assert_eq!(h.call(exam_info, Entities::new()), "Which course's exam info would you like?");
    }

    #[test]
    fn test_teacher_intents() {
        let h = Harness::new();
        assert_eq!(
            h.call(teacher_info, Entities::new().with_teacher("Dr. Ada Lovelace")),
            "👨‍🏫 Dr. Ada Lovelace teaches: CS101, CS101-B"
        );
        assert_eq!(
            h.call(teacher_info, Entities::new().with_teacher("Nobody")),
            "No courses found for Nobody."
        );
        assert_eq!(
            h.call(teacher_info, Entities::new()),
            "Which teacher would you like info about?"
        );
        assert_eq!(
            h.call(teacher_schedule, Entities::new().with_teacher("Alan Turing")),
            "👨‍🏫 Alan Turing's teaching schedule:\n- MATH101 on Monday at 11:00 in room UZEM"
        );
        assert_eq!(
            h.call(teacher_schedule, Entities::new().with_teacher("Nobody")),
            "No schedule found for Nobody."
        );
        assert_eq!(
            h.call(teacher_schedule, Entities::new()),
            "Which teacher's schedule would you like to know about?"
        );
    }

    #[test]
    fn test_room_and_daily() {
        let h = Harness::new();
        assert_eq!(
            h.call(room_info, Entities::new().with_course("MATH101")),
            "🏫 Rooms for MATH101:\n- Monday at 11:00 in room UZEM"
        );
        assert_eq!(h.call(room_info, Entities::new().with_course("X")), "No room info found for X.");
        assert_eq!(h.call(room_info, Entities::new()), "Which course's room info would you like?");

        assert_eq!(
            h.call(daily_schedule, Entities::new().with_day("Monday")),
            "📅 Schedule for Monday:\n- CS101 at 09:00 in room 201 (Teacher: Dr. Ada Lovelace)\n- MATH101 at 11:00 in room UZEM (Teacher: Alan Turing)"
        );
        assert_eq!(
            h.call(daily_schedule, Entities::new().with_day("Sunday")),
            "No classes found for Sunday."
        );
        assert_eq!(h.call(daily_schedule, Entities::new()), "Which day's schedule would you like?");
    }

    #[test]
    fn test_no_conflicts() {
        let h = Harness::new();
        assert_eq!(h.call(schedule_conflict, Entities::new()), NO_CONFLICTS_REPLY);
    }

    #[test]
    fn test_availability_and_sections() {
        let h = Harness::new();
        assert_eq!(
            h.call(course_availability, Entities::new().with_course("CS101")),
            "✅ CS101 is available this semester."
        );
        assert_eq!(
            h.call(course_availability, Entities::new().with_course("BIO1")),
            "❌ BIO1 is not available this semester."
        );
        assert_eq!(h.call(course_availability, Entities::new()), "Which course are you checking?");

        assert_eq!(
            h.call(section_info, Entities::new().with_course("CS101")),
            "📚 Available sections: CS101, CS101-B"
        );
        assert_eq!(
            h.call(section_info, Entities::new().with_course("BIO")),
            "No sections found for BIO."
        );
        assert_eq!(h.call(section_info, Entities::new()), "Which course's sections would you like?");
    }

    #[test]
    fn test_canned_replies_come_from_candidates() {
        let h = Harness::new();
        assert!(GREETINGS.contains(&h.call(greeting, Entities::new()).as_str()));
        assert!(GOODBYES.contains(&h.call(goodbye, Entities::new()).as_str()));
        assert!(THANKS_REPLIES.contains(&h.call(thanks, Entities::new()).as_str()));
        assert!(WEATHER_REPLIES.contains(&h.call(smalltalk_weather, Entities::new()).as_str()));
        assert_eq!(h.call(smalltalk_name, Entities::new()), NAME_REPLY);
        assert_eq!(h.call(academic_calendar, Entities::new()), ACADEMIC_CALENDAR_REPLY);
        assert_eq!(h.call(unknown, Entities::new()), UNKNOWN_REPLY);
    }

    #[test]
    fn test_respond_records_before_dispatch() {
        let h = Harness::new();
        let engine = ResponseEngine::new(
            Arc::new(h.store.clone()),
            Arc::new(h.vocabulary.clone()),
            Arc::new(FixedIntent(Intent::ClassSchedule)),
        );
        let mut context = ConversationContext::default();
        let mut rng = StdRng::seed_from_u64(1);

        let first = engine
            .respond("When is CS101?", &Entities::new().with_course("CS101"), &mut context, &mut rng)
            .unwrap();
        assert!(first.contains("09:00"));
        assert_eq!(context.len(), 1);

        // the sticky course answers a turn with no entities
        let second = engine
            .respond("and again?", &Entities::new(), &mut context, &mut rng)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(context.last_interaction().map(|t| t.intent), Some(Intent::ClassSchedule));
    }
}
