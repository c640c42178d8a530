use chrono::NaiveDate;
use gymdesk_core::filter::{
    distinct_months, history_summary, search_subjects, HistoryEntry, HistoryFilter, YearMonth,
};
use gymdesk_core::{AttendanceRate, ClassStatus, Subject, SubjectId};

fn subject(id: &str, name: &str, category: &str, code: &str) -> Subject {
    let mut subject = Subject::new(SubjectId::new(id).unwrap(), name);
    subject.category = category.to_string();
    subject.code = code.to_string();
    subject
}

fn entry(class_name: &str, date: &str, status: ClassStatus) -> HistoryEntry {
    HistoryEntry {
        class_id: format!("id-{class_name}"),
        class_name: class_name.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        status,
    }
}

fn history() -> Vec<HistoryEntry> {
    vec![
        entry("Morning HIIT", "2025-02-03", ClassStatus::Present),
        entry("Yoga Flow", "2025-01-28", ClassStatus::Absent),
        entry("Morning HIIT", "2025-01-20", ClassStatus::Present),
        entry("Spin", "2025-02-10", ClassStatus::Present),
    ]
}

#[test]
fn roster_search_matches_name_code_and_category_ignoring_case() {
    let subjects = vec![
        subject("e1", "Ana Ruiz", "Trainer", "EMP-001"),
        subject("e2", "Bruno Diaz", "Reception", "EMP-002"),
        subject("e3", "Chen Wu", "Manager", "EMP-010"),
    ];

    let by_name: Vec<&str> = search_subjects(&subjects, "ruiz")
        .iter()
        .map(|subject| subject.id.as_str())
        .collect();
    assert_eq!(by_name, vec!["e1"]);

    assert_eq!(search_subjects(&subjects, "emp-01").len(), 1);
    assert_eq!(search_subjects(&subjects, "RECEP")[0].name, "Bruno Diaz");
    assert_eq!(search_subjects(&subjects, "  ").len(), 3);
    assert!(search_subjects(&subjects, "nobody").is_empty());
}

#[test]
fn year_month_parses_only_well_formed_values() {
    assert_eq!(
        YearMonth::parse("2025-02"),
        Some(YearMonth {
            year: 2025,
            month: 2
        })
    );
    assert_eq!(YearMonth::parse("2025-13"), None);
    assert_eq!(YearMonth::parse("2025-2"), None);
    assert_eq!(YearMonth::parse("february"), None);
    assert_eq!(YearMonth::parse("2025-02").unwrap().to_string(), "2025-02");
}

#[test]
fn month_filter_buckets_by_calendar_month() {
    let entries = history();
    let filter = HistoryFilter {
        query: String::new(),
        month: YearMonth::parse("2025-01"),
    };

    let names: Vec<&str> = filter
        .apply(&entries)
        .iter()
        .map(|entry| entry.class_name.as_str())
        .collect();
    assert_eq!(names, vec!["Yoga Flow", "Morning HIIT"]);
}

#[test]
fn query_and_month_combine() {
    let entries = history();
    let filter = HistoryFilter {
        query: "hiit".to_string(),
        month: YearMonth::parse("2025-02"),
    };

    let matched = filter.apply(&entries);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].date.to_string(), "2025-02-03");

    assert_eq!(HistoryFilter::default().apply(&entries).len(), entries.len());
}

#[test]
fn distinct_months_keep_first_seen_order() {
    let months: Vec<String> = distinct_months(&history())
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(months, vec!["2025-02", "2025-01"]);
}

#[test]
fn history_summary_counts_present_and_absent() {
    let entries = history();
    let summary = history_summary(&entries);
    assert_eq!(summary.present(), 3);
    assert_eq!(summary.count(ClassStatus::Absent), 1);
    assert_eq!(summary.rate(), AttendanceRate::Percent(75));

    let empty = history_summary(&[]);
    assert_eq!(empty.rate(), AttendanceRate::Unavailable);
}

#[test]
fn history_entries_accept_capitalized_status() {
    let parsed: HistoryEntry = serde_json::from_value(serde_json::json!({
        "classId": "c1",
        "className": "Spin",
        "date": "2025-02-10",
        "status": "Present"
    }))
    .unwrap();
    assert_eq!(parsed.status, ClassStatus::Present);
}
