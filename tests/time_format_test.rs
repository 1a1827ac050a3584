use pretty_assertions::assert_eq;
use todocal::extract::{format_time, normalize, parse_response, ActionItem, RawActionItem};

fn raw(start: Option<&str>, end: Option<&str>) -> RawActionItem {
    RawActionItem {
        summary: "task".to_string(),
        start_time: start.map(str::to_string),
        end_time: end.map(str::to_string),
    }
}

fn normalized(start: &str, end: &str) -> ActionItem {
    ActionItem {
        summary: "task".to_string(),
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
    }
}

#[test]
fn test_canonical_examples() {
    assert_eq!(format_time("3:30 PM").as_deref(), Some("15:30"));
    assert_eq!(format_time("3 PM").as_deref(), Some("15:00"));
    assert_eq!(format_time("by 4 PM").as_deref(), Some("16:00"));
    assert_eq!(format_time(""), None);
    assert_eq!(format_time("not a time"), None);
}

#[test]
fn test_idempotent_on_every_minute_of_the_day() {
    for hour in 0..24 {
        for minute in 0..60 {
            let canonical = format!("{:02}:{:02}", hour, minute);
            assert_eq!(format_time(&canonical).as_deref(), Some(canonical.as_str()));
        }
    }
}

#[test]
fn test_twelve_hour_clock_covers_the_day() {
    for hour in 1..=12u32 {
        let am = format_time(&format!("{}:05 AM", hour)).unwrap();
        let pm = format_time(&format!("{}:05 pm", hour)).unwrap();
        assert_eq!(am, format!("{:02}:05", hour % 12));
        assert_eq!(pm, format!("{:02}:05", hour % 12 + 12));
    }
}

#[test]
fn test_gap_filling_examples() {
    assert_eq!(
        normalize(vec![raw(Some("09:00"), None), raw(Some("10:30"), None)]),
        vec![normalized("09:00", "10:30"), normalized("10:30", "11:30")]
    );
    assert_eq!(normalize(vec![raw(Some("14:00"), None)]), vec![normalized("14:00", "15:00")]);
    assert_eq!(
        normalize(vec![raw(None, Some("10:00")), raw(Some("09:00"), None)]),
        vec![normalized("09:00", "10:00")]
    );
}

#[test]
fn test_parser_and_normalizer_together() {
    let response = r#"{"action_items": [{"summary": "task", "start_time": "by 8 AM"}, {"summary": "task", "start_time": "8:45 AM", "end_time": "9 AM"}]}"#;
    assert_eq!(
        normalize(parse_response(response)),
        vec![normalized("08:00", "08:45"), normalized("08:45", "09:00")]
    );
}
