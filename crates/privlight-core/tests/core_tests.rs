//! Tests for privlight-core: actions, cursors, colours, errors

use chrono::NaiveDate;
use privlight_core::*;

// ===========================================================================
// Action
// ===========================================================================

#[test]
fn action_resolve_depth_increase_is_elevate() {
    assert_eq!(Action::resolve(1, 2), Action::Elevate);
    assert_eq!(Action::resolve(1, 5), Action::Elevate);
}

#[test]
fn action_resolve_depth_decrease_is_deescalate() {
    assert_eq!(Action::resolve(2, 1), Action::DeEscalate);
    assert_eq!(Action::resolve(4, 3), Action::DeEscalate);
}

#[test]
fn action_resolve_equal_is_none() {
    assert_eq!(Action::resolve(1, 1), Action::None);
    assert_eq!(Action::resolve(3, 3), Action::None);
    assert!(!Action::resolve(3, 3).is_change());
}

#[test]
fn action_display() {
    assert_eq!(Action::None.to_string(), "none");
    assert_eq!(Action::Elevate.to_string(), "elevate");
    assert_eq!(Action::DeEscalate.to_string(), "de-escalate");
}

#[test]
fn action_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&Action::DeEscalate).unwrap(), r#""de_escalate""#);
}

// ===========================================================================
// SourceMode
// ===========================================================================

#[test]
fn source_mode_from_str() {
    assert_eq!("history".parse::<SourceMode>().unwrap(), SourceMode::History);
    assert_eq!("log".parse::<SourceMode>().unwrap(), SourceMode::Log);
    assert!("syslog".parse::<SourceMode>().is_err());
}

#[test]
fn source_mode_default_is_history() {
    assert_eq!(SourceMode::default(), SourceMode::History);
}

// ===========================================================================
// Cursor
// ===========================================================================

#[test]
fn cursor_start_per_mode() {
    assert_eq!(Cursor::start(SourceMode::History), Cursor::Lines(0));
    assert_eq!(Cursor::start(SourceMode::Log), Cursor::Timestamp(None));
}

#[test]
fn cursor_display() {
    assert_eq!(Cursor::Lines(12).to_string(), "line 12");
    assert_eq!(Cursor::Timestamp(None).to_string(), "-");
    let ts = NaiveDate::from_ymd_opt(2026, 1, 5)
        .unwrap()
        .and_hms_opt(10, 0, 5)
        .unwrap();
    assert_eq!(Cursor::Timestamp(Some(ts)).to_string(), "Jan 05 10:00:05");
}

#[test]
fn cursor_json_shape() {
    let json = serde_json::to_value(Cursor::Lines(3)).unwrap();
    assert_eq!(json["kind"], "lines");
    assert_eq!(json["at"], 3);
}

// ===========================================================================
// Event
// ===========================================================================

#[test]
fn event_constructors_carry_no_timestamp() {
    assert_eq!(Event::escalate().kind, EventKind::Escalate);
    assert_eq!(Event::deescalate().kind, EventKind::DeEscalate);
    assert_eq!(Event::ignore().kind, EventKind::Ignore);
    assert!(Event::escalate().at.is_none());
}

#[test]
fn event_with_timestamp() {
    let ts = NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let ev = Event::ignore().with_timestamp(Some(ts));
    assert_eq!(ev.at, Some(ts));
    assert_eq!(ev.kind, EventKind::Ignore);
}

// ===========================================================================
// Rgb
// ===========================================================================

#[test]
fn rgb_parse_and_display() {
    let c: Rgb = "0, 153, 255".parse().unwrap();
    assert_eq!(c, Rgb::BLUE);
    assert_eq!(c.to_string(), "#0099ff");
    assert_eq!(Rgb::RED.to_bytes(), [255, 0, 0]);
}

#[test]
fn rgb_parse_rejects_bad_input() {
    assert!("255,0".parse::<Rgb>().is_err());
    assert!("256,0,0".parse::<Rgb>().is_err());
    assert!("red".parse::<Rgb>().is_err());
}

#[test]
fn rgb_serializes_as_array() {
    assert_eq!(serde_json::to_string(&Rgb::RED).unwrap(), "[255,0,0]");
}

// ===========================================================================
// Error
// ===========================================================================

#[test]
fn error_display_source_unavailable() {
    let err = Error::source_unavailable(
        "/var/log/auth.log",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    let msg = err.to_string();
    assert!(msg.contains("/var/log/auth.log"));
    assert!(msg.contains("denied"));
    assert!(!err.is_recoverable());
}

#[test]
fn error_recoverable_classes() {
    assert!(Error::malformed_line("x", "no timestamp").is_recoverable());
    assert!(Error::actuator_failure("kbd", "write failed").is_recoverable());
    assert!(Error::RotatedOrTruncatedSource {
        path: "/tmp/h".into(),
        previous: 10,
        current: 2,
    }
    .is_recoverable());
    assert!(!Error::ConfigError("bad".into()).is_recoverable());
}

#[test]
fn error_from_io() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: Error = io.into();
    assert!(matches!(err, Error::IoError(_)));
}
