use super::*;
use crate::key_event::KeyDown;

#[test]
fn parse_simple_chord() {
    let chords = parse("Ctrl+P");
    assert_eq!(chords.len(), 1);
    assert!(chords[0].ctrl);
    assert_eq!(chords[0].key, "p");
    assert_eq!(chords[0].normalized(), "ctrl+p");
}

#[test]
fn parse_multiple_chords() {
    let chords = parse("Ctrl+P,Escape");
    let normalized: Vec<String> = chords.iter().map(Chord::normalized).collect();
    assert_eq!(normalized, vec!["ctrl+p", "escape"]);
}

#[test]
fn parse_escaped_comma_key() {
    let chords = parse("cmd+\\,");
    assert_eq!(chords.len(), 1);
    assert!(chords[0].meta);
    assert_eq!(chords[0].key, ",");
    assert_eq!(chords[0].normalized(), "meta+,");
}

#[test]
fn parse_escaped_plus_key() {
    let chords = parse("Ctrl+\\+");
    assert_eq!(chords.len(), 1);
    assert_eq!(chords[0].normalized(), "ctrl++");
}

#[test]
fn parse_empty_spec_yields_nothing() {
    assert!(parse("").is_empty());
    assert!(parse(",").is_empty());
}

#[test]
fn parse_skips_malformed_chords() {
    let normalized: Vec<String> = parse("Hyper+K,F5,Ctrl+")
        .iter()
        .map(Chord::normalized)
        .collect();
    assert_eq!(normalized, vec!["f5"]);
}

#[test]
fn try_parse_reports_unknown_modifier() {
    let err = try_parse_chord("Hyper+K").unwrap_err();
    assert!(err.to_string().contains("'Hyper'"));
}

#[test]
fn try_parse_reports_missing_key() {
    assert!(try_parse_chord("Ctrl+").is_err());
}

#[test]
fn modifier_synonyms_normalize_identically() {
    for spec in ["ctl+opt+sft+command+x", "Control+Option+Shift+Cmd+X", "ctrl+alt+shift+meta+x"] {
        assert_eq!(normalize(spec), "ctrl+alt+shift+meta+x", "spec {spec}");
    }
}

#[test]
fn key_press_matches_spec_with_meta() {
    let press = KeyDown::new("Q").with_ctrl().with_meta();
    assert_eq!(normalize(&press), "ctrl+meta+q");
    assert!(has_key(&press, "Ctrl+Cmd+Q"));
    assert!(!has_key(&press, "Ctrl+Q"));
}

#[test]
fn bare_control_press_has_no_prefix() {
    let press = KeyDown::new("Control").with_ctrl();
    assert_eq!(normalize(&press), "control");
    assert!(has_key(&press, "ctrl"));
}

#[test]
fn has_key_checks_every_chord() {
    let press = KeyDown::new("Escape");
    assert!(has_key(&press, "Ctrl+P, Esc"));
    assert!(!has_key(&press, "Ctrl+P"));
    assert!(!has_key(&press, ""));
}

#[test]
fn autofill_event_never_matches() {
    let synthetic = KeyDown::unidentified();
    assert_eq!(normalize(&synthetic), AUTOFILL_SENTINEL);
    assert!(!has_key(&synthetic, "a,Enter,Tab"));
    assert!(!equal(&synthetic, &KeyDown::unidentified()));
}

#[test]
fn equal_compares_normalized_forms() {
    assert!(equal("CTRL+p", "control+P"));
    assert!(equal(&KeyDown::new("p").with_ctrl(), "Ctrl+P"));
    assert!(!equal("Ctrl+P", "Alt+P"));
    assert!(!equal("", ""));
}

#[test]
fn normalization_is_idempotent() {
    let specs = [
        "Ctrl+P",
        "ctrl+p,ctrl+a,cmd+\\,,p",
        "Shift+Tab, Escape",
        "Ctrl+\\+",
        "Control",
        "Option+Return",
        "alt+shift+meta+F12",
        "Cmd+\\",
    ];

    for spec in specs {
        let first = parse(spec);
        assert!(!first.is_empty(), "spec {spec} parsed to nothing");
        let respec: Vec<String> = first.iter().map(Chord::to_spec).collect();
        let second = parse(&respec.join(","));
        assert_eq!(first, second, "spec {spec}");

        let a: Vec<String> = first.iter().map(Chord::normalized).collect();
        let b: Vec<String> = second.iter().map(Chord::normalized).collect();
        assert_eq!(a, b, "spec {spec}");
    }
}
