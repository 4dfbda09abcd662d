//! Field validation and normalization through the public API.

use adder_engine::{ComputeBridge, NumericTextField};
use adder_types::{NumberLocale, NumericText, PREVIEW_PLACEHOLDER};

fn blurred(raw: &str) -> String {
    let mut field = NumericTextField::new();
    field.focus();
    assert!(field.on_keystroke(raw), "{raw:?} should be accepted");
    field.on_blur();
    field.text().to_string()
}

#[test]
fn blur_normalizes_partial_values() {
    assert_eq!(blurred("00.5"), "0.5");
    assert_eq!(blurred("-"), "");
    assert_eq!(blurred("3."), "3");
    assert_eq!(blurred(""), "");
}

#[test]
fn whole_invalid_keystroke_is_rejected() {
    let mut field = NumericTextField::new();
    assert!(!field.on_keystroke("12a"));
    assert_eq!(field.text(), "");
}

#[test]
fn rejected_keystroke_keeps_previous_value() {
    let mut field = NumericTextField::new();
    assert!(field.on_keystroke("-"));
    assert!(field.on_keystroke("-3."));
    assert!(!field.on_keystroke("-3.x"));
    assert_eq!(field.text(), "-3.");
}

#[test]
fn preview_placeholder_minus_and_grouping() {
    let en = NumberLocale::en_us();
    let preview = |raw: &str| NumericText::new(raw).expect("valid").preview(&en);
    assert_eq!(preview(""), PREVIEW_PLACEHOLDER);
    assert_eq!(preview("-"), "-");
    assert_eq!(preview("1234"), "1,234");
}

#[test]
fn uninitialized_bridge_returns_fallback() {
    let bridge = ComputeBridge::new();
    assert_eq!(bridge.invoke(2.0, 3.0), 0.0);
    assert!(!bridge.capability().is_delegate());
}
