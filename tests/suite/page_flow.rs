//! Keyboard-driven flows over the whole page.

use crossterm::event::KeyCode;

use adder_engine::{App, AppSettings, ComputeBridge, FieldId, Focus, Language, NumberLocale};

use crate::common::{press, settle, type_text, unloaded_page};

async fn loaded_page(settings: AppSettings) -> App {
    let mut app = App::new(settings);
    settle(&mut app).await;
    app
}

#[tokio::test]
async fn type_two_numbers_and_sum() {
    let mut app = loaded_page(AppSettings::default()).await;
    type_text(&mut app, "2");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "3");
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus(), Focus::SumButton);

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.sum(), Some(5.0));
    assert_eq!(app.result_line(), "Result: 5");
}

#[tokio::test]
async fn fractional_and_negative_operands() {
    let mut app = loaded_page(AppSettings::default()).await;
    type_text(&mut app, "-1.5");
    press(&mut app, KeyCode::Enter);
    type_text(&mut app, ".25");
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.result_line(), "Result: -1.25");
}

#[tokio::test]
async fn summing_with_an_empty_field_gives_nan() {
    let mut app = loaded_page(AppSettings::default()).await;
    type_text(&mut app, "7");
    app.set_focus(Focus::SumButton);
    press(&mut app, KeyCode::Char(' '));
    assert!(app.sum().is_some_and(f64::is_nan));
    assert_eq!(app.result_line(), "Result: NaN");
}

#[tokio::test]
async fn partial_text_is_normalized_before_summing() {
    let mut app = loaded_page(AppSettings::default()).await;
    type_text(&mut app, "004.");
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.field(FieldId::First).text(), "4");
    type_text(&mut app, "-");
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.field(FieldId::Second).text(), "");
}

#[test]
fn invalid_keystrokes_leave_the_field_unchanged() {
    let mut app = unloaded_page();
    type_text(&mut app, "12a");
    assert_eq!(app.field(FieldId::First).text(), "12");
    type_text(&mut app, "e-,+");
    assert_eq!(app.field(FieldId::First).text(), "12");
    type_text(&mut app, ".5.");
    assert_eq!(app.field(FieldId::First).text(), "12.5");
}

#[test]
fn field_stops_at_sixteen_characters() {
    let mut app = unloaded_page();
    type_text(&mut app, "12345678901234567890");
    assert_eq!(app.field(FieldId::First).text(), "1234567890123456");
}

#[test]
fn sum_before_module_loads_is_zero() {
    let mut app = unloaded_page();
    type_text(&mut app, "2");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "3");
    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.result_line(), "Result: 0");
}

#[test]
fn editing_keys_move_within_the_field() {
    let mut app = unloaded_page();
    type_text(&mut app, "125");
    press(&mut app, KeyCode::Left);
    press(&mut app, KeyCode::Backspace);
    assert_eq!(app.field(FieldId::First).text(), "15");
    press(&mut app, KeyCode::Home);
    type_text(&mut app, "-");
    assert_eq!(app.field(FieldId::First).text(), "-15");
    press(&mut app, KeyCode::Home);
    press(&mut app, KeyCode::Delete);
    assert_eq!(app.field(FieldId::First).text(), "15");
    press(&mut app, KeyCode::End);
    type_text(&mut app, "0");
    assert_eq!(app.field(FieldId::First).text(), "150");
}

#[test]
fn preview_follows_locale() {
    let settings = AppSettings {
        locale: NumberLocale::parse("de-DE").expect("valid tag"),
        ..AppSettings::default()
    };
    let mut app = App::with_bridge(settings, ComputeBridge::new());
    type_text(&mut app, "1234.5");
    assert_eq!(app.preview(), Some((FieldId::First, "1.234,5".to_string())));
}

#[tokio::test]
async fn portuguese_page_sums() {
    let settings = AppSettings {
        language: Language::Portuguese,
        ..AppSettings::default()
    };
    let mut app = loaded_page(settings).await;
    type_text(&mut app, "10");
    press(&mut app, KeyCode::Tab);
    type_text(&mut app, "0.5");
    app.set_focus(Focus::SumButton);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.result_line(), "Resultado: 10.5");
}

#[test]
fn escape_quits_from_anywhere() {
    let mut app = unloaded_page();
    assert!(press(&mut app, KeyCode::Esc));
    assert!(app.should_quit());
}
