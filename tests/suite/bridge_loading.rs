//! Module loading as seen through the page.

use std::time::Duration;

use crossterm::event::KeyCode;

use adder_engine::{App, AppSettings, BridgeState, ExportSignature, LoadError, Module, Value};

use crate::common::{FixedLoader, multiplying_module, press, settle, type_text};

fn fill(app: &mut App, a: &str, b: &str) {
    type_text(app, a);
    press(app, KeyCode::Tab);
    type_text(app, b);
    press(app, KeyCode::Tab);
}

#[tokio::test]
async fn loaded_module_replaces_the_fallback() {
    let mut app = App::with_loader(AppSettings::default(), FixedLoader::module(multiplying_module()));
    fill(&mut app, "4", "5");

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.sum(), Some(0.0));

    settle(&mut app).await;
    assert_eq!(app.bridge().state(), &BridgeState::Ready);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.sum(), Some(20.0));
}

#[tokio::test(start_paused = true)]
async fn slow_module_keeps_fallback_until_resolved() {
    let loader = FixedLoader::module(Module::builtin()).delayed(Duration::from_secs(5));
    let mut app = App::with_loader(AppSettings::default(), loader);
    fill(&mut app, "2", "3");

    app.tick();
    assert_eq!(app.bridge().state(), &BridgeState::Loading);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.result_line(), "Result: 0");

    tokio::time::sleep(Duration::from_secs(6)).await;
    settle(&mut app).await;
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.result_line(), "Result: 5");
}

#[tokio::test]
async fn failed_load_keeps_returning_zero() {
    let loader = FixedLoader::failing(LoadError::Instantiate("bad magic".to_string()));
    let mut app = App::with_loader(AppSettings::default(), loader);
    settle(&mut app).await;

    assert!(matches!(
        app.bridge().load_error(),
        Some(LoadError::Instantiate(msg)) if msg == "bad magic"
    ));
    fill(&mut app, "2", "3");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.result_line(), "Result: 0");
}

#[tokio::test]
async fn module_without_the_export_fails() {
    let loader = FixedLoader::module(Module::new("empty"));
    let mut app = App::with_loader(AppSettings::default(), loader);
    settle(&mut app).await;

    assert!(matches!(
        app.bridge().load_error(),
        Some(LoadError::MissingExport { .. })
    ));
}

#[tokio::test]
async fn configured_export_name_is_bound() {
    let module = Module::new("renamed").with_export(
        "sum",
        ExportSignature::binary_number(),
        |args| match args {
            [Value::Number(a), Value::Number(b)] => Value::Number(a + b),
            _ => Value::Void,
        },
    );
    let settings = AppSettings {
        export: "sum".to_string(),
        ..AppSettings::default()
    };
    let mut app = App::with_loader(settings, FixedLoader::module(module));
    settle(&mut app).await;
    fill(&mut app, "1", "2");
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.sum(), Some(3.0));
}
