//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use adder_engine::{
    App, AppSettings, ComputeBridge, ExportSignature, LoadError, Module, ModuleLoader, Value,
};
use adder_tui::apply_event;

type LoadFuture = Pin<Box<dyn Future<Output = Result<Module, LoadError>> + Send>>;

/// Loader that hands back a fixed module, or a fixed error.
pub struct FixedLoader {
    outcome: Result<Module, LoadError>,
    delay: Duration,
}

impl FixedLoader {
    pub fn module(module: Module) -> Self {
        Self {
            outcome: Ok(module),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(err: LoadError) -> Self {
        Self {
            outcome: Err(err),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl ModuleLoader for FixedLoader {
    fn describe(&self) -> String {
        "fixed test module".to_string()
    }

    fn load(&self) -> LoadFuture {
        let outcome = self.outcome.clone();
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome
        })
    }
}

/// A module whose `adder` export multiplies, to tell the delegate apart from the fallback.
pub fn multiplying_module() -> Module {
    Module::new("multiplier").with_export(
        "adder",
        ExportSignature::binary_number(),
        |args| match args {
            [Value::Number(a), Value::Number(b)] => Value::Number(a * b),
            _ => Value::Void,
        },
    )
}

/// Page with a bridge that never loads.
pub fn unloaded_page() -> App {
    App::with_bridge(AppSettings::default(), ComputeBridge::new())
}

/// Tick the page until its bridge leaves the loading state.
pub async fn settle(app: &mut App) {
    for _ in 0..200 {
        app.tick();
        if app.bridge().is_ready() || app.bridge().load_error().is_some() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("module load never settled: {:?}", app.bridge().state());
}

pub fn press(app: &mut App, code: KeyCode) -> bool {
    apply_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}
