//! Core engine for Adder - page state and compute bridge.
//!
//! This crate contains the App state machine without TUI dependencies.

use std::env;
use std::time::Duration;

use tracing::{info, warn};

pub use adder_types::{
    MAX_NUMERIC_LEN, NumberLocale, NumericText, SumResult, UiOptions, display_number,
};

mod bridge;
mod config;
mod field;
mod labels;
mod module;

pub use bridge::{BridgeState, Capability, ComputeBridge, Delegate, FALLBACK_RESULT};
pub use config::{AdderConfig, AppConfig, CONFIG_PATH_ENV, ConfigError, ModuleConfig, config_path};
pub use field::NumericTextField;
pub use labels::{Labels, Language};
pub use module::{
    ADDER_EXPORT, BuiltinLoader, CallError, ExportSignature, LoadError, Module, ModuleLoader,
    Value, ValueType,
};

/// Environment variable overriding the caption language.
pub const LANGUAGE_ENV: &str = "ADDER_LANG";
/// Environment variable overriding the number formatting locale.
pub const LOCALE_ENV: &str = "ADDER_LOCALE";

/// POSIX locale variables, in precedence order.
const POSIX_LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_NUMERIC", "LANG"];

// ============================================================================
// Settings
// ============================================================================

/// Resolved startup settings: environment overrides, then config, then defaults.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub language: Language,
    pub locale: NumberLocale,
    pub ui: UiOptions,
    pub export: String,
    pub load_delay: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            locale: NumberLocale::default(),
            ui: UiOptions::default(),
            export: ADDER_EXPORT.to_string(),
            load_delay: Duration::ZERO,
        }
    }
}

impl AppSettings {
    #[must_use]
    pub fn resolve(config: Option<&AdderConfig>) -> Self {
        Self::resolve_with(config, |key| env::var(key).ok())
    }

    /// Resolve with an injectable environment lookup.
    pub fn resolve_with<F>(config: Option<&AdderConfig>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let app = config.and_then(|c| c.app.as_ref());
        let module = config.and_then(|c| c.module.as_ref());

        let language = lookup(LANGUAGE_ENV)
            .and_then(|raw| parse_or_warn(&raw, "language", Language::parse))
            .or_else(|| {
                app.and_then(|a| a.language.as_deref())
                    .and_then(|raw| parse_or_warn(raw, "language", Language::parse))
            })
            .unwrap_or_default();

        let locale = lookup(LOCALE_ENV)
            .and_then(|raw| parse_or_warn(&raw, "locale", |r| NumberLocale::parse(r).ok()))
            .or_else(|| {
                app.and_then(|a| a.locale.as_deref())
                    .and_then(|raw| parse_or_warn(raw, "locale", |r| NumberLocale::parse(r).ok()))
            })
            .or_else(|| {
                POSIX_LOCALE_VARS
                    .iter()
                    .find_map(|key| lookup(key))
                    .and_then(|raw| NumberLocale::from_posix(&raw).ok())
            })
            .unwrap_or_default();

        let ui = UiOptions {
            ascii_only: app.is_some_and(|a| a.ascii_only),
            high_contrast: app.is_some_and(|a| a.high_contrast),
        };

        let export = module
            .and_then(|m| m.export.clone())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| ADDER_EXPORT.to_string());
        let load_delay = Duration::from_millis(module.and_then(|m| m.load_delay_ms).unwrap_or(0));

        Self {
            language,
            locale,
            ui,
            export,
            load_delay,
        }
    }
}

fn parse_or_warn<T>(raw: &str, what: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let parsed = parse(raw);
    if parsed.is_none() {
        warn!("Unknown {what} {raw:?}; using default");
    }
    parsed
}

// ============================================================================
// App
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    First,
    Second,
}

/// Focus ring order: first field, second field, Sum button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    First,
    Second,
    SumButton,
}

impl Focus {
    const ORDER: [Self; 3] = [Self::First, Self::Second, Self::SumButton];

    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    #[must_use]
    pub const fn field(self) -> Option<FieldId> {
        match self {
            Self::First => Some(FieldId::First),
            Self::Second => Some(FieldId::Second),
            Self::SumButton => None,
        }
    }
}

/// Page state: two numeric fields, the Sum trigger, and the compute bridge.
#[derive(Debug)]
pub struct App {
    first: NumericTextField,
    second: NumericTextField,
    focus: Focus,
    bridge: ComputeBridge,
    sum: SumResult,
    labels: Labels,
    locale: NumberLocale,
    ui: UiOptions,
    tick: usize,
    should_quit: bool,
}

impl App {
    /// Build the page and start loading the built-in module.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(settings: AppSettings) -> Self {
        let loader = BuiltinLoader::new(settings.load_delay);
        Self::with_loader(settings, loader)
    }

    /// Build the page and start loading from `loader`. The load is issued exactly once.
    #[must_use]
    pub fn with_loader<L: ModuleLoader>(settings: AppSettings, loader: L) -> Self {
        let mut bridge = ComputeBridge::new();
        bridge.initialize(loader, settings.export.clone());
        Self::with_bridge(settings, bridge)
    }

    /// Build the page around an existing bridge, in whatever state it is.
    #[must_use]
    pub fn with_bridge(settings: AppSettings, bridge: ComputeBridge) -> Self {
        let mut first = NumericTextField::new();
        first.focus();
        Self {
            first,
            second: NumericTextField::new(),
            focus: Focus::First,
            bridge,
            sum: None,
            labels: settings.language.labels(),
            locale: settings.locale,
            ui: settings.ui,
            tick: 0,
            should_quit: false,
        }
    }

    /// Advance one frame: count the tick and observe the module load.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.bridge.poll();
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    #[must_use]
    pub fn field(&self, id: FieldId) -> &NumericTextField {
        match id {
            FieldId::First => &self.first,
            FieldId::Second => &self.second,
        }
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut NumericTextField {
        match id {
            FieldId::First => &mut self.first,
            FieldId::Second => &mut self.second,
        }
    }

    /// The field holding focus, if focus is on a field.
    pub fn focused_field_mut(&mut self) -> Option<&mut NumericTextField> {
        self.focus.field().map(|id| self.field_mut(id))
    }

    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Move focus to `target`. A field losing focus is normalized.
    pub fn set_focus(&mut self, target: Focus) {
        if target == self.focus {
            return;
        }
        if let Some(id) = self.focus.field() {
            self.field_mut(id).on_blur();
        }
        if let Some(id) = target.field() {
            self.field_mut(id).focus();
        }
        self.focus = target;
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next());
    }

    pub fn focus_prev(&mut self) {
        self.set_focus(self.focus.prev());
    }

    /// Preview for the focused field's tooltip.
    #[must_use]
    pub fn preview(&self) -> Option<(FieldId, String)> {
        let id = self.focus.field()?;
        Some((id, self.field(id).preview(&self.locale)))
    }

    /// The Sum action: convert both fields and invoke the bridge.
    pub fn trigger_sum(&mut self) -> f64 {
        let a = self.first.to_number();
        let b = self.second.to_number();
        let result = self.bridge.invoke(a, b);
        info!(
            a,
            b,
            result,
            bridge = self.bridge.state().label(),
            "Sum triggered"
        );
        self.sum = Some(result);
        result
    }

    #[must_use]
    pub fn sum(&self) -> SumResult {
        self.sum
    }

    /// "Result: {sum}", with nothing after the prefix until the first computation.
    #[must_use]
    pub fn result_line(&self) -> String {
        match self.sum {
            Some(value) => format!("{} {}", self.labels.result_prefix, display_number(value)),
            None => self.labels.result_prefix.to_string(),
        }
    }

    #[must_use]
    pub fn bridge(&self) -> &ComputeBridge {
        &self.bridge
    }

    #[must_use]
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    #[must_use]
    pub fn locale(&self) -> &NumberLocale {
        &self.locale
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
