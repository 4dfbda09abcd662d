//! Core domain types for Adder.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod locale;
mod numeric;

pub use locale::{LocaleError, NumberLocale};
pub use numeric::{
    InvalidNumericText, MAX_NUMERIC_LEN, NumericParts, NumericText, PREVIEW_PLACEHOLDER,
    display_number, is_numeric_text,
};

/// Result of the most recent Sum action. `None` until the first invocation.
pub type SumResult = Option<f64>;

/// Presentation toggles shared by the engine and the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
}
