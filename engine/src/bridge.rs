//! Compute bridge: a synchronous handle over an asynchronously loaded module.
//!
//! ```text
//! Uninitialized --initialize()--> Loading --poll() ok--> Ready
//!                                    |
//!                                    +----poll() err--> Failed
//! ```
//!
//! Until the load resolves successfully, [`ComputeBridge::invoke`] runs the
//! fallback capability and returns `0`. The load task is owned by the bridge;
//! dropping the bridge aborts it, so a late completion never lands anywhere.

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::module::{ExportSignature, LoadError, Module, ModuleLoader, Value, ValueType};

/// Value returned by [`Capability::Fallback`].
pub const FALLBACK_RESULT: f64 = 0.0;

const BINARY_ARGS: [ValueType; 2] = [ValueType::Number, ValueType::Number];

/// Load lifecycle of a [`ComputeBridge`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BridgeState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Failed(LoadError),
}

impl BridgeState {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// A two-argument export bound for marshaled calls.
#[derive(Debug, Clone)]
pub struct Delegate {
    module: Module,
    export: String,
}

impl Delegate {
    /// Bind `export` of `module`. The export must exist and take `(number, number) -> number`.
    pub fn bind(module: Module, export: &str) -> Result<Self, LoadError> {
        let Some(signature) = module.signature(export) else {
            return Err(LoadError::MissingExport {
                module: module.name().to_string(),
                export: export.to_string(),
            });
        };
        if *signature != ExportSignature::binary_number() {
            let params: Vec<&str> = signature.params.iter().map(|p| p.as_str()).collect();
            return Err(LoadError::IncompatibleExport {
                export: export.to_string(),
                found: format!("({}) -> {}", params.join(", "), signature.returns),
            });
        }
        Ok(Self {
            module,
            export: export.to_string(),
        })
    }

    #[must_use]
    pub fn module_name(&self) -> &str {
        self.module.name()
    }

    #[must_use]
    pub fn export(&self) -> &str {
        &self.export
    }

    /// Marshal both operands as numbers and call the export by name.
    ///
    /// A call error cannot surface through the numeric return, so it is logged and
    /// reported as NaN.
    #[must_use]
    pub fn call(&self, a: f64, b: f64) -> f64 {
        let result = self.module.ccall(
            &self.export,
            ValueType::Number,
            &BINARY_ARGS,
            &[Value::Number(a), Value::Number(b)],
        );
        match result {
            Ok(value) => {
                let value = value.as_f64().unwrap_or(f64::NAN);
                debug!(a, b, result = value, export = %self.export, "Capability call");
                value
            }
            Err(err) => {
                warn!(export = %self.export, "Capability call failed: {err}");
                f64::NAN
            }
        }
    }
}

/// The function slot behind [`ComputeBridge::invoke`].
#[derive(Debug, Clone, Default)]
pub enum Capability {
    #[default]
    Fallback,
    Delegate(Delegate),
}

impl Capability {
    #[must_use]
    pub fn call(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Fallback => FALLBACK_RESULT,
            Self::Delegate(delegate) => delegate.call(a, b),
        }
    }

    #[must_use]
    pub fn is_delegate(&self) -> bool {
        matches!(self, Self::Delegate(_))
    }
}

#[derive(Debug, Default)]
pub struct ComputeBridge {
    state: BridgeState,
    capability: Capability,
    task: Option<JoinHandle<Result<Delegate, LoadError>>>,
}

impl ComputeBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the single asynchronous load for this bridge.
    ///
    /// Only the first call has an effect. Must be called from within a tokio runtime.
    pub fn initialize<L: ModuleLoader>(&mut self, loader: L, export: impl Into<String>) {
        if self.state != BridgeState::Uninitialized {
            debug!(state = self.state.label(), "Ignoring repeated bridge initialize");
            return;
        }

        let export = export.into();
        info!(source = %loader.describe(), export = %export, "Loading compute module");
        let load = loader.load();
        self.task = Some(tokio::spawn(async move {
            let module = load.await?;
            Delegate::bind(module, &export)
        }));
        self.state = BridgeState::Loading;
    }

    /// Observe the load task without blocking. Returns true if the state changed.
    pub fn poll(&mut self) -> bool {
        let Some(task) = self.task.as_mut() else {
            return false;
        };
        let Some(joined) = (&mut *task).now_or_never() else {
            return false;
        };
        self.task = None;

        let outcome = joined.unwrap_or_else(|err| {
            Err(if err.is_cancelled() {
                LoadError::Cancelled
            } else {
                LoadError::Panicked(err.to_string())
            })
        });

        match outcome {
            Ok(delegate) => {
                info!(
                    module = delegate.module_name(),
                    export = delegate.export(),
                    "Compute module ready"
                );
                self.capability = Capability::Delegate(delegate);
                self.state = BridgeState::Ready;
            }
            Err(err) => {
                warn!("Compute module failed to load: {err}");
                self.state = BridgeState::Failed(err);
            }
        }
        true
    }

    /// Call whichever capability is installed. Operands are not validated.
    #[must_use]
    pub fn invoke(&self, a: f64, b: f64) -> f64 {
        self.capability.call(a, b)
    }

    #[must_use]
    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == BridgeState::Ready
    }

    #[must_use]
    pub fn load_error(&self) -> Option<&LoadError> {
        match &self.state {
            BridgeState::Failed(err) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn capability(&self) -> &Capability {
        &self.capability
    }
}

impl Drop for ComputeBridge {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
