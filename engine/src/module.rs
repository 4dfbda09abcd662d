//! Compiled numeric modules and the invoke-by-name call convention.
//!
//! A [`Module`] is a table of named exports with declared signatures. Callers
//! never hold a function pointer directly; they go through [`Module::ccall`],
//! which checks the export name, arity and declared types before dispatching.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;

/// Export provided by the built-in module.
pub const ADDER_EXPORT: &str = "adder";

/// Declared type of a value crossing the module boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Number,
    Integer,
    Void,
}

impl ValueType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marshaled value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Integer(i32),
    Void,
}

impl Value {
    #[must_use]
    pub const fn ty(&self) -> ValueType {
        match self {
            Self::Number(_) => ValueType::Number,
            Self::Integer(_) => ValueType::Integer,
            Self::Void => ValueType::Void,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Number(n) => Some(n),
            Self::Integer(i) => Some(f64::from(i)),
            Self::Void => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSignature {
    pub params: Vec<ValueType>,
    pub returns: ValueType,
}

impl ExportSignature {
    #[must_use]
    pub fn new(params: impl Into<Vec<ValueType>>, returns: ValueType) -> Self {
        Self {
            params: params.into(),
            returns,
        }
    }

    /// `(number, number) -> number`
    #[must_use]
    pub fn binary_number() -> Self {
        Self::new([ValueType::Number, ValueType::Number], ValueType::Number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("module has no export named {0:?}")]
    UnknownExport(String),
    #[error("{export}: expected {expected} arguments, got {got}")]
    Arity {
        export: String,
        expected: usize,
        got: usize,
    },
    #[error("{export}: argument {index} declared {declared}, export takes {expected}")]
    ParamType {
        export: String,
        index: usize,
        declared: ValueType,
        expected: ValueType,
    },
    #[error("{export}: argument {index} is {actual}, declared {declared}")]
    ArgumentMismatch {
        export: String,
        index: usize,
        declared: ValueType,
        actual: ValueType,
    },
    #[error("{export}: return declared {declared}, export returns {expected}")]
    ReturnType {
        export: String,
        declared: ValueType,
        expected: ValueType,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("module {module:?} does not export {export:?}")]
    MissingExport { module: String, export: String },
    #[error("export {export:?} has signature {found}, expected (number, number) -> number")]
    IncompatibleExport { export: String, found: String },
    #[error("module instantiation failed: {0}")]
    Instantiate(String),
    #[error("module load was cancelled")]
    Cancelled,
    #[error("module load panicked: {0}")]
    Panicked(String),
}

type ExportFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

#[derive(Clone)]
struct Export {
    signature: ExportSignature,
    func: ExportFn,
}

/// A loaded module: a name and its exports.
#[derive(Clone)]
pub struct Module {
    name: String,
    exports: HashMap<String, Export>,
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.exports.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("exports", &names)
            .finish()
    }
}

impl Module {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exports: HashMap::new(),
        }
    }

    /// Register an export. A later registration under the same name replaces the earlier one.
    #[must_use]
    pub fn with_export<F>(mut self, name: impl Into<String>, signature: ExportSignature, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.exports.insert(
            name.into(),
            Export {
                signature,
                func: Arc::new(func),
            },
        );
        self
    }

    /// The compiled adder module shipped with the binary.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new("adder").with_export(
            ADDER_EXPORT,
            ExportSignature::binary_number(),
            |args| match args {
                [Value::Number(a), Value::Number(b)] => Value::Number(a + b),
                _ => Value::Void,
            },
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn signature(&self, export: &str) -> Option<&ExportSignature> {
        self.exports.get(export).map(|e| &e.signature)
    }

    #[must_use]
    pub fn export_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.exports.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Call an export by name, declaring the return type and argument types the caller
    /// marshals with. Every declaration must agree with the export's signature.
    pub fn ccall(
        &self,
        export: &str,
        returns: ValueType,
        arg_types: &[ValueType],
        args: &[Value],
    ) -> Result<Value, CallError> {
        let entry = self
            .exports
            .get(export)
            .ok_or_else(|| CallError::UnknownExport(export.to_string()))?;
        let signature = &entry.signature;

        let expected = signature.params.len();
        for got in [arg_types.len(), args.len()] {
            if got != expected {
                return Err(CallError::Arity {
                    export: export.to_string(),
                    expected,
                    got,
                });
            }
        }

        for (index, (declared, param)) in arg_types.iter().zip(&signature.params).enumerate() {
            if declared != param {
                return Err(CallError::ParamType {
                    export: export.to_string(),
                    index,
                    declared: *declared,
                    expected: *param,
                });
            }
            let actual = args[index].ty();
            if actual != *declared {
                return Err(CallError::ArgumentMismatch {
                    export: export.to_string(),
                    index,
                    declared: *declared,
                    actual,
                });
            }
        }

        if returns != signature.returns {
            return Err(CallError::ReturnType {
                export: export.to_string(),
                declared: returns,
                expected: signature.returns,
            });
        }

        Ok((entry.func)(args))
    }
}

/// Asynchronous source of a [`Module`].
pub trait ModuleLoader: Send + 'static {
    /// Human-readable source, used in logs.
    fn describe(&self) -> String;

    fn load(&self) -> BoxFuture<'static, Result<Module, LoadError>>;
}

/// Loads [`Module::builtin`], optionally after a simulated instantiation delay.
#[derive(Debug, Clone, Default)]
pub struct BuiltinLoader {
    delay: Duration,
}

impl BuiltinLoader {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl ModuleLoader for BuiltinLoader {
    fn describe(&self) -> String {
        format!("builtin adder module (delay {}ms)", self.delay.as_millis())
    }

    fn load(&self) -> BoxFuture<'static, Result<Module, LoadError>> {
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(Module::builtin())
        })
    }
}
