//! The call capability shared by native functions, user functions and classes.

use std::fmt;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

use log::{debug, info};

use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Anything that can appear on the left of `(...)`.
pub trait Callable {
    /// Number of arguments the callee expects.  Checked by the interpreter
    /// before [`Callable::call`] runs.
    fn arity(&self) -> usize;

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value>;
}

/// A built‑in function implemented in Rust.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    /// An `Err` message is reported as a runtime error at the call site.
    pub func: fn(&[Value]) -> std::result::Result<Value, String>,
}

impl NativeFunction {
    /// `clock()`: wall‑clock seconds since the Unix epoch.
    pub fn clock() -> Self {
        NativeFunction {
            name: "clock",
            arity: 0,
            func: |_args: &[Value]| {
                let seconds: f64 = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_err(|e: SystemTimeError| format!("Clock error: {}", e))?
                    .as_secs_f64();

                info!("Native function 'clock' returned: {}", seconds);
                Ok(Value::Number(seconds))
            },
        }
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, _interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!("Calling native function '{}'", self.name);

        (self.func)(&arguments).map_err(|message: String| {
            debug!("Native function '{}' failed: {}", self.name, message);
            LoxError::Native(message)
        })
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}
