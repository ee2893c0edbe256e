//! # Instrumentation
//!
//! Call counting and call history for named operations, recorded in the
//! backing store so every process sharing the store sees the same numbers.
//!
//! The two interceptors are independent and can be used alone. [`instrument`]
//! composes them in the one supported order:
//!
//! ```text
//! call_history( count_calls( operation ) )
//! ```
//!
//! History is outermost so the output it records is exactly what the
//! operation returned; counting is innermost so the counter moves before the
//! operation runs.
//!
//! ## Key layout
//!
//! For an operation named `ObjectCache.store`:
//!
//! | key                         | type    | contents                        |
//! |-----------------------------|---------|---------------------------------|
//! | `ObjectCache.store`         | integer | number of calls                 |
//! | `ObjectCache.store:inputs`  | list    | rendered arguments, call order  |
//! | `ObjectCache.store:outputs` | list    | rendered results, call order    |
//!
//! # Examples
//!
//! ```
//! use kvtrace_core::instrument::{instrument, render_args, OperationKeys};
//! use kvtrace_core::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let doubled = instrument(&store, "double", &render_args(&[&21]), || Ok(42)).unwrap();
//! assert_eq!(doubled, 42);
//!
//! let keys = OperationKeys::new("double");
//! assert_eq!(store.get(keys.counter()).unwrap(), Some(b"1".to_vec()));
//! assert_eq!(store.lrange_all(keys.inputs()).unwrap(), vec![b"(21,)".to_vec()]);
//! assert_eq!(store.lrange_all(keys.outputs()).unwrap(), vec![b"42".to_vec()]);
//! ```

use crate::{KeyValueStore, Result};
use std::fmt::{Display, Write};
use tracing::debug;

/// Store keys holding the counter and history of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationKeys {
    counter: String,
    inputs: String,
    outputs: String,
}

impl OperationKeys {
    pub fn new(operation: &str) -> Self {
        Self {
            counter: operation.to_string(),
            inputs: format!("{}:inputs", operation),
            outputs: format!("{}:outputs", operation),
        }
    }

    /// The counter key, which is the operation name itself.
    pub fn counter(&self) -> &str {
        &self.counter
    }

    pub fn inputs(&self) -> &str {
        &self.inputs
    }

    pub fn outputs(&self) -> &str {
        &self.outputs
    }
}

/// Renders call arguments as a tuple: `()`, `(a,)`, `(a, b)`.
///
/// ```
/// use kvtrace_core::instrument::render_args;
///
/// assert_eq!(render_args(&[]), "()");
/// assert_eq!(render_args(&[&"x".to_string()]), "(x,)");
/// assert_eq!(render_args(&[&1, &2]), "(1, 2)");
/// ```
pub fn render_args(args: &[&dyn Display]) -> String {
    let mut out = String::from("(");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}", arg);
    }
    if args.len() == 1 {
        out.push(',');
    }
    out.push(')');
    out
}

/// Increments the counter of `operation`, then runs `op`.
///
/// The increment happens before `op` and is not undone if `op` fails, so the
/// counter tracks attempted calls. A failure to increment aborts the call
/// without running `op`.
pub fn count_calls<S, T, F>(store: &S, operation: &str, op: F) -> Result<T>
where
    S: KeyValueStore + ?Sized,
    F: FnOnce() -> Result<T>,
{
    let count = store.incr(operation)?;
    debug!(operation, count, "counted call");
    op()
}

/// Runs `op` and, if it succeeds, appends `input` to the operation's input
/// log and the rendered result to its output log.
///
/// When `op` fails nothing is appended, keeping both logs the same length.
/// The two appends are separate store commands; a store failure between them
/// is returned to the caller and can leave an input without its output.
pub fn call_history<S, T, F>(store: &S, operation: &str, input: &str, op: F) -> Result<T>
where
    S: KeyValueStore + ?Sized,
    T: Display,
    F: FnOnce() -> Result<T>,
{
    let keys = OperationKeys::new(operation);
    let output = op()?;
    let rendered = output.to_string();

    store.rpush(keys.inputs(), input.as_bytes())?;
    let recorded = store.rpush(keys.outputs(), rendered.as_bytes())?;
    debug!(operation, input, output = %rendered, recorded, "recorded call");

    Ok(output)
}

/// Counting and history around `op`, history outermost.
pub fn instrument<S, T, F>(store: &S, operation: &str, input: &str, op: F) -> Result<T>
where
    S: KeyValueStore + ?Sized,
    T: Display,
    F: FnOnce() -> Result<T>,
{
    call_history(store, operation, input, || count_calls(store, operation, op))
}
