use crate::instrument::OperationKeys;
use crate::value::decode_int;
use crate::{KeyValueStore, Result};
use std::fmt;
use std::io;

/// One recorded call: rendered arguments and rendered result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub input: String,
    pub output: String,
}

/// Recorded history of an instrumented operation.
///
/// `count` comes from the counter and `calls` from the paired logs, read as
/// separate commands. Neither is a snapshot of the other: a call that failed,
/// or one still in flight when the logs were read, is counted without
/// appearing in `calls`.
///
/// # Examples
///
/// ```
/// use kvtrace_core::{replay, MemoryStore};
///
/// let store = MemoryStore::new();
/// let history = replay(&store, "never_called").unwrap();
///
/// assert_eq!(history.count, 0);
/// assert!(history.calls.is_empty());
/// assert_eq!(history.to_string(), "never_called was called 0 times:");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub operation: String,
    pub count: i64,
    pub calls: Vec<CallRecord>,
}

impl Replay {
    pub fn header(&self) -> String {
        format!("{} was called {} times:", self.operation, self.count)
    }

    /// The header followed by one `name(*input) -> output` line per call.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.calls.len() + 1);
        lines.push(self.header());
        lines.extend(
            self.calls
                .iter()
                .map(|call| format!("{}(*{}) -> {}", self.operation, call.input, call.output)),
        );
        lines
    }

    /// Writes every line, newline-terminated.
    pub fn write_to<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        for line in self.lines() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Reads the counter and both history logs of `operation` and pairs the logs
/// by position.
///
/// An absent counter reads as 0. When the logs differ in length only the
/// first `min(inputs, outputs)` positions are paired.
pub fn replay<S>(store: &S, operation: &str) -> Result<Replay>
where
    S: KeyValueStore + ?Sized,
{
    let keys = OperationKeys::new(operation);

    let count = match store.get(keys.counter())? {
        Some(bytes) => decode_int(&bytes)?,
        None => 0,
    };
    let inputs = store.lrange_all(keys.inputs())?;
    let outputs = store.lrange_all(keys.outputs())?;

    let calls = inputs
        .iter()
        .zip(outputs.iter())
        .map(|(input, output)| CallRecord {
            input: String::from_utf8_lossy(input).into_owned(),
            output: String::from_utf8_lossy(output).into_owned(),
        })
        .collect();

    Ok(Replay {
        operation: operation.to_string(),
        count,
        calls,
    })
}
