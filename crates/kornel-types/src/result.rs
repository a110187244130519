//! ExecResult: the structured result of every command execution.
//!
//! After every command, the special variable `$?` holds the exit code and
//! `${?.out}`/`${?.err}` expose the captured streams.

use std::collections::BTreeMap;

use crate::value::Value;

/// The result of executing a command.
///
/// Fields accessible via `${?.field}`:
/// - `code`: exit code (0 = success)
/// - `ok`: true if code == 0
/// - `err`: error message(s)
/// - `out`: standard output rendered as text
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExecResult {
    /// Exit code. 0 means success.
    pub code: i64,
    /// Standard output as text. Invalid UTF-8 is replaced; see `raw`.
    pub out: String,
    /// Standard error.
    pub err: String,
    /// Exact output bytes, present only when they are not valid UTF-8.
    ///
    /// `cut -b` can legitimately split a multibyte character, so byte
    /// producing tools keep the original bytes here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Vec<u8>>,
}

impl ExecResult {
    /// Create a successful result with output.
    pub fn success(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
            err: String::new(),
            raw: None,
        }
    }

    /// Create a failed result with an error message.
    pub fn failure(code: i64, err: impl Into<String>) -> Self {
        Self {
            code,
            out: String::new(),
            err: err.into(),
            raw: None,
        }
    }

    /// Create a result from raw output streams.
    pub fn from_output(code: i64, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code,
            out: stdout.into(),
            err: stderr.into(),
            raw: None,
        }
    }

    /// Create a result from byte output.
    ///
    /// Valid UTF-8 becomes `out` directly; anything else is kept verbatim in
    /// `raw` with a lossy rendering in `out`.
    pub fn from_bytes(code: i64, stdout: Vec<u8>, stderr: impl Into<String>) -> Self {
        let (out, raw) = match String::from_utf8(stdout) {
            Ok(text) => (text, None),
            Err(e) => {
                let bytes = e.into_bytes();
                (String::from_utf8_lossy(&bytes).into_owned(), Some(bytes))
            }
        };
        Self {
            code,
            out,
            err: stderr.into(),
            raw,
        }
    }

    /// True if the command succeeded (exit code 0).
    pub fn ok(&self) -> bool {
        self.code == 0
    }

    /// The exact bytes written to standard output.
    pub fn stdout_bytes(&self) -> &[u8] {
        match &self.raw {
            Some(bytes) => bytes,
            None => self.out.as_bytes(),
        }
    }

    /// Append another result's streams, taking over its exit code.
    ///
    /// Used when a script runs several statements and reports them as one.
    pub fn append(&mut self, next: ExecResult) {
        match (&mut self.raw, next.raw) {
            (None, None) => self.out.push_str(&next.out),
            (raw, next_raw) => {
                let mut bytes = raw.take().unwrap_or_else(|| self.out.clone().into_bytes());
                match next_raw {
                    Some(more) => bytes.extend_from_slice(&more),
                    None => bytes.extend_from_slice(next.out.as_bytes()),
                }
                let merged = ExecResult::from_bytes(0, bytes, "");
                self.out = merged.out;
                self.raw = merged.raw;
            }
        }
        self.err.push_str(&next.err);
        self.code = next.code;
    }

    /// Get a field by name, for variable access like `${?.field}`.
    pub fn get_field(&self, name: &str) -> Option<Value> {
        match name {
            "code" => Some(Value::Int(self.code)),
            "ok" => Some(Value::Bool(self.ok())),
            "out" => Some(Value::String(self.out.clone())),
            "err" => Some(Value::String(self.err.clone())),
            _ => None,
        }
    }
}

impl Default for ExecResult {
    fn default() -> Self {
        Self::success("")
    }
}

/// Convert serde_json::Value to our Value.
///
/// Arrays become indexed arrays and objects associative arrays.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => Value::Assoc(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}

/// Convert our Value to serde_json::Value for serialization.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Assoc(map) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in map {
                obj.insert(k.clone(), value_to_json(v));
            }
            serde_json::Value::Object(obj)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_creates_ok_result() {
        let result = ExecResult::success("hello world");
        assert!(result.ok());
        assert_eq!(result.code, 0);
        assert_eq!(result.out, "hello world");
        assert!(result.err.is_empty());
    }

    #[test]
    fn failure_creates_non_ok_result() {
        let result = ExecResult::failure(1, "command not found");
        assert!(!result.ok());
        assert_eq!(result.code, 1);
        assert_eq!(result.err, "command not found");
    }

    #[test]
    fn from_bytes_keeps_invalid_utf8() {
        let result = ExecResult::from_bytes(0, vec![b'a', 0xce, b'\n'], "");
        assert_eq!(result.stdout_bytes(), &[b'a', 0xce, b'\n']);
        assert!(result.raw.is_some());
        assert!(result.out.starts_with('a'));
    }

    #[test]
    fn from_bytes_valid_utf8_has_no_raw() {
        let result = ExecResult::from_bytes(0, "αβ\n".as_bytes().to_vec(), "");
        assert_eq!(result.out, "αβ\n");
        assert!(result.raw.is_none());
    }

    #[test]
    fn append_concatenates_and_takes_last_code() {
        let mut first = ExecResult::success("a\n");
        first.append(ExecResult::from_output(3, "b\n", "oops\n"));
        assert_eq!(first.out, "a\nb\n");
        assert_eq!(first.err, "oops\n");
        assert_eq!(first.code, 3);
    }

    #[test]
    fn append_preserves_raw_bytes() {
        let mut first = ExecResult::success("x");
        first.append(ExecResult::from_bytes(0, vec![0xff], ""));
        assert_eq!(first.stdout_bytes(), &[b'x', 0xff]);
    }

    #[test]
    fn get_field_code_and_ok() {
        let result = ExecResult::failure(127, "not found");
        assert_eq!(result.get_field("code"), Some(Value::Int(127)));
        assert_eq!(result.get_field("ok"), Some(Value::Bool(false)));
        assert_eq!(result.get_field("nonexistent"), None);
    }

    #[test]
    fn json_objects_become_assoc() {
        let value = json_to_value(serde_json::json!({"k": [1, "x"]}));
        let Value::Assoc(map) = value else {
            panic!("expected assoc");
        };
        assert_eq!(
            map.get("k"),
            Some(&Value::Array(vec![Value::Int(1), Value::String("x".into())]))
        );
    }
}
