//! Schema-driven option parsing.
//!
//! Turns expanded words into [`ToolArgs`]. Short options may be bundled
//! (`-sn`) and take their value attached or from the next word
//! (`-d:` or `-d :`). Long options take `--name=value` or `--name value`.
//! Options and operands may be interleaved; `--` ends option parsing and
//! a lone `-` is an operand.

use thiserror::Error;

use kornel_types::Value;

use super::traits::{ToolArgs, ToolSchema};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("{0}: unknown option")]
    Unknown(String),

    #[error("{0}: option requires an argument")]
    MissingValue(String),

    #[error("{flag}: option takes no argument")]
    UnexpectedValue { flag: String },

    #[error("{flag}: bad number {value}")]
    BadInteger { flag: String, value: String },
}

/// Integer value of option `name`, if given.
pub fn int_option(args: &ToolArgs, name: &str) -> Result<Option<i64>, ArgError> {
    if let Some(n) = args.get_int(name, usize::MAX) {
        return Ok(Some(n));
    }
    match args.get_string(name, usize::MAX) {
        None => Ok(None),
        Some(value) => Err(ArgError::BadInteger {
            flag: name.to_string(),
            value,
        }),
    }
}

/// Parse `words` against `schema`.
pub fn parse_args(words: &[String], schema: &ToolSchema) -> Result<ToolArgs, ArgError> {
    let mut args = ToolArgs::new();
    let mut iter = words.iter();
    while let Some(word) = iter.next() {
        if word == "--" {
            args.positional.extend(iter.by_ref().map(|w| Value::String(w.clone())));
            break;
        }
        if let Some(long) = word.strip_prefix("--") {
            let (name, attached) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            let param = schema
                .find_flag(name)
                .ok_or_else(|| ArgError::Unknown(format!("--{name}")))?;
            if param.is_bool() {
                if attached.is_some() {
                    return Err(ArgError::UnexpectedValue { flag: format!("--{name}") });
                }
                args.flags.insert(param.name.clone());
            } else {
                let value = match attached {
                    Some(v) => v.to_string(),
                    None => iter
                        .next()
                        .cloned()
                        .ok_or_else(|| ArgError::MissingValue(format!("--{name}")))?,
                };
                args.named.insert(param.name.clone(), Value::String(value));
            }
            continue;
        }
        let Some(bundle) = word.strip_prefix('-').filter(|rest| !rest.is_empty()) else {
            args.positional.push(Value::String(word.clone()));
            continue;
        };
        for (at, c) in bundle.char_indices() {
            let flag = c.to_string();
            let param = schema
                .params
                .iter()
                .find(|p| p.aliases.iter().any(|a| a.strip_prefix('-') == Some(flag.as_str())))
                .ok_or_else(|| ArgError::Unknown(format!("-{c}")))?;
            if param.is_bool() {
                args.flags.insert(param.name.clone());
                continue;
            }
            let rest = &bundle[at + c.len_utf8()..];
            let value = if rest.is_empty() {
                iter.next()
                    .cloned()
                    .ok_or_else(|| ArgError::MissingValue(format!("-{c}")))?
            } else {
                rest.to_string()
            };
            args.named.insert(param.name.clone(), Value::String(value));
            break;
        }
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kornel_types::ParamSchema;

    fn schema() -> ToolSchema {
        ToolSchema::new("t", "test")
            .param(ParamSchema::optional("fields", "string", Value::Null, "").with_aliases(["-f"]))
            .param(ParamSchema::optional("delimiter", "string", Value::Null, "").with_aliases(["-d"]))
            .param(ParamSchema::optional("suppress", "bool", Value::Bool(false), "").with_aliases(["-s", "--only-delimited"]))
            .param(ParamSchema::optional("split", "bool", Value::Bool(false), "").with_aliases(["-n"]))
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn attached_and_separate_values() {
        let args = parse_args(&words(&["-d:", "-f", "1,3", "file"]), &schema()).unwrap();
        assert_eq!(args.get_string("delimiter", usize::MAX).as_deref(), Some(":"));
        assert_eq!(args.get_string("fields", usize::MAX).as_deref(), Some("1,3"));
        assert_eq!(args.positional_strings(), vec!["file"]);
    }

    #[test]
    fn bundled_flags_then_value() {
        let args = parse_args(&words(&["-snf2"]), &schema()).unwrap();
        assert!(args.has_flag("suppress"));
        assert!(args.has_flag("split"));
        assert_eq!(args.get_string("fields", usize::MAX).as_deref(), Some("2"));
    }

    #[test]
    fn long_options() {
        let args = parse_args(&words(&["--fields=2", "--delimiter", ",", "--only-delimited"]), &schema()).unwrap();
        assert_eq!(args.get_string("fields", usize::MAX).as_deref(), Some("2"));
        assert_eq!(args.get_string("delimiter", usize::MAX).as_deref(), Some(","));
        assert!(args.has_flag("suppress"));
    }

    #[test]
    fn dash_and_double_dash_are_operands() {
        let args = parse_args(&words(&["-", "--", "-s"]), &schema()).unwrap();
        assert_eq!(args.positional_strings(), vec!["-", "-s"]);
        assert!(!args.has_flag("suppress"));
    }

    #[test]
    fn errors() {
        assert_eq!(parse_args(&words(&["-x"]), &schema()).unwrap_err(), ArgError::Unknown("-x".into()));
        assert_eq!(parse_args(&words(&["-f"]), &schema()).unwrap_err(), ArgError::MissingValue("-f".into()));
        assert!(matches!(
            parse_args(&words(&["--suppress=yes"]), &schema()),
            Err(ArgError::UnexpectedValue { .. })
        ));
    }

    #[test]
    fn integer_options() {
        let schema = ToolSchema::new("t", "test").param(ParamSchema::optional("reclen", "int", Value::Null, "").with_aliases(["-R"]));
        let args = parse_args(&words(&["-R", "4"]), &schema).unwrap();
        assert_eq!(int_option(&args, "reclen").unwrap(), Some(4));
        let args = parse_args(&words(&["-Rx"]), &schema).unwrap();
        assert!(matches!(int_option(&args, "reclen"), Err(ArgError::BadInteger { .. })));
        assert_eq!(int_option(&ToolArgs::new(), "reclen").unwrap(), None);
    }
}
