//! Word expansion against a scope.

use anyhow::{Context, Result};

use kornel_types::Value;

use super::path::VarPath;
use super::scope::Scope;
use super::words::{Word, WordPart};
use crate::arithmetic::eval_arithmetic;

/// String form of a raw value.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Assoc(map) => map.values().map(value_to_string).collect::<Vec<_>>().join(" "),
    }
}

/// Expand `${text}`.
pub fn expand_param(text: &str, scope: &Scope) -> Result<String> {
    let path = VarPath::parse(text).with_context(|| format!("${{{text}}}: bad substitution"))?;
    Ok(scope.resolve_path(&path)?)
}

/// Expand one word to a single string. Array literals render as
/// `NAME=(a b c)` text.
pub fn expand_word(word: &Word, scope: &Scope) -> Result<String> {
    let mut out = String::new();
    for part in &word.parts {
        match part {
            WordPart::Literal(s) => out.push_str(s),
            WordPart::Param(text) => out.push_str(&expand_param(text, scope)?),
            WordPart::Arith(expr) => {
                let n = eval_arithmetic(expr, scope).with_context(|| format!("$(({expr}))"))?;
                out.push_str(&n.to_string());
            }
            WordPart::Array(items) => {
                out.push('(');
                out.push_str(&expand_items(items, scope)?.join(" "));
                out.push(')');
            }
        }
    }
    Ok(out)
}

/// Expand the items of an array literal.
pub fn expand_items(items: &[Word], scope: &Scope) -> Result<Vec<String>> {
    items.iter().map(|item| expand_word(item, scope)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::words::split_script;

    fn expand(src: &str, scope: &Scope) -> Vec<String> {
        let stmts = split_script(src).unwrap();
        stmts[0].iter().map(|w| expand_word(w, scope).unwrap()).collect()
    }

    #[test]
    fn values_render() {
        assert_eq!(value_to_string(&Value::Null), "");
        assert_eq!(value_to_string(&Value::Int(-3)), "-3");
        assert_eq!(
            value_to_string(&Value::Array(vec![Value::from("a"), Value::Null, Value::from("b")])),
            "a b"
        );
    }

    #[test]
    fn params_and_arith() {
        let mut scope = Scope::new();
        scope.set("x", Value::Int(4));
        scope.set("name", Value::from("kornel"));
        assert_eq!(expand("echo $x ${name}! $((x * 2))", &scope), vec!["echo", "4", "kornel!", "8"]);
    }

    #[test]
    fn array_literal_as_text() {
        let scope = Scope::new();
        assert_eq!(expand("echo a=(1 2)", &scope), vec!["echo", "a=(1 2)"]);
    }

    #[test]
    fn bad_substitution() {
        let scope = Scope::new();
        let stmts = split_script("echo ${1x}").unwrap();
        assert!(expand_word(&stmts[0][1], &scope).is_err());
    }
}
