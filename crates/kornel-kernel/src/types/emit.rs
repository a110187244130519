//! `enum -p`: writing types back out as declarations.

use std::borrow::Cow;
use std::fmt;

use super::TypeTable;
use super::enum_type::EnumDescriptor;

/// Quote a value so the word splitter reads it back unchanged.
fn quote(value: &str) -> Cow<'_, str> {
    let plain = !value.is_empty()
        && !value.starts_with('[')
        && !value.starts_with('#')
        && value.chars().all(|c| {
            !c.is_whitespace() && !matches!(c, '\'' | '"' | '\\' | '$' | ';' | '(' | ')' | '`')
        });
    if plain {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("'{}'", value.replace('\'', r"'\''")))
    }
}

/// `enum [-i ]NAME=(\n\tv0\n\tv1\n)\n`
pub fn emit_descriptor(out: &mut impl fmt::Write, descriptor: &EnumDescriptor) -> fmt::Result {
    let flag = if descriptor.is_case_insensitive() { "-i " } else { "" };
    writeln!(out, "enum {flag}{}=(", descriptor.name())?;
    for value in descriptor.values() {
        writeln!(out, "\t{}", quote(value))?;
    }
    writeln!(out, ")")
}

/// Write one named type, or every type in declaration order.
///
/// Returns how many types were written; zero means `name` is unknown.
pub fn emit(out: &mut impl fmt::Write, table: &TypeTable, name: Option<&str>) -> Result<usize, fmt::Error> {
    match name {
        Some(name) => match table.get(name) {
            Some(entry) => emit_descriptor(out, entry.descriptor()).map(|()| 1),
            None => Ok(0),
        },
        None => {
            let mut count = 0;
            for entry in table.iter() {
                emit_descriptor(out, entry.descriptor())?;
                count += 1;
            }
            Ok(count)
        }
    }
}

/// The same selection as [`emit`], as a JSON array.
pub fn emit_json(table: &TypeTable, name: Option<&str>) -> Option<serde_json::Value> {
    let descriptors: Vec<&EnumDescriptor> = match name {
        Some(name) => vec![table.get(name)?.descriptor()],
        None => table.iter().map(|e| e.descriptor()).collect(),
    };
    serde_json::to_value(descriptors).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TypeTable {
        let mut table = TypeTable::new();
        let colors = ["red", "green", "blue"].map(String::from).to_vec();
        table.register(EnumDescriptor::new("Color", colors, false).unwrap());
        table.register(EnumDescriptor::new("M", vec!["On".into(), "Off".into()], true).unwrap());
        table
    }

    #[test]
    fn one_type() {
        let mut out = String::new();
        assert_eq!(emit(&mut out, &table(), Some("Color")), Ok(1));
        assert_eq!(out, "enum Color=(\n\tred\n\tgreen\n\tblue\n)\n");
    }

    #[test]
    fn case_flag() {
        let mut out = String::new();
        emit(&mut out, &table(), Some("M")).unwrap();
        assert_eq!(out, "enum -i M=(\n\tOn\n\tOff\n)\n");
    }

    #[test]
    fn all_types_in_declaration_order() {
        let mut out = String::new();
        assert_eq!(emit(&mut out, &table(), None), Ok(3));
        let heads: Vec<_> = out.lines().filter(|l| l.starts_with("enum")).collect();
        assert_eq!(heads, ["enum _Bool=(", "enum Color=(", "enum -i M=("]);
    }

    #[test]
    fn unknown_type_writes_nothing() {
        let mut out = String::new();
        assert_eq!(emit(&mut out, &table(), Some("Nope")), Ok(0));
        assert!(out.is_empty());
    }

    #[test]
    fn awkward_values_are_quoted() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("two words"), "'two words'");
        assert_eq!(quote("it's"), r"'it'\''s'");
        assert_eq!(quote(""), "''");
        assert_eq!(quote("[k]=v"), "'[k]=v'");
    }

    #[test]
    fn json_form() {
        let json = emit_json(&table(), Some("M")).unwrap();
        assert_eq!(json, serde_json::json!([{"name": "M", "values": ["On", "Off"], "ignorecase": true}]));
        assert!(emit_json(&table(), Some("Nope")).is_none());
        assert_eq!(emit_json(&table(), None).unwrap().as_array().map(Vec::len), Some(3));
    }
}
