//! Variable references: `NAME`, `NAME.SYMBOL`, `NAME[SUB]`, `?`.

/// One step of a variable path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarSegment {
    /// Root name or a dotted child.
    Field(String),
    /// Array subscript.
    Index(String),
}

/// A parsed variable reference. The first segment is always a `Field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarPath {
    pub segments: Vec<VarSegment>,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// True for a valid variable name.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_') && chars.all(is_name_char)
}

impl VarPath {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            segments: vec![VarSegment::Field(name.into())],
        }
    }

    /// Parse the text inside `${...}`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let root_len = if text.starts_with('?') {
            1
        } else {
            text.find(|c: char| !is_name_char(c)).unwrap_or(text.len())
        };
        let root = &text[..root_len];
        if root != "?" && !is_identifier(root) {
            return None;
        }
        let mut segments = vec![VarSegment::Field(root.to_string())];
        let mut rest = &text[root_len..];
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('.') {
                let len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
                if len == 0 {
                    return None;
                }
                segments.push(VarSegment::Field(after[..len].to_string()));
                rest = &after[len..];
            } else if let Some(after) = rest.strip_prefix('[') {
                let close = after.find(']')?;
                segments.push(VarSegment::Index(after[..close].to_string()));
                rest = &after[close + 1..];
            } else {
                return None;
            }
        }
        Some(Self { segments })
    }

    pub fn root(&self) -> &str {
        match self.segments.first() {
            Some(VarSegment::Field(name)) => name,
            _ => "",
        }
    }
}
