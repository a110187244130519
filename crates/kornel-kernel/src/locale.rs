//! Character-set locale for byte/character handling.
//!
//! Only the codeset matters here: either input is treated as UTF-8 and
//! multibyte sequences are decoded, or every byte is one character.

/// Locale codeset, as far as `cut` cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// Multibyte UTF-8 input.
    #[default]
    Utf8,
    /// Single-byte "C"/POSIX semantics.
    C,
}

impl Locale {
    /// Read the locale from `LC_ALL`, `LC_CTYPE` and `LANG`, first non-empty wins.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        for key in ["LC_ALL", "LC_CTYPE", "LANG"] {
            if let Some(value) = lookup(key)
                && !value.is_empty()
            {
                return Self::from_name(&value);
            }
        }
        Self::Utf8
    }

    /// Classify a locale name like `en_US.UTF-8`, `C.utf8` or `POSIX`.
    pub fn from_name(name: &str) -> Self {
        let Some((_, codeset)) = name.split_once('.') else {
            return Self::C;
        };
        let codeset = codeset.split('@').next().unwrap_or(codeset);
        let normalized: String = codeset
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if normalized == "utf8" { Self::Utf8 } else { Self::C }
    }

    /// True when characters may span more than one byte.
    pub fn is_multibyte(self) -> bool {
        matches!(self, Self::Utf8)
    }
}
