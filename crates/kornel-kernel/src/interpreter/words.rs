//! Splitting input into statements and words.
//!
//! Tokens come from a logos lexer; words are runs of adjacent tokens.
//! This is not a shell grammar: statements end at `;` or newline, words
//! split on blanks, and quoting, escapes, `$` expansions, comments and
//! `NAME=( ... )` array literals are recognised. Nothing else is special.

use logos::{Lexer, Logos, Span};
use thiserror::Error;

use super::path::is_identifier;

/// Errors from splitting input.
#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
pub enum LexError {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,

    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("unterminated array literal, missing ')'")]
    UnterminatedParen,

    #[error("unterminated {0}")]
    UnterminatedBrace(&'static str),
}

/// A piece of a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordPart {
    /// Text with quotes and escapes already removed.
    Literal(String),
    /// `$NAME`, `${...}` or `$?`; holds the reference text.
    Param(String),
    /// `$(( ... ))`; holds the expression.
    Arith(String),
    /// `( ... )` after `NAME=`.
    Array(Vec<Word>),
}

/// One blank-separated word.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Word {
    pub parts: Vec<WordPart>,
}

impl Word {
    /// `NAME` of a word starting with `NAME=`.
    pub fn assignment_name(&self) -> Option<&str> {
        let Some(WordPart::Literal(first)) = self.parts.first() else {
            return None;
        };
        let (name, _) = first.split_once('=')?;
        let name = name.strip_suffix(']').map_or(name, |n| n.split('[').next().unwrap_or(n));
        is_identifier(name).then_some(name)
    }

    /// Items of a `NAME=( ... )` word.
    pub fn array_items(&self) -> Option<&[Word]> {
        match self.parts.as_slice() {
            [WordPart::Literal(_), WordPart::Array(items)] => Some(items),
            _ => None,
        }
    }
}

/// A statement: a non-empty list of words.
pub type Statement = Vec<Word>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r]+")]
enum Token {
    /// Unquoted text; `#` only starts a comment at the beginning of a word.
    #[regex(r#"[^ \t\r\n;()'"\\$#][^ \t\r\n;()'"\\$]*"#, |lex| lex.slice().to_string())]
    Text(String),

    #[regex(r"'[^']*'", |lex| { let s = lex.slice(); s[1..s.len() - 1].to_string() })]
    SingleQuoted(String),

    #[token("\"", lex_double_quoted)]
    DoubleQuoted(Vec<WordPart>),

    #[regex(r"\\.", |lex| lex.slice()[1..].chars().next())]
    Escaped(char),

    /// A trailing backslash with nothing after it.
    #[token("\\")]
    Backslash,

    #[regex(r"\\\r?\n")]
    LineContinuation,

    #[token("${", braced_param)]
    Braced(String),

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Name(String),

    #[token("$?")]
    Status,

    #[token("$((", arith_expr)]
    Arith(String),

    /// `$` not starting an expansion.
    #[token("$")]
    Dollar,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(";")]
    Semi,

    #[token("\n")]
    Newline,

    #[regex(r"#[^\n]*", allow_greedy = true)]
    Comment,
}

/// The inside of a double-quoted string.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
enum Quoted {
    #[regex(r"[^\\$]+", |lex| lex.slice().to_string())]
    Text(String),

    #[regex(r"\\.", |lex| lex.slice()[1..].chars().next())]
    Escaped(char),

    #[regex(r"\\\r?\n")]
    LineContinuation,

    #[token("${", braced_param)]
    Braced(String),

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Name(String),

    #[token("$?")]
    Status,

    #[token("$((", arith_expr)]
    Arith(String),

    #[token("$")]
    Dollar,
}

/// After `${`: the reference text up to the matching `}`.
fn braced_param<'s, T>(lex: &mut Lexer<'s, T>) -> Result<String, LexError>
where
    T: Logos<'s, Source = str>,
{
    let rest = lex.remainder();
    let mut depth = 0usize;
    for (at, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => {
                lex.bump(at + 1);
                return Ok(rest[..at].to_string());
            }
            '}' => depth -= 1,
            _ => {}
        }
    }
    Err(LexError::UnterminatedBrace("${"))
}

/// After `$((`: the expression up to the matching `))`.
fn arith_expr<'s, T>(lex: &mut Lexer<'s, T>) -> Result<String, LexError>
where
    T: Logos<'s, Source = str>,
{
    let rest = lex.remainder();
    let mut depth = 0usize;
    for (at, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => {
                if !rest[at + 1..].starts_with(')') {
                    break;
                }
                lex.bump(at + 2);
                return Ok(rest[..at].to_string());
            }
            ')' => depth -= 1,
            _ => {}
        }
    }
    Err(LexError::UnterminatedBrace("$(("))
}

/// After `"`: the parts of the quoted text, expansions included.
fn lex_double_quoted(lex: &mut Lexer<Token>) -> Result<Vec<WordPart>, LexError> {
    let rest = lex.remainder();
    let mut escaped = false;
    let mut close = None;
    for (at, c) in rest.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                close = Some(at);
                break;
            }
            _ => {}
        }
    }
    let close = close.ok_or(LexError::UnterminatedQuote('"'))?;
    lex.bump(close + 1);

    let mut parts = Vec::new();
    let mut lit = String::new();
    for token in Quoted::lexer(&rest[..close]) {
        match token? {
            Quoted::Text(text) => lit.push_str(&text),
            Quoted::Escaped(c @ ('$' | '"' | '\\' | '`')) => lit.push(c),
            Quoted::Escaped(c) => {
                lit.push('\\');
                lit.push(c);
            }
            Quoted::LineContinuation => {}
            Quoted::Dollar => lit.push('$'),
            Quoted::Braced(text) | Quoted::Name(text) => push_part(&mut parts, &mut lit, WordPart::Param(text)),
            Quoted::Status => push_part(&mut parts, &mut lit, WordPart::Param("?".to_string())),
            Quoted::Arith(expr) => push_part(&mut parts, &mut lit, WordPart::Arith(expr)),
        }
    }
    if !lit.is_empty() {
        parts.push(WordPart::Literal(lit));
    }
    Ok(parts)
}

fn push_part(parts: &mut Vec<WordPart>, lit: &mut String, part: WordPart) {
    if !lit.is_empty() {
        parts.push(WordPart::Literal(std::mem::take(lit)));
    }
    parts.push(part);
}

/// Split a script into statements.
pub fn split_script(input: &str) -> Result<Vec<Statement>, LexError> {
    let mut assembler = Assembler::default();
    for (token, span) in Token::lexer(input).spanned() {
        let token = token.map_err(|e| match input[span.clone()].chars().next() {
            Some('\'') => LexError::UnterminatedQuote('\''),
            _ => e,
        })?;
        assembler.push(token, span);
    }
    assembler.finish()
}

/// Collects adjacent tokens into words and words into statements.
#[derive(Default)]
struct Assembler {
    statements: Vec<Statement>,
    words: Vec<Word>,
    parts: Vec<WordPart>,
    lit: String,
    quoted: bool,
    /// End of the last token that can continue a word.
    last_end: Option<usize>,
    /// `NAME=` and the items so far, inside `NAME=( ... )`.
    array: Option<(String, Vec<Word>)>,
}

impl Assembler {
    fn push(&mut self, token: Token, span: Span) {
        let adjacent = self.last_end == Some(span.start);
        if !adjacent {
            self.end_word();
        }
        self.last_end = Some(span.end);
        match token {
            Token::Text(text) => self.lit.push_str(&text),
            Token::SingleQuoted(text) => {
                self.lit.push_str(&text);
                self.quoted = true;
            }
            Token::DoubleQuoted(parts) => {
                self.quoted = true;
                for part in parts {
                    match part {
                        WordPart::Literal(text) => self.lit.push_str(&text),
                        part => self.part(part),
                    }
                }
            }
            Token::Escaped(c) => self.lit.push(c),
            Token::Backslash => self.lit.push('\\'),
            Token::LineContinuation => {
                // joins the word around it only when glued to it
                if !adjacent {
                    self.last_end = None;
                }
            }
            Token::Braced(text) | Token::Name(text) => self.part(WordPart::Param(text)),
            Token::Status => self.part(WordPart::Param("?".to_string())),
            Token::Arith(expr) => self.part(WordPart::Arith(expr)),
            Token::Dollar => self.lit.push('$'),
            Token::LParen if self.array.is_none() && self.opens_array() => {
                let prefix = std::mem::take(&mut self.lit);
                self.array = Some((prefix, Vec::new()));
                self.last_end = None;
            }
            Token::RParen if self.array.is_some() => {
                self.end_word();
                if let Some((prefix, items)) = self.array.take() {
                    self.parts.push(WordPart::Literal(prefix));
                    self.parts.push(WordPart::Array(items));
                }
            }
            Token::LParen => self.lit.push('('),
            Token::RParen => self.lit.push(')'),
            Token::Semi | Token::Newline => {
                self.end_word();
                self.last_end = None;
                if self.array.is_none() {
                    self.end_statement();
                }
            }
            Token::Comment => self.last_end = None,
        }
    }

    /// True when the word so far is a bare `NAME=`.
    fn opens_array(&self) -> bool {
        self.parts.is_empty() && !self.quoted && self.lit.strip_suffix('=').is_some_and(is_identifier)
    }

    fn part(&mut self, part: WordPart) {
        push_part(&mut self.parts, &mut self.lit, part);
    }

    fn end_word(&mut self) {
        if !self.lit.is_empty() || (self.parts.is_empty() && self.quoted) {
            self.parts.push(WordPart::Literal(std::mem::take(&mut self.lit)));
        }
        self.quoted = false;
        if self.parts.is_empty() {
            return;
        }
        let word = Word {
            parts: std::mem::take(&mut self.parts),
        };
        match &mut self.array {
            Some((_, items)) => items.push(word),
            None => self.words.push(word),
        }
    }

    fn end_statement(&mut self) {
        if !self.words.is_empty() {
            self.statements.push(std::mem::take(&mut self.words));
        }
    }

    fn finish(mut self) -> Result<Vec<Statement>, LexError> {
        self.end_word();
        if self.array.is_some() {
            return Err(LexError::UnterminatedParen);
        }
        self.end_statement();
        Ok(self.statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Word {
        Word {
            parts: vec![WordPart::Literal(s.into())],
        }
    }

    #[test]
    fn statements_and_words() {
        let stmts = split_script("echo a  b; echo c\n\necho 'd e'").unwrap();
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0], vec![lit("echo"), lit("a"), lit("b")]);
        assert_eq!(stmts[2], vec![lit("echo"), lit("d e")]);
    }

    #[test]
    fn comments_and_escapes() {
        let stmts = split_script("echo a\\ b # trailing\n# whole line\necho \"x\\$y\"").unwrap();
        assert_eq!(stmts, vec![vec![lit("echo"), lit("a b")], vec![lit("echo"), lit("x$y")]]);
    }

    #[test]
    fn expansions() {
        let stmts = split_script("echo $c ${c.blue} $((c + 1)) $? pre$x\"post\"").unwrap();
        let words = &stmts[0];
        assert_eq!(words[1].parts, vec![WordPart::Param("c".into())]);
        assert_eq!(words[2].parts, vec![WordPart::Param("c.blue".into())]);
        assert_eq!(words[3].parts, vec![WordPart::Arith("c + 1".into())]);
        assert_eq!(words[4].parts, vec![WordPart::Param("?".into())]);
        assert_eq!(
            words[5].parts,
            vec![
                WordPart::Literal("pre".into()),
                WordPart::Param("x".into()),
                WordPart::Literal("post".into())
            ]
        );
    }

    #[test]
    fn nested_arith_parens() {
        let stmts = split_script("echo $(( (1 + 2) * 3 ))").unwrap();
        assert_eq!(stmts[0][1].parts, vec![WordPart::Arith(" (1 + 2) * 3 ".into())]);
    }

    #[test]
    fn array_literal_spans_lines() {
        let stmts = split_script("enum -i Color=(\n\tred\n\tgreen\n)\necho done").unwrap();
        assert_eq!(stmts.len(), 2);
        let word = &stmts[0][2];
        assert_eq!(word.assignment_name(), Some("Color"));
        assert_eq!(word.array_items(), Some(&[lit("red"), lit("green")][..]));
    }

    #[test]
    fn keyed_array_items() {
        let stmts = split_script("m=([a]=x [b]='y z')").unwrap();
        assert_eq!(stmts[0][0].array_items(), Some(&[lit("[a]=x"), lit("[b]=y z")][..]));
    }

    #[test]
    fn assignment_names() {
        let stmts = split_script("x=1 y[2]=3 =4 1a=5 'q'").unwrap();
        let names: Vec<_> = stmts[0].iter().map(Word::assignment_name).collect();
        assert_eq!(names, vec![Some("x"), Some("y"), None, None, None]);
    }

    #[test]
    fn empty_quotes_make_a_word() {
        let stmts = split_script("echo ''").unwrap();
        assert_eq!(stmts[0][1], lit(""));
    }

    #[test]
    fn unterminated() {
        assert_eq!(split_script("echo 'x"), Err(LexError::UnterminatedQuote('\'')));
        assert_eq!(split_script("echo \"x"), Err(LexError::UnterminatedQuote('"')));
        assert_eq!(split_script("a=(x y"), Err(LexError::UnterminatedParen));
        assert_eq!(split_script("echo ${x"), Err(LexError::UnterminatedBrace("${")));
    }

    #[test]
    fn line_continuation() {
        let stmts = split_script("echo ab\\\ncd \\\n  ef\necho g").unwrap();
        assert_eq!(stmts, vec![vec![lit("echo"), lit("abcd"), lit("ef")], vec![lit("echo"), lit("g")]]);
    }

    #[test]
    fn parens_outside_assignments_are_text() {
        let stmts = split_script("echo (a) x=b(c) 'y'=(z)").unwrap();
        assert_eq!(stmts[0], vec![lit("echo"), lit("(a)"), lit("x=b(c)"), lit("y=(z)")]);
    }

    #[test]
    fn lone_dollar_and_inner_hash() {
        let stmts = split_script("echo $ a$ b#c \"$\"").unwrap();
        assert_eq!(stmts[0], vec![lit("echo"), lit("$"), lit("a$"), lit("b#c"), lit("$")]);
    }

    #[test]
    fn arith_needs_double_close() {
        assert_eq!(split_script("echo $((1 + 2)"), Err(LexError::UnterminatedBrace("$((")));
    }
}
