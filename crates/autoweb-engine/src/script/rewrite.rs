//! Top-level declaration promotion.
//!
//! `const|let|var NAME = ...` at the outermost level of a fragment becomes
//! `NAME = ...`, so the value lands in a binding owned by the wrapper and
//! survives into later steps. Nested scopes, strings, template literals,
//! regex literals and comments are left alone. Destructuring patterns are
//! not promoted.
//!
//! A `/` starts a regex literal when the previous token cannot end an
//! expression (an operator, an opening bracket or a keyword such as
//! `return`); otherwise it is division.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutput {
    pub code: String,
    /// Promoted names in first-seen order, without duplicates.
    pub promoted: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Quoted(char),
    Template,
    Regex { in_class: bool },
}

const KEYWORDS: [&str; 3] = ["const", "let", "var"];

/// Keywords after which an expression, and so a regex literal, may start.
const EXPRESSION_KEYWORDS: [&str; 9] = [
    "return", "typeof", "case", "do", "else", "in", "of", "void", "yield",
];

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Try to read `keyword <ws> NAME <ws> =` at `i`. Returns the name and the
/// index just past it.
fn declaration_at(chars: &[char], i: usize) -> Option<(String, usize)> {
    if i > 0 && (is_ident_char(chars[i - 1]) || chars[i - 1] == '.') {
        return None;
    }
    let keyword = KEYWORDS.iter().find(|kw| {
        let len = kw.len();
        i + len <= chars.len() && chars[i..i + len].iter().copied().eq(kw.chars())
    })?;

    let mut j = i + keyword.len();
    let ws_start = j;
    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }
    if j == ws_start || j >= chars.len() || !is_ident_start(chars[j]) {
        return None;
    }
    let name_start = j;
    while j < chars.len() && is_ident_char(chars[j]) {
        j += 1;
    }
    let name_end = j;

    while j < chars.len() && chars[j].is_whitespace() && chars[j] != '\n' {
        j += 1;
    }
    if chars.get(j) != Some(&'=') || matches!(chars.get(j + 1), Some('=') | Some('>')) {
        return None;
    }
    Some((chars[name_start..name_end].iter().collect(), name_end))
}

/// Whether a `/` at `i` opens a regex literal rather than dividing.
fn regex_allowed(chars: &[char], i: usize) -> bool {
    let Some(prev) = chars[..i].iter().rposition(|c| !c.is_whitespace()) else {
        return true;
    };
    let c = chars[prev];
    if is_ident_char(c) {
        let start = chars[..=prev]
            .iter()
            .rposition(|c| !is_ident_char(*c))
            .map_or(0, |p| p + 1);
        let word: String = chars[start..=prev].iter().collect();
        return EXPRESSION_KEYWORDS.contains(&word.as_str());
    }
    "(,=:[!&|?{};+-*%<>~^".contains(c)
}

/// Promote top-level declarations whose name passes `bindable`.
pub fn promote_declarations(source: &str, bindable: impl Fn(&str) -> bool) -> RewriteOutput {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut promoted: Vec<String> = Vec::new();

    let mut state = State::Code;
    let mut depth: i64 = 0;
    // depth at which each open `${` started
    let mut templates: Vec<i64> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match state {
            State::Code => {
                if depth == 0 && is_ident_start(c) {
                    if let Some((name, end)) = declaration_at(&chars, i) {
                        if bindable(&name) {
                            out.push_str(&name);
                            if !promoted.contains(&name) {
                                promoted.push(name);
                            }
                            i = end;
                            continue;
                        }
                    }
                }
                match c {
                    '/' if next == Some('/') => state = State::LineComment,
                    '/' if next == Some('*') => {
                        out.push_str("/*");
                        state = State::BlockComment;
                        i += 2;
                        continue;
                    }
                    '/' if regex_allowed(&chars, i) => state = State::Regex { in_class: false },
                    '\'' | '"' => state = State::Quoted(c),
                    '`' => state = State::Template,
                    '{' | '(' | '[' => depth += 1,
                    '}' if templates.last() == Some(&depth) => {
                        templates.pop();
                        state = State::Template;
                    }
                    '}' | ')' | ']' => depth -= 1,
                    _ => {}
                }
                // skip the rest of an identifier so keywords are only
                // matched at word starts
                if is_ident_char(c) {
                    let mut j = i;
                    while j < chars.len() && is_ident_char(chars[j]) {
                        out.push(chars[j]);
                        j += 1;
                    }
                    i = j;
                    continue;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && next == Some('/') {
                    out.push_str("*/");
                    state = State::Code;
                    i += 2;
                    continue;
                }
            }
            State::Quoted(quote) => {
                if c == '\\' {
                    out.push(c);
                    if let Some(n) = next {
                        out.push(n);
                    }
                    i += 2;
                    continue;
                }
                if c == quote || c == '\n' {
                    state = State::Code;
                }
            }
            State::Regex { in_class } => match c {
                '\\' => {
                    out.push(c);
                    if let Some(n) = next {
                        out.push(n);
                    }
                    i += 2;
                    continue;
                }
                '[' => state = State::Regex { in_class: true },
                ']' => state = State::Regex { in_class: false },
                '/' if !in_class => state = State::Code,
                // unterminated; give up on the literal
                '\n' => state = State::Code,
                _ => {}
            },
            State::Template => {
                if c == '\\' {
                    out.push(c);
                    if let Some(n) = next {
                        out.push(n);
                    }
                    i += 2;
                    continue;
                }
                if c == '`' {
                    state = State::Code;
                } else if c == '$' && next == Some('{') {
                    out.push_str("${");
                    templates.push(depth);
                    state = State::Code;
                    i += 2;
                    continue;
                }
            }
        }

        out.push(c);
        i += 1;
    }

    RewriteOutput { code: out, promoted }
}
