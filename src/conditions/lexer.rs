//! lexer - turns an edit condition string into a token stream
//!
//! recognises:
//! - operator and grouping symbols, longest match first
//! - numeric literals (integer, floating, optional exponent, optional sign)
//! - `true` / `false` (case-insensitive) and `nullptr` (case-sensitive)
//! - property names, unquoted or quoted with `"` / `'`
//! - enum references written as `Type::Member`

use super::error::LexError;
use super::types::{LexedToken, Operator, Token};

/// characters that end an unquoted property name
const NAME_BREAKING_CHARS: [char; 12] = ['|', '=', '&', '>', '<', '!', '+', '-', '*', '/', '(', ')'];

/// lex a source string into tokens, skipping whitespace
pub fn lex(source: &str) -> Result<Vec<LexedToken>, LexError> {
    let mut lexer = Lexer {
        source,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

fn is_name_break(c: char) -> bool {
    c.is_whitespace() || NAME_BREAKING_CHARS.contains(&c)
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<LexedToken>,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn push(&mut self, token: Token, position: usize) {
        self.tokens.push(LexedToken::new(token, position));
    }

    /// an operand is expected at the start, after an operator, or after `(`
    fn expects_operand(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(t) => matches!(t.token, Token::Operator(op) if op != Operator::GroupEnd),
        }
    }

    fn run(&mut self) -> Result<(), LexError> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
                continue;
            }

            let start = self.pos;

            if (c == '-' || c == '+') && self.expects_operand() {
                if let Some((value, len)) = scan_number(self.rest(), true) {
                    self.pos += len;
                    self.push(Token::Number(value), start);
                    continue;
                }
            }

            if let Some((symbol, op)) = Operator::SYMBOLS
                .iter()
                .find(|(symbol, _)| self.rest().starts_with(symbol))
            {
                self.pos += symbol.len();
                self.push(Token::Operator(*op), start);
                continue;
            }

            if let Some((value, len)) = scan_number(self.rest(), false) {
                self.pos += len;
                self.push(Token::Number(value), start);
                continue;
            }

            if let Some((token, len)) = scan_keyword(self.rest()) {
                self.pos += len;
                self.push(token, start);
                continue;
            }

            let token = self.scan_name(c, start)?;
            self.push(token, start);
        }

        Ok(())
    }

    fn scan_name(&mut self, first: char, start: usize) -> Result<Token, LexError> {
        let name = if first == '"' || first == '\'' {
            self.scan_quoted(first, start)?
        } else {
            let len = self
                .rest()
                .find(is_name_break)
                .unwrap_or_else(|| self.rest().len());
            if len == 0 {
                return Err(LexError::UnexpectedCharacter {
                    ch: first,
                    position: start,
                });
            }
            let name = self.rest()[..len].to_string();
            self.pos += len;
            name
        };

        if name.contains(':') {
            return split_enum(name, start);
        }

        Ok(Token::Property(name))
    }

    /// scan a quoted name; a quote preceded by an odd run of backslashes is escaped
    fn scan_quoted(&mut self, quote: char, start: usize) -> Result<String, LexError> {
        let body = &self.rest()[quote.len_utf8()..];
        let mut raw = String::new();
        let mut slashes = 0usize;

        for (offset, c) in body.char_indices() {
            if c == quote && slashes % 2 == 0 {
                self.pos += quote.len_utf8() + offset + c.len_utf8();
                return Ok(unescape(&raw));
            }

            raw.push(c);
            if c == '\\' {
                slashes += 1;
            } else {
                slashes = 0;
            }
        }

        Err(LexError::UnterminatedQuote { position: start })
    }
}

/// scan a numeric literal at the start of `input`, returning (value, byte length)
fn scan_number(input: &str, signed: bool) -> Option<(f64, usize)> {
    let bytes = input.as_bytes();
    let mut i = 0;

    if signed {
        match bytes.first() {
            Some(b'-') | Some(b'+') => i += 1,
            _ => return None,
        }
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }

    if digits == 0 {
        return None;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'-' || bytes[j] == b'+') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }

    input[..i].parse::<f64>().ok().map(|value| (value, i))
}

/// match `true`, `false` or `nullptr` followed by a name boundary
fn scan_keyword(input: &str) -> Option<(Token, usize)> {
    let at_boundary = |len: usize| input[len..].chars().next().map_or(true, is_name_break);

    for (word, value) in [("true", true), ("false", false)] {
        let len = word.len();
        if input.len() >= len
            && input.is_char_boundary(len)
            && input[..len].eq_ignore_ascii_case(word)
            && at_boundary(len)
        {
            return Some((Token::Bool(value), len));
        }
    }

    let len = "nullptr".len();
    if input.starts_with("nullptr") && at_boundary(len) {
        return Some((Token::Null, len));
    }

    None
}

/// split `Type::Member` into an enum token
fn split_enum(name: String, position: usize) -> Result<Token, LexError> {
    let Some(index) = name.find("::") else {
        return Err(LexError::SingleColon { name, position });
    };

    if index == 0 {
        return Err(LexError::DoubleColonAtStart { name, position });
    }

    let type_name = &name[..index];
    let value = &name[index + 2..];

    if value.is_empty() {
        return Err(LexError::DoubleColonAtEnd { name, position });
    }

    if value.contains("::") {
        return Err(LexError::MultipleDoubleColons { name, position });
    }

    if type_name.contains(':') || value.contains(':') {
        return Err(LexError::SingleColon { name, position });
    }

    Ok(Token::Enum {
        type_name: type_name.to_string(),
        value: value.to_string(),
    })
}

/// resolve backslash escapes inside a quoted name
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
