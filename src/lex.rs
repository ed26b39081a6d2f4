// SPDX: CC0-1.0

use crate::eval::OperatorTyp;
use core::{fmt, iter::Peekable, str::CharIndices};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubStr {
    // shared with every token and node cut from the same expression
    src: Arc<String>,
    start: usize,
    len: usize,
}

impl SubStr {
    #[inline]
    pub const fn new(src: Arc<String>, start: usize, len: usize) -> Self {
        Self { src, start, len }
    }

    #[inline]
    pub fn all(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, 0, len)
    }

    /// Span just past the last character, for errors found at end of input.
    #[inline]
    pub fn end(src: Arc<String>) -> Self {
        let len = src.len();
        Self::new(src, len, 1)
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(&self.src)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self) -> &str {
        let end = (self.start + self.len).min(self.src.len());
        self.src.get(self.start.min(end)..end).unwrap_or("")
    }

    /// Span covering both `self` and `other`, which must share a source.
    pub fn join(&self, other: &Self) -> Self {
        let start = self.start.min(other.start);
        let end = (self.start + self.len).max(other.start + other.len);
        Self::new(Arc::clone(&self.src), start, end - start)
    }
}

impl fmt::Display for SubStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokTyp {
    Ident,
    Number,
    Op(OperatorTyp),
    Comma,
    OpenParen,
    CloseParen,
}

impl TokTyp {
    fn symbol(chr: char) -> Option<Self> {
        Some(match chr {
            '+' => Self::Op(OperatorTyp::Add),
            // negation vs subtraction is the parser's call
            '-' => Self::Op(OperatorTyp::Sub),
            '*' => Self::Op(OperatorTyp::Mul),
            '/' => Self::Op(OperatorTyp::Div),
            '^' => Self::Op(OperatorTyp::Pow),
            ',' => Self::Comma,
            '(' => Self::OpenParen,
            ')' => Self::CloseParen,
            _ => return None,
        })
    }
}

/// Characters with a familiar mathematical meaning that expressions don't accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unsupported {
    Comparison,
    Equals,
    Pipe,
    Bracket,
}

impl Unsupported {
    fn from_char(chr: char) -> Option<Self> {
        match chr {
            '<' | '>' => Some(Self::Comparison),
            '=' => Some(Self::Equals),
            '|' => Some(Self::Pipe),
            '[' | ']' | '{' | '}' => Some(Self::Bracket),
            _ => None,
        }
    }

    pub const fn hint(&self) -> &'static str {
        match self {
            Self::Comparison => "expected an expression but found an inequality",
            Self::Equals => "the curve is f(x, y) = 0, so only enter the left hand side",
            Self::Pipe => "use the 'abs' function to compute absolute value",
            Self::Bracket => "use '(' and ')' for grouping",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tok {
    pub typ: TokTyp,
    pub loc: SubStr,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LexErrTyp {
    InvalidChar,
    Unsupported(Unsupported),
}

impl fmt::Display for LexErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChar => write!(f, "invalid character"),
            Self::Unsupported(_) => write!(f, "unsupported character"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LexErr {
    pub typ: LexErrTyp,
    pub loc: SubStr,
}

/// Yields tokens until the input runs out or the first error, which is the last item.
#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src Arc<String>,
    chars: Peekable<CharIndices<'src>>,
    done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src Arc<String>) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            done: false,
        }
    }

    pub fn src(&self) -> Arc<String> {
        Arc::clone(self.src)
    }

    fn span(&self, start: usize, end: usize) -> SubStr {
        SubStr::new(Arc::clone(self.src), start, end - start)
    }

    /// Consume characters while `accept` holds; returns the byte offset it stopped at.
    fn skip_while(&mut self, accept: impl Fn(char) -> bool) -> usize {
        while let Some(&(_, chr)) = self.chars.peek() {
            if !accept(chr) {
                break;
            }
            self.chars.next();
        }
        self.chars.peek().map_or(self.src.len(), |&(idx, _)| idx)
    }

    /// Consume an exponent suffix such as `e-3` starting at byte `at`, if one is there.
    /// A bare `e` is left alone, since it may be the constant.
    fn exponent(&mut self, at: usize) -> usize {
        let rest = self.src.as_bytes().get(at..).unwrap_or_default();
        let marker = match rest {
            [b'e' | b'E', b'+' | b'-', digit, ..] if digit.is_ascii_digit() => 2,
            [b'e' | b'E', digit, ..] if digit.is_ascii_digit() => 1,
            _ => return at,
        };
        for _ in 0..marker {
            self.chars.next();
        }
        self.skip_while(|c| c.is_ascii_digit())
    }
}

fn is_number_char(chr: char) -> bool {
    chr.is_ascii_digit() || chr == '.'
}

impl Iterator for Lexer<'_> {
    type Item = Result<Tok, LexErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.skip_while(char::is_whitespace);
        let (start, chr) = self.chars.next()?;

        let typ = if let Some(typ) = TokTyp::symbol(chr) {
            Ok(typ)
        } else if chr.is_ascii_alphabetic() {
            Ok(TokTyp::Ident)
        } else if is_number_char(chr) {
            Ok(TokTyp::Number)
        } else if let Some(what) = Unsupported::from_char(chr) {
            Err(LexErrTyp::Unsupported(what))
        } else {
            Err(LexErrTyp::InvalidChar)
        };

        let end = match typ {
            Ok(TokTyp::Ident) => self.skip_while(|c| c.is_ascii_alphabetic()),
            Ok(TokTyp::Number) => {
                let end = self.skip_while(is_number_char);
                self.exponent(end)
            }
            _ => start + chr.len_utf8(),
        };
        let loc = self.span(start, end);

        Some(match typ {
            Ok(typ) => Ok(Tok { typ, loc }),
            Err(typ) => {
                self.done = true;
                Err(LexErr { typ, loc })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Result<Tok, LexErr>> {
        let src = Arc::new(src.to_string());
        Lexer::new(&src).collect()
    }

    fn typs(src: &str) -> Vec<TokTyp> {
        lex(src)
            .into_iter()
            .map(|tok| tok.expect("lex error").typ)
            .collect()
    }

    #[test]
    fn idents_are_whole_words() {
        let src = Arc::new(String::from("atan(x)"));
        let toks: Vec<Tok> = Lexer::new(&src).map(Result::unwrap).collect();
        assert_eq!(toks[0].typ, TokTyp::Ident);
        assert_eq!(toks[0].loc.get(), "atan");
        assert_eq!(toks.len(), 4);
    }

    #[test]
    fn minus_is_always_one_token() {
        assert_eq!(
            typs("y*y -4"),
            [
                TokTyp::Ident,
                TokTyp::Op(OperatorTyp::Mul),
                TokTyp::Ident,
                TokTyp::Op(OperatorTyp::Sub),
                TokTyp::Number,
            ]
        );
    }

    #[test]
    fn numbers_keep_their_dots() {
        let src = Arc::new(String::from("  12.5 "));
        let tok = Lexer::new(&src).next().unwrap().unwrap();
        assert_eq!(tok.typ, TokTyp::Number);
        assert_eq!(tok.loc.get(), "12.5");
        assert_eq!(tok.loc.start(), 2);
    }

    #[test]
    fn unsupported_stops_lexing() {
        let toks = lex("abs|x|");
        assert_eq!(toks.len(), 2);
        let err = toks[1].clone().unwrap_err();
        assert_eq!(err.typ, LexErrTyp::Unsupported(Unsupported::Pipe));
        assert_eq!(err.loc.start(), 3);
    }

    #[test]
    fn invalid_char_reported_with_location() {
        let toks = lex("x $ y");
        let err = toks.last().unwrap().clone().unwrap_err();
        assert_eq!(err.typ, LexErrTyp::InvalidChar);
        assert_eq!(err.loc.get(), "$");
    }

    #[test]
    fn numbers_take_exponents() {
        let src = Arc::new(String::from("1e-3*x + 2.5E+2 - 4e2"));
        let nums: Vec<String> = Lexer::new(&src)
            .map(Result::unwrap)
            .filter(|tok| tok.typ == TokTyp::Number)
            .map(|tok| tok.loc.get().to_string())
            .collect();
        assert_eq!(nums, ["1e-3", "2.5E+2", "4e2"]);
    }

    #[test]
    fn bare_e_after_number_stays_ident() {
        assert_eq!(typs("2e"), [TokTyp::Number, TokTyp::Ident]);
        assert_eq!(
            typs("3e-x"),
            [
                TokTyp::Number,
                TokTyp::Ident,
                TokTyp::Op(OperatorTyp::Sub),
                TokTyp::Ident,
            ]
        );
    }

    #[test]
    fn brackets_get_one_hint() {
        let toks = lex("{x}");
        assert_eq!(toks.len(), 1);
        let err = toks[0].clone().unwrap_err();
        assert_eq!(err.typ, LexErrTyp::Unsupported(Unsupported::Bracket));
        assert!(Unsupported::Bracket.hint().contains("grouping"));
    }

    #[test]
    fn non_ascii_spans_whole_char() {
        let err = lex("x·y").pop().unwrap().unwrap_err();
        assert_eq!(err.loc.start(), 1);
        assert_eq!(err.loc.get(), "·");
    }
}
