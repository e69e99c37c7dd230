//! Token lexer for GML.
//!
//! Lexing works one line at a time. A line is cut into brackets, quoted
//! strings, and bare words; whitespace only separates tokens. Every token
//! records where it sits in the line so edits can be spliced back into the
//! original text. The public entry point is [`tokenize`].

use winnow::{
    Parser as _,
    combinator::{alt, delimited, preceded, repeat, terminated},
    error::{ContextError, ModalResult},
    stream::{LocatingSlice, Location},
    token::{rest, take_till, take_while},
};

use crate::span::Span;

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError>;

/// What a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// `[`
    Open,
    /// `]`
    Close,
    /// `"text"`, without the quotes. GML has no escapes.
    Quoted(&'a str),
    /// A key, a number, or any other run of non-space characters.
    Word(&'a str),
    /// A `"` with no closing quote on the line; holds the rest of the line.
    Unterminated(&'a str),
}

/// A token and its byte range within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    kind: TokenKind<'a>,
    span: Span,
}

impl<'a> Token<'a> {
    pub fn kind(&self) -> TokenKind<'a> {
        self.kind
    }

    /// Byte range relative to the start of the line.
    pub fn span(&self) -> Span {
        self.span
    }

    /// The word, if this token is one that can name an attribute or block:
    /// a letter or underscore, then letters, digits, and underscores.
    pub fn key(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::Word(word) if is_key(word) => Some(word),
            _ => None,
        }
    }

    /// Whether this token can be the value of an attribute.
    pub fn is_value(&self) -> bool {
        matches!(self.kind, TokenKind::Quoted(_) | TokenKind::Word(_))
    }
}

fn is_key(word: &str) -> bool {
    word.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quoted<'a>(input: &mut Input<'a>) -> IResult<TokenKind<'a>> {
    delimited('"', take_till(0.., '"'), '"')
        .map(TokenKind::Quoted)
        .parse_next(input)
}

/// An opening quote that is never closed swallows the rest of the line.
fn unterminated<'a>(input: &mut Input<'a>) -> IResult<TokenKind<'a>> {
    preceded('"', rest)
        .take()
        .map(TokenKind::Unterminated)
        .parse_next(input)
}

fn word<'a>(input: &mut Input<'a>) -> IResult<TokenKind<'a>> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '"' | '[' | ']')
    })
    .map(TokenKind::Word)
    .parse_next(input)
}

fn space<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(0.., char::is_whitespace).parse_next(input)
}

fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();

    let kind = alt((
        '['.value(TokenKind::Open),
        ']'.value(TokenKind::Close),
        quoted, // Must come before unterminated
        unterminated,
        word,
    ))
    .parse_next(input)?;

    let end = input.current_token_start();
    Ok(Token {
        kind,
        span: Span::new(start..end),
    })
}

/// Cut one line of GML into tokens.
///
/// `text` must not contain the line terminator. Lexing never fails: every
/// non-space character starts some token, and an unclosed string becomes a
/// single [`TokenKind::Unterminated`] token running to the end of the line.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut input = LocatingSlice::new(text);

    terminated(repeat(0.., preceded(space, positioned_token)), space)
        .parse_next(&mut input)
        .unwrap_or_default()
}
