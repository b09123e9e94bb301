//! Tokens of canonical expression text.

use logos::Logos;

use super::ReadError;
use crate::diagnostics::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub(super) enum Token<'src> {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    /// Keywords are recognized by the parser; they are plain words here.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice())]
    Word(&'src str),

    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*", |lex| &lex.slice()[1..])]
    Param(&'src str),

    #[regex(r"[0-9]+", |lex| lex.slice())]
    Integer(&'src str),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice())]
    Decimal(&'src str),

    #[regex(r"'([^']|'')*'", |lex| lex.slice())]
    Str(&'src str),
}

impl Token<'_> {
    pub(super) fn describe(&self) -> String {
        match self {
            Token::Word(word) => format!("`{word}`"),
            Token::Param(name) => format!("`${name}`"),
            Token::Integer(text) | Token::Decimal(text) => format!("number `{text}`"),
            Token::Str(text) => format!("string {text}"),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::LtEq => "<=",
            Token::GtEq => ">=",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Word(_)
            | Token::Param(_)
            | Token::Integer(_)
            | Token::Decimal(_)
            | Token::Str(_) => "",
        }
    }
}

/// Tokenize all of `input`, failing at the first unrecognized character.
pub(super) fn tokenize(input: &str) -> Result<Vec<(Token<'_>, Span)>, ReadError> {
    let mut tokens = Vec::new();
    for (result, range) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => tokens.push((token, Span::from(range))),
            Err(()) => {
                return Err(ReadError::new(
                    Span::from(range.clone()),
                    format!("unexpected character {:?}", &input[range]),
                ));
            }
        }
    }
    Ok(tokens)
}
