use logos::Logos;

use super::{Cursor, ReadError};
use crate::ast::{BracketSet, ListOp, MatchDef, MatchList, MatchRepeat, MatchStep};
use crate::diagnostics::Span;
use crate::pattern::UNLIMITED;

type ReadResult<T> = Result<T, ReadError>;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum Token<'src> {
    #[token("(?:")]
    NonCapturing,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("^")]
    Caret,

    #[token("|")]
    Pipe,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("?")]
    Question,

    #[token("-")]
    Minus,

    #[regex(r"[0-9]+", |lex| lex.slice())]
    Number(&'src str),
}

/// Read match pattern text such as `1 : (2 | 3)* : [4 5]`.
///
/// Ids are not checked here; see [`crate::pattern::validate_pattern`].
pub fn read_pattern(input: &str) -> ReadResult<MatchDef> {
    let mut tokens = Vec::new();
    for (result, range) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => tokens.push((token, Span::from(range))),
            Err(()) => {
                return Err(ReadError::new(
                    Span::from(range.clone()),
                    format!("unexpected character {:?} in pattern", &input[range]),
                ));
            }
        }
    }

    let mut parser = PatternParser {
        cursor: Cursor::new(tokens, input.len()),
        input,
    };
    let pattern = parser.pattern()?;
    if !parser.cursor.at_end() {
        return Err(parser.unexpected("`|`, `:` or a quantifier"));
    }
    Ok(pattern)
}

struct PatternParser<'src> {
    cursor: Cursor<Token<'src>>,
    input: &'src str,
}

impl<'src> PatternParser<'src> {
    fn unexpected(&self, expected: &str) -> ReadError {
        let found = match self.cursor.peek() {
            None => "end of input".to_string(),
            Some(_) => format!("`{}`", &self.input[self.cursor.current_span().range()]),
        };
        ReadError::new(
            self.cursor.current_span(),
            format!("expected {expected}, found {found}"),
        )
    }

    fn expect(&mut self, token: Token<'src>, what: &str) -> ReadResult<()> {
        if self.cursor.eat(token) {
            return Ok(());
        }
        Err(self.unexpected(what))
    }

    fn pattern(&mut self) -> ReadResult<MatchDef> {
        self.cursor.enter()?;
        let result = self.list(ListOp::Or, Token::Pipe, Self::sequence);
        self.cursor.leave();
        result
    }

    fn sequence(&mut self) -> ReadResult<MatchDef> {
        self.list(ListOp::And, Token::Colon, Self::postfix)
    }

    /// Items joined by `separator`; a single item stands alone.
    fn list(
        &mut self,
        op: ListOp,
        separator: Token<'src>,
        item: fn(&mut Self) -> ReadResult<MatchDef>,
    ) -> ReadResult<MatchDef> {
        let start = self.cursor.start();
        let mut items = vec![item(self)?];
        while self.cursor.eat(separator) {
            items.push(item(self)?);
        }
        if items.len() == 1 {
            return Ok(items.remove(0));
        }
        Ok(MatchDef::List(MatchList {
            span: self.cursor.span_from(start),
            op,
            items,
            capturing: true,
        }))
    }

    fn postfix(&mut self) -> ReadResult<MatchDef> {
        let start = self.cursor.start();
        let mut node = self.atom()?;
        while let Some((min, max)) = self.quantifier()? {
            node = MatchDef::Repeat(MatchRepeat {
                span: self.cursor.span_from(start),
                min,
                max,
                capturing: node.capturing(),
                child: Box::new(node),
            });
        }
        Ok(node)
    }

    fn quantifier(&mut self) -> ReadResult<Option<(i64, Option<i64>)>> {
        let bounds = match self.cursor.peek() {
            Some(Token::Star) => (0, UNLIMITED),
            Some(Token::Plus) => (1, UNLIMITED),
            Some(Token::Question) => (0, Some(1)),
            Some(Token::LBrace) => {
                self.cursor.advance();
                return self.braced().map(Some);
            }
            _ => return Ok(None),
        };
        self.cursor.advance();
        Ok(Some(bounds))
    }

    /// `{m}`, `{m,n}`, `{m,*}` or `{*,n}`; the `{` is consumed.
    fn braced(&mut self) -> ReadResult<(i64, Option<i64>)> {
        let min = if self.cursor.eat(Token::Star) {
            None
        } else {
            Some(self.number()?)
        };
        if self.cursor.eat(Token::RBrace) {
            return match min {
                Some(m) => Ok((m, Some(m))),
                None => Err(self.unexpected("`,`")),
            };
        }
        self.expect(Token::Comma, "`,` or `}`")?;
        let max = if min.is_some() && self.cursor.eat(Token::Star) {
            UNLIMITED
        } else {
            Some(self.number()?)
        };
        self.expect(Token::RBrace, "`}`")?;
        Ok((min.unwrap_or(0), max))
    }

    fn number(&mut self) -> ReadResult<i64> {
        let negative = self.cursor.eat(Token::Minus);
        let span = self.cursor.current_span();
        let Some(Token::Number(text)) = self.cursor.peek() else {
            return Err(self.unexpected("a number"));
        };
        self.cursor.advance();
        let signed = if negative {
            format!("-{text}")
        } else {
            text.to_string()
        };
        signed
            .parse()
            .map_err(|_| ReadError::new(span, format!("number `{signed}` is out of range")))
    }

    fn atom(&mut self) -> ReadResult<MatchDef> {
        let start = self.cursor.start();
        match self.cursor.peek() {
            Some(Token::NonCapturing) => {
                self.cursor.advance();
                let mut inner = self.pattern()?;
                self.expect(Token::RParen, "`)`")?;
                inner.mark_non_capturing();
                Ok(inner)
            }
            Some(Token::LParen) => {
                self.cursor.advance();
                let inner = self.pattern()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(inner)
            }
            Some(Token::Caret | Token::LBracket) => {
                let negating = self.cursor.eat(Token::Caret);
                self.expect(Token::LBracket, "`[`")?;
                let mut steps = vec![self.number()?];
                while !self.cursor.eat(Token::RBracket) {
                    steps.push(self.number()?);
                }
                Ok(MatchDef::BracketSet(BracketSet {
                    span: self.cursor.span_from(start),
                    negating,
                    steps,
                    capturing: true,
                }))
            }
            Some(Token::Minus | Token::Number(_)) => {
                let id = self.number()?;
                Ok(MatchDef::Step(MatchStep {
                    span: self.cursor.span_from(start),
                    id,
                    capturing: true,
                }))
            }
            _ => Err(self.unexpected("a step id, `(` or `[`")),
        }
    }
}
