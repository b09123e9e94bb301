use motif_core::{ArithmeticOp, ComparisonOp, Constant, DataType};

use super::lexer::{Token, tokenize};
use super::{Cursor, ReadError};
use crate::ast::{
    Aggregation, AggregationOp, BoolBinary, BoolExpr, BoolNot, BoolOp, Boundary, BoundaryEdge,
    Bounds, BoundsOp, Cast, Comparison, ConstantNode, ConversionKind, DateTimeConversion,
    DateTimeQuantum, Expr, FunctionCall, Membership, MembershipSet, Now, NullTest, NullTestOp,
    ParameterAccessor, PathAccessor, Quantum, StepReference, TimeOrdinal, TimeUnit, UnaryOp,
    ValueBinary, ValueExpr, ValueUnary,
};
use crate::diagnostics::Span;

type ReadResult<T> = Result<T, ReadError>;

/// Words that only ever continue an expression.
const RESERVED: &[&str] = &[
    "AND", "OR", "NOT", "BETWEEN", "IS", "IN", "AS", "WHERE", "SCOPE", "QUANTA",
];

/// Read an expression of either family.
///
/// Boolean literals read as values; use [`read_bool`] where a predicate is
/// expected.
pub fn read_expr(input: &str) -> ReadResult<Expr> {
    let mut parser = ExprParser::new(input)?;
    let expr = parser.expr()?;
    parser.finish()?;
    Ok(expr)
}

/// Read a predicate. A value in predicate position is wrapped.
pub fn read_bool(input: &str) -> ReadResult<BoolExpr> {
    read_expr(input).map(into_bool)
}

pub fn read_value(input: &str) -> ReadResult<ValueExpr> {
    read_expr(input).and_then(into_value)
}

fn into_bool(expr: Expr) -> BoolExpr {
    match expr {
        Expr::Bool(predicate) => predicate,
        Expr::Value(ValueExpr::Constant(node)) if matches!(node.value, Constant::Boolean(_)) => {
            BoolExpr::Constant(node)
        }
        Expr::Value(value) => BoolExpr::wrap(value),
    }
}

fn into_value(expr: Expr) -> ReadResult<ValueExpr> {
    match expr {
        Expr::Value(value) => Ok(value),
        Expr::Bool(BoolExpr::Constant(node)) => Ok(ValueExpr::Constant(node)),
        Expr::Bool(BoolExpr::ValueWrapper(wrapper)) => Ok(*wrapper.value),
        Expr::Bool(predicate) => Err(ReadError::new(
            predicate.span(),
            "expected a value, found a predicate",
        )),
    }
}

/// Numeric literal text, with the sign of a directly preceding `-`.
fn number(text: &str, negative: bool, span: Span) -> ReadResult<Constant> {
    let signed = if negative {
        format!("-{text}")
    } else {
        text.to_string()
    };
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return signed
            .parse::<i64>()
            .map(Constant::integer_literal)
            .map_err(|_| ReadError::new(span, format!("integer `{signed}` is out of range")));
    }
    signed
        .parse::<f64>()
        .map(Constant::Double)
        .map_err(|_| ReadError::new(span, format!("malformed number `{signed}`")))
}

/// Cast targets whose literal form the renderer writes as `CAST(literal AS T)`.
fn is_literal_cast(target: DataType) -> bool {
    matches!(
        target,
        DataType::Byte | DataType::Short | DataType::Long | DataType::Double | DataType::Datetime
    )
}

fn constant(value: Constant, span: Span) -> Expr {
    Expr::Value(ValueExpr::Constant(ConstantNode::spanned(value, span)))
}

struct ExprParser<'src> {
    cursor: Cursor<Token<'src>>,
}

impl<'src> ExprParser<'src> {
    fn new(input: &'src str) -> ReadResult<Self> {
        Ok(Self {
            cursor: Cursor::new(tokenize(input)?, input.len()),
        })
    }

    fn finish(&self) -> ReadResult<()> {
        match self.cursor.peek() {
            None => Ok(()),
            Some(token) => Err(ReadError::new(
                self.cursor.current_span(),
                format!("unexpected {} after the expression", token.describe()),
            )),
        }
    }

    fn unexpected(&self, expected: &str) -> ReadError {
        let found = self
            .cursor
            .peek()
            .map_or_else(|| "end of input".to_string(), |token| token.describe());
        ReadError::new(
            self.cursor.current_span(),
            format!("expected {expected}, found {found}"),
        )
    }

    fn expect(&mut self, token: Token<'src>) -> ReadResult<()> {
        if self.cursor.eat(token) {
            return Ok(());
        }
        Err(self.unexpected(&token.describe()))
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self.cursor.peek(), Some(Token::Word(w)) if w == word)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.is_word(word) {
            self.cursor.advance();
            return true;
        }
        false
    }

    fn expect_word(&mut self, word: &str) -> ReadResult<()> {
        if self.eat_word(word) {
            return Ok(());
        }
        Err(self.unexpected(&format!("`{word}`")))
    }

    fn word(&mut self) -> ReadResult<&'src str> {
        match self.cursor.peek() {
            Some(Token::Word(word)) => {
                self.cursor.advance();
                Ok(word)
            }
            _ => Err(self.unexpected("a name")),
        }
    }

    fn dotted_name(&mut self) -> ReadResult<String> {
        let mut name = self.word()?.to_string();
        while self.cursor.eat(Token::Dot) {
            name.push('.');
            name.push_str(self.word()?);
        }
        Ok(name)
    }

    fn string(&mut self) -> ReadResult<String> {
        match self.cursor.peek() {
            Some(Token::Str(raw)) => {
                self.cursor.advance();
                Ok(motif_core::utils::unquote(raw))
            }
            _ => Err(self.unexpected("a string")),
        }
    }

    fn expr(&mut self) -> ReadResult<Expr> {
        self.cursor.enter()?;
        let result = self.or();
        self.cursor.leave();
        result
    }

    fn value(&mut self) -> ReadResult<ValueExpr> {
        self.expr().and_then(into_value)
    }

    fn predicate(&mut self) -> ReadResult<BoolExpr> {
        self.expr().map(into_bool)
    }

    fn bool_binary(&self, start: usize, op: BoolOp, left: Expr, right: Expr) -> Expr {
        Expr::Bool(BoolExpr::Binary(BoolBinary {
            span: self.cursor.span_from(start),
            op,
            left: Box::new(into_bool(left)),
            right: Box::new(into_bool(right)),
        }))
    }

    fn or(&mut self) -> ReadResult<Expr> {
        let start = self.cursor.start();
        let mut left = self.and()?;
        while self.eat_word("OR") {
            let right = self.and()?;
            left = self.bool_binary(start, BoolOp::Or, left, right);
        }
        Ok(left)
    }

    fn and(&mut self) -> ReadResult<Expr> {
        let start = self.cursor.start();
        let mut left = self.not()?;
        while self.eat_word("AND") {
            let right = self.not()?;
            left = self.bool_binary(start, BoolOp::And, left, right);
        }
        Ok(left)
    }

    fn not(&mut self) -> ReadResult<Expr> {
        let start = self.cursor.start();
        if !self.eat_word("NOT") {
            return self.comparison();
        }
        self.cursor.enter()?;
        let operand = self.not();
        self.cursor.leave();
        Ok(Expr::Bool(BoolExpr::Not(BoolNot {
            span: self.cursor.span_from(start),
            operand: Box::new(into_bool(operand?)),
        })))
    }

    fn comparison_op(&self) -> Option<ComparisonOp> {
        Some(match self.cursor.peek()? {
            Token::EqEq => ComparisonOp::Eq,
            Token::NotEq => ComparisonOp::Neq,
            Token::Lt => ComparisonOp::Lt,
            Token::LtEq => ComparisonOp::Lte,
            Token::Gt => ComparisonOp::Gt,
            Token::GtEq => ComparisonOp::Gte,
            _ => return None,
        })
    }

    fn comparison(&mut self) -> ReadResult<Expr> {
        let start = self.cursor.start();
        let left = self.additive()?;

        if let Some(op) = self.comparison_op() {
            self.cursor.advance();
            let right = self.additive()?;
            return Ok(Expr::Bool(BoolExpr::Comparison(Comparison {
                span: self.cursor.span_from(start),
                op,
                left: Box::new(into_value(left)?),
                right: Box::new(into_value(right)?),
            })));
        }

        let negated = self.is_word("NOT")
            && matches!(self.cursor.peek_at(1), Some(Token::Word("BETWEEN")));
        if negated || self.is_word("BETWEEN") {
            if negated {
                self.cursor.advance();
            }
            self.cursor.advance();
            let lower = self.additive()?;
            self.expect_word("AND")?;
            let upper = self.additive()?;
            return Ok(Expr::Bool(BoolExpr::Bounds(Bounds {
                span: self.cursor.span_from(start),
                op: if negated {
                    BoundsOp::NotBetween
                } else {
                    BoundsOp::Between
                },
                value: Box::new(into_value(left)?),
                lower: Box::new(into_value(lower)?),
                upper: Box::new(into_value(upper)?),
            })));
        }

        if self.eat_word("IS") {
            let op = if self.eat_word("NOT") {
                NullTestOp::IsNotNull
            } else {
                NullTestOp::IsNull
            };
            self.expect_word("NULL")?;
            return Ok(Expr::Bool(BoolExpr::NullTest(NullTest {
                span: self.cursor.span_from(start),
                op,
                operand: Box::new(into_value(left)?),
            })));
        }

        if self.eat_word("IN") {
            let value = into_value(left)?;
            let set = if self.cursor.peek() == Some(Token::LParen) {
                self.cursor.advance();
                MembershipSet::List(self.arguments()?)
            } else {
                MembershipSet::Vector(Box::new(self.path()?))
            };
            return Ok(Expr::Bool(BoolExpr::Membership(Membership {
                span: self.cursor.span_from(start),
                value: Box::new(value),
                set,
            })));
        }

        Ok(left)
    }

    fn additive(&mut self) -> ReadResult<Expr> {
        let start = self.cursor.start();
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.cursor.peek() {
                Some(Token::Plus) => ArithmeticOp::Add,
                Some(Token::Minus) => ArithmeticOp::Subtract,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.multiplicative()?;
            left = self.value_binary(start, op, left, right)?;
        }
    }

    fn multiplicative(&mut self) -> ReadResult<Expr> {
        let start = self.cursor.start();
        let mut left = self.unary()?;
        loop {
            let op = match self.cursor.peek() {
                Some(Token::Star) => ArithmeticOp::Multiply,
                Some(Token::Slash) => ArithmeticOp::Divide,
                Some(Token::Percent) => ArithmeticOp::Modulo,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.unary()?;
            left = self.value_binary(start, op, left, right)?;
        }
    }

    fn value_binary(
        &self,
        start: usize,
        op: ArithmeticOp,
        left: Expr,
        right: Expr,
    ) -> ReadResult<Expr> {
        Ok(Expr::Value(ValueExpr::Binary(ValueBinary {
            span: self.cursor.span_from(start),
            op,
            left: Box::new(into_value(left)?),
            right: Box::new(into_value(right)?),
        })))
    }

    fn unary(&mut self) -> ReadResult<Expr> {
        let start = self.cursor.start();
        let op = match self.cursor.peek() {
            Some(Token::Minus) => UnaryOp::Negate,
            Some(Token::Plus) => UnaryOp::Normal,
            _ => return self.primary(),
        };
        self.cursor.advance();

        if op == UnaryOp::Negate
            && let Some(Token::Integer(text) | Token::Decimal(text)) = self.cursor.peek()
        {
            self.cursor.advance();
            let span = self.cursor.span_from(start);
            return Ok(constant(number(text, true, span)?, span));
        }

        self.cursor.enter()?;
        let operand = self.unary();
        self.cursor.leave();
        Ok(Expr::Value(ValueExpr::Unary(ValueUnary {
            span: self.cursor.span_from(start),
            op,
            operand: Box::new(into_value(operand?)?),
        })))
    }

    fn primary(&mut self) -> ReadResult<Expr> {
        let start = self.cursor.start();
        let span = self.cursor.current_span();
        let Some(token) = self.cursor.peek() else {
            return Err(self.unexpected("an expression"));
        };
        match token {
            Token::LParen => {
                self.cursor.advance();
                let inner = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Integer(text) | Token::Decimal(text) => {
                self.cursor.advance();
                Ok(constant(number(text, false, span)?, span))
            }
            Token::Str(raw) => {
                self.cursor.advance();
                Ok(constant(Constant::string_literal(raw), span))
            }
            Token::Param(name) => {
                self.cursor.advance();
                Ok(Expr::Value(ValueExpr::Parameter(ParameterAccessor {
                    span,
                    name: name.to_string(),
                    dtype: None,
                })))
            }
            Token::Word(word) if !RESERVED.contains(&word) => self.keyword_or_name(word, start),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn keyword_or_name(&mut self, word: &'src str, start: usize) -> ReadResult<Expr> {
        let span = self.cursor.current_span();
        let called = self.cursor.peek_at(1) == Some(Token::LParen);
        match word {
            "TRUE" | "FALSE" => {
                self.cursor.advance();
                Ok(constant(Constant::Boolean(word == "TRUE"), span))
            }
            "NULL" => {
                self.cursor.advance();
                Ok(constant(Constant::Null, span))
            }
            "NOW" if called => {
                self.cursor.advance();
                self.expect(Token::LParen)?;
                self.expect(Token::RParen)?;
                Ok(Expr::Value(ValueExpr::Now(Now {
                    span: self.cursor.span_from(start),
                })))
            }
            "CAST" if called => self.cast(start),
            "TRUNCATE" | "EXTRACT" if called => self.quantum(start),
            "START" | "END" if called => self.boundary(start),
            "STEP" if called => self.step_reference(start),
            _ if called => {
                if let Some(op) = AggregationOp::ALL.into_iter().find(|op| op.keyword() == word) {
                    return self.aggregation(op, start);
                }
                match ConversionKind::ALL.into_iter().find(|c| c.keyword() == word) {
                    Some(conversion) => self.conversion(conversion, start),
                    None => self.path_or_call(start),
                }
            }
            _ => self.path_or_call(start),
        }
    }

    fn conversion(&mut self, conversion: ConversionKind, start: usize) -> ReadResult<Expr> {
        self.cursor.advance();
        self.expect(Token::LParen)?;
        let operand = self.value()?;
        self.expect(Token::RParen)?;
        Ok(Expr::Value(ValueExpr::DateTimeConversion(DateTimeConversion {
            span: self.cursor.span_from(start),
            conversion,
            operand: Box::new(operand),
        })))
    }

    fn cast(&mut self, start: usize) -> ReadResult<Expr> {
        self.cursor.advance();
        self.expect(Token::LParen)?;
        let operand = self.value()?;
        self.expect_word("AS")?;
        let type_span = self.cursor.current_span();
        let name = self.word()?;
        let target = DataType::from_name(name)
            .ok_or_else(|| ReadError::new(type_span, format!("unknown type `{name}`")))?;
        self.expect(Token::RParen)?;

        let span = self.cursor.span_from(start);
        if is_literal_cast(target)
            && let ValueExpr::Constant(node) = &operand
            && let Ok(value) = node.value.cast(target)
        {
            return Ok(constant(value, span));
        }
        Ok(Expr::Value(ValueExpr::Cast(Cast {
            span,
            target,
            operand: Box::new(operand),
        })))
    }

    fn quantum(&mut self, start: usize) -> ReadResult<Expr> {
        let truncate = self.is_word("TRUNCATE");
        self.cursor.advance();
        self.expect(Token::LParen)?;
        let unit_span = self.cursor.current_span();
        let unit = self.word()?;
        let quantum = if truncate {
            TimeUnit::ALL
                .into_iter()
                .find(|u| u.keyword() == unit)
                .map(Quantum::Truncate)
        } else {
            TimeOrdinal::ALL
                .into_iter()
                .find(|o| o.keyword() == unit)
                .map(Quantum::Extract)
        };
        let quantum = quantum
            .ok_or_else(|| ReadError::new(unit_span, format!("unknown time unit `{unit}`")))?;
        self.expect(Token::Comma)?;
        let operand = self.value()?;
        let zone = if self.cursor.eat(Token::Comma) {
            Some(self.string()?)
        } else {
            None
        };
        self.expect(Token::RParen)?;
        Ok(Expr::Value(ValueExpr::DateTimeQuantum(DateTimeQuantum {
            span: self.cursor.span_from(start),
            quantum,
            operand: Box::new(operand),
            zone,
            tz: None,
        })))
    }

    fn boundary(&mut self, start: usize) -> ReadResult<Expr> {
        let edge = if self.is_word("START") {
            BoundaryEdge::Start
        } else {
            BoundaryEdge::End
        };
        self.cursor.advance();
        self.expect(Token::LParen)?;
        let relation = self.dotted_name()?;
        self.expect(Token::RParen)?;
        Ok(Expr::Bool(BoolExpr::Boundary(Boundary {
            span: self.cursor.span_from(start),
            edge,
            relation,
            resolved: None,
        })))
    }

    fn step_reference(&mut self, start: usize) -> ReadResult<Expr> {
        self.cursor.advance();
        self.expect(Token::LParen)?;
        let negative = self.cursor.eat(Token::Minus);
        let span = self.cursor.current_span();
        let step = match self.cursor.peek() {
            Some(Token::Integer(text)) => {
                self.cursor.advance();
                number(text, negative, span)?
                    .as_i64()
                    .ok_or_else(|| ReadError::new(span, "step id out of range"))?
            }
            _ => return Err(self.unexpected("a step id")),
        };
        self.expect(Token::RParen)?;
        Ok(Expr::Bool(BoolExpr::StepReference(StepReference {
            span: self.cursor.span_from(start),
            step,
        })))
    }

    fn aggregation(&mut self, op: AggregationOp, start: usize) -> ReadResult<Expr> {
        self.cursor.advance();
        self.expect(Token::LParen)?;
        let count = if op == AggregationOp::Top {
            let count = self.value()?;
            self.expect(Token::Comma)?;
            Some(Box::new(count))
        } else {
            None
        };
        let target = self.value()?;
        let condition = if self.eat_word("WHERE") {
            Some(Box::new(self.predicate()?))
        } else {
            None
        };
        let scope = if self.eat_word("SCOPE") {
            Some(self.dotted_name()?)
        } else {
            None
        };
        let quanta = if self.eat_word("QUANTA") {
            Some(Box::new(self.value()?))
        } else {
            None
        };
        self.expect(Token::RParen)?;
        Ok(Expr::Value(ValueExpr::Aggregation(Aggregation {
            span: self.cursor.span_from(start),
            op,
            count,
            target: Box::new(target),
            condition,
            scope,
            quanta,
            scope_path: None,
        })))
    }

    fn path(&mut self) -> ReadResult<ValueExpr> {
        let start = self.cursor.start();
        let name = self.dotted_name()?;
        Ok(ValueExpr::Path(PathAccessor {
            span: self.cursor.span_from(start),
            name,
            resolved: None,
        }))
    }

    fn path_or_call(&mut self, start: usize) -> ReadResult<Expr> {
        let path = self.path()?;
        if !self.cursor.eat(Token::LParen) {
            return Ok(Expr::Value(path));
        }
        let ValueExpr::Path(PathAccessor { name, .. }) = path else {
            return Err(self.unexpected("a function name"));
        };
        let args = self.arguments()?;
        Ok(Expr::Value(ValueExpr::FunctionCall(FunctionCall {
            span: self.cursor.span_from(start),
            name,
            args,
            context: None,
        })))
    }

    /// Comma-separated values up to the closing `)`; the `(` is consumed.
    fn arguments(&mut self) -> ReadResult<Vec<ValueExpr>> {
        let mut args = Vec::new();
        if self.cursor.eat(Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.value()?);
            if self.cursor.eat(Token::RParen) {
                return Ok(args);
            }
            if !self.cursor.eat(Token::Comma) {
                return Err(self.unexpected("`,` or `)`"));
            }
        }
    }
}
