//! Fixed-grammar condition expression interpreter.
//!
//! A small lexer + recursive-descent parser + tree-walking evaluator
//! over a fixed grammar: boolean/number/string literals, identifier
//! lookup, equality and relational comparison, `&&`/`||`/`!`, and
//! parentheses. Conditions are written in JS-flavored syntax, so `===`
//! and `!==` are accepted as synonyms of `==`/`!=` and truthiness
//! follows JS rules.

use crate::context::{EvalContext, Value};

/// Error raised while parsing or evaluating a condition expression.
///
/// These never cross the resolver's boundary; they degrade into
/// diagnostics and conservative non-deletion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// Lexer met a character outside the grammar.
    #[error("Unexpected character '{0}' in condition")]
    UnexpectedChar(char),
    /// String literal missing its closing quote.
    #[error("Unterminated string literal")]
    UnterminatedString,
    /// Malformed number literal.
    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),
    /// Parser met a token that cannot appear at this position.
    #[error("Unexpected token '{0}' in condition")]
    UnexpectedToken(String),
    /// Condition ended mid-expression.
    #[error("Unexpected end of condition")]
    UnexpectedEnd,
    /// Identifier not bound in the evaluation context. Message shape
    /// matches a JS `ReferenceError` so existing tooling can match it.
    #[error("{0} is not defined")]
    UndefinedName(String),
    /// Relational comparison across incompatible types.
    #[error("Cannot compare {0} with {1}")]
    IncomparableTypes(&'static str, &'static str),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Ident(s) => s.clone(),
            Self::Str(s) => format!("'{s}'"),
            Self::Num(n) => n.to_string(),
            Self::EqEq => "==".to_owned(),
            Self::NotEq => "!=".to_owned(),
            Self::Lt => "<".to_owned(),
            Self::Le => "<=".to_owned(),
            Self::Gt => ">".to_owned(),
            Self::Ge => ">=".to_owned(),
            Self::AndAnd => "&&".to_owned(),
            Self::OrOr => "||".to_owned(),
            Self::Bang => "!".to_owned(),
            Self::LParen => "(".to_owned(),
            Self::RParen => ")".to_owned(),
        }
    }
}

fn lex(source: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '=').is_none() {
                    return Err(ExprError::UnexpectedChar('='));
                }
                // Optional third '=' for strict equality.
                chars.next_if(|&(_, c)| c == '=');
                tokens.push(Token::EqEq);
            }
            '!' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '=').is_some() {
                    chars.next_if(|&(_, c)| c == '=');
                    tokens.push(Token::NotEq);
                } else {
                    tokens.push(Token::Bang);
                }
            }
            '<' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '=').is_some() {
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '=').is_some() {
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '&' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '&').is_none() {
                    return Err(ExprError::UnexpectedChar('&'));
                }
                tokens.push(Token::AndAnd);
            }
            '|' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '|').is_none() {
                    return Err(ExprError::UnexpectedChar('|'));
                }
                tokens.push(Token::OrOr);
            }
            quote @ ('\'' | '"') => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == quote {
                        closed = true;
                        break;
                    }
                    text.push(c);
                }
                if !closed {
                    return Err(ExprError::UnterminatedString);
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let slice = &source[start..end];
                let value: f64 = slice
                    .parse()
                    .map_err(|_| ExprError::InvalidNumber(slice.to_owned()))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '$' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(source[start..end].to_owned()));
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }
    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone)]
enum Expr {
    Lit(Value),
    Ident(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    // or_expr := and_expr ( '||' and_expr )*
    fn or_expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.and_expr()?;
        while self.peek() == Some(&Token::OrOr) {
            self.next();
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // and_expr := cmp_expr ( '&&' cmp_expr )*
    fn and_expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.cmp_expr()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.next();
            let rhs = self.cmp_expr()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // cmp_expr := unary ( ( '==' | '!=' | '<' | '<=' | '>' | '>=' ) unary )*
    fn cmp_expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinOp::Eq,
                Some(Token::NotEq) => BinOp::Ne,
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Ge) => BinOp::Ge,
                _ => break,
            };
            self.next();
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // unary := '!' unary | primary
    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.peek() == Some(&Token::Bang) {
            self.next();
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    // primary := literal | identifier | '(' or_expr ')'
    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(match name.as_str() {
                "true" => Expr::Lit(Value::Bool(true)),
                "false" => Expr::Lit(Value::Bool(false)),
                _ => Expr::Ident(name),
            }),
            Some(Token::Str(s)) => Ok(Expr::Lit(Value::Str(s))),
            Some(Token::Num(n)) => Ok(Expr::Lit(Value::Number(n))),
            Some(Token::LParen) => {
                let inner = self.or_expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(token) => Err(ExprError::UnexpectedToken(token.describe())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(token) => Err(ExprError::UnexpectedToken(token.describe())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

fn parse(source: &str) -> Result<Expr, ExprError> {
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or_expr()?;
    match parser.next() {
        None => Ok(expr),
        Some(token) => Err(ExprError::UnexpectedToken(token.describe())),
    }
}

fn eval(expr: &Expr, context: &EvalContext) -> Result<Value, ExprError> {
    match expr {
        Expr::Lit(value) => Ok(value.clone()),
        Expr::Ident(name) => context
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::UndefinedName(name.clone())),
        Expr::Not(inner) => Ok(Value::Bool(!eval(inner, context)?.truthy())),
        // '&&' and '||' short-circuit: the right side is not evaluated
        // (and cannot raise) when the left side decides the outcome.
        Expr::And(lhs, rhs) => {
            if eval(lhs, context)?.truthy() {
                Ok(Value::Bool(eval(rhs, context)?.truthy()))
            } else {
                Ok(Value::Bool(false))
            }
        }
        Expr::Or(lhs, rhs) => {
            if eval(lhs, context)?.truthy() {
                Ok(Value::Bool(true))
            } else {
                Ok(Value::Bool(eval(rhs, context)?.truthy()))
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, context)?;
            let rhs = eval(rhs, context)?;
            apply_binary(*op, &lhs, &rhs)
        }
    }
}

fn apply_binary(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, ExprError> {
    let result = match op {
        // Equality across mismatched types is false, never an error.
        BinOp::Eq => values_equal(lhs, rhs),
        BinOp::Ne => !values_equal(lhs, rhs),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ordering = match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => {
                    return Err(ExprError::IncomparableTypes(
                        lhs.type_name(),
                        rhs.type_name(),
                    ));
                }
            };
            // None covers NaN comparisons, which are always false.
            ordering.is_some_and(|ord| match op {
                BinOp::Lt => ord.is_lt(),
                BinOp::Le => ord.is_le(),
                BinOp::Gt => ord.is_gt(),
                BinOp::Ge => ord.is_ge(),
                BinOp::Eq | BinOp::Ne => false,
            })
        }
    };
    Ok(Value::Bool(result))
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        _ => false,
    }
}

/// Parse and evaluate a condition expression with the context's entries
/// bound as free variables.
pub fn evaluate(source: &str, context: &EvalContext) -> Result<Value, ExprError> {
    let expr = parse(source)?;
    eval(&expr, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EvalContext {
        [
            ("DEBUG", Value::Bool(false)),
            ("MODE", Value::Str("production".to_owned())),
            ("VERSION", Value::Number(3.0)),
        ]
        .into_iter()
        .collect()
    }

    fn truthy(source: &str) -> bool {
        evaluate(source, &ctx()).unwrap().truthy()
    }

    #[test]
    fn literals_and_identifiers() {
        assert!(truthy("true"));
        assert!(!truthy("false"));
        assert!(!truthy("DEBUG"));
        assert!(truthy("MODE"));
        assert!(truthy("'nonempty'"));
        assert!(!truthy("''"));
        assert!(!truthy("0"));
        assert!(truthy("2.5"));
    }

    #[test]
    fn equality_including_strict_synonyms() {
        assert!(truthy("MODE == 'production'"));
        assert!(truthy("MODE === 'production'"));
        assert!(truthy("MODE !== 'development'"));
        assert!(!truthy("MODE == 'development'"));
        // Mismatched types compare unequal rather than erroring.
        assert!(!truthy("VERSION == 'production'"));
        assert!(truthy("VERSION != MODE"));
    }

    #[test]
    fn relational_and_logical_operators() {
        assert!(truthy("VERSION >= 3"));
        assert!(!truthy("VERSION < 3"));
        assert!(truthy("'abc' < 'abd'"));
        assert!(truthy("!DEBUG && MODE == 'production'"));
        assert!(truthy("DEBUG || VERSION > 2"));
        assert!(truthy("!(DEBUG && false)"));
    }

    #[test]
    fn short_circuit_skips_unbound_names() {
        assert!(!truthy("DEBUG && MISSING"));
        assert!(truthy("VERSION > 2 || MISSING"));
        assert_eq!(
            evaluate("MISSING || true", &ctx()),
            Err(ExprError::UndefinedName("MISSING".to_owned()))
        );
    }

    #[test]
    fn undefined_name_error_message() {
        let err = evaluate("MISSING", &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "MISSING is not defined");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            evaluate("MODE ==", &ctx()),
            Err(ExprError::UnexpectedEnd)
        );
        assert_eq!(
            evaluate("'unterminated", &ctx()),
            Err(ExprError::UnterminatedString)
        );
        assert_eq!(evaluate("a @ b", &ctx()), Err(ExprError::UnexpectedChar('@')));
        assert_eq!(
            evaluate("true false", &ctx()),
            Err(ExprError::UnexpectedToken("false".to_owned()))
        );
        assert_eq!(
            evaluate("1.2.3", &ctx()),
            Err(ExprError::InvalidNumber("1.2.3".to_owned()))
        );
    }

    #[test]
    fn incomparable_types_error() {
        assert_eq!(
            evaluate("VERSION < MODE", &ctx()),
            Err(ExprError::IncomparableTypes("number", "string"))
        );
    }
}
