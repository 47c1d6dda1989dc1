//! Arithmetic expression evaluator used by the `calculate` workflow.
//!
//! Grammar (recursive descent):
//!
//! ```text
//! expr    = term (('+' | '-') term)*
//! term    = unary (('*' | '/') unary)*
//! unary   = '-' unary | primary
//! primary = NUMBER | '(' expr ')'
//! ```

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    UnexpectedChar(char),
    InvalidNumber(String),
    UnexpectedToken(String),
    UnclosedParen,
    UnexpectedEnd,
    DivisionByZero,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedChar(c) => write!(f, "Unexpected character: '{c}'"),
            Self::InvalidNumber(s) => write!(f, "Invalid number: {s}"),
            Self::UnexpectedToken(t) => write!(f, "Unexpected token: {t}"),
            Self::UnclosedParen => write!(f, "Expected closing parenthesis"),
            Self::UnexpectedEnd => write!(f, "Unexpected end of expression"),
            Self::DivisionByZero => write!(f, "Division by zero"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Evaluate an arithmetic expression such as `(1200 - 300) * 0.15`.
pub fn evaluate(input: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let value = parser.expr()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(value),
        Some(tok) => Err(EvalError::UnexpectedToken(tok.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Op(c) => write!(f, "'{c}'"),
            Self::Open => write!(f, "'('"),
            Self::Close => write!(f, "')'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '+' | '-' | '*' | '/' => tokens.push(Token::Op(c)),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, d)) = chars.peek() {
                    if !(d.is_ascii_digit() || d == '.') {
                        break;
                    }
                    end = i + d.len_utf8();
                    chars.next();
                }
                let literal = &input[start..end];
                let n = literal
                    .parse()
                    .map_err(|_| EvalError::InvalidNumber(literal.to_string()))?;
                tokens.push(Token::Num(n));
            }
            other => return Err(EvalError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            if op == '+' {
                acc += rhs;
            } else {
                acc -= rhs;
            }
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            if op == '*' {
                acc *= rhs;
            } else if rhs == 0.0 {
                return Err(EvalError::DivisionByZero);
            } else {
                acc /= rhs;
            }
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<f64, EvalError> {
        if self.peek() == Some(Token::Op('-')) {
            self.pos += 1;
            return Ok(-self.unary()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<f64, EvalError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Open) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::Close) => Ok(value),
                    _ => Err(EvalError::UnclosedParen),
                }
            }
            Some(tok) => Err(EvalError::UnexpectedToken(tok.to_string())),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("((1 + 2) * (3 + 4))").unwrap(), 21.0);
    }

    #[test]
    fn left_associative_subtraction_and_division() {
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("100 / 10 / 2").unwrap(), 5.0);
    }

    #[test]
    fn unary_minus_and_decimals() {
        assert_eq!(evaluate("-5 + 3").unwrap(), -2.0);
        assert_eq!(evaluate("--2").unwrap(), 2.0);
        assert!((evaluate("1250.50 * 0.02").unwrap() - 25.01).abs() < 1e-9);
    }

    #[test]
    fn margin_requirement_example() {
        let v = evaluate("(50000 - 12000) * 0.25").unwrap();
        assert!((v - 9500.0).abs() < 1e-9);
    }

    #[test]
    fn errors() {
        assert_eq!(evaluate("1 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(evaluate("2 +"), Err(EvalError::UnexpectedEnd));
        assert_eq!(evaluate(""), Err(EvalError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(EvalError::UnclosedParen));
        assert_eq!(evaluate("2 $ 3"), Err(EvalError::UnexpectedChar('$')));
        assert!(matches!(evaluate("1.2.3"), Err(EvalError::InvalidNumber(_))));
        assert!(matches!(evaluate("1 2"), Err(EvalError::UnexpectedToken(_))));
    }
}
