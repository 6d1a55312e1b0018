//! # diskedit expr
//!
//! Sector-expression evaluation for the partition editor. Operators give
//! positions as small additive expressions over three kinds of term:
//!
//! - `.` — the cursor (dot)
//! - `$` — the relative bound: the disk end, or the top of the available
//!   gap when resolving a partition's end
//! - an integer in any common radix (`4096`, `0x1000`, `0o17`, `0b101`,
//!   and C-style leading-zero octal)
//!
//! Terms chain with `+` and `-` (`.+1024`, `$-2048`). The result must land
//! in `[0, absolute_bound]`; both bounds are inclusive here, callers apply
//! their own stricter checks.
//!
//! ## Example
//!
//! ```
//! use diskedit_core::SectorEvaluator;
//! use diskedit_expr::ExprEvaluator;
//!
//! let end = ExprEvaluator.evaluate("$-2048", 0, 10000, 10000).unwrap();
//! assert_eq!(end, 7952);
//! ```

use diskedit_core::{Error, Result, SectorEvaluator};

/// Evaluator for operator sector expressions
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprEvaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Dot,
    Dollar,
    Plus,
    Minus,
    Number(i64),
}

impl SectorEvaluator for ExprEvaluator {
    fn evaluate(
        &self,
        text: &str,
        cursor: i64,
        relative_bound: i64,
        absolute_bound: i64,
    ) -> Result<i64> {
        let tokens = tokenize(text)?;
        let value = parse(&tokens, text, cursor, relative_bound)?;

        if value < 0 || value > absolute_bound {
            return Err(Error::out_of_range(format!("{value} (from \"{text}\")")));
        }
        Ok(value)
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(at, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '$' => {
                chars.next();
                tokens.push(Token::Dollar);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            c if c.is_ascii_alphanumeric() => {
                let rest = &text[at..];
                let len = rest
                    .find(|c: char| !c.is_ascii_alphanumeric())
                    .unwrap_or(rest.len());
                tokens.push(Token::Number(parse_number(&rest[..len])?));
                for _ in 0..rest[..len].chars().count() {
                    chars.next();
                }
            }
            _ => {
                return Err(Error::invalid_expression(format!(
                    "unexpected character '{c}' in \"{text}\""
                )));
            }
        }
    }

    if tokens.is_empty() {
        return Err(Error::invalid_expression("empty expression"));
    }
    Ok(tokens)
}

/// Accept decimal, 0x/0X hex, 0o octal, 0b binary, and C-style
/// leading-zero octal
fn parse_number(text: &str) -> Result<i64> {
    let bad = || Error::invalid_expression(format!("bad number \"{text}\""));

    let (digits, radix) = match text.as_bytes() {
        [b'0', b'x' | b'X', ..] => (&text[2..], 16),
        [b'0', b'o' | b'O', ..] => (&text[2..], 8),
        [b'0', b'b' | b'B', ..] => (&text[2..], 2),
        [b'0', _, ..] => (&text[1..], 8),
        _ => (text, 10),
    };

    i64::from_str_radix(digits, radix).map_err(|_| bad())
}

fn parse(tokens: &[Token], text: &str, cursor: i64, relative_bound: i64) -> Result<i64> {
    let term = |token: &Token| -> Result<i64> {
        match token {
            Token::Dot => Ok(cursor),
            Token::Dollar => Ok(relative_bound),
            Token::Number(n) => Ok(*n),
            Token::Plus | Token::Minus => Err(Error::invalid_expression(format!(
                "operator where a value was expected in \"{text}\""
            ))),
        }
    };

    let mut iter = tokens.iter();
    let first = iter
        .next()
        .ok_or_else(|| Error::invalid_expression("empty expression"))?;
    let mut value = term(first)?;

    while let Some(op) = iter.next() {
        let rhs = iter.next().ok_or_else(|| {
            Error::invalid_expression(format!("trailing operator in \"{text}\""))
        })?;
        match op {
            Token::Plus => value += term(rhs)?,
            Token::Minus => value -= term(rhs)?,
            _ => {
                return Err(Error::invalid_expression(format!(
                    "missing operator in \"{text}\""
                )));
            }
        }
    }

    Ok(value)
}
