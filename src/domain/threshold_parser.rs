//! Threshold expression parser.
//!
//! Two forms are accepted:
//! - a comparison, `<= 15` or `>= 4.0` (the value side of a `[thresholds]` entry)
//! - a full threshold, `pe_ratio <= 15` (the `--threshold` flag)
//!
//! `≤` and `≥` are accepted as aliases. Strict `<` and `>` are rejected since
//! every comparison is inclusive.

use crate::domain::error::ParseError;
use crate::domain::metric::Metric;
use crate::domain::threshold::{Direction, Threshold};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn found(&self) -> String {
        self.peek()
            .map(|c| format!("'{}'", c))
            .unwrap_or_else(|| "end of input".to_string())
    }

    fn parse_identifier(&mut self) -> Result<&'a str, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(ParseError {
                message: format!("expected metric name, found {}", self.found()),
                position: start,
            });
        }
        Ok(&self.input[start..self.pos])
    }

    fn parse_metric(&mut self) -> Result<Metric, ParseError> {
        let start = {
            self.skip_whitespace();
            self.pos
        };
        let name = self.parse_identifier()?;
        name.parse::<Metric>().map_err(|message| ParseError {
            message,
            position: start,
        })
    }

    fn parse_direction(&mut self) -> Result<Direction, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let direction = match self.advance() {
            Some('≤') => return Ok(Direction::AtMost),
            Some('≥') => return Ok(Direction::AtLeast),
            Some('<') => Direction::AtMost,
            Some('>') => Direction::AtLeast,
            _ => {
                self.pos = start;
                return Err(ParseError {
                    message: format!("expected '<=' or '>=', found {}", self.found()),
                    position: start,
                });
            }
        };
        if self.peek() == Some('=') {
            self.advance();
            Ok(direction)
        } else {
            Err(ParseError {
                message: "strict comparisons are not supported, use '<=' or '>='".to_string(),
                position: start,
            })
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if matches!(self.peek(), Some('-') | Some('+')) {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        self.input[start..self.pos]
            .parse::<f64>()
            .map_err(|e| ParseError {
                message: format!("invalid number: {}", e),
                position: start,
            })
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        if self.peek().is_some() {
            return Err(ParseError {
                message: format!("unexpected trailing input {}", self.found()),
                position: self.pos,
            });
        }
        Ok(())
    }
}

/// Parse `<= 15` / `>= 4.0`.
pub fn parse_comparison(input: &str) -> Result<(Direction, f64), ParseError> {
    let mut parser = Parser::new(input);
    let direction = parser.parse_direction()?;
    let bound = parser.parse_number()?;
    parser.expect_end()?;
    Ok((direction, bound))
}

/// Parse `pe_ratio <= 15`.
pub fn parse_threshold(input: &str) -> Result<Threshold, ParseError> {
    let mut parser = Parser::new(input);
    let metric = parser.parse_metric()?;
    let direction = parser.parse_direction()?;
    let bound = parser.parse_number()?;
    parser.expect_end()?;
    Ok(Threshold {
        metric,
        direction,
        bound,
    })
}
