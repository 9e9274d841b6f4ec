//! Rule DSL parser.
//!
//! Recursive descent parser for scoring predicates. Converts text to AST with
//! meaningful error messages including character offset, expected/found tokens.
//!
//! ```text
//! predicate := ABOVE(op, op) | BELOW(op, op) | CROSS_ABOVE(op, op) | CROSS_BELOW(op, op)
//!            | BETWEEN(op, num, num) | AND(p, p, ...) | OR(p, p, ...) | NOT(p)
//!            | VOL_ELEVATED_FALLING | VOL_DEPRESSED_RISING
//! op        := number | open | high | low | close | price | volume | <column name>
//! ```

use crate::domain::error::ParseError;
use crate::domain::frame::Column;
use crate::domain::rule::{Operand, Predicate};

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

    fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            position: self.pos,
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{}', found '{}'", expected, ch))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        let remaining = self.remaining();
        remaining.starts_with(keyword)
            && !remaining[keyword.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn peek_word(&self) -> String {
        let word: String = self
            .remaining()
            .chars()
            .take_while(|ch| ch.is_alphanumeric() || *ch == '_')
            .collect();
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
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

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        self.skip_whitespace();

        if self
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || ch == '-' || ch == '.')
        {
            return Ok(Operand::Constant(self.parse_number()?));
        }

        let word = self.peek_word();
        let operand = match word.as_str() {
            "open" => Operand::Open,
            "high" => Operand::High,
            "low" => Operand::Low,
            "close" => Operand::Close,
            "price" => Operand::Price,
            "volume" => Operand::Volume,
            other => match other.parse::<Column>() {
                Ok(column) => Operand::Column(column),
                Err(_) => {
                    return Err(self.error(format!(
                        "expected operand (number, price field or indicator column), found '{}'",
                        word
                    )));
                }
            },
        };
        self.pos += word.len();
        Ok(operand)
    }

    fn parse_comparison(&mut self, keyword: &str) -> Result<Predicate, ParseError> {
        self.consume_keyword(keyword);
        self.expect_char('(')?;

        let left = self.parse_operand()?;
        self.expect_char(',')?;
        let right = self.parse_operand()?;
        self.expect_char(')')?;

        Ok(match keyword {
            "CROSS_ABOVE" => Predicate::CrossAbove { left, right },
            "CROSS_BELOW" => Predicate::CrossBelow { left, right },
            "ABOVE" => Predicate::Above { left, right },
            _ => Predicate::Below { left, right },
        })
    }

    fn parse_between(&mut self) -> Result<Predicate, ParseError> {
        self.consume_keyword("BETWEEN");
        self.expect_char('(')?;

        let operand = self.parse_operand()?;
        self.expect_char(',')?;
        let lower = self.parse_number()?;
        self.expect_char(',')?;
        let upper = self.parse_number()?;
        self.expect_char(')')?;

        if lower > upper {
            return Err(self.error(format!(
                "BETWEEN lower bound {} exceeds upper bound {}",
                lower, upper
            )));
        }

        Ok(Predicate::Between {
            operand,
            lower,
            upper,
        })
    }

    fn parse_list(&mut self, keyword: &str) -> Result<Vec<Predicate>, ParseError> {
        self.consume_keyword(keyword);
        self.expect_char('(')?;

        let mut items = vec![self.parse_predicate()?];
        loop {
            self.skip_whitespace();
            if self.peek() == Some(')') {
                self.advance();
                break;
            }
            self.expect_char(',')?;
            items.push(self.parse_predicate()?);
        }

        if items.len() < 2 {
            return Err(self.error(format!("{} requires at least 2 predicates", keyword)));
        }
        Ok(items)
    }

    fn parse_not(&mut self) -> Result<Predicate, ParseError> {
        self.consume_keyword("NOT");
        self.expect_char('(')?;
        let inner = self.parse_predicate()?;
        self.expect_char(')')?;
        Ok(Predicate::Not(Box::new(inner)))
    }

    fn parse_predicate(&mut self) -> Result<Predicate, ParseError> {
        self.skip_whitespace();

        for keyword in ["CROSS_ABOVE", "CROSS_BELOW", "ABOVE", "BELOW"] {
            if self.peek_keyword(keyword) {
                return self.parse_comparison(keyword);
            }
        }
        if self.peek_keyword("BETWEEN") {
            return self.parse_between();
        }
        if self.peek_keyword("AND") {
            return self.parse_list("AND").map(Predicate::And);
        }
        if self.peek_keyword("OR") {
            return self.parse_list("OR").map(Predicate::Or);
        }
        if self.peek_keyword("NOT") {
            return self.parse_not();
        }
        if self.consume_keyword("VOL_ELEVATED_FALLING") {
            return Ok(Predicate::VolatilityElevatedFalling);
        }
        if self.consume_keyword("VOL_DEPRESSED_RISING") {
            return Ok(Predicate::VolatilityDepressedRising);
        }

        let word = self.peek_word();
        Err(self.error(format!("expected predicate, found '{}'", word)))
    }

    fn parse(&mut self) -> Result<Predicate, ParseError> {
        let predicate = self.parse_predicate()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(format!(
                "unexpected input after predicate: '{}'",
                self.remaining()
            )));
        }
        Ok(predicate)
    }
}

pub fn parse(input: &str) -> Result<Predicate, ParseError> {
    Parser::new(input).parse()
}
