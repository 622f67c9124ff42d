//! Evaluator for the arithmetic hidden in an anti-bot challenge page.
//!
//! The page computes its answer with obfuscated JavaScript built from
//! `! + [ ] ( )`, for example `+((!+[]+!![]+[])+(+!![]))` is `21`.
//! Only that subset is supported, with JavaScript coercion rules for
//! numbers, booleans, strings and the empty array.

use std::fmt;

use regex_lite::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("challenge script not found in page")]
    NotFound,

    #[error("challenge script has no initial value")]
    MissingInit,

    #[error("unexpected {found:?} at offset {offset}")]
    Unexpected { found: Option<char>, offset: usize },

    #[error("result is not a finite number")]
    NotANumber,
}

/// A JavaScript value, restricted to what the challenge produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(String),
    /// `[]`, the only array the challenge ever builds
    EmptyArray,
}

impl Value {
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => if *b { 1.0 } else { 0.0 },
            Value::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Value::EmptyArray => 0.0,
        }
    }

    pub fn to_bool(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
            Value::EmptyArray => true,
        }
    }

    fn is_stringy(&self) -> bool {
        matches!(self, Value::Str(_) | Value::EmptyArray)
    }

    fn add(self, rhs: Value) -> Value {
        if self.is_stringy() || rhs.is_stringy() {
            Value::Str(format!("{}{}", self, rhs))
        } else {
            Value::Number(self.to_number() + rhs.to_number())
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 9e15 => {
                write!(f, "{}", *n as i64)
            }
            Value::Number(n) if n.is_nan() => write!(f, "NaN"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::EmptyArray => Ok(()),
        }
    }
}

/// Recursive descent over the expression, one char per token.
struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&mut self) -> Option<char> {
        while let Some(c) = self.chars.get(self.pos) {
            if c.is_whitespace() {
                self.pos += 1;
            } else {
                return Some(*c);
            }
        }
        None
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn unexpected(&mut self) -> ScriptError {
        let found = self.peek();
        ScriptError::Unexpected { found, offset: self.pos }
    }

    fn expect(&mut self, want: char) -> Result<(), ScriptError> {
        if self.peek() == Some(want) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_expr(&mut self) -> Result<Value, ScriptError> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Some('+') => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    lhs = lhs.add(rhs);
                }
                Some('-') => {
                    self.bump();
                    let rhs = self.parse_term()?;
                    lhs = Value::Number(lhs.to_number() - rhs.to_number());
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_term(&mut self) -> Result<Value, ScriptError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.peek() {
                Some('*') => {
                    self.bump();
                    let rhs = self.parse_unary()?;
                    lhs = Value::Number(lhs.to_number() * rhs.to_number());
                }
                Some('/') => {
                    self.bump();
                    let rhs = self.parse_unary()?;
                    lhs = Value::Number(lhs.to_number() / rhs.to_number());
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Value, ScriptError> {
        match self.peek() {
            Some('+') => {
                self.bump();
                Ok(Value::Number(self.parse_unary()?.to_number()))
            }
            Some('-') => {
                self.bump();
                Ok(Value::Number(-self.parse_unary()?.to_number()))
            }
            Some('!') => {
                self.bump();
                Ok(Value::Bool(!self.parse_unary()?.to_bool()))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Value, ScriptError> {
        match self.peek() {
            Some('[') => {
                self.bump();
                self.expect(']')?;
                Ok(Value::EmptyArray)
            }
            Some('(') => {
                self.bump();
                let value = self.parse_expr()?;
                self.expect(')')?;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let start = self.pos;
                while let Some(c) = self.chars.get(self.pos) {
                    if c.is_ascii_digit() || *c == '.' {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                let literal: String = self.chars[start..self.pos].iter().collect();
                literal
                    .parse()
                    .map(Value::Number)
                    .map_err(|_| ScriptError::Unexpected { found: Some(c), offset: start })
            }
            _ => Err(self.unexpected()),
        }
    }
}

/// Evaluate one obfuscated expression.
pub fn evaluate(expr: &str) -> Result<Value, ScriptError> {
    let mut parser = Parser::new(expr);
    let value = parser.parse_expr()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected());
    }
    Ok(value)
}

/// Cut the challenge script out of the page, up to the answer assignment.
pub fn extract_script(body: &str) -> Option<&str> {
    let start = body.find("setTimeout(function(){")?;
    let rest = &body[start..];
    let end = rest.find("a.value")?;
    Some(&rest[..end])
}

/// Run the object-field arithmetic of a challenge script.
///
/// The script seeds `NAME={"KEY":EXPR}` and then applies
/// `NAME.KEY op= EXPR` statements in order.
pub fn solve(script: &str) -> Result<f64, ScriptError> {
    let init = Regex::new(r#"(\w+)=\{"(\w+)":([^}]+)\}"#).map_err(|_| ScriptError::MissingInit)?;
    let caps = init.captures(script).ok_or(ScriptError::MissingInit)?;
    let (name, key) = (&caps[1], &caps[2]);
    let mut acc = evaluate(&caps[3])?.to_number();

    let pattern = format!(
        r";\s*{}\.{}\s*([+\-*/])=\s*([^;]+)",
        regex_lite::escape(name),
        regex_lite::escape(key)
    );
    let step = Regex::new(&pattern).map_err(|_| ScriptError::MissingInit)?;

    for caps in step.captures_iter(script) {
        let rhs = evaluate(&caps[2])?.to_number();
        acc = match &caps[1] {
            "+" => acc + rhs,
            "-" => acc - rhs,
            "*" => acc * rhs,
            _ => acc / rhs,
        };
    }

    if acc.is_finite() {
        Ok(acc)
    } else {
        Err(ScriptError::NotANumber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atoms() {
        assert_eq!(evaluate("+[]").unwrap(), Value::Number(0.0));
        assert_eq!(evaluate("!+[]").unwrap(), Value::Bool(true));
        assert_eq!(evaluate("!![]").unwrap(), Value::Bool(true));
        assert_eq!(evaluate("+!![]").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_digit_concatenation() {
        assert_eq!(evaluate("!+[]+!![]+!![]+[]").unwrap(), Value::Str("3".to_string()));
        assert_eq!(
            evaluate("+((!+[]+!![]+!![]+[])+(!+[]+!![]))").unwrap(),
            Value::Number(32.0)
        );
        assert_eq!(evaluate("+((!+[]+!![]+[])+(+!![]))").unwrap(), Value::Number(21.0));
    }

    #[test]
    fn test_division_between_groups() {
        let value = evaluate("+((!+[]+!![]+!![]+!![]+[])+(+[]))/+((!+[]+!![]))").unwrap();
        assert_eq!(value, Value::Number(20.0));
    }

    #[test]
    fn test_rejects_unknown_tokens() {
        assert!(matches!(evaluate("+[]+x"), Err(ScriptError::Unexpected { found: Some('x'), .. })));
        assert!(evaluate("(+[]").is_err());
    }

    #[test]
    fn test_solve_statements() {
        let script = r#"setTimeout(function(){
            var s,t,o,p,b,r,e,a,k,i,n,g,f, xYz={"qw":+((!+[]+!![]+!![]+[])+(!+[]+!![]))};
            t = document.createElement('div');
            ;xYz.qw-=+((!+[]+!![]+[])+(+!![]));xYz.qw*=+((!+[]+!![]+!![])); "#;
        assert_eq!(solve(script).unwrap(), 33.0);
    }

    #[test]
    fn test_solve_without_init() {
        assert_eq!(solve("var a = 1;"), Err(ScriptError::MissingInit));
    }

    #[test]
    fn test_extract_script() {
        let body = "<script>\n  setTimeout(function(){ var x; a.value = 1; }, 4000);</script>";
        assert_eq!(extract_script(body), Some("setTimeout(function(){ var x; "));
        assert_eq!(extract_script("<html></html>"), None);
    }
}
