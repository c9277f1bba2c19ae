//! Calculator tool — evaluates arithmetic expressions.
//!
//! Supports `+`, `-`, `*`, `/`, parentheses, unary negation, and decimal
//! numbers via a small recursive-descent parser over the raw bytes.
//! Whole-number results come back as JSON integers.

use palaver_core::ToolSpec;
use serde_json::{Map, Value, json};

/// Descriptor for the calculator tool.
pub fn spec() -> ToolSpec {
    ToolSpec {
        name: "calculator".into(),
        description:
            "Evaluate a mathematical expression. Supports +, -, *, /, parentheses, and decimal numbers."
                .into(),
        function: Some("builtin.calculator.evaluate".into()),
        parameters: json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The expression to evaluate, e.g. '(2 + 3) * 4'"
                }
            },
            "required": ["expression"]
        }),
        keywords: vec!["math".into(), "arithmetic".into(), "calculate".into()],
    }
}

/// The callable behind `builtin.calculator.evaluate`.
pub fn evaluate(parameters: &Map<String, Value>) -> Result<Value, String> {
    let expression = parameters
        .get("expression")
        .and_then(Value::as_str)
        .ok_or("missing 'expression' parameter")?;

    let value = eval_expression(expression)?;

    if value.fract() == 0.0 && value.abs() < 1e15 {
        Ok(json!(value as i64))
    } else {
        Ok(json!(value))
    }
}

/// Evaluate an arithmetic expression string.
pub fn eval_expression(input: &str) -> Result<f64, String> {
    let mut cursor = Cursor {
        src: input.as_bytes(),
        pos: 0,
    };
    let value = cursor.sum()?;
    cursor.skip_whitespace();
    if cursor.pos < cursor.src.len() {
        return Err(format!(
            "unexpected character '{}' at position {}",
            cursor.src[cursor.pos] as char,
            cursor.pos
        ));
    }
    Ok(value)
}

struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn skip_whitespace(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.src.get(self.pos).copied()
    }

    // sum = product (('+' | '-') product)*
    fn sum(&mut self) -> Result<f64, String> {
        let mut left = self.product()?;
        while let Some(op) = self.peek() {
            match op {
                b'+' => {
                    self.pos += 1;
                    left += self.product()?;
                }
                b'-' => {
                    self.pos += 1;
                    left -= self.product()?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // product = atom (('*' | '/') atom)*
    fn product(&mut self) -> Result<f64, String> {
        let mut left = self.atom()?;
        while let Some(op) = self.peek() {
            match op {
                b'*' => {
                    self.pos += 1;
                    left *= self.atom()?;
                }
                b'/' => {
                    self.pos += 1;
                    let right = self.atom()?;
                    if right == 0.0 {
                        return Err("division by zero".into());
                    }
                    left /= right;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // atom = '-' atom | '(' sum ')' | NUMBER
    fn atom(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.atom()?)
            }
            Some(b'(') => {
                self.pos += 1;
                let value = self.sum()?;
                match self.peek() {
                    Some(b')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    _ => Err("expected closing parenthesis".into()),
                }
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            Some(c) => Err(format!("unexpected character '{}'", c as char)),
            None => Err("unexpected end of expression".into()),
        }
    }

    fn number(&mut self) -> Result<f64, String> {
        let start = self.pos;
        while self.pos < self.src.len()
            && (self.src[self.pos].is_ascii_digit() || self.src[self.pos] == b'.')
        {
            self.pos += 1;
        }
        let literal = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| "invalid number".to_string())?;
        literal
            .parse()
            .map_err(|_| format!("invalid number: {literal}"))
    }
}
