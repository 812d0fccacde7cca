//! Calculator tool - evaluates arithmetic expressions

use async_trait::async_trait;
use thiserror::Error;
use toolgraph_core::{ParameterSchema, Tool, ToolError, ToolParams, ToolSchema};

/// Evaluates `+ - * / ^` (or `**`) with parentheses and unary minus
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "calculator".into(),
            description: "对数学表达式进行计算，支持基本的加减乘除运算".into(),
            parameters: vec![ParameterSchema::required(
                "expression",
                "数学表达式，例如 '2 + 2' 或 '3 * 4'",
            )],
        }
    }

    async fn invoke(&self, params: &ToolParams) -> Result<String, ToolError> {
        let expr = params
            .get("expression")
            .ok_or_else(|| ToolError::missing_param("expression"))?;

        let value = evaluate(expr).map_err(|e| ToolError::new(format!("计算错误: {e}")))?;
        tracing::debug!(expression = %expr, value, "Evaluated expression");
        Ok(format!("计算结果: {}", format_number(value)))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("result is not a finite number")]
    NotFinite,

    #[error("expression nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

/// Nesting bound for parentheses, unary signs and exponents
pub const MAX_DEPTH: usize = 64;

/// Evaluate an arithmetic expression
pub fn evaluate(expr: &str) -> Result<f64, EvalError> {
    let mut parser = Parser {
        chars: expr.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(&c) = parser.chars.get(parser.pos) {
        return Err(EvalError::UnexpectedChar(c));
    }
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NotFinite)
    }
}

/// Integral values print without a fractional part
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        let int = value as i64;
        int.to_string()
    } else {
        value.to_string()
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Run `f` one nesting level deeper
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        loop {
            if self.eat('*') || self.eat('×') {
                value *= self.unary()?;
            } else if self.eat('/') || self.eat('÷') {
                let rhs = self.unary()?;
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                value /= rhs;
            } else {
                return Ok(value);
            }
        }
    }

    // unary := ('-' | '+') unary | power
    fn unary(&mut self) -> Result<f64, EvalError> {
        if self.eat('-') {
            return Ok(-self.nested(Self::unary)?);
        }
        if self.eat('+') {
            return self.nested(Self::unary);
        }
        self.power()
    }

    // power := primary (('^' | '**') unary)?
    fn power(&mut self) -> Result<f64, EvalError> {
        let base = self.primary()?;
        if self.eat_pow() || self.eat('^') {
            let exp = self.nested(Self::unary)?;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    fn eat_pow(&mut self) -> bool {
        if self.chars.get(self.pos..self.pos + 2) == Some(&['*', '*'][..]) {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    fn primary(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.nested(Self::expr)?;
                if self.eat(')') {
                    Ok(value)
                } else {
                    self.peek().map_or(Err(EvalError::UnexpectedEnd), |c| {
                        Err(EvalError::UnexpectedChar(c))
                    })
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(EvalError::UnexpectedChar(c)),
            None => Err(EvalError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, EvalError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse().map_err(|_| EvalError::InvalidNumber(text))
    }
}
