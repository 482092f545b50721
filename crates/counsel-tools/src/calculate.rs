use serde_json::json;

use crate::tool::Tool;

/// Safe arithmetic evaluator over literals and `+ - * / ( )` only (spec
/// §4.6 `calculate`). Rejects identifiers, attribute access, and anything
/// else that isn't a number, an operator, or parentheses — there is no way
/// to smuggle code through this evaluator.
pub struct CalculateTool;

#[derive(Debug)]
enum ExprError {
    UnexpectedChar(char),
    UnexpectedEnd,
    DivideByZero,
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
            ExprError::UnexpectedEnd => write!(f, "unexpected end of expression"),
            ExprError::DivideByZero => write!(f, "division by zero"),
        }
    }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { chars: input.chars().peekable() }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some('+') => {
                    self.chars.next();
                    value += self.term()?;
                }
                Some('-') => {
                    self.chars.next();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.factor()?;
        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some('*') => {
                    self.chars.next();
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.chars.next();
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(ExprError::DivideByZero);
                    }
                    value /= rhs;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ExprError> {
        self.skip_ws();
        match self.chars.peek() {
            Some('-') => {
                self.chars.next();
                Ok(-self.factor()?)
            }
            Some('(') => {
                self.chars.next();
                let value = self.expr()?;
                self.skip_ws();
                match self.chars.next() {
                    Some(')') => Ok(value),
                    Some(c) => Err(ExprError::UnexpectedChar(c)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || *c == '.' => self.number(),
            Some(c) => Err(ExprError::UnexpectedChar(*c)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn number(&mut self) -> Result<f64, ExprError> {
        let mut digits = String::new();
        while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit() || *c == '.') {
            digits.push(self.chars.next().unwrap());
        }
        digits.parse::<f64>().map_err(|_| ExprError::UnexpectedEnd)
    }

    fn finish(mut self) -> Result<(), ExprError> {
        self.skip_ws();
        match self.chars.next() {
            Some(c) => Err(ExprError::UnexpectedChar(c)),
            None => Ok(()),
        }
    }
}

fn evaluate(expression: &str) -> Result<f64, ExprError> {
    let mut parser = Parser::new(expression);
    let value = parser.expr()?;
    parser.finish()?;
    Ok(value)
}

impl Tool for CalculateTool {
    fn name(&self) -> &'static str {
        "calculate"
    }

    fn description(&self) -> &'static str {
        "Evaluate a safe arithmetic expression over literals and + - * / ( )."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": { "expression": { "type": "string" } },
            "required": ["expression"]
        })
    }

    fn execute(&self, args: &serde_json::Value) -> serde_json::Value {
        let Some(expression) = args.get("expression").and_then(|v| v.as_str()) else {
            return json!({ "error": "missing required argument 'expression'" });
        };

        match evaluate(expression) {
            Ok(result) => json!({
                "result": result,
                "formatted": counsel_core::format_gbp(result),
                "expression": expression,
            }),
            Err(e) => json!({ "error": format!("could not evaluate '{expression}': {e}") }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_basic_arithmetic() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("51000 - 50000").unwrap(), 1000.0);
    }

    #[test]
    fn rejects_identifiers() {
        assert!(evaluate("import os").is_err());
        assert!(evaluate("__class__").is_err());
        assert!(evaluate("2 + x").is_err());
    }

    #[test]
    fn rejects_divide_by_zero() {
        assert!(matches!(evaluate("1 / 0"), Err(ExprError::DivideByZero)));
    }

    #[test]
    fn tool_returns_error_for_missing_arg() {
        let tool = CalculateTool;
        let out = tool.execute(&json!({}));
        assert!(out.get("error").is_some());
    }

    #[test]
    fn tool_formats_result_as_gbp() {
        let tool = CalculateTool;
        let out = tool.execute(&json!({ "expression": "50000 + 1000" }));
        assert_eq!(out["result"], 51000.0);
        assert_eq!(out["formatted"], "£51,000.00");
    }
}
