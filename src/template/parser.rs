//! テンプレート式の評価器
//!
//! 演算子の優先順位に従ってテンプレート式を解析し、その場で評価する。
//! 文法はリテラル・連結・真偽/三項論理に限定されており、ホスト環境への
//! アクセス手段は存在しない。

use crate::error::TemplateError;
use crate::template::lexer::{tokenize, Token};

/// 評価結果の値
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl Value {
    /// テンプレート出力に埋め込む文字列表現
    pub fn to_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Num(n) => crate::block::format_number(*n),
            Value::Bool(b) => b.to_string(),
        }
    }

    /// 三項・論理演算の条件として解釈する
    fn truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Num(n) => *n != 0.0,
            Value::Bool(b) => *b,
        }
    }

    /// 等価比較。型が異なる場合は文字列表現で比較する。
    fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (a, b) => a.to_text() == b.to_text(),
        }
    }
}

/// 式テキストを評価して値を返す
pub fn evaluate(input: &str) -> Result<Value, TemplateError> {
    let tokens = tokenize(input)?;
    let mut parser = ExprParser { tokens, pos: 0 };
    let value = parser.parse_ternary()?;
    match parser.peek() {
        None => Ok(value),
        Some(token) => Err(TemplateError::UnexpectedToken {
            found: format!("{:?}", token),
        }),
    }
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), TemplateError> {
        if self.match_token(expected) {
            Ok(())
        } else {
            match self.peek() {
                Some(token) => Err(TemplateError::UnexpectedToken {
                    found: format!("{:?}", token),
                }),
                None => Err(TemplateError::UnexpectedEnd),
            }
        }
    }

    /// 三項式を解析
    fn parse_ternary(&mut self) -> Result<Value, TemplateError> {
        let condition = self.parse_or()?;
        if self.match_token(&Token::Question) {
            // 両腕とも解析する。選ばれなかった側の評価結果は捨てる。
            let then_value = self.parse_ternary()?;
            self.expect(&Token::Colon)?;
            let else_value = self.parse_ternary()?;
            Ok(if condition.truthy() {
                then_value
            } else {
                else_value
            })
        } else {
            Ok(condition)
        }
    }

    /// OR式を解析
    fn parse_or(&mut self) -> Result<Value, TemplateError> {
        let mut left = self.parse_and()?;
        while self.match_token(&Token::OrOr) {
            let right = self.parse_and()?;
            left = Value::Bool(left.truthy() || right.truthy());
        }
        Ok(left)
    }

    /// AND式を解析
    fn parse_and(&mut self) -> Result<Value, TemplateError> {
        let mut left = self.parse_equality()?;
        while self.match_token(&Token::AndAnd) {
            let right = self.parse_equality()?;
            left = Value::Bool(left.truthy() && right.truthy());
        }
        Ok(left)
    }

    /// 等価式を解析
    fn parse_equality(&mut self) -> Result<Value, TemplateError> {
        let mut left = self.parse_concat()?;
        loop {
            if self.match_token(&Token::EqEq) {
                let right = self.parse_concat()?;
                left = Value::Bool(left.loose_eq(&right));
            } else if self.match_token(&Token::NotEq) {
                let right = self.parse_concat()?;
                left = Value::Bool(!left.loose_eq(&right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    /// 連結/加算式を解析
    ///
    /// 両辺が数値なら加算、それ以外は文字列連結になる。
    fn parse_concat(&mut self) -> Result<Value, TemplateError> {
        let mut left = self.parse_unary()?;
        while self.match_token(&Token::Plus) {
            let right = self.parse_unary()?;
            left = match (&left, &right) {
                (Value::Num(a), Value::Num(b)) => Value::Num(a + b),
                (a, b) => Value::Str(format!("{}{}", a.to_text(), b.to_text())),
            };
        }
        Ok(left)
    }

    /// 単項式を解析
    fn parse_unary(&mut self) -> Result<Value, TemplateError> {
        if self.match_token(&Token::Bang) {
            let operand = self.parse_unary()?;
            Ok(Value::Bool(!operand.truthy()))
        } else {
            self.parse_primary()
        }
    }

    /// 一次式を解析
    fn parse_primary(&mut self) -> Result<Value, TemplateError> {
        match self.advance() {
            Some(Token::String(s)) => Ok(Value::Str(s)),
            Some(Token::Number(n)) => Ok(Value::Num(n)),
            Some(Token::True) => Ok(Value::Bool(true)),
            Some(Token::False) => Ok(Value::Bool(false)),
            Some(Token::LParen) => {
                let value = self.parse_ternary()?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(token) => Err(TemplateError::UnexpectedToken {
                found: format!("{:?}", token),
            }),
            None => Err(TemplateError::UnexpectedEnd),
        }
    }
}
