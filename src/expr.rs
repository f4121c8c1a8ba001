//! Expression module: the call-expression nodes handed to translators.
//!
//! This module provides the Expr, MemberAccess and CallExpr types, plus a small
//! parser that builds call nodes from text such as `Name.StartsWith("Sm")`.

use crate::schema::DocumentSchema;
use crate::types::{FieldType, LiteralValue};
use crate::TranslateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A field path rooted at the document, with its declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAccess {
    pub path: Vec<String>,
    pub ty: FieldType,
}

impl MemberAccess {
    pub fn new<I, S>(path: I, ty: FieldType) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            ty,
        }
    }

    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Expr {
    Literal(LiteralValue),
    Member(MemberAccess),
    Call(Box<CallExpr>),
    /// Anything the expression producer could not reduce further.
    Opaque { description: String, ty: FieldType },
}

impl Expr {
    pub fn static_type(&self) -> FieldType {
        match self {
            Expr::Literal(lit) => lit.get_type(),
            Expr::Member(m) => m.ty.clone(),
            Expr::Call(_) => FieldType::Unknown,
            Expr::Opaque { ty, .. } => ty.clone(),
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "literal",
            Expr::Member(_) => "member access",
            Expr::Call(_) => "call",
            Expr::Opaque { .. } => "opaque expression",
        }
    }
}

impl From<LiteralValue> for Expr {
    fn from(lit: LiteralValue) -> Self {
        Expr::Literal(lit)
    }
}

impl From<MemberAccess> for Expr {
    fn from(m: MemberAccess) -> Self {
        Expr::Member(m)
    }
}

/// "Invoke `method` with `args` on `receiver`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub receiver: Option<Expr>,
    pub method: String,
    pub args: Vec<Expr>,
}

impl CallExpr {
    pub fn new(receiver: impl Into<Expr>, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            receiver: Some(receiver.into()),
            method: method.into(),
            args,
        }
    }

    /// A static-style call with no owner expression.
    pub fn without_receiver(method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            receiver: None,
            method: method.into(),
            args,
        }
    }

    pub fn receiver_type(&self) -> Option<FieldType> {
        self.receiver.as_ref().map(Expr::static_type)
    }

    /// Receiver type as shown in diagnostics.
    pub fn receiver_type_name(&self) -> String {
        match self.receiver_type() {
            Some(ty) => ty.to_string(),
            None => "<none>".to_string(),
        }
    }
}

impl fmt::Display for CallExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(Expr::Member(m)) => write!(f, "{}.{}", m.dotted(), self.method)?,
            Some(other) => write!(f, "<{}>.{}", other.kind(), self.method)?,
            None => write!(f, "{}", self.method)?,
        }
        write!(f, "({} args)", self.args.len())
    }
}

// Hand-written recursive descent parser for member-call expressions
pub struct CallParser<'a> {
    input: &'a str,
    pos: usize,
    schema: &'a DocumentSchema,
}

impl<'a> CallParser<'a> {
    pub fn new(input: &'a str, schema: &'a DocumentSchema) -> Self {
        Self { input, pos: 0, schema }
    }

    pub fn parse(input: &str, schema: &DocumentSchema) -> Result<CallExpr, TranslateError> {
        let mut parser = CallParser::new(input, schema);
        let call = parser.parse_call()?;
        parser.skip_whitespace();
        if parser.pos < parser.input.len() {
            return Err(TranslateError::Parse(format!(
                "Unexpected input at position {}",
                parser.pos
            )));
        }
        Ok(call)
    }

    fn parse_call(&mut self) -> Result<CallExpr, TranslateError> {
        let mut path = self.parse_path()?;
        self.skip_whitespace();
        if !self.consume("(") {
            return Err(TranslateError::Parse(format!(
                "Expected '(' after method name at position {}",
                self.pos
            )));
        }
        let args = self.parse_args()?;
        // parse_path never returns an empty path
        let method = path.pop().unwrap_or_default();
        let receiver = if path.is_empty() {
            None
        } else {
            Some(Expr::Member(self.member(path)))
        };
        Ok(CallExpr { receiver, method, args })
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, TranslateError> {
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.consume(")") {
            return Ok(args);
        }
        loop {
            args.push(self.parse_arg()?);
            self.skip_whitespace();
            if self.consume(",") {
                continue;
            }
            if self.consume(")") {
                return Ok(args);
            }
            return Err(TranslateError::Parse(format!(
                "Expected ',' or ')' at position {}",
                self.pos
            )));
        }
    }

    fn parse_arg(&mut self) -> Result<Expr, TranslateError> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') | Some('[') => Ok(Expr::Literal(self.parse_literal()?)),
            Some(c) if c.is_ascii_digit() || c == '-' => Ok(Expr::Literal(self.parse_literal()?)),
            _ => {
                let path = self.parse_path()?;
                if path.len() == 1 {
                    match path[0].as_str() {
                        "true" => return Ok(Expr::Literal(LiteralValue::Bool(true))),
                        "false" => return Ok(Expr::Literal(LiteralValue::Bool(false))),
                        "null" => return Ok(Expr::Literal(LiteralValue::Null)),
                        _ => {}
                    }
                }
                Ok(Expr::Member(self.member(path)))
            }
        }
    }

    fn member(&self, path: Vec<String>) -> MemberAccess {
        let ty = self
            .schema
            .field_at(&path)
            .cloned()
            .unwrap_or(FieldType::Unknown);
        MemberAccess { path, ty }
    }

    fn parse_path(&mut self) -> Result<Vec<String>, TranslateError> {
        let mut segments = vec![self.parse_identifier()?];
        while self.peek() == Some('.') {
            self.consume_char();
            segments.push(self.parse_identifier()?);
        }
        Ok(segments)
    }

    fn parse_identifier(&mut self) -> Result<String, TranslateError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut end = self.pos;
        for (i, c) in self.input[self.pos..].char_indices() {
            if c.is_alphanumeric() || c == '_' {
                end = self.pos + i + c.len_utf8();
            } else {
                break;
            }
        }
        if end > start {
            self.pos = end;
            Ok(self.input[start..end].to_string())
        } else {
            Err(TranslateError::Parse(format!(
                "Expected identifier at position {}",
                self.pos
            )))
        }
    }

    fn parse_literal(&mut self) -> Result<LiteralValue, TranslateError> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') => self.parse_string_literal(),
            Some('[') => self.parse_list_literal(),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number_literal(),
            _ => {
                let start = self.pos;
                match self.parse_identifier()?.as_str() {
                    "true" => Ok(LiteralValue::Bool(true)),
                    "false" => Ok(LiteralValue::Bool(false)),
                    "null" => Ok(LiteralValue::Null),
                    _ => Err(TranslateError::Parse(format!(
                        "Expected literal at position {}",
                        start
                    ))),
                }
            }
        }
    }

    fn parse_string_literal(&mut self) -> Result<LiteralValue, TranslateError> {
        self.consume_char(); // opening quote
        let mut out = String::new();
        loop {
            match self.consume_char() {
                Some('"') => return Ok(LiteralValue::Text(out)),
                Some('\\') => match self.consume_char() {
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => {
                        return Err(TranslateError::Parse(format!(
                            "Unknown escape '\\{}' at position {}",
                            c, self.pos
                        )))
                    }
                    None => break,
                },
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(TranslateError::Parse(format!(
            "Unterminated string literal at position {}",
            self.pos
        )))
    }

    fn parse_number_literal(&mut self) -> Result<LiteralValue, TranslateError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.consume_char();
        }
        self.consume_digits();
        let is_float = self.peek() == Some('.')
            && self.input[self.pos + 1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit());
        if is_float {
            self.consume_char();
            self.consume_digits();
        }
        let s = &self.input[start..self.pos];
        let parsed = if is_float {
            s.parse::<f64>().ok().map(LiteralValue::Float)
        } else {
            s.parse::<i64>().ok().map(LiteralValue::Int)
        };
        parsed.ok_or_else(|| {
            TranslateError::Parse(format!("Invalid number literal at position {}", start))
        })
    }

    fn parse_list_literal(&mut self) -> Result<LiteralValue, TranslateError> {
        self.consume_char(); // '['
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.consume("]") {
            return Ok(LiteralValue::Array(items));
        }
        loop {
            items.push(self.parse_literal()?);
            self.skip_whitespace();
            if self.consume(",") {
                continue;
            }
            if self.consume("]") {
                return Ok(LiteralValue::Array(items));
            }
            return Err(TranslateError::Parse(format!(
                "Expected ',' or ']' at position {}",
                self.pos
            )));
        }
    }

    fn consume_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.consume_char();
            } else {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.consume_char();
            } else {
                break;
            }
        }
    }

    fn consume(&mut self, s: &str) -> bool {
        if self.input[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn consume_char(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }
}
