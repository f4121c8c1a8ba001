//! Matcher module: the capability traits every translator implements.
//!
//! Calls are recognized by a structural [`MethodKey`] (method name, receiver
//! shape, arity) computed once when the translator is built.

use crate::expr::{CallExpr, Expr, MemberAccess};
use crate::fragment::FilterFragment;
use crate::mapping::DocumentMapping;
use crate::serializer::Serializer;
use crate::types::{FieldType, LiteralValue};
use crate::TranslateError;

pub trait CallMatcher: Send + Sync {
    /// Pure test over the node's static shape.
    fn matches(&self, node: &CallExpr) -> bool;
}

pub trait CallTranslator: CallMatcher {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Only meaningful when `matches(node)` holds.
    fn translate(
        &self,
        mapping: &dyn DocumentMapping,
        serializer: &dyn Serializer,
        node: &CallExpr,
    ) -> Result<FilterFragment, TranslateError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReceiverShape {
    Exact(FieldType),
    /// `Array(T)` for any `T`.
    AnyArray,
}

impl ReceiverShape {
    pub fn accepts(&self, ty: &FieldType) -> bool {
        match self {
            ReceiverShape::Exact(expected) => expected == ty,
            ReceiverShape::AnyArray => ty.is_array(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub method: &'static str,
    pub receiver: ReceiverShape,
    pub arity: usize,
}

impl MethodKey {
    pub fn new(method: &'static str, receiver: ReceiverShape, arity: usize) -> Self {
        Self { method, receiver, arity }
    }

    /// Calls without a receiver never match.
    pub fn matches(&self, node: &CallExpr) -> bool {
        match node.receiver_type() {
            Some(ty) => {
                node.method == self.method && node.args.len() == self.arity && self.receiver.accepts(&ty)
            }
            None => false,
        }
    }
}

/// The receiver as a member access the mapping can resolve.
pub fn receiver_member(node: &CallExpr) -> Result<&MemberAccess, TranslateError> {
    match &node.receiver {
        Some(Expr::Member(m)) => Ok(m),
        Some(other) => Err(TranslateError::UnsupportedShape(format!(
            "{}: receiver must be a document field, got {}",
            node.method,
            other.kind()
        ))),
        None => Err(TranslateError::UnsupportedShape(format!(
            "{}: call has no receiver",
            node.method
        ))),
    }
}

/// The node's only argument, which must be a literal.
pub fn single_literal(node: &CallExpr) -> Result<&LiteralValue, TranslateError> {
    match node.args.as_slice() {
        [Expr::Literal(lit)] => Ok(lit),
        [other] => Err(TranslateError::UnsupportedShape(format!(
            "{}: argument must be a constant, got {}",
            node.method,
            other.kind()
        ))),
        args => Err(TranslateError::UnsupportedShape(format!(
            "{}: expected 1 argument, got {}",
            node.method,
            args.len()
        ))),
    }
}
