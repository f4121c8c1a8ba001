//! Translators module: the built-in call translators.
//!
//! String pattern matches become `LIKE` tests over the field's text; membership
//! tests on array fields become `jsonb` containment (`@>`).

use crate::expr::CallExpr;
use crate::fragment::{FilterFragment, SqlParam};
use crate::mapping::DocumentMapping;
use crate::matcher::{receiver_member, single_literal, CallMatcher, CallTranslator, MethodKey, ReceiverShape};
use crate::serializer::Serializer;
use crate::types::{FieldType, LiteralValue};
use crate::TranslateError;

pub const CONTAINS: &str = "Contains";
pub const STARTS_WITH: &str = "StartsWith";
pub const ENDS_WITH: &str = "EndsWith";

/// The single text argument of a string method call. Null is rejected rather
/// than turned into a pattern.
fn text_argument(node: &CallExpr) -> Result<String, TranslateError> {
    let value = single_literal(node)?;
    if value.is_null() {
        return Err(TranslateError::UnsupportedShape(format!(
            "{}: null comparison value",
            node.method
        )));
    }
    if let Some(s) = value.as_text() {
        return Ok(s.to_string());
    }
    match value {
        LiteralValue::Char(c) => Ok(c.to_string()),
        other => Err(TranslateError::UnsupportedShape(format!(
            "{}: expected a text argument, got {}",
            node.method,
            other.get_type()
        ))),
    }
}

macro_rules! like_translators {
    ($( $(#[$doc:meta])* $name:ident: $method:expr, $value:ident => $pattern:expr ),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone)]
            pub struct $name {
                key: MethodKey,
            }

            impl $name {
                pub fn new() -> Self {
                    Self { key: MethodKey::new($method, ReceiverShape::Exact(FieldType::Text), 1) }
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl CallMatcher for $name {
                fn matches(&self, node: &CallExpr) -> bool {
                    self.key.matches(node)
                }
            }

            impl CallTranslator for $name {
                fn name(&self) -> &'static str {
                    stringify!($name)
                }

                fn translate(
                    &self,
                    mapping: &dyn DocumentMapping,
                    _serializer: &dyn Serializer,
                    node: &CallExpr,
                ) -> Result<FilterFragment, TranslateError> {
                    let locator = mapping.resolve_locator(receiver_member(node)?)?;
                    let $value = text_argument(node)?;
                    Ok(FilterFragment::new(
                        format!("{} LIKE ?", locator),
                        vec![SqlParam::Text($pattern)],
                    )?)
                }
            }
        )*
    };
}

like_translators! {
    /// `field.Contains("v")` → `locator LIKE '%v%'`
    StringContains: CONTAINS, v => format!("%{}%", v),
    /// `field.StartsWith("v")` → `locator LIKE 'v%'`
    StringStartsWith: STARTS_WITH, v => format!("{}%", v),
    /// `field.EndsWith("v")` → `locator LIKE '%v'`
    StringEndsWith: ENDS_WITH, v => format!("%{}", v),
}

/// `arrayField.Contains(v)` → `locator @> '[v]'`, with `[v]` encoded by the
/// serializer so it compares equal to stored elements.
#[derive(Debug, Clone)]
pub struct EnumerableContains {
    key: MethodKey,
}

impl EnumerableContains {
    pub fn new() -> Self {
        Self { key: MethodKey::new(CONTAINS, ReceiverShape::AnyArray, 1) }
    }
}

impl Default for EnumerableContains {
    fn default() -> Self {
        Self::new()
    }
}

impl CallMatcher for EnumerableContains {
    fn matches(&self, node: &CallExpr) -> bool {
        self.key.matches(node)
    }
}

impl CallTranslator for EnumerableContains {
    fn name(&self) -> &'static str {
        "EnumerableContains"
    }

    fn translate(
        &self,
        mapping: &dyn DocumentMapping,
        serializer: &dyn Serializer,
        node: &CallExpr,
    ) -> Result<FilterFragment, TranslateError> {
        let value = single_literal(node)?;
        let encoded = serializer.encode(&LiteralValue::Array(vec![value.clone()]))?;
        let locator = mapping.resolve_locator(receiver_member(node)?)?;
        Ok(FilterFragment::new(
            format!("{} @> ?", locator),
            vec![SqlParam::Json(encoded)],
        )?)
    }
}
