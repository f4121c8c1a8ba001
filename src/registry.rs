//! Registry module: the ordered translator list and the translation entry point.
//!
//! Translators are probed in registration order and the first match wins. The
//! order is stable, but the built-ins are mutually exclusive, so it only matters
//! for translators added with [`TranslatorRegistry::register`].

use crate::expr::CallExpr;
use crate::fragment::FilterFragment;
use crate::mapping::DocumentMapping;
use crate::matcher::CallTranslator;
use crate::serializer::Serializer;
use crate::translators::{EnumerableContains, StringContains, StringEndsWith, StringStartsWith};
use crate::TranslateError;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{debug, trace, warn};

static DEFAULT_REGISTRY: Lazy<TranslatorRegistry> = Lazy::new(TranslatorRegistry::with_builtins);

/// The process-wide registry of built-in translators, built on first use.
pub fn default_registry() -> &'static TranslatorRegistry {
    &DEFAULT_REGISTRY
}

pub struct TranslatorRegistry {
    translators: Vec<Arc<dyn CallTranslator>>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        Self { translators: Vec::new() }
    }

    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        register_builtins(&mut reg);
        reg
    }

    /// Appends a translator after every existing one.
    pub fn register<T>(&mut self, translator: T)
    where
        T: CallTranslator + 'static,
    {
        self.translators.push(Arc::new(translator));
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }

    /// Translator names in probe order.
    pub fn names(&self) -> Vec<&'static str> {
        self.translators.iter().map(|t| t.name()).collect()
    }

    /// First translator whose matcher accepts `node`.
    pub fn find(&self, node: &CallExpr) -> Option<&dyn CallTranslator> {
        self.translators
            .iter()
            .find(|t| {
                let hit = t.matches(node);
                trace!(translator = t.name(), method = %node.method, hit, "probed translator");
                hit
            })
            .map(|t| &**t)
    }

    pub fn translate(
        &self,
        mapping: &dyn DocumentMapping,
        serializer: &dyn Serializer,
        node: &CallExpr,
    ) -> Result<FilterFragment, TranslateError> {
        match self.find(node) {
            Some(translator) => {
                let fragment = translator.translate(mapping, serializer, node)?;
                debug!(
                    translator = translator.name(),
                    template = fragment.template(),
                    args = fragment.arguments().len(),
                    "translated {}",
                    node
                );
                Ok(fragment)
            }
            None => {
                let receiver = node.receiver_type_name();
                warn!(method = %node.method, %receiver, "no translator for call");
                Err(TranslateError::UnrecognizedExpression {
                    method: node.method.clone(),
                    receiver,
                })
            }
        }
    }
}

impl Default for TranslatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Clone for TranslatorRegistry {
    fn clone(&self) -> Self {
        Self {
            translators: self.translators.clone(),
        }
    }
}

/// Registers the built-ins in their documented order.
pub fn register_builtins(reg: &mut TranslatorRegistry) {
    reg.register(StringContains::new());
    reg.register(StringStartsWith::new());
    reg.register(StringEndsWith::new());
    reg.register(EnumerableContains::new());
}
