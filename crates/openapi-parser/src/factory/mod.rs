//! Node factories.
//!
//! A factory is bound to one [`Context`] and a shared configuration. It
//! answers four questions about that region of the document, each computed
//! once on first access:
//!
//! - `errors()`: every violation in the region, never failing
//! - `node()`: the validated node, or the first violation
//! - `resolved_input()`: the input with references replaced by their targets
//! - `is_valid()`
//!
//! Checks inside one container always run in the same order (shape, keys,
//! values, hook, then children), so `node()` fails on the first entry
//! `errors()` would list.

mod array;
mod map;
mod object;
mod reference;

pub use array::{ArrayConfig, ArrayFactory};
pub use map::{MapConfig, MapFactory};
pub use object::{FieldConfig, ObjectConfig, ObjectFactory};
pub use reference::{ReferenceFactory, referenceable};

use crate::context::Context;
use crate::error::{ErrorCollection, Result};
use crate::node::Value;
use crate::raw::RawValue;
use crate::type_checker::ValueType;
use std::sync::Arc;

/// Validates and materializes one region of a document.
pub trait NodeFactory: Send + Sync {
    fn context(&self) -> &Context;

    /// All violations in this region, in check order.
    fn errors(&self) -> &ErrorCollection;

    /// The validated node; `Ok(None)` for an absent input without default.
    fn node(&self) -> Result<Option<Value>>;

    /// Input-shaped echo with every followed reference replaced.
    fn resolved_input(&self) -> Option<RawValue>;

    fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }
}

/// Builds a factory for a context.
pub type FactoryFn = Arc<dyn Fn(Context) -> Box<dyn NodeFactory> + Send + Sync>;

pub fn map(config: MapConfig) -> FactoryFn {
    let config = Arc::new(config);
    Arc::new(move |context: Context| -> Box<dyn NodeFactory> {
        Box::new(MapFactory::new(context, Arc::clone(&config)))
    })
}

pub fn array(config: ArrayConfig) -> FactoryFn {
    let config = Arc::new(config);
    Arc::new(move |context: Context| -> Box<dyn NodeFactory> {
        Box::new(ArrayFactory::new(context, Arc::clone(&config)))
    })
}

pub fn object(config: ObjectConfig) -> FactoryFn {
    let config = Arc::new(config);
    Arc::new(move |context: Context| -> Box<dyn NodeFactory> {
        Box::new(ObjectFactory::new(context, Arc::clone(&config)))
    })
}

/// Carry a value of type `scalar` as is and hand anything else to `factory`.
///
/// Used for fields such as `additionalProperties` that take either a flag
/// or a nested object.
pub fn scalar_or(scalar: ValueType, factory: FactoryFn) -> FactoryFn {
    Arc::new(move |context: Context| -> Box<dyn NodeFactory> {
        if context.input().is_some_and(|input| scalar.matches(input)) {
            Box::new(ScalarFactory {
                context,
                errors: ErrorCollection::new(),
            })
        } else {
            factory(context)
        }
    })
}

struct ScalarFactory {
    context: Context,
    errors: ErrorCollection,
}

impl NodeFactory for ScalarFactory {
    fn context(&self) -> &Context {
        &self.context
    }

    fn errors(&self) -> &ErrorCollection {
        &self.errors
    }

    fn node(&self) -> Result<Option<Value>> {
        Ok(self.context.input().cloned().map(Value::Raw))
    }

    fn resolved_input(&self) -> Option<RawValue> {
        self.context.input().cloned()
    }
}

/// A child slot of a container: delegated to a factory or carried raw.
pub(crate) enum Field {
    Factory(Box<dyn NodeFactory>),
    Raw(RawValue),
    /// An extension field, never checked
    Extension(RawValue),
}

impl Field {
    pub(crate) fn errors(&self) -> Option<&ErrorCollection> {
        match self {
            Field::Factory(factory) => Some(factory.errors()),
            Field::Raw(_) | Field::Extension(_) => None,
        }
    }

    pub(crate) fn node(&self) -> Result<Option<Value>> {
        match self {
            Field::Factory(factory) => factory.node(),
            Field::Raw(raw) | Field::Extension(raw) => Ok(Some(Value::Raw(raw.clone()))),
        }
    }

    pub(crate) fn resolved_input(&self) -> RawValue {
        match self {
            Field::Factory(factory) => factory.resolved_input().unwrap_or(RawValue::Null),
            Field::Raw(raw) | Field::Extension(raw) => raw.clone(),
        }
    }
}
