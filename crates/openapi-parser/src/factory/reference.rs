//! Fields that may hold a `$ref` instead of a value.

use super::{FactoryFn, NodeFactory};
use crate::context::{Context, Location};
use crate::error::{Error, ErrorCollection, Result, ValidationError, ValidationErrorKind};
use crate::node::{Placeholder, Value};
use crate::raw::RawValue;
use crate::reference::Reference;
use crate::source::{ResolvedReference, Source};
use crate::type_checker::{ValueType, validate_type};
use crate::validation::Validatable;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

/// Wrap a factory so its input may also be a `{"$ref": "..."}` mapping.
pub fn referenceable(builder: FactoryFn) -> FactoryFn {
    Arc::new(move |context: Context| -> Box<dyn NodeFactory> {
        Box::new(ReferenceFactory::new(context, Arc::clone(&builder)))
    })
}

enum Resolution {
    Target(Box<dyn NodeFactory>),
    Recursive(Placeholder),
    /// `$ref` is not a string
    Invalid(ValidationError),
    Failed(Error),
}

/// Builds its input directly, or follows the reference it holds.
///
/// References are followed on first use. A reference back into data that
/// is already being built stops the descent: it contributes no errors and
/// its node is a [`Placeholder`]. A chain of references that only ever
/// leads to more references is a reference cycle and fails.
pub struct ReferenceFactory {
    context: Context,
    builder: FactoryFn,
    direct: Option<Box<dyn NodeFactory>>,
    resolution: OnceCell<Resolution>,
    errors: OnceCell<ErrorCollection>,
}

impl ReferenceFactory {
    pub fn new(context: Context, builder: FactoryFn) -> Self {
        let direct = if is_reference(context.input()) {
            None
        } else {
            Some(builder(context.clone()))
        };
        Self {
            context,
            builder,
            direct,
            resolution: OnceCell::new(),
            errors: OnceCell::new(),
        }
    }

    /// The `$ref` string, when the input is a reference.
    pub fn reference(&self) -> Option<&str> {
        self.context.input()?.as_map()?.get("$ref")?.as_str()
    }

    pub fn is_reference(&self) -> bool {
        self.direct.is_none()
    }

    /// Whether the reference leads back into data already being built.
    pub fn is_recursive(&self) -> bool {
        self.direct.is_none() && matches!(self.resolution(), Resolution::Recursive(_))
    }

    fn resolution(&self) -> &Resolution {
        self.resolution.get_or_init(|| self.resolve())
    }

    fn resolve(&self) -> Resolution {
        let ref_context = self.context.next_field("$ref");
        let mut validatable = Validatable::new(ref_context.clone());
        if !validate_type(&mut validatable, &ref_context, ValueType::String) {
            return match validatable.errors().first() {
                Some(error) => Resolution::Invalid(error.clone()),
                None => Resolution::Failed(Error::reference("invalid $ref")),
            };
        }
        let Some(pointer) = ref_context.input().and_then(RawValue::as_str) else {
            return Resolution::Failed(Error::reference("invalid $ref"));
        };
        let reference = Reference::parse(pointer);
        self.follow(&reference).unwrap_or_else(|err| {
            debug!(reference = %reference, error = %err, "reference failed");
            Resolution::Failed(err)
        })
    }

    fn follow(&self, reference: &Reference) -> Result<Resolution> {
        let source = self.context.source().resolve_source(reference)?;
        let resolved = source.resolve_reference(&reference.anchor())?;
        if is_reference_cycle(&source, &resolved) {
            return Err(Error::reference(format!("Reference cycle detected: {}", reference)));
        }
        let recursive = self.context.is_recursive(&source, &resolved.pointer);
        debug!(
            reference = %reference,
            from = %self.context.location_summary(),
            recursive,
            "following reference"
        );
        let target = self.context.resolved_reference(source, resolved);
        if recursive {
            let raw = self.context.input().cloned().unwrap_or(RawValue::Null);
            return Ok(Resolution::Recursive(Placeholder::new(
                raw,
                target,
                referenceable(Arc::clone(&self.builder)),
            )));
        }
        Ok(Resolution::Target(Box::new(ReferenceFactory::new(
            target,
            Arc::clone(&self.builder),
        ))))
    }
}

/// Whether following `$ref`s from `target` only reaches further `$ref`s
/// and comes back to one already seen.
fn is_reference_cycle(source: &Arc<Source>, target: &ResolvedReference) -> bool {
    let mut seen = vec![Location {
        source: Arc::clone(source),
        pointer: target.pointer.clone(),
    }];
    let mut source = Arc::clone(source);
    let mut value = target.value.clone();
    loop {
        let Some(next) = value.as_map().and_then(|map| map.get("$ref")).and_then(RawValue::as_str) else {
            return false;
        };
        let reference = Reference::parse(next);
        let Ok(next_source) = source.resolve_source(&reference) else {
            return false;
        };
        let Ok(resolved) = next_source.resolve_reference(&reference.anchor()) else {
            return false;
        };
        let location = Location {
            source: Arc::clone(&next_source),
            pointer: resolved.pointer,
        };
        if seen.contains(&location) {
            return true;
        }
        seen.push(location);
        source = next_source;
        value = resolved.value;
    }
}

fn is_reference(input: Option<&RawValue>) -> bool {
    input
        .and_then(RawValue::as_map)
        .is_some_and(|map| map.contains_key("$ref"))
}

impl NodeFactory for ReferenceFactory {
    fn context(&self) -> &Context {
        &self.context
    }

    fn errors(&self) -> &ErrorCollection {
        if let Some(direct) = &self.direct {
            return direct.errors();
        }
        match self.resolution() {
            Resolution::Target(target) => target.errors(),
            Resolution::Recursive(_) => self.errors.get_or_init(ErrorCollection::new),
            Resolution::Invalid(error) => self.errors.get_or_init(|| [error.clone()].into_iter().collect()),
            Resolution::Failed(err) => self.errors.get_or_init(|| {
                [self.context.error(ValidationErrorKind::Reference {
                    message: err.to_string(),
                })]
                .into_iter()
                .collect()
            }),
        }
    }

    fn node(&self) -> Result<Option<Value>> {
        if let Some(direct) = &self.direct {
            return direct.node();
        }
        match self.resolution() {
            Resolution::Target(target) => target.node(),
            Resolution::Recursive(placeholder) => Ok(Some(Value::Recursive(placeholder.clone()))),
            Resolution::Invalid(error) => Err(Error::invalid_data(error)),
            Resolution::Failed(err) => Err(err.clone()),
        }
    }

    fn resolved_input(&self) -> Option<RawValue> {
        if let Some(direct) = &self.direct {
            return direct.resolved_input();
        }
        match self.resolution() {
            Resolution::Target(target) => target.resolved_input(),
            _ => self.context.input().cloned(),
        }
    }
}
