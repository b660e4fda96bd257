//! Info, Contact and License objects.

use crate::factory::{self, FactoryFn, FieldConfig, ObjectConfig};
use crate::node::Node;
use crate::type_checker::ValueType;
use crate::validation::NamedRule;
use once_cell::sync::Lazy;

static INFO: Lazy<FactoryFn> = Lazy::new(|| {
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(FieldConfig::new("title").required().input_type(ValueType::String))
            .field(FieldConfig::new("summary").input_type(ValueType::String))
            .field(FieldConfig::new("description").input_type(ValueType::String))
            .field(
                FieldConfig::new("termsOfService")
                    .input_type(ValueType::String)
                    .validate(NamedRule::Url),
            )
            .field(FieldConfig::new("contact").factory(contact_factory()))
            .field(FieldConfig::new("license").factory(license_factory()))
            .field(FieldConfig::new("version").required().input_type(ValueType::String)),
    )
});

static CONTACT: Lazy<FactoryFn> = Lazy::new(|| {
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(FieldConfig::new("name").input_type(ValueType::String))
            .field(
                FieldConfig::new("url")
                    .input_type(ValueType::String)
                    .validate(NamedRule::Url),
            )
            .field(
                FieldConfig::new("email")
                    .input_type(ValueType::String)
                    .validate(NamedRule::Email),
            ),
    )
});

static LICENSE: Lazy<FactoryFn> = Lazy::new(|| {
    factory::object(
        ObjectConfig::new()
            .allow_extensions()
            .field(FieldConfig::new("name").required().input_type(ValueType::String))
            .field(FieldConfig::new("identifier").input_type(ValueType::String))
            .field(
                FieldConfig::new("url")
                    .input_type(ValueType::String)
                    .validate(NamedRule::Url),
            ),
    )
});

pub fn info_factory() -> FactoryFn {
    INFO.clone()
}

pub fn contact_factory() -> FactoryFn {
    CONTACT.clone()
}

pub fn license_factory() -> FactoryFn {
    LICENSE.clone()
}

/// Metadata about the API.
#[derive(Debug, Clone)]
pub struct Info(Node);

impl Info {
    pub fn new(node: Node) -> Self {
        Self(node)
    }

    pub fn node(&self) -> &Node {
        &self.0
    }

    pub fn title(&self) -> &str {
        self.0.get_str("title").unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        self.0.get_str("version").unwrap_or_default()
    }

    pub fn summary(&self) -> Option<&str> {
        self.0.get_str("summary")
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get_str("description")
    }

    pub fn terms_of_service(&self) -> Option<&str> {
        self.0.get_str("termsOfService")
    }

    pub fn contact(&self) -> Option<Contact> {
        self.0.get_node("contact").cloned().map(Contact)
    }

    pub fn license(&self) -> Option<License> {
        self.0.get_node("license").cloned().map(License)
    }
}

#[derive(Debug, Clone)]
pub struct Contact(Node);

impl Contact {
    pub fn name(&self) -> Option<&str> {
        self.0.get_str("name")
    }

    pub fn url(&self) -> Option<&str> {
        self.0.get_str("url")
    }

    pub fn email(&self) -> Option<&str> {
        self.0.get_str("email")
    }
}

#[derive(Debug, Clone)]
pub struct License(Node);

impl License {
    pub fn name(&self) -> &str {
        self.0.get_str("name").unwrap_or_default()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.0.get_str("identifier")
    }

    pub fn url(&self) -> Option<&str> {
        self.0.get_str("url")
    }
}
