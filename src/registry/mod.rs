//! Capability registry.
//!
//! One table per category, keyed by name (tools, prompts) or URI
//! (resources). Each entry pairs an immutable descriptor with the function
//! that serves it. The registry is filled once at startup and only read
//! afterwards; the dispatcher shares it behind an `Arc`.
//!
//! Insertion order is preserved so listings are stable across calls.

pub mod schema;

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::mcp::types::GetPromptResult;
use crate::tools::ToolFault;

pub use schema::{Arguments, InputSchema, ParamSpec, ParamType, SchemaViolation};

/// Executes a tool against validated arguments.
pub type ToolHandler = fn(&Arguments) -> Result<String, ToolFault>;

/// Produces the payload of a resource.
pub type ResourceReader = fn() -> Result<String, ToolFault>;

/// Renders a prompt from validated arguments.
pub type PromptRenderer = fn(&Arguments) -> Result<GetPromptResult, ToolFault>;

/// The three kinds of capability a server advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Invocable tools.
    Tools,
    /// Readable resources.
    Resources,
    /// Renderable prompts.
    Prompts,
}

impl Category {
    /// All categories, in advertisement order.
    pub const ALL: [Self; 3] = [Self::Tools, Self::Resources, Self::Prompts];

    /// Lower-case category name as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tools => "tools",
            Self::Resources => "resources",
            Self::Prompts => "prompts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from registration and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A capability with this key is already registered.
    #[error("{category} capability '{name}' is already registered")]
    Duplicate {
        /// Category of the rejected capability.
        category: Category,
        /// Duplicated key.
        name: String,
    },

    /// No capability with this key exists.
    #[error("unknown {category} capability '{name}'")]
    NotFound {
        /// Category searched.
        category: Category,
        /// Key that was not found.
        name: String,
    },
}

/// Describes a tool for `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Argument contract.
    pub input_schema: InputSchema,
}

/// Describes a resource for `resources/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Unique `scheme://identifier` key.
    pub uri: String,
    /// Display name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// MIME type of the payload.
    pub mime_type: String,
}

/// One declared prompt argument. Prompt arguments are always strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptArgument {
    /// Argument name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Whether the argument must be supplied.
    pub required: bool,
}

/// Describes a prompt for `prompts/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptDescriptor {
    /// Unique prompt name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared arguments.
    pub arguments: Vec<PromptArgument>,
}

impl PromptDescriptor {
    /// Checks `args` against the declared arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaViolation`] if a required argument is missing or a
    /// declared argument is not a string.
    pub fn validate(&self, args: &Arguments) -> Result<(), SchemaViolation> {
        let schema = self.arguments.iter().fold(InputSchema::new(), |schema, arg| {
            let spec = ParamSpec::string(arg.name.as_str());
            schema.param(if arg.required { spec.required() } else { spec })
        });
        schema.validate(args)
    }
}

/// A registered tool.
#[derive(Debug, Clone)]
pub struct ToolEntry {
    /// Advertised descriptor.
    pub descriptor: ToolDescriptor,
    /// Implementation.
    pub handler: ToolHandler,
}

/// A registered resource.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    /// Advertised descriptor.
    pub descriptor: ResourceDescriptor,
    /// Implementation.
    pub reader: ResourceReader,
}

/// A registered prompt.
#[derive(Debug, Clone)]
pub struct PromptEntry {
    /// Advertised descriptor.
    pub descriptor: PromptDescriptor,
    /// Implementation.
    pub renderer: PromptRenderer,
}

/// The unit of registration: one capability of any category.
#[derive(Debug, Clone)]
pub enum Capability {
    /// A tool.
    Tool(ToolEntry),
    /// A resource.
    Resource(ResourceEntry),
    /// A prompt.
    Prompt(PromptEntry),
}

impl Capability {
    /// Category this capability belongs to.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Tool(_) => Category::Tools,
            Self::Resource(_) => Category::Resources,
            Self::Prompt(_) => Category::Prompts,
        }
    }
}

impl From<ToolEntry> for Capability {
    fn from(entry: ToolEntry) -> Self {
        Self::Tool(entry)
    }
}

impl From<ResourceEntry> for Capability {
    fn from(entry: ResourceEntry) -> Self {
        Self::Resource(entry)
    }
}

impl From<PromptEntry> for Capability {
    fn from(entry: PromptEntry) -> Self {
        Self::Prompt(entry)
    }
}

/// A borrowed descriptor of any category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Descriptor<'a> {
    /// Tool descriptor.
    Tool(&'a ToolDescriptor),
    /// Resource descriptor.
    Resource(&'a ResourceDescriptor),
    /// Prompt descriptor.
    Prompt(&'a PromptDescriptor),
}

impl<'a> Descriptor<'a> {
    /// The key this descriptor is registered under.
    #[must_use]
    pub fn key(&self) -> &'a str {
        match *self {
            Self::Tool(d) => &d.name,
            Self::Resource(d) => &d.uri,
            Self::Prompt(d) => &d.name,
        }
    }

    /// Category of the descriptor.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Tool(_) => Category::Tools,
            Self::Resource(_) => Category::Resources,
            Self::Prompt(_) => Category::Prompts,
        }
    }
}

/// Category → key → {descriptor, handler}.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tools: IndexMap<String, ToolEntry>,
    resources: IndexMap<String, ResourceEntry>,
    prompts: IndexMap<String, PromptEntry>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a capability.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the key is already taken
    /// within the capability's category. The registry is left unchanged.
    pub fn register(&mut self, capability: impl Into<Capability>) -> Result<(), RegistryError> {
        let capability = capability.into();
        let category = capability.category();

        match capability {
            Capability::Tool(entry) => {
                insert_unique(&mut self.tools, category, entry.descriptor.name.clone(), entry)
            }
            Capability::Resource(entry) => insert_unique(
                &mut self.resources,
                category,
                entry.descriptor.uri.clone(),
                entry,
            ),
            Capability::Prompt(entry) => insert_unique(
                &mut self.prompts,
                category,
                entry.descriptor.name.clone(),
                entry,
            ),
        }
    }

    /// Lists the descriptors of a category in registration order.
    #[must_use]
    pub fn list(&self, category: Category) -> Vec<Descriptor<'_>> {
        match category {
            Category::Tools => self
                .tools
                .values()
                .map(|e| Descriptor::Tool(&e.descriptor))
                .collect(),
            Category::Resources => self
                .resources
                .values()
                .map(|e| Descriptor::Resource(&e.descriptor))
                .collect(),
            Category::Prompts => self
                .prompts
                .values()
                .map(|e| Descriptor::Prompt(&e.descriptor))
                .collect(),
        }
    }

    /// Looks up a descriptor by category and key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if nothing is registered under
    /// `name` in `category`.
    pub fn resolve(&self, category: Category, name: &str) -> Result<Descriptor<'_>, RegistryError> {
        let found = match category {
            Category::Tools => self.tools.get(name).map(|e| Descriptor::Tool(&e.descriptor)),
            Category::Resources => self
                .resources
                .get(name)
                .map(|e| Descriptor::Resource(&e.descriptor)),
            Category::Prompts => self
                .prompts
                .get(name)
                .map(|e| Descriptor::Prompt(&e.descriptor)),
        };
        found.ok_or_else(|| not_found(category, name))
    }

    /// Looks up a tool entry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown names.
    pub fn tool(&self, name: &str) -> Result<&ToolEntry, RegistryError> {
        self.tools
            .get(name)
            .ok_or_else(|| not_found(Category::Tools, name))
    }

    /// Looks up a resource entry by URI.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown URIs.
    pub fn resource(&self, uri: &str) -> Result<&ResourceEntry, RegistryError> {
        self.resources
            .get(uri)
            .ok_or_else(|| not_found(Category::Resources, uri))
    }

    /// Looks up a prompt entry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for unknown names.
    pub fn prompt(&self, name: &str) -> Result<&PromptEntry, RegistryError> {
        self.prompts
            .get(name)
            .ok_or_else(|| not_found(Category::Prompts, name))
    }

    /// Number of capabilities registered in `category`.
    #[must_use]
    pub fn len(&self, category: Category) -> usize {
        match category {
            Category::Tools => self.tools.len(),
            Category::Resources => self.resources.len(),
            Category::Prompts => self.prompts.len(),
        }
    }

    /// Returns `true` if no capability of any category is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.resources.is_empty() && self.prompts.is_empty()
    }
}

fn insert_unique<E>(
    table: &mut IndexMap<String, E>,
    category: Category,
    key: String,
    entry: E,
) -> Result<(), RegistryError> {
    if table.contains_key(&key) {
        return Err(RegistryError::Duplicate {
            category,
            name: key,
        });
    }
    table.insert(key, entry);
    Ok(())
}

fn not_found(category: Category, name: &str) -> RegistryError {
    RegistryError::NotFound {
        category,
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::unnecessary_wraps)]
    fn shout(args: &Arguments) -> Result<String, ToolFault> {
        Ok(args
            .get("text")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_uppercase())
    }

    fn shout_entry(name: &str) -> ToolEntry {
        ToolEntry {
            descriptor: ToolDescriptor {
                name: name.to_string(),
                description: "Upper-cases text".to_string(),
                input_schema: InputSchema::new().param(ParamSpec::string("text").required()),
            },
            handler: shout,
        }
    }

    #[allow(clippy::unnecessary_wraps)]
    fn banner() -> Result<String, ToolFault> {
        Ok("banner".to_string())
    }

    fn banner_entry(uri: &str) -> ResourceEntry {
        ResourceEntry {
            descriptor: ResourceDescriptor {
                uri: uri.to_string(),
                name: "Banner".to_string(),
                description: "A banner".to_string(),
                mime_type: "text/plain".to_string(),
            },
            reader: banner,
        }
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = Registry::new();
        registry.register(shout_entry("shout")).unwrap();

        let descriptor = registry.resolve(Category::Tools, "shout").unwrap();
        assert_eq!(descriptor.key(), "shout");
        assert_eq!(descriptor.category(), Category::Tools);
    }

    #[test]
    fn duplicate_rejected_within_category() {
        let mut registry = Registry::new();
        registry.register(shout_entry("shout")).unwrap();

        let err = registry.register(shout_entry("shout")).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Duplicate {
                category: Category::Tools,
                name: "shout".to_string()
            }
        );
        assert_eq!(registry.len(Category::Tools), 1);
    }

    #[test]
    fn same_key_allowed_across_categories() {
        let mut registry = Registry::new();
        registry.register(shout_entry("x://same")).unwrap();
        registry.register(banner_entry("x://same")).unwrap();
        assert_eq!(registry.len(Category::Tools), 1);
        assert_eq!(registry.len(Category::Resources), 1);
    }

    #[test]
    fn not_found_is_distinct() {
        let registry = Registry::new();
        let err = registry.resolve(Category::Prompts, "missing").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
        assert_eq!(err.to_string(), "unknown prompts capability 'missing'");
        assert!(registry.tool("missing").is_err());
        assert!(registry.resource("missing").is_err());
        assert!(registry.prompt("missing").is_err());
    }

    #[test]
    fn list_preserves_registration_order() {
        let mut registry = Registry::new();
        for name in ["zeta", "alpha", "mu"] {
            registry.register(shout_entry(name)).unwrap();
        }
        let keys: Vec<&str> = registry
            .list(Category::Tools)
            .iter()
            .map(|d| d.key())
            .collect();
        assert_eq!(keys, ["zeta", "alpha", "mu"]);
    }

    #[test]
    fn empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        for category in Category::ALL {
            assert!(registry.list(category).is_empty());
        }
    }

    #[test]
    fn descriptors_serialise_untagged() {
        let mut registry = Registry::new();
        registry.register(shout_entry("shout")).unwrap();
        registry.register(banner_entry("text://banner")).unwrap();

        let tools = serde_json::to_value(registry.list(Category::Tools)).unwrap();
        assert_eq!(tools[0]["name"], "shout");
        assert_eq!(tools[0]["inputSchema"]["required"][0], "text");

        let resources = serde_json::to_value(registry.list(Category::Resources)).unwrap();
        assert_eq!(resources[0]["uri"], "text://banner");
        assert_eq!(resources[0]["mimeType"], "text/plain");
    }

    #[test]
    fn prompt_argument_validation() {
        let descriptor = PromptDescriptor {
            name: "p".to_string(),
            description: String::new(),
            arguments: vec![
                PromptArgument {
                    name: "who".to_string(),
                    description: String::new(),
                    required: true,
                },
                PromptArgument {
                    name: "mood".to_string(),
                    description: String::new(),
                    required: false,
                },
            ],
        };

        let ok = serde_json::json!({"who": "Ana"});
        assert!(descriptor.validate(ok.as_object().unwrap()).is_ok());

        let missing = serde_json::json!({"mood": "calm"});
        assert!(matches!(
            descriptor.validate(missing.as_object().unwrap()),
            Err(SchemaViolation::Missing { .. })
        ));

        let wrong = serde_json::json!({"who": 3});
        assert!(matches!(
            descriptor.validate(wrong.as_object().unwrap()),
            Err(SchemaViolation::WrongType { .. })
        ));
    }
}
