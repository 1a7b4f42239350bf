//! Assembles the registry of built-in capabilities.

use crate::registry::{Registry, RegistryError};
use crate::{prompts, resources, tools};

/// Builds a registry holding every built-in tool, resource and prompt.
///
/// # Errors
///
/// Returns [`RegistryError::Duplicate`] if two built-ins share a key.
pub fn builtin_registry() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();

    for entry in tools::entries() {
        registry.register(entry)?;
    }
    for entry in resources::entries() {
        registry.register(entry)?;
    }
    for entry in prompts::entries() {
        registry.register(entry)?;
    }

    tracing::debug!(
        tools = registry.len(crate::registry::Category::Tools),
        resources = registry.len(crate::registry::Category::Resources),
        prompts = registry.len(crate::registry::Category::Prompts),
        "Capability registry built"
    );

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Category;

    #[test]
    fn builtins_register_cleanly() {
        let registry = builtin_registry().unwrap();
        assert_eq!(registry.len(Category::Tools), 5);
        assert_eq!(registry.len(Category::Resources), 2);
        assert_eq!(registry.len(Category::Prompts), 1);
    }

    #[test]
    fn every_listed_name_resolves_to_itself() {
        let registry = builtin_registry().unwrap();
        for category in Category::ALL {
            for descriptor in registry.list(category) {
                let resolved = registry.resolve(category, descriptor.key()).unwrap();
                assert_eq!(resolved.key(), descriptor.key());
            }
        }
    }
}
