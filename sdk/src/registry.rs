use crate::{naming, template::TemplateGenerator, traits::Generator};
use minijinja::Environment;

use std::collections::BTreeMap;
use std::sync::Arc;

/// Backend used by generator entries that do not name one.
pub const DEFAULT_GENERATOR: &str = "template";

pub type GeneratorFactory = Arc<dyn Fn() -> Box<dyn Generator> + Send + Sync>;

/// Maps the `generator_class` named in a genspec to a backend constructor.
#[derive(Clone)]
pub struct GeneratorRegistry {
    factories: BTreeMap<String, GeneratorFactory>,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        let mut registry = GeneratorRegistry { factories: BTreeMap::new() };
        registry.register(DEFAULT_GENERATOR, || {
            Box::new(TemplateGenerator::new(HelperRegistry::default())) as Box<dyn Generator>
        });
        registry
    }
}

impl GeneratorRegistry {
    /// A registry with no backends at all, not even the default one.
    pub fn empty() -> Self {
        GeneratorRegistry { factories: BTreeMap::new() }
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Generator> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
    }

    /// Instantiates `name`, or the default backend when `name` is `None`.
    pub fn create(&self, name: Option<&str>) -> Option<Box<dyn Generator>> {
        let name = name.unwrap_or(DEFAULT_GENERATOR);
        self.factories.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

pub type HelperInstaller = Arc<dyn Fn(&mut Environment<'_>) + Send + Sync>;

/// Named sets of template filters and functions, selected by the values of
/// a `helper_classes` section.
#[derive(Clone)]
pub struct HelperRegistry {
    helpers: BTreeMap<String, HelperInstaller>,
}

impl Default for HelperRegistry {
    fn default() -> Self {
        let mut registry = HelperRegistry { helpers: BTreeMap::new() };
        registry.register("naming", naming::install);
        registry
    }
}

impl HelperRegistry {
    pub fn register<F>(&mut self, name: &str, install: F)
    where
        F: Fn(&mut Environment<'_>) + Send + Sync + 'static,
    {
        self.helpers.insert(name.to_string(), Arc::new(install));
    }

    pub fn get(&self, name: &str) -> Option<&HelperInstaller> {
        self.helpers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backend() {
        let registry = GeneratorRegistry::default();
        assert!(registry.create(None).is_some());
        assert!(registry.create(Some("template")).is_some());
        assert!(registry.create(Some("com.example.Missing")).is_none());
        assert!(GeneratorRegistry::empty().create(None).is_none());
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = GeneratorRegistry::default();
        registry.register("rust", || Box::new(TemplateGenerator::new(HelperRegistry::default())) as Box<dyn Generator>);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["rust", "template"]);
        assert_eq!(GeneratorRegistry::empty().names().count(), 0);
    }

    #[test]
    fn test_default_helpers() {
        let helpers = HelperRegistry::default();
        assert!(helpers.get("naming").is_some());
        assert!(helpers.get("velocity").is_none());
    }
}
