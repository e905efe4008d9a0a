//! Name-to-factory registry searched in a fixed namespace order.
//!
//! Resolution walks the namespaces in the order they were added and returns
//! the first entry whose name matches exactly. A name defined in more than
//! one namespace is a collision: the earliest namespace still wins, but the
//! shadowing is reported by [`Registry::collisions`] and logged at resolve
//! time.
use std::fmt;
use std::sync::OnceLock;

use log::{debug, warn};

use crate::error::ResolutionError;
use crate::models::{builtin_namespace, Factory, SEARCH_ORDER};

/// A named group of model factories.
#[derive(Clone)]
pub struct Namespace {
    name: String,
    models: Vec<(String, Factory)>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: Vec::new(),
        }
    }

    /// Register `factory` under `model`. Re-registering a name replaces the
    /// previous factory.
    pub fn with_model(mut self, model: impl Into<String>, factory: Factory) -> Self {
        let model = model.into();
        match self.models.iter_mut().find(|(name, _)| *name == model) {
            Some(entry) => entry.1 = factory,
            None => self.models.push((model, factory)),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, model: &str) -> Option<Factory> {
        self.models
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, factory)| *factory)
    }

    pub fn contains(&self, model: &str) -> bool {
        self.get(model).is_some()
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("name", &self.name)
            .field("models", &self.model_names().collect::<Vec<_>>())
            .finish()
    }
}

/// The outcome of a successful lookup.
#[derive(Clone, Copy)]
pub struct Resolved<'r> {
    pub namespace: &'r str,
    pub factory: Factory,
}

/// A model name defined by more than one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub model: String,
    /// Defining namespaces in search order; the first one wins.
    pub namespaces: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Registry {
    namespaces: Vec<Namespace>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in namespaces in [`SEARCH_ORDER`].
    pub fn builtin() -> Self {
        SEARCH_ORDER
            .iter()
            .fold(Self::new(), |registry, &name| {
                registry.with_namespace(builtin_namespace(name))
            })
    }

    /// Shared built-in registry, built on first use.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::builtin)
    }

    /// Append `namespace` at the lowest priority.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn namespace_names(&self) -> Vec<String> {
        self.namespaces.iter().map(|ns| ns.name().to_string()).collect()
    }

    /// Every `(namespace, model)` pair in search order.
    pub fn model_names(&self) -> Vec<(&str, &str)> {
        self.namespaces
            .iter()
            .flat_map(|ns| ns.model_names().map(move |model| (ns.name(), model)))
            .collect()
    }

    /// Find the first namespace defining `model`.
    pub fn resolve(&self, model: &str) -> Result<Resolved<'_>, ResolutionError> {
        let position = self
            .namespaces
            .iter()
            .position(|ns| ns.contains(model))
            .ok_or_else(|| ResolutionError {
                name: model.to_string(),
                searched: self.namespace_names(),
            })?;

        let chosen = &self.namespaces[position];
        let shadowed: Vec<&str> = self.namespaces[position + 1..]
            .iter()
            .filter(|ns| ns.contains(model))
            .map(|ns| ns.name())
            .collect();
        if !shadowed.is_empty() {
            warn!(
                "Model '{}' is defined in several namespaces; using '{}', shadowing {:?}",
                model,
                chosen.name(),
                shadowed
            );
        }
        debug!("Resolved model '{}' in namespace '{}'", model, chosen.name());

        // `position` came from a namespace that contains `model`.
        let factory = chosen.get(model).ok_or_else(|| ResolutionError {
            name: model.to_string(),
            searched: self.namespace_names(),
        })?;
        Ok(Resolved {
            namespace: chosen.name(),
            factory,
        })
    }

    /// Model names defined in more than one namespace.
    pub fn collisions(&self) -> Vec<Collision> {
        let mut collisions: Vec<Collision> = Vec::new();
        for (model_ns, model) in self.model_names() {
            if let Some(existing) = collisions.iter_mut().find(|c| c.model == model) {
                if !existing.namespaces.iter().any(|ns| ns == model_ns) {
                    existing.namespaces.push(model_ns.to_string());
                }
                continue;
            }
            collisions.push(Collision {
                model: model.to_string(),
                namespaces: vec![model_ns.to_string()],
            });
        }
        collisions.retain(|c| c.namespaces.len() > 1);
        collisions
    }
}
