use std::collections::BTreeMap;

use super::domain::{Resource, ResourceId, ResourceKind, ResourceRecord};

/// Lookup failures against the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("resource {0} not found")]
    NotFound(ResourceId),
    #[error("no {0} computers available")]
    NoResourceAvailable(ResourceKind),
    #[error("resource {0} registered twice")]
    Duplicate(ResourceId),
}

/// Fixed set of lab computers keyed by number. Populated once at setup and
/// read-only afterwards; ordering by id keeps kind scans deterministic.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<ResourceId, Resource>,
}

impl ResourceRegistry {
    pub fn new<I>(records: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = ResourceRecord>,
    {
        let mut resources = BTreeMap::new();
        for record in records {
            let id = record.id;
            if resources.insert(id, Resource::from(record)).is_some() {
                return Err(RegistryError::Duplicate(id));
            }
        }
        Ok(Self { resources })
    }

    pub fn get(&self, id: ResourceId) -> Result<&Resource, RegistryError> {
        self.resources.get(&id).ok_or(RegistryError::NotFound(id))
    }

    /// First resource of `kind` in ascending id order.
    pub fn first_of_kind(&self, kind: ResourceKind) -> Result<&Resource, RegistryError> {
        self.resources
            .values()
            .find(|resource| resource.kind == kind)
            .ok_or(RegistryError::NoResourceAvailable(kind))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }
}
