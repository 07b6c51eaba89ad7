use serde::{Deserialize, Serialize};

/// An OGC (or custom) service registered on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// The host's service registry.
pub trait ServiceRegistry: Send + Sync {
    /// Registered service with exactly this name.
    fn get_service(&self, name: &str) -> Option<ServiceDescriptor>;
}

/// Registry with a fixed set of services, as described by the host manifest.
#[derive(Debug, Clone, Default)]
pub struct StaticServiceRegistry {
    services: Vec<ServiceDescriptor>,
}

impl StaticServiceRegistry {
    pub fn new(services: Vec<ServiceDescriptor>) -> Self {
        Self { services }
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceRegistry for StaticServiceRegistry {
    fn get_service(&self, name: &str) -> Option<ServiceDescriptor> {
        self.services.iter().find(|s| s.name == name).cloned()
    }
}
