//! Services: the places a synthetic user can be in

use serde::{Deserialize, Serialize};

/// Unique identifier for a service
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceId(pub String);

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A service of the application under load
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Identity used by session states and behavior models
    pub id: ServiceId,
    /// Human-readable name, used for plan node names and matrix labels
    pub name: String,
}

impl Service {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ServiceId::new(id),
            name: name.into(),
        }
    }

    /// Create a service whose id equals its name
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: ServiceId::new(name.clone()),
            name,
        }
    }
}
