use serde::Serialize;
use std::fmt;

/// A model the dashboard lets the user pick. The list is fixed at startup;
/// whatever `/api/models` returns is shown on request but never merged here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

impl ModelDescriptor {
    pub fn label(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }
}

pub const DEFAULT_MODEL_ID: u32 = 0;

pub static MODELS: &[ModelDescriptor] = &[
    ModelDescriptor {
        id: 0,
        name: "GPT-5 Standard",
        description: "General purpose AI assistant",
        icon: "🧠",
    },
    ModelDescriptor {
        id: 1,
        name: "Healthcare AI",
        description: "Medical advice and health guidance",
        icon: "🏥",
    },
    ModelDescriptor {
        id: 2,
        name: "Coding Expert",
        description: "Programming and development help",
        icon: "💻",
    },
    ModelDescriptor {
        id: 3,
        name: "Emotional Support AI",
        description: "Empathetic conversation partner",
        icon: "💝",
    },
];

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownModelError {
    pub id: u32,
}

impl fmt::Display for UnknownModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown model id: {} (expected 0..={})", self.id, MODELS.len() - 1)
    }
}

impl std::error::Error for UnknownModelError {}

pub fn find(id: u32) -> Result<&'static ModelDescriptor, UnknownModelError> {
    MODELS.iter().find(|m| m.id == id).ok_or(UnknownModelError { id })
}
