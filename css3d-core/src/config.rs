/// Renderer options and compositing capability resolution
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the browser composes nested 3D stacking contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compositing {
    /// `transform-style: preserve-3d` works; the camera transform is applied
    /// once on the camera frame and composes natively.
    Native,
    /// No nested 3D contexts (Trident). The camera transform is baked into every
    /// object and depth is approximated with `z-index`.
    Legacy,
}

impl Compositing {
    /// Probe a user agent string. Only Trident engines lack preserve-3d.
    pub fn detect(user_agent: &str) -> Self {
        if user_agent.to_ascii_lowercase().contains("trident") {
            Compositing::Legacy
        } else {
            Compositing::Native
        }
    }

    pub fn is_legacy(self) -> bool {
        self == Compositing::Legacy
    }
}

/// Requested compositing mode, before resolution against the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositingMode {
    #[default]
    Auto,
    Native,
    Legacy,
}

/// Options read once when a renderer is constructed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererOptions {
    pub compositing: CompositingMode,
}

impl RendererOptions {
    /// Parse options from a JSON object, e.g. `{"compositing": "legacy"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Resolve the requested mode. `Auto` falls back to native when no user
    /// agent is available.
    pub fn resolve(&self, user_agent: Option<&str>) -> Compositing {
        match self.compositing {
            CompositingMode::Native => Compositing::Native,
            CompositingMode::Legacy => Compositing::Legacy,
            CompositingMode::Auto => user_agent.map_or(Compositing::Native, Compositing::detect),
        }
    }
}
