//! Session configuration
//!
//! The render server endpoint, output video settings and default layout of an
//! editing session. Every section falls back to its defaults when omitted from the
//! JSON document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::value_objects::Orientation;

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Address of the render/upload server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEndpoint {
    pub host: String,
    pub port: u16,
}

impl ServerEndpoint {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3000,
        }
    }
}

/// Transition applied between consecutive clips by the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transition {
    pub name: String,
    /// Seconds
    pub duration: f64,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            name: "fade".to_string(),
            duration: 0.5,
        }
    }
}

/// Output video settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub transition: Transition,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30,
            transition: Transition::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Orientation used by auto-arrange commands issued without one
    pub orientation: Orientation,
}

/// Complete configuration of an editing session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub server: ServerEndpoint,
    pub video: VideoConfig,
    pub layout: LayoutConfig,
}

impl SessionConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::debug!("Loading session configuration from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server host cannot be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server port cannot be 0".to_string()));
        }
        if self.video.width == 0 || self.video.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "video resolution must be positive, got {}x{}",
                self.video.width, self.video.height
            )));
        }
        if self.video.fps == 0 {
            return Err(ConfigError::Invalid("video fps must be positive".to_string()));
        }
        let transition = &self.video.transition;
        if transition.name.trim().is_empty() {
            return Err(ConfigError::Invalid("transition name cannot be empty".to_string()));
        }
        if !transition.duration.is_finite() || transition.duration < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "transition duration must be a non-negative number of seconds, got {}",
                transition.duration
            )));
        }
        Ok(())
    }
}
