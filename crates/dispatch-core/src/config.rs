use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DispatchError, Result};
use crate::time::{Clock, LocalClock, OffsetClock};
use crate::workflow::WorkflowOptions;

pub const DEFAULT_PRODUCT_CODE: &str = "testproduct-3";
pub const DEFAULT_CYCLE_COUNT: u32 = 832;
pub const DEFAULT_CYCLE_INCREMENT: u32 = 5;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Optional YAML run configuration. Command-line flags and environment
/// variables take precedence over every field here. The API key is never
/// read from this file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default = "default_product_code")]
    pub product_code: String,
    #[serde(default = "default_cycle_count")]
    pub cycle_count: u32,
    #[serde(default = "default_cycle_increment")]
    pub cycle_increment: u32,
    /// Site timezone as `+HH:MM`; the host timezone when absent.
    #[serde(default)]
    pub utc_offset: Option<String>,
}

fn default_product_code() -> String {
    DEFAULT_PRODUCT_CODE.to_string()
}

fn default_cycle_count() -> u32 {
    DEFAULT_CYCLE_COUNT
}

fn default_cycle_increment() -> u32 {
    DEFAULT_CYCLE_INCREMENT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: None,
            site: None,
            user: None,
            product_code: default_product_code(),
            cycle_count: default_cycle_count(),
            cycle_increment: default_cycle_increment(),
            utc_offset: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.product_code.trim().is_empty() {
            return Err(DispatchError::Config("product_code must not be empty".into()));
        }
        if self.cycle_increment == 0 {
            return Err(DispatchError::Config(
                "cycle_increment must be greater than zero".into(),
            ));
        }
        if let Some(offset) = &self.utc_offset {
            OffsetClock::parse(offset)?;
        }
        Ok(())
    }

    /// Site-local clock for this configuration.
    pub fn clock(&self) -> Result<Box<dyn Clock>> {
        match &self.utc_offset {
            Some(offset) => Ok(Box::new(OffsetClock::parse(offset)?)),
            None => Ok(Box::new(LocalClock)),
        }
    }

    pub fn workflow_options(&self, user: impl Into<String>) -> WorkflowOptions {
        WorkflowOptions {
            user: user.into(),
            product_code: self.product_code.clone(),
            cycle_count: self.cycle_count,
            cycle_increment: self.cycle_increment,
        }
    }
}
