//! Registry Configuration

use std::time::Duration;

use crate::error::{Error, Result};

/// Registry configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Pause between sweep passes
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl RegistryConfig {
    /// Set sweep interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            return Err(Error::InvalidOption(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
