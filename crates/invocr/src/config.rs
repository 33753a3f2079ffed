use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Model id the extraction agent is pinned to.
pub const CLAUDE_SONNET_MODEL: &str = "claude-sonnet-4-5";

/// Default extraction task shown to the agent when the caller supplies none.
pub const DEFAULT_TASK: &str = "Extract invoice fields from the document.";

pub const MIN_DPI: u32 = 150;
pub const MAX_DPI: u32 = 300;

/// Settings for one extraction session: render quality, sampling
/// temperature for the agent, and the Tesseract language set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub dpi: u32,
    pub temperature: f32,
    pub ocr_languages: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            temperature: 0.0,
            ocr_languages: Vec::new(),
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dpi < MIN_DPI || self.dpi > MAX_DPI {
            return Err(ConfigError::DpiOutOfRange {
                value: self.dpi,
                min: MIN_DPI,
                max: MAX_DPI,
            });
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::TemperatureOutOfRange(self.temperature));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dpi, 200);
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_dpi_bounds() {
        let mut config = ExtractionConfig::default();

        config.dpi = MIN_DPI;
        assert!(config.validate().is_ok());
        config.dpi = MAX_DPI;
        assert!(config.validate().is_ok());

        config.dpi = MIN_DPI - 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DpiOutOfRange { value: 149, .. })
        ));
        config.dpi = MAX_DPI + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_bounds() {
        let mut config = ExtractionConfig::default();

        config.temperature = 1.0;
        assert!(config.validate().is_ok());

        config.temperature = 1.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TemperatureOutOfRange(_))
        ));

        config.temperature = -0.1;
        assert!(config.validate().is_err());
    }
}
