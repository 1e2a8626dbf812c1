//! Engine configuration, loaded from TOML.
//!
//! Every key is optional:
//!
//! ```toml
//! timezone = "Asia/Tokyo"
//! grid_minutes = 5
//! default_interview_duration = 30
//!
//! [policy]
//! scope = "confirmed_only"
//! same_event = "unbuffered"
//! window_fit = "strict"
//! ```

use std::path::Path;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{Result, SchedulingError};
use crate::event::InterviewDuration;
use crate::policy::SchedulingPolicy;

static DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_GRID_MINUTES: u32 = 5;

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_grid_minutes() -> u32 {
    DEFAULT_GRID_MINUTES
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// IANA zone used for local-time arithmetic and display.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Step between offered start times, in minutes.
    #[serde(default = "default_grid_minutes")]
    pub grid_minutes: u32,

    /// Duration used when deriving a missing window endpoint.
    #[serde(default)]
    pub default_interview_duration: InterviewDuration,

    #[serde(default)]
    pub policy: SchedulingPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            grid_minutes: DEFAULT_GRID_MINUTES,
            default_interview_duration: InterviewDuration::default(),
            policy: SchedulingPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(s).map_err(|e| SchedulingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SchedulingError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_minutes == 0 {
            return Err(SchedulingError::InvalidGrid(self.grid_minutes));
        }
        self.timezone()?;
        Ok(())
    }

    /// The configured zone, parsed.
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| SchedulingError::InvalidTimezone(self.timezone.clone()))
    }
}
