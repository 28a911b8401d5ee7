//! Engine-wide defaults.

use serde::{Deserialize, Serialize};

use crate::business_hours::BusinessHoursSpec;
use crate::error::{Result, SchedulingError};
use crate::recurrence::DEFAULT_MAX_OCCURRENCES;
use crate::slots::DEFAULT_HORIZON_DAYS;

/// Defaults applied by [`SchedulingEngine`](crate::SchedulingEngine) when a
/// call does not say otherwise.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use availability_engine::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{"defaultBufferMinutes": 10}"#).unwrap();
/// assert_eq!(config.default_buffer_minutes, 10);
/// assert_eq!(config.next_slot_horizon_days, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Days scanned by `get_next_available_slot` before giving up.
    pub next_slot_horizon_days: u32,
    /// Buffer used when a call does not pass one.
    pub default_buffer_minutes: i64,
    /// Recurrence expansion beyond this many dates fails.
    pub max_occurrences: usize,
    /// Hours used by `get_next_available_slot`, which takes no hours argument.
    pub default_business_hours: BusinessHoursSpec,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            next_slot_horizon_days: DEFAULT_HORIZON_DAYS,
            default_buffer_minutes: 0,
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            default_business_hours: BusinessHoursSpec::standard_weekdays(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.next_slot_horizon_days == 0 {
            return Err(SchedulingError::InputOutOfRange(
                "nextSlotHorizonDays must be at least 1".to_string(),
            ));
        }
        if self.default_buffer_minutes < 0 {
            return Err(SchedulingError::InputOutOfRange(format!(
                "defaultBufferMinutes must be non-negative, got {}",
                self.default_buffer_minutes
            )));
        }
        if self.max_occurrences == 0 {
            return Err(SchedulingError::InputOutOfRange(
                "maxOccurrences must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
