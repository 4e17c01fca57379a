//! Environment context for a simulation run
//!
//! Conditions outside the agents' control that modulate friction: weather,
//! media attention, and two operator flags describing the political climate
//! and the presence of active third-party monitoring.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Calm,
    Adverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaVisibility {
    #[default]
    None,
    Low,
    High,
}

/// Run-wide environment flags
///
/// # Example
/// ```
/// use agreement_simulator_core_rs::context::{EnvironmentContext, MediaVisibility, Weather};
///
/// let ctx: EnvironmentContext =
///     serde_json::from_str(r#"{"weather": "adverse", "media_visibility": "high"}"#).unwrap();
/// assert_eq!(ctx.weather, Weather::Adverse);
/// assert_eq!(ctx.media_visibility, MediaVisibility::High);
/// assert!(!ctx.high_tension);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentContext {
    pub weather: Weather,
    pub media_visibility: MediaVisibility,
    /// Heightened political tension lowers response thresholds
    pub high_tension: bool,
    /// Active third-party monitoring raises response thresholds
    pub active_monitoring: bool,
}

impl EnvironmentContext {
    pub fn adverse_weather(&self) -> bool {
        self.weather == Weather::Adverse
    }

    /// Any media presence at all
    pub fn media_present(&self) -> bool {
        self.media_visibility != MediaVisibility::None
    }

    pub fn high_media_visibility(&self) -> bool {
        self.media_visibility == MediaVisibility::High
    }
}
