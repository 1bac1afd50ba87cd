use core::fmt;
use std::{fs, path::Path};

use serde::Deserialize;

use crate::types::{Channel, ChannelMask, Pose};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebounceConfig {
    pub timeout_ms: u64,
    pub instantaneous: Pose,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10,
            instantaneous: Pose::DoubleTap,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub click_max_hold_ms: u64,
    pub double_click_timeout_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_max_hold_ms: 1_000,
            double_click_timeout_ms: 750,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MovingAverageConfig {
    pub window: usize,
    pub channels: Vec<Channel>,
}

impl MovingAverageConfig {
    pub fn mask(&self) -> ChannelMask {
        ChannelMask::from_channels(&self.channels)
    }
}

impl Default for MovingAverageConfig {
    fn default() -> Self {
        Self {
            window: 10,
            channels: vec![Channel::Orientation],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExponentialAverageConfig {
    pub alpha: f32,
    pub channels: Vec<Channel>,
}

impl ExponentialAverageConfig {
    pub fn mask(&self) -> ChannelMask {
        ChannelMask::from_channels(&self.channels)
    }
}

impl Default for ExponentialAverageConfig {
    fn default() -> Self {
        Self {
            alpha: 0.2,
            channels: vec![Channel::Accelerometer, Channel::Gyroscope],
        }
    }
}

/// Relative angle thresholds in radians.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrientationConfig {
    pub arm_up_below: f32,
    pub arm_down_above: f32,
    pub wrist_down_below: f32,
    pub wrist_up_above: f32,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            arm_up_below: -1.0,
            arm_down_above: 1.0,
            wrist_down_below: -0.2,
            wrist_up_above: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorrectionConfig {
    pub channels: Vec<Channel>,
}

impl CorrectionConfig {
    pub fn mask(&self) -> ChannelMask {
        ChannelMask::from_channels(&self.channels)
    }
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            channels: vec![Channel::Accelerometer, Channel::Gyroscope],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub debounce: DebounceConfig,
    pub gestures: GestureConfig,
    pub moving_average: MovingAverageConfig,
    pub exponential_average: ExponentialAverageConfig,
    pub orientation: OrientationConfig,
    pub correction: CorrectionConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config: {err}"),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Zero windows and timeouts are accepted; they degenerate instead of failing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let alpha = self.exponential_average.alpha;
        if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
            return Err(ConfigError::Invalid(
                "exponential_average.alpha must be in (0, 1]",
            ));
        }

        let o = &self.orientation;
        let thresholds = [
            o.arm_up_below,
            o.arm_down_above,
            o.wrist_down_below,
            o.wrist_up_above,
        ];
        if thresholds.iter().any(|t| !t.is_finite()) {
            return Err(ConfigError::Invalid("orientation thresholds must be finite"));
        }
        if o.arm_up_below > o.arm_down_above {
            return Err(ConfigError::Invalid(
                "orientation.arm_up_below must be <= orientation.arm_down_above",
            ));
        }
        if o.wrist_down_below > o.wrist_up_above {
            return Err(ConfigError::Invalid(
                "orientation.wrist_down_below must be <= orientation.wrist_up_above",
            ));
        }

        Ok(())
    }
}
