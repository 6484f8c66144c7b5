//! Animation configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default gap between two animated characters, in milliseconds.
pub const DEFAULT_TYPING_INTERVAL_MS: u64 = 100;

/// Direction the animation traverses the text in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationDirection {
    /// From the first character to the last.
    #[default]
    Forward,
    /// From the last character to the first.
    Backward,
}

impl AnimationDirection {
    /// Returns `true` for [`AnimationDirection::Forward`].
    pub fn is_forward(self) -> bool {
        self == Self::Forward
    }

    /// Returns the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Whether each processed character is revealed or hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationStyle {
    /// Characters start transparent and become opaque.
    #[default]
    Reveal,
    /// Characters start opaque and become transparent.
    Hide,
}

impl AnimationStyle {
    /// Returns `true` for [`AnimationStyle::Reveal`].
    pub fn is_reveal(self) -> bool {
        self == Self::Reveal
    }

    /// Alpha applied to the whole text before a fresh run.
    pub fn start_alpha(self) -> f32 {
        match self {
            Self::Reveal => crate::color::TRANSPARENT,
            Self::Hide => crate::color::OPAQUE,
        }
    }

    /// Alpha a character has once processed, and the whole text once complete.
    pub fn end_alpha(self) -> f32 {
        match self {
            Self::Reveal => crate::color::OPAQUE,
            Self::Hide => crate::color::TRANSPARENT,
        }
    }

    /// Returns the other style.
    pub fn toggled(self) -> Self {
        match self {
            Self::Reveal => Self::Hide,
            Self::Hide => Self::Reveal,
        }
    }
}

/// What `start` does when there is no text to animate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyTextPolicy {
    /// Treat the run as vacuously finished and fire the completion.
    #[default]
    Complete,
    /// Do nothing; the completion stays registered.
    Ignore,
}

/// Typewriter animation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypewriterConfig {
    /// Traversal direction.
    #[serde(default)]
    pub direction: AnimationDirection,

    /// Reveal or hide.
    #[serde(default)]
    pub style: AnimationStyle,

    /// Gap between two animated characters. Written in TOML as fractional
    /// milliseconds under `typing_interval_ms`.
    #[serde(
        rename = "typing_interval_ms",
        with = "millis",
        default = "default_typing_interval"
    )]
    pub typing_interval: Duration,

    /// Behaviour of `start` on empty text.
    #[serde(default)]
    pub empty_text: EmptyTextPolicy,
}

fn default_typing_interval() -> Duration {
    Duration::from_millis(DEFAULT_TYPING_INTERVAL_MS)
}

/// `Duration` as fractional milliseconds, keeping sub-millisecond precision.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(interval: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(interval.as_nanos() as f64 / 1_000_000.0)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = f64::deserialize(deserializer)?;
        if !ms.is_finite() {
            return Err(de::Error::custom("typing_interval_ms must be a finite number"));
        }
        Ok(Duration::from_nanos((ms.max(0.0) * 1_000_000.0).round() as u64))
    }
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            direction: AnimationDirection::default(),
            style: AnimationStyle::default(),
            typing_interval: default_typing_interval(),
            empty_text: EmptyTextPolicy::default(),
        }
    }
}

impl TypewriterConfig {
    /// Creates a config for the given direction and style with default timing.
    pub fn new(direction: AnimationDirection, style: AnimationStyle) -> Self {
        Self {
            direction,
            style,
            ..Self::default()
        }
    }

    /// Reveals characters from first to last.
    pub fn forward_reveal() -> Self {
        Self::new(AnimationDirection::Forward, AnimationStyle::Reveal)
    }

    /// Hides characters from last to first.
    pub fn backward_hide() -> Self {
        Self::new(AnimationDirection::Backward, AnimationStyle::Hide)
    }

    /// Sets the typing interval.
    pub fn with_typing_interval(mut self, interval: Duration) -> Self {
        self.typing_interval = interval;
        self
    }

    /// Sets the empty-text policy.
    pub fn with_empty_text(mut self, policy: EmptyTextPolicy) -> Self {
        self.empty_text = policy;
        self
    }

    /// Get the typing interval as Duration.
    pub fn typing_interval_duration(&self) -> Duration {
        self.typing_interval
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
