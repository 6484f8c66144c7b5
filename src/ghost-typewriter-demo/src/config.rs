//! Demo configuration.
//!
//! A TOML file with an `[animation]` table and any number of `[[labels]]`.
//! Every field is optional; the defaults reproduce the three-label showcase.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use ghost_typewriter::{AnimationDirection, AnimationStyle, StyledText, TypewriterConfig};
use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level demo configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Animation shared by every label.
    #[serde(default)]
    pub animation: TypewriterConfig,

    /// Colour for characters without their own foreground.
    #[serde(default = "default_fallback_color")]
    pub fallback_color: String,

    /// Labels, animated one after another.
    #[serde(default = "default_labels")]
    pub labels: Vec<LabelConfig>,
}

/// One animated label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    pub text: String,

    #[serde(default)]
    pub bold: bool,

    /// Words recoloured in place; the first occurrence of each wins.
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub word: String,
    pub color: String,
}

fn default_fallback_color() -> String {
    "gray".to_string()
}

fn default_labels() -> Vec<LabelConfig> {
    vec![
        LabelConfig {
            text: "Ghost Typewriter".to_string(),
            bold: true,
            highlights: Vec::new(),
        },
        LabelConfig {
            text: "Labels that type themselves out, one character at a time, while every \
                   character keeps the style it was given."
                .to_string(),
            bold: false,
            highlights: Vec::new(),
        },
        LabelConfig {
            text: "Still not convinced...\n\nWell this label shows support for attributed \
                   labels created programmatically rather than via storyboards so maybe that \
                   will soothe you."
                .to_string(),
            bold: false,
            highlights: vec![
                Highlight {
                    word: "programmatically".to_string(),
                    color: "green".to_string(),
                },
                Highlight {
                    word: "storyboards".to_string(),
                    color: "red".to_string(),
                },
            ],
        },
    ]
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            animation: TypewriterConfig::default(),
            fallback_color: default_fallback_color(),
            labels: default_labels(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Command-line values win over the file.
    pub fn apply_overrides(
        &mut self,
        direction: Option<AnimationDirection>,
        style: Option<AnimationStyle>,
        interval_ms: Option<u64>,
    ) {
        if let Some(direction) = direction {
            self.animation.direction = direction;
        }
        if let Some(style) = style {
            self.animation.style = style;
        }
        if let Some(interval_ms) = interval_ms {
            self.animation.typing_interval = Duration::from_millis(interval_ms);
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.labels.is_empty(), "config defines no labels");
        self.fallback_color()?;
        Ok(())
    }

    pub fn fallback_color(&self) -> Result<Color> {
        ghost_typewriter::parse_color(&self.fallback_color).context("Invalid fallback_color")
    }
}

impl LabelConfig {
    /// Builds the label text with its bold flag and highlights applied.
    pub fn styled_text(&self) -> ghost_typewriter::Result<StyledText> {
        let base = if self.bold {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let mut text = StyledText::styled(&self.text, base);
        for highlight in &self.highlights {
            let color = ghost_typewriter::parse_color(&highlight.color)?;
            if !text.colorize(&highlight.word, color) {
                warn!(word = %highlight.word, "highlight not found in label text");
            }
        }
        Ok(text)
    }
}
