//! # Ghost Typewriter
//!
//! Typewriter animation for styled text labels: characters are revealed or
//! hidden one at a time, first-to-last or last-to-first, while each
//! character keeps its own style. Only a per-character alpha channel is
//! animated.
//!
//! ## Components
//!
//! - **Driver**: [`TypewriterDriver`], the state machine with
//!   start/pause/reset/restart/complete controls and one-shot completions.
//! - **Styled text**: [`StyledText`], grapheme clusters with a ratatui
//!   [`Style`](ratatui::style::Style) and an alpha each.
//! - **Scheduler**: the [`Scheduler`] port with a deterministic
//!   [`ManualScheduler`] and a real-time [`TokioScheduler`].
//! - **Config**: [`TypewriterConfig`], loadable from TOML.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐ control calls  ┌──────────────────┐ schedule_repeating ┌───────────┐
//! │  Host view   ├───────────────►│ TypewriterDriver ├───────────────────►│ Scheduler │
//! │ (owns label) │◄───────────────┤  (StyledText)    │◄───────────────────┤  (timer)  │
//! └──────────────┘ DriverEvent    └──────────────────┘        tick        └───────────┘
//! ```

pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod scheduler;
pub mod styled_text;

pub use color::{OPAQUE, TRANSPARENT, interpolate_color, parse_color, with_alpha};
pub use config::{
    AnimationDirection, AnimationStyle, DEFAULT_TYPING_INTERVAL_MS, EmptyTextPolicy,
    TypewriterConfig,
};
pub use driver::{
    AnimationPhase, AnimationState, Completion, DriverEvent, Listener, TypewriterDriver,
    WeakTypewriterDriver,
};
pub use error::{Result, TypewriterError};
pub use scheduler::{ManualScheduler, MIN_INTERVAL, Scheduler, TickFn, TimerHandle, TokioScheduler};
pub use styled_text::{Run, StyledGrapheme, StyledText};

/// Ghost Typewriter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
