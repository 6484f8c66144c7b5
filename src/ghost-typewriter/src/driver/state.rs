//! Animation state machine, free of callbacks and timers.
//!
//! Every operation returns the [`Effects`] it produced; the driver applies
//! them once its borrow on the state has been released.

use std::time::Duration;

use ratatui::style::Color;

use crate::config::{AnimationDirection, EmptyTextPolicy, TypewriterConfig};
use crate::scheduler::TimerHandle;
use crate::styled_text::StyledText;

/// One-shot callback fired when a run completes.
pub type Completion = Box<dyn FnOnce()>;

/// Lifecycle phase of the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnimationPhase {
    /// Start presentation applied, nothing scheduled.
    #[default]
    Idle,
    /// A timer is live.
    Running,
    /// Stopped part way; `start` resumes.
    Paused,
    /// The run reached its end, naturally or forced.
    Complete,
}

/// Snapshot of the animation position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    /// Index of the next character to process. `-1` is the backward terminal.
    pub offset: isize,
    /// Current phase.
    pub phase: AnimationPhase,
}

impl AnimationState {
    /// Returns `true` while a timer is live.
    pub fn is_running(&self) -> bool {
        self.phase == AnimationPhase::Running
    }
}

/// What the driver must do after a state operation.
#[derive(Default)]
#[must_use]
pub(crate) struct Effects {
    /// The text changed and the host must be notified.
    pub(crate) updated: bool,
    /// A run finished; `Some(forced)`.
    pub(crate) completed: Option<bool>,
    /// Completion to invoke, already detached from the state.
    pub(crate) completion: Option<Completion>,
}

/// Outcome of a `start` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartPlan {
    /// Schedule a repeating timer at this interval.
    Schedule(Duration),
    /// Nothing to animate and nothing scheduled.
    Skip,
}

pub(crate) struct DriverState {
    pub(crate) config: TypewriterConfig,
    pub(crate) text: StyledText,
    pub(crate) fallback_color: Color,
    offset: isize,
    phase: AnimationPhase,
    completion: Option<Completion>,
    timer: Option<Box<dyn TimerHandle>>,
}

impl DriverState {
    pub(crate) fn new(config: TypewriterConfig, text: StyledText) -> (Self, Effects) {
        let mut state = Self {
            config,
            text,
            fallback_color: Color::Reset,
            offset: 0,
            phase: AnimationPhase::Idle,
            completion: None,
            timer: None,
        };
        let fx = state.reset();
        (state, fx)
    }

    pub(crate) fn snapshot(&self) -> AnimationState {
        AnimationState {
            offset: self.offset,
            phase: self.phase,
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.phase == AnimationPhase::Complete || self.is_terminal()
    }

    pub(crate) fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub(crate) fn set_timer(&mut self, timer: Box<dyn TimerHandle>) {
        self.cancel_timer();
        self.timer = Some(timer);
    }

    fn len(&self) -> isize {
        self.text.len() as isize
    }

    fn starting_offset(&self) -> isize {
        match self.config.direction {
            AnimationDirection::Forward => 0,
            AnimationDirection::Backward => self.len() - 1,
        }
    }

    fn is_terminal(&self) -> bool {
        match self.config.direction {
            AnimationDirection::Forward => self.offset >= self.len(),
            AnimationDirection::Backward => self.offset < 0,
        }
    }

    fn step(&self) -> isize {
        match self.config.direction {
            AnimationDirection::Forward => 1,
            AnimationDirection::Backward => -1,
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn present(&mut self, alpha: f32, fx: &mut Effects) {
        if !self.text.is_empty() {
            self.text.set_alpha_all(alpha);
            fx.updated = true;
        }
    }

    fn finish(&mut self, forced: bool, fx: &mut Effects) {
        self.cancel_timer();
        self.phase = AnimationPhase::Complete;
        fx.completed = Some(forced);
        fx.completion = self.completion.take();
    }

    pub(crate) fn reset(&mut self) -> Effects {
        let mut fx = Effects::default();
        self.cancel_timer();
        self.phase = AnimationPhase::Idle;
        self.present(self.config.style.start_alpha(), &mut fx);
        self.offset = self.starting_offset();
        fx
    }

    pub(crate) fn configure(&mut self, config: TypewriterConfig) -> Effects {
        self.config = config;
        self.reset()
    }

    pub(crate) fn set_text(&mut self, text: StyledText) -> Effects {
        self.cancel_timer();
        self.text = text;
        self.reset()
    }

    /// Returns `false` when there was nothing to pause.
    pub(crate) fn pause(&mut self) -> bool {
        if self.phase != AnimationPhase::Running {
            return false;
        }
        self.cancel_timer();
        self.phase = AnimationPhase::Paused;
        true
    }

    pub(crate) fn start(&mut self, completion: Option<Completion>) -> (StartPlan, Effects) {
        let mut fx = Effects::default();
        if let Some(completion) = completion {
            self.completion = Some(completion);
        }

        if self.text.is_empty() {
            self.cancel_timer();
            return match self.config.empty_text {
                EmptyTextPolicy::Complete => {
                    self.offset = self.starting_offset();
                    self.finish(false, &mut fx);
                    (StartPlan::Skip, fx)
                }
                EmptyTextPolicy::Ignore => (StartPlan::Skip, fx),
            };
        }

        let fresh = self.phase == AnimationPhase::Complete
            || self.is_terminal()
            || self.offset == self.starting_offset();
        if fresh {
            self.present(self.config.style.start_alpha(), &mut fx);
            self.offset = self.starting_offset();
        }

        self.cancel_timer();
        self.phase = AnimationPhase::Running;
        (
            StartPlan::Schedule(self.config.typing_interval_duration()),
            fx,
        )
    }

    pub(crate) fn tick(&mut self) -> Effects {
        let mut fx = Effects::default();
        if self.phase != AnimationPhase::Running {
            return fx;
        }

        if !self.is_terminal() {
            let index = self.offset as usize;
            if self.text.set_alpha(index, self.config.style.end_alpha()) {
                fx.updated = true;
            }
            self.offset += self.step();
        }

        if self.is_terminal() {
            self.finish(false, &mut fx);
        }
        fx
    }

    pub(crate) fn complete(&mut self) -> Effects {
        let mut fx = Effects::default();
        self.cancel_timer();
        self.present(self.config.style.end_alpha(), &mut fx);
        self.offset = self.starting_offset();
        self.finish(true, &mut fx);
        fx
    }
}
