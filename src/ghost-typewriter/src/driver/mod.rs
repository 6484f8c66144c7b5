//! The typewriter animation driver.
//!
//! [`TypewriterDriver`] owns a [`StyledText`] and, on each timer tick, flips
//! the visibility of exactly one more character in the configured direction
//! until the whole text is processed.
//!
//! # Example
//! ```ignore
//! use ghost_typewriter::{ManualScheduler, StyledText, TypewriterConfig, TypewriterDriver};
//!
//! let scheduler = ManualScheduler::new();
//! let config = TypewriterConfig::forward_reveal();
//! let driver = TypewriterDriver::with_config(scheduler.clone(), config);
//! driver.set_styled_text(StyledText::raw("Test"));
//! driver.start(Some(Box::new(|| println!("done"))));
//!
//! scheduler.tick_n(4);
//! assert!(driver.is_complete());
//! ```

mod state;

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use ratatui::style::Color;
use ratatui::text::{Line, Text};
use tracing::{debug, trace};

use crate::config::{AnimationDirection, AnimationStyle, TypewriterConfig};
use crate::scheduler::{Scheduler, TickFn};
use crate::styled_text::StyledText;

pub use state::{AnimationPhase, AnimationState, Completion};
use state::{DriverState, Effects, StartPlan};

/// Notification sent to the host after the driver acts.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// The styled text changed; carries the new value for re-rendering.
    Updated(StyledText),
    /// A run finished. `forced` is `true` for [`TypewriterDriver::complete`].
    ///
    /// Sent before the run's completion callback, so the driver is still
    /// [`AnimationPhase::Complete`] when the listener sees it.
    Completed {
        /// Whether the run was force-completed.
        forced: bool,
    },
}

/// Host observer. Called with no internal borrow held, so it may call
/// back into the driver.
pub type Listener = Rc<dyn Fn(&DriverEvent)>;

struct Shared {
    state: RefCell<DriverState>,
    listener: RefCell<Option<Listener>>,
    scheduler: Box<dyn Scheduler>,
}

/// Typewriter animation driver.
///
/// Cloning yields another handle to the same animation. The timer only holds
/// a weak reference, and dropping the last handle cancels it, so a tick can
/// never touch a released driver.
#[derive(Clone)]
pub struct TypewriterDriver {
    shared: Rc<Shared>,
}

/// Non-owning handle, for completions that need to reach their own driver.
#[derive(Clone)]
pub struct WeakTypewriterDriver {
    shared: Weak<Shared>,
}

impl WeakTypewriterDriver {
    /// Returns the driver if it is still alive.
    pub fn upgrade(&self) -> Option<TypewriterDriver> {
        self.shared.upgrade().map(|shared| TypewriterDriver { shared })
    }
}

impl TypewriterDriver {
    /// Creates a forward-revealing driver over empty text.
    pub fn new(scheduler: impl Scheduler + 'static) -> Self {
        Self::with_config(scheduler, TypewriterConfig::default())
    }

    /// Creates a driver with the given configuration over empty text.
    pub fn with_config(scheduler: impl Scheduler + 'static, config: TypewriterConfig) -> Self {
        let (state, _) = DriverState::new(config, StyledText::new());
        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(state),
                listener: RefCell::new(None),
                scheduler: Box::new(scheduler),
            }),
        }
    }

    /// Returns a weak handle.
    pub fn downgrade(&self) -> WeakTypewriterDriver {
        WeakTypewriterDriver {
            shared: Rc::downgrade(&self.shared),
        }
    }

    // ------------------------------------------------------------------
    // Host wiring
    // ------------------------------------------------------------------

    /// Installs the host observer, replacing any previous one.
    pub fn set_listener(&self, listener: impl Fn(&DriverEvent) + 'static) {
        *self.shared.listener.borrow_mut() = Some(Rc::new(listener));
    }

    /// Removes the host observer.
    pub fn clear_listener(&self) {
        self.shared.listener.borrow_mut().take();
    }

    /// Replaces the text. A running animation is stopped and the new text
    /// receives the start presentation.
    pub fn set_styled_text(&self, text: impl Into<StyledText>) {
        let fx = self.shared.state.borrow_mut().set_text(text.into());
        self.dispatch(fx);
    }

    /// Colour used for characters that carry no foreground colour.
    pub fn set_fallback_color(&self, color: Color) {
        self.shared.state.borrow_mut().fallback_color = color;
    }

    /// Returns the fallback colour.
    pub fn fallback_color(&self) -> Color {
        self.shared.state.borrow().fallback_color
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Sets direction and style. Always resets the animation.
    pub fn configure(&self, direction: AnimationDirection, style: AnimationStyle) {
        let config = TypewriterConfig {
            direction,
            style,
            ..self.config()
        };
        self.set_config(config);
    }

    /// Replaces the whole configuration. Always resets the animation.
    pub fn set_config(&self, config: TypewriterConfig) {
        debug!(
            direction = ?config.direction,
            style = ?config.style,
            "typewriter reconfigured"
        );
        let fx = self.shared.state.borrow_mut().configure(config);
        self.dispatch(fx);
    }

    /// Changes the gap between characters for the next `start`.
    pub fn set_typing_interval(&self, interval: Duration) {
        let mut state = self.shared.state.borrow_mut();
        state.config = state.config.with_typing_interval(interval);
    }

    /// Returns the current configuration.
    pub fn config(&self) -> TypewriterConfig {
        self.shared.state.borrow().config
    }

    // ------------------------------------------------------------------
    // Controls
    // ------------------------------------------------------------------

    /// Starts a fresh run or resumes a paused one.
    ///
    /// `Some(completion)` replaces the registered completion; `None` keeps
    /// one registered by an earlier `start` of the same run.
    pub fn start(&self, completion: Option<Completion>) {
        let (plan, fx) = self.shared.state.borrow_mut().start(completion);

        match plan {
            StartPlan::Schedule(interval) => {
                let timer = self
                    .shared
                    .scheduler
                    .schedule_repeating(interval, self.tick_fn());
                let mut state = self.shared.state.borrow_mut();
                state.set_timer(timer);
                debug!(
                    offset = state.snapshot().offset,
                    len = state.text.len(),
                    ?interval,
                    "typewriter started"
                );
            }
            StartPlan::Skip => debug!("typewriter start skipped: no text"),
        }

        self.dispatch(fx);
    }

    /// Stops the timer, keeping every character as it is. No-op unless running.
    pub fn pause(&self) {
        if self.shared.state.borrow_mut().pause() {
            debug!(offset = self.offset(), "typewriter paused");
        }
    }

    /// Stops and returns to the start presentation without restarting.
    pub fn reset(&self) {
        let fx = self.shared.state.borrow_mut().reset();
        debug!("typewriter reset");
        self.dispatch(fx);
    }

    /// Resets, then starts a fresh run.
    pub fn restart(&self, completion: Option<Completion>) {
        self.reset();
        self.start(completion);
    }

    /// Jumps straight to the end presentation and fires the completion.
    pub fn complete(&self) {
        let fx = self.shared.state.borrow_mut().complete();
        debug!("typewriter force-completed");
        self.dispatch(fx);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns `true` while the timer is live.
    pub fn is_animating(&self) -> bool {
        self.state().is_running()
    }

    /// Returns `true` once the run reached its terminal offset or was
    /// force-completed.
    pub fn is_complete(&self) -> bool {
        self.shared.state.borrow().is_complete()
    }

    /// Current phase.
    pub fn phase(&self) -> AnimationPhase {
        self.state().phase
    }

    /// Index of the next character to process.
    pub fn offset(&self) -> isize {
        self.state().offset
    }

    /// Offset and phase.
    pub fn state(&self) -> AnimationState {
        self.shared.state.borrow().snapshot()
    }

    /// Returns a copy of the current text.
    pub fn styled_text(&self) -> StyledText {
        self.shared.state.borrow().text.clone()
    }

    /// Borrows the current text. `f` must not call back into the driver.
    pub fn with_styled_text<R>(&self, f: impl FnOnce(&StyledText) -> R) -> R {
        f(&self.shared.state.borrow().text)
    }

    /// Renders the text against `background` using the fallback colour.
    pub fn render_line(&self, background: Color) -> Line<'static> {
        let state = self.shared.state.borrow();
        state.text.to_line(state.fallback_color, background)
    }

    /// Multi-line variant of [`TypewriterDriver::render_line`].
    pub fn render_text(&self, background: Color) -> Text<'static> {
        let state = self.shared.state.borrow();
        state.text.to_text(state.fallback_color, background)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn tick_fn(&self) -> TickFn {
        let weak = Rc::downgrade(&self.shared);
        Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                TypewriterDriver { shared }.on_tick();
            }
        })
    }

    fn on_tick(&self) {
        let fx = {
            let mut state = self.shared.state.borrow_mut();
            let fx = state.tick();
            trace!(offset = state.snapshot().offset, "typewriter tick");
            fx
        };
        if fx.completed.is_some() {
            debug!("typewriter finished");
        }
        self.dispatch(fx);
    }

    fn listener(&self) -> Option<Listener> {
        self.shared.listener.borrow().clone()
    }

    fn dispatch(&self, fx: Effects) {
        if fx.updated
            && let Some(listener) = self.listener()
        {
            let text = self.styled_text();
            listener(&DriverEvent::Updated(text));
        }

        if let Some(forced) = fx.completed
            && let Some(listener) = self.listener()
        {
            listener(&DriverEvent::Completed { forced });
        }

        if let Some(completion) = fx.completion {
            completion();
        }
    }
}

impl fmt::Debug for TypewriterDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("TypewriterDriver")
            .field("config", &state.config)
            .field("state", &state.snapshot())
            .field("len", &state.text.len())
            .field("timer", &state.has_timer())
            .finish()
    }
}
