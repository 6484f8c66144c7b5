//! Typewriter Screen TUI
//!
//! Shows the configured labels one below the other. Each label starts when
//! the one above it finishes; the keys in the hint bar drive the whole chain.

use std::cell::Cell;
use std::io::stdout;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ghost_typewriter::{
    Completion, ManualScheduler, TypewriterConfig, TypewriterDriver, WeakTypewriterDriver,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Clear, Paragraph, Wrap};
use tracing::{debug, info};

use crate::config::DemoConfig;
use crate::controls::{Control, ControlState};

/// Event poll timeout, and so the longest gap between two scheduler pumps.
const FRAME: Duration = Duration::from_millis(16);

const BACKGROUND: Color = Color::Reset;
const ACCENT: Color = Color::Cyan;
const DIM: Color = Color::DarkGray;

// ============================================================================
// Label chain
// ============================================================================

/// Completion wiring: label `i` finishing starts label `i + 1`.
///
/// Holds the labels weakly, since every label's completion holds the chain.
struct Chain {
    labels: Vec<WeakTypewriterDriver>,
    controls: Rc<Cell<ControlState>>,
}

impl Chain {
    fn completion(self: &Rc<Self>, index: usize) -> Completion {
        let chain = Rc::clone(self);
        Box::new(move || chain.advance(index))
    }

    fn advance(self: &Rc<Self>, finished: usize) {
        let next = finished + 1;
        if next >= self.labels.len() {
            debug!("label chain finished");
            self.controls.set(ControlState::after(Control::Stop));
            return;
        }

        if let Some(driver) = self.labels[next].upgrade()
            && !driver.is_complete()
        {
            debug!(label = next, "starting next label");
            driver.start(Some(self.completion(next)));
        }
    }
}

// ============================================================================
// Typewriter Screen
// ============================================================================

/// Interactive screen animating a chain of labels.
pub struct TypewriterScreen {
    scheduler: ManualScheduler,
    labels: Vec<TypewriterDriver>,
    chain: Rc<Chain>,
    controls: Rc<Cell<ControlState>>,
    dirty: Rc<Cell<bool>>,
    config: TypewriterConfig,
}

impl TypewriterScreen {
    pub fn new(config: &DemoConfig) -> Result<Self> {
        let scheduler = ManualScheduler::new();
        let fallback = config.fallback_color()?;
        let dirty = Rc::new(Cell::new(true));

        let labels = config
            .labels
            .iter()
            .map(|label| {
                let driver = TypewriterDriver::with_config(scheduler.clone(), config.animation);
                driver.set_fallback_color(fallback);
                driver.set_styled_text(label.styled_text()?);
                let dirty = Rc::clone(&dirty);
                driver.set_listener(move |_| dirty.set(true));
                Ok(driver)
            })
            .collect::<Result<Vec<_>>>()?;

        let controls = Rc::new(Cell::new(ControlState::initial()));
        let chain = Rc::new(Chain {
            labels: labels.iter().map(TypewriterDriver::downgrade).collect(),
            controls: Rc::clone(&controls),
        });

        Ok(Self {
            scheduler,
            labels,
            chain,
            controls,
            dirty,
            config: config.animation,
        })
    }

    /// Run the screen until the user quits.
    pub fn run(&mut self) -> Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.run_loop(&mut terminal);

        // Cleanup
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ) -> Result<()> {
        let mut last_frame = Instant::now();
        loop {
            if self.dirty.replace(false) {
                terminal.draw(|f| self.render(f))?;
            }

            if event::poll(FRAME)?
                && let Event::Key(key) = event::read()?
                && self.handle_key(key).is_break()
            {
                info!("demo closed");
                return Ok(());
            }

            let now = Instant::now();
            self.scheduler.advance(now - last_frame);
            last_frame = now;
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        if key.kind != KeyEventKind::Press {
            return ControlFlow::Continue(());
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return ControlFlow::Break(()),
            KeyCode::Char('d') => {
                let config = TypewriterConfig {
                    direction: self.config.direction.reversed(),
                    ..self.config
                };
                self.reconfigure(config);
            }
            KeyCode::Char('v') => {
                let config = TypewriterConfig {
                    style: self.config.style.toggled(),
                    ..self.config
                };
                self.reconfigure(config);
            }
            code => {
                if let Some(control) = Control::from_key(code) {
                    self.apply(control);
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Applies a control if it is currently enabled. Returns whether it was.
    pub fn apply(&mut self, control: Control) -> bool {
        if !self.controls.get().is_enabled(control) {
            debug!(?control, "control disabled");
            return false;
        }

        match control {
            Control::Start => self.start(),
            Control::Stop => self.labels.iter().for_each(TypewriterDriver::pause),
            Control::Reset => self.labels.iter().for_each(TypewriterDriver::reset),
            Control::Restart => self.restart(),
            // Last first, so a chained completion never starts a finished follower.
            Control::Complete => self.labels.iter().rev().for_each(TypewriterDriver::complete),
        }

        // Set after the drivers ran so it wins over anything the chain set.
        self.controls.set(ControlState::after(control));
        self.dirty.set(true);
        true
    }

    /// Resumes the first unfinished label, or replays everything if all are done.
    fn start(&self) {
        match self.labels.iter().position(|label| !label.is_complete()) {
            Some(index) => self.labels[index].start(Some(self.chain.completion(index))),
            None => self.restart(),
        }
    }

    fn restart(&self) {
        let Some((first, rest)) = self.labels.split_first() else {
            return;
        };
        rest.iter().for_each(TypewriterDriver::reset);
        first.restart(Some(self.chain.completion(0)));
    }

    fn reconfigure(&mut self, config: TypewriterConfig) {
        info!(
            direction = ?config.direction,
            style = ?config.style,
            "animation reconfigured"
        );
        self.config = config;
        for label in &self.labels {
            label.set_config(config);
        }
        self.controls.set(ControlState::after(Control::Reset));
        self.dirty.set(true);
    }

    #[cfg(test)]
    fn controls(&self) -> ControlState {
        self.controls.get()
    }

    #[cfg(test)]
    fn labels(&self) -> &[TypewriterDriver] {
        &self.labels
    }

    #[cfg(test)]
    fn scheduler(&self) -> &ManualScheduler {
        &self.scheduler
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn render(&self, f: &mut ratatui::Frame) {
        let area = f.area();
        f.render_widget(Clear, area);

        let content_width = 80.min(area.width.saturating_sub(4));
        let content_x = (area.width.saturating_sub(content_width)) / 2;
        let content_area = Rect::new(content_x, 0, content_width, area.height);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Top separator
                Constraint::Length(1), // Spacing
                Constraint::Min(1),    // Labels
                Constraint::Length(1), // Status
                Constraint::Length(1), // Hints
            ])
            .split(content_area);

        let separator =
            Paragraph::new("─".repeat(content_width as usize)).style(Style::default().fg(DIM));
        f.render_widget(separator, chunks[0]);

        let mut lines: Vec<Line<'static>> = Vec::new();
        for label in &self.labels {
            lines.extend(label.render_text(BACKGROUND).lines);
            lines.push(Line::default());
        }
        let labels = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
        f.render_widget(labels, chunks[2]);

        f.render_widget(Paragraph::new(self.status_line()), chunks[3]);
        f.render_widget(Paragraph::new(self.hint_line()), chunks[4]);
    }

    fn status_line(&self) -> Line<'static> {
        let direction = if self.config.direction.is_forward() {
            "forward"
        } else {
            "backward"
        };
        let style = if self.config.style.is_reveal() {
            "reveal"
        } else {
            "hide"
        };
        Line::from(vec![
            Span::styled(" d ", Style::default().fg(ACCENT)),
            Span::styled(direction, Style::default().fg(Color::White)),
            Span::styled("   v ", Style::default().fg(ACCENT)),
            Span::styled(style, Style::default().fg(Color::White)),
            Span::styled(
                format!("   {:?}", self.config.typing_interval),
                Style::default().fg(DIM),
            ),
        ])
    }

    fn hint_line(&self) -> Line<'static> {
        let controls = self.controls.get();
        let mut spans = Vec::new();
        for control in Control::ALL {
            let (key_style, label_style) = if controls.is_enabled(control) {
                (
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                    Style::default().fg(Color::White),
                )
            } else {
                (Style::default().fg(DIM), Style::default().fg(DIM))
            };
            spans.push(Span::styled(format!(" {} ", control.key()), key_style));
            spans.push(Span::styled(control.label(), label_style));
        }
        spans.push(Span::styled(" · q quit", Style::default().fg(DIM)));
        Line::from(spans)
    }
}
