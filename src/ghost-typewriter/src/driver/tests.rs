use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;
use crate::config::EmptyTextPolicy;
use crate::scheduler::ManualScheduler;

fn driver(text: &str, config: TypewriterConfig) -> (ManualScheduler, TypewriterDriver) {
    let scheduler = ManualScheduler::new();
    let driver = TypewriterDriver::with_config(scheduler.clone(), config);
    driver.set_styled_text(text);
    (scheduler, driver)
}

fn counting_completion() -> (Rc<Cell<usize>>, Completion) {
    let count = Rc::new(Cell::new(0));
    let inner = Rc::clone(&count);
    (count, Box::new(move || inner.set(inner.get() + 1)))
}

fn record_events(driver: &TypewriterDriver) -> Rc<RefCell<Vec<DriverEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    driver.set_listener(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn alphas(driver: &TypewriterDriver) -> Vec<f32> {
    driver.with_styled_text(|text| text.alphas())
}

#[test]
fn test_new_driver_is_idle() {
    let scheduler = ManualScheduler::new();
    let driver = TypewriterDriver::new(scheduler.clone());
    assert_eq!(driver.phase(), AnimationPhase::Idle);
    assert!(!driver.is_animating());
    assert_eq!(driver.config(), TypewriterConfig::default());
    assert_eq!(scheduler.active_timers(), 0);
}

#[test]
fn test_set_text_applies_start_presentation() {
    let (_, reveal) = driver("Test", TypewriterConfig::forward_reveal());
    assert_eq!(alphas(&reveal), vec![0.0; 4]);

    let (_, hide) = driver("Test", TypewriterConfig::backward_hide());
    assert_eq!(alphas(&hide), vec![1.0; 4]);
    assert_eq!(hide.offset(), 3);
}

#[test]
fn test_start_uses_configured_interval() {
    let config = TypewriterConfig::default().with_typing_interval(Duration::from_secs(20));
    let (scheduler, driver) = driver("Test", config);
    driver.start(None);

    assert_eq!(scheduler.scheduled_intervals(), vec![Duration::from_secs(20)]);
    assert!(driver.is_animating());
}

#[test]
fn test_set_typing_interval_applies_to_next_start() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::default());
    driver.set_typing_interval(Duration::from_millis(5));
    assert_eq!(driver.phase(), AnimationPhase::Idle);

    driver.start(None);
    assert_eq!(scheduler.scheduled_intervals(), vec![Duration::from_millis(5)]);
}

#[test]
fn test_sub_millisecond_intervals_reach_the_scheduler() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::default());
    driver.set_typing_interval(Duration::from_micros(1500));
    driver.start(None);
    driver.set_typing_interval(Duration::from_micros(500));
    driver.start(None);

    assert_eq!(
        scheduler.scheduled_intervals(),
        vec![Duration::from_micros(1500), Duration::from_micros(500)]
    );
    assert_eq!(driver.config().typing_interval, Duration::from_micros(500));
}

#[test]
fn test_forward_reveal_one_character_per_tick() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::forward_reveal());
    driver.start(None);

    scheduler.tick();
    assert_eq!(alphas(&driver), vec![1.0, 0.0, 0.0, 0.0]);
    scheduler.tick();
    assert_eq!(alphas(&driver), vec![1.0, 1.0, 0.0, 0.0]);
    assert_eq!(driver.offset(), 2);
}

#[test]
fn test_backward_reveal_one_character_per_tick() {
    let config = TypewriterConfig::new(AnimationDirection::Backward, AnimationStyle::Reveal);
    let (scheduler, driver) = driver("Test", config);
    driver.start(None);

    scheduler.tick();
    assert_eq!(alphas(&driver), vec![0.0, 0.0, 0.0, 1.0]);
    scheduler.tick();
    assert_eq!(alphas(&driver), vec![0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn test_forward_hide_one_character_per_tick() {
    let config = TypewriterConfig::new(AnimationDirection::Forward, AnimationStyle::Hide);
    let (scheduler, driver) = driver("Test", config);
    driver.start(None);

    scheduler.tick();
    assert_eq!(alphas(&driver), vec![0.0, 1.0, 1.0, 1.0]);
    scheduler.tick();
    assert_eq!(alphas(&driver), vec![0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn test_backward_hide_one_character_per_tick() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::backward_hide());
    driver.start(None);

    scheduler.tick();
    assert_eq!(alphas(&driver), vec![1.0, 1.0, 1.0, 0.0]);
    scheduler.tick();
    assert_eq!(alphas(&driver), vec![1.0, 1.0, 0.0, 0.0]);
}

#[test]
fn test_completion_fires_once_on_last_tick() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::forward_reveal());
    let (count, completion) = counting_completion();
    driver.start(Some(completion));

    scheduler.tick_n(3);
    assert_eq!(count.get(), 0);
    assert!(!driver.is_complete());

    scheduler.tick();
    assert_eq!(count.get(), 1);
    assert!(driver.is_complete());
    assert_eq!(driver.phase(), AnimationPhase::Complete);
    assert_eq!(scheduler.active_timers(), 0);

    assert_eq!(scheduler.tick_n(5), 0);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_pause_keeps_progress_and_is_idempotent() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::forward_reveal());
    driver.start(None);
    scheduler.tick_n(2);

    driver.pause();
    let once = (driver.state(), alphas(&driver));
    driver.pause();
    let twice = (driver.state(), alphas(&driver));

    assert_eq!(once, twice);
    assert_eq!(driver.phase(), AnimationPhase::Paused);
    assert!(!driver.is_animating());
    assert_eq!(scheduler.active_timers(), 0);
    assert_eq!(scheduler.tick(), 0);
}

#[test]
fn test_pause_when_idle_is_noop() {
    let (_, driver) = driver("Test", TypewriterConfig::forward_reveal());
    driver.pause();
    assert_eq!(driver.phase(), AnimationPhase::Idle);
}

#[test]
fn test_resume_does_not_rehide() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::forward_reveal());
    let (count, completion) = counting_completion();
    driver.start(Some(completion));
    scheduler.tick_n(2);
    driver.pause();

    driver.start(None);
    assert_eq!(alphas(&driver), vec![1.0, 1.0, 0.0, 0.0]);
    scheduler.tick_n(2);

    assert_eq!(alphas(&driver), vec![1.0; 4]);
    assert_eq!(count.get(), 1, "completion registered before pause survives resume");
}

#[test]
fn test_start_while_running_replaces_timer() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::forward_reveal());
    driver.start(None);
    scheduler.tick();
    driver.start(None);

    assert_eq!(scheduler.active_timers(), 1);
    assert_eq!(scheduler.scheduled_intervals().len(), 2);
    scheduler.tick();
    assert_eq!(alphas(&driver), vec![1.0, 1.0, 0.0, 0.0]);
}

#[test]
fn test_reset_restores_start_presentation_without_restarting() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::forward_reveal());
    driver.start(None);
    scheduler.tick_n(3);

    driver.reset();
    assert_eq!(alphas(&driver), vec![0.0; 4]);
    assert_eq!(driver.offset(), 0);
    assert_eq!(driver.phase(), AnimationPhase::Idle);
    assert_eq!(scheduler.tick(), 0);
}

#[test]
fn test_restart_discards_partial_progress() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::backward_hide());
    driver.start(None);
    scheduler.tick_n(2);

    driver.restart(None);
    assert_eq!(alphas(&driver), vec![1.0; 4]);
    assert_eq!(driver.offset(), 3);
    assert!(driver.is_animating());
    assert_eq!(scheduler.active_timers(), 1);

    scheduler.tick();
    assert_eq!(alphas(&driver), vec![1.0, 1.0, 1.0, 0.0]);
}

#[test]
fn test_complete_before_start_applies_end_presentation() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::forward_reveal());
    let events = record_events(&driver);

    driver.complete();

    assert_eq!(alphas(&driver), vec![1.0; 4]);
    assert!(driver.is_complete());
    assert_eq!(driver.offset(), 0);
    assert_eq!(scheduler.active_timers(), 0);
    assert_eq!(
        events.borrow().last(),
        Some(&DriverEvent::Completed { forced: true })
    );
}

#[test]
fn test_complete_mid_run_fires_completion_once() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::backward_hide());
    let (count, completion) = counting_completion();
    driver.start(Some(completion));
    scheduler.tick();

    driver.complete();
    driver.complete();
    scheduler.tick_n(4);

    assert_eq!(alphas(&driver), vec![0.0; 4]);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_start_after_completion_begins_fresh_run() {
    let (scheduler, driver) = driver("ab", TypewriterConfig::forward_reveal());
    driver.start(None);
    scheduler.tick_n(2);
    assert!(driver.is_complete());

    driver.start(None);
    assert_eq!(alphas(&driver), vec![0.0, 0.0]);
    assert!(!driver.is_complete());
    scheduler.tick();
    assert_eq!(alphas(&driver), vec![1.0, 0.0]);
}

#[test]
fn test_configure_mid_run_resets_and_cancels() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::forward_reveal());
    driver.start(None);
    scheduler.tick_n(2);

    driver.configure(AnimationDirection::Backward, AnimationStyle::Hide);

    assert_eq!(driver.phase(), AnimationPhase::Idle);
    assert_eq!(scheduler.active_timers(), 0);
    assert_eq!(alphas(&driver), vec![1.0; 4]);
    assert_eq!(driver.offset(), 3);
    assert_eq!(driver.config().typing_interval, Duration::from_millis(100));
}

#[test]
fn test_set_text_while_running_stops_animation() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::forward_reveal());
    driver.start(None);
    scheduler.tick();

    driver.set_styled_text("Hello");

    assert_eq!(driver.phase(), AnimationPhase::Idle);
    assert_eq!(scheduler.active_timers(), 0);
    assert_eq!(alphas(&driver), vec![0.0; 5]);
}

#[test]
fn test_empty_text_completes_immediately() {
    let (scheduler, driver) = driver("", TypewriterConfig::forward_reveal());
    let (count, completion) = counting_completion();

    driver.start(Some(completion));

    assert_eq!(count.get(), 1);
    assert!(driver.is_complete());
    assert!(!driver.is_animating());
    assert!(scheduler.scheduled_intervals().is_empty());
}

#[test]
fn test_empty_text_ignore_policy_is_noop() {
    let config = TypewriterConfig::backward_hide().with_empty_text(EmptyTextPolicy::Ignore);
    let (scheduler, driver) = driver("", config);
    let (count, completion) = counting_completion();

    driver.start(Some(completion));

    assert_eq!(count.get(), 0);
    assert_eq!(driver.phase(), AnimationPhase::Idle);
    assert!(scheduler.scheduled_intervals().is_empty());
}

#[test]
fn test_dropping_driver_cancels_timer() {
    let (scheduler, driver) = driver("Test", TypewriterConfig::forward_reveal());
    driver.start(None);
    assert_eq!(scheduler.active_timers(), 1);

    drop(driver);

    assert_eq!(scheduler.active_timers(), 0);
    assert_eq!(scheduler.tick(), 0);
}

#[test]
fn test_clone_shares_animation() {
    let (scheduler, driver) = driver("ab", TypewriterConfig::forward_reveal());
    let other = driver.clone();
    other.start(None);
    drop(other);

    scheduler.tick();
    assert_eq!(alphas(&driver), vec![1.0, 0.0]);
}

#[test]
fn test_listener_sees_every_tick() {
    let (scheduler, driver) = driver("ab", TypewriterConfig::forward_reveal());
    let events = record_events(&driver);
    driver.start(None);
    scheduler.tick_n(2);

    let events = events.borrow();
    let visible: Vec<String> = events
        .iter()
        .filter_map(|event| match event {
            DriverEvent::Updated(text) => Some(text.visible_content()),
            DriverEvent::Completed { .. } => None,
        })
        .collect();
    assert_eq!(visible, vec!["", "a", "ab"]);
    assert_eq!(
        events.last(),
        Some(&DriverEvent::Completed { forced: false })
    );
}

#[test]
fn test_clear_listener_stops_notifications() {
    let (scheduler, driver) = driver("ab", TypewriterConfig::forward_reveal());
    let events = record_events(&driver);
    driver.clear_listener();
    driver.start(None);
    scheduler.tick_n(2);
    assert!(events.borrow().is_empty());
}

#[test]
fn test_completion_may_restart_its_own_driver() {
    let (scheduler, driver) = driver("ab", TypewriterConfig::forward_reveal());
    let runs = Rc::new(Cell::new(0));

    let weak = driver.downgrade();
    let counter = Rc::clone(&runs);
    driver.start(Some(Box::new(move || {
        counter.set(counter.get() + 1);
        if let Some(driver) = weak.upgrade() {
            driver.restart(None);
        }
    })));

    scheduler.tick_n(2);
    assert_eq!(runs.get(), 1);
    assert!(driver.is_animating());
    assert_eq!(alphas(&driver), vec![0.0, 0.0]);
    assert_eq!(scheduler.active_timers(), 1);
}

#[test]
fn test_completed_is_sent_before_completion_restarts() {
    let (scheduler, driver) = driver("ab", TypewriterConfig::forward_reveal());
    let seen = Rc::new(RefCell::new(Vec::new()));

    let weak = driver.downgrade();
    let sink = Rc::clone(&seen);
    driver.set_listener(move |event| {
        if let DriverEvent::Completed { .. } = event
            && let Some(driver) = weak.upgrade()
        {
            sink.borrow_mut().push(driver.phase());
        }
    });

    let weak = driver.downgrade();
    driver.start(Some(Box::new(move || {
        if let Some(driver) = weak.upgrade() {
            driver.restart(None);
        }
    })));

    scheduler.tick_n(2);
    assert_eq!(*seen.borrow(), vec![AnimationPhase::Complete]);
    assert!(driver.is_animating());
}

#[test]
fn test_listener_may_pause_driver() {
    let (scheduler, driver) = driver("abc", TypewriterConfig::forward_reveal());
    let weak = driver.downgrade();
    driver.set_listener(move |event| {
        if let DriverEvent::Updated(text) = event
            && text.visible_content() == "a"
            && let Some(driver) = weak.upgrade()
        {
            driver.pause();
        }
    });

    driver.start(None);
    scheduler.tick_n(3);
    assert_eq!(driver.phase(), AnimationPhase::Paused);
    assert_eq!(driver.offset(), 1);
}

#[test]
fn test_completion_chains_next_driver() {
    let scheduler = ManualScheduler::new();
    let first = TypewriterDriver::new(scheduler.clone());
    let second = TypewriterDriver::new(scheduler.clone());
    first.set_styled_text("ab");
    second.set_styled_text("cd");

    let next = second.clone();
    first.start(Some(Box::new(move || next.start(None))));

    scheduler.tick_n(2);
    assert!(first.is_complete());
    assert!(second.is_animating());

    scheduler.tick_n(2);
    assert!(second.is_complete());
    assert_eq!(alphas(&second), vec![1.0, 1.0]);
}

#[test]
fn test_render_line_uses_fallback_color() {
    let (scheduler, driver) = driver("ab", TypewriterConfig::forward_reveal());
    driver.set_fallback_color(Color::Green);
    driver.start(None);
    scheduler.tick();

    let line = driver.render_line(Color::Black);
    assert_eq!(line.spans.len(), 2);
    assert_eq!(line.spans[0].content, "a");
    assert_eq!(driver.fallback_color(), Color::Green);
}
