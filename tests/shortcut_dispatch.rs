//! Dispatch order, propagation and chord behaviour of a single dispatcher

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pdf_keys::shortcuts::{
    handler, Dispatch, DispatcherConfig, ManualClock, Propagation, ShortcutDispatcher,
    ShortcutEvent, ShortcutOptions,
};
use std::cell::RefCell;
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<&'static str>>>;

fn setup() -> (ShortcutDispatcher, ManualClock, Calls) {
    let clock = ManualClock::new();
    let dispatcher =
        ShortcutDispatcher::with_clock(DispatcherConfig::default(), Rc::new(clock.clone()));
    (dispatcher, clock, Rc::new(RefCell::new(Vec::new())))
}

fn record(calls: &Calls, name: &'static str) -> pdf_keys::shortcuts::Handler {
    let calls = calls.clone();
    handler(move |_| calls.borrow_mut().push(name))
}

fn press(dispatcher: &mut ShortcutDispatcher, code: KeyCode) -> (ShortcutEvent, Dispatch) {
    let mut event = ShortcutEvent::new(KeyEvent::new(code, KeyModifiers::NONE));
    let outcome = dispatcher.handle_key_event(&mut event);
    (event, outcome)
}

fn prefix(dispatcher: &mut ShortcutDispatcher) -> Dispatch {
    let mut event = ShortcutEvent::new(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL));
    let outcome = dispatcher.handle_key_event(&mut event);
    assert!(event.is_default_prevented(), "prefix press is always swallowed");
    outcome
}

#[test]
fn test_higher_priority_runs_first() {
    let (mut dispatcher, _clock, calls) = setup();
    dispatcher.register("m", "low", record(&calls, "low"), ShortcutOptions::new().priority(1));
    dispatcher.register("m", "high", record(&calls, "high"), ShortcutOptions::new().priority(5));
    dispatcher.register("m", "mid", record(&calls, "mid"), ShortcutOptions::new().priority(3));

    let (_, outcome) = press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(*calls.borrow(), vec!["high", "mid", "low"]);
    assert_eq!(outcome.invoked(), 3);
}

#[test]
fn test_equal_priority_keeps_registration_order() {
    let (mut dispatcher, _clock, calls) = setup();
    dispatcher.register("m", "first", record(&calls, "first"), ShortcutOptions::new());
    dispatcher.register("m", "second", record(&calls, "second"), ShortcutOptions::new());

    press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(*calls.borrow(), vec!["first", "second"]);
}

#[test]
fn test_stop_skips_lower_priorities() {
    let (mut dispatcher, _clock, calls) = setup();
    let stop_calls = calls.clone();
    dispatcher.register(
        "m",
        "stopper",
        handler(move |_| {
            stop_calls.borrow_mut().push("stopper");
            Propagation::Stop
        }),
        ShortcutOptions::new().priority(5),
    );
    dispatcher.register("m", "low", record(&calls, "low"), ShortcutOptions::new().priority(1));

    let (event, outcome) = press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(*calls.borrow(), vec!["stopper"]);
    assert_eq!(outcome.invoked(), 1);
    assert!(!event.is_default_prevented());
}

#[test]
fn test_prevent_default_stops_dispatch() {
    let (mut dispatcher, _clock, calls) = setup();
    let high_calls = calls.clone();
    dispatcher.register(
        "arrowdown",
        "high",
        handler(move |event| {
            high_calls.borrow_mut().push("high");
            event.prevent_default();
        }),
        ShortcutOptions::new().priority(8),
    );
    dispatcher.register("arrowdown", "low", record(&calls, "low"), ShortcutOptions::new());

    let (event, _) = press(&mut dispatcher, KeyCode::Down);
    assert!(event.is_consumed());
    assert_eq!(*calls.borrow(), vec!["high"]);
}

#[test]
fn test_false_condition_skips_only_that_registration() {
    let (mut dispatcher, _clock, calls) = setup();
    dispatcher.register(
        "escape",
        "dialog",
        record(&calls, "dialog"),
        ShortcutOptions::new().priority(20).when(|| false),
    );
    dispatcher.register("escape", "canvas", record(&calls, "canvas"), ShortcutOptions::new());

    let (_, outcome) = press(&mut dispatcher, KeyCode::Esc);
    assert_eq!(*calls.borrow(), vec!["canvas"]);
    assert_eq!(
        outcome,
        Dispatch::Handled {
            key: "escape".into(),
            invoked: 1
        }
    );
}

#[test]
fn test_unregister_all_removes_one_consumer() {
    let (mut dispatcher, _clock, calls) = setup();
    for key in ["m", "arrowup", "ctrl+x+m"] {
        dispatcher.register(key, "canvas", record(&calls, "canvas"), ShortcutOptions::new());
    }
    dispatcher.register("m", "dialog", record(&calls, "dialog"), ShortcutOptions::new());

    dispatcher.unregister_all("canvas");

    assert_eq!(dispatcher.registered_keys(), vec!["m".to_string()]);
    press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(*calls.borrow(), vec!["dialog"]);
}

#[test]
fn test_reregistering_replaces_previous_entry() {
    let (mut dispatcher, _clock, calls) = setup();
    dispatcher.register("m", "canvas", record(&calls, "old"), ShortcutOptions::new().priority(1));
    dispatcher.register("m", "other", record(&calls, "other"), ShortcutOptions::new().priority(5));
    dispatcher.register("m", "canvas", record(&calls, "new"), ShortcutOptions::new().priority(9));

    assert_eq!(dispatcher.registration_count("m"), 2);
    press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(*calls.borrow(), vec!["new", "other"]);
}

#[test]
fn test_chord_hits_only_chord_binding() {
    let (mut dispatcher, _clock, calls) = setup();
    dispatcher.register("ctrl+x+m", "dialog", record(&calls, "chord"), ShortcutOptions::new());
    dispatcher.register("m", "canvas", record(&calls, "plain"), ShortcutOptions::new());

    assert_eq!(prefix(&mut dispatcher), Dispatch::PrefixArmed);
    assert!(dispatcher.is_prefix_armed());

    let (_, outcome) = press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(outcome.lookup_key(), Some("ctrl+x+m"));
    assert!(!dispatcher.is_prefix_armed());
    assert!(dispatcher.next_deadline().is_none());

    press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(*calls.borrow(), vec!["chord", "plain"]);
}

#[test]
fn test_chord_window_expires() {
    let (mut dispatcher, clock, calls) = setup();
    dispatcher.register("ctrl+x+m", "dialog", record(&calls, "chord"), ShortcutOptions::new());
    dispatcher.register("m", "canvas", record(&calls, "plain"), ShortcutOptions::new());

    prefix(&mut dispatcher);
    clock.advance_ms(999);
    assert!(!dispatcher.fire_due_timers());
    assert!(dispatcher.is_prefix_armed());

    clock.advance_ms(1);
    assert!(dispatcher.fire_due_timers());
    assert!(!dispatcher.is_prefix_armed());

    press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(*calls.borrow(), vec!["plain"]);
}

#[test]
fn test_expired_window_is_noticed_on_next_key() {
    let (mut dispatcher, clock, calls) = setup();
    dispatcher.register("m", "canvas", record(&calls, "plain"), ShortcutOptions::new());

    prefix(&mut dispatcher);
    clock.advance_ms(1500);

    let (_, outcome) = press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(outcome.lookup_key(), Some("m"));
    assert_eq!(*calls.borrow(), vec!["plain"]);
}

#[test]
fn test_unmatched_chord_stays_armed_within_window() {
    let (mut dispatcher, clock, calls) = setup();
    dispatcher.register("ctrl+x+m", "dialog", record(&calls, "chord"), ShortcutOptions::new());

    prefix(&mut dispatcher);
    clock.advance_ms(300);
    let (event, outcome) = press(&mut dispatcher, KeyCode::Char('q'));
    assert_eq!(
        outcome,
        Dispatch::Unmatched {
            key: "ctrl+x+q".into()
        }
    );
    assert!(!event.is_consumed());
    assert!(dispatcher.is_prefix_armed());

    clock.advance_ms(300);
    press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(*calls.borrow(), vec!["chord"]);
    assert!(!dispatcher.is_prefix_armed());
}

#[test]
fn test_unmatched_chord_does_not_extend_window() {
    let (mut dispatcher, clock, calls) = setup();
    dispatcher.register("ctrl+x+m", "dialog", record(&calls, "chord"), ShortcutOptions::new());

    prefix(&mut dispatcher);
    clock.advance_ms(600);
    press(&mut dispatcher, KeyCode::Char('q'));
    clock.advance_ms(600);

    let (_, outcome) = press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(outcome.lookup_key(), Some("m"));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_rearmed_prefix_keeps_its_own_window() {
    let (mut dispatcher, clock, calls) = setup();
    dispatcher.register("ctrl+x+m", "dialog", record(&calls, "chord"), ShortcutOptions::new());

    prefix(&mut dispatcher);
    clock.advance_ms(600);
    let (_, outcome) = press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(outcome.invoked(), 1);

    // The first window would have ended at 1000ms
    prefix(&mut dispatcher);
    clock.advance_ms(500);
    assert!(!dispatcher.fire_due_timers());
    assert!(dispatcher.is_prefix_armed());

    clock.advance_ms(500);
    assert!(dispatcher.fire_due_timers());
    assert!(!dispatcher.is_prefix_armed());
    assert_eq!(*calls.borrow(), vec!["chord"]);
}

#[test]
fn test_chord_with_false_conditions_still_disarms() {
    let (mut dispatcher, _clock, calls) = setup();
    dispatcher.register(
        "ctrl+x+c",
        "dialog",
        record(&calls, "copy"),
        ShortcutOptions::new().when(|| false),
    );

    prefix(&mut dispatcher);
    let (_, outcome) = press(&mut dispatcher, KeyCode::Char('c'));
    assert_eq!(outcome.invoked(), 0);
    assert!(!dispatcher.is_prefix_armed());
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_prefix_twice_looks_up_prefix_chord() {
    let (mut dispatcher, _clock, calls) = setup();
    dispatcher.register("ctrl+x+x", "swap", record(&calls, "swap"), ShortcutOptions::new());

    prefix(&mut dispatcher);
    let mut event = ShortcutEvent::new(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL));
    let outcome = dispatcher.handle_key_event(&mut event);

    assert_eq!(outcome.lookup_key(), Some("ctrl+x+x"));
    assert_eq!(*calls.borrow(), vec!["swap"]);
    assert!(!dispatcher.is_prefix_armed());
}

#[test]
fn test_shifted_prefix_still_arms() {
    let (mut dispatcher, _clock, _calls) = setup();
    let mut event = ShortcutEvent::new(KeyEvent::new(
        KeyCode::Char('X'),
        KeyModifiers::CONTROL | KeyModifiers::SHIFT,
    ));
    assert_eq!(dispatcher.handle_key_event(&mut event), Dispatch::PrefixArmed);
}

#[test]
fn test_release_events_are_ignored() {
    let (mut dispatcher, _clock, calls) = setup();
    dispatcher.register("m", "canvas", record(&calls, "plain"), ShortcutOptions::new());

    let mut event = ShortcutEvent::new(KeyEvent::new_with_kind(
        KeyCode::Char('m'),
        KeyModifiers::NONE,
        KeyEventKind::Release,
    ));
    assert_eq!(dispatcher.handle_key_event(&mut event), Dispatch::Ignored);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_shutdown_detaches_and_clears() {
    let (mut dispatcher, _clock, calls) = setup();
    dispatcher.register("m", "canvas", record(&calls, "plain"), ShortcutOptions::new());
    prefix(&mut dispatcher);

    dispatcher.shutdown();

    assert!(!dispatcher.is_listening());
    assert!(!dispatcher.is_prefix_armed());
    assert!(dispatcher.next_deadline().is_none());
    assert!(dispatcher.registered_keys().is_empty());
    let (_, outcome) = press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(outcome, Dispatch::Detached);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_custom_prefix_from_config() {
    let config = pdf_keys::config::config::ShortcutConfig {
        chord_prefix: "ctrl+k".into(),
        ..Default::default()
    };
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let mut dispatcher = ShortcutDispatcher::with_config(DispatcherConfig::from_config(&config));
    dispatcher.register("ctrl+k+m", "dialog", record(&calls, "chord"), ShortcutOptions::new());

    let mut event = ShortcutEvent::new(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL));
    assert_eq!(dispatcher.handle_key_event(&mut event), Dispatch::PrefixArmed);
    press(&mut dispatcher, KeyCode::Char('m'));
    assert_eq!(*calls.borrow(), vec!["chord"]);
}
