use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pdf_keys::shortcuts::{
    handler, DispatcherConfig, ManualClock, Propagation, ShortcutDispatcher, ShortcutEvent,
    ShortcutOptions,
};
use std::rc::Rc;

fn send(dispatcher: &mut ShortcutDispatcher, key: KeyEvent) {
    let mut event = ShortcutEvent::new(key);
    let result = dispatcher.handle_key_event(&mut event);
    println!(
        "Sending {:?} {:?}: {:?} (consumed: {})",
        key.modifiers,
        key.code,
        result,
        event.is_consumed()
    );
}

fn ctrl_x() -> KeyEvent {
    KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)
}

fn plain(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn main() -> anyhow::Result<()> {
    println!("Testing chord dispatcher...");

    let clock = ManualClock::new();
    let mut dispatcher =
        ShortcutDispatcher::with_clock(DispatcherConfig::default(), Rc::new(clock.clone()));

    dispatcher.register(
        "ctrl+x+m",
        "dialog",
        handler(|event| {
            event.prevent_default();
            println!("  -> dialog opened");
        }),
        ShortcutOptions::new().priority(10),
    );
    dispatcher.register(
        "m",
        "canvas",
        handler(|_| println!("  -> plain m (canvas)")),
        ShortcutOptions::new().priority(5),
    );
    dispatcher.register(
        "m",
        "toolbar",
        handler(|_| {
            println!("  -> plain m (toolbar, stops)");
            Propagation::Stop
        }),
        ShortcutOptions::new().priority(8),
    );

    println!("\nChord ctrl+x m:");
    send(&mut dispatcher, ctrl_x());
    send(&mut dispatcher, plain('m'));

    println!("\nPlain m:");
    send(&mut dispatcher, plain('m'));

    println!("\nChord window runs out:");
    send(&mut dispatcher, ctrl_x());
    clock.advance_ms(1200);
    println!("Timer fired: {}", dispatcher.fire_due_timers());
    send(&mut dispatcher, plain('m'));

    println!("\nPrefix twice:");
    send(&mut dispatcher, ctrl_x());
    send(&mut dispatcher, ctrl_x());
    dispatcher.fire_due_timers();

    println!("\nRegistrations:");
    println!("{}", serde_json::to_string_pretty(&dispatcher.registrations())?);

    println!();
    print!("{}", dispatcher.format_debug_info());
    Ok(())
}
