use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pdf_keys::shortcuts::{handler, ShortcutDispatcher, ShortcutEvent, ShortcutOptions};

fn create_dispatcher(consumers: usize) -> ShortcutDispatcher {
    let mut dispatcher = ShortcutDispatcher::new();

    let keys = ["arrowup", "arrowdown", "m", "f", "ctrl+x+m", "ctrl+x+f", "escape"];
    for i in 0..consumers {
        let consumer = format!("consumer-{}", i);
        for key in keys {
            dispatcher.register(
                key,
                &consumer,
                handler(|event| {
                    black_box(event.key_name());
                }),
                ShortcutOptions::new().priority((i % 7) as i32),
            );
        }
    }

    dispatcher
}

fn press(code: KeyCode, modifiers: KeyModifiers) -> ShortcutEvent {
    ShortcutEvent::new(KeyEvent::new(code, modifiers))
}

fn benchmark_plain_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_plain");

    for consumers in [1, 10, 100] {
        group.bench_function(format!("{}_consumers", consumers), |b| {
            let mut dispatcher = create_dispatcher(consumers);
            b.iter(|| {
                let mut event = press(KeyCode::Down, KeyModifiers::NONE);
                black_box(dispatcher.handle_key_event(&mut event));
            });
        });
    }

    group.finish();
}

fn benchmark_chords(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_chord");

    group.bench_function("prefix_then_m", |b| {
        let mut dispatcher = create_dispatcher(10);
        b.iter(|| {
            dispatcher.handle_key_event(&mut press(KeyCode::Char('x'), KeyModifiers::CONTROL));
            let mut event = press(KeyCode::Char('m'), KeyModifiers::NONE);
            black_box(dispatcher.handle_key_event(&mut event));
        });
    });

    group.bench_function("unmatched_key", |b| {
        let mut dispatcher = create_dispatcher(10);
        b.iter(|| {
            let mut event = press(KeyCode::Char('z'), KeyModifiers::NONE);
            black_box(dispatcher.handle_key_event(&mut event));
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_plain_keys, benchmark_chords);
criterion_main!(benches);
