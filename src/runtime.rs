use std::sync::mpsc::Sender;
use std::thread;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::timer::TimerId;

/// Unified event type consumed by the app event loop. Keyboard and resize
/// events come from the input thread; timer ticks come from the spawned
/// timers, tagged with the owning timer's id.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Timer(TimerId),
}

impl From<TimerId> for AppEvent {
    fn from(id: TimerId) -> Self {
        AppEvent::Timer(id)
    }
}

/// Forward terminal events into the app channel from a background thread.
/// The thread exits once the receiving side is gone.
pub fn spawn_input_thread(tx: Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::read() {
            Ok(CtEvent::Key(key)) => {
                if tx.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
            Ok(CtEvent::Resize(_, _)) => {
                if tx.send(AppEvent::Resize).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    });
}
