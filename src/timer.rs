use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub type TimerId = u64;

/// Cancellation handle for a running timer. Every tick carries the owning
/// timer's id, so a consumer that replaced its timer can drop ticks that
/// were already in flight when the old one was cancelled.
#[derive(Clone, Debug)]
pub struct TimerHandle {
    id: TimerId,
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    fn new(id: TimerId) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Source of cancellable tick signals. Exactly one timer is live per
/// controller state that declares one; the controller cancels the previous
/// handle before storing a new one.
pub trait TimerSpawner {
    /// Emit a tick every `interval` until the handle is cancelled.
    fn repeating(&mut self, interval: Duration) -> TimerHandle;
    /// Emit a single tick after `delay` unless cancelled first.
    fn one_shot(&mut self, delay: Duration) -> TimerHandle;
}

/// Production spawner: one background thread per timer, ticks delivered as
/// messages into the app event channel.
pub struct ThreadTimerSpawner<E> {
    tx: Sender<E>,
    next_id: TimerId,
}

impl<E> ThreadTimerSpawner<E> {
    pub fn new(tx: Sender<E>) -> Self {
        Self { tx, next_id: 0 }
    }

    fn next_handle(&mut self) -> TimerHandle {
        self.next_id += 1;
        TimerHandle::new(self.next_id)
    }
}

impl<E: From<TimerId> + Send + 'static> TimerSpawner for ThreadTimerSpawner<E> {
    fn repeating(&mut self, interval: Duration) -> TimerHandle {
        let handle = self.next_handle();
        let tx = self.tx.clone();
        let id = handle.id();
        let cancelled = handle.cancelled.clone();

        thread::spawn(move || loop {
            thread::sleep(interval);
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(E::from(id)).is_err() {
                break;
            }
        });

        handle
    }

    fn one_shot(&mut self, delay: Duration) -> TimerHandle {
        let handle = self.next_handle();
        let tx = self.tx.clone();
        let id = handle.id();
        let cancelled = handle.cancelled.clone();

        thread::spawn(move || {
            thread::sleep(delay);
            if !cancelled.load(Ordering::SeqCst) {
                let _ = tx.send(E::from(id));
            }
        });

        handle
    }
}

/// Record of a timer requested from a [`ManualTimerSpawner`].
#[derive(Clone, Debug)]
pub struct SpawnedTimer {
    pub handle: TimerHandle,
    pub interval: Duration,
    pub repeating: bool,
}

/// Test spawner: records requests and never ticks on its own, so tests can
/// fire ticks explicitly and inspect cancellation.
#[derive(Default)]
pub struct ManualTimerSpawner {
    next_id: TimerId,
    pub spawned: Vec<SpawnedTimer>,
}

impl ManualTimerSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&SpawnedTimer> {
        self.spawned.last()
    }

    fn record(&mut self, interval: Duration, repeating: bool) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle::new(self.next_id);
        self.spawned.push(SpawnedTimer {
            handle: handle.clone(),
            interval,
            repeating,
        });
        handle
    }
}

impl TimerSpawner for ManualTimerSpawner {
    fn repeating(&mut self, interval: Duration) -> TimerHandle {
        self.record(interval, true)
    }

    fn one_shot(&mut self, delay: Duration) -> TimerHandle {
        self.record(delay, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[derive(Debug, PartialEq)]
    struct Tick(TimerId);

    impl From<TimerId> for Tick {
        fn from(id: TimerId) -> Self {
            Tick(id)
        }
    }

    #[test]
    fn test_handle_cancellation_is_shared() {
        let handle = TimerHandle::new(1);
        let clone = handle.clone();
        assert!(!clone.is_cancelled());
        handle.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_thread_spawner_ids_are_unique() {
        let (tx, _rx) = mpsc::channel::<Tick>();
        let mut spawner = ThreadTimerSpawner::new(tx);
        let a = spawner.repeating(Duration::from_secs(60));
        let b = spawner.one_shot(Duration::from_secs(60));
        assert_ne!(a.id(), b.id());
        a.cancel();
        b.cancel();
    }

    #[test]
    fn test_repeating_timer_delivers_ticks() {
        let (tx, rx) = mpsc::channel::<Tick>();
        let mut spawner = ThreadTimerSpawner::new(tx);
        let handle = spawner.repeating(Duration::from_millis(5));

        let first = rx.recv_timeout(Duration::from_millis(500));
        assert_eq!(first, Ok(Tick(handle.id())));
        let second = rx.recv_timeout(Duration::from_millis(500));
        assert_eq!(second, Ok(Tick(handle.id())));

        handle.cancel();
    }

    #[test]
    fn test_one_shot_fires_once() {
        let (tx, rx) = mpsc::channel::<Tick>();
        let mut spawner = ThreadTimerSpawner::new(tx);
        let handle = spawner.one_shot(Duration::from_millis(5));

        assert_eq!(
            rx.recv_timeout(Duration::from_millis(500)),
            Ok(Tick(handle.id()))
        );
        // The thread exits after the single tick; the sender side is dropped
        // once the spawner goes out of scope, so no further tick can arrive.
        drop(spawner);
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_cancelled_one_shot_stays_silent() {
        let (tx, rx) = mpsc::channel::<Tick>();
        let mut spawner = ThreadTimerSpawner::new(tx);
        let handle = spawner.one_shot(Duration::from_millis(50));
        handle.cancel();
        drop(spawner);
        assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
    }

    #[test]
    fn test_manual_spawner_records_requests() {
        let mut spawner = ManualTimerSpawner::new();
        let a = spawner.repeating(Duration::from_secs(1));
        let b = spawner.one_shot(Duration::from_secs(2));

        assert_eq!(spawner.spawned.len(), 2);
        assert!(spawner.spawned[0].repeating);
        assert!(!spawner.spawned[1].repeating);
        assert_eq!(spawner.spawned[0].handle.id(), a.id());
        assert_eq!(spawner.last().unwrap().handle.id(), b.id());
        assert_ne!(a.id(), b.id());
    }
}
