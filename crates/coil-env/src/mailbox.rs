//! The state mailbox: single hand-off point between transport and
//! control loop.
//!
//! Exactly one producer context (the network side) calls [`submit`] and
//! [`latest_action`]; exactly one consumer context (the control loop)
//! calls [`await_next`]. Only the consumer ever blocks, and only in
//! `await_next`. Every operation is a total function — nothing here
//! returns a `Result`.
//!
//! Snapshots are delivered strictly in submission order so the control
//! loop answers the oldest observed game tick first even when the
//! network produces bursts. The suppression flag discards submissions
//! outright during windows where nobody drains the queue (e.g. between
//! training rollouts), keeping the FIFO bounded by use rather than by
//! eviction.
//!
//! [`submit`]: Mailbox::submit
//! [`await_next`]: Mailbox::await_next
//! [`latest_action`]: Mailbox::latest_action

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use coil_core::{Action, Snapshot};

/// Thread-safe snapshot/action hand-off between one producer and one
/// consumer.
///
/// Share it as `Arc<Mailbox>` between the transport server and the
/// control-loop adapter; there is no ambient singleton.
pub struct Mailbox {
    tx: Sender<Snapshot>,
    rx: Receiver<Snapshot>,
    latest: Mutex<Option<Snapshot>>,
    action: Mutex<Action>,
    suppressed: AtomicBool,
}

// Compile-time assertion: the mailbox must be shareable across the
// network and control-loop threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<Mailbox>();
};

impl Mailbox {
    /// Create an empty mailbox with no queued snapshots, a neutral
    /// action, and suppression off.
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            latest: Mutex::new(None),
            action: Mutex::new(Action::NEUTRAL),
            suppressed: AtomicBool::new(false),
        }
    }

    /// Queue a snapshot for the consumer. Non-blocking.
    ///
    /// While suppression is on the snapshot is discarded entirely: it
    /// is neither queued nor visible through [`latest_snapshot`].
    ///
    /// [`latest_snapshot`]: Mailbox::latest_snapshot
    pub fn submit(&self, snapshot: Snapshot) {
        if self.suppressed.load(Ordering::Acquire) {
            tracing::trace!("snapshot discarded while suppressed");
            return;
        }
        *self.latest.lock().unwrap() = Some(snapshot.clone());
        // Unbounded channel, receiver owned by self: send cannot block
        // and cannot fail.
        let _ = self.tx.send(snapshot);
    }

    /// Block until a snapshot is available, then pop and return the
    /// oldest one. Each queued snapshot is returned exactly once.
    pub fn await_next(&self) -> Snapshot {
        // The mailbox owns its sender, so the channel can never
        // disconnect while `self` is alive.
        self.rx
            .recv()
            .expect("mailbox sender outlives the receiver")
    }

    /// Non-blocking variant of [`await_next`](Mailbox::await_next).
    pub fn try_next(&self) -> Option<Snapshot> {
        match self.rx.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Overwrite the most recent action. Non-blocking.
    pub fn set_action(&self, action: Action) {
        *self.action.lock().unwrap() = action;
    }

    /// The most recent action, or [`Action::NEUTRAL`] if none has ever
    /// been set. Non-blocking.
    pub fn latest_action(&self) -> Action {
        *self.action.lock().unwrap()
    }

    /// Toggle discard-on-submit.
    pub fn set_suppressed(&self, suppressed: bool) {
        self.suppressed.store(suppressed, Ordering::Release);
    }

    /// Whether submissions are currently being discarded.
    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::Acquire)
    }

    /// A copy of the most recently submitted (non-discarded) snapshot,
    /// independent of the FIFO. For pollers such as renderers.
    pub fn latest_snapshot(&self) -> Option<Snapshot> {
        self.latest.lock().unwrap().clone()
    }

    /// Number of snapshots queued and not yet consumed.
    pub fn queued(&self) -> usize {
        self.rx.len()
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("queued", &self.queued())
            .field("suppressed", &self.is_suppressed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coil_core::SelfState;
    use std::sync::Arc;
    use std::thread;

    fn snapshot_with_size(size: f32) -> Snapshot {
        Snapshot {
            slither: Some(SelfState {
                size,
                ..SelfState::default()
            }),
            ..Snapshot::default()
        }
    }

    fn size_of(snapshot: &Snapshot) -> f32 {
        snapshot.slither.as_ref().unwrap().size
    }

    #[test]
    fn await_next_returns_fifo_order() {
        let mailbox = Mailbox::new();
        for i in 0..5 {
            mailbox.submit(snapshot_with_size(i as f32));
        }
        for i in 0..5 {
            assert_eq!(size_of(&mailbox.await_next()), i as f32);
        }
        assert_eq!(mailbox.queued(), 0);
    }

    #[test]
    fn await_next_blocks_until_submit() {
        let mailbox = Arc::new(Mailbox::new());
        let producer = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                thread::sleep(std::time::Duration::from_millis(20));
                mailbox.submit(snapshot_with_size(7.0));
            })
        };
        // Blocks until the producer delivers.
        let snapshot = mailbox.await_next();
        assert_eq!(size_of(&snapshot), 7.0);
        producer.join().unwrap();
    }

    #[test]
    fn fifo_order_holds_across_threads() {
        let mailbox = Arc::new(Mailbox::new());
        let producer = {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                for i in 0..100 {
                    mailbox.submit(snapshot_with_size(i as f32));
                }
            })
        };
        for i in 0..100 {
            assert_eq!(size_of(&mailbox.await_next()), i as f32);
        }
        producer.join().unwrap();
    }

    #[test]
    fn suppressed_submissions_are_never_observed() {
        let mailbox = Mailbox::new();
        mailbox.submit(snapshot_with_size(1.0));

        mailbox.set_suppressed(true);
        assert!(mailbox.is_suppressed());
        mailbox.submit(snapshot_with_size(2.0));
        mailbox.submit(snapshot_with_size(3.0));

        mailbox.set_suppressed(false);
        mailbox.submit(snapshot_with_size(4.0));

        assert_eq!(size_of(&mailbox.await_next()), 1.0);
        assert_eq!(size_of(&mailbox.await_next()), 4.0);
        assert_eq!(mailbox.queued(), 0);
        // The peek slot also skipped the suppressed window.
        assert_eq!(size_of(&mailbox.latest_snapshot().unwrap()), 4.0);
    }

    #[test]
    fn latest_action_defaults_to_neutral() {
        let mailbox = Mailbox::new();
        assert_eq!(mailbox.latest_action(), Action::NEUTRAL);
    }

    #[test]
    fn set_action_overwrites() {
        let mailbox = Mailbox::new();
        mailbox.set_action(Action::new(0.5, -0.5, 1.0));
        mailbox.set_action(Action::new(-0.25, 0.75, 0.0));
        assert_eq!(mailbox.latest_action(), Action::new(-0.25, 0.75, 0.0));
    }

    #[test]
    fn latest_snapshot_is_a_peek_not_a_pop() {
        let mailbox = Mailbox::new();
        mailbox.submit(snapshot_with_size(5.0));
        assert_eq!(size_of(&mailbox.latest_snapshot().unwrap()), 5.0);
        // The queue still delivers the snapshot.
        assert_eq!(mailbox.queued(), 1);
        assert_eq!(size_of(&mailbox.await_next()), 5.0);
        // The peek slot is not consumed.
        assert!(mailbox.latest_snapshot().is_some());
    }

    #[test]
    fn try_next_never_blocks() {
        let mailbox = Mailbox::new();
        assert!(mailbox.try_next().is_none());
        mailbox.submit(snapshot_with_size(1.0));
        assert!(mailbox.try_next().is_some());
        assert!(mailbox.try_next().is_none());
    }
}
