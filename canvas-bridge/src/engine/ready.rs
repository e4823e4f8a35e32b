use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::time::Duration;

/// Creates a one-shot readiness notification.
///
/// The engine keeps the notifier and fires it once its scripts have loaded.
/// The frame loop polls the listener at the start of each tick.
pub fn ready_channel() -> (ReadyNotifier, ReadyListener) {
    let (tx, rx) = mpsc::sync_channel(1);
    (
        ReadyNotifier { tx },
        ReadyListener {
            rx,
            fired: false,
            abandoned: false,
        },
    )
}

#[derive(Debug)]
pub struct ReadyNotifier {
    tx: SyncSender<()>,
}

impl ReadyNotifier {
    /// Fires the notification. Consumes the notifier so it fires at most once.
    pub fn notify(self) {
        let _ = self.tx.try_send(());
    }
}

#[derive(Debug)]
pub struct ReadyListener {
    rx: Receiver<()>,
    fired: bool,
    abandoned: bool,
}

impl ReadyListener {
    /// A listener that has already fired, for engines ready on construction.
    pub fn fired() -> Self {
        let (notifier, listener) = ready_channel();
        notifier.notify();
        listener
    }

    /// Non-blocking check. Once it has returned `true` it keeps returning
    /// `true`.
    pub fn poll(&mut self) -> bool {
        if self.fired {
            return true;
        }

        match self.rx.try_recv() {
            Ok(()) => self.fired = true,
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.abandoned = true,
        }

        self.fired
    }

    /// Blocks up to `timeout` for the notification.
    pub fn wait_timeout(&mut self, timeout: Duration) -> bool {
        if self.fired {
            return true;
        }

        match self.rx.recv_timeout(timeout) {
            Ok(()) => self.fired = true,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => self.abandoned = true,
        }

        self.fired
    }

    /// The notifier was dropped without firing; the engine will never become
    /// ready.
    pub fn is_abandoned(&self) -> bool {
        self.abandoned && !self.fired
    }
}
