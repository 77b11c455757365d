//! Cross-thread handoff between the OS event thread and the render thread.
//!
//! Ordinary commands and input events travel through an unbounded FIFO with a
//! single consumer. Content rectangle updates additionally go through a
//! [`GeometryMailbox`]: the posting thread blocks until the render thread has
//! copied the value into the authoritative rectangle.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::{Condvar, Mutex};
use tether_core::geometry::Bounds;

use crate::command::Command;
use crate::input::{RawKeyEvent, RawMotionEvent};

/// A message delivered to the render thread, in posting order.
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    Command(Command),
    /// Undecoded command code. Unknown codes are skipped on receipt.
    Raw(i32),
    Key(RawKeyEvent),
    Motion(RawMotionEvent),
}

#[derive(Debug, Default)]
struct MailboxState {
    pending: Bounds,
    current: Bounds,
    posted: u64,
    acknowledged: u64,
    closed: bool,
}

/// Value + generation counter + condition variable.
#[derive(Debug, Default)]
pub struct GeometryMailbox {
    state: Mutex<MailboxState>,
    cond: Condvar,
}

impl GeometryMailbox {
    fn publish(&self, rect: Bounds, tx: &Sender<HostMessage>) -> Option<Bounds> {
        let mut state = self.state.lock();

        // One update in flight at a time, so each publisher reads back its own value.
        while !state.closed && state.acknowledged < state.posted {
            self.cond.wait(&mut state);
        }
        if state.closed {
            return None;
        }

        state.pending = rect;
        state.posted += 1;
        let ticket = state.posted;
        if tx
            .send(HostMessage::Command(Command::ContentRectChanged))
            .is_err()
        {
            state.closed = true;
            self.cond.notify_all();
            return None;
        }

        while !state.closed && state.acknowledged < ticket {
            self.cond.wait(&mut state);
        }
        // Later publishers may already have replaced `current`.
        (state.acknowledged >= ticket).then_some(rect)
    }

    fn acknowledge(&self) -> Bounds {
        let mut state = self.state.lock();
        state.current = state.pending;
        state.acknowledged = state.posted;
        self.cond.notify_all();
        state.current
    }

    fn current(&self) -> Bounds {
        self.state.lock().current
    }

    fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.cond.notify_all();
    }
}

/// Creates a connected sender/receiver pair.
pub fn channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mailbox = Arc::new(GeometryMailbox::default());
    (
        CommandSender {
            tx,
            mailbox: mailbox.clone(),
        },
        CommandReceiver { rx, mailbox },
    )
}

/// Event-thread side of the channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<HostMessage>,
    mailbox: Arc<GeometryMailbox>,
}

impl CommandSender {
    /// Posts a lifecycle command. Returns `false` once the receiver is gone.
    pub fn post(&self, command: Command) -> bool {
        self.tx.send(HostMessage::Command(command)).is_ok()
    }

    /// Posts a raw command code as received from the OS.
    pub fn post_code(&self, code: i32) -> bool {
        self.tx.send(HostMessage::Raw(code)).is_ok()
    }

    pub fn post_key(&self, event: RawKeyEvent) -> bool {
        self.tx.send(HostMessage::Key(event)).is_ok()
    }

    pub fn post_motion(&self, event: RawMotionEvent) -> bool {
        self.tx.send(HostMessage::Motion(event)).is_ok()
    }

    /// Publishes a new content rectangle and blocks until the render thread
    /// acknowledges it.
    ///
    /// Returns the acknowledged rectangle, or `None` if the shell shut down
    /// before picking it up.
    pub fn set_content_rect(&self, rect: Bounds) -> Option<Bounds> {
        self.mailbox.publish(rect, &self.tx)
    }
}

/// Result of a non-blocking receive.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Poll {
    Message(HostMessage),
    Empty,
    Disconnected,
}

/// Render-thread side of the channel. There is exactly one.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<HostMessage>,
    mailbox: Arc<GeometryMailbox>,
}

impl CommandReceiver {
    pub(crate) fn poll(&self) -> Poll {
        match self.rx.try_recv() {
            Ok(message) => Poll::Message(message),
            Err(TryRecvError::Empty) => Poll::Empty,
            Err(TryRecvError::Disconnected) => Poll::Disconnected,
        }
    }

    /// Blocks until a message arrives. `None` means every sender is gone.
    pub(crate) fn wait(&self) -> Option<HostMessage> {
        self.rx.recv().ok()
    }

    /// Copies the pending rectangle into the authoritative one and releases
    /// the publisher.
    pub(crate) fn acknowledge_content_rect(&self) -> Bounds {
        self.mailbox.acknowledge()
    }

    /// The last acknowledged content rectangle.
    pub fn content_rect(&self) -> Bounds {
        self.mailbox.current()
    }

    /// Releases any blocked publisher; later publishes return `None`.
    pub(crate) fn close(&self) {
        self.mailbox.close();
    }
}

impl Drop for CommandReceiver {
    fn drop(&mut self) {
        self.mailbox.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_posting_order() {
        let (tx, rx) = channel();
        assert!(tx.post(Command::Start));
        assert!(tx.post_code(42));
        assert!(tx.post(Command::InitWindow));
        assert_eq!(rx.poll(), Poll::Message(HostMessage::Command(Command::Start)));
        assert_eq!(rx.poll(), Poll::Message(HostMessage::Raw(42)));
        assert_eq!(
            rx.poll(),
            Poll::Message(HostMessage::Command(Command::InitWindow))
        );
        assert_eq!(rx.poll(), Poll::Empty);
    }

    #[test]
    fn dropped_senders_disconnect() {
        let (tx, rx) = channel();
        drop(tx);
        assert_eq!(rx.poll(), Poll::Disconnected);
        assert_eq!(rx.wait(), None);
    }

    #[test]
    fn content_rect_rendezvous() {
        let (tx, rx) = channel();
        let rect = Bounds::new(0, 0, 1080, 2400);
        let publisher = std::thread::spawn(move || tx.set_content_rect(rect));

        assert_eq!(
            rx.wait(),
            Some(HostMessage::Command(Command::ContentRectChanged))
        );
        assert_eq!(rx.acknowledge_content_rect(), rect);
        assert_eq!(publisher.join().unwrap(), Some(rect));
        assert_eq!(rx.content_rect(), rect);
    }

    #[test]
    fn closing_releases_publisher() {
        let (tx, rx) = channel();
        let publisher = std::thread::spawn(move || tx.set_content_rect(Bounds::new(0, 0, 1, 1)));
        assert!(rx.wait().is_some());
        rx.close();
        assert_eq!(publisher.join().unwrap(), None);
    }

    #[test]
    fn publish_after_drop_returns_none() {
        let (tx, rx) = channel();
        drop(rx);
        assert_eq!(tx.set_content_rect(Bounds::new(0, 0, 1, 1)), None);
    }
}
