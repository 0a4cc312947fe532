//! Single-threaded, cooperative event dispatcher.
//!
//! `EventDispatcher` owns the fd → continuation table. It does not know how
//! to poll a socket itself — that is a platform concern — so polling is
//! delegated to a [`Reactor`] implementation (`streamkit-transport-tcp`
//! supplies one backed by `mio`). This keeps the dispatcher table, the
//! single-continuation-per-(fd, direction) invariant, and the network-timeout
//! enforcement in one place shared by every I/O backend the crate might grow.

use std::collections::HashMap;
use std::os::unix::io::RawFd;
use std::time::{Duration, Instant};

use tracing::{trace, warn};

use crate::error::{codes, CoreError, ErrorCategory, Result};
use crate::layer::LayerState;

/// Readiness direction a continuation is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

/// A resumable callback bound to one (fd, direction) pair. Invoking it
/// drives the owning layer's state machine forward by one step.
pub type Continuation = Box<dyn FnMut() -> LayerState>;

/// Platform polling backend. `streamkit-transport-tcp::reactor::MioReactor`
/// is the only implementor in this workspace; the trait exists so
/// `streamkit-core` never names `mio` directly, so a different I/O backend
/// can plug in its own poller without touching the dispatcher table.
pub trait Reactor {
    /// Registers `fd` with the OS poller with no particular interest yet.
    /// Idempotent: registering an already-known fd is a no-op.
    fn register(&mut self, fd: RawFd) -> std::io::Result<()>;

    /// (Re-)arms `fd` for the given direction, replacing any previous
    /// interest for that fd.
    fn reregister(&mut self, fd: RawFd, direction: Direction) -> std::io::Result<()>;

    /// Removes `fd` from the poller entirely.
    fn deregister(&mut self, fd: RawFd) -> std::io::Result<()>;

    /// Blocks up to `timeout` (or indefinitely if `None`) and returns the
    /// fds that became ready, paired with the direction that fired.
    fn poll(&mut self, timeout: Option<Duration>) -> std::io::Result<Vec<(RawFd, Direction)>>;
}

struct Entry {
    continuation: Continuation,
    direction: Direction,
    armed_at: Instant,
    generation: u64,
}

/// The fd registration table plus the driver loop, including network-timeout
/// enforcement.
pub struct EventDispatcher<R: Reactor> {
    reactor: R,
    table: HashMap<RawFd, Entry>,
    generation: u64,
    network_timeout: Option<Duration>,
}

impl<R: Reactor> EventDispatcher<R> {
    pub fn new(reactor: R) -> Self {
        Self {
            reactor,
            table: HashMap::new(),
            generation: 0,
            network_timeout: None,
        }
    }

    pub fn set_network_timeout(&mut self, timeout: Option<Duration>) {
        self.network_timeout = timeout;
    }

    /// Brings `fd` under the poller's watch without yet committing to a
    /// direction; idempotent for a fd already known to the reactor.
    pub fn register_fd(&mut self, fd: RawFd) -> Result<()> {
        if self.table.contains_key(&fd) {
            return Ok(());
        }
        self.reactor.register(fd).map_err(|err| {
            CoreError::from_io(codes::SOCKET_INITIALIZATION_ERROR, ErrorCategory::Connection, err)
        })
    }

    /// Removes `fd`'s entry and any pending re-arm.
    pub fn unregister_fd(&mut self, fd: RawFd) {
        self.table.remove(&fd);
        let _ = self.reactor.deregister(fd);
    }

    /// Records that when `fd` next becomes ready in `direction`,
    /// `continuation` runs. Replaces any continuation already armed for
    /// this fd — at most one continuation is ever live per (fd, direction).
    pub fn continue_when_event(
        &mut self,
        fd: RawFd,
        direction: Direction,
        continuation: Continuation,
    ) -> Result<()> {
        self.generation += 1;
        self.reactor.reregister(fd, direction).map_err(|err| {
            CoreError::from_io(codes::TRANSPORT_READ_ERROR, ErrorCategory::Transport, err)
        })?;
        self.table.insert(
            fd,
            Entry {
                continuation,
                direction,
                armed_at: Instant::now(),
                generation: self.generation,
            },
        );
        trace!(target: "streamkit_core::dispatcher", fd, ?direction, "armed continuation");
        Ok(())
    }

    /// Drains one batch of ready fds and invokes their continuations in
    /// arrival order, enforcing the network timeout along the way.
    /// Returns `false` once the table is empty and there is nothing left to
    /// drive, which callers use to know a request has reached a terminal
    /// state.
    pub fn run_once(&mut self) -> Result<bool> {
        if let Some(timed_out) = self.expire_timed_out() {
            self.unregister_fd(timed_out);
            return Err(CoreError::new(
                codes::DISPATCHER_TIMEOUT,
                ErrorCategory::Connection,
                "network timeout exceeded while waiting for socket readiness",
            ));
        }

        if self.table.is_empty() {
            return Ok(false);
        }

        let timeout = self.next_poll_timeout();
        let ready = self.reactor.poll(timeout).map_err(|err| {
            CoreError::from_io(codes::TRANSPORT_READ_ERROR, ErrorCategory::Transport, err)
        })?;

        for (fd, direction) in ready {
            let Some(mut entry) = self.table.remove(&fd) else {
                continue;
            };
            if entry.direction != direction {
                // stale wakeup for a direction no longer armed; drop it.
                self.table.insert(fd, entry);
                continue;
            }
            trace!(target: "streamkit_core::dispatcher", fd, ?direction, "firing continuation");
            let state = (entry.continuation)();
            match state {
                LayerState::Ok => {}
                LayerState::WantRead | LayerState::WantWrite => {
                    // the continuation is expected to have re-armed itself
                    // via `continue_when_event` before returning; if it
                    // didn't, the fd silently falls out of the table.
                }
                LayerState::Error(ref err) => {
                    warn!(target: "streamkit_core::dispatcher", fd, code = err.code(), "continuation reported error, unregistering");
                    self.unregister_fd(fd);
                }
            }
        }

        Ok(!self.table.is_empty())
    }

    /// Drives `run_once` until `is_done` reports true or the fd table runs
    /// dry — the loop a single top-level operation uses to run one request
    /// to completion.
    pub fn run_until(&mut self, mut is_done: impl FnMut() -> bool) -> Result<()> {
        while !is_done() {
            if !self.run_once()? {
                break;
            }
        }
        Ok(())
    }

    fn next_poll_timeout(&self) -> Option<Duration> {
        let timeout = self.network_timeout?;
        self.table
            .values()
            .map(|entry| timeout.saturating_sub(entry.armed_at.elapsed()))
            .min()
    }

    fn expire_timed_out(&self) -> Option<RawFd> {
        let timeout = self.network_timeout?;
        self.table
            .iter()
            .find(|(_, entry)| entry.armed_at.elapsed() >= timeout)
            .map(|(fd, _)| *fd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// A `Reactor` stand-in that reports a fixed fd/direction ready on every
    /// poll, so tests can drive `EventDispatcher` without real sockets.
    #[derive(Default)]
    struct FakeReactor {
        registered: Vec<RawFd>,
        next_ready: Vec<(RawFd, Direction)>,
    }

    impl Reactor for FakeReactor {
        fn register(&mut self, fd: RawFd) -> std::io::Result<()> {
            if !self.registered.contains(&fd) {
                self.registered.push(fd);
            }
            Ok(())
        }

        fn reregister(&mut self, _fd: RawFd, _direction: Direction) -> std::io::Result<()> {
            Ok(())
        }

        fn deregister(&mut self, fd: RawFd) -> std::io::Result<()> {
            self.registered.retain(|&f| f != fd);
            Ok(())
        }

        fn poll(&mut self, _timeout: Option<Duration>) -> std::io::Result<Vec<(RawFd, Direction)>> {
            Ok(std::mem::take(&mut self.next_ready))
        }
    }

    #[test]
    fn continue_when_event_replaces_prior_continuation_for_same_fd() {
        let mut dispatcher = EventDispatcher::new(FakeReactor::default());
        dispatcher.register_fd(7).unwrap();

        let first_fired = Rc::new(RefCell::new(false));
        let first_fired_clone = first_fired.clone();
        dispatcher
            .continue_when_event(7, Direction::Read, Box::new(move || {
                *first_fired_clone.borrow_mut() = true;
                LayerState::Ok
            }))
            .unwrap();
        assert_eq!(dispatcher.table.len(), 1);

        let second_fired = Rc::new(RefCell::new(false));
        let second_fired_clone = second_fired.clone();
        dispatcher
            .continue_when_event(7, Direction::Read, Box::new(move || {
                *second_fired_clone.borrow_mut() = true;
                LayerState::Ok
            }))
            .unwrap();
        // still exactly one continuation registered for this fd.
        assert_eq!(dispatcher.table.len(), 1);

        dispatcher.reactor.next_ready = vec![(7, Direction::Read)];
        dispatcher.run_once().unwrap();

        assert!(!*first_fired.borrow(), "replaced continuation must not fire");
        assert!(*second_fired.borrow(), "latest continuation must fire");
    }

    #[test]
    fn run_once_reports_timeout_and_unregisters_the_fd() {
        let mut dispatcher = EventDispatcher::new(FakeReactor::default());
        dispatcher.set_network_timeout(Some(Duration::from_millis(0)));
        dispatcher.register_fd(9).unwrap();
        dispatcher
            .continue_when_event(9, Direction::Write, Box::new(|| LayerState::Ok))
            .unwrap();

        let err = dispatcher.run_once().unwrap_err();
        assert_eq!(err.code(), codes::DISPATCHER_TIMEOUT);
        assert!(dispatcher.table.is_empty());
    }

    #[test]
    fn run_once_returns_false_once_the_table_is_empty() {
        let mut dispatcher = EventDispatcher::new(FakeReactor::default());
        assert!(!dispatcher.run_once().unwrap());
    }
}
