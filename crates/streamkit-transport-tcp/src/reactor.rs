//! [`streamkit_core::dispatcher::Reactor`] backed by `mio`'s epoll/kqueue
//! poller. This is the one place in the workspace that names `mio`
//! directly — an alternate I/O backend plugs in a different [`Reactor`]
//! without touching `streamkit-core` at all.

use std::collections::HashMap;
use std::os::unix::io::RawFd;
use std::time::Duration;

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};

use streamkit_core::dispatcher::{Direction, Reactor};

pub struct MioReactor {
    poll: Poll,
    events: Events,
    tokens: HashMap<RawFd, Token>,
    fds: HashMap<Token, RawFd>,
    next_token: usize,
}

impl MioReactor {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            poll: Poll::new()?,
            events: Events::with_capacity(128),
            tokens: HashMap::new(),
            fds: HashMap::new(),
            next_token: 0,
        })
    }

    fn token_for(&mut self, fd: RawFd) -> Token {
        if let Some(token) = self.tokens.get(&fd) {
            return *token;
        }
        let token = Token(self.next_token);
        self.next_token += 1;
        self.tokens.insert(fd, token);
        self.fds.insert(token, fd);
        token
    }
}

impl Reactor for MioReactor {
    fn register(&mut self, fd: RawFd) -> std::io::Result<()> {
        let token = self.token_for(fd);
        self.poll
            .registry()
            .register(&mut SourceFd(&fd), token, Interest::READABLE)
    }

    fn reregister(&mut self, fd: RawFd, direction: Direction) -> std::io::Result<()> {
        let token = self.token_for(fd);
        let interest = match direction {
            Direction::Read => Interest::READABLE,
            Direction::Write => Interest::WRITABLE,
        };
        self.poll.registry().reregister(&mut SourceFd(&fd), token, interest)
    }

    fn deregister(&mut self, fd: RawFd) -> std::io::Result<()> {
        if let Some(token) = self.tokens.remove(&fd) {
            self.fds.remove(&token);
        }
        self.poll.registry().deregister(&mut SourceFd(&fd))
    }

    fn poll(&mut self, timeout: Option<Duration>) -> std::io::Result<Vec<(RawFd, Direction)>> {
        self.poll.poll(&mut self.events, timeout)?;
        let mut ready = Vec::new();
        for event in self.events.iter() {
            let Some(&fd) = self.fds.get(&event.token()) else {
                continue;
            };
            if event.is_readable() {
                ready.push((fd, Direction::Read));
            }
            if event.is_writable() {
                ready.push((fd, Direction::Write));
            }
        }
        Ok(ready)
    }
}
