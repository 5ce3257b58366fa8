use std::collections::HashMap;
use std::time::Instant;
use parking_lot::Mutex;
use tokio::sync::oneshot::{Receiver, Sender, channel};
use tokio::time::timeout_at;
use super::probe::Token;

/// Outstanding probes keyed by payload token, each waiting on the
/// arrival time of its reply.
#[derive(Default)]
pub struct State(Mutex<HashMap<Token, Sender<Instant>>>);

pub struct Lease<'s> {
    state: &'s State,
    rx:    Receiver<Instant>,
    token: Token,
}

impl State {
    pub fn insert(&self, token: Token) -> Lease<'_> {
        let (tx, rx) = channel();
        self.0.lock().insert(token, tx);
        Lease { state: self, rx, token }
    }

    pub fn remove(&self, token: &Token) -> Option<Sender<Instant>> {
        self.0.lock().remove(token)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }
}

impl Lease<'_> {
    /// Waits for the reply, returning its arrival time if it came
    /// in before `deadline`.
    pub async fn reply(mut self, deadline: Instant) -> Option<Instant> {
        match timeout_at(deadline.into(), &mut self.rx).await {
            Ok(Ok(when)) if when <= deadline => Some(when),
            _                                => None,
        }
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.state.remove(&self.token);
    }
}
