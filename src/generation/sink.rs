//! Token sinks: receivers of each emitted token, in order, as it is produced.

use crate::generation::run::TokenResult;
use futures::channel::mpsc::UnboundedSender;

pub trait TokenSink {
    fn accept(&mut self, token: &TokenResult);
}

/// Discards tokens; for callers that only need the outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TokenSink for NullSink {
    fn accept(&mut self, _token: &TokenResult) {}
}

impl TokenSink for Vec<TokenResult> {
    fn accept(&mut self, token: &TokenResult) {
        self.push(token.clone());
    }
}

/// Forwards tokens into a channel so a consumer can observe the run as a stream.
/// A dropped receiver does not stop generation.
impl TokenSink for UnboundedSender<TokenResult> {
    fn accept(&mut self, token: &TokenResult) {
        if self.unbounded_send(token.clone()).is_err() {
            tracing::trace!(position = token.position, "Token receiver dropped");
        }
    }
}

impl<S: TokenSink + ?Sized> TokenSink for &mut S {
    fn accept(&mut self, token: &TokenResult) {
        (**self).accept(token);
    }
}
