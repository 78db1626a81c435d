use super::SocialError;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

type Slot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T, SocialError>>>>>;

/// Settles a [`Completion`] at most once
pub struct Resolver<T> {
    slot: Slot<T>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Resolver<T> {
    /// Returns false if the completion was already settled
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    pub fn reject(&self, error: SocialError) -> bool {
        self.settle(Err(error))
    }

    pub fn is_settled(&self) -> bool {
        let guard = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.is_none()
    }

    fn settle(&self, outcome: Result<T, SocialError>) -> bool {
        let sender = {
            let mut guard = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.take()
        };

        match sender {
            // The awaiting side may have gone away; the value is still consumed.
            Some(tx) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

/// Future side of a [`Resolver`]
pub struct Completion<T> {
    rx: oneshot::Receiver<Result<T, SocialError>>,
}

impl<T> Future for Completion<T> {
    type Output = Result<T, SocialError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(outcome) => outcome,
            Err(_) => Err(SocialError::Abandoned),
        })
    }
}

/// A resolver to move into the callback(s) and the completion to await
pub fn pending<T>() -> (Resolver<T>, Completion<T>) {
    let (tx, rx) = oneshot::channel();
    let resolver = Resolver {
        slot: Arc::new(Mutex::new(Some(tx))),
    };

    (resolver, Completion { rx })
}
