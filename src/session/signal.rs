use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Session epoch shared by every call issued under one session.
///
/// Ending the session bumps the epoch. Calls started under an earlier epoch
/// must discard their results, which replaces the page teardown a browser
/// performs on a hard navigation.
#[derive(Clone, Debug)]
pub struct SessionSignal {
    sender: Arc<watch::Sender<u64>>,
}

/// Handle held by one in-flight call
pub struct SessionWatch {
    receiver: watch::Receiver<u64>,
    started_at: u64,
}

impl SessionSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn epoch(&self) -> u64 {
        *self.sender.borrow()
    }

    /// Marks the current session as ended, invalidating outstanding calls
    pub fn end(&self) {
        self.sender.send_modify(|epoch| *epoch += 1);
        info!(epoch = self.epoch(), "Session ended, outstanding calls invalidated");
    }

    pub fn watch(&self) -> SessionWatch {
        let receiver = self.sender.subscribe();
        let started_at = *receiver.borrow();
        SessionWatch {
            receiver,
            started_at,
        }
    }
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionWatch {
    /// True once the session this call started under has ended
    pub fn is_ended(&self) -> bool {
        *self.receiver.borrow() != self.started_at
    }

    /// Resolves when the session this call started under ends
    pub async fn ended(&mut self) {
        while !self.is_ended() {
            if self.receiver.changed().await.is_err() {
                // Signal dropped; the session can no longer end.
                std::future::pending::<()>().await;
            }
        }
    }
}
