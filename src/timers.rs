use log::trace;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::core::{TimerSlot, TimerToken};
use crate::game_client::SessionInput;

/// One pending sleep task per [`TimerSlot`]. Scheduling a slot aborts whatever
/// was pending there.
#[derive(Default)]
pub(crate) struct TimerSlots {
    handles: [Option<JoinHandle<()>>; 3],
}

impl TimerSlots {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn schedule(
        &mut self,
        slot: TimerSlot,
        token: TimerToken,
        delay: Duration,
        tx: mpsc::UnboundedSender<SessionInput>,
        epoch: u64,
    ) {
        self.cancel(slot);
        trace!("Scheduling {:?} in {:?}", slot, delay);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The endpoint may already be gone.
            let _ = tx.send(SessionInput::TimerFired { epoch, slot, token });
        });
        self.handles[slot.index()] = Some(handle);
    }

    pub(crate) fn cancel(&mut self, slot: TimerSlot) {
        if let Some(handle) = self.handles[slot.index()].take() {
            handle.abort();
        }
    }

    pub(crate) fn cancel_all(&mut self) {
        for slot in TimerSlot::ALL {
            self.cancel(slot);
        }
    }
}

impl Drop for TimerSlots {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
