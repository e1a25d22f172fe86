use core_types::{MountId, RequestId};
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug)]
pub enum CoreCommand {
    // Network requests
    FetchImage {
        request_id: RequestId,
        mount_id: MountId,
        url: String,
    },
    CancelRequest {
        request_id: RequestId,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum CoreEvent {
    // Network -> host
    ImageFetched {
        request_id: RequestId,
        mount_id: MountId,
        url: String,
        status: u16,
        content_type: Option<String>,
        duration_ms: u128,
    },
    ImageFetchFailed {
        request_id: RequestId,
        mount_id: MountId,
        url: String,
        error: String,
    },
}

impl CoreEvent {
    pub fn mount_id(&self) -> MountId {
        match self {
            CoreEvent::ImageFetched { mount_id, .. } | CoreEvent::ImageFetchFailed { mount_id, .. } => {
                *mount_id
            }
        }
    }
}

pub struct Bus {
    pub cmd_tx: Sender<CoreCommand>,
    pub cmd_rx: Receiver<CoreCommand>,
    pub evt_rx: Receiver<CoreEvent>,
    pub evt_tx: Sender<CoreEvent>, // shareable for runtimes
}

impl Bus {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        Self {
            cmd_tx,
            cmd_rx,
            evt_rx,
            evt_tx,
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
