use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, Sender},
};
use std::thread::{self, JoinHandle};

use bus::{CoreCommand, CoreEvent};
use net::{FetchResult, fetch};

/// Services `CoreCommand`s on a dedicated thread until `Shutdown` arrives or
/// every command sender is dropped. Each fetch runs on its own worker thread
/// and reports back through `evt_tx`.
pub fn start_net_runtime(cmd_rx: Receiver<CoreCommand>, evt_tx: Sender<CoreEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let agent = net::agent();
        // one cancel flag per request_id
        let mut cancels: HashMap<u64, Arc<AtomicBool>> = HashMap::new();

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                CoreCommand::FetchImage {
                    request_id,
                    mount_id,
                    url,
                } => {
                    let cancel = cancels
                        .entry(request_id)
                        .or_insert_with(|| Arc::new(AtomicBool::new(false)))
                        .clone();

                    log::debug!(target: "runtime_net", "fetch #{request_id} {url}");

                    let evt_tx = evt_tx.clone();
                    fetch(
                        agent.clone(),
                        url,
                        cancel,
                        Arc::new(move |result: FetchResult| {
                            let _ = evt_tx.send(to_event(request_id, mount_id, result));
                        }),
                    );
                }

                CoreCommand::CancelRequest { request_id } => {
                    if let Some(flag) = cancels.remove(&request_id) {
                        flag.store(true, Ordering::Release);
                    }
                }

                CoreCommand::Shutdown => break,
            }
        }

        for flag in cancels.values() {
            flag.store(true, Ordering::Release);
        }
    })
}

fn to_event(request_id: u64, mount_id: core_types::MountId, result: FetchResult) -> CoreEvent {
    if result.is_image() {
        CoreEvent::ImageFetched {
            request_id,
            mount_id,
            url: result.requested_url,
            status: result.status.unwrap_or(200),
            content_type: result.content_type,
            duration_ms: result.duration_ms,
        }
    } else {
        let error = match (result.error, result.content_type) {
            (Some(error), _) => error,
            (None, Some(ct)) => format!("not an image ({ct})"),
            (None, None) => "empty response".to_string(),
        };
        CoreEvent::ImageFetchFailed {
            request_id,
            mount_id,
            url: result.requested_url,
            error,
        }
    }
}
