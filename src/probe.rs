//! `sitekit probe`: runs each image source through the same fallback chain
//! the page uses, with real HTTP fetches standing in for the render layer.

use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use bus::{Bus, CoreCommand, CoreEvent};
use core_types::{MountId, RequestId};
use media::{ImageOptions, LoadState};
use page::{NoopPrefetch, PageEvent, PageHost};
use runtime_net::start_net_runtime;
use url::Url;
use viewport::{NoIntersection, NoopTracker};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub requested: String,
    pub state: LoadState,
    pub active: String,
    pub attempts: u32,
}

impl ProbeOutcome {
    pub fn is_errored(&self) -> bool {
        self.state == LoadState::Errored
    }
}

fn state_label(state: LoadState) -> &'static str {
    match state {
        LoadState::Loading => "loading",
        LoadState::Loaded => "loaded",
        LoadState::Errored => "errored",
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<8}{} -> {} ({} attempt{})",
            state_label(self.state),
            self.requested,
            self.active,
            self.attempts,
            if self.attempts == 1 { "" } else { "s" }
        )
    }
}

/// Probes `sources` against `base` using the network runtime.
pub fn probe(
    base: &Url,
    sources: &[String],
    options: &ImageOptions,
    timeout: Duration,
) -> Result<Vec<ProbeOutcome>> {
    let Bus {
        cmd_tx,
        cmd_rx,
        evt_rx,
        evt_tx,
    } = Bus::new();
    let runtime = start_net_runtime(cmd_rx, evt_tx);

    let outcome = drive(base, sources, options, &cmd_tx, &evt_rx, timeout);

    let _ = cmd_tx.send(CoreCommand::Shutdown);
    if runtime.join().is_err() {
        log::error!(target: "probe", "net runtime panicked");
    }
    outcome
}

struct InFlight {
    id: MountId,
    source: String,
}

/// Feeds fetch results back into a [`PageHost`] until every image is Loaded
/// or Errored.
fn drive(
    base: &Url,
    sources: &[String],
    options: &ImageOptions,
    cmd_tx: &Sender<CoreCommand>,
    evt_rx: &Receiver<CoreEvent>,
    timeout: Duration,
) -> Result<Vec<ProbeOutcome>> {
    let mut host = PageHost::new(NoIntersection, NoopTracker, NoopPrefetch);
    let mounted: Vec<(MountId, &String)> = sources
        .iter()
        .map(|src| (host.mount_image(None, src.as_str(), options.clone()), src))
        .collect();

    let mut in_flight: HashMap<RequestId, InFlight> = HashMap::new();
    let mut next_request: RequestId = 1;
    let deadline = Instant::now() + timeout;

    loop {
        let mut dispatched = 0;
        for req in host.drain_requests() {
            dispatched += 1;

            if media::source::is_data_uri(&req.source) {
                host.on_event(PageEvent::ImageLoaded {
                    id: req.id,
                    source: req.source,
                });
                continue;
            }

            let url = match base.join(&req.source) {
                Ok(url) => url,
                Err(err) => {
                    log::warn!(target: "probe", "cannot resolve {}: {err}", req.source);
                    host.on_event(PageEvent::ImageFailed {
                        id: req.id,
                        source: req.source,
                    });
                    continue;
                }
            };

            let request_id = next_request;
            next_request += 1;
            cmd_tx
                .send(CoreCommand::FetchImage {
                    request_id,
                    mount_id: req.id,
                    url: url.to_string(),
                })
                .context("net runtime stopped")?;
            in_flight.insert(
                request_id,
                InFlight {
                    id: req.id,
                    source: req.source,
                },
            );
        }

        if in_flight.is_empty() {
            if host.is_settled() {
                break;
            }
            if dispatched == 0 {
                bail!("probe stalled with images still loading");
            }
            continue;
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        let evt = match evt_rx.recv_timeout(remaining) {
            Ok(evt) => evt,
            Err(RecvTimeoutError::Timeout) => {
                bail!("timed out after {timeout:?} with {} request(s) in flight", in_flight.len())
            }
            Err(RecvTimeoutError::Disconnected) => bail!("net runtime stopped"),
        };

        let page_evt = match evt {
            CoreEvent::ImageFetched {
                request_id,
                url,
                status,
                duration_ms,
                ..
            } => {
                let Some(InFlight { id, source }) = in_flight.remove(&request_id) else {
                    continue;
                };
                log::debug!(target: "probe", "{url}: {status} in {duration_ms}ms");
                PageEvent::ImageLoaded { id, source }
            }
            CoreEvent::ImageFetchFailed {
                request_id,
                url,
                error,
                ..
            } => {
                let Some(InFlight { id, source }) = in_flight.remove(&request_id) else {
                    continue;
                };
                log::info!(target: "probe", "{url}: {error}");
                PageEvent::ImageFailed { id, source }
            }
        };
        host.on_event(page_evt);
    }

    mounted
        .into_iter()
        .map(|(id, requested)| {
            let img = host
                .image(id)
                .with_context(|| format!("image {requested} is not mounted"))?;
            Ok(ProbeOutcome {
                requested: requested.clone(),
                state: img.state(),
                active: img.active_source().to_string(),
                attempts: img.attempts(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::{self, JoinHandle};

    /// Answers fetches for URLs ending in one of `available`; fails the rest.
    fn fake_runtime(
        available: &'static [&'static str],
    ) -> (Sender<CoreCommand>, Receiver<CoreEvent>, JoinHandle<()>) {
        let Bus {
            cmd_tx,
            cmd_rx,
            evt_rx,
            evt_tx,
        } = Bus::new();
        let handle = thread::spawn(move || {
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    CoreCommand::FetchImage {
                        request_id,
                        mount_id,
                        url,
                    } => {
                        let evt = if available.iter().any(|path| url.ends_with(path)) {
                            CoreEvent::ImageFetched {
                                request_id,
                                mount_id,
                                url,
                                status: 200,
                                content_type: Some("image/png".to_string()),
                                duration_ms: 1,
                            }
                        } else {
                            CoreEvent::ImageFetchFailed {
                                request_id,
                                mount_id,
                                url,
                                error: "HTTP 404".to_string(),
                            }
                        };
                        let _ = evt_tx.send(evt);
                    }
                    CoreCommand::CancelRequest { .. } => {}
                    CoreCommand::Shutdown => break,
                }
            }
        });
        (cmd_tx, evt_rx, handle)
    }

    fn run(sources: &[&str], available: &'static [&'static str]) -> Vec<ProbeOutcome> {
        let (cmd_tx, evt_rx, handle) = fake_runtime(available);
        let base = Url::parse("https://example.com/").unwrap();
        let sources: Vec<String> = sources.iter().map(|s| s.to_string()).collect();
        let outcome = drive(
            &base,
            &sources,
            &ImageOptions::default(),
            &cmd_tx,
            &evt_rx,
            Duration::from_secs(5),
        )
        .unwrap();
        cmd_tx.send(CoreCommand::Shutdown).unwrap();
        handle.join().unwrap();
        outcome
    }

    #[test]
    fn walks_the_fallback_chain() {
        let outcomes = run(
            &["/assets/photo.jpg", "/images/logo.png", "/x/missing.png"],
            &["/images/photo.jpg", "/images/logo.png"],
        );

        assert_eq!(outcomes[0].state, LoadState::Loaded);
        assert_eq!(outcomes[0].active, "/images/photo.jpg");
        assert_eq!(outcomes[0].attempts, 2);

        assert_eq!(outcomes[1].state, LoadState::Loaded);
        assert_eq!(outcomes[1].attempts, 1);

        assert!(outcomes[2].is_errored());
        assert_eq!(outcomes[2].active, "/images/placeholder.svg");
        assert_eq!(outcomes[2].attempts, 3);
    }

    #[test]
    fn placeholder_rescues_missing_images() {
        let outcomes = run(&["/x/missing.png"], &["/images/placeholder.svg"]);
        assert_eq!(outcomes[0].state, LoadState::Loaded);
        assert_eq!(outcomes[0].active, "/images/placeholder.svg");
    }

    #[test]
    fn data_uris_and_empty_sources_need_no_fetch() {
        let outcomes = run(&["data:image/gif;base64,R0lGOD", "  "], &[]);
        assert_eq!(outcomes[0].state, LoadState::Loaded);
        assert_eq!(outcomes[0].attempts, 1);
        assert!(outcomes[1].is_errored());
    }

    #[test]
    fn display_is_one_line() {
        let outcome = ProbeOutcome {
            requested: "photo.jpg".to_string(),
            state: LoadState::Loaded,
            active: "/images/photo.jpg".to_string(),
            attempts: 2,
        };
        assert_eq!(outcome.to_string(), "loaded  photo.jpg -> /images/photo.jpg (2 attempts)");
    }
}
