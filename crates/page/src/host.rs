use std::collections::HashMap;

use core_types::{ElementId, MountId};
use media::{ImageOptions, ImageRender, ImageResource, LoadState};
use viewport::{
    GateConfig, GateRender, IntersectionEntry, IntersectionPlatform, ViewTracker, ViewportGate,
};

use crate::prefetch::PrefetchScheduler;

/// Callbacks from the render layer, in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    ImageLoaded { id: MountId, source: String },
    ImageFailed { id: MountId, source: String },
    Intersection { id: MountId, entry: IntersectionEntry },
}

/// A source the render layer should start fetching for image `id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceRequest {
    pub id: MountId,
    pub source: String,
}

enum ImageSlot {
    Deferred { source: String, options: ImageOptions },
    Active(ImageResource),
}

struct ImageEntry {
    parent: Option<MountId>,
    slot: ImageSlot,
}

enum Entry {
    Gate(ViewportGate),
    Image(ImageEntry),
}

pub struct PageHost<P> {
    platform: P,
    tracker: Box<dyn ViewTracker>,
    prefetch: Box<dyn PrefetchScheduler>,
    next_id: u64,
    entries: HashMap<MountId, Entry>,
    pending: Vec<SourceRequest>,
}

impl<P: IntersectionPlatform> PageHost<P> {
    /// `NoopTracker` and `NoopPrefetch` stand in when the page has no
    /// analytics or prefetching.
    pub fn new(
        platform: P,
        tracker: impl ViewTracker + 'static,
        prefetch: impl PrefetchScheduler + 'static,
    ) -> Self {
        Self {
            platform,
            tracker: Box::new(tracker),
            prefetch: Box::new(prefetch),
            next_id: 1,
            entries: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    // -- Mounting ---
    pub fn mount_gate(&mut self, config: GateConfig) -> MountId {
        let id = MountId::next(&mut self.next_id);
        self.entries.insert(id, Entry::Gate(ViewportGate::new(config)));
        id
    }

    /// Hands the gate its wrapper element. Priority gates and platforms
    /// without intersection support make the children mount right away.
    pub fn attach_gate(&mut self, id: MountId, element: ElementId) {
        let Some(Entry::Gate(gate)) = self.entries.get_mut(&id) else {
            log::trace!(target: "page.host", "attach for unknown gate {id:?}");
            return;
        };
        gate.attach(element, &self.platform);
        if gate.is_visible() {
            self.activate_children(id);
        }
    }

    /// Mounts an image, optionally inside a gate. Inside a gate that is not
    /// visible yet, the image is recorded but not started.
    pub fn mount_image(
        &mut self,
        parent: Option<MountId>,
        source: impl Into<String>,
        options: ImageOptions,
    ) -> MountId {
        let source = source.into();
        let parent = parent.filter(|p| {
            let is_gate = matches!(self.entries.get(p), Some(Entry::Gate(_)));
            if !is_gate {
                log::warn!(target: "page.host", "parent {p:?} is not a mounted gate; mounting at top level");
            }
            is_gate
        });

        let deferred = parent.is_some_and(|p| !self.gate_visible(p));
        let id = MountId::next(&mut self.next_id);

        let slot = if deferred {
            ImageSlot::Deferred { source, options }
        } else {
            let img = ImageResource::new(source, options);
            self.request_active(id, &img);
            ImageSlot::Active(img)
        };

        self.entries
            .insert(id, Entry::Image(ImageEntry { parent, slot }));
        id
    }

    /// Caller supplied new props: reset the image lifecycle if the source or
    /// options changed. Pending callbacks for the old source become stale.
    pub fn set_image_source(
        &mut self,
        id: MountId,
        source: impl Into<String>,
        options: ImageOptions,
    ) -> bool {
        let source = source.into();
        let Some(Entry::Image(entry)) = self.entries.get_mut(&id) else {
            return false;
        };

        match &mut entry.slot {
            ImageSlot::Deferred {
                source: s,
                options: o,
            } => {
                if *s == source && *o == options {
                    return false;
                }
                *s = source;
                *o = options;
                true
            }
            ImageSlot::Active(img) => {
                if !img.set_source(source, options) {
                    return false;
                }
                if img.state() == LoadState::Loading {
                    self.pending.push(SourceRequest {
                        id,
                        source: img.active_source().to_string(),
                    });
                }
                true
            }
        }
    }

    /// Removes an entry. Unmounting a gate releases its subscription and
    /// unmounts every image inside it.
    pub fn unmount(&mut self, id: MountId) {
        match self.entries.remove(&id) {
            Some(Entry::Gate(mut gate)) => {
                gate.teardown();
                let children: Vec<MountId> = self
                    .entries
                    .iter()
                    .filter_map(|(child, entry)| match entry {
                        Entry::Image(img) if img.parent == Some(id) => Some(*child),
                        _ => None,
                    })
                    .collect();
                for child in children {
                    self.entries.remove(&child);
                }
            }
            Some(Entry::Image(_)) => {}
            None => return,
        }
        self.pending.retain(|req| self.entries.contains_key(&req.id));
    }

    // -- Event Handling ---
    /// Routes one callback. Returns `true` if it changed any state.
    pub fn on_event(&mut self, evt: PageEvent) -> bool {
        match evt {
            PageEvent::ImageLoaded { id, source } => match self.active_image_mut(id) {
                Some(img) => img.on_load_succeeded(&source),
                None => {
                    log::trace!(target: "page.host", "dropping load for unmounted {id:?}");
                    false
                }
            },

            PageEvent::ImageFailed { id, source } => {
                let Some(img) = self.active_image_mut(id) else {
                    log::trace!(target: "page.host", "dropping error for unmounted {id:?}");
                    return false;
                };
                if !img.on_load_failed(&source) {
                    return false;
                }
                if img.state() == LoadState::Loading {
                    let next = img.active_source().to_string();
                    self.pending.push(SourceRequest { id, source: next });
                }
                true
            }

            PageEvent::Intersection { id, entry } => {
                let Some(Entry::Gate(gate)) = self.entries.get_mut(&id) else {
                    return false;
                };
                if !gate.on_intersection(entry, self.tracker.as_mut()) {
                    return false;
                }
                if let Some(tracking_id) = gate.config().tracking_id.clone() {
                    self.prefetch.section_visible(&tracking_id);
                }
                self.activate_children(id);
                true
            }
        }
    }

    /// Takes the sources that should be fetched next, oldest first.
    pub fn drain_requests(&mut self) -> Vec<SourceRequest> {
        std::mem::take(&mut self.pending)
    }

    // -- Queries ---
    pub fn gate(&self, id: MountId) -> Option<&ViewportGate> {
        match self.entries.get(&id) {
            Some(Entry::Gate(gate)) => Some(gate),
            _ => None,
        }
    }

    pub fn gate_render(&self, id: MountId) -> Option<GateRender> {
        self.gate(id).map(ViewportGate::describe_render)
    }

    /// `None` for unknown ids and for images still deferred behind a gate.
    pub fn image(&self, id: MountId) -> Option<&ImageResource> {
        match self.entries.get(&id) {
            Some(Entry::Image(ImageEntry {
                slot: ImageSlot::Active(img),
                ..
            })) => Some(img),
            _ => None,
        }
    }

    pub fn image_render(&self, id: MountId) -> Option<ImageRender> {
        self.image(id).map(ImageResource::describe_render)
    }

    pub fn is_mounted(&self, id: MountId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn image_ids(&self) -> Vec<MountId> {
        let mut ids: Vec<MountId> = self
            .entries
            .iter()
            .filter(|(_, e)| matches!(e, Entry::Image(_)))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// No active image is still loading and nothing is queued.
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
            && self.entries.values().all(|e| match e {
                Entry::Image(ImageEntry {
                    slot: ImageSlot::Active(img),
                    ..
                }) => img.state() != LoadState::Loading,
                _ => true,
            })
    }

    // -- Internals ---
    fn gate_visible(&self, id: MountId) -> bool {
        self.gate(id).is_some_and(ViewportGate::is_visible)
    }

    fn active_image_mut(&mut self, id: MountId) -> Option<&mut ImageResource> {
        match self.entries.get_mut(&id) {
            Some(Entry::Image(ImageEntry {
                slot: ImageSlot::Active(img),
                ..
            })) => Some(img),
            _ => None,
        }
    }

    fn request_active(&mut self, id: MountId, img: &ImageResource) {
        if img.state() == LoadState::Loading {
            self.pending.push(SourceRequest {
                id,
                source: img.active_source().to_string(),
            });
        }
    }

    fn activate_children(&mut self, gate_id: MountId) {
        let mut started = Vec::new();
        for (id, entry) in self.entries.iter_mut() {
            let Entry::Image(img_entry) = entry else {
                continue;
            };
            if img_entry.parent != Some(gate_id) {
                continue;
            }
            if let ImageSlot::Deferred { source, options } = &img_entry.slot {
                let img = ImageResource::new(source.clone(), options.clone());
                if img.state() == LoadState::Loading {
                    started.push(SourceRequest {
                        id: *id,
                        source: img.active_source().to_string(),
                    });
                }
                img_entry.slot = ImageSlot::Active(img);
            }
        }
        started.sort_by_key(|req| req.id);
        self.pending.extend(started);
    }
}
