pub type RequestId = u64;

/// Handle for anything the page host mounts (gates and images).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MountId(u64);

impl MountId {
    /// Hands out the counter's value and advances it. Zero is never handed
    /// out, whatever the counter starts at.
    pub fn next(v: &mut u64) -> Self {
        let id = (*v).max(1);
        *v = id.wrapping_add(1).max(1);
        Self(id)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Opaque reference to the rendered element a gate wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadingStrategy {
    #[default]
    Eager,
    Lazy,
}

impl LoadingStrategy {
    pub fn as_attr(self) -> &'static str {
        match self {
            LoadingStrategy::Eager => "eager",
            LoadingStrategy::Lazy => "lazy",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaceholderKind {
    #[default]
    Default,
    Card,
    Section,
}
