/// Tag handed out when a request is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTag(u64);

impl RequestTag {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic counter for one request slot. Only the most recently issued tag
/// is current; completions carrying an older tag are to be dropped.
#[derive(Debug, Default, Clone)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> RequestTag {
        self.latest += 1;
        RequestTag(self.latest)
    }

    pub fn is_current(&self, tag: RequestTag) -> bool {
        tag.0 == self.latest
    }
}
