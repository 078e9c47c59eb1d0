/// Options for decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Maximum number of nested JSON containers (default: 128)
    pub max_depth: usize,
    /// Whether to reset fragments that don't match `__typename` after
    /// decoding (default: true)
    pub prune: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 128,
            prune: true,
        }
    }
}

impl DecodeOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum container nesting depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enable or disable fragment pruning.
    pub fn prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }
}
