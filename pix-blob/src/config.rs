use crate::ObjectPath;

/// Configuration for collection walks and uploads
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Namespace node the walk starts from
    pub root: ObjectPath,

    /// Prefix that uploaded images are stored under
    pub upload_prefix: String,

    /// Upper bound on simultaneous list/resolve requests during a walk
    pub max_concurrency: usize,

    /// Walks deeper than this fail instead of continuing (safety guard)
    pub max_depth: usize,

    /// Absolute max size allowed for a single upload
    pub max_upload_bytes: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            root: ObjectPath::root(),
            upload_prefix: "images".to_string(),
            max_concurrency: 8,
            max_depth: 64,
            max_upload_bytes: 32 * 1024 * 1024, // 32MB
        }
    }
}

impl CollectionConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Start walks at `root` instead of the bucket root
    pub fn with_root<S: AsRef<str>>(mut self, root: S) -> Self {
        self.root = ObjectPath::new(root);
        self
    }

    /// Set the upload prefix
    pub fn with_upload_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.upload_prefix = prefix.into();
        self
    }

    /// Set max in-flight requests (clamped to at least 1)
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    /// Set max walk depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set max upload size
    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}
