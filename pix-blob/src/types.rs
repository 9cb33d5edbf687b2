use serde::{Deserialize, Serialize};

/// A node in the backend's hierarchical namespace.
///
/// Paths are stored without leading or trailing separators; the root is the
/// empty path. `images/2024` names the same node whether it was written as
/// `/images/2024/` or `images//2024`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ObjectPath(String);

impl ObjectPath {
    pub const SEPARATOR: char = '/';

    /// Create a normalized path
    pub fn new<S: AsRef<str>>(path: S) -> Self {
        let normalized = path
            .as_ref()
            .split(Self::SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self(normalized)
    }

    /// The root of the namespace
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a child segment (or several, separated by `/`)
    pub fn join<S: AsRef<str>>(&self, child: S) -> Self {
        if self.is_root() {
            Self::new(child)
        } else {
            Self::new(format!("{}/{}", self.0, child.as_ref()))
        }
    }

    /// Number of segments below the root
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.split(Self::SEPARATOR).count()
        }
    }

    /// Last segment, `None` for the root
    pub fn name(&self) -> Option<&str> {
        self.0.rsplit(Self::SEPARATOR).next().filter(|s| !s.is_empty())
    }

    /// Key prefix that selects everything below this node (`a/b/`, or `""` at the root)
    pub fn as_prefix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}/", self.0)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A leaf object found while listing a namespace node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectItem {
    pub path: ObjectPath,
    pub size_bytes: Option<u64>,
}

impl ObjectItem {
    pub fn new(path: ObjectPath) -> Self {
        Self {
            path,
            size_bytes: None,
        }
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Full object key
    pub fn key(&self) -> &str {
        self.path.as_str()
    }
}

/// Result of listing one namespace node
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub items: Vec<ObjectItem>,
    pub sub_paths: Vec<ObjectPath>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.sub_paths.is_empty()
    }
}

/// Opaque locator of a single image: a download URL or a local file reference.
///
/// Identity is the locator string itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new<S: Into<String>>(locator: S) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Final path segment of the locator.
    ///
    /// Query strings and fragments are dropped for `http`/`https` URLs only;
    /// local paths and `file://` locators may legally contain `?` and `#`.
    /// Returns `None` when the locator is empty or ends with a separator.
    pub fn file_name(&self) -> Option<&str> {
        let mut locator = self.0.trim();
        if self.is_web_url() {
            locator = locator.split('#').next().unwrap_or(locator);
            locator = locator.split('?').next().unwrap_or(locator);
        }
        locator
            .rsplit('/')
            .next()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    fn is_web_url(&self) -> bool {
        let scheme = match self.0.trim().split_once("://") {
            Some((scheme, _)) => scheme,
            None => return false,
        };
        scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
    }
}

impl From<String> for ImageRef {
    fn from(locator: String) -> Self {
        Self(locator)
    }
}

impl From<&str> for ImageRef {
    fn from(locator: &str) -> Self {
        Self(locator.to_string())
    }
}

impl AsRef<str> for ImageRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Acknowledgement of a stored upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAck {
    pub path: ObjectPath,
    pub size_bytes: u64,
    pub etag: Option<String>,
    pub uploaded_at: i64,
}

impl UploadAck {
    pub fn new(path: ObjectPath, size_bytes: u64) -> Self {
        Self {
            path,
            size_bytes,
            etag: None,
            uploaded_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_etag<S: Into<String>>(mut self, etag: S) -> Self {
        self.etag = Some(etag.into());
        self
    }
}
