//! Decides which watch events should trigger a conversion.

use crate::types::{has_extension, normalize_extension, WatchEvent, WatchEventKind};

/// Accepts newly created files carrying the configured source extension.
#[derive(Debug, Clone)]
pub struct EventFilter {
    source_extension: String,
}

impl EventFilter {
    /// Create a filter for the given source extension (`"heic"`, `".HEIC"`, ...).
    pub fn new(source_extension: &str) -> Self {
        Self {
            source_extension: normalize_extension(source_extension),
        }
    }

    /// The normalized extension this filter matches.
    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    /// True only for `Create` events whose path has the source extension.
    ///
    /// Pure: the path is not touched on disk. Callers check that the path is
    /// a regular file before converting.
    pub fn should_convert(&self, event: &WatchEvent) -> bool {
        event.kind == WatchEventKind::Create && has_extension(&event.path, &self.source_extension)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new("heic")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [WatchEventKind; 5] = [
        WatchEventKind::Create,
        WatchEventKind::Write,
        WatchEventKind::Remove,
        WatchEventKind::Rename,
        WatchEventKind::Other,
    ];

    #[test]
    fn test_non_create_events_are_rejected() {
        let filter = EventFilter::default();
        for kind in ALL_KINDS.into_iter().filter(|k| *k != WatchEventKind::Create) {
            let event = WatchEvent::new("/in/photo.heic", kind);
            assert!(!filter.should_convert(&event), "{kind:?} must not convert");
        }
    }

    #[test]
    fn test_create_with_other_extension_is_rejected() {
        let filter = EventFilter::default();
        for path in ["/in/photo.jpg", "/in/photo.heic.txt", "/in/heic", "/in/.heic", "/in/dir"] {
            let event = WatchEvent::new(path, WatchEventKind::Create);
            assert!(!filter.should_convert(&event), "{path} must not convert");
        }
    }

    #[test]
    fn test_create_with_matching_extension_is_accepted() {
        let filter = EventFilter::default();
        for path in ["/in/photo.heic", "/in/photo.HEIC", "/in/IMG_0001.Heic"] {
            let event = WatchEvent::new(path, WatchEventKind::Create);
            assert!(filter.should_convert(&event), "{path} must convert");
        }
    }

    #[test]
    fn test_configured_extension_is_normalized() {
        let filter = EventFilter::new(".HEIF");
        assert_eq!(filter.source_extension(), "heif");
        assert!(filter.should_convert(&WatchEvent::new("/in/a.heif", WatchEventKind::Create)));
        assert!(!filter.should_convert(&WatchEvent::new("/in/a.heic", WatchEventKind::Create)));
    }
}
