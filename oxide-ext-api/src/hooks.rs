//! Append-only registries for plugin loaders and plugin change watchers

use std::path::Path;
use std::sync::Arc;

/// Loads plugins of one file type on behalf of an extension
/// (for example a scripting extension registering a `.lua` loader).
pub trait PluginLoader: Send + Sync {
    /// File extension handled by this loader, without the leading dot
    fn file_extension(&self) -> &str;
}

/// Reports plugin source changes so plugins can be hot-reloaded.
pub trait PluginChangeWatcher: Send + Sync {
    /// Directory being watched
    fn directory(&self) -> &Path;

    /// File name filter (for example `"*.lua"`)
    fn filter(&self) -> &str;
}

/// Ordered, append-only list of hook objects.
///
/// Entries are never deduplicated or removed.
pub struct HookRegistry<T: ?Sized> {
    entries: Vec<Arc<T>>,
}

impl<T: ?Sized> HookRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, entry: Arc<T>) {
        self.entries.push(entry);
    }

    /// Read-only view in registration order
    pub fn get_all(&self) -> &[Arc<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for HookRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type PluginLoaderRegistry = HookRegistry<dyn PluginLoader>;
pub type ChangeWatcherRegistry = HookRegistry<dyn PluginChangeWatcher>;
