//! Test extensions shared by the integration tests
//!
//! `Scripted<B>` is a real extension whose behaviour is picked by the marker type
//! `B`, so every scenario gets its own exported type without a dynamic
//! library on disk.

#![allow(dead_code)]

use std::marker::PhantomData;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use oxide_core::{ExtensionManager, MemorySink, StaticModuleLoader};
use oxide_ext_api::{
    ConfigureServices, Extension, ExtensionContext, ExtensionError, FromServices, ModuleExport,
    ServiceRegistry, VersionNumber,
};

/// Records hook calls in the order they happen
#[derive(Default)]
pub struct Journal {
    entries: Mutex<Vec<String>>,
    broken: AtomicBool,
}

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Make every `Fragile` load fail from now on
    pub fn break_loads(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn is_broken(&self) -> bool {
        self.broken.load(Ordering::SeqCst)
    }
}

/// Per-scenario behaviour of a [`Scripted`]
pub trait Behavior: Send + 'static {
    const NAME: &'static str;
    const CORE: bool = false;
    const GAME: bool = false;
    const RELOADABLE: bool = true;
    const CONFIGURES: bool = false;

    fn configure(_services: &mut ServiceRegistry) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn load(_journal: &Journal, _ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn all_loaded(_ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        Ok(())
    }

    fn watchers(_plugin_dir: &Path, _ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        Ok(())
    }
}

pub struct Scripted<B: Behavior> {
    journal: Arc<Journal>,
    _behavior: PhantomData<B>,
}

impl<B: Behavior> FromServices for Scripted<B> {
    fn from_services(services: &ServiceRegistry) -> Result<Self, ExtensionError> {
        let journal = services
            .get_service::<Journal>()
            .ok_or_else(ExtensionError::missing_service::<Journal>)?;
        Ok(Self {
            journal,
            _behavior: PhantomData,
        })
    }
}

impl<B: Behavior> ConfigureServices for Scripted<B> {
    fn configure_services(&mut self, services: &mut ServiceRegistry) -> Result<(), ExtensionError> {
        self.journal.push(format!("{}:configure", B::NAME));
        B::configure(services)
    }
}

impl<B: Behavior> Extension for Scripted<B> {
    fn name(&self) -> &str {
        B::NAME
    }

    fn version(&self) -> VersionNumber {
        VersionNumber::new(1, 0, 0)
    }

    fn author(&self) -> &str {
        "tests"
    }

    fn is_core_extension(&self) -> bool {
        B::CORE
    }

    fn is_game_extension(&self) -> bool {
        B::GAME
    }

    fn supports_reloading(&self) -> bool {
        B::RELOADABLE
    }

    fn configure_services_hook(&mut self) -> Option<&mut dyn ConfigureServices> {
        if B::CONFIGURES { Some(self) } else { None }
    }

    fn load(&mut self, ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        self.journal.push(format!("{}:load", B::NAME));
        B::load(&self.journal, ctx)
    }

    fn unload(&mut self, _ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        self.journal.push(format!("{}:unload", B::NAME));
        Ok(())
    }

    fn on_all_modules_loaded(&mut self, ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        self.journal.push(format!("{}:all", B::NAME));
        B::all_loaded(ctx)
    }

    fn load_plugin_watchers(
        &mut self,
        plugin_dir: &Path,
        ctx: &mut ExtensionContext<'_>,
    ) -> Result<(), ExtensionError> {
        B::watchers(plugin_dir, ctx)
    }

    fn on_shutdown(&mut self) {
        self.journal.push(format!("{}:shutdown", B::NAME));
    }
}

/// Export table with a single scripted extension
pub fn export<B: Behavior>() -> Vec<ModuleExport> {
    vec![ModuleExport::extension::<Scripted<B>>()]
}

/// Manager wired to `loader`, a fresh journal and a memory sink
pub fn manager(loader: StaticModuleLoader) -> (ExtensionManager, Arc<Journal>, MemorySink) {
    let journal = Arc::new(Journal::default());
    let sink = MemorySink::new();
    let mut manager =
        ExtensionManager::new(Box::new(loader)).with_diagnostics(Arc::new(sink.clone()));
    manager.services_mut().add_singleton(Arc::clone(&journal));
    (manager, journal, sink)
}

/// Create empty module files so a directory scan can find them
pub fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), b"").unwrap();
    }
}
