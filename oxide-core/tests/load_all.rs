//! Directory scans: tier ordering, legacy cleanup and the all-modules-loaded pass

mod common;

use std::sync::Arc;

use common::{Behavior, Journal, export, manager, touch};
use oxide_core::{ErrorKind, StaticModuleLoader, Tier};
use oxide_ext_api::{ExtensionContext, ExtensionError, Library, ServiceRegistry};
use tempfile::TempDir;

/// Service published by the core tier
struct Compiler;

/// Library published by the game tier
struct GameApi;
impl Library for GameApi {}

struct CSharp;
impl Behavior for CSharp {
    const NAME: &'static str = "CSharp";
    const CORE: bool = true;
    const CONFIGURES: bool = true;

    fn configure(services: &mut ServiceRegistry) -> Result<(), ExtensionError> {
        services.add_singleton(Arc::new(Compiler));
        Ok(())
    }
}

struct Rust;
impl Behavior for Rust {
    const NAME: &'static str = "Rust";
    const GAME: bool = true;

    fn load(_journal: &Journal, ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        ctx.services()
            .get_service::<Compiler>()
            .ok_or_else(ExtensionError::missing_service::<Compiler>)?;
        ctx.register_library("GameApi", Arc::new(GameApi));
        Ok(())
    }
}

struct Discord;
impl Behavior for Discord {
    const NAME: &'static str = "Discord";

    fn load(_journal: &Journal, ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        ctx.services()
            .get_service::<Compiler>()
            .ok_or_else(ExtensionError::missing_service::<Compiler>)?;
        ctx.get_library_as::<GameApi>("GameApi")
            .ok_or_else(|| ExtensionError::MissingLibrary("GameApi".to_string()))?;
        Ok(())
    }
}

struct Foo;
impl Behavior for Foo {
    const NAME: &'static str = "Foo";
}

struct Lua;
impl Behavior for Lua {
    const NAME: &'static str = "Lua";
    const CORE: bool = true;

    fn all_loaded(_ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        Err(ExtensionError::custom("interpreter missing"))
    }
}

struct Broken;
impl Behavior for Broken {
    const NAME: &'static str = "Broken";

    fn load(_journal: &Journal, _ctx: &mut ExtensionContext<'_>) -> Result<(), ExtensionError> {
        Err(ExtensionError::custom("nope"))
    }
}

fn tiered_loader() -> StaticModuleLoader {
    StaticModuleLoader::new()
        .with_module("Oxide.CSharp.dll", export::<CSharp>())
        .with_module("Oxide.Rust.dll", export::<Rust>())
        .with_module("Oxide.Discord.dll", export::<Discord>())
}

#[test]
fn tiers_load_core_then_game_then_other() {
    let dir = TempDir::new().unwrap();
    // Created in reverse so enumeration order cannot mask the tier sort
    touch(dir.path(), &["Oxide.Discord.dll", "Oxide.Rust.dll", "Oxide.CSharp.dll"]);
    let (mut manager, journal, sink) = manager(tiered_loader());

    let report = manager.load_all_extensions(dir.path());

    assert!(report.failed.is_empty(), "failures: {:?}", report.failed);
    assert!(sink.is_empty());
    let tiers: Vec<Tier> = report.loaded.iter().map(|(tier, _)| *tier).collect();
    assert_eq!(tiers, vec![Tier::Core, Tier::Game, Tier::Other]);

    let entries = journal.entries();
    let position = |entry: &str| entries.iter().position(|e| e == entry).unwrap();
    assert!(position("CSharp:configure") < position("CSharp:load"));
    assert!(position("CSharp:load") < position("Rust:load"));
    assert!(position("Rust:load") < position("Discord:load"));
    assert_eq!(manager.extensions().len(), 3);
}

#[test]
fn failure_in_one_tier_does_not_block_later_tiers() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), &["Oxide.Broken.dll", "Oxide.Foo.dll", "Oxide.SQLite.dll"]);
    let loader = StaticModuleLoader::new()
        .with_module("Oxide.Broken.dll", export::<Broken>())
        .with_module("Oxide.Foo.dll", export::<Foo>());
    let (mut manager, _, _) = manager(loader);

    let report = manager.load_all_extensions(dir.path());

    // SQLite is core tier but has no module registered; it fails first
    let failed: Vec<ErrorKind> = report.failed.iter().map(|(_, kind)| *kind).collect();
    assert_eq!(failed.len(), 2);
    assert!(failed.contains(&ErrorKind::MapError));
    assert!(failed.contains(&ErrorKind::LifecycleHookFailure));
    assert!(manager.is_extension_present("Foo"));
    assert!(!manager.is_extension_present("Broken"));
}

#[test]
fn legacy_core_variant_is_queued_for_cleanup_and_never_loaded() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), &["Oxide.Core.Foo.dll", "Oxide.Foo.dll"]);
    let loader = StaticModuleLoader::new()
        .with_module("Oxide.Foo.dll", export::<Foo>())
        .with_module("Oxide.Core.Foo.dll", export::<Foo>());
    let (mut manager, journal, _) = manager(loader);

    let report = manager.load_all_extensions(dir.path());

    let stale = dir.path().join("Oxide.Core.Foo.dll");
    assert_eq!(manager.extensions().paths(), vec![dir.path().join("Oxide.Foo.dll")]);
    assert_eq!(journal.entries(), vec!["Foo:load", "Foo:all"]);
    assert_eq!(report.cleanup, vec![stale.clone()]);
    assert!(manager.cleanup_queue().contains(&stale));

    assert_eq!(manager.run_cleanup(), 1);
    assert!(!stale.exists());
    assert!(dir.path().join("Oxide.Foo.dll").exists());
    assert!(manager.cleanup_queue().is_empty());
}

#[test]
fn legacy_game_prefix_is_never_loaded() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), &["Oxide.Game.Rust.dll", "Oxide.Core.dll"]);
    let loader = StaticModuleLoader::new().with_module("Oxide.Game.Rust.dll", export::<Foo>());
    let (mut manager, _, _) = manager(loader);

    let report = manager.load_all_extensions(dir.path());

    assert!(manager.extensions().is_empty());
    assert!(report.loaded.is_empty());
    assert_eq!(report.cleanup, vec![dir.path().join("Oxide.Game.Rust.dll")]);
}

#[test]
fn failing_all_loaded_hook_removes_even_core_extensions() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), &["Oxide.Lua.dll", "Oxide.Foo.dll"]);
    let loader = StaticModuleLoader::new()
        .with_module("Oxide.Lua.dll", export::<Lua>())
        .with_module("Oxide.Foo.dll", export::<Foo>());
    let (mut manager, _, sink) = manager(loader);

    let report = manager.load_all_extensions(dir.path());

    assert_eq!(report.loaded.len(), 2);
    assert_eq!(report.removed, vec![dir.path().join("Oxide.Lua.dll")]);
    assert!(!manager.is_extension_present("Lua"));
    assert!(manager.is_extension_present("Foo"));

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].detail.contains("interpreter missing"));
}

#[test]
fn all_loaded_notification_includes_earlier_scans() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    touch(first.path(), &["Oxide.Foo.dll"]);
    touch(second.path(), &["Oxide.Discord.dll"]);
    let loader = StaticModuleLoader::new()
        .with_module("Oxide.Foo.dll", export::<Foo>())
        .with_module("Oxide.Discord.dll", export::<Foo>());
    let (mut manager, journal, _) = manager(loader);

    manager.load_all_extensions(first.path());
    manager.load_all_extensions(second.path());

    let notified = journal
        .entries()
        .iter()
        .filter(|e| e.as_str() == "Foo:all")
        .count();
    // Foo from the first scan once, then both entries on the second scan
    assert_eq!(notified, 3);
    assert_eq!(manager.extensions().len(), 2);
}

#[test]
fn rescan_skips_already_loaded_paths() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), &["Oxide.Foo.dll"]);
    let loader = StaticModuleLoader::new().with_module("Oxide.Foo.dll", export::<Foo>());
    let (mut manager, _, sink) = manager(loader);

    manager.load_all_extensions(dir.path());
    let report = manager.load_all_extensions(dir.path());

    assert_eq!(manager.extensions().len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].1, ErrorKind::AlreadyLoaded);
    assert!(sink.is_empty());
}

#[test]
fn scan_of_missing_directory_loads_nothing() {
    let dir = TempDir::new().unwrap();
    let (mut manager, _, _) = manager(StaticModuleLoader::new());

    let report = manager.load_all_extensions(&dir.path().join("absent"));

    assert!(report.loaded.is_empty());
    assert!(report.failed.is_empty());
    assert!(manager.extensions().is_empty());
}
