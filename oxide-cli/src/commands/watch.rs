//! `oxide watch` - hot-reload extension modules when their files change

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use notify::{Event, EventKind, RecursiveMode, Watcher, recommended_watcher};
use oxide_core::extensions::classify;

use super::{HostArgs, start_host, stop_host};
use crate::config::OxideConfig;

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// Quiet period in milliseconds (overrides `watch.debounce_ms`)
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

/// Messages delivered to the control thread
#[derive(Debug)]
enum WatchMessage {
    Fs(notify::Result<Event>),
    Interrupted,
}

pub fn run(args: WatchArgs, config: &OxideConfig) -> Result<()> {
    let dir = args.host.extension_dir(config);
    let debounce = Duration::from_millis(args.debounce_ms.unwrap_or(config.watch.debounce_ms));

    let (mut manager, report) = start_host(&dir);
    manager.load_plugin_watchers(&config.extensions.plugin_directory);
    println!(
        "Loaded {} extension(s), watching {}",
        report.loaded.len(),
        dir.display()
    );

    let (tx, rx) = mpsc::channel::<WatchMessage>();
    forward_ctrl_c(tx.clone())?;
    let mut watcher = recommended_watcher(move |event| {
        let _ = tx.send(WatchMessage::Fs(event));
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    // Hooks run on this thread only; the watcher thread just forwards events
    while let Some(batch) = next_batch(&rx, debounce) {
        for path in batch {
            tracing::info!(path = %path.display(), "Module changed, reloading");
            manager.reload_extension(&path);
        }
    }

    drop(watcher);
    stop_host(&mut manager, config);
    Ok(())
}

/// Send [`WatchMessage::Interrupted`] on the first Ctrl+C
fn forward_ctrl_c(tx: Sender<WatchMessage>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::spawn(move || {
        runtime.block_on(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, shutting down");
                    let _ = tx.send(WatchMessage::Interrupted);
                }
                Err(e) => tracing::warn!(error = %e, "Failed to listen for Ctrl+C"),
            }
        });
    });
    Ok(())
}

/// Block for the next change, then keep collecting until `debounce` passes
/// without another event.
///
/// Returns `None` on interrupt or once the channel is closed; changes still
/// pending at that point are dropped.
fn next_batch(rx: &Receiver<WatchMessage>, debounce: Duration) -> Option<BTreeSet<PathBuf>> {
    let mut batch = BTreeSet::new();

    while batch.is_empty() {
        match rx.recv().ok()? {
            WatchMessage::Fs(event) => collect(&mut batch, event),
            WatchMessage::Interrupted => return None,
        }
    }

    tracing::debug!("Module change detected, starting debounce");
    loop {
        match rx.recv_timeout(debounce) {
            Ok(WatchMessage::Fs(event)) => collect(&mut batch, event),
            Ok(WatchMessage::Interrupted) => return None,
            Err(RecvTimeoutError::Timeout) => return Some(batch),
            Err(RecvTimeoutError::Disconnected) => return Some(batch),
        }
    }
}

fn collect(batch: &mut BTreeSet<PathBuf>, event: notify::Result<Event>) {
    match event {
        Ok(event) => batch.extend(changed_modules(&event)),
        Err(e) => tracing::warn!(error = %e, "File watcher error"),
    }
}

/// Loadable module files created or modified by `event`
fn changed_modules(event: &Event) -> Vec<PathBuf> {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return Vec::new();
    }
    // Reuse discovery so ignored and stale modules are never reloaded
    let scan = classify(event.paths.clone());
    scan.load_order().map(|(_, path)| path.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, paths: &[&str]) -> Event {
        let mut event = Event::new(kind);
        for path in paths {
            event = event.add_path(PathBuf::from(path));
        }
        event
    }

    fn fs(kind: EventKind, paths: &[&str]) -> WatchMessage {
        WatchMessage::Fs(Ok(event(kind, paths)))
    }

    #[test]
    fn test_changed_modules_filters_names_and_kinds() {
        let created = event(
            EventKind::Create(CreateKind::File),
            &[
                "/ext/Oxide.Discord.dll",
                "/ext/readme.txt",
                "/ext/Oxide.Core.dll",
                "/ext/Oxide.Game.Rust.dll",
            ],
        );
        assert_eq!(
            changed_modules(&created),
            vec![PathBuf::from("/ext/Oxide.Discord.dll")]
        );

        let removed = event(EventKind::Remove(RemoveKind::File), &["/ext/Oxide.Discord.dll"]);
        assert!(changed_modules(&removed).is_empty());
    }

    #[test]
    fn test_next_batch_debounces_and_dedups() {
        let (tx, rx) = mpsc::channel();
        tx.send(fs(EventKind::Modify(ModifyKind::Any), &["/ext/Oxide.Discord.dll"]))
            .unwrap();
        tx.send(fs(EventKind::Modify(ModifyKind::Any), &["/ext/Oxide.Discord.dll"]))
            .unwrap();
        tx.send(fs(EventKind::Create(CreateKind::File), &["/ext/Oxide.Rust.dll"]))
            .unwrap();

        let batch = next_batch(&rx, Duration::from_millis(20)).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.contains(&PathBuf::from("/ext/Oxide.Discord.dll")));
    }

    #[test]
    fn test_next_batch_skips_irrelevant_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(fs(EventKind::Remove(RemoveKind::File), &["/ext/Oxide.Foo.dll"]))
            .unwrap();
        tx.send(fs(EventKind::Create(CreateKind::File), &["/ext/Oxide.Bar.dll"]))
            .unwrap();
        drop(tx);

        let batch = next_batch(&rx, Duration::from_millis(20)).unwrap();
        assert_eq!(batch.into_iter().collect::<Vec<_>>(), vec![PathBuf::from("/ext/Oxide.Bar.dll")]);
    }

    #[test]
    fn test_next_batch_ends_when_channel_closes() {
        let (tx, rx) = mpsc::channel::<WatchMessage>();
        drop(tx);
        assert!(next_batch(&rx, Duration::from_millis(20)).is_none());
    }

    #[test]
    fn test_next_batch_stops_on_interrupt() {
        let (tx, rx) = mpsc::channel();
        tx.send(WatchMessage::Interrupted).unwrap();
        assert!(next_batch(&rx, Duration::from_millis(20)).is_none());

        // An interrupt during the quiet period discards the pending batch
        tx.send(fs(EventKind::Create(CreateKind::File), &["/ext/Oxide.Bar.dll"]))
            .unwrap();
        tx.send(WatchMessage::Interrupted).unwrap();
        assert!(next_batch(&rx, Duration::from_secs(5)).is_none());
    }
}
