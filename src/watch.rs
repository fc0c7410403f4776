/*!
 * Watch mode: regenerate the manifest when the base directory changes
 *
 * Filesystem events and the shutdown request arrive on one channel and are
 * handled by a single loop. Each qualifying event pushes a settle deadline
 * forward; once the directory has been quiet for the whole window, one
 * rebuild runs on the loop thread. Events that arrive during a rebuild wait
 * in the channel and collapse into a single follow-up rebuild.
 */

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use glob_match::glob_match;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use crate::builder::ManifestBuilder;
use crate::config::{to_slash, ScanOptions, MANIFEST_NAME};
use crate::error::Result;

/// Quiet period required after the last event before rebuilding
pub const SETTLE_WINDOW: Duration = Duration::from_millis(200);

/// How often the loop checks whether the settle window has passed
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Messages delivered to the watch loop
#[derive(Debug)]
pub enum WatchMessage {
    /// Event or backend error from the filesystem subscription
    Fs(notify::Result<Event>),
    /// External request to stop watching
    Shutdown,
}

/// Cloneable handle that asks a running session to stop
#[derive(Clone, Debug)]
pub struct ShutdownHandle(Sender<WatchMessage>);

impl ShutdownHandle {
    /// Request shutdown; a no-op once the loop is gone
    pub fn shutdown(&self) {
        let _ = self.0.send(WatchMessage::Shutdown);
    }
}

/// Stop `handle`'s session on SIGINT or SIGTERM
pub fn install_signal_handler(handle: ShutdownHandle) -> Result<()> {
    ctrlc::set_handler(move || handle.shutdown())?;
    Ok(())
}

/// Change reported by the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// File or directory created
    Added,
    /// Content changed or renamed
    Changed,
    /// File or directory deleted
    Removed,
}

impl ChangeKind {
    /// Map a notify event kind; access and metadata events are ignored
    pub fn from_event(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Added),
            EventKind::Remove(_) => Some(Self::Removed),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Changed),
            _ => None,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Added => "➕ File added",
            Self::Changed => "🔄 File changed",
            Self::Removed => "🗑️ File removed",
        }
    }
}

/// Paths under the base directory whose changes never trigger a rebuild
#[derive(Debug, Clone)]
pub struct WatchFilter {
    bases: Vec<PathBuf>,
    test_suffixes: Vec<String>,
    globs: Vec<String>,
}

impl WatchFilter {
    /// Ignore the manifest, test and spec files, and the exclude patterns as globs
    pub fn new(options: &ScanOptions) -> Self {
        let mut bases = vec![options.base_dir.clone()];
        if let Ok(canonical) = options.base_dir.canonicalize() {
            if canonical != options.base_dir {
                bases.push(canonical);
            }
        }

        let test_suffixes = options
            .extensions
            .iter()
            .flat_map(|ext| [format!(".test{}", ext), format!(".spec{}", ext)])
            .collect();

        Self {
            bases,
            test_suffixes,
            globs: options.exclude_patterns.clone(),
        }
    }

    /// Path relative to the base directory, if it lies below it
    pub fn relative(&self, path: &Path) -> Option<String> {
        self.bases
            .iter()
            .find_map(|base| path.strip_prefix(base).ok())
            .map(to_slash)
    }

    /// Whether a change to `path` should be dropped
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(relative) = self.relative(path) else {
            return true;
        };

        if relative.contains(MANIFEST_NAME) {
            return true;
        }

        if self
            .test_suffixes
            .iter()
            .any(|suffix| relative.ends_with(suffix.as_str()))
        {
            return true;
        }

        let file_name = relative.rsplit('/').next().unwrap_or(&relative);
        self.globs
            .iter()
            .any(|glob| glob_match(glob, &relative) || glob_match(glob, file_name))
    }
}

/// Settle-window timer holding at most one pending rebuild
#[derive(Debug, Clone)]
pub struct Debouncer {
    settle: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a disarmed debouncer
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            deadline: None,
        }
    }

    /// Arm, or push an armed deadline forward to `now + settle`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.settle);
    }

    /// Whether a rebuild is pending
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the pending rebuild if its deadline has passed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending rebuild; returns whether one was armed
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

/// Counters of one watch session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// Qualifying events received
    pub events: usize,
    /// Rebuilds started
    pub rebuilds: usize,
    /// Rebuilds that failed
    pub failures: usize,
    /// Errors reported by the watch backend
    pub backend_errors: usize,
}

/// The message loop behind a watch session
pub struct EventLoop {
    rx: Receiver<WatchMessage>,
    filter: WatchFilter,
    debouncer: Debouncer,
    poll: Duration,
    verbose: bool,
}

impl EventLoop {
    /// Create a loop reading from `rx`
    pub fn new(
        rx: Receiver<WatchMessage>,
        filter: WatchFilter,
        settle: Duration,
        poll: Duration,
        verbose: bool,
    ) -> Self {
        Self {
            rx,
            filter,
            debouncer: Debouncer::new(settle),
            poll,
            verbose,
        }
    }

    /// Process messages until shutdown, calling `rebuild` once per settled burst
    ///
    /// Rebuild failures are logged and counted; the loop keeps going.
    pub fn run<F>(&mut self, mut rebuild: F) -> WatchSummary
    where
        F: FnMut() -> Result<()>,
    {
        let mut summary = WatchSummary::default();

        loop {
            match self.rx.recv_timeout(self.poll) {
                Ok(WatchMessage::Shutdown) => {
                    if self.debouncer.cancel() {
                        debug!("pending rebuild cancelled by shutdown");
                    }
                    break;
                }
                Ok(WatchMessage::Fs(Ok(event))) => {
                    if self.accept(&event) {
                        summary.events += 1;
                        self.debouncer.arm(Instant::now());
                    }
                }
                Ok(WatchMessage::Fs(Err(err))) => {
                    warn!("❌ Watch error: {}", err);
                    summary.backend_errors += 1;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.debouncer.cancel();
                    break;
                }
            }

            if self.debouncer.fire(Instant::now()) {
                summary.rebuilds += 1;
                if let Err(err) = rebuild() {
                    error!("❌ Manifest generation failed: {}", err);
                    summary.failures += 1;
                }
            }
        }

        summary
    }

    fn accept(&self, event: &Event) -> bool {
        let Some(kind) = ChangeKind::from_event(&event.kind) else {
            return false;
        };

        let mut accepted = false;
        for path in event.paths.iter().filter(|p| !self.filter.is_ignored(p)) {
            accepted = true;
            if self.verbose {
                let relative = self.filter.relative(path).unwrap_or_default();
                info!("{}: {}", kind.describe(), relative);
            }
        }
        accepted
    }
}

/// Watch mode before the subscription exists
pub struct WatchLoop {
    builder: ManifestBuilder,
    settle: Duration,
    poll: Duration,
}

impl WatchLoop {
    /// Watch loop for `options` with the default timings
    pub fn new(options: ScanOptions) -> Self {
        Self::with_builder(ManifestBuilder::new(options))
    }

    /// Watch loop rebuilding with a preconfigured builder
    pub fn with_builder(builder: ManifestBuilder) -> Self {
        Self {
            builder,
            settle: SETTLE_WINDOW,
            poll: POLL_INTERVAL,
        }
    }

    /// Override the settle window and poll interval
    pub fn with_timing(mut self, settle: Duration, poll: Duration) -> Self {
        self.settle = settle;
        self.poll = poll;
        self
    }

    /// Build once, then subscribe to the base directory
    ///
    /// A failing initial build is logged; the session still starts so a
    /// later fix on disk triggers a rebuild.
    pub fn start(self) -> Result<WatchSession> {
        info!("🚀 Generating initial manifest...");
        if let Err(err) = self.builder.build() {
            error!("❌ Manifest generation failed: {}", err);
        }

        let options = self.builder.options();
        let (tx, rx) = mpsc::channel();
        let events_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = events_tx.send(WatchMessage::Fs(res));
        })?;
        watcher.watch(&options.base_dir, RecursiveMode::Recursive)?;

        info!("👀 Watching {}", options.base_dir.display());
        if options.verbose {
            info!("📝 The manifest is regenerated on every change");
            info!("⏹️  Press Ctrl+C to stop");
        }

        let events = EventLoop::new(
            rx,
            WatchFilter::new(options),
            self.settle,
            self.poll,
            options.verbose,
        );

        Ok(WatchSession {
            watcher,
            shutdown: tx,
            events,
            builder: self.builder.quiet(),
        })
    }
}

/// Active subscription plus the loop consuming it
pub struct WatchSession {
    watcher: RecommendedWatcher,
    shutdown: Sender<WatchMessage>,
    events: EventLoop,
    builder: ManifestBuilder,
}

impl WatchSession {
    /// Handle that stops [`WatchSession::run`]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(self.shutdown.clone())
    }

    /// Run until shutdown, then release the subscription
    pub fn run(self) -> WatchSummary {
        let WatchSession {
            watcher,
            shutdown,
            mut events,
            builder,
        } = self;
        drop(shutdown);

        let summary = events.run(|| builder.build().map(|_| ()));

        info!("🛑 Stopping watch...");
        drop(watcher);
        info!("✅ Watch stopped");
        summary
    }
}
