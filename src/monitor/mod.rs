use crate::config::MonitorConfig;
use crate::detector;
use crate::detector::url_bar::UrlWatcher;
use crate::dispatch::Dispatcher;
use crate::engine::{Command, DecisionEngine};
use crate::platform::{EventKind, FocusEvent, Navigator, OverlayPresenter, TreeProvider};
use crate::policy::PolicyStore;
use crate::tracker::ContextTracker;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

enum LoopMessage {
    Event(FocusEvent),
    Probe { package: String, generation: u64 },
    Stop,
}

/// Handle the platform event source uses to feed the monitor. Cheap to
/// clone; delivery is non-blocking.
#[derive(Clone)]
pub struct EventHandle {
    tx: Sender<LoopMessage>,
}

impl EventHandle {
    pub fn deliver(&self, event: FocusEvent) {
        let _ = self.tx.send(LoopMessage::Event(event));
    }
}

/// Owns the serialized monitor loop.
///
/// All mutable monitoring state (foreground, block state, cool-down
/// stamps) lives on one worker thread; deferred probes re-join that
/// thread through the channel instead of touching state from their timer
/// threads, so no locks are needed around the decision path.
pub struct MonitorService {
    config: Arc<MonitorConfig>,
    policy: Arc<PolicyStore>,
    presenter: Arc<dyn OverlayPresenter>,
    navigator: Arc<dyn Navigator>,
    provider: Arc<dyn TreeProvider>,
    running: Arc<AtomicBool>,
    tx: Sender<LoopMessage>,
    rx: Receiver<LoopMessage>,
    handle: Option<JoinHandle<()>>,
}

impl MonitorService {
    pub fn new(
        config: Arc<MonitorConfig>,
        policy: Arc<PolicyStore>,
        presenter: Arc<dyn OverlayPresenter>,
        navigator: Arc<dyn Navigator>,
        provider: Arc<dyn TreeProvider>,
    ) -> Self {
        let (tx, rx) = unbounded();
        Self {
            config,
            policy,
            presenter,
            navigator,
            provider,
            running: Arc::new(AtomicBool::new(false)),
            tx,
            rx,
            handle: None,
        }
    }

    pub fn events(&self) -> EventHandle {
        EventHandle { tx: self.tx.clone() }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("monitor already running");
            return;
        }

        // Anything queued while the monitor was unbound is stale
        while self.rx.try_recv().is_ok() {}

        let running = Arc::clone(&self.running);
        let rx = self.rx.clone();
        let poll = self.config.schedule_poll;
        let mut worker = Worker::new(
            Arc::clone(&self.config),
            Arc::clone(&self.policy),
            Arc::clone(&self.presenter),
            Arc::clone(&self.navigator),
            Arc::clone(&self.provider),
            self.tx.clone(),
        );

        let handle = thread::spawn(move || {
            worker.connect();

            loop {
                match rx.recv_timeout(poll) {
                    Ok(LoopMessage::Stop) => break,
                    Ok(message) => worker.handle(message),
                    Err(RecvTimeoutError::Timeout) => worker.tick(),
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                if !running.load(Ordering::SeqCst) {
                    break;
                }
            }

            worker.disconnect();
        });

        self.handle = Some(handle);
    }

    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let _ = self.tx.send(LoopMessage::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Per-run state, owned by the worker thread.
struct Worker {
    config: Arc<MonitorConfig>,
    policy: Arc<PolicyStore>,
    provider: Arc<dyn TreeProvider>,
    dispatcher: Dispatcher,
    tracker: ContextTracker,
    engine: DecisionEngine,
    urls: UrlWatcher,
    tx: Sender<LoopMessage>,
}

impl Worker {
    fn new(
        config: Arc<MonitorConfig>,
        policy: Arc<PolicyStore>,
        presenter: Arc<dyn OverlayPresenter>,
        navigator: Arc<dyn Navigator>,
        provider: Arc<dyn TreeProvider>,
        tx: Sender<LoopMessage>,
    ) -> Self {
        let tracker = ContextTracker::new(&config.own_package);
        let engine = DecisionEngine::new(Arc::clone(&config), Arc::clone(&policy));
        let urls = UrlWatcher::new(&config.url_bar.view_id_suffix, config.max_tree_nodes);
        Self {
            config,
            policy,
            provider,
            dispatcher: Dispatcher::new(presenter, navigator),
            tracker,
            engine,
            urls,
            tx,
        }
    }

    fn connect(&mut self) {
        if let Err(e) = self.policy.set_monitor_running(true) {
            warn!("could not record monitor start: {}", e);
        }
        info!("monitor connected");

        // Apply the current policy to whatever is already on screen
        if let Some(command) = self.engine.refresh(self.tracker.foreground()) {
            self.dispatcher.apply(command);
        }
    }

    fn disconnect(&mut self) {
        // Never leave the overlay up without a monitor behind it
        self.dispatcher.apply(Command::Unblock);
        if let Err(e) = self.policy.set_monitor_running(false) {
            warn!("could not record monitor stop: {}", e);
        }
        info!("monitor disconnected");
    }

    fn handle(&mut self, message: LoopMessage) {
        match message {
            LoopMessage::Event(event) => self.handle_event(&event),
            LoopMessage::Probe { package, generation } => self.handle_probe(&package, generation),
            LoopMessage::Stop => {}
        }
    }

    fn handle_event(&mut self, event: &FocusEvent) {
        if let Some(transition) = self.tracker.observe(event) {
            if let Some(command) = self.engine.on_transition(&transition) {
                self.dispatcher.apply(command);
            }
            return;
        }

        match event.kind {
            EventKind::ContentChanged | EventKind::Interaction => {
                if event.package == self.config.sub_screen.package {
                    self.schedule_probe(event.package.clone());
                } else if event.package == self.config.url_bar.package {
                    self.watch_url(event);
                }
            }
            EventKind::FocusChanged => {}
        }
    }

    /// Runs the sub-screen check after the settle delay, back on this
    /// loop. The tree right after a content event is often mid-update.
    fn schedule_probe(&self, package: String) {
        let generation = self.tracker.generation();
        let tx = self.tx.clone();
        let delay = self.config.settle_delay;
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = tx.send(LoopMessage::Probe { package, generation });
        });
    }

    fn handle_probe(&mut self, package: &str, generation: u64) {
        if generation != self.tracker.generation() {
            debug!("discarding stale probe for {}", package);
            return;
        }

        let target = &self.config.sub_screen;
        let active = match self.provider.current_tree() {
            Some(tree) => detector::is_sub_screen_active(
                &tree,
                &target.description,
                &target.view_id_suffix,
                self.config.max_tree_nodes,
            ),
            None => false,
        };

        if let Some(command) = self.engine.on_sub_screen(active, self.tracker.foreground()) {
            self.dispatcher.apply(command);
        }
    }

    fn watch_url(&mut self, event: &FocusEvent) {
        let owned;
        let tree = if let Some(tree) = event.tree.as_ref() {
            tree
        } else if let Some(current) = self.provider.current_tree() {
            owned = current;
            &owned
        } else {
            return;
        };

        if let Some(url) = self.urls.observe(tree) {
            info!("visited {}", url);
            if let Err(e) = self.policy.record_visit(&url) {
                warn!("could not record visit: {}", e);
            }
        }
    }

    fn tick(&mut self) {
        if let Some(command) = self.engine.refresh(self.tracker.foreground()) {
            self.dispatcher.apply(command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::platform::UiNode;
    use crate::test_utils::setup_test_store;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    const GAME: &str = "com.example.game";
    const LAUNCHER: &str = "com.launcher";
    const OTHER: &str = "com.other.app";
    const SOCIAL: &str = "com.instagram.android";

    #[derive(Default)]
    struct CallLog(Mutex<Vec<&'static str>>);

    impl CallLog {
        fn calls(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    struct RecordingPresenter(Arc<CallLog>);
    struct RecordingNavigator(Arc<CallLog>);

    impl OverlayPresenter for RecordingPresenter {
        fn show(&self) -> Result<(), AppError> {
            self.0 .0.lock().unwrap().push("show");
            Ok(())
        }
        fn hide(&self) -> Result<(), AppError> {
            self.0 .0.lock().unwrap().push("hide");
            Ok(())
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate_to_safe_screen(&self) {
            self.0 .0.lock().unwrap().push("navigate");
        }
    }

    /// Provider whose tree tests can swap at will.
    #[derive(Default)]
    struct FixedTreeProvider(Mutex<Option<UiNode>>);

    impl FixedTreeProvider {
        fn set(&self, tree: Option<UiNode>) {
            *self.0.lock().unwrap() = tree;
        }
    }

    impl TreeProvider for FixedTreeProvider {
        fn current_tree(&self) -> Option<UiNode> {
            self.0.lock().unwrap().clone()
        }
    }

    fn reels_tree(selected: bool) -> UiNode {
        UiNode {
            children: vec![UiNode {
                description: Some("Reels".to_string()),
                selected,
                ..UiNode::default()
            }],
            ..UiNode::default()
        }
    }

    struct Fixture {
        worker: Worker,
        log: Arc<CallLog>,
        provider: Arc<FixedTreeProvider>,
        policy: Arc<PolicyStore>,
        _dir: TempDir,
        _rx: Receiver<LoopMessage>,
    }

    fn setup() -> Fixture {
        let (store, dir) = setup_test_store();
        let policy = Arc::new(store);
        policy.set_enforcement_enabled(true).unwrap();
        policy.set_restricted_apps(&[GAME.to_string()]).unwrap();

        let config = Arc::new(MonitorConfig {
            block_cooldown: Duration::from_secs(3600),
            ..MonitorConfig::default()
        });
        let log = Arc::new(CallLog::default());
        let provider = Arc::new(FixedTreeProvider::default());
        let (tx, rx) = unbounded();

        let worker = Worker::new(
            Arc::clone(&config),
            Arc::clone(&policy),
            Arc::new(RecordingPresenter(Arc::clone(&log))),
            Arc::new(RecordingNavigator(Arc::clone(&log))),
            Arc::clone(&provider) as Arc<dyn TreeProvider>,
            tx,
        );

        Fixture { worker, log, provider, policy, _dir: dir, _rx: rx }
    }

    #[test]
    fn test_blocked_app_scenario() {
        let mut fixture = setup();
        let worker = &mut fixture.worker;

        // Launcher first: nothing happens
        worker.handle_event(&FocusEvent::focus(LAUNCHER));
        assert!(fixture.log.calls().is_empty());

        // Restricted app: leave it, then cover
        worker.handle_event(&FocusEvent::focus(GAME));
        assert_eq!(fixture.log.calls(), vec!["navigate", "show"]);

        // Duplicate focus event: no further commands
        worker.handle_event(&FocusEvent::focus(GAME));
        assert_eq!(fixture.log.calls(), vec!["navigate", "show"]);

        // A genuine other app: exactly one hide
        worker.handle_event(&FocusEvent::focus(OTHER));
        assert_eq!(fixture.log.calls(), vec!["navigate", "show", "hide"]);
    }

    #[test]
    fn test_clean_stream_never_shows_overlay() {
        let mut fixture = setup();
        let worker = &mut fixture.worker;

        for package in [LAUNCHER, OTHER, "com.mail.app", LAUNCHER, OTHER] {
            worker.handle_event(&FocusEvent::focus(package));
        }
        assert!(fixture.log.calls().is_empty());
    }

    #[test]
    fn test_system_surface_keeps_block_up() {
        let mut fixture = setup();
        let worker = &mut fixture.worker;

        worker.handle_event(&FocusEvent::focus(GAME));
        worker.handle_event(&FocusEvent::focus("com.android.systemui"));
        assert_eq!(fixture.log.calls(), vec!["navigate", "show"]);

        worker.handle_event(&FocusEvent::focus(OTHER));
        assert_eq!(fixture.log.calls(), vec!["navigate", "show", "hide"]);
    }

    #[test]
    fn test_probe_blocks_active_sub_screen() {
        let mut fixture = setup();
        fixture.policy.set_sub_screen_enabled(true).unwrap();
        fixture.provider.set(Some(reels_tree(true)));

        let worker = &mut fixture.worker;
        worker.handle_event(&FocusEvent::focus(SOCIAL));
        let generation = worker.tracker.generation();

        worker.handle_probe(SOCIAL, generation);
        assert_eq!(fixture.log.calls(), vec!["show"]);
    }

    #[test]
    fn test_stale_probe_is_discarded() {
        let mut fixture = setup();
        fixture.policy.set_sub_screen_enabled(true).unwrap();
        fixture.provider.set(Some(reels_tree(true)));

        let worker = &mut fixture.worker;
        worker.handle_event(&FocusEvent::focus(SOCIAL));
        let generation = worker.tracker.generation();

        // User moves on before the probe fires
        worker.handle_event(&FocusEvent::focus(OTHER));
        worker.handle_probe(SOCIAL, generation);

        assert!(fixture.log.calls().is_empty());
    }

    #[test]
    fn test_probe_burst_shows_once() {
        let mut fixture = setup();
        fixture.policy.set_sub_screen_enabled(true).unwrap();
        fixture.provider.set(Some(reels_tree(true)));

        let worker = &mut fixture.worker;
        worker.handle_event(&FocusEvent::focus(SOCIAL));
        let generation = worker.tracker.generation();

        worker.handle_probe(SOCIAL, generation);
        worker.handle_probe(SOCIAL, generation);
        worker.handle_probe(SOCIAL, generation);

        assert_eq!(fixture.log.calls(), vec!["show"]);
    }

    #[test]
    fn test_probe_unblocks_when_sub_screen_left() {
        let mut fixture = setup();
        fixture.policy.set_sub_screen_enabled(true).unwrap();
        fixture.provider.set(Some(reels_tree(true)));

        let worker = &mut fixture.worker;
        worker.handle_event(&FocusEvent::focus(SOCIAL));
        let generation = worker.tracker.generation();
        worker.handle_probe(SOCIAL, generation);

        fixture.provider.set(Some(reels_tree(false)));
        worker.handle_probe(SOCIAL, generation);

        assert_eq!(fixture.log.calls(), vec!["show", "hide"]);
    }

    #[test]
    fn test_probe_without_tree_reports_inactive() {
        let mut fixture = setup();
        fixture.policy.set_sub_screen_enabled(true).unwrap();
        fixture.provider.set(None);

        let worker = &mut fixture.worker;
        worker.handle_event(&FocusEvent::focus(SOCIAL));
        let generation = worker.tracker.generation();
        worker.handle_probe(SOCIAL, generation);

        assert!(fixture.log.calls().is_empty());
    }

    #[test]
    fn test_content_event_records_visit() {
        let mut fixture = setup();

        let bar = UiNode {
            view_id: Some("com.android.chrome:id/url_bar".to_string()),
            text: Some("https://example.com".to_string()),
            ..UiNode::default()
        };
        fixture.provider.set(Some(UiNode {
            children: vec![bar],
            ..UiNode::default()
        }));

        let worker = &mut fixture.worker;
        worker.handle_event(&FocusEvent::content("com.android.chrome"));
        worker.handle_event(&FocusEvent::content("com.android.chrome"));

        let urls = fixture.policy.recent_visits(10).unwrap();
        assert_eq!(urls, vec!["https://example.com".to_string()]);
    }

    #[test]
    fn test_disabled_enforcement_never_blocks() {
        let mut fixture = setup();
        fixture.policy.set_enforcement_enabled(false).unwrap();

        let worker = &mut fixture.worker;
        worker.handle_event(&FocusEvent::focus(GAME));
        assert!(fixture.log.calls().is_empty());
    }

    #[test]
    fn test_tick_picks_up_policy_change() {
        let mut fixture = setup();
        let worker = &mut fixture.worker;

        worker.handle_event(&FocusEvent::focus(GAME));
        assert_eq!(fixture.log.calls(), vec!["navigate", "show"]);

        // Enforcement switched off from the host channel; the next tick
        // clears the block without waiting for a focus change
        fixture.policy.set_enforcement_enabled(false).unwrap();
        worker.tick();
        assert_eq!(fixture.log.calls(), vec!["navigate", "show", "hide"]);
    }

    #[test]
    fn test_service_lifecycle() {
        let (store, _dir) = setup_test_store();
        let policy = Arc::new(store);
        policy.set_enforcement_enabled(true).unwrap();
        policy.set_restricted_apps(&[GAME.to_string()]).unwrap();

        let log = Arc::new(CallLog::default());
        let mut service = MonitorService::new(
            Arc::new(MonitorConfig::default()),
            Arc::clone(&policy),
            Arc::new(RecordingPresenter(Arc::clone(&log))),
            Arc::new(RecordingNavigator(Arc::clone(&log))),
            Arc::new(FixedTreeProvider::default()),
        );

        assert!(!service.is_running());
        service.start();
        assert!(service.is_running());

        let events = service.events();
        events.deliver(FocusEvent::focus(GAME));

        // Give the worker thread a moment to drain the channel
        for _ in 0..50 {
            if !log.calls().is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(log.calls(), vec!["navigate", "show"]);
        assert!(policy.monitor_running().unwrap());

        service.stop();
        assert!(!service.is_running());
        assert!(!policy.monitor_running().unwrap());
        // Teardown hides the overlay
        assert_eq!(log.calls(), vec!["navigate", "show", "hide"]);
    }

    #[test]
    fn test_deferred_probe_round_trip_through_service() {
        let (store, _dir) = setup_test_store();
        let policy = Arc::new(store);
        policy.set_enforcement_enabled(true).unwrap();
        policy.set_sub_screen_enabled(true).unwrap();

        let provider = Arc::new(FixedTreeProvider::default());
        provider.set(Some(reels_tree(true)));

        let config = Arc::new(MonitorConfig {
            settle_delay: Duration::from_millis(10),
            ..MonitorConfig::default()
        });
        let log = Arc::new(CallLog::default());
        let mut service = MonitorService::new(
            config,
            Arc::clone(&policy),
            Arc::new(RecordingPresenter(Arc::clone(&log))),
            Arc::new(RecordingNavigator(Arc::clone(&log))),
            Arc::clone(&provider) as Arc<dyn TreeProvider>,
        );

        service.start();
        let events = service.events();
        events.deliver(FocusEvent::focus(SOCIAL));
        events.deliver(FocusEvent::content(SOCIAL));

        for _ in 0..100 {
            if !log.calls().is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        service.stop();

        assert_eq!(log.calls().first(), Some(&"show"));
    }
}
