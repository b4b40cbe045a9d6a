use super::{AppDrawer, DrawerSnapshot};
use crate::store::StoreChange;
use crossbeam_channel::{after, never, select, unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageChangeKind {
    Installed,
    Uninstalled,
    Updated,
    Replaced,
}

/// Anything that should cause a full recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawerEvent {
    PackageChanged {
        package_id: String,
        kind: PackageChangeKind,
    },
    RefreshRequested,
}

/// Cloneable sender for package-change broadcasts and manual refreshes.
#[derive(Clone)]
pub struct RefreshHandle {
    tx: Sender<DrawerEvent>,
}

impl RefreshHandle {
    pub fn notify(&self, event: DrawerEvent) {
        if self.tx.send(event).is_err() {
            debug!("Drawer service stopped; dropping event");
        }
    }

    pub fn refresh(&self) {
        self.notify(DrawerEvent::RefreshRequested);
    }
}

enum Control {
    Subscribe(u64, Sender<Arc<DrawerSnapshot>>),
    Unsubscribe(u64),
    Stop,
}

/// A live view of the drawer. Dropping it unsubscribes.
pub struct DrawerSubscription {
    id: u64,
    rx: Receiver<Arc<DrawerSnapshot>>,
    control: Sender<Control>,
}

impl DrawerSubscription {
    /// Block until the next snapshot. `None` once the service has stopped.
    pub fn recv(&self) -> Option<Arc<DrawerSnapshot>> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Arc<DrawerSnapshot>> {
        match self.rx.recv_timeout(timeout) {
            Ok(snapshot) => Some(snapshot),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain queued snapshots, returning only the newest.
    pub fn latest(&self) -> Option<Arc<DrawerSnapshot>> {
        self.rx.try_iter().last()
    }
}

impl Drop for DrawerSubscription {
    fn drop(&mut self) {
        let _ = self.control.send(Control::Unsubscribe(self.id));
    }
}

/// Keeps the drawer recomputed in the background while anyone is watching.
pub struct DrawerService {
    drawer: Arc<AppDrawer>,
    events: Sender<DrawerEvent>,
    control: Sender<Control>,
    next_id: AtomicU64,
    active: Arc<AtomicBool>,
    recomputations: Arc<AtomicU64>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DrawerService {
    pub fn start(drawer: Arc<AppDrawer>) -> Self {
        let (events_tx, events_rx) = unbounded();
        let (control_tx, control_rx) = unbounded();
        let active = Arc::new(AtomicBool::new(false));
        let recomputations = Arc::new(AtomicU64::new(0));

        let inputs = Inputs {
            control: control_rx,
            store: drawer.store().subscribe(),
            events: events_rx,
        };
        let worker = Worker {
            drawer: Arc::clone(&drawer),
            grace: drawer.config().idle_grace,
            retry_delay: drawer.config().retry_delay,
            subscribers: Vec::new(),
            latest: None,
            dirty: false,
            idle_deadline: None,
            retry_deadline: None,
            active: Arc::clone(&active),
            recomputations: Arc::clone(&recomputations),
        };
        let handle = thread::spawn(move || worker.run(&inputs));

        Self {
            drawer,
            events: events_tx,
            control: control_tx,
            next_id: AtomicU64::new(0),
            active,
            recomputations,
            handle: Mutex::new(Some(handle)),
        }
    }

    pub fn drawer(&self) -> &Arc<AppDrawer> {
        &self.drawer
    }

    pub fn subscribe(&self) -> DrawerSubscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = unbounded();
        let _ = self.control.send(Control::Subscribe(id, tx));
        DrawerSubscription {
            id,
            rx,
            control: self.control.clone(),
        }
    }

    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            tx: self.events.clone(),
        }
    }

    /// Whether the worker is currently keeping a snapshot up to date.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of full recomputations performed so far.
    pub fn recompute_count(&self) -> u64 {
        self.recomputations.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        let _ = self.control.send(Control::Stop);
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Drawer worker panicked");
            }
        }
    }
}

impl Drop for DrawerService {
    fn drop(&mut self) {
        self.stop();
    }
}

fn timer(deadline: Option<Instant>) -> Receiver<Instant> {
    match deadline {
        Some(deadline) => after(deadline.saturating_duration_since(Instant::now())),
        None => never(),
    }
}

struct Inputs {
    control: Receiver<Control>,
    store: Receiver<StoreChange>,
    events: Receiver<DrawerEvent>,
}

struct Worker {
    drawer: Arc<AppDrawer>,
    grace: Duration,
    retry_delay: Duration,
    subscribers: Vec<(u64, Sender<Arc<DrawerSnapshot>>)>,
    latest: Option<Arc<DrawerSnapshot>>,
    dirty: bool,
    idle_deadline: Option<Instant>,
    /// Set while the last recompute failed and is still owed to subscribers.
    retry_deadline: Option<Instant>,
    active: Arc<AtomicBool>,
    recomputations: Arc<AtomicU64>,
}

impl Worker {
    fn run(mut self, inputs: &Inputs) {
        loop {
            let idle_timer = timer(self.idle_deadline);
            let retry_timer = timer(self.retry_deadline);

            select! {
                recv(inputs.control) -> msg => match msg {
                    Ok(Control::Subscribe(id, tx)) => self.on_subscribe(id, tx),
                    Ok(Control::Unsubscribe(id)) => self.on_unsubscribe(id),
                    Ok(Control::Stop) | Err(_) => break,
                },
                recv(inputs.store) -> msg => match msg {
                    Ok(change) => self.on_trigger(&format!("{change:?}")),
                    Err(_) => break,
                },
                recv(inputs.events) -> msg => match msg {
                    Ok(event) => self.on_trigger(&format!("{event:?}")),
                    Err(_) => break,
                },
                recv(idle_timer) -> _ => self.on_idle_expired(),
                recv(retry_timer) -> _ => self.retry_deadline = None,
            }

            if self.dirty && !self.subscribers.is_empty() {
                self.recompute_and_publish(inputs);
            }
        }
        self.active.store(false, Ordering::SeqCst);
        debug!("Drawer worker stopped");
    }

    fn on_subscribe(&mut self, id: u64, tx: Sender<Arc<DrawerSnapshot>>) {
        self.idle_deadline = None;
        let resumed = !self.active.swap(true, Ordering::SeqCst);
        if resumed {
            debug!("Drawer observed again, resuming");
            self.dirty = true;
        }

        match &self.latest {
            Some(snapshot) if !self.dirty => {
                let _ = tx.send(Arc::clone(snapshot));
            }
            Some(_) | None => self.dirty = true,
        }
        self.subscribers.push((id, tx));
    }

    fn on_unsubscribe(&mut self, id: u64) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        if self.subscribers.is_empty() && self.active.load(Ordering::SeqCst) {
            self.idle_deadline = Some(Instant::now() + self.grace);
        }
    }

    fn on_trigger(&mut self, reason: &str) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        debug!("Drawer recompute triggered by {reason}");
        self.dirty = true;
    }

    fn on_idle_expired(&mut self) {
        self.idle_deadline = None;
        if self.subscribers.is_empty() {
            info!("Drawer unobserved for {:?}, pausing recomputation", self.grace);
            self.active.store(false, Ordering::SeqCst);
            self.latest = None;
            self.dirty = false;
            self.retry_deadline = None;
        }
    }

    fn recompute_and_publish(&mut self, inputs: &Inputs) {
        // Triggers that queued up while we were busy are covered by this pass.
        while inputs.store.try_recv().is_ok() {}
        while inputs.events.try_recv().is_ok() {}

        let snapshot = match self.drawer.compute() {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                // Subscribers keep the last good snapshot until a retry succeeds.
                error!("Drawer recompute failed, retrying in {:?}: {e}", self.retry_delay);
                self.retry_deadline = Some(Instant::now() + self.retry_delay);
                return;
            }
        };
        self.dirty = false;
        self.retry_deadline = None;
        self.subscribers
            .retain(|(_, tx)| tx.send(Arc::clone(&snapshot)).is_ok());
        self.latest = Some(snapshot);
        self.recomputations.fetch_add(1, Ordering::SeqCst);
    }
}
