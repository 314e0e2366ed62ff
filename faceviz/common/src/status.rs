use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

pub const RUNNING_STATUS_TEXT: &str = "Running";
pub const NO_SENSOR_STATUS_TEXT: &str = "No ready Kinect found!";
pub const SENSOR_NOT_AVAILABLE_STATUS_TEXT: &str = "Kinect not available!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&str) + Send + Sync>;

/// Observable status string shown to the user. Listeners run on the thread that
/// changes the value and only when it actually changes.
#[derive(Default)]
pub struct StatusProperty {
    value: RwLock<Option<String>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl StatusProperty {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self) -> Option<String> {
        self.value.read().ok().and_then(|v| v.clone())
    }

    /// Returns true if the value changed.
    pub fn set(&self, value: &str) -> bool {
        {
            let Ok(mut current) = self.value.write() else {
                return false;
            };
            if current.as_deref() == Some(value) {
                return false;
            }
            *current = Some(value.to_string());
        }

        // cloned so a listener may subscribe or unsubscribe without deadlocking
        let listeners: Vec<Listener> = match self.listeners.lock() {
            Ok(l) => l.iter().map(|(_, f)| f.clone()).collect(),
            Err(_) => return true,
        };
        for listener in listeners {
            listener(value);
        }
        true
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        match self.listeners.lock() {
            Ok(mut listeners) => {
                let before = listeners.len();
                listeners.retain(|(i, _)| *i != id);
                listeners.len() != before
            }
            Err(_) => false,
        }
    }
}
