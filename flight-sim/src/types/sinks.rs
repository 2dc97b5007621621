use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Mutex;

use logger::{Color, Logger};
use serde::{Deserialize, Serialize};

use super::flight::FlightRecord;
use super::sim_error::SinkError;

/// Key under which [`MemoryStore`] keeps the mirrored flight list.
pub const SNAPSHOT_KEY: &str = "flight_tracker_data";

/// The full flight list as mirrored to the external store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightSnapshot {
    pub data: Vec<FlightRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn departed(record: &FlightRecord) -> Self {
        Notification {
            title: "Flight departed".to_string(),
            message: format!(
                "Flight {} has departed from {}",
                record.flight_number,
                record.origin_name()
            ),
            kind: NotificationKind::Info,
        }
    }

    pub fn landed(record: &FlightRecord) -> Self {
        Notification {
            title: "Flight landed".to_string(),
            message: format!(
                "Flight {} has landed at {}",
                record.flight_number,
                record.destination_name()
            ),
            kind: NotificationKind::Success,
        }
    }
}

/// Key-value slot the engine mirrors its flight list into after every tick.
pub trait SnapshotStore: Send + Sync {
    fn store(&self, snapshot: &FlightSnapshot) -> Result<(), SinkError>;
}

/// Fire-and-forget user notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), SinkError>;
}

/// In-process key-value store holding JSON text, polled by UI collaborators.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Raw JSON under `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.slots.lock().ok()?.get(key).cloned()
    }

    /// Parsed copy of the last mirrored snapshot.
    pub fn snapshot(&self) -> Option<FlightSnapshot> {
        serde_json::from_str(&self.get(SNAPSHOT_KEY)?).ok()
    }
}

impl SnapshotStore for MemoryStore {
    fn store(&self, snapshot: &FlightSnapshot) -> Result<(), SinkError> {
        let json = serde_json::to_string(snapshot)?;
        self.slots
            .lock()
            .map_err(|_| SinkError::Rejected("store lock poisoned".to_string()))?
            .insert(SNAPSHOT_KEY.to_string(), json);
        Ok(())
    }
}

/// Writes the snapshot as pretty JSON to a file, replacing it atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }
}

impl SnapshotStore for FileStore {
    fn store(&self, snapshot: &FlightSnapshot) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Store that drops every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl SnapshotStore for NullStore {
    fn store(&self, _snapshot: &FlightSnapshot) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    logger: Logger,
}

impl LogNotifier {
    pub fn new(logger: Logger) -> Self {
        LogNotifier { logger }
    }
}

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), SinkError> {
        let color = match notification.kind {
            NotificationKind::Info => Color::Blue,
            NotificationKind::Success => Color::Green,
            NotificationKind::Error => Color::Red,
        };
        self.logger
            .info(
                &format!("{}: {}", notification.title, notification.message),
                color,
            )
            .map_err(|e| SinkError::Rejected(e.to_string()))
    }
}

/// Forwards notifications over a channel.
#[derive(Debug)]
pub struct ChannelNotifier {
    sender: Mutex<Sender<Notification>>,
}

impl ChannelNotifier {
    pub fn new(sender: Sender<Notification>) -> Self {
        ChannelNotifier {
            sender: Mutex::new(sender),
        }
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), SinkError> {
        self.sender
            .lock()
            .map_err(|_| SinkError::Rejected("sender lock poisoned".to_string()))?
            .send(notification.clone())
            .map_err(|_| SinkError::Disconnected)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn notify(&self, _notification: &Notification) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::mpsc;

    fn record() -> FlightRecord {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        FlightRecord::scheduled("AB100", "MAD", "BCN", t0, t0 + chrono::Duration::hours(2))
    }

    #[test]
    fn test_memory_store_wraps_data() {
        let store = MemoryStore::new();
        assert!(store.get(SNAPSHOT_KEY).is_none());

        let snapshot = FlightSnapshot {
            data: vec![record()],
        };
        store.store(&snapshot).unwrap();

        let raw = store.get(SNAPSHOT_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["data"].is_array());
        assert_eq!(value["data"][0]["flightNumber"], "AB100");
        assert_eq!(store.snapshot().unwrap(), snapshot);
    }

    #[test]
    fn test_file_store_writes_json() {
        let dir = std::env::temp_dir().join("flight_sim_file_store_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("flights.json");

        FileStore::new(&path)
            .store(&FlightSnapshot {
                data: vec![record()],
            })
            .unwrap();

        let read: FlightSnapshot =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.data.len(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_store_reports_io_errors() {
        let store = FileStore::new("/nonexistent-dir/flights.json");
        assert!(matches!(
            store.store(&FlightSnapshot::default()),
            Err(SinkError::Io(_))
        ));
    }

    #[test]
    fn test_channel_notifier() {
        let (tx, rx) = mpsc::channel();
        let notifier = ChannelNotifier::new(tx);
        notifier.notify(&Notification::landed(&record())).unwrap();

        let received = rx.recv().unwrap();
        assert_eq!(received.kind, NotificationKind::Success);
        assert_eq!(received.message, "Flight AB100 has landed at BCN");

        drop(rx);
        assert!(matches!(
            notifier.notify(&Notification::departed(&record())),
            Err(SinkError::Disconnected)
        ));
    }

    #[test]
    fn test_log_notifier_writes_line() {
        let logger = Logger::in_memory(false);
        LogNotifier::new(logger.clone())
            .notify(&Notification::departed(&record()))
            .unwrap();

        let lines = logger.lines().unwrap();
        assert!(lines[0].contains("Flight departed: Flight AB100 has departed from MAD"));
    }
}
