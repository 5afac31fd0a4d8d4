/// Notifications emitted while decoding or converting
use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

/// Facets between two progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: u32 = 100;

/// Which informational value an `Info` notification carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoKey {
    Type,
    Size,
}

/// Side-channel messages from a running decode to its caller.
///
/// Serialized in the `{"type": ..., "prop": ..., "data": ...}` shape browser
/// workers exchange, e.g. `{"type":"progress","data":40}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    /// Percentage of facets processed, non-decreasing within one decode
    Progress {
        #[serde(rename = "data")]
        percent: u8,
    },
    /// Detected format or byte size, sent once before facet extraction
    Info { prop: InfoKey, data: String },
    /// Advisory notice, e.g. that the mesh was recentered
    Message { data: String },
    /// Percentage of facets written by the ASCII-to-binary converter
    ConvertProgress {
        #[serde(rename = "data")]
        percent: u8,
    },
}

/// Receives notifications from a decode or conversion.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl<F: FnMut(Notification)> NotificationSink for F {
    fn notify(&mut self, notification: Notification) {
        self(notification)
    }
}

impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// A hung-up receiver means the caller lost interest; the decode keeps going.
impl NotificationSink for Sender<Notification> {
    fn notify(&mut self, notification: Notification) {
        let _ = self.send(notification);
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _notification: Notification) {}
}

/// Emits a progress notification every `interval` facets.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTicker {
    total: u32,
    interval: u32,
}

impl ProgressTicker {
    /// An `interval` of 0 disables progress.
    pub fn new(total: u32, interval: u32) -> Self {
        Self { total, interval }
    }

    pub fn tick(&self, index: u32, sink: &mut dyn NotificationSink) {
        if let Some(percent) = self.percent_at(index) {
            sink.notify(Notification::Progress { percent });
        }
    }

    pub fn tick_convert(&self, index: u32, sink: &mut dyn NotificationSink) {
        if let Some(percent) = self.percent_at(index) {
            sink.notify(Notification::ConvertProgress { percent });
        }
    }

    fn percent_at(&self, index: u32) -> Option<u8> {
        if self.interval == 0 || self.total == 0 || index % self.interval != 0 {
            return None;
        }
        let ratio = f64::from(index) / f64::from(self.total);
        Some((ratio * 100.0).round().min(100.0) as u8)
    }
}

/// Human-readable byte size, e.g. `"0 Byte"`, `"512 Bytes"`, `"3 MB"`.
pub fn format_byte_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Byte".to_string();
    }

    let mut unit = 0;
    while unit + 1 < UNITS.len() && bytes >= 1u64 << (10 * (unit + 1)) {
        unit += 1;
    }
    let scaled = bytes as f64 / (1u64 << (10 * unit)) as f64;
    format!("{} {}", scaled.round() as u64, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_every_interval() {
        let ticker = ProgressTicker::new(1000, 100);
        let mut seen = Vec::new();
        for i in 0..1000 {
            ticker.tick(i, &mut seen);
        }

        let percents: Vec<u8> = seen
            .iter()
            .map(|n| match n {
                Notification::Progress { percent } => *percent,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(percents, vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90]);
    }

    #[test]
    fn test_ticker_disabled() {
        let ticker = ProgressTicker::new(500, 0);
        let mut seen = Vec::new();
        for i in 0..500 {
            ticker.tick(i, &mut seen);
        }
        assert!(seen.is_empty());
    }

    #[test]
    fn test_ticker_rounds() {
        let ticker = ProgressTicker::new(300, 100);
        let mut seen = Vec::new();
        ticker.tick(100, &mut seen);
        ticker.tick(200, &mut seen);
        assert_eq!(
            seen,
            vec![
                Notification::Progress { percent: 33 },
                Notification::Progress { percent: 67 },
            ]
        );
    }

    #[test]
    fn test_closure_and_channel_sinks() {
        let mut count = 0;
        {
            let mut sink = |_n: Notification| count += 1;
            sink.notify(Notification::Message { data: "a".into() });
            sink.notify(Notification::Message { data: "b".into() });
        }
        assert_eq!(count, 2);

        let (mut tx, rx) = std::sync::mpsc::channel::<Notification>();
        tx.notify(Notification::Progress { percent: 5 });
        assert_eq!(rx.recv().unwrap(), Notification::Progress { percent: 5 });

        drop(rx);
        tx.notify(Notification::Progress { percent: 6 });
    }

    #[test]
    fn test_byte_size_formatting() {
        assert_eq!(format_byte_size(0), "0 Byte");
        assert_eq!(format_byte_size(134), "134 Bytes");
        assert_eq!(format_byte_size(1023), "1023 Bytes");
        assert_eq!(format_byte_size(1024), "1 KB");
        assert_eq!(format_byte_size(1536), "2 KB");
        assert_eq!(format_byte_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_byte_size(3 << 40), "3 TB");
        assert_eq!(format_byte_size(2048 << 40), "2048 TB");
    }

    #[test]
    fn test_wire_shape() {
        let progress = serde_json::to_string(&Notification::Progress { percent: 40 }).unwrap();
        assert_eq!(progress, r#"{"type":"progress","data":40}"#);

        let info = serde_json::to_string(&Notification::Info {
            prop: InfoKey::Type,
            data: "binary".into(),
        })
        .unwrap();
        assert_eq!(info, r#"{"type":"info","prop":"type","data":"binary"}"#);

        let convert = serde_json::to_string(&Notification::ConvertProgress { percent: 7 }).unwrap();
        assert_eq!(convert, r#"{"type":"convert-progress","data":7}"#);
    }
}
