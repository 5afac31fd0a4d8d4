/// Background decoding on a worker thread
///
/// A decode runs on its own thread and talks to its caller only through
/// events: notifications while it runs, then exactly one `Done` or `Failed`.
/// Each run owns its bytes, so any number of decodes can run side by side.
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::decoder::{decode_with, DecodeOptions, DecodeOutput};
use crate::error::{DecodeError, DecodeResult};
use crate::notify::{Notification, NotificationSink};

/// Messages from a decode worker
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Notify(Notification),
    Done(Box<DecodeOutput>),
    Failed(DecodeError),
}

impl WorkerEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerEvent::Notify(_))
    }
}

struct EventSink(Sender<WorkerEvent>);

impl NotificationSink for EventSink {
    fn notify(&mut self, notification: Notification) {
        // The caller may have dropped the handle; keep decoding regardless.
        let _ = self.0.send(WorkerEvent::Notify(notification));
    }
}

/// Caller's side of a running decode. Dropping it abandons the decode: the
/// worker finishes and its output is discarded.
#[derive(Debug)]
pub struct DecodeHandle {
    events: Receiver<WorkerEvent>,
    thread: JoinHandle<()>,
}

/// Start decoding `bytes` on a new thread.
pub fn spawn_decode(bytes: Vec<u8>, options: DecodeOptions) -> io::Result<DecodeHandle> {
    let (tx, rx) = mpsc::channel();

    let thread = thread::Builder::new()
        .name("stl-decode".to_string())
        .spawn(move || {
            let mut sink = EventSink(tx.clone());
            let terminal = match decode_with(&bytes, &options, &mut sink) {
                Ok(output) => WorkerEvent::Done(Box::new(output)),
                Err(err) => WorkerEvent::Failed(err),
            };
            if tx.send(terminal).is_err() {
                debug!("decode finished after its handle was dropped");
            }
        })?;

    Ok(DecodeHandle { events: rx, thread })
}

impl DecodeHandle {
    /// Blocking iterator over events; ends after the terminal event.
    pub fn events(&self) -> impl Iterator<Item = WorkerEvent> + '_ {
        self.events.iter()
    }

    /// The next event if one is ready.
    pub fn try_next(&self) -> Option<WorkerEvent> {
        self.events.try_recv().ok()
    }

    /// Feed notifications to `on_notify` until the decode ends, then return
    /// its result.
    pub fn wait(self, mut on_notify: impl FnMut(Notification)) -> DecodeResult<DecodeOutput> {
        let DecodeHandle { events, thread } = self;

        let result = loop {
            match events.recv() {
                Ok(WorkerEvent::Notify(notification)) => on_notify(notification),
                Ok(WorkerEvent::Done(output)) => break Ok(*output),
                Ok(WorkerEvent::Failed(err)) => break Err(err),
                Err(_) => break Err(DecodeError::WorkerLost),
            }
        };

        if thread.join().is_err() {
            return Err(DecodeError::WorkerLost);
        }
        result
    }
}
