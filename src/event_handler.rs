use tokio::sync::mpsc::UnboundedSender;

use crate::event::Event;

pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: Event) {
        let _ = event;
    }
}

/// Forwards notifications to a task, e.g. the one feeding the sync transport.
impl EventHandler for UnboundedSender<Event> {
    fn on_event(&self, event: Event) {
        if self.send(event).is_err() {
            tracing::trace!("event receiver dropped");
        }
    }
}
