use std::{
    fmt,
    sync::{Arc, Mutex},
};

use tracing::{
    field::{Field, Visit},
    Event, Level, Subscriber,
};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    Layer,
};

/// Records the level and message of every event emitted on this thread.
#[derive(Debug, Clone, Default)]
struct EventRecorder {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for EventRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

/// Runs `f` with a subscriber installed and returns its result along with the
/// `INFO` and `WARN` events it emitted.
pub(crate) fn record_events<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
    let recorder = EventRecorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    let events = recorder
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, _)| *level == Level::INFO || *level == Level::WARN)
        .cloned()
        .collect();
    (result, events)
}
