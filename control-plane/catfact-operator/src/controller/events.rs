use kube::Resource;
use kube::runtime::events::{Event, EventType, Recorder};

use crate::crd::CatFact;

pub const REASON_COMPLETED: &str = "Completed";
pub const REASON_INVALID_ICON: &str = "InvalidIconName";

/// Publishes an event against `obj`; failures are dropped.
pub async fn emit_event(
    recorder: &Recorder,
    obj: &CatFact,
    type_: EventType,
    reason: &str,
    action: &str,
    note: Option<String>,
) {
    let _ = recorder
        .publish(
            &Event {
                type_,
                reason: reason.into(),
                note,
                action: action.into(),
                secondary: None,
            },
            &obj.object_ref(&()),
        )
        .await;
}
