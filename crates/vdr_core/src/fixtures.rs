//! Test documents shared by the unit tests of this crate.

use serde_json::{json, Value};

/// A valid session document whose `session_alarm` holds one entry per id.
pub(crate) fn sample_session(alarm_ids: &[i64]) -> Value {
    let mut doc: Value = serde_json::from_str(include_str!("../fixtures/session.json"))
        .expect("fixture is valid JSON");
    doc["data"]["session_alarm"] = alarm_ids.iter().map(|id| alarm(*id)).collect();
    doc
}

pub(crate) fn alarm(id: i64) -> Value {
    json!({
        "id": id,
        "session_id": 999,
        "vdr_log_id": 101,
        "nmea_sentence_id": 6000 + id,
        "alert_id": format!("ALR-{id:03}"),
        "description": "Depth below keel under limit",
        "timestamp": "2025-03-02T08:10:00.000Z",
        "created_at": "2025-03-02T08:10:01.000Z",
        "updated_at": null,
        "deleted_at": null
    })
}
