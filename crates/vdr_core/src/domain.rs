//! crates/vdr_core/src/domain.rs
//!
//! Defines the typed records that make up a stored VDR session.
//! Every record keeps the fields it does not know about in `extra`, so a
//! session written by a newer producer survives a round trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Fields carried through without interpretation.
pub type Extra = Map<String, Value>;

/// One recorded voyage-data-capture episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub success: bool,
    pub data: SessionBody,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Session {
    pub fn id(&self) -> i64 {
        self.data.session_data.id
    }
}

/// The composite payload of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBody {
    pub session_data: SessionData,
    pub vdr_logs: Vec<VdrLog>,
    pub session_ownship: Vec<OwnshipFix>,
    pub session_ownship_conning: Vec<ConningRecord>,
    pub session_ownship_telemetry: Vec<TelemetryRecord>,
    pub session_ships_ais: Vec<AisFix>,
    pub session_ownship_active_vessels: Vec<ActiveVessel>,
    pub session_ships: ShipList,
    pub session_alarm: Vec<Alarm>,
    pub session_cpa_tcpa: Vec<CpaTcpa>,
    pub start_time: String,
    pub end_time: String,
    pub duration_seconds: Number,
    pub duration_human: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Identity and metadata of a session. `id` is owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub id: i64,
    pub user_id: Number,
    pub name: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A raw NMEA sentence as captured by the recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VdrLog {
    pub id: i64,
    pub session_id: Number,
    pub vdr_logs_id: Number,
    pub raw_sentence: String,
    pub talker: String,
    pub sentence_type: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_over_ground: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_over_ground: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_true: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_speed_kmh: Option<Number>,
    pub depth_meters: Value,
    pub rudder_angle_starboard: Value,
    pub rate_of_turn: Value,
    pub created_at: String,
    pub updated_at: Value,
    pub deleted_at: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A navigation fix of the recording vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnshipFix {
    pub id: i64,
    pub session_id: Number,
    pub vdr_log_id: Number,
    pub nmea_sentence_id: Number,
    pub name: String,
    pub imo: String,
    pub mmsi: String,
    pub heading_true: Number,
    pub speed_over_ground: Number,
    pub rate_of_turn: Number,
    pub revolution_per_min: Number,
    pub rudder_angle_starboard: Number,
    pub latitude: Number,
    pub longitude: Number,
    pub is_ownership: bool,
    pub timestamp: String,
    pub created_at: String,
    pub updated_at: Value,
    pub deleted_at: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Conning display state. `imo` is numeric here, unlike the other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConningRecord {
    pub id: i64,
    pub session_id: Number,
    pub vdr_log_id: Number,
    pub nmea_sentence_id: Number,
    pub name: String,
    pub imo: Number,
    pub mmsi: String,
    pub heading_true: Number,
    pub speed_over_ground: Number,
    pub revolution_per_min: Number,
    pub rudder_angle_starboard: Number,
    pub created_at: String,
    pub updated_at: Value,
    pub deleted_at: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub id: i64,
    pub session_id: Number,
    pub vdr_log_id: Number,
    pub nmea_sentence_id: Number,
    pub name: String,
    pub imo: String,
    pub mmsi: String,
    pub heading_true: Number,
    pub speed_over_ground: Number,
    pub rate_of_turn: Number,
    pub revolution_per_min: Number,
    pub rudder_angle_starboard: Number,
    pub course_over_ground: Number,
    pub water_speed_kmh: Number,
    pub depth_meters: Number,
    pub is_ownership: bool,
    pub timestamp: String,
    pub created_at: String,
    pub updated_at: Value,
    pub deleted_at: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A fix of another vessel received over AIS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AisFix {
    pub id: i64,
    pub session_id: Number,
    pub vdr_log_id: Number,
    pub nmea_sentence_id: Number,
    pub name: String,
    pub imo: String,
    pub mmsi: String,
    pub heading_true: Number,
    pub speed_over_ground: Number,
    pub rate_of_turn: Number,
    pub revolution_per_min: Number,
    pub rudder_angle_starboard: Number,
    pub latitude: Number,
    pub longitude: Number,
    pub is_ownership: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub created_at: String,
    pub updated_at: Value,
    pub deleted_at: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A vessel seen during the session, with its track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveVessel {
    pub id: i64,
    pub session_id: Number,
    pub name: String,
    pub imo: String,
    pub mmsi: String,
    pub is_ownership: bool,
    pub track: Vec<TrackPoint>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub vdr_log_id: Number,
    pub nmea_sentence_id: Number,
    pub speed_over_ground: Number,
    pub course_over_ground: Number,
    pub status: Number,
    pub latitude: Number,
    pub longitude: Number,
    pub timestamp: String,
    pub created_at: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipList {
    pub data: Vec<ShipRecord>,
    pub count: Number,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipRecord {
    pub id: i64,
    pub session_id: Number,
    pub vdr_log_id: Number,
    pub nmea_sentence_id: Number,
    pub name: String,
    pub imo: String,
    pub mmsi: String,
    pub is_ownership: bool,
    pub created_at: String,
    pub updated_at: Value,
    pub deleted_at: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

/// An alarm raised during the session. `id` is assumed unique across all
/// stored sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: i64,
    pub session_id: Number,
    pub vdr_log_id: Number,
    pub nmea_sentence_id: Number,
    pub alert_id: String,
    pub description: String,
    pub timestamp: String,
    pub created_at: String,
    pub updated_at: Value,
    pub deleted_at: Value,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A closest-point-of-approach computation against another vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpaTcpa {
    pub id: i64,
    pub session_id: Number,
    pub vdr_log_id: Number,
    pub name: String,
    pub cpa_distance: Number,
    pub tcpa: String,
    pub timestamp: String,
    pub risk_level: String,
    #[serde(flatten)]
    pub extra: Extra,
}
