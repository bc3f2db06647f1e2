use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::reading::TimestampField;

#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub id: i64,

    pub temperature: Option<f64>,

    pub humidity: Option<f64>,

    /// Raw timestamp text as sent by the backend. May be absent or
    /// unparsable; rendering and sorting must tolerate both.
    pub recorded_at: Option<String>,
}

impl SensorReading {
    pub fn recorded_instant(&self) -> Option<DateTime<Utc>> {
        self.recorded_at.as_deref().and_then(parse_instant)
    }
}

/// One element of the backend's JSON array, before the timestamp key is
/// resolved. Field names follow the `lectura_sensor` schema.
#[derive(Debug, Deserialize)]
pub struct WireReading {
    #[serde(alias = "id_lectura")]
    id: i64,

    #[serde(default)]
    temperatura: Option<f64>,

    #[serde(default)]
    humedad: Option<f64>,

    #[serde(default)]
    timestamp: Option<String>,

    #[serde(default)]
    fecha_hora: Option<String>,
}

impl WireReading {
    pub fn into_reading(self, timestamp_field: TimestampField) -> SensorReading {
        let recorded_at = match timestamp_field {
            TimestampField::Timestamp => self.timestamp,
            TimestampField::FechaHora => self.fecha_hora,
        };

        SensorReading {
            id: self.id,
            temperature: self.temperatura,
            humidity: self.humedad,
            recorded_at,
        }
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // FastAPI serializes naive DateTime columns without an offset.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    None
}
