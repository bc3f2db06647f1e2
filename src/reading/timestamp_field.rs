use std::str::FromStr;

use anyhow::{Error, bail};

/// Which wire key carries the reading timestamp. The deployed backends
/// disagree (`timestamp` vs `fecha_hora`), so this is configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampField {
    Timestamp,
    #[default]
    FechaHora,
}

impl TimestampField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampField::Timestamp => "timestamp",
            TimestampField::FechaHora => "fecha_hora",
        }
    }
}

impl FromStr for TimestampField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(TimestampField::Timestamp),
            "fecha_hora" => Ok(TimestampField::FechaHora),
            _ => bail!("unknown timestamp field: {}", s),
        }
    }
}
