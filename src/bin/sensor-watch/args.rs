use chrono_tz::Tz;
use clap::Parser;
use lectura_sensor::reading::TimestampField;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "API_BASE_URL")]
    pub base_url: String,

    #[arg(long, env = "API_TOKEN")]
    pub token: String,

    /// Timezone used for displaying timestamps.
    #[arg(long, env = "TZ")]
    pub timezone: Tz,

    /// Wire key carrying the reading timestamp (`timestamp` or `fecha_hora`).
    #[arg(long, env = "TIMESTAMP_FIELD", default_value = "fecha_hora")]
    pub timestamp_field: TimestampField,

    #[arg(long, default_value_t = 10)]
    pub interval_secs: u64,

    /// Keep running and refresh automatically at the polling interval.
    #[arg(long)]
    pub watch: bool,
}
