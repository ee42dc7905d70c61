use chrono::NaiveDateTime;

/// Store timestamps come back without a zone, occasionally with fractional
/// seconds.
pub fn parse_store_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Canonical form the store accepts in filters and payloads.
pub fn format_store_timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}
