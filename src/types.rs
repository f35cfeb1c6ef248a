/// Shared types used across the codebase

use uuid::Uuid;

pub type MapId = i32;
pub type CustomerId = i32;
pub type ZoneId = String;

/// Placeholder id the map editor assigns to zones it has not saved yet
pub const TEMP_ZONE_ID: &str = "temp";

/// Prefix of per-zone placeholder ids (e.g. "temp-1699999999")
pub const TEMP_ZONE_ID_PREFIX: &str = "temp-";

/// Whether a submitted zone record refers to a persisted row or must be inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneIdentity<'a> {
    New,
    Existing(&'a str),
}

/// Classify a client-submitted zone identifier.
///
/// Absent, empty, `"temp"` and `"temp-*"` identifiers are new zones; anything
/// else names a persisted zone. Every code path that decides between insert
/// and update goes through here.
pub fn classify(id: Option<&str>) -> ZoneIdentity<'_> {
    match id {
        None => ZoneIdentity::New,
        Some(id) if id.is_empty() => ZoneIdentity::New,
        Some(id) if id == TEMP_ZONE_ID || id.starts_with(TEMP_ZONE_ID_PREFIX) => ZoneIdentity::New,
        Some(id) => ZoneIdentity::Existing(id),
    }
}

/// Generate the identifier for a zone about to be inserted
pub fn generate_zone_id() -> ZoneId {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_placeholder_ids_are_new() {
        assert_eq!(classify(None), ZoneIdentity::New);
        assert_eq!(classify(Some("")), ZoneIdentity::New);
        assert_eq!(classify(Some("temp")), ZoneIdentity::New);
        assert_eq!(classify(Some("temp-abc123")), ZoneIdentity::New);
        assert_eq!(classify(Some("temp-")), ZoneIdentity::New);
    }

    #[test]
    fn persisted_ids_are_existing() {
        let id = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        assert_eq!(classify(Some(id)), ZoneIdentity::Existing(id));
        assert_eq!(classify(Some("z1")), ZoneIdentity::Existing("z1"));
    }

    #[test]
    fn near_miss_placeholders_are_existing() {
        // Only the exact token and the dashed prefix are reserved
        assert_eq!(classify(Some("temporary")), ZoneIdentity::Existing("temporary"));
        assert_eq!(classify(Some("TEMP")), ZoneIdentity::Existing("TEMP"));
        assert_eq!(classify(Some("xtemp-1")), ZoneIdentity::Existing("xtemp-1"));
    }

    #[test]
    fn generated_ids_are_distinct_and_existing() {
        let a = generate_zone_id();
        let b = generate_zone_id();
        assert_ne!(a, b);
        assert!(matches!(classify(Some(&a)), ZoneIdentity::Existing(_)));
    }
}
