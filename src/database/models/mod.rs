pub mod map;
pub mod zone;

pub use map::{Map, MapChanges, MapDraft, MapWithZones};
pub use zone::{Zone, ZoneDraft, ZoneInput, ZonePatch};
