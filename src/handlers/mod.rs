pub mod map;
pub mod map_zones;
pub mod system;
pub mod utils;
pub mod zone;

// Re-export handler functions for use in routing
pub use map::delete as map_delete;
pub use map::get as map_get;
pub use map::post as map_post;
pub use map::put as map_put;

pub use map_zones::get as map_zones_get;
pub use map_zones::put as map_zones_put;

pub use zone::delete as zone_delete;
pub use zone::get as zone_get;
pub use zone::post as zone_post;
pub use zone::put as zone_put;

pub use system::{health, root};
