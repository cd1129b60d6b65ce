// Entity Models
//
// Each entity has a stable identity (UUID) that NEVER changes.
// Sales reference locations by name only (weak reference).

pub mod location;
pub mod sale;

pub use location::{Location, LocationCategory, ParseCategoryError};
pub use sale::Sale;
