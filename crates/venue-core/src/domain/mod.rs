//! Domain records for the venue pipeline.

pub mod error;
pub mod input;
pub mod lenient;
pub mod score;
pub mod venue;

pub use error::{Result, ValidationError, VenueError};
pub use input::InputData;
pub use score::{ScoredVenue, VenueScore};
pub use venue::Venue;
