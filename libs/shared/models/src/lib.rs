pub mod doctor;
pub mod error;
pub mod events;
pub mod patient;

pub use doctor::*;
pub use error::AppError;
pub use events::*;
pub use patient::*;
