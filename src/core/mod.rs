pub mod clock;
pub mod services;
