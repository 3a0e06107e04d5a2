pub mod clock;
pub mod config;
pub mod slot;

pub use clock::*;
pub use config::*;
pub use slot::*;
