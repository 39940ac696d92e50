pub mod builder;
pub mod reason;

pub use builder::AlertBuilder;
