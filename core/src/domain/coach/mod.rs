pub mod entities;
pub mod ports;
pub mod prompts;
pub mod services;
pub mod tools;
pub mod value_objects;

pub use entities::*;
pub use ports::*;
pub use value_objects::*;
