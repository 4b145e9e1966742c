pub mod catalog;
pub mod chord;
pub mod engine;

pub use catalog::*;
pub use chord::*;
pub use engine::*;
