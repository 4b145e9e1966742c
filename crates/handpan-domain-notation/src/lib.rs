pub mod layout;
pub mod model;
pub mod parser;
pub mod pitch;
pub mod progression;
pub mod scales;
pub mod text;

pub use layout::*;
pub use model::*;
pub use parser::*;
pub use pitch::*;
pub use progression::*;
pub use scales::*;
pub use text::*;
