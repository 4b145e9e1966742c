pub mod audio;
pub mod playback;
pub mod storage;
pub mod timer;
pub mod types;

pub use audio::*;
pub use playback::*;
pub use storage::*;
pub use timer::*;
pub use types::*;
