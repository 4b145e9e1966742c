pub mod app;
pub mod config;
pub mod ipc;
pub mod observer;
pub mod runtime;
pub mod scheduler;
pub mod voices;

pub use app::*;
pub use config::*;
pub use ipc::*;
pub use observer::*;
pub use runtime::*;
pub use scheduler::*;
pub use voices::*;
