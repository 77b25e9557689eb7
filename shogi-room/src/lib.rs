pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod persistence;
pub mod room;
pub mod session;
pub mod terminal;
pub mod transport;

pub use config::Config;
pub use session::SessionRouter;
