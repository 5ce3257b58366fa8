pub use ping::Mode;
pub use ping::Ping;
pub use ping::Pinger;
pub use probe::Probe;

mod ping;
mod probe;
mod sock;
mod state;
