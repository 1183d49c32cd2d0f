//! Event selection engine
//!
//! Components, leaves first: session state and pacing, notoriety tiers,
//! adaptive gaps, the pre-filter, the scorer, the fallback cascade and
//! temporal jumps. [`Selector`] composes them.

mod adaptation;
mod engine;
mod fallback;
mod gap;
mod hooks;
mod jump;
mod notoriety;
mod prefilter;
mod scorer;
#[cfg(feature = "python")]
mod session;
mod state;


pub use adaptation::*;
pub use engine::*;
pub use fallback::*;
pub use gap::*;
pub use hooks::*;
pub use jump::*;
pub use notoriety::*;
pub use prefilter::*;
pub use scorer::*;
#[cfg(feature = "python")]
pub use session::{GameSelector, PySelection};
pub use state::*;
