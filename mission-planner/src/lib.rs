//! Interactive core of the browser mission planner. The presentation layer
//! (map widget, draw toolbar, modals) stays in JavaScript; this crate owns
//! the session state, the live mission, and the relay client for mission
//! streaming, and exposes them to the shell through `JsMissionPlanner` on
//! wasm targets. Native targets get the same logic minus the transport, so
//! everything is exercised by plain `cargo test`.

pub mod ownership;
pub mod planner;
pub mod relay;

#[cfg(target_arch = "wasm32")]
mod wasm;


pub use crate::ownership::Ownership;
pub use crate::planner::{Planner, Session, StreamInfo};
#[cfg(target_arch = "wasm32")]
pub use crate::wasm::JsMissionPlanner;
