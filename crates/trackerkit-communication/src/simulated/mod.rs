//! Simulated backends
//!
//! In-memory stand-ins for real bridge and push clients. Everything a
//! tracker asks of them is recorded, and connectivity can be scripted
//! cycle by cycle.

mod bridge;
mod factory;
mod push;

pub use bridge::SimulatedBridge;
pub use factory::SimulatedFactory;
pub use push::SimulatedPush;
