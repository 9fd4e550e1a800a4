//! Network Module
//!
//! Outgoing requests and the network handle the agent fetches through.

mod network;
mod request;
mod scripted;

pub use network::{strip_hop_by_hop, HttpNetwork, Network};
pub use request::{AgentRequest, Destination};
pub use scripted::ScriptedNetwork;
