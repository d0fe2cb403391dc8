//! Network layer - the transport seam, its reqwest implementation, and the
//! actor that runs requests off the UI thread.

pub mod actor;
pub mod client;
pub mod transport;

pub use actor::NetworkActor;
pub use client::ReqwestTransport;
pub use transport::{Transport, TransportReply, TransportRequest};
