//! # MCTL Control Library
//!
//! Version-adapting control layer for the managed voice server's remote-control
//! interface.
//!
//! ## Architecture
//!
//! ### 1. Probe ([`probe`])
//! Pings the endpoint, asks for its version and picks the protocol generation.
//!
//! ### 2. Endpoint ([`endpoint`])
//! Proxy plus [`Dialect`]. All calls cross [`Endpoint::call`], which turns
//! transport failures into [`CtlError`](mctl_core::CtlError).
//!
//! ### 3. Adapters ([`adapter`])
//! The uniform [`Adapter`] interface. Variants:
//! - [`LegacyAdapter`]: Murmur 1.1.8
//! - [`MurmurAdapter`]: Murmur 1.2.0 - 1.4.x
//! - [`MumbleServerAdapter`]: 1.5 and later
//!
//! ### 4. Channel viewer ([`cvp`])
//! JSON documents for channel viewer front ends.
//!
//! ## Example
//!
//! ```ignore
//! let adapter = mctl_control::select_adapter(proxy)?;
//! for server in adapter.list_booted_servers()? {
//!     let tree = adapter.get_tree(server)?;
//!     println!("{}: {} users", server, tree.user_count());
//! }
//! ```

pub mod adapter;
pub mod cvp;
mod decode;
pub mod dialect;
pub mod endpoint;
pub mod legacy;
pub mod mumble_server;
pub mod murmur;
pub mod probe;
pub mod repair;

#[cfg(test)]
mod fake;

pub use adapter::Adapter;
pub use dialect::Dialect;
pub use endpoint::Endpoint;
pub use legacy::LegacyAdapter;
pub use mumble_server::MumbleServerAdapter;
pub use murmur::MurmurAdapter;
pub use probe::{probe_version, select_adapter, select_generation};
