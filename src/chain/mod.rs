//! Chain value types shared by the notification client: hashes, network
//! parameters, decoded transactions and API version negotiation.

mod hash;
mod params;
mod tx;
mod version;

pub use hash::*;
pub use params::*;
pub use tx::*;
pub use version::*;
