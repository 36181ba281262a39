//! Entity records consumed from the data layer.
//!
//! These are plain, already-fetched records for one rendering pass. The
//! graph engine never mutates them; it only borrows them while deriving the
//! topology.
//!
//! # Organization
//!
//! - [`network`] - Reachability targets and their containers: [`Peer`], [`Group`],
//!   [`NetworkResource`], [`Network`]
//! - [`policy`] - Access control: [`Policy`], [`PolicyRule`], and rule side resolution

pub mod network;
pub mod policy;

pub use network::*;
pub use policy::*;
