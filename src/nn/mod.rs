//! Neural-network building blocks
//!
//! Every node of a supernet graph implements [`Module`]. Parameters are
//! issued by a [`ParamRegistry`] during `build`, each with a unique
//! [`ParamId`], so the supernet can partition them by id rather than by
//! object identity.

mod dense;
mod identity;
mod module;
mod param;
mod sequential;

pub use dense::{Activation, Dense};
pub use identity::{Identity, Zero};
pub use module::{Forward, Module};
pub use param::{MixtureHandle, ParamId, ParamRegistry, Parameter, Temperature};
pub use sequential::Sequential;
