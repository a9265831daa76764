#[macro_use]
extern crate serde;

#[macro_use]
extern crate log;

mod arithmetic;
mod authority;
mod ballot;
mod challenge;
mod curve;
mod election;
mod error;
mod point;
mod proof;
mod serde_hex;
mod signature;
mod store;
mod tally;
mod voter;

pub use arithmetic::*;
pub use authority::*;
pub use ballot::*;
pub use challenge::*;
pub use curve::*;
pub use election::*;
pub use error::*;
pub use point::*;
pub use proof::*;
pub use serde_hex::*;
pub use signature::*;
pub use store::*;
pub use tally::*;
pub use voter::*;
