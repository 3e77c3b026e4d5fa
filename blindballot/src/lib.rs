#[macro_use]
extern crate serde;

mod arith;
mod ballot;
mod blind;
mod client;
mod error;
mod params;
pub mod serde_decimal;
mod session;

pub use arith::*;
pub use ballot::*;
pub use blind::*;
pub use client::*;
pub use error::*;
pub use params::*;
pub use session::*;
