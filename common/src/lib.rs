//! NIBOR Common Types
//!
//! Shared types for the NIBOR reconciliation core: tenor and currency
//! keys, validated decimal conversion and the error taxonomy.

pub mod tenor;
pub mod currency;
pub mod numeric;
pub mod error;

pub use tenor::*;
pub use currency::*;
pub use numeric::*;
pub use error::*;
