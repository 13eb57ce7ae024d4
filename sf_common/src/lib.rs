mod amount;
mod helpers;

pub mod op;
mod secret;

pub use amount::{Amount, AmountConversionError};
pub use helpers::{parse_boolean_flag, parse_percentage};
pub use secret::Secret;
