//! Core primitives shared by every stage: turn bookkeeping, canonical
//! front-edge keys and fixed-precision rounding for reported numbers.

pub mod edge_key;
pub mod precision;
pub mod turn;

pub use edge_key::{EdgeKey, EdgeKeyError};
pub use precision::{round6, ratio6};
pub use turn::TurnClock;
