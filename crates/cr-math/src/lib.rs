//! Capture-recapture math utilities.

pub mod math;

pub use math::hypergeometric;
pub use math::multinomial;
pub use math::normalize::*;
pub use math::stable::*;
