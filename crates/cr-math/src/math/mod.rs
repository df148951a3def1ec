//! Core math modules.

pub mod hypergeometric;
pub mod multinomial;
pub mod normalize;
pub mod stable;
