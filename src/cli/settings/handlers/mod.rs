//! Setting handlers for different configuration patterns.

pub mod boolean;
pub mod lookup;
pub mod string;

pub use boolean::*;
pub use lookup::*;
pub use string::*;
