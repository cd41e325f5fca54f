mod week;
pub use week::*;
