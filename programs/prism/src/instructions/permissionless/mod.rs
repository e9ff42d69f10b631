pub mod liquidate;
pub mod refresh_obligation;
pub mod refresh_reserve;

pub use liquidate::*;
pub use refresh_obligation::*;
pub use refresh_reserve::*;
