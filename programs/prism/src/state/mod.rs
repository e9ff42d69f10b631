pub mod last_update;
pub mod market;
pub mod obligation;
pub mod price;
pub mod reserve;

pub use last_update::*;
pub use market::*;
pub use obligation::*;
pub use price::*;
pub use reserve::*;
