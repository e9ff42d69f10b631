pub mod initialize_market;
pub mod initialize_reserve;
pub mod redeem_fees;
pub mod update_reserve;

pub use initialize_market::*;
pub use initialize_reserve::*;
pub use redeem_fees::*;
pub use update_reserve::*;
