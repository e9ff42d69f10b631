pub mod borrow_obligation_liquidity;
pub mod deposit_liquidity;
pub mod deposit_obligation_collateral;
pub mod flash_borrow;
pub mod flash_repay;
pub mod initialize_obligation;
pub mod repay_obligation_liquidity;
pub mod withdraw_liquidity;
pub mod withdraw_obligation_collateral;

pub use borrow_obligation_liquidity::*;
pub use deposit_liquidity::*;
pub use deposit_obligation_collateral::*;
pub use flash_borrow::*;
pub use flash_repay::*;
pub use initialize_obligation::*;
pub use repay_obligation_liquidity::*;
pub use withdraw_liquidity::*;
pub use withdraw_obligation_collateral::*;
