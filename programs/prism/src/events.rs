use anchor_lang::prelude::*;

// ============================================================================
// MARKET EVENTS
// ============================================================================

/// Emitted when a new market is initialized
#[event]
pub struct MarketInitialized {
    pub market: Pubkey,
    pub authority: Pubkey,
    pub name: String,
}

// ============================================================================
// RESERVE EVENTS
// ============================================================================

/// Emitted when a new reserve is initialized
#[event]
pub struct ReserveInitialized {
    pub market: Pubkey,
    pub reserve: Pubkey,
    pub liquidity_mint: Pubkey,
    pub loan_to_value_bps: u16,
    pub liquidation_threshold_bps: u16,
}

/// Emitted when a reserve's config is updated
#[event]
pub struct ReserveConfigUpdated {
    pub reserve: Pubkey,
    pub loan_to_value_bps: u16,
    pub liquidation_threshold_bps: u16,
}

/// Emitted when a reserve is refreshed (interest accrued)
#[event]
pub struct ReserveRefreshed {
    pub reserve: Pubkey,
    pub cumulative_borrow_index: u128,
    pub market_price: u128,
    pub available_amount: u64,
    pub borrowed_amount: u64,
    pub utilization_bps: u64,
    pub borrow_rate_bps: u64,
    pub timestamp: i64,
}

// ============================================================================
// OBLIGATION EVENTS
// ============================================================================

/// Emitted when a new obligation is initialized
#[event]
pub struct ObligationInitialized {
    pub market: Pubkey,
    pub obligation: Pubkey,
    pub owner: Pubkey,
}

/// Emitted when an obligation is refreshed
#[event]
pub struct ObligationRefreshed {
    pub obligation: Pubkey,
    pub deposited_value: u128,
    pub borrowed_value: u128,
    pub allowed_borrow_value: u128,
    pub unhealthy_borrow_value: u128,
    pub health_factor_bps: Option<u64>,
    pub timestamp: i64,
}

// ============================================================================
// LIQUIDITY EVENTS
// ============================================================================

/// Emitted when liquidity is deposited into a reserve
#[event]
pub struct LiquidityDeposited {
    pub reserve: Pubkey,
    pub owner: Pubkey,
    pub liquidity_amount: u64,
    pub receipt_amount: u64,
}

/// Emitted when liquidity is withdrawn from a reserve
#[event]
pub struct LiquidityWithdrawn {
    pub reserve: Pubkey,
    pub owner: Pubkey,
    pub liquidity_amount: u64,
    pub receipt_amount: u64,
}

// ============================================================================
// BORROW / COLLATERAL EVENTS
// ============================================================================

/// Emitted when collateral is deposited into an obligation
#[event]
pub struct CollateralDeposited {
    pub reserve: Pubkey,
    pub obligation: Pubkey,
    pub liquidity_amount: u64,
    pub receipt_amount: u64,
}

/// Emitted when collateral is withdrawn from an obligation
#[event]
pub struct CollateralWithdrawn {
    pub reserve: Pubkey,
    pub obligation: Pubkey,
    pub liquidity_amount: u64,
    pub receipt_amount: u64,
}

/// Emitted when liquidity is borrowed against an obligation
#[event]
pub struct LiquidityBorrowed {
    pub reserve: Pubkey,
    pub obligation: Pubkey,
    pub amount: u64,
    pub new_borrowed_amount: u64,
}

/// Emitted when borrowed liquidity is repaid
#[event]
pub struct LiquidityRepaid {
    pub reserve: Pubkey,
    pub obligation: Pubkey,
    pub amount: u64,
    pub remaining_borrowed_amount: u64,
}

// ============================================================================
// LIQUIDATION EVENTS
// ============================================================================

/// Emitted when an unhealthy obligation is partially liquidated
#[event]
pub struct ObligationLiquidated {
    pub obligation: Pubkey,
    pub liquidator: Pubkey,
    pub repay_reserve: Pubkey,
    pub collateral_reserve: Pubkey,
    pub repay_amount: u64,
    pub seized_liquidity_amount: u64,
    pub seized_receipt_amount: u64,
}

// ============================================================================
// FLASH LOAN / FEE EVENTS
// ============================================================================

/// Emitted when a flash loan is drawn
#[event]
pub struct FlashLoanBorrowed {
    pub reserve: Pubkey,
    pub amount: u64,
}

/// Emitted when a flash loan is repaid with its fee
#[event]
pub struct FlashLoanRepaid {
    pub reserve: Pubkey,
    pub amount: u64,
    pub fee: u64,
    pub platform_fee: u64,
}

/// Emitted when the market authority redeems accumulated platform fees
#[event]
pub struct FeesRedeemed {
    pub reserve: Pubkey,
    pub authority: Pubkey,
    pub amount: u64,
}
