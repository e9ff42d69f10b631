/// Prism Protocol Constants

// ============================================================================
// SCALING CONSTANTS
// ============================================================================

/// Basis points denominator (100% = 10000 BPS)
pub const MAX_BASIS_POINTS: u64 = 10_000;

/// Index scale factor (1e18) for cumulative borrow interest tracking
pub const INDEX_ONE: u128 = 1_000_000_000_000_000_000; // 10^18

/// USD value scale factor (1e9) for price and market value calculations
pub const PRICE_SCALE: u128 = 1_000_000_000; // 10^9

/// Seconds per year (for interest rate calculations)
pub const SECONDS_PER_YEAR: u64 = 31_536_000; // 365 * 24 * 60 * 60

// ============================================================================
// PDA SEEDS
// ============================================================================

/// Seed prefix for Market PDA
pub const MARKET_SEED: &[u8] = b"market";

/// Seed prefix for Reserve PDA
pub const RESERVE_SEED: &[u8] = b"reserve";

/// Seed prefix for Obligation PDA
pub const OBLIGATION_SEED: &[u8] = b"obligation";

/// Seed prefix for Reserve liquidity vault PDA
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed prefix for Reserve receipt mint PDA
pub const RECEIPT_MINT_SEED: &[u8] = b"receipt_mint";

/// Seed prefix for the receipt escrow backing obligation collateral
pub const RECEIPT_VAULT_SEED: &[u8] = b"receipt_vault";

// ============================================================================
// STALENESS
// ============================================================================

/// Seconds after a refresh before an entity must be refreshed again
pub const STALE_AFTER_SECONDS: i64 = 1;

/// Maximum age of a price quote accepted by refresh_reserve
pub const MAX_PRICE_AGE_SECONDS: i64 = 120;

/// Maximum confidence interval relative to price (2% = 200 BPS)
pub const MAX_PRICE_CONFIDENCE_BPS: u64 = 200;

// ============================================================================
// LIMITS
// ============================================================================

/// Maximum number of deposit entries per obligation
pub const MAX_OBLIGATION_DEPOSITS: usize = 8;

/// Maximum number of borrow entries per obligation
pub const MAX_OBLIGATION_BORROWS: usize = 8;

/// Maximum length of a market name
pub const MAX_MARKET_NAME_LENGTH: usize = 32;

// ============================================================================
// HEALTH FACTOR
// ============================================================================

/// Health factor scale (1.0 = 10000)
pub const HEALTH_FACTOR_ONE: u64 = 10_000;
