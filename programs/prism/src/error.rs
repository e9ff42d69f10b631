use anchor_lang::prelude::*;

#[error_code]
pub enum LendingError {
    #[msg("Amount should be greater than 0")]
    InvalidAmount,
    #[msg("Invalid reserve configuration")]
    InvalidConfig,
    #[msg("Insufficient funds to withdraw")]
    InsufficientFunds,
    #[msg("Insufficient liquidity available in reserve")]
    InsufficientLiquidity,
    #[msg("Insufficient collateral to seize")]
    InsufficientCollateral,
    #[msg("Operation would exceed the maximum loan to value ratio")]
    ExceededLTV,
    #[msg("Attempting to repay more than borrowed")]
    ExceededBorrowedAmount,
    #[msg("Reserve is stale and must be refreshed")]
    ReserveStale,
    #[msg("Obligation is stale and must be refreshed")]
    ObligationStale,
    #[msg("Obligation is healthy and cannot be liquidated")]
    HealthyPosition,
    #[msg("No platform fees available to redeem")]
    NoFeesAvailable,
    #[msg("Price quote is malformed")]
    InvalidPriceQuote,
    #[msg("Price quote is older than the maximum accepted age")]
    PriceQuoteStale,
    #[msg("Cumulative borrow index decreased")]
    NegativeInterestRate,
    #[msg("Signer is not the market authority")]
    InvalidMarketAuthority,
    #[msg("Reserve does not match the obligation entry")]
    InvalidReserve,
    #[msg("Signer is not the obligation owner")]
    InvalidObligationOwner,
    #[msg("Obligation does not belong to this market")]
    InvalidObligationMarket,
    #[msg("Obligation has no collateral deposits")]
    ObligationDepositsEmpty,
    #[msg("Obligation has no liquidity borrows")]
    ObligationBorrowsEmpty,
    #[msg("No collateral entry for this reserve")]
    InvalidObligationCollateral,
    #[msg("No borrow entry for this reserve")]
    InvalidObligationLiquidity,
    #[msg("Maximum deposit entries per obligation reached")]
    MaxDepositsReached,
    #[msg("Maximum borrow entries per obligation reached")]
    MaxBorrowsReached,
    #[msg("More reserve accounts supplied than obligation entries")]
    TooManyAccounts,
    #[msg("Account is not owned by this program")]
    InvalidAccountOwner,
    #[msg("Market name exceeds the maximum length")]
    NameTooLong,
    #[msg("No flash repay instruction found in transaction")]
    NoFlashRepayInstruction,
    #[msg("Multiple flash borrows are not allowed")]
    MultipleFlashBorrowsNotAllowed,
    #[msg("Multiple flash repays are not allowed")]
    MultipleFlashRepaysNotAllowed,
    #[msg("Flash repay instruction data is malformed")]
    InvalidFlashRepayInstructionData,
    #[msg("Flash repay amount does not match the borrowed amount")]
    InvalidFlashRepayAmount,
    #[msg("Flash repay reserve does not match the borrow reserve")]
    InvalidFlashRepayReserve,
    #[msg("Flash repay must be paired with a borrow from this program")]
    InvalidFlashRepayProgramId,
    #[msg("Referenced instruction is not a flash borrow")]
    InvalidBorrowInstructionIndex,
    #[msg("Math operation overflow")]
    MathOverflow = 1000,
}
