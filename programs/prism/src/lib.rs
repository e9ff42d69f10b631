use anchor_lang::prelude::*;

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;

pub use constants::*;
use instructions::*;
use state::PriceQuote;

declare_id!("4aAV85SXWvGttWeCvLpVThPPfEmacMLpyXM1i2M1hJpr");

#[program]
pub mod prism {
    use super::*;

    // ============================================================================
    // ADMIN INSTRUCTIONS
    // ============================================================================

    /// Initialize a new lending market
    pub fn initialize_market(ctx: Context<InitializeMarket>, name: String) -> Result<()> {
        instructions::admin::initialize_market::handler(ctx, name)
    }

    /// Initialize a new reserve (liquidity pool) in a market
    pub fn initialize_reserve(
        ctx: Context<InitializeReserve>,
        args: InitializeReserveArgs,
    ) -> Result<()> {
        instructions::admin::initialize_reserve::handler(ctx, args)
    }

    /// Update a reserve's configuration
    pub fn update_reserve(ctx: Context<UpdateReserve>, args: UpdateReserveArgs) -> Result<()> {
        instructions::admin::update_reserve::handler(ctx, args)
    }

    /// Redeem accumulated platform fees from a reserve
    pub fn redeem_fees(ctx: Context<RedeemFees>) -> Result<()> {
        instructions::admin::redeem_fees::handler(ctx)
    }

    // ============================================================================
    // USER INSTRUCTIONS
    // ============================================================================

    /// Initialize a user's obligation account
    pub fn initialize_obligation(ctx: Context<InitializeObligation>) -> Result<()> {
        instructions::user::initialize_obligation::handler(ctx)
    }

    /// Deposit liquidity into a reserve for receipt tokens
    pub fn deposit_liquidity(ctx: Context<DepositLiquidity>, liquidity_amount: u64) -> Result<()> {
        instructions::user::deposit_liquidity::handler(ctx, liquidity_amount)
    }

    /// Redeem receipt tokens for underlying liquidity
    pub fn withdraw_liquidity(ctx: Context<WithdrawLiquidity>, receipt_amount: u64) -> Result<()> {
        instructions::user::withdraw_liquidity::handler(ctx, receipt_amount)
    }

    /// Deposit liquidity as collateral backing an obligation
    pub fn deposit_obligation_collateral(
        ctx: Context<DepositObligationCollateral>,
        liquidity_amount: u64,
    ) -> Result<()> {
        instructions::user::deposit_obligation_collateral::handler(ctx, liquidity_amount)
    }

    /// Withdraw collateral from an obligation
    pub fn withdraw_obligation_collateral(
        ctx: Context<WithdrawObligationCollateral>,
        receipt_amount: u64,
    ) -> Result<()> {
        instructions::user::withdraw_obligation_collateral::handler(ctx, receipt_amount)
    }

    /// Borrow liquidity against an obligation's collateral
    pub fn borrow_obligation_liquidity(
        ctx: Context<BorrowObligationLiquidity>,
        liquidity_amount: u64,
    ) -> Result<()> {
        instructions::user::borrow_obligation_liquidity::handler(ctx, liquidity_amount)
    }

    /// Repay borrowed liquidity
    pub fn repay_obligation_liquidity(
        ctx: Context<RepayObligationLiquidity>,
        liquidity_amount: u64,
    ) -> Result<()> {
        instructions::user::repay_obligation_liquidity::handler(ctx, liquidity_amount)
    }

    /// Draw a flash loan, repaid later in the same transaction
    pub fn flash_borrow(ctx: Context<FlashBorrow>, amount: u64) -> Result<()> {
        instructions::user::flash_borrow::handler(ctx, amount)
    }

    /// Repay a flash loan with its fee
    pub fn flash_repay(
        ctx: Context<FlashRepay>,
        amount: u64,
        borrow_instruction_index: u8,
    ) -> Result<()> {
        instructions::user::flash_repay::handler(ctx, amount, borrow_instruction_index)
    }

    // ============================================================================
    // PERMISSIONLESS INSTRUCTIONS
    // ============================================================================

    /// Refresh a reserve against a current price quote
    pub fn refresh_reserve(ctx: Context<RefreshReserve>, quote: PriceQuote) -> Result<()> {
        instructions::permissionless::refresh_reserve::handler(ctx, quote)
    }

    /// Refresh an obligation's valuations from its reserves
    pub fn refresh_obligation<'info>(
        ctx: Context<'_, '_, 'info, 'info, RefreshObligation<'info>>,
    ) -> Result<()> {
        instructions::permissionless::refresh_obligation::handler(ctx)
    }

    /// Liquidate part of an unhealthy obligation
    pub fn liquidate(ctx: Context<Liquidate>, repay_amount: u64) -> Result<()> {
        instructions::permissionless::liquidate::handler(ctx, repay_amount)
    }
}
