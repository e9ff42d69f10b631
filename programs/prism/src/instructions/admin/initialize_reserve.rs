use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::{
    MARKET_SEED, RECEIPT_MINT_SEED, RECEIPT_VAULT_SEED, RESERVE_SEED, VAULT_SEED,
};
use crate::error::LendingError;
use crate::events::ReserveInitialized;
use crate::state::{LastUpdate, Market, PriceQuote, Reserve, ReserveConfig, ReserveFees, ReserveLiquidity};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy)]
pub struct InitializeReserveArgs {
    pub optimal_utilization_bps: u16,
    pub loan_to_value_bps: u16,
    pub liquidation_threshold_bps: u16,
    pub liquidation_bonus_bps: u16,
    pub liquidation_close_factor_bps: u16,
    pub min_borrow_rate_bps: u16,
    pub optimal_borrow_rate_bps: u16,
    pub max_borrow_rate_bps: u16,
    pub flash_loan_fee_bps: u16,
    pub platform_fee_bps: u16,
    /// Initial price for the liquidity mint, so the reserve starts usable.
    pub initial_quote: PriceQuote,
}

/// Accounts for initializing a new reserve
#[derive(Accounts)]
pub struct InitializeReserve<'info> {
    /// Market authority adding the reserve
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The market the reserve belongs to
    #[account(
        seeds = [MARKET_SEED, market.name.as_bytes()],
        bump = market.bump,
        has_one = authority @ LendingError::InvalidMarketAuthority,
    )]
    pub market: Account<'info, Market>,

    /// The reserve account to initialize
    /// PDA: ["reserve", market, liquidity_mint]
    #[account(
        init,
        payer = authority,
        space = Reserve::DISCRIMINATOR.len() + Reserve::INIT_SPACE,
        seeds = [RESERVE_SEED, market.key().as_ref(), liquidity_mint.key().as_ref()],
        bump
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Mint of the liquidity supplied to and borrowed from the reserve
    pub liquidity_mint: Box<Account<'info, Mint>>,

    /// Receipt mint representing pool shares, controlled by the reserve
    /// PDA: ["receipt_mint", reserve]
    #[account(
        init,
        payer = authority,
        seeds = [RECEIPT_MINT_SEED, reserve.key().as_ref()],
        bump,
        mint::decimals = liquidity_mint.decimals,
        mint::authority = reserve,
    )]
    pub receipt_mint: Box<Account<'info, Mint>>,

    /// Vault holding the reserve's liquidity
    /// PDA: ["vault", reserve]
    #[account(
        init,
        payer = authority,
        seeds = [VAULT_SEED, reserve.key().as_ref()],
        bump,
        token::mint = liquidity_mint,
        token::authority = reserve,
    )]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Escrow holding receipt tokens posted as obligation collateral
    /// PDA: ["receipt_vault", reserve]
    #[account(
        init,
        payer = authority,
        seeds = [RECEIPT_VAULT_SEED, reserve.key().as_ref()],
        bump,
        token::mint = receipt_mint,
        token::authority = reserve,
    )]
    pub receipt_vault: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

/// Initialize a new reserve in a market
///
/// Only the market authority can add reserves. The config is validated up
/// front and the reserve is created fresh against the provided initial quote,
/// so deposits can follow immediately.
pub fn handler(ctx: Context<InitializeReserve>, args: InitializeReserveArgs) -> Result<()> {
    let config = ReserveConfig {
        optimal_utilization_bps: args.optimal_utilization_bps,
        loan_to_value_bps: args.loan_to_value_bps,
        liquidation_threshold_bps: args.liquidation_threshold_bps,
        liquidation_bonus_bps: args.liquidation_bonus_bps,
        liquidation_close_factor_bps: args.liquidation_close_factor_bps,
        min_borrow_rate_bps: args.min_borrow_rate_bps,
        optimal_borrow_rate_bps: args.optimal_borrow_rate_bps,
        max_borrow_rate_bps: args.max_borrow_rate_bps,
        fees: ReserveFees {
            flash_loan_fee_bps: args.flash_loan_fee_bps,
            platform_fee_bps: args.platform_fee_bps,
        },
    };
    config.validate()?;

    let now = Clock::get()?.unix_timestamp;
    let reserve = &mut ctx.accounts.reserve;

    reserve.market = ctx.accounts.market.key();
    reserve.last_update = LastUpdate::new(now);
    reserve.liquidity = ReserveLiquidity::new(
        ctx.accounts.liquidity_mint.key(),
        ctx.accounts.liquidity_mint.decimals,
    );
    reserve.config = config;
    reserve.vault = ctx.accounts.vault.key();
    reserve.receipt_mint = ctx.accounts.receipt_mint.key();
    reserve.receipt_vault = ctx.accounts.receipt_vault.key();
    reserve.bump = ctx.bumps.reserve;
    reserve.receipt_mint_bump = ctx.bumps.receipt_mint;

    reserve.refresh(&args.initial_quote, now)?;

    emit!(ReserveInitialized {
        market: ctx.accounts.market.key(),
        reserve: reserve.key(),
        liquidity_mint: ctx.accounts.liquidity_mint.key(),
        loan_to_value_bps: config.loan_to_value_bps,
        liquidation_threshold_bps: config.liquidation_threshold_bps,
    });

    msg!(
        "Reserve initialized for mint {}",
        ctx.accounts.liquidity_mint.key()
    );

    Ok(())
}
