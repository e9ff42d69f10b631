use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::constants::RESERVE_SEED;
use crate::error::LendingError;
use crate::events::ObligationLiquidated;
use crate::state::{
    validate_obligation_refreshed, validate_reserve_refreshed, Obligation, Reserve,
};

/// Accounts for liquidating an unhealthy obligation
#[derive(Accounts)]
pub struct Liquidate<'info> {
    /// Liquidator repaying debt in exchange for discounted collateral
    pub liquidator: Signer<'info>,

    /// Reserve whose debt is being repaid
    #[account(
        mut,
        seeds = [RESERVE_SEED, repay_reserve.market.as_ref(), repay_reserve.liquidity.mint.as_ref()],
        bump = repay_reserve.bump,
    )]
    pub repay_reserve: Box<Account<'info, Reserve>>,

    /// Reserve whose collateral is being seized
    #[account(
        mut,
        seeds = [RESERVE_SEED, collateral_reserve.market.as_ref(), collateral_reserve.liquidity.mint.as_ref()],
        bump = collateral_reserve.bump,
        constraint = collateral_reserve.market == repay_reserve.market
            @ LendingError::InvalidObligationMarket,
    )]
    pub collateral_reserve: Box<Account<'info, Reserve>>,

    #[account(
        mut,
        constraint = obligation.market == repay_reserve.market
            @ LendingError::InvalidObligationMarket,
    )]
    pub obligation: Box<Account<'info, Obligation>>,

    /// Vault of the repay reserve receiving the repayment
    #[account(mut, address = repay_reserve.vault)]
    pub repay_vault: Box<Account<'info, TokenAccount>>,

    /// Vault of the collateral reserve paying out seized liquidity
    #[account(mut, address = collateral_reserve.vault)]
    pub collateral_vault: Box<Account<'info, TokenAccount>>,

    /// Receipt mint of the collateral reserve
    #[account(mut, address = collateral_reserve.receipt_mint)]
    pub collateral_receipt_mint: Box<Account<'info, Mint>>,

    /// Escrow holding the obligation's collateral receipts
    #[account(mut, address = collateral_reserve.receipt_vault)]
    pub collateral_receipt_vault: Box<Account<'info, TokenAccount>>,

    /// Liquidator's token account funding the repayment
    #[account(
        mut,
        constraint = liquidator_repay_account.mint == repay_reserve.liquidity.mint
            @ LendingError::InvalidReserve,
        constraint = liquidator_repay_account.owner == liquidator.key()
            @ LendingError::InvalidAccountOwner,
    )]
    pub liquidator_repay_account: Box<Account<'info, TokenAccount>>,

    /// Liquidator's token account receiving the seized collateral
    #[account(
        mut,
        constraint = liquidator_collateral_account.mint == collateral_reserve.liquidity.mint
            @ LendingError::InvalidReserve,
        constraint = liquidator_collateral_account.owner == liquidator.key()
            @ LendingError::InvalidAccountOwner,
    )]
    pub liquidator_collateral_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

/// Liquidate part of an unhealthy obligation
///
/// Repays debt up to the repay reserve's close factor and seizes
/// bonus-adjusted collateral in exchange, settling both legs at the last
/// refreshed valuations. Seized receipts are redeemed for underlying
/// liquidity and paid to the liquidator.
pub fn handler(ctx: Context<Liquidate>, repay_amount: u64) -> Result<()> {
    require!(repay_amount > 0, LendingError::InvalidAmount);

    let now = Clock::get()?.unix_timestamp;
    let repay_reserve = &mut ctx.accounts.repay_reserve;
    let collateral_reserve = &mut ctx.accounts.collateral_reserve;
    let obligation = &mut ctx.accounts.obligation;

    validate_reserve_refreshed(repay_reserve.last_update.is_stale(now)?)?;
    validate_reserve_refreshed(collateral_reserve.last_update.is_stale(now)?)?;
    validate_obligation_refreshed(obligation.last_update.is_stale(now)?)?;

    require!(
        obligation.is_liquidatable()?,
        LendingError::HealthyPosition
    );

    let (liquidity_entry, liquidity_index) =
        obligation.find_liquidity_in_borrows(repay_reserve.key())?;
    let liquidity_entry = *liquidity_entry;
    let (collateral_entry, collateral_index) =
        obligation.find_collateral_in_deposits(collateral_reserve.key())?;
    let collateral_entry = *collateral_entry;

    let (settle_amount, seize_receipt_amount) = collateral_reserve.calculate_liquidation(
        repay_amount,
        repay_reserve.config.liquidation_close_factor_bps,
        obligation,
        &liquidity_entry,
        &collateral_entry,
    )?;
    require!(
        settle_amount > 0 && seize_receipt_amount > 0,
        LendingError::InvalidAmount
    );

    require!(
        ctx.accounts.liquidator_repay_account.amount >= settle_amount,
        LendingError::InsufficientFunds
    );

    let seized_liquidity_amount = collateral_reserve
        .liquidity
        .redeem_receipt(seize_receipt_amount)?;

    obligation.repay(settle_amount, liquidity_index)?;
    obligation.withdraw(seize_receipt_amount, collateral_index)?;
    repay_reserve.liquidity.repay_liquidity(settle_amount)?;

    repay_reserve.last_update.mark_stale();
    collateral_reserve.last_update.mark_stale();
    obligation.last_update.mark_stale();

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.liquidator_repay_account.to_account_info(),
                to: ctx.accounts.repay_vault.to_account_info(),
                authority: ctx.accounts.liquidator.to_account_info(),
            },
        ),
        settle_amount,
    )?;

    let market_key = collateral_reserve.market;
    let mint_key = collateral_reserve.liquidity.mint;
    let seeds = &[
        RESERVE_SEED,
        market_key.as_ref(),
        mint_key.as_ref(),
        &[collateral_reserve.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    token::burn(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.collateral_receipt_mint.to_account_info(),
                from: ctx.accounts.collateral_receipt_vault.to_account_info(),
                authority: collateral_reserve.to_account_info(),
            },
            signer_seeds,
        ),
        seize_receipt_amount,
    )?;

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.collateral_vault.to_account_info(),
                to: ctx.accounts.liquidator_collateral_account.to_account_info(),
                authority: collateral_reserve.to_account_info(),
            },
            signer_seeds,
        ),
        seized_liquidity_amount,
    )?;

    emit!(ObligationLiquidated {
        obligation: obligation.key(),
        liquidator: ctx.accounts.liquidator.key(),
        repay_reserve: repay_reserve.key(),
        collateral_reserve: collateral_reserve.key(),
        repay_amount: settle_amount,
        seized_liquidity_amount,
        seized_receipt_amount: seize_receipt_amount,
    });

    msg!(
        "Liquidated: repaid {}, seized {} receipts",
        settle_amount,
        seize_receipt_amount
    );

    Ok(())
}
