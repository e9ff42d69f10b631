use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::RESERVE_SEED;
use crate::error::LendingError;
use crate::events::LiquidityRepaid;
use crate::state::{validate_reserve_refreshed, Obligation, Reserve};

/// Accounts for repaying borrowed liquidity
#[derive(Accounts)]
pub struct RepayObligationLiquidity<'info> {
    /// Obligation owner settling the debt
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [RESERVE_SEED, reserve.market.as_ref(), reserve.liquidity.mint.as_ref()],
        bump = reserve.bump,
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    #[account(
        mut,
        has_one = owner @ LendingError::InvalidObligationOwner,
        constraint = obligation.market == reserve.market
            @ LendingError::InvalidObligationMarket,
    )]
    pub obligation: Box<Account<'info, Obligation>>,

    /// Vault receiving the repayment
    #[account(mut, address = reserve.vault)]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Owner's liquidity token account funding the repayment
    #[account(
        mut,
        constraint = owner_token_account.mint == reserve.liquidity.mint
            @ LendingError::InvalidReserve,
        constraint = owner_token_account.owner == owner.key()
            @ LendingError::InvalidAccountOwner,
    )]
    pub owner_token_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

/// Repay borrowed liquidity against an obligation
///
/// The borrow entry is first brought up to the reserve's current cumulative
/// index so the repayment settles against accrued debt. `u64::MAX` repays the
/// full debt; any other amount must not exceed it. A fully repaid entry is
/// removed from the obligation.
pub fn handler(ctx: Context<RepayObligationLiquidity>, liquidity_amount: u64) -> Result<()> {
    require!(liquidity_amount > 0, LendingError::InvalidAmount);

    let now = Clock::get()?.unix_timestamp;
    let reserve = &mut ctx.accounts.reserve;
    let obligation = &mut ctx.accounts.obligation;

    validate_reserve_refreshed(reserve.last_update.is_stale(now)?)?;

    let (_, liquidity_index) = obligation.find_liquidity_in_borrows(reserve.key())?;
    let liquidity_entry = &mut obligation.borrows[liquidity_index];
    liquidity_entry.accrue_interest(reserve.liquidity.cumulative_borrow_index)?;

    let repay_amount =
        reserve.calculate_repay(liquidity_amount, liquidity_entry.borrowed_amount)?;
    require!(repay_amount > 0, LendingError::InvalidAmount);

    require!(
        ctx.accounts.owner_token_account.amount >= repay_amount,
        LendingError::InsufficientFunds
    );

    obligation.repay(repay_amount, liquidity_index)?;
    reserve.liquidity.repay_liquidity(repay_amount)?;

    let remaining_borrowed_amount = obligation
        .borrows
        .iter()
        .find(|liquidity| liquidity.reserve == reserve.key())
        .map(|liquidity| liquidity.borrowed_amount)
        .unwrap_or(0);

    reserve.last_update.mark_stale();
    obligation.last_update.mark_stale();

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.owner_token_account.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        ),
        repay_amount,
    )?;

    emit!(LiquidityRepaid {
        reserve: reserve.key(),
        obligation: obligation.key(),
        amount: repay_amount,
        remaining_borrowed_amount,
    });

    msg!("Repaid {} liquidity", repay_amount);

    Ok(())
}
