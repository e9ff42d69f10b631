use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::RESERVE_SEED;
use crate::error::LendingError;
use crate::events::LiquidityBorrowed;
use crate::state::{
    validate_obligation_refreshed, validate_reserve_refreshed, Obligation, Reserve,
};

/// Accounts for borrowing liquidity against an obligation
#[derive(Accounts)]
pub struct BorrowObligationLiquidity<'info> {
    /// Obligation owner taking the loan
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

    /// Vault paying out the borrowed liquidity
    #[account(mut, address = reserve.vault)]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Owner's liquidity token account receiving the loan
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

/// Borrow liquidity against an obligation's collateral
///
/// `u64::MAX` borrows up to the obligation's remaining LTV-weighted capacity,
/// capped by the reserve's available liquidity. Any other amount must fit
/// within that capacity or the borrow fails.
pub fn handler(ctx: Context<BorrowObligationLiquidity>, liquidity_amount: u64) -> Result<()> {
    require!(liquidity_amount > 0, LendingError::InvalidAmount);

    let now = Clock::get()?.unix_timestamp;
    let reserve = &mut ctx.accounts.reserve;
    let obligation = &mut ctx.accounts.obligation;

    validate_reserve_refreshed(reserve.last_update.is_stale(now)?)?;
    validate_obligation_refreshed(obligation.last_update.is_stale(now)?)?;

    require!(
        !obligation.deposits.is_empty(),
        LendingError::ObligationDepositsEmpty
    );
    require!(
        obligation.deposited_value > 0,
        LendingError::InsufficientCollateral
    );

    let borrow_amount =
        reserve.calculate_borrow(liquidity_amount, obligation.remaining_borrow_value())?;
    require!(borrow_amount > 0, LendingError::InvalidAmount);

    let cumulative_borrow_index = reserve.liquidity.cumulative_borrow_index;
    let liquidity_entry =
        obligation.find_or_add_liquidity_to_borrows(reserve.key(), cumulative_borrow_index)?;
    liquidity_entry.accrue_interest(cumulative_borrow_index)?;
    liquidity_entry.borrow(borrow_amount)?;
    let new_borrowed_amount = liquidity_entry.borrowed_amount;

    reserve.liquidity.borrow_liquidity(borrow_amount)?;

    reserve.last_update.mark_stale();
    obligation.last_update.mark_stale();

    let market_key = reserve.market;
    let mint_key = reserve.liquidity.mint;
    let seeds = &[
        RESERVE_SEED,
        market_key.as_ref(),
        mint_key.as_ref(),
        &[reserve.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.vault.to_account_info(),
                to: ctx.accounts.owner_token_account.to_account_info(),
                authority: reserve.to_account_info(),
            },
            signer_seeds,
        ),
        borrow_amount,
    )?;

    emit!(LiquidityBorrowed {
        reserve: reserve.key(),
        obligation: obligation.key(),
        amount: borrow_amount,
        new_borrowed_amount,
    });

    msg!("Borrowed {} liquidity", borrow_amount);

    Ok(())
}
