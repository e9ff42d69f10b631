use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::constants::RESERVE_SEED;
use crate::error::LendingError;
use crate::events::CollateralWithdrawn;
use crate::state::{
    validate_obligation_refreshed, validate_reserve_refreshed, Obligation, Reserve,
};

/// Accounts for withdrawing collateral from an obligation
#[derive(Accounts)]
pub struct WithdrawObligationCollateral<'info> {
    /// Obligation owner reclaiming collateral
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

    /// Vault paying out the withdrawn liquidity
    #[account(mut, address = reserve.vault)]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Receipt mint controlled by the reserve
    #[account(mut, address = reserve.receipt_mint)]
    pub receipt_mint: Box<Account<'info, Mint>>,

    /// Escrow holding receipts posted as collateral
    #[account(mut, address = reserve.receipt_vault)]
    pub receipt_vault: Box<Account<'info, TokenAccount>>,

    /// Owner's liquidity token account
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

/// Withdraw collateral from an obligation back into underlying liquidity
///
/// `u64::MAX` withdraws the whole deposit entry. When the obligation carries
/// debt, the withdrawal only proceeds if the remaining collateral keeps the
/// position above its liquidation threshold.
pub fn handler(ctx: Context<WithdrawObligationCollateral>, receipt_amount: u64) -> Result<()> {
    require!(receipt_amount > 0, LendingError::InvalidAmount);

    let now = Clock::get()?.unix_timestamp;
    let reserve = &mut ctx.accounts.reserve;
    let obligation = &mut ctx.accounts.obligation;

    validate_reserve_refreshed(reserve.last_update.is_stale(now)?)?;
    validate_obligation_refreshed(obligation.last_update.is_stale(now)?)?;

    let (collateral, collateral_index) = obligation.find_collateral_in_deposits(reserve.key())?;
    let collateral = *collateral;

    let receipt_amount = collateral.resolve_withdraw_amount(receipt_amount)?;
    obligation.validate_collateral_withdrawal(
        &collateral,
        receipt_amount,
        reserve.config.liquidation_threshold_bps,
    )?;

    let liquidity_amount = reserve.liquidity.redeem_receipt(receipt_amount)?;
    obligation.withdraw(receipt_amount, collateral_index)?;

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

    token::burn(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.receipt_mint.to_account_info(),
                from: ctx.accounts.receipt_vault.to_account_info(),
                authority: reserve.to_account_info(),
            },
            signer_seeds,
        ),
        receipt_amount,
    )?;

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
        liquidity_amount,
    )?;

    emit!(CollateralWithdrawn {
        reserve: reserve.key(),
        obligation: obligation.key(),
        liquidity_amount,
        receipt_amount,
    });

    msg!("Withdrew {} collateral receipts", receipt_amount);

    Ok(())
}
