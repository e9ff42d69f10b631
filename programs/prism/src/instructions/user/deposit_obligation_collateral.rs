use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::constants::RESERVE_SEED;
use crate::error::LendingError;
use crate::events::CollateralDeposited;
use crate::state::{validate_reserve_refreshed, Obligation, Reserve};

/// Accounts for depositing collateral into an obligation
#[derive(Accounts)]
pub struct DepositObligationCollateral<'info> {
    /// Obligation owner supplying the collateral
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

    /// Vault receiving the deposited liquidity
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

/// Deposit liquidity as collateral backing an obligation
///
/// The liquidity enters the pool like a plain deposit, but the minted
/// receipts go to the reserve's escrow and are recorded on the obligation
/// instead of being handed to the owner.
pub fn handler(ctx: Context<DepositObligationCollateral>, liquidity_amount: u64) -> Result<()> {
    require!(liquidity_amount > 0, LendingError::InvalidAmount);

    let now = Clock::get()?.unix_timestamp;
    let reserve = &mut ctx.accounts.reserve;
    let obligation = &mut ctx.accounts.obligation;

    validate_reserve_refreshed(reserve.last_update.is_stale(now)?)?;

    require!(
        ctx.accounts.owner_token_account.amount >= liquidity_amount,
        LendingError::InsufficientFunds
    );

    let receipt_amount = reserve.liquidity.deposit_liquidity(liquidity_amount)?;

    obligation
        .find_or_add_collateral_to_deposits(reserve.key())?
        .deposit(receipt_amount)?;

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
        liquidity_amount,
    )?;

    let market_key = reserve.market;
    let mint_key = reserve.liquidity.mint;
    let seeds = &[
        RESERVE_SEED,
        market_key.as_ref(),
        mint_key.as_ref(),
        &[reserve.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    token::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.receipt_mint.to_account_info(),
                to: ctx.accounts.receipt_vault.to_account_info(),
                authority: reserve.to_account_info(),
            },
            signer_seeds,
        ),
        receipt_amount,
    )?;

    emit!(CollateralDeposited {
        reserve: reserve.key(),
        obligation: obligation.key(),
        liquidity_amount,
        receipt_amount,
    });

    msg!("Deposited {} liquidity as collateral", liquidity_amount);

    Ok(())
}
