use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::constants::RESERVE_SEED;
use crate::error::LendingError;
use crate::events::LiquidityDeposited;
use crate::state::{validate_reserve_refreshed, Reserve};

/// Accounts for depositing liquidity into a reserve
#[derive(Accounts)]
pub struct DepositLiquidity<'info> {
    /// Depositor supplying the liquidity
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [RESERVE_SEED, reserve.market.as_ref(), reserve.liquidity.mint.as_ref()],
        bump = reserve.bump,
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Vault receiving the deposited liquidity
    #[account(mut, address = reserve.vault)]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Receipt mint controlled by the reserve
    #[account(mut, address = reserve.receipt_mint)]
    pub receipt_mint: Box<Account<'info, Mint>>,

    /// Depositor's liquidity token account
    #[account(
        mut,
        constraint = owner_token_account.mint == reserve.liquidity.mint
            @ LendingError::InvalidReserve,
        constraint = owner_token_account.owner == owner.key()
            @ LendingError::InvalidAccountOwner,
    )]
    pub owner_token_account: Box<Account<'info, TokenAccount>>,

    /// Depositor's receipt token account
    #[account(
        mut,
        constraint = owner_receipt_account.mint == reserve.receipt_mint
            @ LendingError::InvalidReserve,
        constraint = owner_receipt_account.owner == owner.key()
            @ LendingError::InvalidAccountOwner,
    )]
    pub owner_receipt_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

/// Deposit liquidity into a reserve in exchange for receipt tokens
///
/// Receipts are minted at the current exchange rate, rounding the receipt
/// amount up. The first deposit into an empty pool mints one-to-one.
pub fn handler(ctx: Context<DepositLiquidity>, liquidity_amount: u64) -> Result<()> {
    require!(liquidity_amount > 0, LendingError::InvalidAmount);

    let now = Clock::get()?.unix_timestamp;
    let reserve = &mut ctx.accounts.reserve;

    validate_reserve_refreshed(reserve.last_update.is_stale(now)?)?;

    require!(
        ctx.accounts.owner_token_account.amount >= liquidity_amount,
        LendingError::InsufficientFunds
    );

    let receipt_amount = reserve.liquidity.deposit_liquidity(liquidity_amount)?;
    reserve.last_update.mark_stale();

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
                to: ctx.accounts.owner_receipt_account.to_account_info(),
                authority: reserve.to_account_info(),
            },
            signer_seeds,
        ),
        receipt_amount,
    )?;

    emit!(LiquidityDeposited {
        reserve: reserve.key(),
        owner: ctx.accounts.owner.key(),
        liquidity_amount,
        receipt_amount,
    });

    msg!(
        "Deposited {} liquidity for {} receipts",
        liquidity_amount,
        receipt_amount
    );

    Ok(())
}
