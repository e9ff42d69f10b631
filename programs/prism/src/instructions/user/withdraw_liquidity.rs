use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::constants::RESERVE_SEED;
use crate::error::LendingError;
use crate::events::LiquidityWithdrawn;
use crate::state::{validate_reserve_refreshed, Reserve};

/// Accounts for withdrawing liquidity from a reserve
#[derive(Accounts)]
pub struct WithdrawLiquidity<'info> {
    /// Depositor redeeming their receipts
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [RESERVE_SEED, reserve.market.as_ref(), reserve.liquidity.mint.as_ref()],
        bump = reserve.bump,
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Vault paying out the withdrawn liquidity
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

/// Redeem receipt tokens for the underlying liquidity plus accrued interest
///
/// Underlying is paid out at the current exchange rate, rounding in the
/// pool's favor. Fails if the reserve's available liquidity cannot cover the
/// redemption.
pub fn handler(ctx: Context<WithdrawLiquidity>, receipt_amount: u64) -> Result<()> {
    require!(receipt_amount > 0, LendingError::InvalidAmount);

    let now = Clock::get()?.unix_timestamp;
    let reserve = &mut ctx.accounts.reserve;

    validate_reserve_refreshed(reserve.last_update.is_stale(now)?)?;

    require!(
        ctx.accounts.owner_receipt_account.amount >= receipt_amount,
        LendingError::InsufficientFunds
    );

    let liquidity_amount = reserve.liquidity.redeem_receipt(receipt_amount)?;
    reserve.last_update.mark_stale();

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.receipt_mint.to_account_info(),
                from: ctx.accounts.owner_receipt_account.to_account_info(),
                authority: ctx.accounts.owner.to_account_info(),
            },
        ),
        receipt_amount,
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

    emit!(LiquidityWithdrawn {
        reserve: reserve.key(),
        owner: ctx.accounts.owner.key(),
        liquidity_amount,
        receipt_amount,
    });

    msg!(
        "Withdrew {} liquidity for {} receipts",
        liquidity_amount,
        receipt_amount
    );

    Ok(())
}
