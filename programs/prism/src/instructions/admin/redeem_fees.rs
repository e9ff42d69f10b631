use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::{MARKET_SEED, RESERVE_SEED};
use crate::error::LendingError;
use crate::events::FeesRedeemed;
use crate::state::{validate_reserve_refreshed, Market, Reserve};

/// Accounts for redeeming accumulated platform fees
#[derive(Accounts)]
pub struct RedeemFees<'info> {
    /// Market authority receiving the fees
    pub authority: Signer<'info>,

    #[account(
        seeds = [MARKET_SEED, market.name.as_bytes()],
        bump = market.bump,
        has_one = authority @ LendingError::InvalidMarketAuthority,
    )]
    pub market: Account<'info, Market>,

    #[account(
        mut,
        seeds = [RESERVE_SEED, market.key().as_ref(), reserve.liquidity.mint.as_ref()],
        bump = reserve.bump,
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Vault holding the reserve's liquidity
    #[account(mut, address = reserve.vault)]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Authority's token account receiving the fees
    #[account(
        mut,
        constraint = authority_token_account.mint == reserve.liquidity.mint
            @ LendingError::InvalidReserve,
        constraint = authority_token_account.owner == authority.key()
            @ LendingError::InvalidAccountOwner,
    )]
    pub authority_token_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

/// Redeem platform fees accumulated by a reserve
///
/// Pays out the lesser of the accumulated fees and the reserve's available
/// liquidity. The remainder stays claimable for a later redeem.
pub fn handler(ctx: Context<RedeemFees>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let reserve = &mut ctx.accounts.reserve;

    validate_reserve_refreshed(reserve.last_update.is_stale(now)?)?;

    let redeemable_fees = reserve.liquidity.redeem_fees()?;
    require!(redeemable_fees > 0, LendingError::NoFeesAvailable);

    reserve.last_update.mark_stale();

    let market_key = ctx.accounts.market.key();
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
                to: ctx.accounts.authority_token_account.to_account_info(),
                authority: reserve.to_account_info(),
            },
            signer_seeds,
        ),
        redeemable_fees,
    )?;

    emit!(FeesRedeemed {
        reserve: reserve.key(),
        authority: ctx.accounts.authority.key(),
        amount: redeemable_fees,
    });

    msg!("Redeemed {} in platform fees", redeemable_fees);

    Ok(())
}
