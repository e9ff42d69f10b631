use anchor_lang::prelude::*;

use crate::constants::{MARKET_SEED, MAX_MARKET_NAME_LENGTH};
use crate::error::LendingError;
use crate::events::MarketInitialized;
use crate::state::Market;

/// Accounts for initializing a new market
#[derive(Accounts)]
#[instruction(name: String)]
pub struct InitializeMarket<'info> {
    /// Authority who will manage the market
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The market account to initialize
    /// PDA: ["market", name]
    #[account(
        init,
        payer = authority,
        space = Market::space(&name),
        seeds = [MARKET_SEED, name.as_bytes()],
        bump
    )]
    pub market: Account<'info, Market>,

    /// System program for account creation
    pub system_program: Program<'info, System>,
}

/// Initialize a new market
///
/// Creates the root registry that reserves and obligations anchor to. The
/// signer becomes the authority with rights to add reserves, update their
/// configs, and redeem platform fees.
pub fn handler(ctx: Context<InitializeMarket>, name: String) -> Result<()> {
    require!(
        name.len() <= MAX_MARKET_NAME_LENGTH,
        LendingError::NameTooLong
    );

    let market = &mut ctx.accounts.market;

    market.authority = ctx.accounts.authority.key();
    market.bump = ctx.bumps.market;
    market.name = name;

    emit!(MarketInitialized {
        market: market.key(),
        authority: market.authority,
        name: market.name.clone(),
    });

    msg!("Market initialized: {}", market.name);

    Ok(())
}
