use anchor_lang::prelude::*;

use crate::constants::{MARKET_SEED, OBLIGATION_SEED};
use crate::events::ObligationInitialized;
use crate::state::{LastUpdate, Market, Obligation};

/// Accounts for initializing a new obligation
#[derive(Accounts)]
pub struct InitializeObligation<'info> {
    /// Owner of the obligation
    #[account(mut)]
    pub owner: Signer<'info>,

    /// The market the obligation belongs to
    #[account(seeds = [MARKET_SEED, market.name.as_bytes()], bump = market.bump)]
    pub market: Account<'info, Market>,

    /// The obligation account to initialize
    /// PDA: ["obligation", market, owner]
    #[account(
        init,
        payer = owner,
        space = Obligation::DISCRIMINATOR.len() + Obligation::INIT_SPACE,
        seeds = [OBLIGATION_SEED, market.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub obligation: Box<Account<'info, Obligation>>,

    pub system_program: Program<'info, System>,
}

/// Initialize an empty obligation for the signer in a market
pub fn handler(ctx: Context<InitializeObligation>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;

    ctx.accounts.obligation.set_inner(Obligation::new(
        ctx.accounts.market.key(),
        ctx.accounts.owner.key(),
        LastUpdate::new(now),
        ctx.bumps.obligation,
    ));

    emit!(ObligationInitialized {
        market: ctx.accounts.market.key(),
        obligation: ctx.accounts.obligation.key(),
        owner: ctx.accounts.owner.key(),
    });

    msg!("Obligation initialized for {}", ctx.accounts.owner.key());

    Ok(())
}
