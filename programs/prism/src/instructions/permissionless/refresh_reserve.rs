use anchor_lang::prelude::*;

use crate::constants::RESERVE_SEED;
use crate::events::ReserveRefreshed;
use crate::state::{PriceQuote, Reserve};

/// Accounts for refreshing a reserve
#[derive(Accounts)]
pub struct RefreshReserve<'info> {
    #[account(
        mut,
        seeds = [RESERVE_SEED, reserve.market.as_ref(), reserve.liquidity.mint.as_ref()],
        bump = reserve.bump,
    )]
    pub reserve: Box<Account<'info, Reserve>>,
}

/// Refresh a reserve against a current price quote
///
/// Validates the quote, accrues interest since the last refresh, stores the
/// new price, and clears staleness. Permissionless: anyone holding a valid
/// quote can refresh.
pub fn handler(ctx: Context<RefreshReserve>, quote: PriceQuote) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let reserve = &mut ctx.accounts.reserve;

    reserve.refresh(&quote, now)?;

    emit!(ReserveRefreshed {
        reserve: reserve.key(),
        cumulative_borrow_index: reserve.liquidity.cumulative_borrow_index,
        market_price: reserve.liquidity.market_price,
        available_amount: reserve.liquidity.available_amount,
        borrowed_amount: reserve.liquidity.borrowed_amount,
        utilization_bps: reserve.utilization_bps()?,
        borrow_rate_bps: reserve.current_borrow_rate_bps()?,
        timestamp: now,
    });

    Ok(())
}
