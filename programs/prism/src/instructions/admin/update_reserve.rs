use anchor_lang::prelude::*;

use crate::constants::{MARKET_SEED, RESERVE_SEED};
use crate::error::LendingError;
use crate::events::ReserveConfigUpdated;
use crate::state::{Market, Reserve};

/// Optional overrides for each configurable reserve parameter. `None` leaves
/// the current value in place.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default)]
pub struct UpdateReserveArgs {
    pub optimal_utilization_bps: Option<u16>,
    pub loan_to_value_bps: Option<u16>,
    pub liquidation_threshold_bps: Option<u16>,
    pub liquidation_bonus_bps: Option<u16>,
    pub liquidation_close_factor_bps: Option<u16>,
    pub min_borrow_rate_bps: Option<u16>,
    pub optimal_borrow_rate_bps: Option<u16>,
    pub max_borrow_rate_bps: Option<u16>,
    pub flash_loan_fee_bps: Option<u16>,
    pub platform_fee_bps: Option<u16>,
}

/// Accounts for updating a reserve's config
#[derive(Accounts)]
pub struct UpdateReserve<'info> {
    /// Market authority
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
}

/// Update a reserve's config
///
/// The merged config is validated as a whole, so a partial update cannot leave
/// the reserve with inconsistent parameters. The reserve is marked stale since
/// rate parameters may have changed under it.
pub fn handler(ctx: Context<UpdateReserve>, args: UpdateReserveArgs) -> Result<()> {
    let reserve = &mut ctx.accounts.reserve;
    let config = &mut reserve.config;

    if let Some(bps) = args.optimal_utilization_bps {
        config.optimal_utilization_bps = bps;
    }
    if let Some(bps) = args.loan_to_value_bps {
        config.loan_to_value_bps = bps;
    }
    if let Some(bps) = args.liquidation_threshold_bps {
        config.liquidation_threshold_bps = bps;
    }
    if let Some(bps) = args.liquidation_bonus_bps {
        config.liquidation_bonus_bps = bps;
    }
    if let Some(bps) = args.liquidation_close_factor_bps {
        config.liquidation_close_factor_bps = bps;
    }
    if let Some(bps) = args.min_borrow_rate_bps {
        config.min_borrow_rate_bps = bps;
    }
    if let Some(bps) = args.optimal_borrow_rate_bps {
        config.optimal_borrow_rate_bps = bps;
    }
    if let Some(bps) = args.max_borrow_rate_bps {
        config.max_borrow_rate_bps = bps;
    }
    if let Some(bps) = args.flash_loan_fee_bps {
        config.fees.flash_loan_fee_bps = bps;
    }
    if let Some(bps) = args.platform_fee_bps {
        config.fees.platform_fee_bps = bps;
    }

    reserve.config.validate()?;
    reserve.last_update.mark_stale();

    emit!(ReserveConfigUpdated {
        reserve: reserve.key(),
        loan_to_value_bps: reserve.config.loan_to_value_bps,
        liquidation_threshold_bps: reserve.config.liquidation_threshold_bps,
    });

    msg!("Reserve config updated");

    Ok(())
}
