use anchor_lang::prelude::*;

use crate::error::LendingError;
use crate::events::ObligationRefreshed;
use crate::math::{bps_of, SafeMathAssign};
use crate::state::{validate_reserve_refreshed, Obligation, Reserve};

/// Accounts for refreshing an obligation
///
/// Remaining accounts carry the reserve for every deposit entry followed by
/// the reserve for every borrow entry, in obligation order.
#[derive(Accounts)]
pub struct RefreshObligation<'info> {
    #[account(mut)]
    pub obligation: Box<Account<'info, Obligation>>,
}

/// Refresh an obligation's valuations from its refreshed reserves
///
/// Revalues every deposit at the current exchange rate and price, accrues
/// every borrow entry to its reserve's cumulative index, and recomputes the
/// obligation aggregates. All referenced reserves must themselves be fresh.
pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, RefreshObligation<'info>>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let obligation = &mut ctx.accounts.obligation;

    let mut deposited_value: u128 = 0;
    let mut borrowed_value: u128 = 0;
    let mut allowed_borrow_value: u128 = 0;
    let mut unhealthy_borrow_value: u128 = 0;

    let mut reserve_accounts = ctx.remaining_accounts.iter();

    for collateral in obligation.deposits.iter_mut() {
        let reserve_info = reserve_accounts
            .next()
            .ok_or(LendingError::InvalidReserve)?;

        require!(
            reserve_info.owner == &crate::ID,
            LendingError::InvalidAccountOwner
        );
        require!(
            reserve_info.key() == collateral.reserve,
            LendingError::InvalidReserve
        );

        let reserve = Account::<Reserve>::try_from(reserve_info)?;
        validate_reserve_refreshed(reserve.last_update.is_stale(now)?)?;

        let liquidity_amount = reserve
            .liquidity
            .receipt_to_liquidity(collateral.deposited_amount)?;
        collateral.market_value = reserve.liquidity.market_value(liquidity_amount)?;

        deposited_value.safe_add_assign(collateral.market_value)?;
        allowed_borrow_value
            .safe_add_assign(bps_of(collateral.market_value, reserve.config.loan_to_value_bps)?)?;
        unhealthy_borrow_value.safe_add_assign(bps_of(
            collateral.market_value,
            reserve.config.liquidation_threshold_bps,
        )?)?;
    }

    for liquidity in obligation.borrows.iter_mut() {
        let reserve_info = reserve_accounts
            .next()
            .ok_or(LendingError::InvalidReserve)?;

        require!(
            reserve_info.owner == &crate::ID,
            LendingError::InvalidAccountOwner
        );
        require!(
            reserve_info.key() == liquidity.reserve,
            LendingError::InvalidReserve
        );

        let reserve = Account::<Reserve>::try_from(reserve_info)?;
        validate_reserve_refreshed(reserve.last_update.is_stale(now)?)?;

        liquidity.accrue_interest(reserve.liquidity.cumulative_borrow_index)?;
        liquidity.market_value = reserve.liquidity.market_value(liquidity.borrowed_amount)?;

        borrowed_value.safe_add_assign(liquidity.market_value)?;
    }

    require!(
        reserve_accounts.next().is_none(),
        LendingError::TooManyAccounts
    );

    obligation.deposited_value = deposited_value;
    obligation.borrowed_value = borrowed_value;
    obligation.allowed_borrow_value = allowed_borrow_value;
    obligation.unhealthy_borrow_value = unhealthy_borrow_value;
    obligation.last_update.update(now);

    emit!(ObligationRefreshed {
        obligation: obligation.key(),
        deposited_value,
        borrowed_value,
        allowed_borrow_value,
        unhealthy_borrow_value,
        health_factor_bps: obligation.health_factor_bps()?,
        timestamp: now,
    });

    Ok(())
}
