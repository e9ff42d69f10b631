use anchor_lang::prelude::Pubkey;

use prism::error::LendingError;
use prism::math::bps_of;
use prism::state::{
    validate_obligation_refreshed, validate_reserve_refreshed, LastUpdate, Obligation, PriceQuote,
    Reserve, ReserveConfig, ReserveFees, ReserveLiquidity,
};
use prism::{INDEX_ONE, PRICE_SCALE, SECONDS_PER_YEAR};

const DECIMALS: u8 = 6;
const ONE_TOKEN: u64 = 1_000_000;

fn test_config() -> ReserveConfig {
    ReserveConfig {
        optimal_utilization_bps: 8_000,
        loan_to_value_bps: 8_000,
        liquidation_threshold_bps: 8_500,
        liquidation_bonus_bps: 500,
        liquidation_close_factor_bps: 5_000,
        min_borrow_rate_bps: 0,
        optimal_borrow_rate_bps: 1_000,
        max_borrow_rate_bps: 10_000,
        fees: ReserveFees {
            flash_loan_fee_bps: 30,
            platform_fee_bps: 1_000,
        },
    }
}

/// A reserve refreshed at t=0 with the liquidity mint priced at 1 USD.
fn test_reserve() -> Reserve {
    let mut reserve = Reserve {
        market: Pubkey::new_unique(),
        last_update: LastUpdate::new(0),
        liquidity: ReserveLiquidity::new(Pubkey::new_unique(), DECIMALS),
        config: test_config(),
        vault: Pubkey::new_unique(),
        receipt_mint: Pubkey::new_unique(),
        receipt_vault: Pubkey::new_unique(),
        bump: 255,
        receipt_mint_bump: 255,
    };
    reserve.liquidity.market_price = PRICE_SCALE;
    reserve.last_update.update(0);
    reserve
}

fn test_obligation(market: Pubkey) -> Obligation {
    Obligation::new(market, Pubkey::new_unique(), LastUpdate::new(0), 255)
}

/// Mimics refresh_obligation: revalue entries and recompute the aggregates
/// against the given reserves.
fn refresh_obligation(obligation: &mut Obligation, reserves: &[&Reserve], now: i64) {
    let mut deposited_value = 0u128;
    let mut borrowed_value = 0u128;
    let mut allowed_borrow_value = 0u128;
    let mut unhealthy_borrow_value = 0u128;

    for collateral in obligation.deposits.iter_mut() {
        let reserve = reserves
            .iter()
            .find(|reserve| collateral.reserve == reserve.vault)
            .unwrap();
        let liquidity_amount = reserve
            .liquidity
            .receipt_to_liquidity(collateral.deposited_amount)
            .unwrap();
        collateral.market_value = reserve.liquidity.market_value(liquidity_amount).unwrap();

        deposited_value += collateral.market_value;
        allowed_borrow_value +=
            bps_of(collateral.market_value, reserve.config.loan_to_value_bps).unwrap();
        unhealthy_borrow_value += bps_of(
            collateral.market_value,
            reserve.config.liquidation_threshold_bps,
        )
        .unwrap();
    }

    for liquidity in obligation.borrows.iter_mut() {
        let reserve = reserves
            .iter()
            .find(|reserve| liquidity.reserve == reserve.vault)
            .unwrap();
        liquidity
            .accrue_interest(reserve.liquidity.cumulative_borrow_index)
            .unwrap();
        liquidity.market_value = reserve
            .liquidity
            .market_value(liquidity.borrowed_amount)
            .unwrap();

        borrowed_value += liquidity.market_value;
    }

    obligation.deposited_value = deposited_value;
    obligation.borrowed_value = borrowed_value;
    obligation.allowed_borrow_value = allowed_borrow_value;
    obligation.unhealthy_borrow_value = unhealthy_borrow_value;
    obligation.last_update.update(now);
}

// uses the vault key as the reserve identity inside entries, so the helper
// above can find reserves without real PDAs
fn reserve_key(reserve: &Reserve) -> Pubkey {
    reserve.vault
}

#[test]
fn borrow_is_capped_at_loan_to_value() {
    let mut reserve = test_reserve();
    let mut obligation = test_obligation(reserve.market);

    // supply pool liquidity, then post 500 tokens (worth $500) as collateral
    reserve.liquidity.deposit_liquidity(2_000 * ONE_TOKEN).unwrap();
    let receipts = reserve.liquidity.deposit_liquidity(500 * ONE_TOKEN).unwrap();
    obligation
        .find_or_add_collateral_to_deposits(reserve_key(&reserve))
        .unwrap()
        .deposit(receipts)
        .unwrap();

    refresh_obligation(&mut obligation, &[&reserve], 0);
    assert_eq!(obligation.deposited_value, 500 * PRICE_SCALE);
    assert_eq!(obligation.allowed_borrow_value, 400 * PRICE_SCALE);

    // one past 80% of the collateral value must fail
    let err = reserve
        .calculate_borrow(400 * ONE_TOKEN + 1, obligation.remaining_borrow_value())
        .unwrap_err();
    assert_eq!(err, LendingError::ExceededLTV.into());

    // exactly 80% passes
    let amount = reserve
        .calculate_borrow(400 * ONE_TOKEN, obligation.remaining_borrow_value())
        .unwrap();
    assert_eq!(amount, 400 * ONE_TOKEN);

    // sentinel resolves to the remaining capacity
    let max_amount = reserve
        .calculate_borrow(u64::MAX, obligation.remaining_borrow_value())
        .unwrap();
    assert_eq!(max_amount, 400 * ONE_TOKEN);
}

#[test]
fn borrow_accrue_and_full_repay_clears_the_entry() {
    let mut reserve = test_reserve();
    let mut obligation = test_obligation(reserve.market);

    reserve.liquidity.deposit_liquidity(1_000 * ONE_TOKEN).unwrap();
    let receipts = reserve.liquidity.deposit_liquidity(500 * ONE_TOKEN).unwrap();
    obligation
        .find_or_add_collateral_to_deposits(reserve_key(&reserve))
        .unwrap()
        .deposit(receipts)
        .unwrap();
    refresh_obligation(&mut obligation, &[&reserve], 0);

    let borrow_amount = 300 * ONE_TOKEN;
    obligation
        .find_or_add_liquidity_to_borrows(
            reserve_key(&reserve),
            reserve.liquidity.cumulative_borrow_index,
        )
        .unwrap()
        .borrow(borrow_amount)
        .unwrap();
    reserve.liquidity.borrow_liquidity(borrow_amount).unwrap();

    // a year passes before the next refresh
    let now = SECONDS_PER_YEAR as i64;
    let quote = PriceQuote {
        price: 1,
        confidence: 0,
        exponent: 0,
        publish_time: now,
    };
    reserve.refresh(&quote, now).unwrap();
    assert!(reserve.liquidity.cumulative_borrow_index > INDEX_ONE);
    assert!(reserve.liquidity.borrowed_amount > borrow_amount);
    assert!(reserve.liquidity.accumulated_platform_fees > 0);

    refresh_obligation(&mut obligation, &[&reserve], now);
    let debt = obligation.borrows[0].borrowed_amount;
    assert!(debt > borrow_amount);

    // partial repays above the debt are rejected
    let err = reserve.calculate_repay(debt + 1, debt).unwrap_err();
    assert_eq!(err, LendingError::ExceededBorrowedAmount.into());

    // the sentinel settles the full accrued debt and drops the entry
    let repay_amount = reserve.calculate_repay(u64::MAX, debt).unwrap();
    assert_eq!(repay_amount, debt);
    obligation.repay(repay_amount, 0).unwrap();
    assert!(obligation.borrows.is_empty());
}

#[test]
fn lender_redeems_more_after_interest_accrues() {
    let mut reserve = test_reserve();

    let receipts = reserve.liquidity.deposit_liquidity(1_000 * ONE_TOKEN).unwrap();
    reserve.liquidity.borrow_liquidity(800 * ONE_TOKEN).unwrap();

    let now = SECONDS_PER_YEAR as i64;
    let quote = PriceQuote {
        price: 1,
        confidence: 0,
        exponent: 0,
        publish_time: now,
    };
    reserve.refresh(&quote, now).unwrap();

    // simulate the borrower settling in full, restoring available liquidity
    let debt = reserve.liquidity.borrowed_amount;
    reserve.liquidity.repay_liquidity(debt).unwrap();

    let redeemed = reserve.liquidity.redeem_receipt(receipts).unwrap();
    assert!(redeemed > 1_000 * ONE_TOKEN);
}

#[test]
fn zero_amount_operations_are_rejected() {
    let mut reserve = test_reserve();
    reserve.liquidity.deposit_liquidity(1_000 * ONE_TOKEN).unwrap();

    let err = reserve.liquidity.borrow_liquidity(0).unwrap_err();
    assert_eq!(err, LendingError::InvalidAmount.into());

    let err = reserve.liquidity.redeem_receipt(0).unwrap_err();
    assert_eq!(err, LendingError::InvalidAmount.into());

    let err = reserve.liquidity.deposit_liquidity(0).unwrap_err();
    assert_eq!(err, LendingError::InvalidAmount.into());
}

#[test]
fn collateral_withdrawal_is_gated_by_outstanding_debt() {
    let mut reserve = test_reserve();
    let mut obligation = test_obligation(reserve.market);

    reserve.liquidity.deposit_liquidity(1_000 * ONE_TOKEN).unwrap();
    let receipts = reserve.liquidity.deposit_liquidity(500 * ONE_TOKEN).unwrap();
    obligation
        .find_or_add_collateral_to_deposits(reserve_key(&reserve))
        .unwrap()
        .deposit(receipts)
        .unwrap();

    obligation
        .find_or_add_liquidity_to_borrows(reserve_key(&reserve), INDEX_ONE)
        .unwrap()
        .borrow(300 * ONE_TOKEN)
        .unwrap();
    reserve.liquidity.borrow_liquidity(300 * ONE_TOKEN).unwrap();
    refresh_obligation(&mut obligation, &[&reserve], 0);

    let collateral = obligation.deposits[0];

    // more than the deposited entry cannot come out
    let err = collateral.resolve_withdraw_amount(receipts + 1).unwrap_err();
    assert_eq!(err, LendingError::InsufficientFunds.into());

    // $500 collateral backing $300 of debt at an 85% threshold: roughly $147
    // of collateral value may leave before the debt is uncovered
    assert!(obligation
        .validate_collateral_withdrawal(
            &collateral,
            147 * ONE_TOKEN,
            reserve.config.liquidation_threshold_bps,
        )
        .is_ok());

    let err = obligation
        .validate_collateral_withdrawal(
            &collateral,
            148 * ONE_TOKEN,
            reserve.config.liquidation_threshold_bps,
        )
        .unwrap_err();
    assert_eq!(err, LendingError::ExceededLTV.into());
}

#[test]
fn liquidation_respects_close_factor_and_bonus() {
    let mut collateral_reserve = test_reserve();
    let repay_reserve = test_reserve();
    let mut obligation = test_obligation(collateral_reserve.market);

    let receipts = collateral_reserve
        .liquidity
        .deposit_liquidity(1_000 * ONE_TOKEN)
        .unwrap();
    obligation
        .find_or_add_collateral_to_deposits(reserve_key(&collateral_reserve))
        .unwrap()
        .deposit(receipts)
        .unwrap();
    obligation
        .find_or_add_liquidity_to_borrows(reserve_key(&repay_reserve), INDEX_ONE)
        .unwrap()
        .borrow(900 * ONE_TOKEN)
        .unwrap();
    refresh_obligation(&mut obligation, &[&collateral_reserve, &repay_reserve], 0);

    // $900 debt against $1000 collateral at an 85% threshold is unhealthy
    assert!(obligation.is_liquidatable().unwrap());
    let health_before = obligation.health_factor_bps().unwrap().unwrap();

    let (repay_amount, seize_receipt_amount) = collateral_reserve
        .calculate_liquidation(
            u64::MAX,
            repay_reserve.config.liquidation_close_factor_bps,
            &obligation,
            &obligation.borrows[0].clone(),
            &obligation.deposits[0].clone(),
        )
        .unwrap();

    // close factor caps the repay at half the debt
    assert_eq!(repay_amount, 450 * ONE_TOKEN);
    // seizure carries the 5% bonus
    assert_eq!(seize_receipt_amount, 472 * ONE_TOKEN + ONE_TOKEN / 2);

    // settle the liquidation and confirm health moved in the right direction
    obligation.repay(repay_amount, 0).unwrap();
    obligation.withdraw(seize_receipt_amount, 0).unwrap();
    refresh_obligation(&mut obligation, &[&collateral_reserve, &repay_reserve], 0);
    let health_after = obligation.health_factor_bps().unwrap().unwrap();
    assert!(health_after > health_before);
}

#[test]
fn liquidation_scales_repay_down_when_collateral_runs_out() {
    let mut collateral_reserve = test_reserve();
    let repay_reserve = test_reserve();
    let mut obligation = test_obligation(collateral_reserve.market);

    // only $300 of collateral against $900 of debt
    let receipts = collateral_reserve
        .liquidity
        .deposit_liquidity(300 * ONE_TOKEN)
        .unwrap();
    obligation
        .find_or_add_collateral_to_deposits(reserve_key(&collateral_reserve))
        .unwrap()
        .deposit(receipts)
        .unwrap();
    obligation
        .find_or_add_liquidity_to_borrows(reserve_key(&repay_reserve), INDEX_ONE)
        .unwrap()
        .borrow(900 * ONE_TOKEN)
        .unwrap();
    refresh_obligation(&mut obligation, &[&collateral_reserve, &repay_reserve], 0);
    assert!(obligation.is_liquidatable().unwrap());

    let (repay_amount, seize_receipt_amount) = collateral_reserve
        .calculate_liquidation(
            u64::MAX,
            repay_reserve.config.liquidation_close_factor_bps,
            &obligation,
            &obligation.borrows[0].clone(),
            &obligation.deposits[0].clone(),
        )
        .unwrap();

    // the whole deposit is seized; the repay shrinks in proportion so the
    // liquidator still earns the bonus, rounding against them
    assert_eq!(seize_receipt_amount, 300 * ONE_TOKEN);
    assert_eq!(repay_amount, 285_714_286);
}

#[test]
fn flash_loan_fee_lands_in_pool_with_platform_cut() {
    let mut reserve = test_reserve();
    reserve.liquidity.deposit_liquidity(10_000 * ONE_TOKEN).unwrap();

    let amount = 1_000 * ONE_TOKEN;
    let (total_fee, platform_fee) = reserve
        .config
        .fees
        .calculate_flash_loan_fee(amount)
        .unwrap();
    assert_eq!(total_fee, 3 * ONE_TOKEN); // 30 bps
    assert_eq!(platform_fee, 3 * ONE_TOKEN / 10); // 10% of the fee

    // borrow then repay within the same transaction
    reserve.liquidity.borrow_liquidity(amount).unwrap();
    reserve.liquidity.repay_liquidity(amount).unwrap();
    reserve.liquidity.available_amount += total_fee;
    reserve.liquidity.accumulated_platform_fees += platform_fee;

    assert_eq!(
        reserve.liquidity.available_amount,
        10_000 * ONE_TOKEN + total_fee
    );

    let redeemed = reserve.liquidity.redeem_fees().unwrap();
    assert_eq!(redeemed, platform_fee);
    assert_eq!(reserve.liquidity.accumulated_platform_fees, 0);
}

#[test]
fn mutations_require_a_refresh_in_the_same_second() {
    let mut reserve = test_reserve();
    assert!(validate_reserve_refreshed(reserve.last_update.is_stale(0).unwrap()).is_ok());

    // a mutation marks the reserve stale until the next refresh
    reserve.last_update.mark_stale();
    let err =
        validate_reserve_refreshed(reserve.last_update.is_stale(0).unwrap()).unwrap_err();
    assert_eq!(err, LendingError::ReserveStale.into());

    let quote = PriceQuote {
        price: 1,
        confidence: 0,
        exponent: 0,
        publish_time: 5,
    };
    reserve.refresh(&quote, 5).unwrap();
    assert!(validate_reserve_refreshed(reserve.last_update.is_stale(5).unwrap()).is_ok());

    // and time alone is enough to go stale again
    let err =
        validate_reserve_refreshed(reserve.last_update.is_stale(6).unwrap()).unwrap_err();
    assert_eq!(err, LendingError::ReserveStale.into());

    let mut obligation = test_obligation(reserve.market);
    let err =
        validate_obligation_refreshed(obligation.last_update.is_stale(0).unwrap()).unwrap_err();
    assert_eq!(err, LendingError::ObligationStale.into());

    obligation.last_update.update(0);
    assert!(validate_obligation_refreshed(obligation.last_update.is_stale(0).unwrap()).is_ok());
}
