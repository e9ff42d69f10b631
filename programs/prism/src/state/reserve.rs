use std::cmp::Ordering;

use anchor_lang::prelude::*;

use crate::{
    error::LendingError,
    math::{bps_of_ceil, mul_div, mul_div_ceil, pow10, to_u64, SafeMath, SafeMathAssign},
    state::{LastUpdate, Obligation, ObligationCollateral, ObligationLiquidity, PriceQuote},
    INDEX_ONE, MAX_BASIS_POINTS, SECONDS_PER_YEAR,
};

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Default)]
pub struct ReserveFees {
    /// Flat percentage fee taken from flash loaned amounts, in basis points.
    pub flash_loan_fee_bps: u16,
    /// Portion of borrow interest and flash loan fees that accrues to the
    /// market authority before distribution to lenders, in basis points.
    pub platform_fee_bps: u16,
}

impl ReserveFees {
    /// Returns the total flash loan fee owed on top of the principal and the
    /// portion of it redeemable by the market authority.
    pub fn calculate_flash_loan_fee(&self, amount: u64) -> Result<(u64, u64)> {
        let total_fee = to_u64(bps_of_ceil(amount as u128, self.flash_loan_fee_bps)?)?;
        let platform_fee = to_u64(bps_of_ceil(total_fee as u128, self.platform_fee_bps)?)?;

        Ok((total_fee, platform_fee))
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Default)]
pub struct ReserveConfig {
    /// Optimal utilization rate, in basis points.
    pub optimal_utilization_bps: u16,
    /// Target ratio of the value of borrows to deposits, in basis points.
    pub loan_to_value_bps: u16,
    /// Loan to value ratio at which an obligation can be liquidated, in basis points.
    pub liquidation_threshold_bps: u16,
    /// Bonus a liquidator gets when repaying part of an unhealthy obligation, in basis points.
    pub liquidation_bonus_bps: u16,
    /// Max portion of an obligation's debt that can be liquidated at once, in basis points.
    pub liquidation_close_factor_bps: u16,
    /// Min borrow APY, in basis points.
    pub min_borrow_rate_bps: u16,
    /// Borrow APY at optimal utilization, in basis points.
    pub optimal_borrow_rate_bps: u16,
    /// Max borrow APY, in basis points.
    pub max_borrow_rate_bps: u16,
    /// Program owner fees assessed, separate from gains due to interest accrual.
    pub fees: ReserveFees,
}

impl ReserveConfig {
    pub fn validate(&self) -> Result<()> {
        let bps_fields = [
            self.optimal_utilization_bps,
            self.loan_to_value_bps,
            self.liquidation_threshold_bps,
            self.liquidation_bonus_bps,
            self.liquidation_close_factor_bps,
            self.min_borrow_rate_bps,
            self.optimal_borrow_rate_bps,
            self.max_borrow_rate_bps,
            self.fees.flash_loan_fee_bps,
            self.fees.platform_fee_bps,
        ];

        require!(
            bps_fields
                .iter()
                .all(|&bps| bps as u64 <= MAX_BASIS_POINTS),
            LendingError::InvalidConfig
        );

        require!(
            self.min_borrow_rate_bps <= self.optimal_borrow_rate_bps
                && self.optimal_borrow_rate_bps <= self.max_borrow_rate_bps,
            LendingError::InvalidConfig
        );

        require!(
            self.loan_to_value_bps <= self.liquidation_threshold_bps,
            LendingError::InvalidConfig
        );

        Ok(())
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy)]
pub struct ReserveLiquidity {
    /// Mint of the liquidity token.
    pub mint: Pubkey,
    /// Decimals of the liquidity mint, cached for valuation.
    pub mint_decimals: u8,
    /// Total liquidity available for borrowing.
    ///
    /// Increases with deposits and repayments, decreases with withdrawals and borrows.
    pub available_amount: u64,
    /// Total liquidity borrowed. Inflated by interest accrual, never by token movement.
    pub borrowed_amount: u64,
    /// Index tracking cumulative borrow interest, scaled by 1e18.
    pub cumulative_borrow_index: u128,
    /// Supply of receipt tokens minted against this pool.
    pub receipt_supply: u64,
    /// Claimable fees accumulated to the market authority, carried inside
    /// `available_amount` until redeemed.
    pub accumulated_platform_fees: u64,
    /// Last refreshed price of the liquidity mint, USD scaled by 1e9.
    pub market_price: u128,
}

impl ReserveLiquidity {
    pub fn new(mint: Pubkey, mint_decimals: u8) -> Self {
        Self {
            mint,
            mint_decimals,
            available_amount: 0,
            borrowed_amount: 0,
            cumulative_borrow_index: INDEX_ONE,
            receipt_supply: 0,
            accumulated_platform_fees: 0,
            market_price: 0,
        }
    }

    pub fn total_supply(&self) -> Result<u64> {
        self.available_amount.safe_add(self.borrowed_amount)
    }

    /// Receipts per unit of liquidity, scaled by 1e18. One-to-one until the
    /// first interest accrues.
    pub fn receipt_exchange_rate(&self) -> Result<u128> {
        let total_supply = self.total_supply()?;

        if total_supply == 0 || self.receipt_supply == 0 {
            Ok(INDEX_ONE)
        } else {
            mul_div(self.receipt_supply as u128, INDEX_ONE, total_supply as u128)
        }
    }

    /// Receipts minted for a liquidity amount, rounding up.
    pub fn liquidity_to_receipt(&self, liquidity_amount: u64) -> Result<u64> {
        let exchange_rate = self.receipt_exchange_rate()?;
        to_u64(mul_div_ceil(
            liquidity_amount as u128,
            exchange_rate,
            INDEX_ONE,
        )?)
    }

    /// Liquidity owed for a receipt amount, rounding down.
    pub fn receipt_to_liquidity(&self, receipt_amount: u64) -> Result<u64> {
        let exchange_rate = self.receipt_exchange_rate()?;
        to_u64(mul_div(receipt_amount as u128, INDEX_ONE, exchange_rate)?)
    }

    /// USD value of a liquidity amount at the last refreshed price, 1e9 scale.
    pub fn market_value(&self, liquidity_amount: u64) -> Result<u128> {
        mul_div(
            liquidity_amount as u128,
            self.market_price,
            pow10(self.mint_decimals as u32)?,
        )
    }

    pub fn deposit_liquidity(&mut self, liquidity_amount: u64) -> Result<u64> {
        require!(liquidity_amount > 0, LendingError::InvalidAmount);

        let receipt_amount = self.liquidity_to_receipt(liquidity_amount)?;

        self.available_amount.safe_add_assign(liquidity_amount)?;
        self.receipt_supply.safe_add_assign(receipt_amount)?;

        Ok(receipt_amount)
    }

    pub fn redeem_receipt(&mut self, receipt_amount: u64) -> Result<u64> {
        require!(receipt_amount > 0, LendingError::InvalidAmount);

        let liquidity_amount = self.receipt_to_liquidity(receipt_amount)?;

        require!(
            liquidity_amount <= self.available_amount,
            LendingError::InsufficientLiquidity,
        );

        self.available_amount.safe_sub_assign(liquidity_amount)?;
        self.receipt_supply.safe_sub_assign(receipt_amount)?;

        Ok(liquidity_amount)
    }

    pub fn borrow_liquidity(&mut self, borrow_amount: u64) -> Result<()> {
        require!(borrow_amount > 0, LendingError::InvalidAmount);
        require!(
            borrow_amount <= self.available_amount,
            LendingError::InsufficientLiquidity,
        );

        self.available_amount.safe_sub_assign(borrow_amount)?;
        self.borrowed_amount.safe_add_assign(borrow_amount)?;

        Ok(())
    }

    pub fn repay_liquidity(&mut self, repay_amount: u64) -> Result<()> {
        require!(repay_amount > 0, LendingError::InvalidAmount);

        // net available amount increases with borrow interest accrued
        self.available_amount.safe_add_assign(repay_amount)?;
        self.borrowed_amount.safe_sub_assign(repay_amount)?;

        Ok(())
    }

    pub fn redeem_fees(&mut self) -> Result<u64> {
        let redeemable_fees = self.accumulated_platform_fees.min(self.available_amount);

        // net available amount decreases when fees are redeemed
        self.available_amount.safe_sub_assign(redeemable_fees)?;
        self.accumulated_platform_fees
            .safe_sub_assign(redeemable_fees)?;

        Ok(redeemable_fees)
    }
}

/// Reserves represent a mint of liquidity that can be supplied and borrowed,
/// unique per (market, liquidity mint).
/// PDA Seeds: ["reserve", market, liquidity_mint]
#[account]
#[derive(InitSpace)]
pub struct Reserve {
    /// The market this reserve belongs to.
    pub market: Pubkey,
    pub last_update: LastUpdate,
    pub liquidity: ReserveLiquidity,
    pub config: ReserveConfig,
    /// Vault holding the deposited liquidity.
    pub vault: Pubkey,
    /// Mint of receipt tokens representing pool shares.
    pub receipt_mint: Pubkey,
    /// Escrow holding receipt tokens backing obligation collateral.
    pub receipt_vault: Pubkey,
    pub bump: u8,
    pub receipt_mint_bump: u8,
}

impl Reserve {
    /// Current utilization in basis points, `borrowed / (available + borrowed)`.
    pub fn utilization_bps(&self) -> Result<u64> {
        let total_supply = self.liquidity.total_supply()?;

        if total_supply == 0 {
            return Ok(0);
        }

        to_u64(mul_div(
            self.liquidity.borrowed_amount as u128,
            MAX_BASIS_POINTS as u128,
            total_supply as u128,
        )?)
    }

    /// Two-segment piecewise-linear borrow rate: min to optimal rate over
    /// `[0, optimal_utilization]`, optimal to max rate over the remainder.
    pub fn current_borrow_rate_bps(&self) -> Result<u64> {
        let utilization = self.utilization_bps()?;
        let optimal_utilization = self.config.optimal_utilization_bps as u64;

        if optimal_utilization == 0 || utilization > optimal_utilization {
            let (excess, span) = if optimal_utilization == 0 {
                (utilization, MAX_BASIS_POINTS)
            } else {
                (
                    utilization.safe_sub(optimal_utilization)?,
                    MAX_BASIS_POINTS.safe_sub(optimal_utilization)?,
                )
            };
            let rate_range = (self.config.max_borrow_rate_bps as u64)
                .safe_sub(self.config.optimal_borrow_rate_bps as u64)?;

            (self.config.optimal_borrow_rate_bps as u64)
                .safe_add(excess.safe_mul(rate_range)?.safe_div(span)?)
        } else {
            let rate_range = (self.config.optimal_borrow_rate_bps as u64)
                .safe_sub(self.config.min_borrow_rate_bps as u64)?;

            (self.config.min_borrow_rate_bps as u64)
                .safe_add(utilization.safe_mul(rate_range)?.safe_div(optimal_utilization)?)
        }
    }

    /// Accrues simple interest on the borrowed amount for the elapsed seconds,
    /// advances the cumulative index, and books the platform's cut.
    pub fn accrue_interest(&mut self, now: i64) -> Result<()> {
        let elapsed = self.last_update.seconds_elapsed(now)?;

        if elapsed <= 0 || self.liquidity.borrowed_amount == 0 {
            return Ok(());
        }

        // cap runaway accrual after long periods without a refresh
        let elapsed = (elapsed as u64).min(SECONDS_PER_YEAR);
        let rate_bps = self.current_borrow_rate_bps()?;

        // interest_factor = 1 + rate * elapsed / seconds_per_year, 1e18 scale
        let interest_factor = INDEX_ONE.safe_add(
            (rate_bps as u128)
                .safe_mul(elapsed as u128)?
                .safe_mul(INDEX_ONE)?
                .safe_div((MAX_BASIS_POINTS as u128).safe_mul(SECONDS_PER_YEAR as u128)?)?,
        )?;

        self.liquidity.cumulative_borrow_index = mul_div(
            self.liquidity.cumulative_borrow_index,
            interest_factor,
            INDEX_ONE,
        )?;

        let old_borrowed_amount = self.liquidity.borrowed_amount;
        self.liquidity.borrowed_amount = to_u64(mul_div_ceil(
            old_borrowed_amount as u128,
            interest_factor,
            INDEX_ONE,
        )?)?;

        let new_debt = self
            .liquidity
            .borrowed_amount
            .safe_sub(old_borrowed_amount)?;
        let platform_fee = to_u64(bps_of_ceil(
            new_debt as u128,
            self.config.fees.platform_fee_bps,
        )?)?;

        self.liquidity
            .accumulated_platform_fees
            .safe_add_assign(platform_fee)?;

        Ok(())
    }

    /// Accepts a fresh price quote, accrues interest, and clears staleness.
    pub fn refresh(&mut self, quote: &PriceQuote, now: i64) -> Result<()> {
        quote.validate(now)?;

        self.liquidity.market_price = quote.scaled_price()?;
        self.accrue_interest(now)?;
        self.last_update.update(now);

        Ok(())
    }

    /// Resolves the amount a borrow may draw. `u64::MAX` borrows up to the
    /// remaining LTV-weighted borrow value; anything else must fit within it.
    pub fn calculate_borrow(
        &self,
        amount_to_borrow: u64,
        remaining_borrow_value: u128,
    ) -> Result<u64> {
        if amount_to_borrow == u64::MAX {
            let decimals = pow10(self.liquidity.mint_decimals as u32)?;
            let borrow_amount = to_u64(mul_div(
                remaining_borrow_value,
                decimals,
                self.liquidity.market_price,
            )?)?
            .min(self.liquidity.available_amount);

            Ok(borrow_amount)
        } else {
            let borrow_value = self.liquidity.market_value(amount_to_borrow)?;

            require!(
                borrow_value <= remaining_borrow_value,
                LendingError::ExceededLTV,
            );

            Ok(amount_to_borrow)
        }
    }

    /// Resolves the amount a repay may settle. `u64::MAX` repays the full
    /// accrued debt; anything else must not exceed it.
    pub fn calculate_repay(&self, amount_to_repay: u64, borrowed_amount: u64) -> Result<u64> {
        if amount_to_repay == u64::MAX {
            Ok(borrowed_amount)
        } else {
            require!(
                amount_to_repay <= borrowed_amount,
                LendingError::ExceededBorrowedAmount,
            );

            Ok(amount_to_repay)
        }
    }

    /// Computes the debt to settle and collateral receipts to seize for a
    /// liquidation against this collateral reserve.
    ///
    /// The repayable debt is capped by the repay reserve's close factor; the
    /// bonus-adjusted seizure is capped at the deposited collateral, scaling
    /// the repayment down proportionally when the cap binds. Rounding goes
    /// against the liquidator: repay ceils, seizure floors.
    pub fn calculate_liquidation(
        &self,
        requested_repay_amount: u64,
        close_factor_bps: u16,
        obligation: &Obligation,
        obligation_liquidity: &ObligationLiquidity,
        obligation_collateral: &ObligationCollateral,
    ) -> Result<(u64, u64)> {
        require!(
            obligation_collateral.deposited_amount > 0 && obligation_collateral.market_value > 0,
            LendingError::InsufficientCollateral
        );
        require!(
            obligation_liquidity.borrowed_amount > 0 && obligation_liquidity.market_value > 0,
            LendingError::InvalidObligationLiquidity
        );

        let debt_amount = obligation_liquidity.borrowed_amount;
        let debt_value = obligation_liquidity.market_value;

        // close-factor cap, in value terms, against the whole obligation debt
        let max_liquidation_value =
            mul_div(obligation.borrowed_value, close_factor_bps as u128, MAX_BASIS_POINTS as u128)?
                .min(debt_value);
        let max_liquidation_amount = to_u64(mul_div(
            debt_amount as u128,
            max_liquidation_value,
            debt_value,
        )?)?;

        let liquidation_amount = requested_repay_amount
            .min(max_liquidation_amount)
            .min(debt_amount);
        let liquidation_value = mul_div(liquidation_amount as u128, debt_value, debt_amount as u128)?;

        let seize_value = mul_div(
            liquidation_value,
            (MAX_BASIS_POINTS as u128).safe_add(self.config.liquidation_bonus_bps as u128)?,
            MAX_BASIS_POINTS as u128,
        )?;

        let repay_amount: u64;
        let seize_receipt_amount: u64;

        match seize_value.cmp(&obligation_collateral.market_value) {
            Ordering::Greater => {
                repay_amount = to_u64(mul_div_ceil(
                    liquidation_amount as u128,
                    obligation_collateral.market_value,
                    seize_value,
                )?)?;
                seize_receipt_amount = obligation_collateral.deposited_amount;
            }
            Ordering::Equal => {
                repay_amount = liquidation_amount;
                seize_receipt_amount = obligation_collateral.deposited_amount;
            }
            Ordering::Less => {
                repay_amount = liquidation_amount;
                seize_receipt_amount = to_u64(mul_div(
                    obligation_collateral.deposited_amount as u128,
                    seize_value,
                    obligation_collateral.market_value,
                )?)?;
            }
        }

        Ok((repay_amount, seize_receipt_amount))
    }
}
