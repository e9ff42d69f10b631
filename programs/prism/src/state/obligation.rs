use std::cmp::Ordering;

use anchor_lang::prelude::*;

use crate::{
    error::LendingError,
    math::{bps_of, mul_div, mul_div_ceil, to_u64, SafeMathAssign},
    state::LastUpdate,
    HEALTH_FACTOR_ONE, MAX_OBLIGATION_BORROWS, MAX_OBLIGATION_DEPOSITS,
};

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Default, Debug)]
pub struct ObligationCollateral {
    /// Reserve the collateral is deposited to.
    pub reserve: Pubkey,
    /// Amount of receipt tokens deposited.
    pub deposited_amount: u64,
    /// Last refreshed value of the deposited collateral, USD scaled by 1e9.
    pub market_value: u128,
}

impl ObligationCollateral {
    pub fn deposit(&mut self, receipt_amount: u64) -> Result<()> {
        self.deposited_amount.safe_add_assign(receipt_amount)
    }

    pub fn withdraw(&mut self, receipt_amount: u64) -> Result<()> {
        self.deposited_amount.safe_sub_assign(receipt_amount)
    }

    /// Resolves a requested withdrawal against this entry. `u64::MAX`
    /// withdraws the whole deposit; anything else must fit within it.
    pub fn resolve_withdraw_amount(&self, requested_amount: u64) -> Result<u64> {
        let receipt_amount = if requested_amount == u64::MAX {
            self.deposited_amount
        } else {
            requested_amount
        };

        require!(
            receipt_amount <= self.deposited_amount,
            LendingError::InsufficientFunds
        );

        Ok(receipt_amount)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Default, Debug)]
pub struct ObligationLiquidity {
    /// Reserve the liquidity is borrowed from.
    pub reserve: Pubkey,
    /// Amount of liquidity borrowed plus accrued interest.
    pub borrowed_amount: u64,
    /// Snapshot of the reserve's cumulative borrow index, updated on refresh.
    pub cumulative_borrow_index: u128,
    /// Last refreshed value of the borrowed liquidity, USD scaled by 1e9.
    pub market_value: u128,
}

impl ObligationLiquidity {
    /// Brings the entry's debt up to the reserve's current cumulative index.
    pub fn accrue_interest(&mut self, cumulative_borrow_index: u128) -> Result<()> {
        match cumulative_borrow_index.cmp(&self.cumulative_borrow_index) {
            Ordering::Less => return err!(LendingError::NegativeInterestRate),
            Ordering::Equal => {}
            Ordering::Greater => {
                self.borrowed_amount = to_u64(mul_div_ceil(
                    self.borrowed_amount as u128,
                    cumulative_borrow_index,
                    self.cumulative_borrow_index,
                )?)?;
                self.cumulative_borrow_index = cumulative_borrow_index;
            }
        }

        Ok(())
    }

    pub fn borrow(&mut self, liquidity_amount: u64) -> Result<()> {
        self.borrowed_amount.safe_add_assign(liquidity_amount)
    }

    pub fn repay(&mut self, liquidity_amount: u64) -> Result<()> {
        self.borrowed_amount.safe_sub_assign(liquidity_amount)
    }
}

/// Obligations track the collateral and borrowed liquidity for a given owner
/// in a market.
/// PDA Seeds: ["obligation", market, owner]
#[account]
#[derive(InitSpace)]
pub struct Obligation {
    pub last_update: LastUpdate,
    /// Market this obligation belongs to.
    pub market: Pubkey,
    /// Address which can deposit collateral and borrow liquidity.
    pub owner: Pubkey,
    /// Deposited collateral, unique by reserve.
    #[max_len(MAX_OBLIGATION_DEPOSITS)]
    pub deposits: Vec<ObligationCollateral>,
    /// Borrowed liquidity, unique by reserve.
    #[max_len(MAX_OBLIGATION_BORROWS)]
    pub borrows: Vec<ObligationLiquidity>,
    /// Last refreshed value of all deposits, USD scaled by 1e9.
    pub deposited_value: u128,
    /// Last refreshed value of all borrows, USD scaled by 1e9.
    pub borrowed_value: u128,
    /// Maximum borrow value at the LTV-weighted average, USD scaled by 1e9.
    pub allowed_borrow_value: u128,
    /// Borrow value at which the obligation becomes liquidatable, USD scaled by 1e9.
    pub unhealthy_borrow_value: u128,
    /// Bump used for deriving signer seeds.
    pub bump: u8,
}

impl Obligation {
    pub fn new(market: Pubkey, owner: Pubkey, last_update: LastUpdate, bump: u8) -> Self {
        Self {
            last_update,
            market,
            owner,
            deposits: Vec::new(),
            borrows: Vec::new(),
            deposited_value: 0,
            borrowed_value: 0,
            allowed_borrow_value: 0,
            unhealthy_borrow_value: 0,
            bump,
        }
    }

    fn find_collateral_index_in_deposits(&self, deposit_reserve: Pubkey) -> Option<usize> {
        self.deposits
            .iter()
            .position(|collateral| collateral.reserve == deposit_reserve)
    }

    pub fn find_or_add_collateral_to_deposits(
        &mut self,
        deposit_reserve: Pubkey,
    ) -> Result<&mut ObligationCollateral> {
        if let Some(index) = self.find_collateral_index_in_deposits(deposit_reserve) {
            return Ok(&mut self.deposits[index]);
        }

        require!(
            self.deposits.len() < MAX_OBLIGATION_DEPOSITS,
            LendingError::MaxDepositsReached
        );

        self.deposits.push(ObligationCollateral {
            reserve: deposit_reserve,
            deposited_amount: 0,
            market_value: 0,
        });

        Ok(self.deposits.last_mut().unwrap())
    }

    pub fn find_collateral_in_deposits(
        &self,
        deposit_reserve: Pubkey,
    ) -> Result<(&ObligationCollateral, usize)> {
        require!(
            !self.deposits.is_empty(),
            LendingError::ObligationDepositsEmpty
        );

        let collateral_index = self
            .find_collateral_index_in_deposits(deposit_reserve)
            .ok_or(LendingError::InvalidObligationCollateral)?;

        Ok((&self.deposits[collateral_index], collateral_index))
    }

    fn find_liquidity_index_in_borrows(&self, borrow_reserve: Pubkey) -> Option<usize> {
        self.borrows
            .iter()
            .position(|liquidity| liquidity.reserve == borrow_reserve)
    }

    pub fn find_or_add_liquidity_to_borrows(
        &mut self,
        borrow_reserve: Pubkey,
        cumulative_borrow_index: u128,
    ) -> Result<&mut ObligationLiquidity> {
        if let Some(index) = self.find_liquidity_index_in_borrows(borrow_reserve) {
            return Ok(&mut self.borrows[index]);
        }

        require!(
            self.borrows.len() < MAX_OBLIGATION_BORROWS,
            LendingError::MaxBorrowsReached
        );

        self.borrows.push(ObligationLiquidity {
            reserve: borrow_reserve,
            borrowed_amount: 0,
            cumulative_borrow_index,
            market_value: 0,
        });

        Ok(self.borrows.last_mut().unwrap())
    }

    pub fn find_liquidity_in_borrows(
        &self,
        borrow_reserve: Pubkey,
    ) -> Result<(&ObligationLiquidity, usize)> {
        require!(
            !self.borrows.is_empty(),
            LendingError::ObligationBorrowsEmpty
        );

        let liquidity_index = self
            .find_liquidity_index_in_borrows(borrow_reserve)
            .ok_or(LendingError::InvalidObligationLiquidity)?;

        Ok((&self.borrows[liquidity_index], liquidity_index))
    }

    /// Reduces a deposit entry, dropping it once fully withdrawn.
    pub fn withdraw(&mut self, receipt_amount: u64, index: usize) -> Result<()> {
        let obligation_collateral = &mut self.deposits[index];

        if receipt_amount == obligation_collateral.deposited_amount {
            self.deposits.remove(index);
        } else {
            obligation_collateral.withdraw(receipt_amount)?;
        }

        Ok(())
    }

    /// Reduces a borrow entry, dropping it once fully repaid.
    pub fn repay(&mut self, liquidity_amount: u64, index: usize) -> Result<()> {
        let obligation_liquidity = &mut self.borrows[index];

        if liquidity_amount == obligation_liquidity.borrowed_amount {
            self.borrows.remove(index);
        } else {
            obligation_liquidity.repay(liquidity_amount)?;
        }

        Ok(())
    }

    /// Checks that taking `receipt_amount` out of a deposit entry leaves the
    /// remaining threshold-weighted collateral covering the outstanding debt.
    /// Debt-free obligations may withdraw freely.
    pub fn validate_collateral_withdrawal(
        &self,
        collateral: &ObligationCollateral,
        receipt_amount: u64,
        liquidation_threshold_bps: u16,
    ) -> Result<()> {
        if self.borrows.is_empty() {
            return Ok(());
        }

        // value leaving the position, at the last refreshed valuation
        let withdraw_value = mul_div(
            collateral.market_value,
            receipt_amount as u128,
            collateral.deposited_amount as u128,
        )?;
        let threshold_reduction = bps_of(withdraw_value, liquidation_threshold_bps)?;
        let remaining_unhealthy_value = self
            .unhealthy_borrow_value
            .saturating_sub(threshold_reduction);

        require!(
            remaining_unhealthy_value >= self.borrowed_value,
            LendingError::ExceededLTV
        );

        Ok(())
    }

    pub fn remaining_borrow_value(&self) -> u128 {
        self.allowed_borrow_value
            .saturating_sub(self.borrowed_value)
    }

    /// Health factor scaled by 10000. `None` means no debt (infinite health).
    pub fn health_factor_bps(&self) -> Result<Option<u64>> {
        if self.borrowed_value == 0 {
            return Ok(None);
        }

        let health = mul_div(
            self.unhealthy_borrow_value,
            HEALTH_FACTOR_ONE as u128,
            self.borrowed_value,
        )?
        .min(u64::MAX as u128);

        Ok(Some(health as u64))
    }

    pub fn is_liquidatable(&self) -> Result<bool> {
        Ok(match self.health_factor_bps()? {
            None => false,
            Some(health) => health < HEALTH_FACTOR_ONE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::INDEX_ONE;

    fn test_obligation() -> Obligation {
        Obligation::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            LastUpdate::new(0),
            255,
        )
    }

    #[test]
    fn new_obligation_is_empty_and_valid() {
        let obligation = test_obligation();

        assert!(obligation.deposits.is_empty());
        assert!(obligation.borrows.is_empty());
        assert_eq!(obligation.health_factor_bps().unwrap(), None);
        assert!(!obligation.is_liquidatable().unwrap());
    }

    #[test]
    fn collateral_entries_are_unique_by_reserve() {
        let mut obligation = test_obligation();
        let reserve = Pubkey::new_unique();

        obligation
            .find_or_add_collateral_to_deposits(reserve)
            .unwrap()
            .deposit(100)
            .unwrap();
        obligation
            .find_or_add_collateral_to_deposits(reserve)
            .unwrap()
            .deposit(50)
            .unwrap();

        assert_eq!(obligation.deposits.len(), 1);
        assert_eq!(obligation.deposits[0].deposited_amount, 150);
    }

    #[test]
    fn deposit_entries_are_bounded() {
        let mut obligation = test_obligation();

        for _ in 0..MAX_OBLIGATION_DEPOSITS {
            obligation
                .find_or_add_collateral_to_deposits(Pubkey::new_unique())
                .unwrap();
        }

        let err = obligation
            .find_or_add_collateral_to_deposits(Pubkey::new_unique())
            .unwrap_err();
        assert_eq!(err, LendingError::MaxDepositsReached.into());
    }

    #[test]
    fn full_withdraw_removes_entry() {
        let mut obligation = test_obligation();
        let reserve = Pubkey::new_unique();

        obligation
            .find_or_add_collateral_to_deposits(reserve)
            .unwrap()
            .deposit(100)
            .unwrap();

        obligation.withdraw(40, 0).unwrap();
        assert_eq!(obligation.deposits[0].deposited_amount, 60);

        obligation.withdraw(60, 0).unwrap();
        assert!(obligation.deposits.is_empty());
    }

    #[test]
    fn full_repay_removes_entry() {
        let mut obligation = test_obligation();
        let reserve = Pubkey::new_unique();

        obligation
            .find_or_add_liquidity_to_borrows(reserve, INDEX_ONE)
            .unwrap()
            .borrow(500)
            .unwrap();

        obligation.repay(200, 0).unwrap();
        assert_eq!(obligation.borrows[0].borrowed_amount, 300);

        obligation.repay(300, 0).unwrap();
        assert!(obligation.borrows.is_empty());
    }

    #[test]
    fn entry_interest_follows_the_index() {
        let mut entry = ObligationLiquidity {
            reserve: Pubkey::new_unique(),
            borrowed_amount: 1_000,
            cumulative_borrow_index: INDEX_ONE,
            market_value: 0,
        };

        // 10% of interest accrued on the reserve since the snapshot
        entry.accrue_interest(INDEX_ONE + INDEX_ONE / 10).unwrap();
        assert_eq!(entry.borrowed_amount, 1_100);

        // same index again is a no-op
        entry.accrue_interest(INDEX_ONE + INDEX_ONE / 10).unwrap();
        assert_eq!(entry.borrowed_amount, 1_100);

        // a decreasing index is rejected
        let err = entry.accrue_interest(INDEX_ONE).unwrap_err();
        assert_eq!(err, LendingError::NegativeInterestRate.into());
    }

    #[test]
    fn health_factor_thresholds() {
        let mut obligation = test_obligation();
        obligation.unhealthy_borrow_value = 850;
        obligation.borrowed_value = 800;

        assert_eq!(obligation.health_factor_bps().unwrap(), Some(10_625));
        assert!(!obligation.is_liquidatable().unwrap());

        obligation.borrowed_value = 851;
        assert!(obligation.is_liquidatable().unwrap());

        // health of exactly 1.0 is not liquidatable
        obligation.borrowed_value = 850;
        assert_eq!(obligation.health_factor_bps().unwrap(), Some(10_000));
        assert!(!obligation.is_liquidatable().unwrap());
    }

    #[test]
    fn withdraw_amount_resolution() {
        let collateral = ObligationCollateral {
            reserve: Pubkey::new_unique(),
            deposited_amount: 100,
            market_value: 0,
        };

        assert_eq!(collateral.resolve_withdraw_amount(40).unwrap(), 40);
        assert_eq!(collateral.resolve_withdraw_amount(u64::MAX).unwrap(), 100);

        let err = collateral.resolve_withdraw_amount(101).unwrap_err();
        assert_eq!(err, LendingError::InsufficientFunds.into());
    }

    #[test]
    fn collateral_withdrawal_keeps_debt_covered() {
        let mut obligation = test_obligation();
        let reserve = Pubkey::new_unique();

        obligation
            .find_or_add_collateral_to_deposits(reserve)
            .unwrap()
            .deposit(1_000)
            .unwrap();
        obligation.deposits[0].market_value = 1_000;
        let collateral = obligation.deposits[0];

        // debt-free: the whole deposit may come out
        assert!(obligation
            .validate_collateral_withdrawal(&collateral, 1_000, 8_500)
            .is_ok());

        obligation.borrows.push(ObligationLiquidity {
            reserve,
            borrowed_amount: 600,
            cumulative_borrow_index: INDEX_ONE,
            market_value: 600,
        });
        obligation.borrowed_value = 600;
        obligation.unhealthy_borrow_value = 850;

        // withdrawing 200 leaves 800 * 85% = 680 covering the 600 debt
        assert!(obligation
            .validate_collateral_withdrawal(&collateral, 200, 8_500)
            .is_ok());

        // withdrawing 400 leaves 600 * 85% = 510, below the 600 debt
        let err = obligation
            .validate_collateral_withdrawal(&collateral, 400, 8_500)
            .unwrap_err();
        assert_eq!(err, LendingError::ExceededLTV.into());
    }

    #[test]
    fn missing_entries_are_reported() {
        let mut obligation = test_obligation();

        let err = obligation
            .find_collateral_in_deposits(Pubkey::new_unique())
            .unwrap_err();
        assert_eq!(err, LendingError::ObligationDepositsEmpty.into());

        obligation
            .find_or_add_collateral_to_deposits(Pubkey::new_unique())
            .unwrap();
        let err = obligation
            .find_collateral_in_deposits(Pubkey::new_unique())
            .unwrap_err();
        assert_eq!(err, LendingError::InvalidObligationCollateral.into());

        let err = obligation
            .find_liquidity_in_borrows(Pubkey::new_unique())
            .unwrap_err();
        assert_eq!(err, LendingError::ObligationBorrowsEmpty.into());
    }
}
