use std::panic::Location;

use anchor_lang::prelude::*;

use crate::{error::LendingError, MAX_BASIS_POINTS};

pub trait SafeMath: Sized {
    fn safe_add(self, rhs: Self) -> Result<Self>;
    fn safe_sub(self, rhs: Self) -> Result<Self>;
    fn safe_mul(self, rhs: Self) -> Result<Self>;
    fn safe_div(self, rhs: Self) -> Result<Self>;
}

macro_rules! checked_impl {
    ($t:ty) => {
        impl SafeMath for $t {
            #[track_caller]
            #[inline(always)]
            fn safe_add(self, rhs: $t) -> Result<$t> {
                match self.checked_add(rhs) {
                    Some(result) => Ok(result),
                    None => {
                        let caller = Location::caller();
                        msg!("Math overflow at {}:{}", caller.file(), caller.line());
                        Err(LendingError::MathOverflow.into())
                    }
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_sub(self, rhs: $t) -> Result<$t> {
                match self.checked_sub(rhs) {
                    Some(result) => Ok(result),
                    None => {
                        let caller = Location::caller();
                        msg!("Math underflow at {}:{}", caller.file(), caller.line());
                        Err(LendingError::MathOverflow.into())
                    }
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_mul(self, rhs: $t) -> Result<$t> {
                match self.checked_mul(rhs) {
                    Some(result) => Ok(result),
                    None => {
                        let caller = Location::caller();
                        msg!("Math overflow at {}:{}", caller.file(), caller.line());
                        Err(LendingError::MathOverflow.into())
                    }
                }
            }

            #[track_caller]
            #[inline(always)]
            fn safe_div(self, rhs: $t) -> Result<$t> {
                match self.checked_div(rhs) {
                    Some(result) => Ok(result),
                    None => {
                        let caller = Location::caller();
                        msg!("Division error at {}:{}", caller.file(), caller.line());
                        Err(LendingError::MathOverflow.into())
                    }
                }
            }
        }
    };
}

checked_impl!(u16);
checked_impl!(u64);
checked_impl!(u128);
checked_impl!(i64);

pub trait SafeMathAssign: Sized {
    fn safe_add_assign(&mut self, rhs: Self) -> Result<()>;
    fn safe_sub_assign(&mut self, rhs: Self) -> Result<()>;
}

macro_rules! assign_impl {
    ($t:ty) => {
        impl SafeMathAssign for $t {
            #[track_caller]
            #[inline(always)]
            fn safe_add_assign(&mut self, rhs: $t) -> Result<()> {
                *self = self.safe_add(rhs)?;
                Ok(())
            }

            #[track_caller]
            #[inline(always)]
            fn safe_sub_assign(&mut self, rhs: $t) -> Result<()> {
                *self = self.safe_sub(rhs)?;
                Ok(())
            }
        }
    };
}

assign_impl!(u64);
assign_impl!(u128);

/// floor(a * b / denominator)
#[track_caller]
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    a.safe_mul(b)?.safe_div(denominator)
}

/// ceil(a * b / denominator)
#[track_caller]
pub fn mul_div_ceil(a: u128, b: u128, denominator: u128) -> Result<u128> {
    let product = a.safe_mul(b)?;
    product
        .safe_add(denominator.safe_sub(1)?)?
        .safe_div(denominator)
}

/// floor(value * bps / 10000)
#[track_caller]
pub fn bps_of(value: u128, bps: u16) -> Result<u128> {
    mul_div(value, bps as u128, MAX_BASIS_POINTS as u128)
}

/// ceil(value * bps / 10000)
#[track_caller]
pub fn bps_of_ceil(value: u128, bps: u16) -> Result<u128> {
    mul_div_ceil(value, bps as u128, MAX_BASIS_POINTS as u128)
}

pub fn pow10(exp: u32) -> Result<u128> {
    10u128
        .checked_pow(exp)
        .ok_or_else(|| error!(LendingError::MathOverflow))
}

#[track_caller]
pub fn to_u64(value: u128) -> Result<u64> {
    match u64::try_from(value) {
        Ok(result) => Ok(result),
        Err(_) => {
            let caller = Location::caller();
            msg!("Conversion to u64 failed at {}:{}", caller.file(), caller.line());
            Err(LendingError::MathOverflow.into())
        }
    }
}
