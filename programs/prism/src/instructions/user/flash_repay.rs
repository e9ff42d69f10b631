use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::{
    self,
    instructions::{load_current_index_checked, load_instruction_at_checked},
};
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::RESERVE_SEED;
use crate::error::LendingError;
use crate::events::FlashLoanRepaid;
use crate::math::{SafeMath, SafeMathAssign};
use crate::state::Reserve;

/// Accounts for repaying a flash loan
///
/// The account order is load-bearing: `flash_borrow` verifies this
/// instruction's reserve by position.
#[derive(Accounts)]
pub struct FlashRepay<'info> {
    /// Borrower repaying the flash loan
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [RESERVE_SEED, reserve.market.as_ref(), reserve.liquidity.mint.as_ref()],
        bump = reserve.bump,
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Vault receiving the repayment plus fee
    #[account(mut, address = reserve.vault)]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Borrower's token account funding the repayment
    #[account(
        mut,
        constraint = authority_token_account.mint == reserve.liquidity.mint
            @ LendingError::InvalidReserve,
        constraint = authority_token_account.owner == authority.key()
            @ LendingError::InvalidAccountOwner,
    )]
    pub authority_token_account: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,

    /// CHECK: address constrained to the instructions sysvar
    #[account(address = sysvar::instructions::ID)]
    pub instruction_sysvar: UncheckedAccount<'info>,
}

/// Repay a flash loan with its fee
///
/// Verifies the paired `flash_borrow` at the given earlier index drew the
/// same amount from the same reserve, then settles the principal and credits
/// the fee to the pool with the platform's cut booked as claimable.
pub fn handler(ctx: Context<FlashRepay>, amount: u64, borrow_instruction_index: u8) -> Result<()> {
    require!(amount > 0, LendingError::InvalidAmount);

    let reserve = &mut ctx.accounts.reserve;

    let sysvar_info = ctx.accounts.instruction_sysvar.to_account_info();
    let current_index = load_current_index_checked(&sysvar_info)? as usize;
    require!(
        (borrow_instruction_index as usize) < current_index,
        LendingError::InvalidBorrowInstructionIndex
    );

    let borrow_ix = load_instruction_at_checked(borrow_instruction_index as usize, &sysvar_info)?;

    require!(
        borrow_ix.program_id == crate::ID,
        LendingError::InvalidFlashRepayProgramId
    );
    require!(
        borrow_ix.data.len() >= 16
            && &borrow_ix.data[0..8] == crate::instruction::FlashBorrow::DISCRIMINATOR,
        LendingError::InvalidBorrowInstructionIndex
    );
    require!(
        borrow_ix.accounts.len() > 1 && borrow_ix.accounts[1].pubkey == reserve.key(),
        LendingError::InvalidFlashRepayReserve
    );

    let borrowed_amount = u64::from_le_bytes(
        borrow_ix.data[8..16]
            .try_into()
            .map_err(|_| LendingError::InvalidFlashRepayInstructionData)?,
    );
    require!(
        amount == borrowed_amount,
        LendingError::InvalidFlashRepayAmount
    );

    let (total_fee, platform_fee) = reserve.config.fees.calculate_flash_loan_fee(amount)?;

    reserve.liquidity.repay_liquidity(amount)?;
    // the fee lands in the pool; the platform's cut stays claimable
    reserve.liquidity.available_amount.safe_add_assign(total_fee)?;
    reserve
        .liquidity
        .accumulated_platform_fees
        .safe_add_assign(platform_fee)?;
    reserve.last_update.mark_stale();

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.authority_token_account.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
                authority: ctx.accounts.authority.to_account_info(),
            },
        ),
        amount.safe_add(total_fee)?,
    )?;

    emit!(FlashLoanRepaid {
        reserve: reserve.key(),
        amount,
        fee: total_fee,
        platform_fee,
    });

    msg!("Flash repaid {} plus {} fee", amount, total_fee);

    Ok(())
}
