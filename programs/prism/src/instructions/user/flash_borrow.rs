use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::{
    self,
    instructions::{load_current_index_checked, load_instruction_at_checked},
};
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::RESERVE_SEED;
use crate::error::LendingError;
use crate::events::FlashLoanBorrowed;
use crate::state::{validate_reserve_refreshed, Reserve};

/// Accounts for drawing a flash loan
///
/// The account order is load-bearing: `flash_repay` verifies the borrow
/// instruction's reserve by position.
#[derive(Accounts)]
pub struct FlashBorrow<'info> {
    /// Borrower of the flash loan
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [RESERVE_SEED, reserve.market.as_ref(), reserve.liquidity.mint.as_ref()],
        bump = reserve.bump,
    )]
    pub reserve: Box<Account<'info, Reserve>>,

    /// Vault paying out the flash loan
    #[account(mut, address = reserve.vault)]
    pub vault: Box<Account<'info, TokenAccount>>,

    /// Borrower's token account receiving the loan
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

/// Draw a flash loan from a reserve
///
/// Scans the rest of the transaction for exactly one matching `flash_repay`
/// against the same reserve for the same amount, pointing back at this
/// instruction's index. Runtime transaction atomicity guarantees the repay
/// executes or the whole transaction unwinds.
pub fn handler(ctx: Context<FlashBorrow>, amount: u64) -> Result<()> {
    require!(amount > 0, LendingError::InvalidAmount);

    let now = Clock::get()?.unix_timestamp;
    let reserve = &mut ctx.accounts.reserve;

    validate_reserve_refreshed(reserve.last_update.is_stale(now)?)?;

    let sysvar_info = ctx.accounts.instruction_sysvar.to_account_info();
    let current_index = load_current_index_checked(&sysvar_info)? as usize;

    let mut ix_index = current_index;
    let mut found_repay = false;

    loop {
        ix_index += 1;

        let ix = match load_instruction_at_checked(ix_index, &sysvar_info) {
            Ok(ix) => ix,
            Err(_) => break,
        };

        if ix.program_id != crate::ID || ix.data.len() < 8 {
            continue;
        }

        if &ix.data[0..8] == crate::instruction::FlashBorrow::DISCRIMINATOR {
            return err!(LendingError::MultipleFlashBorrowsNotAllowed);
        }

        if &ix.data[0..8] == crate::instruction::FlashRepay::DISCRIMINATOR {
            require!(!found_repay, LendingError::MultipleFlashRepaysNotAllowed);
            require!(
                ix.data.len() >= 17,
                LendingError::InvalidFlashRepayInstructionData
            );

            let repay_amount = u64::from_le_bytes(
                ix.data[8..16]
                    .try_into()
                    .map_err(|_| LendingError::InvalidFlashRepayInstructionData)?,
            );
            let borrow_instruction_index = ix.data[16] as usize;

            require!(repay_amount == amount, LendingError::InvalidFlashRepayAmount);
            require!(
                borrow_instruction_index == current_index,
                LendingError::InvalidBorrowInstructionIndex
            );
            require!(
                ix.accounts.len() > 1 && ix.accounts[1].pubkey == reserve.key(),
                LendingError::InvalidFlashRepayReserve
            );

            found_repay = true;
        }
    }

    require!(found_repay, LendingError::NoFlashRepayInstruction);

    reserve.liquidity.borrow_liquidity(amount)?;
    reserve.last_update.mark_stale();

    let market_key = reserve.market;
    let mint_key = reserve.liquidity.mint;
    let seeds = &[
        RESERVE_SEED,
        market_key.as_ref(),
        mint_key.as_ref(),
        &[reserve.bump],
    ];
    let signer_seeds = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.vault.to_account_info(),
                to: ctx.accounts.authority_token_account.to_account_info(),
                authority: reserve.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
    )?;

    emit!(FlashLoanBorrowed {
        reserve: reserve.key(),
        amount,
    });

    msg!("Flash borrowed {}", amount);

    Ok(())
}
