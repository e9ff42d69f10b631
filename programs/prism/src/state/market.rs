use anchor_lang::prelude::*;

/// Markets are groups of reserves which may be supplied to and borrowed against.
/// PDA Seeds: ["market", name]
#[account]
#[derive(InitSpace)]
pub struct Market {
    /// Address which can add reserves, update configs, and redeem platform fees.
    pub authority: Pubkey,
    /// Bump used for deriving signer seeds.
    pub bump: u8,
    /// Name of the market.
    #[max_len(0)] // used only for InitSpace; actual length added in space().
    pub name: String,
}

impl Market {
    pub fn space(name: &str) -> usize {
        Market::DISCRIMINATOR.len() + Market::INIT_SPACE + name.len()
    }
}
