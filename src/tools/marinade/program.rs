//! Marinade liquid-staking program addresses and instruction builders.
//!
//! Instructions follow the Anchor wire format: an 8-byte discriminator
//! (`sha256("global:<name>")[..8]`) followed by little-endian arguments.
use sha2::{Digest, Sha256};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey,
    pubkey::Pubkey,
    system_program,
};

use super::state::MarinadeState;

pub const MARINADE_PROGRAM_ID: Pubkey = pubkey!("MarBmsSgKXdrN1egZf5sqe1TMai9K1rChYNDJgjq7aD");
pub const MARINADE_STATE_ADDRESS: Pubkey = pubkey!("8szGkuLTAux9XMgZ2vtY39jVSowEcpBfFfD8hXSEqdGC");
pub const MSOL_MINT: Pubkey = pubkey!("mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So");
pub const MSOL_DECIMALS: u8 = 9;

const RESERVE_SEED: &[u8] = b"reserve";
const MSOL_MINT_AUTHORITY_SEED: &[u8] = b"st_mint";
const LIQ_POOL_SOL_LEG_SEED: &[u8] = b"liq_sol";
const LIQ_POOL_MSOL_LEG_AUTHORITY_SEED: &[u8] = b"liq_st_sol_authority";

fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    discriminator("global", name)
}

pub fn account_discriminator(name: &str) -> [u8; 8] {
    discriminator("account", name)
}

/// Program-derived addresses owned by a Marinade state account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramAddresses {
    pub reserve: Pubkey,
    pub msol_mint_authority: Pubkey,
    pub liq_pool_sol_leg: Pubkey,
    pub liq_pool_msol_leg_authority: Pubkey,
}

impl ProgramAddresses {
    pub fn derive(state: &Pubkey) -> Self {
        let pda = |seed: &[u8]| {
            Pubkey::find_program_address(&[state.as_ref(), seed], &MARINADE_PROGRAM_ID).0
        };
        Self {
            reserve: pda(RESERVE_SEED),
            msol_mint_authority: pda(MSOL_MINT_AUTHORITY_SEED),
            liq_pool_sol_leg: pda(LIQ_POOL_SOL_LEG_SEED),
            liq_pool_msol_leg_authority: pda(LIQ_POOL_MSOL_LEG_AUTHORITY_SEED),
        }
    }
}

fn instruction_data(name: &str, amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&instruction_discriminator(name));
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

/// `deposit`: stake `lamports` from `transfer_from` and mint mSOL into `mint_to`.
pub fn deposit(
    state: &MarinadeState,
    transfer_from: &Pubkey,
    mint_to: &Pubkey,
    lamports: u64,
) -> Instruction {
    let pdas = ProgramAddresses::derive(&state.address);
    Instruction {
        program_id: MARINADE_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(state.address, false),
            AccountMeta::new(state.msol_mint, false),
            AccountMeta::new(pdas.liq_pool_sol_leg, false),
            AccountMeta::new(state.liq_pool.msol_leg, false),
            AccountMeta::new_readonly(pdas.liq_pool_msol_leg_authority, false),
            AccountMeta::new(pdas.reserve, false),
            AccountMeta::new(*transfer_from, true),
            AccountMeta::new(*mint_to, false),
            AccountMeta::new_readonly(pdas.msol_mint_authority, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: instruction_data("deposit", lamports),
    }
}

/// `liquid_unstake`: swap `msol_amount` from `msol_account` for SOL through the liquidity pool.
pub fn liquid_unstake(
    state: &MarinadeState,
    owner: &Pubkey,
    msol_account: &Pubkey,
    msol_amount: u64,
) -> Instruction {
    let pdas = ProgramAddresses::derive(&state.address);
    Instruction {
        program_id: MARINADE_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(state.address, false),
            AccountMeta::new(state.msol_mint, false),
            AccountMeta::new(pdas.liq_pool_sol_leg, false),
            AccountMeta::new(state.liq_pool.msol_leg, false),
            AccountMeta::new(state.treasury_msol_account, false),
            AccountMeta::new(*msol_account, false),
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(*owner, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: instruction_data("liquid_unstake", msol_amount),
    }
}
