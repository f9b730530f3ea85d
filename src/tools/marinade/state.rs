//! Marinade state account decoding and the `get_marinade_state` view.
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use super::program::{account_discriminator, ProgramAddresses, MARINADE_PROGRAM_ID};
use crate::{
    lib::{
        errors::ChainError,
        sanitize::{NodeId, ObjectGraph},
    },
    server::config::Network,
};

const STATE_ACCOUNT: &str = "Marinade state";

/// `msol_price` is a fixed-point value scaled by 2^32.
pub const PRICE_DENOMINATOR: f64 = 4_294_967_296.0;

/// Bookkeeping header of an on-chain list account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountList {
    pub account: Pubkey,
    pub item_size: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiqPool {
    pub lp_mint: Pubkey,
    pub msol_leg: Pubkey,
    pub lp_liquidity_target: u64,
    pub lp_max_fee_bp: u32,
    pub lp_min_fee_bp: u32,
    pub treasury_cut_bp: u32,
    pub lp_supply: u64,
    pub lent_from_sol_leg: u64,
    pub liquidity_sol_cap: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarinadeState {
    pub address: Pubkey,
    pub msol_mint: Pubkey,
    pub admin_authority: Pubkey,
    pub operational_sol_account: Pubkey,
    pub treasury_msol_account: Pubkey,
    pub rent_exempt_for_token_acc: u64,
    pub reward_fee_bp: u32,
    pub stake_list: AccountList,
    pub delayed_unstake_cooling_down: u64,
    pub min_stake: u64,
    pub validator_list: AccountList,
    pub validator_manager_authority: Pubkey,
    pub total_validator_score: u32,
    pub total_active_balance: u64,
    pub auto_add_validator_enabled: bool,
    pub liq_pool: LiqPool,
    pub available_reserve_balance: u64,
    pub msol_supply: u64,
    pub msol_price: u64,
    pub circulating_ticket_count: u64,
    pub circulating_ticket_balance: u64,
    pub lent_from_reserve: u64,
    pub min_deposit: u64,
    pub min_withdraw: u64,
    pub staking_sol_cap: u64,
    pub emergency_cooling_down: u64,
}

impl MarinadeState {
    /// SOL value of one mSOL.
    pub fn msol_price(&self) -> f64 {
        self.msol_price as f64 / PRICE_DENOMINATOR
    }

    /// Decode the Anchor-serialized state account at `address`.
    pub fn decode(address: Pubkey, data: &[u8]) -> Result<Self, ChainError> {
        let mut reader = AccountReader::new(data);
        if reader.take(8)? != account_discriminator("State") {
            return Err(decode_error("account discriminator mismatch"));
        }

        let msol_mint = reader.pubkey()?;
        let admin_authority = reader.pubkey()?;
        let operational_sol_account = reader.pubkey()?;
        let treasury_msol_account = reader.pubkey()?;
        reader.skip(2)?; // reserve and mint-authority bumps
        let rent_exempt_for_token_acc = reader.u64()?;
        let reward_fee_bp = reader.u32()?;

        let stake_list = reader.list()?;
        let delayed_unstake_cooling_down = reader.u64()?;
        reader.skip(2)?; // stake deposit and withdraw bumps
        reader.skip(16)?; // slots_for_stake_delta, last_stake_delta_epoch
        let min_stake = reader.u64()?;
        reader.skip(4)?; // extra_stake_delta_runs

        let validator_list = reader.list()?;
        let validator_manager_authority = reader.pubkey()?;
        let total_validator_score = reader.u32()?;
        let total_active_balance = reader.u64()?;
        let auto_add_validator_enabled = reader.u8()? != 0;

        let lp_mint = reader.pubkey()?;
        reader.skip(3)?; // liquidity pool bumps
        let liq_pool = LiqPool {
            lp_mint,
            msol_leg: reader.pubkey()?,
            lp_liquidity_target: reader.u64()?,
            lp_max_fee_bp: reader.u32()?,
            lp_min_fee_bp: reader.u32()?,
            treasury_cut_bp: reader.u32()?,
            lp_supply: reader.u64()?,
            lent_from_sol_leg: reader.u64()?,
            liquidity_sol_cap: reader.u64()?,
        };

        Ok(Self {
            address,
            msol_mint,
            admin_authority,
            operational_sol_account,
            treasury_msol_account,
            rent_exempt_for_token_acc,
            reward_fee_bp,
            stake_list,
            delayed_unstake_cooling_down,
            min_stake,
            validator_list,
            validator_manager_authority,
            total_validator_score,
            total_active_balance,
            auto_add_validator_enabled,
            liq_pool,
            available_reserve_balance: reader.u64()?,
            msol_supply: reader.u64()?,
            msol_price: reader.u64()?,
            circulating_ticket_count: reader.u64()?,
            circulating_ticket_balance: reader.u64()?,
            lent_from_reserve: reader.u64()?,
            min_deposit: reader.u64()?,
            min_withdraw: reader.u64()?,
            staking_sol_cap: reader.u64()?,
            emergency_cooling_down: reader.u64()?,
        })
    }
}

/// Read and decode the state account.
pub async fn fetch_state(client: &RpcClient, address: &Pubkey) -> Result<MarinadeState, ChainError> {
    let account = client
        .get_account_with_commitment(address, CommitmentConfig::confirmed())
        .await?
        .value
        .ok_or(ChainError::AccountNotFound { address: *address })?;
    if account.owner != MARINADE_PROGRAM_ID {
        return Err(decode_error(format!(
            "account is owned by {}, not the Marinade program",
            account.owner
        )));
    }
    MarinadeState::decode(*address, &account.data)
}

fn decode_error(message: impl Into<String>) -> ChainError {
    ChainError::Decode {
        account: STATE_ACCOUNT,
        message: message.into(),
    }
}

/// Little-endian cursor over raw account data.
struct AccountReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> AccountReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ChainError> {
        let end = self.offset + len;
        let bytes = self.data.get(self.offset..end).ok_or_else(|| {
            decode_error(format!(
                "unexpected end of data at offset {} (need {len} bytes, have {})",
                self.offset,
                self.data.len()
            ))
        })?;
        self.offset = end;
        Ok(bytes)
    }

    fn skip(&mut self, len: usize) -> Result<(), ChainError> {
        self.take(len).map(|_| ())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ChainError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, ChainError> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, ChainError> {
        self.array().map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> Result<u64, ChainError> {
        self.array().map(u64::from_le_bytes)
    }

    fn pubkey(&mut self) -> Result<Pubkey, ChainError> {
        self.array().map(Pubkey::new_from_array)
    }

    fn list(&mut self) -> Result<AccountList, ChainError> {
        let list = AccountList {
            account: self.pubkey()?,
            item_size: self.u32()?,
            count: self.u32()?,
        };
        self.skip(32 + 4)?; // reserved
        Ok(list)
    }
}

/// Assemble the live view returned by `get_marinade_state`.
///
/// The decoded state plus a `marinade` handle carrying the client config and
/// instruction builders, which points back at the state. The back-reference
/// makes it cyclic, so render it through [`crate::lib::sanitize::safe_serialize`].
pub fn build_view(state: &MarinadeState, network: Network) -> (ObjectGraph, NodeId) {
    let mut graph = ObjectGraph::new();
    let root = graph.object(Some("MarinadeState"));
    let pdas = ProgramAddresses::derive(&state.address);

    let key = |graph: &mut ObjectGraph, key: &Pubkey| graph.wrapper("PublicKey", key.to_string());
    let bn = |graph: &mut ObjectGraph, value: u64| graph.wrapper("BN", value.to_string());

    let fields = [
        ("marinadeStateAddress", state.address),
        ("marinadeFinanceProgramId", MARINADE_PROGRAM_ID),
        ("mSolMintAddress", state.msol_mint),
        ("adminAuthority", state.admin_authority),
        ("operationalSolAccount", state.operational_sol_account),
        ("treasuryMsolAccount", state.treasury_msol_account),
        ("reserveAddress", pdas.reserve),
        ("mSolMintAuthority", pdas.msol_mint_authority),
        ("solLegAddress", pdas.liq_pool_sol_leg),
        ("mSolLegAuthority", pdas.liq_pool_msol_leg_authority),
        ("mSolLeg", state.liq_pool.msol_leg),
        ("lpMint", state.liq_pool.lp_mint),
        ("stakeListAddress", state.stake_list.account),
        ("validatorListAddress", state.validator_list.account),
    ];
    for (name, value) in fields {
        let node = key(&mut graph, &value);
        graph.set_field(root, name, node);
    }

    let price = graph.float(state.msol_price());
    graph.set_field(root, "mSolPrice", price);
    let reward_fee = graph.uint(state.reward_fee_bp.into());
    graph.set_field(root, "rewardsCommissionBp", reward_fee);

    let account = graph.object(None);
    let amounts = [
        ("msolSupply", state.msol_supply),
        ("msolPrice", state.msol_price),
        ("availableReserveBalance", state.available_reserve_balance),
        ("totalActiveBalance", state.total_active_balance),
        ("circulatingTicketCount", state.circulating_ticket_count),
        ("circulatingTicketBalance", state.circulating_ticket_balance),
        ("lentFromReserve", state.lent_from_reserve),
        ("minDeposit", state.min_deposit),
        ("minWithdraw", state.min_withdraw),
        ("minStake", state.min_stake),
        ("stakingSolCap", state.staking_sol_cap),
        ("emergencyCoolingDown", state.emergency_cooling_down),
        ("delayedUnstakeCoolingDown", state.delayed_unstake_cooling_down),
        ("rentExemptForTokenAcc", state.rent_exempt_for_token_acc),
    ];
    for (name, value) in amounts {
        let node = bn(&mut graph, value);
        graph.set_field(account, name, node);
    }
    let stake_count = graph.uint(state.stake_list.count.into());
    graph.set_field(account, "stakeCount", stake_count);
    let validator_count = graph.uint(state.validator_list.count.into());
    graph.set_field(account, "validatorCount", validator_count);
    let score = graph.uint(state.total_validator_score.into());
    graph.set_field(account, "totalValidatorScore", score);
    let auto_add = graph.bool(state.auto_add_validator_enabled);
    graph.set_field(account, "autoAddValidatorEnabled", auto_add);

    let liq_pool = graph.object(None);
    let lp_target = bn(&mut graph, state.liq_pool.lp_liquidity_target);
    graph.set_field(liq_pool, "lpLiquidityTarget", lp_target);
    let lp_supply = bn(&mut graph, state.liq_pool.lp_supply);
    graph.set_field(liq_pool, "lpSupply", lp_supply);
    let lent = bn(&mut graph, state.liq_pool.lent_from_sol_leg);
    graph.set_field(liq_pool, "lentFromSolLeg", lent);
    let cap = bn(&mut graph, state.liq_pool.liquidity_sol_cap);
    graph.set_field(liq_pool, "liquiditySolCap", cap);
    for (name, bp) in [
        ("lpMaxFeeBp", state.liq_pool.lp_max_fee_bp),
        ("lpMinFeeBp", state.liq_pool.lp_min_fee_bp),
        ("treasuryCutBp", state.liq_pool.treasury_cut_bp),
    ] {
        let node = graph.uint(bp.into());
        graph.set_field(liq_pool, name, node);
    }
    graph.set_field(account, "liqPool", liq_pool);
    graph.set_field(root, "state", account);

    let config = graph.object(Some("MarinadeConfig"));
    let program_id = key(&mut graph, &MARINADE_PROGRAM_ID);
    graph.set_field(config, "marinadeFinanceProgramId", program_id);
    let state_address = key(&mut graph, &state.address);
    graph.set_field(config, "marinadeStateAddress", state_address);
    let cluster = graph.string(network.as_str());
    graph.set_field(config, "cluster", cluster);

    let marinade = graph.object(Some("Marinade"));
    graph.set_field(marinade, "config", config);
    graph.set_field(marinade, "state", root);
    for method in ["deposit", "liquidUnstake", "getMarinadeState"] {
        let function = graph.function(method);
        graph.set_field(marinade, method, function);
    }
    graph.set_field(root, "marinade", marinade);

    (graph, root)
}
