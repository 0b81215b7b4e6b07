//! CLI commands for the staking claim engine
//!
//! Implements all command handlers for the CLI interface. Every byte-valued
//! argument and output is hex.

use crate::claim::{access_key, ClaimData, ClaimStatus};
use crate::crypto::{combine_signatures, KeyPair};
use crate::engine::{ClaimInput, InitParams, Operation, OperationKind, StakingClaim};
use crate::storage::{Storage, StorageConfig};
use alloy_primitives::{Address, Selector, B256, U256};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub engine: StakingClaim,
    pub storage: Storage,
    pub data_dir: PathBuf,
    /// When the loaded snapshot was written
    pub saved_at: DateTime<Utc>,
}

impl AppState {
    /// Load the engine from the data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = Storage::new(storage_config(&data_dir))?;

        if !storage.exists() {
            return Err(format!(
                "No engine found at {:?}. Run `staking-claim init` first",
                data_dir
            )
            .into());
        }

        let snapshot = storage.load()?;
        Ok(Self {
            engine: snapshot.engine,
            storage,
            data_dir,
            saved_at: snapshot.saved_at,
        })
    }

    /// Save the current state
    pub fn save(&mut self) -> CliResult<()> {
        self.saved_at = self.storage.save(&self.engine)?;
        Ok(())
    }
}

fn storage_config(data_dir: &Path) -> StorageConfig {
    StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    }
}

// =============================================================================
// Argument parsing
// =============================================================================

/// Parse hex bytes, `0x` prefix optional
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    Ok(hex::decode(stripped)?)
}

/// Accept an operation name (`createClaimData`) or a raw 4-byte hex selector
pub fn parse_selector(input: &str) -> CliResult<Selector> {
    match OperationKind::from_name(input) {
        Some(kind) => Ok(kind.selector()),
        None => Ok(input.parse()?),
    }
}

/// Parse a batch entry of the form `claimant:timestamp:amount`
pub fn parse_claim_entry(entry: &str) -> CliResult<ClaimInput> {
    let parts: Vec<&str> = entry.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("Expected claimant:timestamp:amount, got {:?}", entry).into());
    }
    let claimant: Address = parts[0].parse()?;
    let timestamp: u64 = parts[1].parse()?;
    let amount: U256 = parts[2].parse()?;
    Ok(ClaimInput::new(claimant, timestamp, amount)?)
}

// =============================================================================
// Commands
// =============================================================================

/// Initialize a new engine
pub fn cmd_init(data_dir: &Path, params: InitParams, force: bool) -> CliResult<()> {
    let storage = Storage::new(storage_config(data_dir))?;

    if storage.exists() && !force {
        println!("⚠️  Engine already initialized at {:?}", data_dir);
        println!("   Use --force to reinitialize (this will delete existing state)");
        return Ok(());
    }

    let engine = StakingClaim::initialize(params)?;
    storage.save(&engine)?;

    println!("✅ Engine initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🔗 Chain id: {}", engine.domain().chain_id);
    println!("   🏛️  Instance: {}", engine.domain().verifying_contract);
    println!("   🪙 Base token: {}", engine.get_base_token());
    println!("   🧾 Domain separator: {}", engine.domain_separator());
    for owner in engine.get_owners() {
        println!("   👤 Owner: {}", owner);
    }

    Ok(())
}

/// Generate a fresh signer key
pub fn cmd_keygen() -> CliResult<()> {
    let key_pair = KeyPair::generate();

    println!("🔐 New key pair");
    println!("   📍 Address: {}", key_pair.address());
    println!("   🔑 Public key: 0x{}", key_pair.public_key_hex());
    println!("   🗝️  Private key: 0x{}", key_pair.private_key_hex());
    println!("\n   ⚠️  Keep the private key offline; anyone holding it can co-sign.");

    Ok(())
}

/// Derive the access key of a claim
pub fn cmd_access_key(claimant: &str, timestamp: u64, amount: &str) -> CliResult<()> {
    let claimant: Address = claimant.parse()?;
    let amount: U256 = amount.parse()?;
    println!("{}", access_key(&claimant, timestamp, amount)?);
    Ok(())
}

/// Print the selector and ABI input data of an operation
pub fn cmd_encode(operation: &Operation) -> CliResult<()> {
    println!("🧩 {}", operation.kind().signature());
    println!("   Selector: {}", operation.selector());
    println!("   Input:    0x{}", hex::encode(operation.encode_input()));
    Ok(())
}

/// Digest owners must sign for the current nonce
pub fn cmd_digest(state: &AppState, selector: &str, input: &str) -> CliResult<()> {
    let selector = parse_selector(selector)?;
    let input = parse_hex(input)?;
    let nonce = state.engine.get_nonce(&selector);

    println!("📝 Digest for {} at nonce {}", selector, nonce);
    println!("   {}", state.engine.hash_typed_call(selector, &input));
    Ok(())
}

/// Sign a digest with a private key
pub fn cmd_sign(private_key: &str, digest: &str) -> CliResult<()> {
    let key_pair = KeyPair::from_private_key_hex(private_key)?;
    let digest: B256 = digest.parse()?;

    println!("0x{}", hex::encode(key_pair.sign_digest(&digest)));
    Ok(())
}

/// Relay a signed call to the engine
pub fn cmd_execute(
    state: &mut AppState,
    caller: &str,
    selector: &str,
    input: &str,
    signatures: &[String],
) -> CliResult<()> {
    let caller: Address = caller.parse()?;
    let selector = parse_selector(selector)?;
    let input = parse_hex(input)?;
    let blob = signature_blob(signatures)?;

    let receipt = state.engine.execute(caller, selector, &input, &blob)?;
    state.save()?;

    println!("✅ Executed {} (nonce {})", receipt.selector, receipt.nonce);
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}

/// Attempt a direct call, bypassing the dispatcher
pub fn cmd_call(state: &AppState, caller: &str, selector: &str, input: &str) -> CliResult<()> {
    let caller: Address = caller.parse()?;
    let selector = parse_selector(selector)?;
    let input = parse_hex(input)?;

    state.engine.call(caller, selector, &input)?;
    Ok(())
}

/// Show the current nonce of an operation
pub fn cmd_nonce(state: &AppState, selector: &str) -> CliResult<()> {
    let selector = parse_selector(selector)?;
    println!("{}", state.engine.get_nonce(&selector));
    Ok(())
}

/// List the current owners
pub fn cmd_owners(state: &AppState) -> CliResult<()> {
    println!("👥 Owners:");
    for (i, owner) in state.engine.get_owners().iter().enumerate() {
        println!("   {}. {}", i + 1, owner);
    }
    Ok(())
}

/// Show one claim record, or every record of a claimant when no key is given
pub fn cmd_claim(state: &AppState, claimant: &str, key: Option<&str>) -> CliResult<()> {
    let claimant: Address = claimant.parse()?;

    if let Some(key) = key {
        let key: B256 = key.parse()?;
        print_claim(&claimant, &key, &state.engine.get_claim_data(&claimant, &key));
        return Ok(());
    }

    let records = state.engine.claims().claims_for(&claimant);
    if records.is_empty() {
        println!("📭 No claims for {}", claimant);
    }
    for (key, data) in &records {
        print_claim(&claimant, key, data);
    }
    Ok(())
}

fn print_claim(claimant: &Address, key: &B256, data: &ClaimData) {
    println!("🎟️  Claim {} for {}", key, claimant);
    println!("   ├─ Amount: {}", data.amount);
    println!(
        "   └─ Status: {}",
        match data.status {
            ClaimStatus::Unclaimed => "unclaimed",
            ClaimStatus::Claimed => "claimed",
        }
    );
}

/// Display engine information
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let engine = &state.engine;
    let stats = state.storage.stats()?;

    println!("📊 StakingClaim Info");
    println!("   ├─ Chain id: {}", engine.domain().chain_id);
    println!("   ├─ Instance: {}", engine.domain().verifying_contract);
    println!("   ├─ Domain separator: {}", engine.domain_separator());
    println!("   ├─ Admin: {}", engine.get_admin());
    println!("   ├─ Base token: {}", engine.get_base_token());
    println!("   ├─ Claims: {}", engine.claims().len());
    for kind in OperationKind::ALL {
        println!(
            "   ├─ {} ({}): nonce {}",
            kind,
            kind.selector(),
            engine.get_nonce(&kind.selector())
        );
    }
    println!(
        "   ├─ Last saved: {}",
        state.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "   └─ State file: {} bytes, {} backup(s) in {:?}",
        stats.file_size, stats.backup_count, stats.data_dir
    );
    Ok(())
}

/// Recover the signers of a signature blob
pub fn cmd_recover(state: &AppState, digest: &str, signatures: &[String]) -> CliResult<()> {
    let digest: B256 = digest.parse()?;
    let blob = signature_blob(signatures)?;

    for signer in state.engine.recover_signer(&digest, &blob)? {
        let marker = if state.engine.is_owner(&signer) {
            "owner"
        } else {
            "not an owner"
        };
        println!("   {} ({})", signer, marker);
    }
    Ok(())
}

/// Combine one or more hex signatures (each may already be a combined blob)
fn signature_blob(signatures: &[String]) -> CliResult<Vec<u8>> {
    let parts = signatures
        .iter()
        .map(|s| parse_hex(s))
        .collect::<CliResult<Vec<_>>>()?;
    Ok(combine_signatures(&parts))
}
