//! StakingClaim CLI Application
//!
//! Owner and relayer tooling for the staking claim multisig engine.

use clap::{Parser, Subcommand};
use staking_claim::cli::{self, AppState};
use staking_claim::core::{Address, Domain};
use staking_claim::engine::{InitParams, Operation};
use staking_claim::multisig::OwnerChange;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "staking-claim")]
#[command(version = "0.1.0")]
#[command(about = "Threshold multisig engine for staking claim records", long_about = None)]
struct Cli {
    /// Data directory for engine state
    #[arg(short, long, default_value = ".staking_claim")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new engine
    Init {
        /// Chain id of the signing domain
        #[arg(long)]
        chain_id: u64,

        /// Address identifying this engine instance
        #[arg(long)]
        verifying_contract: Address,

        /// Upgrade authority of the hosting container
        #[arg(long)]
        admin: Address,

        /// Owner address (exactly three)
        #[arg(long = "owner", num_args = 1, required = true)]
        owners: Vec<Address>,

        /// Ledger the claim amounts are denominated in
        #[arg(long)]
        base_token: Address,

        /// Overwrite an existing engine
        #[arg(long)]
        force: bool,
    },

    /// Generate a signer key pair
    Keygen,

    /// Derive the access key of a claim
    AccessKey {
        #[arg(long)]
        claimant: String,

        #[arg(long)]
        timestamp: u64,

        /// Amount in base-token units (decimal or 0x-hex)
        #[arg(long)]
        amount: String,
    },

    /// Encode an operation's selector and input data
    Encode {
        #[command(subcommand)]
        operation: OperationCommands,
    },

    /// Show the digest owners must sign for the current nonce
    Digest {
        /// Operation name or hex selector
        #[arg(short, long)]
        selector: String,

        /// ABI-encoded input data (hex)
        #[arg(short, long)]
        input: String,
    },

    /// Sign a digest
    Sign {
        /// Private key (hex)
        #[arg(short, long)]
        key: String,

        /// Digest (hex)
        #[arg(long)]
        digest: String,
    },

    /// Relay a signed call
    Execute {
        /// Relaying owner
        #[arg(short, long)]
        caller: String,

        /// Operation name or hex selector
        #[arg(short, long)]
        selector: String,

        /// ABI-encoded input data (hex)
        #[arg(short, long)]
        input: String,

        /// Signature (hex); repeat or pass a combined blob
        #[arg(long = "signature", num_args = 1, required = true)]
        signatures: Vec<String>,
    },

    /// Invoke an operation directly (always refused)
    Call {
        #[arg(short, long)]
        caller: String,

        #[arg(short, long)]
        selector: String,

        #[arg(short, long, default_value = "")]
        input: String,
    },

    /// Show the current nonce of an operation
    Nonce {
        /// Operation name or hex selector
        #[arg(short, long)]
        selector: String,
    },

    /// List the owners
    Owners,

    /// Show a claim record, or all of a claimant's records
    Claim {
        #[arg(long)]
        claimant: String,

        #[arg(long)]
        access_key: Option<String>,
    },

    /// Display engine information
    Info,

    /// Recover the signers of a signature blob
    Recover {
        #[arg(long)]
        digest: String,

        #[arg(long = "signature", num_args = 1, required = true)]
        signatures: Vec<String>,
    },
}

#[derive(Subcommand)]
enum OperationCommands {
    /// createClaimData
    CreateClaim {
        #[arg(long)]
        claimant: String,

        #[arg(long)]
        timestamp: u64,

        #[arg(long)]
        amount: String,
    },

    /// createClaimDataMultiple
    CreateClaims {
        /// Entry as claimant:timestamp:amount (repeatable)
        #[arg(long = "entry", num_args = 1)]
        entries: Vec<String>,
    },

    /// changeOwner
    ChangeOwner {
        #[arg(long)]
        old_owner: Address,

        #[arg(long)]
        new_owner: Address,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::Init {
            chain_id,
            verifying_contract,
            admin,
            owners,
            base_token,
            force,
        } => {
            let owners: [Address; 3] = owners
                .try_into()
                .map_err(|o: Vec<Address>| format!("Expected 3 owners, got {}", o.len()))?;
            let params = InitParams {
                admin,
                owners,
                base_token,
                domain: Domain::new(chain_id, verifying_contract),
            };
            cli::cmd_init(&data_dir, params, force)?;
        }
        Commands::Keygen => {
            cli::cmd_keygen()?;
        }
        Commands::AccessKey {
            claimant,
            timestamp,
            amount,
        } => {
            cli::cmd_access_key(&claimant, timestamp, &amount)?;
        }
        Commands::Encode { operation } => {
            cli::cmd_encode(&build_operation(operation)?)?;
        }
        Commands::Sign { key, digest } => {
            cli::cmd_sign(&key, &digest)?;
        }
        Commands::Digest { selector, input } => {
            let state = AppState::new(data_dir)?;
            cli::cmd_digest(&state, &selector, &input)?;
        }
        Commands::Execute {
            caller,
            selector,
            input,
            signatures,
        } => {
            let mut state = AppState::new(data_dir)?;
            cli::cmd_execute(&mut state, &caller, &selector, &input, &signatures)?;
        }
        Commands::Call {
            caller,
            selector,
            input,
        } => {
            let state = AppState::new(data_dir)?;
            cli::cmd_call(&state, &caller, &selector, &input)?;
        }
        Commands::Nonce { selector } => {
            let state = AppState::new(data_dir)?;
            cli::cmd_nonce(&state, &selector)?;
        }
        Commands::Owners => {
            let state = AppState::new(data_dir)?;
            cli::cmd_owners(&state)?;
        }
        Commands::Claim {
            claimant,
            access_key,
        } => {
            let state = AppState::new(data_dir)?;
            cli::cmd_claim(&state, &claimant, access_key.as_deref())?;
        }
        Commands::Info => {
            let state = AppState::new(data_dir)?;
            cli::cmd_info(&state)?;
        }
        Commands::Recover { digest, signatures } => {
            let state = AppState::new(data_dir)?;
            cli::cmd_recover(&state, &digest, &signatures)?;
        }
    }

    Ok(())
}

fn build_operation(command: OperationCommands) -> cli::CliResult<Operation> {
    let operation = match command {
        OperationCommands::CreateClaim {
            claimant,
            timestamp,
            amount,
        } => Operation::CreateClaimData(cli::parse_claim_entry(&format!(
            "{}:{}:{}",
            claimant, timestamp, amount
        ))?),
        OperationCommands::CreateClaims { entries } => Operation::CreateClaimDataMultiple(
            entries
                .iter()
                .map(|e| cli::parse_claim_entry(e))
                .collect::<cli::CliResult<Vec<_>>>()?,
        ),
        OperationCommands::ChangeOwner {
            old_owner,
            new_owner,
        } => Operation::ChangeOwner(OwnerChange {
            old_owner,
            new_owner,
        }),
    };
    Ok(operation)
}
