use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use std::io::{self, Read};
use std::str::FromStr;
use zeroize::Zeroizing;

use cryptovault::balances::{lamports_to_sol, BalanceProvider, SolanaRpcClient};
use cryptovault::price::{CoinGeckoClient, PriceTracker};
use cryptovault::session::{run_interactive, Osc52Clipboard, Session};
use cryptovault::types::{BalanceReport, DerivedBundle};
use cryptovault::utils::logging;
use cryptovault::wallet::{self, MnemonicPolicy, MnemonicStrength};
use cryptovault::{log_debug, Network, VaultConfig, VaultError};

/// Solana wallet generator.
#[derive(Parser)]
#[command(name = "cryptovault")]
#[command(about = "Generate BIP-39 seed phrases and derive Solana wallets (m/44'/501'/n')")]
#[command(version)]
struct Cli {
    /// Cluster for balance lookups (devnet or mainnet).
    #[arg(long, global = true)]
    network: Option<Network>,

    /// RPC endpoint for the selected network (overrides provider defaults).
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Print debug logs to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (default).
    Interactive {
        /// Accept existing phrases whose checksum does not match.
        #[arg(long)]
        lenient: bool,
    },

    /// Generate a new secret phrase and its first wallets.
    Generate {
        /// Phrase length: 12, 15, 18, 21 or 24 words.
        #[arg(long, default_value = "12")]
        words: usize,

        /// Number of wallets to derive.
        #[arg(long, default_value = "1")]
        accounts: u32,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Derive wallets from an existing secret phrase.
    Derive {
        /// The phrase (visible in shell history; prefer --stdin).
        #[arg(long, conflicts_with = "stdin", required_unless_present = "stdin")]
        phrase: Option<String>,

        /// Read the phrase from standard input.
        #[arg(long)]
        stdin: bool,

        /// Number of wallets to derive.
        #[arg(long, default_value = "1")]
        accounts: u32,

        /// First account index.
        #[arg(long, default_value = "0")]
        start: u32,

        /// Accept a phrase whose checksum does not match.
        #[arg(long)]
        lenient: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Look up the balance of one address.
    Balance {
        /// Base58 Solana address.
        #[arg(long)]
        address: String,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the SOL reference price in USD.
    Price {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn policy(lenient: bool) -> MnemonicPolicy {
    if lenient {
        MnemonicPolicy::Lenient
    } else {
        MnemonicPolicy::Strict
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<VaultConfig> {
    let mut config = VaultConfig::from_env().context("invalid configuration")?;
    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(ref url) = cli.rpc_url {
        config.set_rpc_override(config.network, url.trim());
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn price_tracker(config: &VaultConfig) -> anyhow::Result<PriceTracker> {
    let provider = CoinGeckoClient::new(config)?;
    Ok(PriceTracker::from_config(Box::new(provider), config))
}

fn print_bundle(bundle: &DerivedBundle, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(bundle)?);
        return Ok(());
    }

    println!("Secret phrase ({} words):", bundle.word_count);
    println!("  {}", bundle.mnemonic);
    println!();
    println!("WARNING: Anyone with this phrase controls every wallet derived from it.");
    for wallet in &bundle.wallets {
        println!();
        println!("Wallet #{}  {}", wallet.index, wallet.path);
        println!("  Public key:  {}", wallet.address);
        println!("  Private key: {}", wallet.private_key_base58);
    }
    Ok(())
}

fn interactive(config: &VaultConfig, lenient: bool) -> anyhow::Result<()> {
    let balances = SolanaRpcClient::new(config)?;
    let clipboard = Osc52Clipboard::stdout();
    let mut session = Session::new(Box::new(balances), price_tracker(config)?, Box::new(clipboard))
        .with_network(config.network)
        .with_policy(policy(lenient));

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_interactive(&mut session, stdin.lock(), stdout.lock())?;
    Ok(())
}

fn generate(words: usize, accounts: u32, json: bool) -> anyhow::Result<()> {
    let strength = MnemonicStrength::from_word_count(words)?;
    let (phrase, mut registry) = wallet::create_new_wallet(strength)?;
    let bundle = wallet::derive_bundle(&phrase, &mut registry, accounts)?;
    print_bundle(&bundle, json)
}

fn derive(phrase: Option<String>, stdin: bool, accounts: u32, start: u32, lenient: bool, json: bool) -> anyhow::Result<()> {
    let text = match phrase {
        Some(text) => Zeroizing::new(text),
        None if stdin => {
            let mut buf = Zeroizing::new(String::new());
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read phrase from stdin")?;
            buf
        }
        None => bail!("provide --phrase or --stdin"),
    };

    let (phrase, mut registry) = wallet::restore_from_phrase(&text, policy(lenient), start)?;
    let bundle = wallet::derive_bundle(&phrase, &mut registry, accounts)?;
    print_bundle(&bundle, json)
}

fn balance(config: &VaultConfig, address: &str, json: bool) -> anyhow::Result<()> {
    Pubkey::from_str(address)
        .map_err(|e| VaultError::invalid_address(format!("Not a Solana address: {}", e)))?;

    let client = SolanaRpcClient::new(config)?;
    log_debug!("main", "Fetching balance", network = config.network, endpoint = client.endpoint(config.network));
    let lamports = client.get_balance(address, config.network)?;
    let sol = lamports_to_sol(lamports);
    let quote = price_tracker(config)?.current();

    let report = BalanceReport {
        network: config.network,
        address: address.to_string(),
        lamports,
        sol,
        usd: Some(sol * quote.usd),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} {}", report.network.badge(), report.address);
        println!("  {:.6} SOL ≈ ${:.2} USD", report.sol, sol * quote.usd);
    }
    Ok(())
}

fn price(config: &VaultConfig, json: bool) -> anyhow::Result<()> {
    let quote = price_tracker(config)?.current();
    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
    } else if quote.is_fallback {
        println!("SOL ≈ ${:.2} USD (fallback; price provider unavailable)", quote.usd);
    } else {
        println!("SOL ≈ ${:.2} USD", quote.usd);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        logging::enable_debug();
    }
    let config = load_config(&cli)?;

    match cli.command {
        None => interactive(&config, false),
        Some(Commands::Interactive { lenient }) => interactive(&config, lenient),
        Some(Commands::Generate { words, accounts, json }) => generate(words, accounts, json),
        Some(Commands::Derive {
            phrase,
            stdin,
            accounts,
            start,
            lenient,
            json,
        }) => derive(phrase, stdin, accounts, start, lenient, json),
        Some(Commands::Balance { address, json }) => balance(&config, &address, json),
        Some(Commands::Price { json }) => price(&config, json),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
