//! CLI argument definitions.

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mintforge",
    version,
    about = "Compile and deploy token contracts across EVM networks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API (compile, IPFS upload, receipt, and stats endpoints).
    Serve(ServeArgs),
    /// Compile a template and deploy it through the wallet endpoint.
    #[command(subcommand)]
    Deploy(DeployTemplate),
    /// List the supported networks.
    Chains(ChainsArgs),
    /// Fetch live statistics for a network.
    Stats(StatsArgs),
    /// Probe a network's RPC endpoints and report latency.
    Health(ChainArg),
    /// List contracts deployed from this machine.
    Contracts(ContractsArgs),
    /// Manage encrypted pinning credentials.
    #[command(subcommand)]
    Secrets(SecretsCommand),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Bind address; defaults to the configured one.
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Subcommand)]
pub enum DeployTemplate {
    /// Deploy an ERC20 token.
    Token(DeployTokenArgs),
    /// Deploy an ERC721 collection.
    Nft(DeployNftArgs),
}

#[derive(Args)]
pub struct DeployTokenArgs {
    /// Token name, e.g. "My Token".
    #[arg(long)]
    pub name: String,

    /// Ticker symbol (1-11 alphanumeric characters).
    #[arg(long)]
    pub symbol: String,

    /// Whole-token initial supply, minted to the deployer.
    #[arg(long, default_value = "1000000")]
    pub supply: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct DeployNftArgs {
    /// Collection name.
    #[arg(long)]
    pub name: String,

    /// Ticker symbol (1-11 alphanumeric characters).
    #[arg(long)]
    pub symbol: String,

    /// ipfs:// metadata URI baked into the constructor.
    #[arg(long)]
    pub base_uri: String,

    /// Mint token #1 to the deployer after confirmation.
    #[arg(long)]
    pub mint_first: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct TargetArgs {
    /// Target network short name (arc, giwa, base, tempo, megaeth, abstract).
    #[arg(long, default_value = "giwa")]
    pub chain: String,

    /// Wallet-enabled JSON-RPC endpoint. Defaults to the configured override
    /// for the chain, then the registry's public RPC.
    #[arg(long, env = "MINTFORGE_WALLET_RPC")]
    pub rpc_url: Option<String>,

    /// Skip the eth_call dry run before submitting.
    #[arg(long)]
    pub skip_simulation: bool,
}

#[derive(Args)]
pub struct ChainsArgs {
    /// Only test networks.
    #[arg(long, conflicts_with = "mainnets")]
    pub testnets: bool,

    /// Only main networks.
    #[arg(long)]
    pub mainnets: bool,
}

#[derive(Args)]
pub struct ChainArg {
    /// Network short name.
    #[arg(long)]
    pub chain: String,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Network short name.
    #[arg(long)]
    pub chain: String,

    /// Keep polling on a fixed interval instead of exiting after one fetch.
    #[arg(long)]
    pub watch: bool,

    /// Polling interval in seconds for --watch.
    #[arg(long, default_value_t = 10)]
    pub interval: u64,
}

#[derive(Subcommand)]
pub enum SecretsCommand {
    /// Store a secret; the value is read from stdin when --value is omitted.
    Set(SecretSetArgs),
    /// Show which pinning credential slots are populated.
    List,
}

#[derive(Args)]
pub struct SecretSetArgs {
    /// Secret name, e.g. pinning_token_primary.
    pub name: String,

    /// The secret value. An empty value removes the entry.
    #[arg(long)]
    pub value: Option<String>,
}

#[derive(Args)]
pub struct ContractsArgs {
    /// Restrict to one network.
    #[arg(long)]
    pub chain: Option<String>,
}
