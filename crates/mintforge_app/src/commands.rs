//! Command implementations.

use std::time::Duration;

use anyhow::{Context, Result, bail};

use mintforge_chains::{ChainSpec, RpcSelection, find_by_short_name, mainnets, registry, testnets};
use mintforge_contracts::Compiler;
use mintforge_contracts::validate::{NftParams, TokenParams};
use mintforge_core::{MintforgeConfig, SecretStore};
use mintforge_deploy::{
    ContractRegistry, DeployOptions, DeployRequest, Deployer, Deployment,
};
use mintforge_rpc::{
    ChainStats, RpcClient, StatsPoller, WalletSession, fetch_stats, find_best_rpc, probe_chain,
};
use mintforge_services::{ApiConfig, ApiServer, AppState, PinningClient};

use crate::cli::{
    ChainArg, ChainsArgs, ContractsArgs, DeployNftArgs, DeployTokenArgs, SecretSetArgs, ServeArgs,
    StatsArgs, TargetArgs,
};

fn resolve_chain(short_name: &str) -> Result<&'static ChainSpec> {
    find_by_short_name(short_name).with_context(|| {
        format!(
            "unknown chain '{short_name}'; run `mintforge chains` to list supported networks"
        )
    })
}

/// Resolve the endpoint to talk to: an explicit `--rpc-url` wins, then the
/// config override (validated through the selection store), then the
/// registry's primary URL.
fn resolve_rpc_url(
    config: &MintforgeConfig,
    spec: &ChainSpec,
    target: &TargetArgs,
) -> Result<String> {
    if let Some(url) = &target.rpc_url {
        return Ok(url.clone());
    }

    let mut selection = RpcSelection::new();
    if let Some(url) = config.rpc_override(spec.chain.short_name()) {
        selection
            .set_custom(spec.chain, url.to_string())
            .with_context(|| {
                format!(
                    "invalid rpc_overrides entry for '{}' in config.json",
                    spec.chain.short_name()
                )
            })?;
    }
    Ok(selection.url(spec.chain).to_string())
}

pub async fn serve(config: MintforgeConfig, args: ServeArgs) -> Result<()> {
    let secrets = SecretStore::open()?;
    let tokens = secrets.pinning_tokens();
    if tokens.is_empty() {
        eprintln!(
            "warning: no pinning credentials configured; /ipfs/upload will fail \
             (set MINTFORGE_PINNING_JWT or store pinning_token_primary)"
        );
    }

    let state = AppState {
        compiler: Compiler::new(config.solc_path.clone()),
        pinning: PinningClient::new(
            config.pinning_api_url.clone(),
            config.pinning_gateway_url.clone(),
            tokens,
        )?,
    };

    let listen_addr = match args.bind {
        Some(addr) => addr,
        None => config
            .bind_addr
            .parse()
            .with_context(|| format!("invalid bind_addr in config: {}", config.bind_addr))?,
    };

    ApiServer::new(ApiConfig { listen_addr }, state).serve().await
}

async fn run_deployment(
    config: &MintforgeConfig,
    target: &TargetArgs,
    request: DeployRequest,
    auto_mint_first_nft: bool,
) -> Result<Deployment> {
    let spec = resolve_chain(&target.chain)?;
    let rpc_url = resolve_rpc_url(config, spec, target)?;

    println!("Deploying to {} via {rpc_url}", spec.display_name);

    let compiler = Compiler::new(config.solc_path.clone());
    let artifact = match &request {
        DeployRequest::Token(params) => compiler.compile_token(params.clone()).await?,
        DeployRequest::Nft(params) => compiler.compile_nft(params.clone()).await?,
    };
    println!(
        "Compiled {} ({} bytecode chars, {} warnings)",
        artifact.contract_name,
        artifact.bytecode.len(),
        artifact.warnings.len()
    );

    let mut session = WalletSession::new(RpcClient::new(rpc_url)?);
    let account = session.connect().await?;
    println!("Wallet connected: {account}");

    let options = DeployOptions {
        poll_interval: Duration::from_secs(config.receipt_poll_interval_secs),
        max_poll_attempts: config.receipt_max_attempts,
        simulate: !target.skip_simulation,
        auto_mint_first_nft,
        ..Default::default()
    };

    let mut deployer = Deployer::new(session, spec.chain, options);
    let deployment = match deployer.deploy(&artifact, request.clone()).await {
        Ok(deployment) => deployment,
        Err(e) => {
            if let Some(hint) = e.hint() {
                eprintln!("hint: {hint}");
            }
            return Err(e.into());
        }
    };

    let registry_path = MintforgeConfig::registry_path()?;
    let mut contracts = ContractRegistry::load_from_file(&registry_path)?;
    contracts.record(
        deployment.contract_address.clone(),
        request.kind(),
        request.name().to_string(),
        request.symbol().to_string(),
        spec.chain,
        deployment.tx_hash.clone(),
    );
    contracts.save_to_file(&registry_path)?;

    println!("Deployment successful");
    println!("  contract: {}", deployment.contract_address);
    println!("  tx:       {}", deployment.tx_hash);
    if let Some(gas) = deployment.gas_used {
        println!("  gas used: {gas}");
    }
    println!("  explorer: {}", deployment.explorer_address_url);
    if let Some(mint_tx) = &deployment.mint_tx_hash {
        println!("  mint tx:  {mint_tx}");
    }

    Ok(deployment)
}

pub async fn deploy_token(config: MintforgeConfig, args: DeployTokenArgs) -> Result<()> {
    let request = DeployRequest::Token(TokenParams {
        name: args.name,
        symbol: args.symbol,
        initial_supply: args.supply,
    });
    run_deployment(&config, &args.target, request, false).await?;
    Ok(())
}

pub async fn deploy_nft(config: MintforgeConfig, args: DeployNftArgs) -> Result<()> {
    let request = DeployRequest::Nft(NftParams {
        name: args.name,
        symbol: args.symbol,
        base_uri: args.base_uri,
    });
    run_deployment(&config, &args.target, request, args.mint_first).await?;
    Ok(())
}

pub fn chains(args: ChainsArgs) -> Result<()> {
    let specs = if args.testnets {
        testnets()
    } else if args.mainnets {
        mainnets()
    } else {
        registry().iter().collect()
    };

    for spec in specs {
        let kind = if spec.chain.is_testnet() {
            "testnet"
        } else {
            "mainnet"
        };
        println!(
            "{:<10} {:>9}  {:<8} {:<24} {}",
            spec.chain.short_name(),
            spec.chain_id,
            kind,
            spec.name,
            spec.rpc_url
        );
        if let Some(faucet) = &spec.faucet_url {
            println!("{:<10} {:>9}  faucet: {faucet}", "", "");
        }
    }
    Ok(())
}

fn print_stats(stats: ChainStats) {
    let spec = mintforge_chains::spec(stats.chain);
    println!("{}", spec.display_name);
    println!("  block height: {}", stats.block_height);
    println!("  gas price:    {:.4} gwei", stats.gas_price_gwei);
    println!("  transactions: {}", stats.formatted_transactions());
}

pub async fn stats(args: StatsArgs) -> Result<()> {
    let spec = resolve_chain(&args.chain)?;

    // Prefer the fastest healthy endpoint; fall back to the registry primary.
    let url = match find_best_rpc(spec).await {
        Some(health) => health.url,
        None => spec.rpc_url.clone(),
    };
    let client = RpcClient::new(url)?;

    if args.watch {
        let poller = StatsPoller::new(Duration::from_secs(args.interval));
        poller.run(&client, spec, print_stats).await;
        return Ok(());
    }

    let stats = fetch_stats(&client, spec).await?;
    print_stats(stats);
    Ok(())
}

pub async fn health(args: ChainArg) -> Result<()> {
    let spec = resolve_chain(&args.chain)?;
    let results = probe_chain(spec).await;

    let mut any_healthy = false;
    for result in &results {
        let status = if result.healthy { "ok " } else { "FAIL" };
        any_healthy |= result.healthy;
        print!("{status} {:>5}ms  {}", result.latency_ms, result.url);
        match (&result.error, result.block_number) {
            (Some(error), _) => println!("  ({error})"),
            (None, Some(block)) => println!("  (block {block})"),
            (None, None) => println!(),
        }
    }

    if !any_healthy {
        bail!("no healthy RPC endpoints for {}", spec.name);
    }
    Ok(())
}

pub fn secrets_set(args: SecretSetArgs) -> Result<()> {
    let value = match args.value {
        Some(value) => value,
        None => {
            eprintln!("Enter value for {}:", args.name);
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("failed to read value from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let store = SecretStore::open()?;
    store.set(&args.name, &value)?;
    if value.is_empty() {
        println!("removed {}", args.name);
    } else {
        println!("stored {}", args.name);
    }
    Ok(())
}

pub fn secrets_list() -> Result<()> {
    let store = SecretStore::open()?;
    for key in mintforge_core::secrets::PINNING_TOKEN_KEYS {
        let status = if store.get(key).is_some() { "set" } else { "-" };
        println!("{status:<4} {key}");
    }
    Ok(())
}

pub fn contracts(args: ContractsArgs) -> Result<()> {
    let registry_path = MintforgeConfig::registry_path()?;
    let contracts = ContractRegistry::load_from_file(&registry_path)?;

    let records: Vec<_> = match &args.chain {
        Some(short_name) => {
            let spec = resolve_chain(short_name)?;
            contracts.contracts_for(spec.chain_id).iter().collect()
        }
        None => contracts.all(),
    };

    if records.is_empty() {
        println!("no deployments recorded");
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {:<5} {:<12} {:<12} {}",
            record.deployed_at.format("%Y-%m-%d %H:%M"),
            record.symbol,
            format!("{:?}", record.contract_type).to_lowercase(),
            record.chain.short_name(),
            record.address
        );
    }
    Ok(())
}
