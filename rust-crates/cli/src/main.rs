use color_eyre::eyre::{
    Result,
    eyre,
};
use wager_client::config::{
    DEFAULT_RELAY_URL,
    DEFAULT_RPC_URL,
};
use wager_client::view::Pager;
use wager_client::{
    AppConfig,
    Signer,
};

mod client;
mod wallets;

use client::{
    AppController,
    Command,
};

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: wager-cli [flags] <command>\n\
         \n\
         Commands:\n\
           lobby                                     List the current page of wagers\n\
           wager <id>                                Show one wager in full\n\
           profile <address>                         Stats and wager history for an address\n\
           leaderboard                               Ranked players for the current page\n\
           stats                                     Global contract statistics\n\
           create <prediction> <stake> <deadline> <category> <criteria-url>\n\
           accept <id> <stake>\n\
           verify <id> <evidence-url>\n\
           appeal <id> <reason> <evidence-url>\n\
           resolve <id>\n\
           wallet new <name> | wallet list\n\
         \n\
         Flags:\n\
           --relay-url <url>    Relay base URL (env WAGER_RELAY_URL, default {DEFAULT_RELAY_URL})\n\
           --rpc-url <url>      Chain RPC URL (env WAGER_RPC_URL, default {DEFAULT_RPC_URL})\n\
           --contract <addr>    Wager contract address (env WAGER_CONTRACT_ADDRESS)\n\
           --wallet <name>      Keystore wallet to sign writes with\n\
           --wallet-dir <path>  Override wallet directory (defaults to ~/.wager/wallets)\n\
           --offset <n>         Page offset (default 0)\n\
           --limit <n>          Page size (default 8)\n\
           --filter <f>         Lobby filter: all|waiting|active|verified|resolved"
    );
    std::process::exit(0);
}

struct CliArgs {
    config: AppConfig,
    page: Pager,
    wallet: Option<String>,
    wallet_dir: Option<String>,
    command: Command,
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_cli_args() -> Result<CliArgs> {
    let mut relay_url = env_or("WAGER_RELAY_URL", DEFAULT_RELAY_URL);
    let mut rpc_url = env_or("WAGER_RPC_URL", DEFAULT_RPC_URL);
    let mut contract = env_or("WAGER_CONTRACT_ADDRESS", "");
    let mut wallet: Option<String> = None;
    let mut wallet_dir: Option<String> = None;
    let mut offset: u64 = 0;
    let mut limit: u64 = 8;
    let mut filter = "all".to_string();
    let mut positionals: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--relay-url" => relay_url = expect_value(&mut args, "--relay-url")?,
            "--rpc-url" => rpc_url = expect_value(&mut args, "--rpc-url")?,
            "--contract" => contract = expect_value(&mut args, "--contract")?,
            "--wallet" => wallet = Some(expect_value(&mut args, "--wallet")?),
            "--wallet-dir" => wallet_dir = Some(expect_value(&mut args, "--wallet-dir")?),
            "--offset" => {
                offset = expect_value(&mut args, "--offset")?
                    .parse()
                    .map_err(|_| eyre!("--offset expects a number"))?;
            }
            "--limit" => {
                limit = expect_value(&mut args, "--limit")?
                    .parse()
                    .map_err(|_| eyre!("--limit expects a number"))?;
            }
            "--filter" => filter = expect_value(&mut args, "--filter")?,
            "--help" | "-h" => print_usage_and_exit(),
            other if other.starts_with("--") => {
                return Err(eyre!("Unknown flag: {other}"));
            }
            _ => positionals.push(arg),
        }
    }

    let command = parse_command(&positionals, &filter)?;
    let mut page = Pager::new(limit);
    page.offset = offset;

    Ok(CliArgs {
        config: AppConfig::new(relay_url, rpc_url, contract),
        page,
        wallet,
        wallet_dir,
        command,
    })
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next().ok_or_else(|| eyre!("{flag} expects a value"))
}

fn parse_command(positionals: &[String], filter: &str) -> Result<Command> {
    let mut words = positionals.iter().map(String::as_str);
    let command = match words.next() {
        Some(word) => word,
        None => print_usage_and_exit(),
    };
    let rest: Vec<&str> = words.collect();

    let arity = |expected: usize, shape: &str| -> Result<()> {
        if rest.len() == expected {
            Ok(())
        } else {
            Err(eyre!("Usage: wager-cli {command} {shape}"))
        }
    };

    match command {
        "lobby" => {
            arity(0, "")?;
            Ok(Command::Lobby {
                filter: filter.parse()?,
            })
        }
        "wager" => {
            arity(1, "<id>")?;
            Ok(Command::Wager {
                id: rest[0].to_string(),
            })
        }
        "profile" => {
            arity(1, "<address>")?;
            Ok(Command::Profile {
                address: rest[0].to_string(),
            })
        }
        "leaderboard" => {
            arity(0, "")?;
            Ok(Command::Leaderboard)
        }
        "stats" => {
            arity(0, "")?;
            Ok(Command::Stats)
        }
        "create" => {
            arity(5, "<prediction> <stake> <deadline> <category> <criteria-url>")?;
            Ok(Command::Create {
                prediction: rest[0].to_string(),
                stake: parse_stake(rest[1])?,
                deadline: rest[2].to_string(),
                category: rest[3].to_string(),
                criteria: rest[4].to_string(),
            })
        }
        "accept" => {
            arity(2, "<id> <stake>")?;
            Ok(Command::Accept {
                id: rest[0].to_string(),
                stake: parse_stake(rest[1])?,
            })
        }
        "verify" => {
            arity(2, "<id> <evidence-url>")?;
            Ok(Command::Verify {
                id: rest[0].to_string(),
                evidence: rest[1].to_string(),
            })
        }
        "appeal" => {
            arity(3, "<id> <reason> <evidence-url>")?;
            Ok(Command::Appeal {
                id: rest[0].to_string(),
                reason: rest[1].to_string(),
                evidence: rest[2].to_string(),
            })
        }
        "resolve" => {
            arity(1, "<id>")?;
            Ok(Command::Resolve {
                id: rest[0].to_string(),
            })
        }
        "wallet" => match rest.as_slice() {
            ["new", name] => Ok(Command::WalletNew {
                name: name.to_string(),
            }),
            ["list"] => Ok(Command::WalletList),
            _ => Err(eyre!("Usage: wager-cli wallet new <name> | wallet list")),
        },
        other => Err(eyre!("Unknown command: {other}")),
    }
}

fn parse_stake(raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| eyre!("Stake must be a whole number, got {raw:?}"))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = parse_cli_args()?;
    let wallet_dir = wallets::resolve_wallet_dir(cli.wallet_dir.as_deref())?;

    match &cli.command {
        Command::WalletNew { name } => {
            let (descriptor, address) = wallets::create_wallet(&wallet_dir, name)?;
            println!("Created wallet '{}' at {}", descriptor.name, descriptor.path.display());
            println!("Address: {address}");
            return Ok(());
        }
        Command::WalletList => {
            let entries = wallets::list_wallets(&wallet_dir)?;
            if entries.is_empty() {
                println!("No wallets in {}", wallet_dir.display());
            }
            for entry in entries {
                println!("{}  ({})", entry.name, entry.path.display());
            }
            return Ok(());
        }
        _ => {}
    }

    let signer = if cli.command.requires_wallet() {
        let name = cli
            .wallet
            .as_deref()
            .ok_or_else(|| eyre!("--wallet <name> is required for this command"))?;
        let descriptor = wallets::find_wallet(&wallet_dir, name)?;
        let signer = wallets::unlock_wallet(&descriptor)?;
        tracing::info!(address = signer.address(), "wallet unlocked");
        Some(signer)
    } else {
        None
    };

    let controller = AppController::new(&cli.config, cli.page)?;
    controller.run(cli.command, signer).await
}
