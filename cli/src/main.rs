use anyhow::{anyhow, Result};
use ballot_indexer::{
    card::load_card,
    catalog::{CardFilter, VotingCatalog},
    countdown::unix_now,
    intent::DurationUnit,
    paginator::paginate,
    role::resolve_role,
    store::ActivityFilter,
    ActivityKind, Address, Explorer, IndexerConfig, RefreshOutcome, SortOrder, StatusFilter,
    VotingStateReader,
};
use clap::Parser;
use cli::{consts::DEFAULT_RPC_URL, utils::*, JsonRpcClient};
use log::{info, warn};
use serde::Serialize;
use std::time::Duration;
use tokio::runtime::Builder;

#[derive(Clone, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, env, default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    #[arg(short, long, env, value_parser = parse_address)]
    pub contract_address: Address,

    /// Unlocked node account used to sign writes
    #[arg(short, long, env, value_parser = parse_address)]
    pub from_address: Option<Address>,

    /// Lowest block scanned for events. Read from the contract when omitted.
    #[arg(long, env = "DEPLOY_BLOCK")]
    pub floor_block: Option<u64>,

    #[arg(long, env = "LOG_WINDOW_BLOCKS", default_value_t = ballot_indexer::config::DEFAULT_WINDOW_BLOCKS)]
    pub window_blocks: u64,

    #[arg(long, env = "MAX_DISPLAY_EVENTS", default_value_t = ballot_indexer::config::DEFAULT_MAX_DISPLAY)]
    pub max_display: usize,

    #[arg(long, env)]
    pub explorer_url: Option<String>,

    #[arg(long, help = "Print JSON instead of text")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Clone, Debug)]
pub struct FilterArgs {
    #[arg(long, value_parser = parse_activity_kind, help = "created | vote_cast")]
    kind: Option<ActivityKind>,

    #[arg(long, help = "Exact voting id")]
    voting_id: Option<String>,

    #[arg(short, long, help = "Substring match over hash, title, addresses and ids")]
    query: Option<String>,

    #[arg(long, value_parser = parse_sort_order, default_value = "newest")]
    order: SortOrder,

    #[arg(long, default_value_t = 1)]
    page: usize,

    #[arg(long, default_value_t = ballot_indexer::config::DEFAULT_PAGE_SIZE)]
    page_size: usize,
}

impl FilterArgs {
    fn filter(&self) -> ActivityFilter {
        ActivityFilter {
            kind: self.kind,
            voting_id: self.voting_id.clone(),
            query: self.query.clone(),
        }
    }
}

#[derive(clap::Subcommand, Clone)]
pub enum Commands {
    Activity {
        #[command(flatten)]
        filter: FilterArgs,
    },
    Transactions {
        #[command(flatten)]
        filter: FilterArgs,
    },
    Blocks {
        #[arg(long, default_value_t = ballot_indexer::config::DEFAULT_RECENT_BLOCKS)]
        count: usize,
    },
    Stats {},
    Votings {
        #[arg(long, help = "Case-insensitive title search")]
        search: Option<String>,

        #[arg(long, value_parser = parse_status_filter, default_value = "all")]
        status: StatusFilter,

        #[arg(long, value_parser = parse_sort_order, default_value = "newest")]
        order: SortOrder,

        #[arg(long, default_value_t = ballot_indexer::catalog::DEFAULT_VISIBLE)]
        visible: usize,
    },
    Tally {
        #[arg(long, help = "Id of the voting")]
        id: u64,

        #[arg(long, value_parser = parse_address, help = "Report whether this address has voted")]
        viewer: Option<Address>,
    },
    WatchTally {
        #[arg(long, help = "Id of the voting")]
        id: u64,

        #[arg(long, env = "TALLY_POLL_INTERVAL_SECS", default_value_t = 4, help = "Seconds between polls")]
        interval: u64,

        #[arg(long, help = "Stop after this many polls")]
        rounds: Option<u64>,
    },
    /// Show the contract owner and whether an account may create votings
    Role {
        #[arg(long, value_parser = parse_address, help = "Defaults to --from-address")]
        viewer: Option<Address>,
    },
    CreateVoting {
        #[arg(long)]
        title: String,

        #[arg(long, help = "Comma-separated option labels")]
        options: String,

        #[arg(long, default_value_t = 10.0)]
        duration: f64,

        #[arg(long, value_parser = parse_duration_unit, default_value = "minutes", help = "minutes | hours | days | weeks")]
        unit: DurationUnit,
    },
    CastVote {
        #[arg(long, help = "Id of the voting")]
        id: u64,

        #[arg(long, help = "Zero-based option index")]
        option_index: u64,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build an explorer and run one refresh.
async fn refreshed_explorer(cli: &Cli, client: JsonRpcClient) -> Result<Explorer<JsonRpcClient>> {
    let floor_block = match cli.floor_block {
        Some(block) => Some(block),
        None => match client.deployment_block().await {
            Ok(block) => Some(block),
            Err(e) => {
                warn!("Could not read deployment block, scanning without floor: {}", e);
                None
            }
        },
    };
    let config = IndexerConfig {
        window_blocks: cli.window_blocks,
        max_display: cli.max_display,
        ..IndexerConfig::default()
    }
    .with_floor_block(floor_block);

    let explorer = Explorer::new(client, cli.contract_address, config);
    match explorer.refresh().await? {
        RefreshOutcome::Refreshed(summary) => info!(
            "Indexed blocks {}..={}: {} events",
            summary.window.from_block, summary.window.to_block, summary.kept
        ),
        RefreshOutcome::Skipped => {}
    }
    Ok(explorer)
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(false)
        .try_init();

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let cli = Cli::parse();
    let client = JsonRpcClient::new(&cli.rpc_url, cli.contract_address)?;
    let client = match cli.from_address {
        Some(from) => client.with_sender(from),
        None => client,
    };

    runtime.block_on(async move {
        match cli.command.clone() {
            Commands::Activity { filter } => {
                let explorer = refreshed_explorer(&cli, client).await?;
                let records = explorer.store().filter(&filter.filter(), filter.order);
                let page = paginate(
                    &records,
                    filter.page,
                    filter.page_size,
                    explorer.config().page_window,
                );
                if cli.json {
                    print_json(&page)?;
                } else {
                    println!(
                        "{}",
                        render_activity(&page, unix_now(), cli.explorer_url.as_deref())
                    );
                }
            }
            Commands::Transactions { filter } => {
                let explorer = refreshed_explorer(&cli, client).await?;
                let txs = explorer
                    .store()
                    .transactions(&filter.filter(), filter.order);
                let page = paginate(&txs, filter.page, filter.page_size, explorer.config().page_window);
                if cli.json {
                    print_json(&page)?;
                } else {
                    println!("{}", render_transactions(&page, unix_now()));
                }
            }
            Commands::Blocks { count } => {
                let latest = ballot_indexer::LedgerLogReader::block_number(&client).await?;
                let blocks = ballot_indexer::enricher::fetch_recent_blocks(&client, latest, count).await;
                if cli.json {
                    print_json(&blocks)?;
                } else {
                    println!("{}", render_blocks(&blocks));
                }
            }
            Commands::Stats {} => {
                let explorer = refreshed_explorer(&cli, client).await?;
                let stats = explorer.store().stats();
                if cli.json {
                    print_json(&stats)?;
                } else {
                    println!("{}", render_stats(&stats));
                }
            }
            Commands::Votings {
                search,
                status,
                order,
                visible,
            } => {
                let total = client.voting_count().await?;
                let catalog = VotingCatalog::new(total, order).with_visible(visible);
                let filter = CardFilter { search, status };
                let now = unix_now();

                let mut cards = Vec::new();
                for id in catalog.visible_ids() {
                    let summary = client.voting(id).await?;
                    if !filter.matches(&summary, now) {
                        continue;
                    }
                    let mut tally = ballot_indexer::tally::TallyAggregator::new(id, summary.option_count);
                    cards.push(load_card(&client, id, None, &mut tally, now).await?);
                }

                if cli.json {
                    print_json(&cards)?;
                } else {
                    for card in &cards {
                        println!("{}\n", render_card(card));
                    }
                    println!(
                        "showing {} of {} voting(s)",
                        catalog.visible_count(),
                        catalog.total()
                    );
                }
            }
            Commands::Tally { id, viewer } => {
                let summary = client.voting(id).await?;
                let mut tally = ballot_indexer::tally::TallyAggregator::new(id, summary.option_count);
                let card = load_card(&client, id, viewer.as_ref(), &mut tally, unix_now()).await?;
                if cli.json {
                    print_json(&card)?;
                } else {
                    println!("{}", render_card(&card));
                }
            }
            Commands::WatchTally {
                id,
                interval,
                rounds,
            } => {
                let summary = client.voting(id).await?;
                let mut tally = ballot_indexer::tally::TallyAggregator::new(id, summary.option_count);
                let mut round = 0u64;
                loop {
                    let report = ballot_indexer::poller::poll_tally(&client, id, &mut tally).await?;
                    if report.reset || report.changed > 0 || round == 0 {
                        let card = ballot_indexer::card::VotingCard::build(
                            report.summary,
                            client.options(id).await?,
                            &tally,
                            None,
                            unix_now(),
                        );
                        println!("{}\n", render_card(&card));
                    }
                    round += 1;
                    if rounds.is_some_and(|r| round >= r) {
                        break;
                    }
                    tokio::time::sleep(Duration::from_secs(interval.max(1))).await;
                }
            }
            Commands::Role { viewer } => {
                let viewer = viewer
                    .or(cli.from_address)
                    .ok_or_else(|| anyhow!("--viewer or --from-address is required"))?;
                let (owner, role) = resolve_role(&client, &viewer).await?;
                if cli.json {
                    print_json(&serde_json::json!({
                        "owner": owner,
                        "viewer": viewer,
                        "role": role,
                        "can_create": role.can_create(),
                    }))?;
                } else {
                    println!("{}", render_role(&owner, &viewer, role));
                }
            }
            Commands::CreateVoting {
                title,
                options,
                duration,
                unit,
            } => {
                info!("CreateVoting...");
                let sender = cli
                    .from_address
                    .ok_or_else(|| anyhow!("--from-address is required for writes"))?;
                let options = parse_option_list(&options).map_err(|e| anyhow!(e))?;
                let tx_sender = TxSender::new(&client, sender);
                let tx = send_create_voting(&tx_sender, &title, &options, duration, unit).await?;
                info!("Transaction confirmed: {}", tx);
            }
            Commands::CastVote { id, option_index } => {
                info!("CastVote...");
                let sender = cli
                    .from_address
                    .ok_or_else(|| anyhow!("--from-address is required for writes"))?;
                let tx_sender = TxSender::new(&client, sender);
                let tx = send_cast_vote(&tx_sender, id, option_index).await?;
                info!("Transaction confirmed: {}", tx);
                info!("== Voted For Voting {} option {} ==", id, option_index);
            }
        }
        Ok(())
    })
}
