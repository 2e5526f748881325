use ballot_indexer::{
    card::VotingCard,
    format::{explorer_link, short_address, short_tx_hash, time_ago, LinkKind},
    paginator::{Page, PageLink},
    store::ActivityStats,
    ActivityEvent, ActivityRecord, Address, BlockSummary, TransactionView, ViewerRole,
};
use chrono::DateTime;
use itertools::Itertools;

fn describe(event: &ActivityEvent) -> String {
    match event {
        ActivityEvent::Created {
            voting_id,
            creator,
            title,
            option_count,
            ..
        } => format!(
            "created #{} {:?} ({} options) by {}",
            voting_id,
            title,
            option_count,
            short_address(creator)
        ),
        ActivityEvent::VoteCast {
            voting_id,
            voter,
            option_index,
        } => format!(
            "vote #{} option {} by {}",
            voting_id,
            option_index + 1,
            short_address(voter)
        ),
    }
}

fn utc(timestamp: Option<u64>) -> String {
    timestamp
        .and_then(|t| DateTime::from_timestamp(t as i64, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "—".to_string())
}

pub fn render_page_links(links: &[PageLink], current: usize) -> String {
    links
        .iter()
        .map(|link| match link {
            PageLink::Page(p) if *p == current => format!("[{}]", p),
            PageLink::Page(p) => p.to_string(),
            PageLink::Gap => "…".to_string(),
        })
        .join(" ")
}

fn footer<T>(page: &Page<T>) -> String {
    format!(
        "page {}/{} ({} items)  {}",
        page.page,
        page.total_pages,
        page.total_items,
        render_page_links(&page.links, page.page)
    )
}

pub fn render_activity(page: &Page<ActivityRecord>, now: u64, explorer: Option<&str>) -> String {
    let mut lines: Vec<String> = page
        .items
        .iter()
        .map(|r| {
            let mut line = format!(
                "{:>9}  {}  {:<18}  {}",
                r.block_number,
                short_tx_hash(&r.tx_hash),
                time_ago(r.timestamp, now),
                describe(&r.event)
            );
            if let Some(link) = explorer_link(explorer, LinkKind::Tx, &r.tx_hash) {
                line.push_str(&format!("  {}", link));
            }
            line
        })
        .collect();
    if lines.is_empty() {
        lines.push("no activity in the indexed window".to_string());
    }
    lines.push(footer(page));
    lines.join("\n")
}

pub fn render_transactions(page: &Page<TransactionView>, now: u64) -> String {
    let mut lines: Vec<String> = page
        .items
        .iter()
        .map(|tx| {
            format!(
                "{}  block {:>9}  {:<18}  {} event(s)  {}",
                short_tx_hash(&tx.tx_hash),
                tx.block_number,
                time_ago(tx.timestamp, now),
                tx.event_count,
                describe(&tx.event)
            )
        })
        .collect();
    if lines.is_empty() {
        lines.push("no transactions in the indexed window".to_string());
    }
    lines.push(footer(page));
    lines.join("\n")
}

pub fn render_blocks(blocks: &[BlockSummary]) -> String {
    if blocks.is_empty() {
        return "no blocks".to_string();
    }
    blocks
        .iter()
        .map(|b| {
            format!(
                "{:>9}  {}  {}  {:>4} txs  miner {}  base fee {}",
                b.number,
                short_tx_hash(&b.hash),
                utc(Some(b.timestamp)),
                b.tx_count,
                short_address(&b.miner),
                b.base_fee
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "—".to_string())
            )
        })
        .join("\n")
}

pub fn render_stats(stats: &ActivityStats) -> String {
    format!(
        "events: {}  votings created: {}  votes cast: {}  unique txs: {}",
        stats.total, stats.created, stats.votes, stats.unique_txs
    )
}

pub fn render_card(card: &VotingCard) -> String {
    let status = match (card.is_open, card.awaiting_close) {
        (true, _) => "active",
        (false, true) => "ended, awaiting close",
        (false, false) => "closed",
    };
    let mut lines = vec![format!(
        "#{} {} [{}] by {}",
        card.summary.id,
        card.summary.title,
        status,
        short_address(&card.summary.creator)
    )];
    if card.is_open {
        lines.push(format!(
            "  remaining {} ({}% elapsed)",
            card.remaining, card.progress_percent
        ));
    } else {
        lines.push(format!("  ended {}", utc(Some(card.summary.end_time))));
    }
    if card.has_voted == Some(true) {
        lines.push("  you already voted".to_string());
    }
    for share in &card.tally.options {
        let label = card
            .options
            .get(share.index as usize)
            .map(String::as_str)
            .unwrap_or("?");
        let votes = share
            .votes
            .map(|v| v.to_string())
            .unwrap_or_else(|| "…".to_string());
        let marker = match card.tally.leader {
            Some(leader) if leader.option_index == share.index => "*",
            _ => " ",
        };
        lines.push(format!(
            "  {} {}. {:<24} {:>6} votes {:>3}%",
            marker,
            share.index + 1,
            label,
            votes,
            share.percentage
        ));
    }
    lines.push(format!("  total votes: {}", card.tally.total));
    lines.join("\n")
}

/// Owner and role line for a connected account
pub fn render_role(owner: &Address, viewer: &Address, role: ViewerRole) -> String {
    format!(
        "owner: {}\nrole of {}: {}",
        owner,
        short_address(viewer),
        role.label()
    )
}
