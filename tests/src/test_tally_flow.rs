use ballot_indexer::{
    card::load_card,
    catalog::{CardFilter, VotingCatalog},
    countdown::unix_now,
    intent::DurationUnit,
    poller::poll_tally,
    tally::{TallyAggregator, TallyBoard},
    Address, IntentError, SortOrder, StatusFilter, VotingStateReader, WriteError,
};
use cli::utils::{send_cast_vote, send_create_voting, TxSender};

use crate::utils::*;

fn voter(n: u8) -> Address {
    Address::repeat_byte(n)
}

/// Voting 0 with counts `{0: 3, 1: 7, 2: 0}`.
fn seeded_chain() -> FakeChain {
    let chain = FakeChain::new(10, ALICE);
    chain.add_voting(ALICE, "Offsite city", &["Lisbon", "Berlin", "Oslo"], 3_600);
    for n in 1..=3 {
        chain.cast(voter(n), 0, 0).unwrap();
    }
    for n in 4..=10 {
        chain.cast(voter(n), 0, 1).unwrap();
    }
    chain
}

#[tokio::test]
async fn test_card_reports_counts_leader_and_viewer() {
    let chain = seeded_chain();
    let summary = chain.voting(0).await.unwrap();
    let mut tally = TallyAggregator::new(0, summary.option_count);

    let card = load_card(&chain, 0, Some(&voter(4)), &mut tally, unix_now())
        .await
        .unwrap();
    assert!(card.is_open);
    assert_eq!(card.has_voted, Some(true));
    assert_eq!(card.options, vec!["Lisbon", "Berlin", "Oslo"]);
    assert_eq!(card.tally.total, 10);
    assert_eq!(card.tally.leader.map(|l| l.option_index), Some(1));
    assert_eq!(card.leader_label(), Some("Berlin"));
    let percentages: Vec<u32> = card.tally.options.iter().map(|o| o.percentage).collect();
    assert_eq!(percentages, vec![30, 70, 0]);
    assert!(card.progress_percent >= 5 && card.progress_percent <= 95);

    let anonymous = load_card(&chain, 0, None, &mut tally, unix_now())
        .await
        .unwrap();
    assert_eq!(anonymous.has_voted, None);
}

#[tokio::test]
async fn test_failed_count_read_keeps_last_known_value() {
    let chain = seeded_chain();
    let mut tally = TallyAggregator::new(0, 3);
    poll_tally(&chain, 0, &mut tally).await.unwrap();
    assert_eq!(tally.count(1), Some(7));

    chain.cast(voter(11), 0, 1).unwrap();
    chain.cast(voter(12), 0, 2).unwrap();
    chain.fail_count(0, 1);

    let report = poll_tally(&chain, 0, &mut tally).await.unwrap();
    assert!(!report.reset);
    assert_eq!(report.failed, vec![1]);
    assert_eq!(report.changed, 1);
    assert_eq!(tally.count(1), Some(7));
    assert_eq!(tally.count(2), Some(1));

    chain.heal();
    let report = poll_tally(&chain, 0, &mut tally).await.unwrap();
    assert!(report.failed.is_empty());
    assert_eq!(tally.count(1), Some(8));
    assert_eq!(tally.total(), 12);
}

#[tokio::test]
async fn test_missing_voting_fails_the_pass() {
    let chain = seeded_chain();
    let mut tally = TallyAggregator::new(5, 2);
    assert_err_contains(poll_tally(&chain, 5, &mut tally).await, "voting 5");
    assert_eq!(chain.count_reads(), 0);
}

#[tokio::test]
async fn test_board_tracks_mounted_items_independently() {
    let chain = seeded_chain();
    chain.add_voting(BOB, "Snack budget", &["More", "Less"], 3_600);

    let mut board = TallyBoard::new();
    let first = board.mount(&chain.voting(0).await.unwrap());
    let second = board.mount(&chain.voting(1).await.unwrap());
    assert_eq!(board.len(), 2);

    for handle in board.handles() {
        let Some(mut tally) = board.get(handle).cloned() else {
            continue;
        };
        poll_tally(&chain, tally.voting_id(), &mut tally).await.unwrap();
        *board.get_mut(handle).unwrap() = tally;
    }
    assert_eq!(board.get(first).unwrap().total(), 10);
    assert_eq!(board.get(second).unwrap().total(), 0);
    assert!(board.get(second).unwrap().leader().is_none());

    let unmounted = board.unmount(first).unwrap();
    assert_eq!(unmounted.voting_id(), 0);
    assert!(board.get(first).is_none());

    // The freed slot is reused but the old handle stays dead
    let again = board.mount(&chain.voting(0).await.unwrap());
    assert_ne!(again, first);
    assert!(board.get(first).is_none());
    assert_eq!(board.get(again).unwrap().known(), 0);
    assert_eq!(board.find(0), Some(again));
}

#[tokio::test]
async fn test_catalog_pages_through_votings() {
    let chain = FakeChain::new(0, ALICE);
    for i in 0..11 {
        let title = if i % 2 == 0 { "Budget" } else { "Social" };
        chain.add_voting(ALICE, &format!("{} #{}", title, i), &["Yes", "No"], 3_600);
    }
    chain.close(10);
    chain.close(8);

    let mut catalog = VotingCatalog::new(chain.voting_count().await.unwrap(), SortOrder::Newest);
    assert_eq!(catalog.visible_ids(), (3..11).rev().collect::<Vec<_>>());
    assert!(catalog.has_more());
    catalog.load_more();
    assert_eq!(catalog.visible_count(), 11);
    assert!(!catalog.has_more());

    let filter = CardFilter {
        search: Some("budget".to_string()),
        status: StatusFilter::Active,
    };
    let now = unix_now();
    let mut shown = Vec::new();
    for id in catalog.visible_ids() {
        if filter.matches(&chain.voting(id).await.unwrap(), now) {
            shown.push(id);
        }
    }
    assert_eq!(shown, vec![6, 4, 2, 0]);

    catalog.set_order(SortOrder::Oldest);
    assert_eq!(catalog.visible_ids(), (0..8).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_write_intents_reach_the_chain() {
    let chain = FakeChain::new(0, CAROL);
    let sender = TxSender::new(&chain, CAROL);

    let options = vec![" Tea ".to_string(), "Coffee".to_string(), String::new()];
    send_create_voting(&sender, "  Morning drink ", &options, 2.5, DurationUnit::Hours)
        .await
        .unwrap();
    let summary = chain.voting(0).await.unwrap();
    assert_eq!(summary.title, "Morning drink");
    assert_eq!(summary.creator, CAROL);
    assert_eq!(chain.options(0).await.unwrap(), vec!["Tea", "Coffee"]);
    let remaining = summary.end_time - unix_now();
    assert!(remaining <= 9_000 && remaining > 8_900);

    send_cast_vote(&sender, 0, 1).await.unwrap();
    assert_eq!(chain.vote_count(0, 1).await.unwrap(), 1);

    let again = send_cast_vote(&sender, 0, 0).await;
    assert!(matches!(
        again,
        Err(WriteError::Intent(IntentError::AlreadyVoted(0)))
    ));

    let duplicate = vec!["Tea".to_string(), "TEA".to_string()];
    let rejected = send_create_voting(&sender, "Drinks", &duplicate, 1.0, DurationUnit::Days).await;
    assert!(matches!(
        rejected,
        Err(WriteError::Intent(IntentError::DuplicateOption(_)))
    ));

    chain.close(0);
    let other = TxSender::new(&chain, BOB);
    let closed = send_cast_vote(&other, 0, 0).await;
    assert!(matches!(
        closed,
        Err(WriteError::Intent(IntentError::VotingClosed(0)))
    ));
    assert_eq!(chain.voting_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_only_the_owner_creates_votings() {
    let chain = FakeChain::new(0, ALICE);
    let options = vec!["Tea".to_string(), "Coffee".to_string()];

    let stranger = TxSender::new(&chain, BOB);
    let rejected = send_create_voting(&stranger, "Drinks", &options, 1.0, DurationUnit::Days).await;
    assert!(matches!(
        rejected,
        Err(WriteError::Intent(IntentError::NotOwner(who))) if who == BOB
    ));
    assert_eq!(chain.voting_count().await.unwrap(), 0);

    // Ownership moves with the contract state, not with the client
    chain.set_owner(BOB);
    send_create_voting(&stranger, "Drinks", &options, 1.0, DurationUnit::Days)
        .await
        .unwrap();
    assert_eq!(chain.voting_count().await.unwrap(), 1);

    let former = TxSender::new(&chain, ALICE);
    let rejected = send_create_voting(&former, "Snacks", &options, 1.0, DurationUnit::Days).await;
    assert!(matches!(
        rejected,
        Err(WriteError::Intent(IntentError::NotOwner(_)))
    ));

    // Voting stays open to everyone
    send_cast_vote(&former, 0, 1).await.unwrap();
    assert_eq!(chain.vote_count(0, 1).await.unwrap(), 1);
}
