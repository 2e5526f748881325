use ballot_indexer::{
    countdown::unix_now,
    intent::{CastVoteIntent, CreateVotingIntent, DurationUnit},
    role::require_owner,
    Address, TxHash, VotingStateReader, WriteError, WriteSubmitter,
};
use log::info;

/// A client able to read contract state and submit writes on behalf of `sender`.
pub struct TxSender<'a, C: ?Sized> {
    pub client: &'a C,
    pub sender: Address,
}

impl<'a, C> TxSender<'a, C>
where
    C: VotingStateReader + WriteSubmitter + ?Sized,
{
    pub fn new(client: &'a C, sender: Address) -> Self {
        Self { client, sender }
    }
}

/// Validate and submit a new voting. Only the contract owner may create one.
pub async fn send_create_voting<C>(
    tx_sender: &TxSender<'_, C>,
    title: &str,
    options: &[String],
    duration_value: f64,
    unit: DurationUnit,
) -> Result<TxHash, WriteError>
where
    C: VotingStateReader + WriteSubmitter + ?Sized,
{
    let intent = CreateVotingIntent::new(title, options, duration_value, unit)?;
    let owner = tx_sender.client.owner().await?;
    require_owner(&tx_sender.sender, &owner)?;
    info!(
        "Creating voting {:?} with {} options for {}s",
        intent.title,
        intent.options.len(),
        intent.duration_secs
    );
    tx_sender.client.create_voting(&intent).await
}

/// Check the voting is open and the sender has not voted, then submit the vote.
pub async fn send_cast_vote<C>(
    tx_sender: &TxSender<'_, C>,
    voting_id: u64,
    option_index: u64,
) -> Result<TxHash, WriteError>
where
    C: VotingStateReader + WriteSubmitter + ?Sized,
{
    let summary = tx_sender.client.voting(voting_id).await?;
    let has_voted = tx_sender
        .client
        .has_voted(voting_id, &tx_sender.sender)
        .await?;
    let intent = CastVoteIntent::new(&summary, option_index, has_voted, unix_now())?;
    info!(
        "Casting vote for option {} in voting {} ({})",
        option_index, voting_id, summary.title
    );
    tx_sender.client.cast_vote(&intent).await
}
