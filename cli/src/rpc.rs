//! Ledger adapter for an Ethereum-style node hosting the voting contract

use std::time::Duration;

use alloy::{
    primitives::U256,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::{
        client::RpcClient,
        types::{BlockNumberOrTag, Filter, Log, TransactionInput, TransactionRequest},
    },
    sol_types::{SolCall, SolEvent},
    transports::{http::Http, RpcError, TransportError},
};
use async_trait::async_trait;
use ballot_indexer::{
    intent::{CastVoteIntent, CreateVotingIntent},
    ActivityEvent, ActivityKind, Address, BlockSummary, LedgerError, LedgerLogReader, LogEntry,
    TxHash, VotingStateReader, VotingSummary, WriteError, WriteSubmitter,
};
use log::{debug, info};

use crate::consts::*;
use crate::contract::{
    topic_for,
    VotacionUniversitaria::{self, VotacionCreada, VotacionUniversitariaInstance, VotoEmitido},
};

/// Typed client bound to one voting contract.
pub struct JsonRpcClient {
    provider: DynProvider,
    instance: VotacionUniversitariaInstance<DynProvider>,
    url: String,
    contract: Address,
    /// Unlocked node account used for writes
    from: Option<Address>,
    receipt_poll: Duration,
    receipt_timeout: Duration,
}

impl JsonRpcClient {
    pub fn new(url: &str, contract: Address) -> Result<Self, LedgerError> {
        let endpoint: reqwest::Url = url
            .parse()
            .map_err(|e| LedgerError::Transport(format!("invalid rpc url {}: {}", url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        let client = RpcClient::new(Http::with_client(http, endpoint), false);
        // Plain calls only: the node's unlocked account fills and signs writes
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_client(client)
            .erased();
        Ok(Self {
            instance: VotacionUniversitaria::new(contract, provider.clone()),
            provider,
            url: url.to_string(),
            contract,
            from: None,
            receipt_poll: Duration::from_millis(DEFAULT_RECEIPT_POLL_MS),
            receipt_timeout: Duration::from_secs(DEFAULT_RECEIPT_TIMEOUT_SECS),
        })
    }

    pub fn with_sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_receipt_polling(mut self, poll: Duration, timeout: Duration) -> Self {
        self.receipt_poll = poll;
        self.receipt_timeout = timeout;
        self
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send_transaction<C: SolCall>(&self, call: C) -> Result<TxHash, WriteError> {
        let from = self
            .from
            .ok_or_else(|| WriteError::Rejected("no sender account configured".to_string()))?;
        let request = TransactionRequest::default()
            .from(from)
            .to(self.contract)
            .input(TransactionInput::new(call.abi_encode().into()));
        debug!("eth_sendTransaction {} from {}", C::SIGNATURE, from);

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| match ledger_error(e) {
                LedgerError::Rpc { message, .. } => WriteError::Rejected(message),
                other => WriteError::Ledger(other),
            })?;
        let tx_hash = *pending.tx_hash();
        info!("Transaction sent: {}", tx_hash);
        self.wait_for_receipt(tx_hash).await
    }

    /// Poll for the receipt until it appears or the timeout elapses.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxHash, WriteError> {
        let deadline = tokio::time::Instant::now() + self.receipt_timeout;
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(ledger_error)?;
            if let Some(receipt) = receipt {
                return if receipt.status() {
                    Ok(tx_hash)
                } else {
                    Err(WriteError::Reverted(tx_hash))
                };
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(WriteError::Ledger(LedgerError::NotFound(format!(
                    "receipt for {} after {:?}",
                    tx_hash, self.receipt_timeout
                ))));
            }
            tokio::time::sleep(self.receipt_poll).await;
        }
    }
}

#[async_trait]
impl LedgerLogReader for JsonRpcClient {
    async fn get_logs(
        &self,
        address: &Address,
        kind: ActivityKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>, LedgerError> {
        let filter = Filter::new()
            .address(*address)
            .event_signature(topic_for(kind))
            .from_block(from_block)
            .to_block(to_block);
        let logs = self.provider.get_logs(&filter).await.map_err(ledger_error)?;
        logs.iter().map(decode_log).collect()
    }

    async fn block_number(&self) -> Result<u64, LedgerError> {
        self.provider.get_block_number().await.map_err(ledger_error)
    }

    async fn block(&self, number: u64) -> Result<BlockSummary, LedgerError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await
            .map_err(ledger_error)?
            .ok_or_else(|| LedgerError::NotFound(format!("block {}", number)))?;
        Ok(BlockSummary {
            number: block.header.number,
            hash: block.header.hash,
            timestamp: block.header.timestamp,
            miner: block.header.beneficiary,
            tx_count: block.transactions.len() as u64,
            base_fee: block.header.base_fee_per_gas.map(u128::from),
        })
    }
}

#[async_trait]
impl VotingStateReader for JsonRpcClient {
    async fn voting_count(&self) -> Result<u64, LedgerError> {
        let count = self
            .instance
            .contadorVotaciones()
            .call()
            .await
            .map_err(contract_error)?;
        to_u64(count)
    }

    async fn voting(&self, id: u64) -> Result<VotingSummary, LedgerError> {
        let voting = self
            .instance
            .obtenerVotacion(U256::from(id))
            .call()
            .await
            .map_err(contract_error)?;
        Ok(VotingSummary {
            id,
            title: voting.titulo,
            creator: voting.creador,
            end_time: to_u64(voting.fechaFin)?,
            option_count: to_u64(voting.cantidadOpciones)?,
            is_active: voting.activa,
        })
    }

    async fn options(&self, id: u64) -> Result<Vec<String>, LedgerError> {
        self.instance
            .obtenerOpciones(U256::from(id))
            .call()
            .await
            .map_err(contract_error)
    }

    async fn has_voted(&self, id: u64, voter: &Address) -> Result<bool, LedgerError> {
        self.instance
            .yaVoto(U256::from(id), *voter)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn vote_count(&self, id: u64, option_index: u64) -> Result<u128, LedgerError> {
        let votes = self
            .instance
            .obtenerVotos(U256::from(id), U256::from(option_index))
            .call()
            .await
            .map_err(contract_error)?;
        u128::try_from(votes).map_err(|_| LedgerError::Decode(format!("{} overflows u128", votes)))
    }

    async fn deployment_block(&self) -> Result<u64, LedgerError> {
        let block = self
            .instance
            .bloqueDespliegue()
            .call()
            .await
            .map_err(contract_error)?;
        to_u64(block)
    }

    async fn owner(&self) -> Result<Address, LedgerError> {
        self.instance.owner().call().await.map_err(contract_error)
    }
}

#[async_trait]
impl WriteSubmitter for JsonRpcClient {
    async fn create_voting(&self, intent: &CreateVotingIntent) -> Result<TxHash, WriteError> {
        self.send_transaction(VotacionUniversitaria::crearVotacionCall {
            titulo: intent.title.clone(),
            opciones: intent.options.clone(),
            duracion: U256::from(intent.duration_secs),
        })
        .await
    }

    async fn cast_vote(&self, intent: &CastVoteIntent) -> Result<TxHash, WriteError> {
        self.send_transaction(VotacionUniversitaria::votarCall {
            idVotacion: U256::from(intent.voting_id),
            idOpcion: U256::from(intent.option_index),
        })
        .await
    }
}

fn ledger_error(e: TransportError) -> LedgerError {
    match e {
        RpcError::ErrorResp(payload) => LedgerError::Rpc {
            code: payload.code,
            message: payload.message.to_string(),
        },
        RpcError::Transport(kind) => LedgerError::Transport(kind.to_string()),
        RpcError::DeserError { err, .. } => LedgerError::Decode(err.to_string()),
        other => LedgerError::Transport(other.to_string()),
    }
}

fn contract_error(e: alloy::contract::Error) -> LedgerError {
    match e {
        alloy::contract::Error::TransportError(e) => ledger_error(e),
        other => LedgerError::Decode(other.to_string()),
    }
}

fn to_u64(value: U256) -> Result<u64, LedgerError> {
    u64::try_from(value).map_err(|_| LedgerError::Decode(format!("{} overflows u64", value)))
}

/// Decode a contract log of either kind. Pending logs keep their missing position fields.
fn decode_log(log: &Log) -> Result<LogEntry, LedgerError> {
    let decode_err = |e: alloy::sol_types::Error| LedgerError::Decode(e.to_string());
    let event = match log.topics().first() {
        Some(topic) if *topic == VotacionCreada::SIGNATURE_HASH => {
            let created = log.log_decode::<VotacionCreada>().map_err(decode_err)?.inner.data;
            ActivityEvent::Created {
                voting_id: to_u64(created.idVotacion)?,
                creator: created.creador,
                title: created.titulo,
                end_time: to_u64(created.fechaFin)?,
                option_count: to_u64(created.cantidadOpciones)?,
            }
        }
        Some(topic) if *topic == VotoEmitido::SIGNATURE_HASH => {
            let vote = log.log_decode::<VotoEmitido>().map_err(decode_err)?.inner.data;
            ActivityEvent::VoteCast {
                voting_id: to_u64(vote.idVotacion)?,
                voter: vote.votante,
                option_index: to_u64(vote.idOpcion)?,
            }
        }
        other => {
            return Err(LedgerError::Decode(format!(
                "unexpected event topic {:?}",
                other
            )))
        }
    };
    Ok(LogEntry {
        block_number: log.block_number,
        tx_hash: log.transaction_hash,
        log_index: log.log_index,
        event,
    })
}
