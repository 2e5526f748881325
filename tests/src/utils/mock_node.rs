//! Local JSON-RPC node serving a scripted voting contract over HTTP

use std::sync::{Arc, Mutex, MutexGuard};

use alloy::{
    primitives::{hex, Address, Bytes, LogData, B256, U256},
    sol_types::{SolEvent, SolInterface, SolValue},
};
use axum::{extract::State, routing::post, Json, Router};
use ballot_indexer::{ActivityEvent, LogEntry};
use cli::contract::VotacionUniversitaria::{
    VotacionCreada, VotacionUniversitariaCalls as Call, VotoEmitido,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, task::JoinHandle};

use super::fixtures::{block_hash, block_timestamp, ALICE};

const GAS_USED: u64 = 21_000;
const BASE_FEE: u64 = 1_000_000_000;
const MINER: Address = Address::repeat_byte(0x11);

#[derive(Debug, Clone)]
pub struct MockVoting {
    pub title: String,
    pub creator: Address,
    pub end_time: u64,
    pub options: Vec<String>,
    pub votes: Vec<u128>,
    pub is_active: bool,
}

pub struct NodeState {
    pub head: u64,
    pub deploy_block: u64,
    pub owner: Address,
    pub logs: Vec<LogEntry>,
    pub votings: Vec<MockVoting>,
    /// Receipt lookups answered with `null` before the receipt appears
    pub receipt_delay: usize,
    pub revert_writes: bool,
    pub methods: Vec<String>,
    pub sent: Vec<Value>,
    pub receipt_polls: usize,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            head: 0,
            deploy_block: 0,
            owner: ALICE,
            logs: Vec::new(),
            votings: Vec::new(),
            receipt_delay: 0,
            revert_writes: false,
            methods: Vec::new(),
            sent: Vec::new(),
            receipt_polls: 0,
        }
    }
}

pub struct MockNode {
    pub url: String,
    state: Arc<Mutex<NodeState>>,
    handle: JoinHandle<()>,
}

impl MockNode {
    pub async fn start(state: NodeState) -> anyhow::Result<Self> {
        let state = Arc::new(Mutex::new(state));
        let app = Router::new()
            .route("/", post(handle_rpc))
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self { url, state, handle })
    }

    pub fn state(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.state().methods.iter().filter(|m| *m == method).count()
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn quantity(value: u64) -> String {
    format!("{:#x}", value)
}

fn parse_quantity(value: &Value) -> Option<u64> {
    let raw = value.as_str()?;
    u64::from_str_radix(raw.trim_start_matches("0x"), 16).ok()
}

fn empty_bloom() -> String {
    format!("0x{}", "0".repeat(512))
}

fn log_data(event: &ActivityEvent) -> LogData {
    match event {
        ActivityEvent::Created {
            voting_id,
            creator,
            title,
            end_time,
            option_count,
        } => VotacionCreada {
            idVotacion: U256::from(*voting_id),
            creador: *creator,
            titulo: title.clone(),
            fechaFin: U256::from(*end_time),
            cantidadOpciones: U256::from(*option_count),
        }
        .encode_log_data(),
        ActivityEvent::VoteCast {
            voting_id,
            voter,
            option_index,
        } => VotoEmitido {
            idVotacion: U256::from(*voting_id),
            votante: *voter,
            idOpcion: U256::from(*option_index),
        }
        .encode_log_data(),
    }
}

/// Render a log entry the way a node returns it from `eth_getLogs`.
pub fn raw_log(contract: &Address, log: &LogEntry) -> Value {
    let data = log_data(&log.event);
    let topics: Vec<String> = data.topics().iter().map(B256::to_string).collect();
    json!({
        "address": contract.to_string(),
        "topics": topics,
        "data": hex::encode_prefixed(&data.data),
        "blockNumber": log.block_number.map(quantity),
        "blockHash": log.block_number.map(|b| block_hash(b).to_string()),
        "transactionHash": log.tx_hash.map(|h| h.to_string()),
        "transactionIndex": log.block_number.map(|_| quantity(0)),
        "logIndex": log.log_index.map(quantity),
        "removed": false,
    })
}

fn raw_block(number: u64) -> Value {
    let zero = B256::ZERO.to_string();
    json!({
        "hash": block_hash(number).to_string(),
        "parentHash": block_hash(number.saturating_sub(1)).to_string(),
        "sha3Uncles": zero,
        "miner": MINER.to_string(),
        "stateRoot": zero,
        "transactionsRoot": zero,
        "receiptsRoot": zero,
        "logsBloom": empty_bloom(),
        "difficulty": "0x0",
        "number": quantity(number),
        "gasLimit": quantity(30_000_000),
        "gasUsed": quantity(0),
        "timestamp": quantity(block_timestamp(number)),
        "extraData": "0x",
        "mixHash": zero,
        "nonce": "0x0000000000000000",
        "baseFeePerGas": quantity(BASE_FEE),
        "totalDifficulty": "0x0",
        "size": quantity(512),
        "uncles": [],
        "transactions": [],
    })
}

fn raw_receipt(state: &NodeState, tx_hash: &Value, request: &Value) -> Value {
    json!({
        "type": "0x2",
        "status": if state.revert_writes { "0x0" } else { "0x1" },
        "cumulativeGasUsed": quantity(GAS_USED),
        "logs": [],
        "logsBloom": empty_bloom(),
        "transactionHash": tx_hash,
        "transactionIndex": quantity(0),
        "blockHash": block_hash(state.head).to_string(),
        "blockNumber": quantity(state.head),
        "gasUsed": quantity(GAS_USED),
        "effectiveGasPrice": quantity(BASE_FEE),
        "from": request["from"],
        "to": request["to"],
        "contractAddress": null,
    })
}

fn find_voting(state: &NodeState, id: U256) -> Result<&MockVoting, String> {
    u64::try_from(id)
        .ok()
        .and_then(|i| state.votings.get(i as usize))
        .ok_or_else(|| "execution reverted: voting does not exist".to_string())
}

/// Return data of a contract view call.
fn call_result(state: &NodeState, input: &[u8]) -> Result<Vec<u8>, String> {
    let call = Call::abi_decode(input).map_err(|e| format!("execution reverted: {}", e))?;
    let out = match call {
        Call::owner(_) => state.owner.abi_encode(),
        Call::contadorVotaciones(_) => U256::from(state.votings.len()).abi_encode(),
        Call::bloqueDespliegue(_) => U256::from(state.deploy_block).abi_encode(),
        Call::obtenerVotacion(c) => {
            let v = find_voting(state, c.idVotacion)?;
            (
                v.title.clone(),
                v.creator,
                U256::from(v.end_time),
                U256::from(v.options.len()),
                v.is_active,
            )
                .abi_encode_params()
        }
        Call::obtenerOpciones(c) => find_voting(state, c.idVotacion)?.options.abi_encode(),
        Call::obtenerVotos(c) => {
            let v = find_voting(state, c.idVotacion)?;
            let votes = u64::try_from(c.idOpcion)
                .ok()
                .and_then(|i| v.votes.get(i as usize))
                .copied()
                .ok_or_else(|| "execution reverted: invalid option".to_string())?;
            U256::from(votes).abi_encode()
        }
        Call::yaVoto(c) => {
            find_voting(state, c.idVotacion)?;
            false.abi_encode()
        }
        Call::crearVotacion(_) | Call::votar(_) => Vec::new(),
    };
    Ok(out)
}

fn dispatch(state: &mut NodeState, method: &str, params: &Value) -> Result<Value, (i64, String)> {
    match method {
        "eth_blockNumber" => Ok(json!(quantity(state.head))),
        "eth_getLogs" => {
            let filter = &params[0];
            // A single topic may come as a plain string or as a one-element list
            let topic = match &filter["topics"][0] {
                Value::Array(options) => options.first().cloned().unwrap_or(Value::Null),
                other => other.clone(),
            };
            let from = parse_quantity(&filter["fromBlock"]).unwrap_or(0);
            let to = parse_quantity(&filter["toBlock"]).unwrap_or(u64::MAX);
            let contract: Address = filter["address"]
                .as_str()
                .and_then(|a| a.parse().ok())
                .unwrap_or_default();
            let logs: Vec<Value> = state
                .logs
                .iter()
                .filter(|log| log.block_number.map_or(true, |b| (from..=to).contains(&b)))
                .map(|log| raw_log(&contract, log))
                .filter(|raw| {
                    let first = raw["topics"][0].as_str().map(str::to_lowercase);
                    first.is_some() && first == topic.as_str().map(str::to_lowercase)
                })
                .collect();
            Ok(json!(logs))
        }
        "eth_getBlockByNumber" => {
            let number = parse_quantity(&params[0]).ok_or((-32602, "invalid block".to_string()))?;
            if number > state.head {
                return Ok(Value::Null);
            }
            Ok(raw_block(number))
        }
        "eth_call" => {
            let request = &params[0];
            let input = request["input"]
                .as_str()
                .or_else(|| request["data"].as_str())
                .unwrap_or("0x");
            let input: Bytes = input.parse().map_err(|e| (-32602, format!("{}", e)))?;
            call_result(state, &input)
                .map(|out| json!(hex::encode_prefixed(out)))
                .map_err(|message| (3, message))
        }
        "eth_sendTransaction" => {
            state.sent.push(params[0].clone());
            let mut hash = [0xee; 32];
            hash[31] = state.sent.len() as u8;
            Ok(json!(B256::new(hash).to_string()))
        }
        "eth_getTransactionReceipt" => {
            state.receipt_polls += 1;
            if state.receipt_polls <= state.receipt_delay {
                return Ok(Value::Null);
            }
            let request = state.sent.last().cloned().unwrap_or(Value::Null);
            Ok(raw_receipt(state, &params[0], &request))
        }
        other => Err((-32601, format!("method {} not found", other))),
    }
}

async fn handle_rpc(
    State(state): State<Arc<Mutex<NodeState>>>,
    Json(request): Json<Value>,
) -> Json<Value> {
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();
    let mut state = state.lock().unwrap_or_else(|p| p.into_inner());
    state.methods.push(method.clone());
    let body = match dispatch(&mut state, &method, &params) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": { "code": code, "message": message },
        }),
    };
    Json(body)
}
