pub mod consts;
pub mod contract;
pub mod rpc;
pub mod utils;

pub use rpc::JsonRpcClient;
