use intcode_vm::VmError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Node {address} aborted: {source}")]
    Node { address: i64, source: VmError },

    #[error("Network still active after {rounds} rounds")]
    RoundLimit { rounds: usize },
}
