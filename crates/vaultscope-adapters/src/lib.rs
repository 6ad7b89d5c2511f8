pub mod chain;
pub mod error;
pub mod farm;
pub mod lp;
pub mod registry;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod units;

pub use chain::{ChainReader, ChainReaders, PoolInfo, RpcChainReader};
pub use error::{AdapterError, ChainError};
pub use farm::{FarmAdapter, FarmYield};
pub use lp::LpAdapter;
pub use registry::{AdapterDescriptor, resolve};
