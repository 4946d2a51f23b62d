//! unifs: one file API over memory, local disk, and object storage.
//!
//! Pick a backend by constructing it directly ([`MemoryFs`], [`LocalFs`],
//! [`RemoteFs`]) or from configuration with [`open_backend`], then program
//! against [`FileSystem`].
//!
//! ```rust,ignore
//! use unifs::{open_backend, BackendConfig, FileSystem};
//!
//! let fs = open_backend(&BackendConfig::Memory)?;
//! fs.write_all("/reports/today.csv", b"a,b\n1,2\n").await?;
//! let bytes = fs.read_all("/reports/today.csv").await?;
//! fs.remove("/reports").await?;
//! ```

pub mod config;

pub use config::{open_backend, BackendConfig, ConfigError, UnifsConfig};
pub use unifs_core::{path, FileReader, FileSystem, FileWriter, FsError, FsResult};
pub use unifs_local::LocalFs;
pub use unifs_memory::{ContentStore, MemoryFs};
pub use unifs_remote::RemoteFs;
