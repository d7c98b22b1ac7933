pub mod cluster;
pub mod error;
pub mod kubeconfig;
pub mod node;
pub mod pool;
pub mod region;
pub mod version;

pub use cluster::*;
pub use error::*;
pub use kubeconfig::*;
pub use node::*;
pub use pool::*;
pub use region::*;
pub use version::*;
