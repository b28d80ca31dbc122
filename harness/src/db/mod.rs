pub mod connection;
pub mod dsn;

pub use connection::{create_pool, create_pool_with_config, PoolConfig};
pub use dsn::ConnectionString;
