pub mod credentials;
pub mod gateway;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod queries;

pub use gateway::{Gateway, SqliteGateway, UserDocument};
