pub mod backup;
pub mod export;
pub mod init;
pub mod log;
pub mod serve;
pub mod user;
