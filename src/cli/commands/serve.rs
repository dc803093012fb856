use crate::config::Config;
use crate::errors::AppResult;
use crate::logging::init_tracing;
use crate::server;

/// Handle the `serve` command: blocks until Ctrl-C.
pub fn handle(listen: Option<&str>, cfg: &Config) -> AppResult<()> {
    let mut cfg = cfg.clone();
    if let Some(addr) = listen {
        cfg.listen = addr.to_string();
    }

    init_tracing(cfg.log_format);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(server::serve(&cfg))
}
