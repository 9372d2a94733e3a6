use super::load_config;
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>, open_browser: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let port = port.unwrap_or(config.server.port);
    let root_buf = root.to_path_buf();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!(
            "castctl for '{}' → http://localhost:{actual_port}/control",
            config.station.name
        );

        tokio::select! {
            res = castctl_server::serve_on(root_buf, listener, open_browser) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
