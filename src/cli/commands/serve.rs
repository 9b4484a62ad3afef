//! Web server command.

use console::style;

use archivum::config::Config;

/// Start the web server.
pub async fn cmd_serve(config: &Config, bind: Option<&str>) -> anyhow::Result<()> {
    let (host, port) = match bind {
        Some(bind) => parse_bind_address(bind, config.server.port)?,
        None => (config.server.host.clone(), config.server.port),
    };

    let uploads_dir = config.uploads_dir();
    tokio::fs::create_dir_all(&uploads_dir).await?;
    println!(
        "  {} Uploads directory: {}",
        style("✓").green(),
        uploads_dir.display()
    );

    println!(
        "{} Starting archivum server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    archivum::server::serve(config, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "3030" -> 127.0.0.1:3030
/// - Just a host: "0.0.0.0" -> 0.0.0.0:`default_port`
/// - Host and port: "0.0.0.0:3030" -> 0.0.0.0:3030
fn parse_bind_address(bind: &str, default_port: u16) -> anyhow::Result<(String, u16)> {
    if bind.is_empty() {
        anyhow::bail!("Empty bind address");
    }

    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    // Must be just a host, use default port
    Ok((bind.to_string(), default_port))
}
