use std::process;
use std::sync::Arc;

use forkjoin::transport::{ServerConfig, serve};
use forkjoin::{
    EnvironmentConfig, EnvironmentResolver, FrontDoorService, HttpChannel, RemoteChannel,
    VersionInfo,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let config = match parse_args(&args) {
        Ok(v) => v,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!("Usage: forkjoin-server [--host <addr>] [--port <port>]");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --host <addr>    Address to bind [default: 0.0.0.0]");
            eprintln!("  --port <port>    Port to bind [default: 8888]");
            eprintln!();
            eprintln!("Environment:");
            eprintln!("  FORKJOIN_DEBUG, FORKJOIN_APP_ID, FORKJOIN_VERSION_ID,");
            eprintln!("  FORKJOIN_WORKER_URL, FORKJOIN_DEV_ADDRESS, FORKJOIN_LOG, LOG_FORMAT");
            process::exit(2);
        }
    };

    init_tracing();

    if let Err(e) = run(config) {
        tracing::error!(error = %e, "forkjoin-server failed");
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<ServerConfig, String> {
    let mut config = ServerConfig::default();

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                i += 1;
                config.host = args.get(i).ok_or("--host requires a value")?.clone();
            }
            "--port" => {
                i += 1;
                let raw = args.get(i).ok_or("--port requires a value")?;
                config.port = raw
                    .parse()
                    .map_err(|_| format!("invalid port '{raw}'"))?;
            }
            "--help" | "-h" => return Err(String::new()),
            arg => return Err(format!("unexpected argument: {arg}")),
        }
        i += 1;
    }

    Ok(config)
}

fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let base_level = match std::env::var("FORKJOIN_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };

        EnvFilter::new(format!(
            "forkjoin={level},forkjoin_server={level},forkjoin::codec=off",
            level = base_level
        ))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

#[tokio::main]
async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let env = EnvironmentConfig::from_env();
    tracing::info!(
        debug = env.debug,
        app_id = env.app_id.as_deref().unwrap_or("-"),
        version_id = env.version_id.as_deref().unwrap_or("-"),
        "Loaded environment"
    );

    let mut version = VersionInfo::new();
    if let Some(ref v) = env.version_id {
        version = version.with_app_version(v.clone());
    }

    let channel: Arc<dyn RemoteChannel> = Arc::new(HttpChannel::new()?);
    let resolver = Arc::new(EnvironmentResolver::new(env));
    let service = Arc::new(FrontDoorService::new(resolver, channel).with_version(version));

    serve(config, service).await
}
