use autograde_cli::cmd::GlobalArgs;
use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let app = GlobalArgs::parse();
    app.exec_subcmd().await.unwrap_or_else(|e| {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    });
}
