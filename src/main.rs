use chatchef::cli::{ Args, Command };
use clap::Parser;
use dotenv::dotenv;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let args = Args::parse();
    // The terminal chat owns the screen, keep the log quiet there.
    let default_filter = if args.command == Some(Command::Chat) { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    chatchef::run(args).await
}
