pub mod agent;
pub mod cli;
pub mod history;
pub mod llm;
pub mod models;
pub mod recipes;
pub mod server;
pub mod session;
pub mod speech;

use agent::ChatEngine;
use cli::{ Args, Command };
use history::create_storage;
use llm::chat::new_client as new_chat_client;
use log::info;
use recipes::{ MealDbProvider, RecipeFinder, RecipeProvider, SpoonacularProvider };
use server::Server;
use session::SessionStore;
use speech::{ CommandRecognizer, Recognizer, SpeechCapture };
use std::error::Error;
use std::sync::Arc;

pub fn build_engine(args: &Args) -> Result<ChatEngine, Box<dyn Error + Send + Sync>> {
    let chat_config = args.chat_llm_config()?;
    let chat_client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Type={}, Model={}, BaseURL={:?}",
        args.chat_llm_type,
        chat_client.get_model(),
        chat_client.get_base_url()
    );

    let storage = create_storage(args)?;
    let store = SessionStore::load(storage);
    info!("Loaded {} stored chat sessions", store.len());
    Ok(ChatEngine::new(chat_client, store))
}

pub fn build_recipe_finder(args: &Args) -> Result<RecipeFinder, Box<dyn Error + Send + Sync>> {
    let http = reqwest::Client::builder().build()?;
    let primary: Arc<dyn RecipeProvider> = Arc::new(
        SpoonacularProvider::new(
            http.clone(),
            args.recipe_base_url.clone(),
            args.recipe_api_key.clone(),
            args.recipe_count
        )
    );
    let secondary: Option<Arc<dyn RecipeProvider>> = if args.recipe_no_fallback {
        None
    } else {
        Some(Arc::new(MealDbProvider::new(http, args.recipe_fallback_base_url.clone(), args.recipe_count)))
    };
    Ok(RecipeFinder::new(primary, secondary))
}

pub fn build_speech(args: &Args) -> SpeechCapture {
    let recognizer = args.speech_command
        .as_deref()
        .and_then(CommandRecognizer::parse)
        .map(|r| Arc::new(r) as Arc<dyn Recognizer>);
    SpeechCapture::new(recognizer)
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Storage Type: {}", args.storage_type);
    info!("Storage Dir: {}", args.storage_dir);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Timeout (s): {}", args.chat_timeout_secs);
    info!("Recipe Count: {}", args.recipe_count);
    info!("Recipe Fallback Enabled: {}", !args.recipe_no_fallback);
    info!("Voice Input Command: {:?}", args.speech_command);
    info!("-------------------------");

    match args.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => {
            let engine = build_engine(&args)?;
            let recipes = Arc::new(build_recipe_finder(&args)?);
            info!("Starting server on: {}", args.server_addr);
            let server = Server::new(args.server_addr.clone(), engine, recipes);
            server.run().await?;
        }
        Command::Chat => {
            let engine = build_engine(&args)?;
            let speech = build_speech(&args);
            cli::repl::run(engine, speech).await?;
        }
        Command::Recipes { ingredients } => {
            let finder = build_recipe_finder(&args)?;
            let recipes = finder.find(&ingredients).await;
            println!("{}", serde_json::to_string_pretty(&recipes)?);
        }
    }

    Ok(())
}
