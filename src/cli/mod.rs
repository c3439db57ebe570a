pub mod repl;

use clap::{ Parser, Subcommand };
use std::time::Duration;
use crate::llm::{ LlmConfig, LlmType };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    // --- Session Storage Args ---
    /// Session storage type (file, memory)
    #[arg(long, env = "STORAGE_TYPE", default_value = "file", global = true)]
    pub storage_type: String,

    /// Directory holding persisted chat sessions
    #[arg(long, env = "STORAGE_DIR", default_value = ".chatchef", global = true)]
    pub storage_dir: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (gemini, openai)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "gemini", global = true)]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API
    #[arg(long, env = "CHAT_BASE_URL", global = true)] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider
    #[arg(long, env = "CHAT_API_KEY", default_value = "", global = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gemini-1.5-flash-latest, gpt-3.5-turbo)
    #[arg(long, env = "CHAT_MODEL", global = true)] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Seconds to wait for a chat reply before giving up. 0 waits forever.
    #[arg(long, env = "CHAT_TIMEOUT_SECS", default_value = "60", global = true)]
    pub chat_timeout_secs: u64,

    // --- Recipe Provider Args ---
    /// API Key for the Spoonacular recipe API
    #[arg(long, env = "RECIPE_API_KEY", default_value = "", global = true)]
    pub recipe_api_key: String,

    /// Base URL for the Spoonacular recipe API
    #[arg(long, env = "RECIPE_BASE_URL", global = true)]
    pub recipe_base_url: Option<String>,

    /// Base URL for the TheMealDB fallback recipe API
    #[arg(long, env = "RECIPE_FALLBACK_BASE_URL", global = true)]
    pub recipe_fallback_base_url: Option<String>,

    /// Disable the TheMealDB fallback provider
    #[arg(long, env = "RECIPE_NO_FALLBACK", default_value = "false", global = true)]
    pub recipe_no_fallback: bool,

    /// Number of recipes to fetch per search
    #[arg(long, env = "RECIPE_COUNT", default_value = "3", global = true)]
    pub recipe_count: usize,

    // --- General App Args ---
    /// External speech-to-text command used for voice input (e.g., "whisper-listen --once")
    #[arg(long, env = "SPEECH_COMMAND", global = true)]
    pub speech_command: Option<String>,

    /// Host address and port for the HTTP API to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000", global = true)]
    pub server_addr: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the chat and recipe HTTP API (default)
    Serve,
    /// Chat in the terminal
    Chat,
    /// Search recipes for the given ingredients
    Recipes {
        /// Ingredients, e.g. `chatchef recipes tomato egg`
        ingredients: Vec<String>,
    },
}

impl Args {
    pub fn chat_timeout(&self) -> Option<Duration> {
        (self.chat_timeout_secs > 0).then(|| Duration::from_secs(self.chat_timeout_secs))
    }

    pub fn chat_llm_config(&self) -> Result<LlmConfig, String> {
        let llm_type: LlmType = self.chat_llm_type
            .parse()
            .map_err(|e| format!("Invalid chat LLM type: {}", e))?;
        Ok(LlmConfig {
            llm_type,
            api_key: Some(self.chat_api_key.clone()).filter(|k| !k.is_empty()),
            completion_model: self.chat_model.clone(),
            base_url: self.chat_base_url.clone(),
            timeout: self.chat_timeout(),
        })
    }
}
