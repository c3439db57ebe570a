pub mod api;

use crate::agent::ChatEngine;
use crate::recipes::RecipeFinder;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use log::info;

pub struct Server {
    addr: String,
    engine: ChatEngine,
    recipes: Arc<RecipeFinder>,
}

impl Server {
    pub fn new(addr: String, engine: ChatEngine, recipes: Arc<RecipeFinder>) -> Self {
        Self { addr, engine, recipes }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = api::router(self.engine.clone(), self.recipes.clone());
        let listener = tokio::net::TcpListener::bind(addr).await
            .map_err(|e| format!("Failed to bind HTTP server to {}: {}", addr, e))?;
        info!("HTTP API listening on: http://{}", addr);
        axum::serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}
