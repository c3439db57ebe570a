mod mealdb;
mod spoonacular;

pub use mealdb::MealDbProvider;
pub use spoonacular::SpoonacularProvider;

use async_trait::async_trait;
use log::{ error, info, warn };
use std::sync::Arc;
use thiserror::Error;
use crate::models::recipe::Recipe;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("recipe request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected recipe payload: {0}")]
    Payload(String),
}

#[async_trait]
pub trait RecipeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `ingredients` is the comma-joined list, never empty.
    async fn find_by_ingredients(&self, ingredients: &str) -> Result<Vec<Recipe>, RecipeError>;
}

/// Keeps the filled-in ingredient fields, trimmed.
pub fn normalize_ingredients(fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct RecipeFinder {
    primary: Arc<dyn RecipeProvider>,
    secondary: Option<Arc<dyn RecipeProvider>>,
}

impl RecipeFinder {
    pub fn new(primary: Arc<dyn RecipeProvider>, secondary: Option<Arc<dyn RecipeProvider>>) -> Self {
        Self { primary, secondary }
    }

    /// Searches the primary provider, then the secondary one. Total failure is an empty list.
    pub async fn find(&self, fields: &[String]) -> Vec<Recipe> {
        let ingredients = normalize_ingredients(fields).join(",");
        if ingredients.is_empty() {
            return Vec::new();
        }

        match self.primary.find_by_ingredients(&ingredients).await {
            Ok(recipes) => {
                info!("{} returned {} recipes for [{}]", self.primary.name(), recipes.len(), ingredients);
                return recipes;
            }
            Err(e) => warn!("{} lookup failed: {}", self.primary.name(), e),
        }

        let Some(secondary) = &self.secondary else {
            return Vec::new();
        };
        match secondary.find_by_ingredients(&ingredients).await {
            Ok(recipes) => {
                info!("{} returned {} recipes for [{}]", secondary.name(), recipes.len(), ingredients);
                recipes
            }
            Err(e) => {
                error!("{} lookup failed, no recipes available: {}", secondary.name(), e);
                Vec::new()
            }
        }
    }
}
