use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use super::{ RecipeError, RecipeProvider };
use crate::models::recipe::{ slugify, Recipe };

pub const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";

#[derive(Deserialize)]
struct RecipeStub {
    id: u64,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeInformation {
    title: String,
    #[serde(default)]
    analyzed_instructions: Vec<AnalyzedInstruction>,
}

#[derive(Deserialize)]
struct AnalyzedInstruction {
    #[serde(default)]
    steps: Vec<InstructionStep>,
}

#[derive(Deserialize)]
struct InstructionStep {
    step: String,
}

pub struct SpoonacularProvider {
    http: HttpClient,
    base_url: String,
    api_key: String,
    number: usize,
}

impl SpoonacularProvider {
    pub fn new(http: HttpClient, base_url: Option<String>, api_key: String, number: usize) -> Self {
        Self {
            http,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            number,
        }
    }

    async fn information(&self, stub: RecipeStub) -> Result<Recipe, RecipeError> {
        let url = format!("{}/recipes/{}/information", self.base_url, stub.id);
        let info: RecipeInformation = self.http
            .get(url)
            .query(&[("includeNutrition", "false"), ("apiKey", self.api_key.as_str())])
            .send().await?
            .error_for_status()?
            .json().await?;

        let instructions = info.analyzed_instructions
            .into_iter()
            .next()
            .map(|first| first.steps.into_iter().map(|s| s.step).collect())
            .unwrap_or_default();

        Ok(Recipe {
            id: stub.id.to_string(),
            source_url: format!("https://spoonacular.com/recipes/{}-{}", slugify(&info.title), stub.id),
            title: info.title,
            image: stub.image,
            instructions,
        })
    }
}

#[async_trait]
impl RecipeProvider for SpoonacularProvider {
    fn name(&self) -> &'static str {
        "spoonacular"
    }

    async fn find_by_ingredients(&self, ingredients: &str) -> Result<Vec<Recipe>, RecipeError> {
        let number = self.number.to_string();
        let stubs: Vec<RecipeStub> = self.http
            .get(format!("{}/recipes/findByIngredients", self.base_url))
            .query(
                &[
                    ("ingredients", ingredients),
                    ("number", number.as_str()),
                    ("apiKey", self.api_key.as_str()),
                ]
            )
            .send().await?
            .error_for_status()?
            .json().await?;

        try_join_all(stubs.into_iter().map(|stub| self.information(stub))).await
    }
}
