use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use super::{ RecipeError, RecipeProvider };
use crate::models::recipe::Recipe;

pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MealStub {
    id_meal: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MealDetail {
    id_meal: String,
    str_meal: String,
    #[serde(default)]
    str_meal_thumb: Option<String>,
    #[serde(default)]
    str_instructions: Option<String>,
    #[serde(default)]
    str_source: Option<String>,
}

/// TheMealDB answers `{"meals": null}` when nothing matches.
#[derive(Deserialize)]
struct MealList<T> {
    meals: Option<Vec<T>>,
}

fn split_steps(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl From<MealDetail> for Recipe {
    fn from(meal: MealDetail) -> Self {
        let source_url = meal.str_source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("https://www.themealdb.com/meal/{}", meal.id_meal));
        Recipe {
            instructions: meal.str_instructions.as_deref().map(split_steps).unwrap_or_default(),
            id: meal.id_meal,
            title: meal.str_meal,
            image: meal.str_meal_thumb,
            source_url,
        }
    }
}

pub struct MealDbProvider {
    http: HttpClient,
    base_url: String,
    number: usize,
}

impl MealDbProvider {
    pub fn new(http: HttpClient, base_url: Option<String>, number: usize) -> Self {
        Self {
            http,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            number,
        }
    }

    async fn lookup(&self, id: String) -> Result<Recipe, RecipeError> {
        let list: MealList<MealDetail> = self.http
            .get(format!("{}/lookup.php", self.base_url))
            .query(&[("i", id.as_str())])
            .send().await?
            .error_for_status()?
            .json().await?;

        list.meals
            .and_then(|meals| meals.into_iter().next())
            .map(Recipe::from)
            .ok_or_else(|| RecipeError::Payload(format!("meal {} not found", id)))
    }
}

#[async_trait]
impl RecipeProvider for MealDbProvider {
    fn name(&self) -> &'static str {
        "themealdb"
    }

    async fn find_by_ingredients(&self, ingredients: &str) -> Result<Vec<Recipe>, RecipeError> {
        let list: MealList<MealStub> = self.http
            .get(format!("{}/filter.php", self.base_url))
            .query(&[("i", ingredients)])
            .send().await?
            .error_for_status()?
            .json().await?;

        let ids = list.meals
            .unwrap_or_default()
            .into_iter()
            .take(self.number)
            .map(|stub| stub.id_meal);
        try_join_all(ids.map(|id| self.lookup(id))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_normalizes_into_recipe() {
        let meal = MealDetail {
            id_meal: "52772".into(),
            str_meal: "Teriyaki Chicken".into(),
            str_meal_thumb: Some("https://img/x.jpg".into()),
            str_instructions: Some("Preheat oven.\r\n\r\n  Mix sauce. \nBake.".into()),
            str_source: Some("  ".into()),
        };
        let recipe = Recipe::from(meal);
        assert_eq!(recipe.instructions, vec!["Preheat oven.", "Mix sauce.", "Bake."]);
        assert_eq!(recipe.source_url, "https://www.themealdb.com/meal/52772");
        assert_eq!(recipe.title, "Teriyaki Chicken");
    }
}
