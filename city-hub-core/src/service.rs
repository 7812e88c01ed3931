use crate::{
    config::Settings,
    invoker::SearchInvoker,
    model::{NormalizedRecord, UseCase},
    normalize::normalize,
    provider::init_client,
};

/// Entry points used by the presentation layer. Never fails: problems come back
/// as records carrying an `error`.
#[derive(Debug, Clone)]
pub struct CityInfoService {
    invoker: SearchInvoker,
}

impl CityInfoService {
    pub fn new(invoker: SearchInvoker) -> Self {
        Self { invoker }
    }

    /// Initialize the provider client once from resolved settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let client = init_client(settings);
        Self::new(SearchInvoker::new(client, settings.mock))
    }

    pub fn invoker(&self) -> &SearchInvoker {
        &self.invoker
    }

    pub async fn lookup(&self, use_case: UseCase, city: &str) -> NormalizedRecord {
        let query = use_case.build_query(city);
        let outcome = self.invoker.invoke(&query, use_case.parameters()).await;
        normalize(city, &query, use_case, &outcome)
    }

    pub async fn get_city_weather_info(&self, city: &str) -> NormalizedRecord {
        self.lookup(UseCase::Weather, city).await
    }

    pub async fn get_city_news(&self, city: &str) -> NormalizedRecord {
        self.lookup(UseCase::News, city).await
    }
}
