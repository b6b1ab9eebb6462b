//! Movie catalog client (TMDB v3 API).

use anyhow::Result;
use marquee_types::{CatalogMovie, MovieDetails, MovieId};
use serde::Deserialize;

use super::http::{build_client, read_json};
use crate::config::Config;
use crate::error::ServiceResult;

/// Shown in place of a missing poster.
pub const PLACEHOLDER_POSTER: &str = "/placeholder-movie.jpg";

/// Number of cast members kept in movie details.
const CAST_LIMIT: usize = 6;

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    results: Vec<CatalogMovie>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    id: MovieId,
    title: String,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    genres: Vec<Named>,
    #[serde(default)]
    credits: Credits,
    #[serde(default)]
    videos: Videos,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Credits {
    #[serde(default)]
    cast: Vec<Named>,
}

#[derive(Debug, Default, Deserialize)]
struct Videos {
    #[serde(default)]
    results: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    key: String,
    #[serde(default)]
    site: String,
    #[serde(default, rename = "type")]
    kind: String,
}

impl From<DetailsResponse> for MovieDetails {
    fn from(details: DetailsResponse) -> Self {
        let trailer = details
            .videos
            .results
            .into_iter()
            .find(|v| v.site == "YouTube" && v.kind == "Trailer")
            .map(|v| v.key);

        MovieDetails {
            id: details.id,
            title: details.title,
            poster_path: details.poster_path,
            synopsis: details.overview,
            genres: details.genres.into_iter().map(|g| g.name).collect(),
            cast: details
                .credits
                .cast
                .into_iter()
                .take(CAST_LIMIT)
                .map(|c| c.name)
                .collect(),
            trailer,
            release_date: details.release_date,
        }
    }
}

/// Catalog client.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    api_key: String,
    image_base_url: String,
    language: Option<String>,
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            image_base_url: crate::config::DEFAULT_IMAGE_URL.to_string(),
            language: None,
            http: build_client(),
        }
    }

    /// Builds the client from config/env.
    ///
    /// # Errors
    /// Returns an error if the API key is missing or the URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = Self::new(config.catalog_url()?, config.catalog_key()?);
        client.image_base_url = config
            .catalog
            .image_base_url
            .trim_end_matches('/')
            .to_string();
        client.language.clone_from(&config.catalog.language);
        Ok(client)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(&[("api_key", self.api_key.as_str())]);
        if let Some(language) = &self.language {
            request = request.query(&[("language", language.as_str())]);
        }
        request
    }

    /// Searches movies by title. A blank query returns no results without a
    /// request.
    ///
    /// # Errors
    /// Returns an error on network failures or rejected requests.
    pub async fn search(&self, query: &str) -> ServiceResult<Vec<CatalogMovie>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .get("/search/movie")
            .query(&[("query", query)])
            .send()
            .await?;
        let page: Page = read_json(response).await?;
        tracing::debug!(query, results = page.results.len(), "catalog search");
        Ok(page.results)
    }

    /// Currently popular movies.
    ///
    /// # Errors
    /// Returns an error on network failures or rejected requests.
    pub async fn popular(&self) -> ServiceResult<Vec<CatalogMovie>> {
        let response = self.get("/movie/popular").send().await?;
        let page: Page = read_json(response).await?;
        Ok(page.results)
    }

    /// Full details with genres, top cast, and the first YouTube trailer.
    ///
    /// # Errors
    /// Returns an error on network failures or rejected requests.
    pub async fn details(&self, id: MovieId) -> ServiceResult<MovieDetails> {
        let response = self
            .get(&format!("/movie/{id}"))
            .query(&[("append_to_response", "videos,credits")])
            .send()
            .await?;
        let details: DetailsResponse = read_json(response).await?;
        Ok(details.into())
    }

    /// Poster URL at the given size (e.g. "w500"), or the placeholder.
    pub fn image_url(&self, path: Option<&str>, size: &str) -> String {
        match path.filter(|p| !p.is_empty()) {
            Some(path) => format!("{}/{size}{path}", self.image_base_url),
            None => PLACEHOLDER_POSTER.to_string(),
        }
    }
}
