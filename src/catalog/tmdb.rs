//! TMDb v3 client
//!
//! - search: `/search/multi`, movies and TV only
//! - detail: `/movie/{id}` or `/tv/{id}` plus credits
//!
//! Credits are best effort: a failed credits call yields an empty cast.

use super::{CastMember, Catalog, DetailRecord, LookupError};
use crate::config::{Config, Credentials};
use crate::error::Result;
use media_diary_common::{Candidate, MediaKind};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const API_BASE: &str = "https://api.themoviedb.org/3";
const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
const POSTER_SIZE: &str = "w500";
const PROFILE_SIZE: &str = "w185";
const CAST_LIMIT: usize = 20;

pub struct TmdbClient {
    http: reqwest::Client,
    credentials: Credentials,
    language: String,
}

impl TmdbClient {
    pub fn new(
        credentials: Credentials,
        language: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LookupError::from)?;

        Ok(Self {
            http,
            credentials,
            language: language.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.credentials()?,
            config.language.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// One page of `/search/multi`, movies and series only
    pub async fn search(
        &self,
        query: &str,
        page: u32,
    ) -> std::result::Result<Vec<Candidate>, LookupError> {
        let params = [
            ("query", query.to_string()),
            ("include_adult", "false".to_string()),
            ("page", page.to_string()),
        ];
        let data: SearchPage = self.get_json("/search/multi", &params).await?;
        Ok(candidates_from_page(data))
    }

    async fn get_movie(&self, id: u64) -> std::result::Result<DetailRecord, LookupError> {
        let raw: RawDetail = self.get_json(&format!("/movie/{}", id), &[]).await?;
        let credits_path = format!("/movie/{}/credits", id);
        let credits = match self.get_json::<RawCredits>(&credits_path, &[]).await {
            Ok(credits) => credits,
            Err(e) => {
                warn!(id, error = %e, "movie credits unavailable");
                RawCredits::default()
            }
        };
        Ok(detail_from_raw(raw, MediaKind::Movie, credits))
    }

    async fn get_series(&self, id: u64) -> std::result::Result<DetailRecord, LookupError> {
        let raw: RawDetail = self.get_json(&format!("/tv/{}", id), &[]).await?;

        // aggregate_credits covers every season; plain credits only the latest
        let credits = match self
            .get_json::<RawCredits>(&format!("/tv/{}/aggregate_credits", id), &[])
            .await
        {
            Ok(credits) => credits,
            Err(e) => {
                debug!(id, error = %e, "aggregate credits unavailable, trying credits");
                match self.get_json::<RawCredits>(&format!("/tv/{}/credits", id), &[]).await {
                    Ok(credits) => credits,
                    Err(e) => {
                        warn!(id, error = %e, "series credits unavailable");
                        RawCredits::default()
                    }
                }
            }
        };
        Ok(detail_from_raw(raw, MediaKind::Series, credits))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<T, LookupError> {
        let mut query: Vec<(&str, String)> = params.to_vec();
        query.push(("language", self.language.clone()));

        let mut request = self.http.get(format!("{}{}", API_BASE, path));
        match &self.credentials {
            Credentials::Bearer(token) => request = request.bearer_auth(token),
            Credentials::ApiKey(key) => query.push(("api_key", key.clone())),
        }

        debug!(path, "GET tmdb");
        let response = request.query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LookupError::Parse(format!("{}: {}", path, e)))
    }
}

#[async_trait::async_trait]
impl Catalog for TmdbClient {
    async fn search_by_title(
        &self,
        text: &str,
        year_hint: Option<i32>,
    ) -> std::result::Result<Vec<Candidate>, LookupError> {
        // /search/multi has no year filter; the year rides along in the query
        let query = match year_hint {
            Some(year) => format!("{} {}", text, year),
            None => text.to_string(),
        };
        self.search(query.trim(), 1).await
    }

    async fn fetch_detail(
        &self,
        kind: MediaKind,
        id: u64,
    ) -> std::result::Result<DetailRecord, LookupError> {
        match kind {
            MediaKind::Movie => self.get_movie(id).await,
            MediaKind::Series => self.get_series(id).await,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchPage {
    results: Vec<SearchItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchItem {
    id: u64,
    media_type: Option<String>,
    title: Option<String>,
    name: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDetail {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    poster_path: Option<String>,
    overview: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    status: Option<String>,
    genres: Vec<Named>,
    production_companies: Vec<Named>,
    runtime: Option<u32>,
    episode_run_time: Vec<u32>,
    vote_average: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCredits {
    cast: Vec<RawCast>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCast {
    id: Option<u64>,
    name: Option<String>,
    character: Option<String>,
    /// aggregate_credits lists characters per role
    roles: Vec<RawRole>,
    profile_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRole {
    character: Option<String>,
}

fn candidates_from_page(page: SearchPage) -> Vec<Candidate> {
    page.results
        .into_iter()
        .filter_map(|item| {
            let kind = match item.media_type.as_deref() {
                Some("movie") => MediaKind::Movie,
                Some("tv") => MediaKind::Series,
                _ => return None,
            };
            let date = item.release_date.as_deref().or(item.first_air_date.as_deref());

            Some(Candidate {
                external_id: item.id.to_string(),
                kind,
                title: first_title(item.title, item.name),
                year: year_of(date),
                poster: image_url(item.poster_path.as_deref(), POSTER_SIZE),
                overview: item.overview.filter(|o| !o.is_empty()),
            })
        })
        .collect()
}

fn detail_from_raw(raw: RawDetail, kind: MediaKind, credits: RawCredits) -> DetailRecord {
    let (title, date) = match kind {
        MediaKind::Movie => (first_title(raw.title, raw.name), raw.release_date),
        MediaKind::Series => (first_title(raw.name, raw.title), raw.first_air_date),
    };
    let runtime = raw
        .runtime
        .filter(|r| *r > 0)
        .or_else(|| raw.episode_run_time.first().copied());

    DetailRecord {
        id: raw.id,
        kind,
        title,
        poster: image_url(raw.poster_path.as_deref(), POSTER_SIZE),
        overview: raw.overview.filter(|o| !o.is_empty()),
        year: year_of(date.as_deref()),
        status: raw.status,
        genres: names(raw.genres),
        studios: names(raw.production_companies),
        runtime,
        rating: raw.vote_average,
        cast: cast_from_credits(credits),
    }
}

fn cast_from_credits(credits: RawCredits) -> Vec<CastMember> {
    credits
        .cast
        .into_iter()
        .take(CAST_LIMIT)
        .map(|person| {
            let character = person
                .roles
                .first()
                .and_then(|role| role.character.clone())
                .or(person.character);
            CastMember {
                id: person.id,
                name: person.name,
                character,
                photo: image_url(person.profile_path.as_deref(), PROFILE_SIZE),
            }
        })
        .collect()
}

fn first_title(primary: Option<String>, secondary: Option<String>) -> String {
    primary
        .filter(|t| !t.is_empty())
        .or(secondary.filter(|t| !t.is_empty()))
        .unwrap_or_else(|| "Untitled".to_string())
}

fn names(items: Vec<Named>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|n| n.name)
        .filter(|n| !n.is_empty())
        .collect()
}

/// `"2019-05-30"` → 2019
fn year_of(date: Option<&str>) -> Option<i32> {
    date?.split('-').next()?.parse().ok()
}

fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    match path {
        Some(p) if !p.is_empty() => Some(format!("{}/{}{}", IMAGE_BASE, size, p)),
        _ => None,
    }
}
