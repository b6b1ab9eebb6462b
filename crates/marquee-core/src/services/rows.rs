//! Row service client (PostgREST-style `/rest/v1` API).
//!
//! Watchlist and rating rows are scoped to the signed-in user: every
//! mutation carries the user's bearer token and `user_id`.

use chrono::Utc;
use marquee_types::{MovieId, Rating, Session, WatchlistEntry};
use serde_json::json;
use tracing::info;

use super::auth::Backend;
use super::http::{expect_success, read_json};
use crate::error::{ServiceError, ServiceErrorKind, ServiceResult};
use crate::validate;

const WATCHLIST: &str = "/rest/v1/watchlist";
const RATINGS: &str = "/rest/v1/ratings";
const PROFILES: &str = "/rest/v1/profiles";

/// Row service client.
#[derive(Debug, Clone)]
pub struct RowsClient {
    backend: Backend,
}

impl RowsClient {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Lists the user's watchlist, newest first.
    ///
    /// # Errors
    /// Returns an error on network failures or when the service rejects the
    /// request.
    pub async fn list_watchlist(&self, session: &Session) -> ServiceResult<Vec<WatchlistEntry>> {
        let response = self
            .backend
            .request(reqwest::Method::GET, WATCHLIST, Some(&session.access_token))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", session.user.id)),
                ("order", "added_at.desc".to_string()),
            ])
            .send()
            .await?;
        read_json(response).await
    }

    /// Adds a movie to the watchlist.
    ///
    /// # Errors
    /// Returns an `HttpStatus` error (409) when the movie is already listed.
    pub async fn add_watchlist_entry(
        &self,
        session: &Session,
        movie_id: MovieId,
        title: &str,
        poster: Option<&str>,
    ) -> ServiceResult<()> {
        let row = WatchlistEntry {
            id: None,
            user_id: session.user.id.clone(),
            movie_id,
            movie_title: title.to_string(),
            movie_poster: poster.map(str::to_string),
            added_at: None,
        };
        let response = self
            .backend
            .request(reqwest::Method::POST, WATCHLIST, Some(&session.access_token))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        expect_success(response).await?;
        info!(movie_id, "added to watchlist");
        Ok(())
    }

    /// Removes a movie from the watchlist. Removing an unlisted movie
    /// succeeds.
    ///
    /// # Errors
    /// Returns an error on network failures or rejected requests.
    pub async fn remove_watchlist_entry(
        &self,
        session: &Session,
        movie_id: MovieId,
    ) -> ServiceResult<()> {
        let response = self
            .backend
            .request(reqwest::Method::DELETE, WATCHLIST, Some(&session.access_token))
            .query(&[
                ("user_id", format!("eq.{}", session.user.id)),
                ("movie_id", format!("eq.{movie_id}")),
            ])
            .send()
            .await?;
        expect_success(response).await?;
        info!(movie_id, "removed from watchlist");
        Ok(())
    }

    /// Creates or replaces the user's rating for a movie.
    ///
    /// # Errors
    /// Returns an `Invalid` error for a score outside 1-10 without calling the
    /// service; otherwise network or status errors.
    pub async fn upsert_rating(
        &self,
        session: &Session,
        movie_id: MovieId,
        score: u8,
        review: &str,
    ) -> ServiceResult<()> {
        let score = validate::rating(score)
            .map_err(|e| ServiceError::new(ServiceErrorKind::Invalid, e.to_string()))?;
        let body = json!({
            "user_id": session.user.id,
            "movie_id": movie_id,
            "rating": score,
            "review": review.trim(),
            "updated_at": Utc::now().to_rfc3339(),
        });
        let response = self
            .backend
            .request(reqwest::Method::POST, RATINGS, Some(&session.access_token))
            .query(&[("on_conflict", "user_id,movie_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body)
            .send()
            .await?;
        expect_success(response).await?;
        info!(movie_id, score, "rating saved");
        Ok(())
    }

    /// The user's own rating for a movie, if any.
    ///
    /// # Errors
    /// Returns an error on network failures or rejected requests.
    pub async fn my_rating(
        &self,
        session: &Session,
        movie_id: MovieId,
    ) -> ServiceResult<Option<Rating>> {
        let response = self
            .backend
            .request(reqwest::Method::GET, RATINGS, Some(&session.access_token))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", session.user.id)),
                ("movie_id", format!("eq.{movie_id}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        let mut rows: Vec<Rating> = read_json(response).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// All ratings for a movie, newest first. Readable without signing in.
    ///
    /// # Errors
    /// Returns an error on network failures or rejected requests.
    pub async fn ratings_for_movie(
        &self,
        session: Option<&Session>,
        movie_id: MovieId,
    ) -> ServiceResult<Vec<Rating>> {
        self.list_ratings(session, ("movie_id", format!("eq.{movie_id}")))
            .await
    }

    /// All ratings by a user, newest first.
    ///
    /// # Errors
    /// Returns an error on network failures or rejected requests.
    pub async fn ratings_for_user(
        &self,
        session: Option<&Session>,
        user_id: &str,
    ) -> ServiceResult<Vec<Rating>> {
        self.list_ratings(session, ("user_id", format!("eq.{user_id}")))
            .await
    }

    async fn list_ratings(
        &self,
        session: Option<&Session>,
        filter: (&str, String),
    ) -> ServiceResult<Vec<Rating>> {
        let token = session.map(|s| s.access_token.as_str());
        let response = self
            .backend
            .request(reqwest::Method::GET, RATINGS, token)
            .query(&[
                ("select", "*".to_string()),
                (filter.0, filter.1),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;
        read_json(response).await
    }

    /// Creates or updates the public profile row for the user.
    ///
    /// # Errors
    /// Returns an error on network failures or rejected requests.
    pub async fn upsert_profile(
        &self,
        session: &Session,
        username: Option<&str>,
        avatar_url: Option<&str>,
    ) -> ServiceResult<()> {
        let body = json!({
            "id": session.user.id,
            "username": username,
            "avatar_url": avatar_url,
            "updated_at": Utc::now().to_rfc3339(),
        });
        let response = self
            .backend
            .request(reqwest::Method::POST, PROFILES, Some(&session.access_token))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body)
            .send()
            .await?;
        expect_success(response).await
    }
}

/// Mean score rounded to one decimal; `None` without ratings.
pub fn average_score(ratings: &[Rating]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let total: u32 = ratings.iter().map(|r| u32::from(r.rating)).sum();
    let mean = f64::from(total) / ratings.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use marquee_types::{User, UserMetadata};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, header_regex, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn session() -> Session {
        Session {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_at: None,
            user: User {
                id: "u-1".to_string(),
                email: Some("a@b.com".to_string()),
                user_metadata: UserMetadata::default(),
            },
        }
    }

    fn client(server: &MockServer) -> RowsClient {
        RowsClient::new(Backend::new(server.uri(), "anon-key"))
    }

    fn rating(score: u8) -> Rating {
        Rating {
            user_id: None,
            movie_id: 1,
            rating: score,
            review: String::new(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_watchlist_filters_by_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/watchlist"))
            .and(query_param("user_id", "eq.u-1"))
            .and(query_param("order", "added_at.desc"))
            .and(header("authorization", "Bearer at"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 2, "user_id": "u-1", "movie_id": 603, "movie_title": "The Matrix",
                 "movie_poster": "/m.jpg", "added_at": "2024-05-01T10:00:00+00:00"},
                {"id": 1, "user_id": "u-1", "movie_id": 13, "movie_title": "Forrest Gump",
                 "movie_poster": null, "added_at": "2024-04-01T10:00:00+00:00"}
            ])))
            .mount(&server)
            .await;

        let rows = client(&server).list_watchlist(&session()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].movie_title, "The Matrix");
        assert_eq!(rows[1].movie_poster, None);
    }

    #[tokio::test]
    async fn test_add_duplicate_reports_service_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/watchlist"))
            .and(body_partial_json(json!({"user_id": "u-1", "movie_id": 603})))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .add_watchlist_entry(&session(), 603, "The Matrix", None)
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(409));
        assert!(err.to_string().starts_with("duplicate key"));
    }

    #[tokio::test]
    async fn test_remove_targets_single_row() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/watchlist"))
            .and(query_param("user_id", "eq.u-1"))
            .and(query_param("movie_id", "eq.603"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .remove_watchlist_entry(&session(), 603)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upsert_rating_merges_duplicates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/ratings"))
            .and(query_param("on_conflict", "user_id,movie_id"))
            .and(header_regex("prefer", "resolution=merge-duplicates"))
            .and(body_partial_json(json!({"user_id": "u-1", "movie_id": 603, "rating": 9, "review": "great"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .upsert_rating(&session(), 603, 9, "  great ")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upsert_rating_rejects_out_of_range_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server)
            .upsert_rating(&session(), 603, 11, "")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::Invalid);
        assert_eq!(err.to_string(), "Select a rating 1-10");
    }

    #[tokio::test]
    async fn test_my_rating_empty_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/ratings"))
            .and(query_param("movie_id", "eq.603"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert_eq!(client(&server).my_rating(&session(), 603).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ratings_for_movie_anonymous_uses_public_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/ratings"))
            .and(header("authorization", "Bearer anon-key"))
            .and(query_param("movie_id", "eq.603"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"user_id": "u-2", "movie_id": 603, "rating": 8, "review": "",
                 "created_at": "2024-05-01T10:00:00+00:00"}
            ])))
            .mount(&server)
            .await;

        let ratings = client(&server).ratings_for_movie(None, 603).await.unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating, 8);
    }

    #[test]
    fn test_average_score_rounds_to_one_decimal() {
        assert_eq!(average_score(&[]), None);
        assert_eq!(average_score(&[rating(8)]), Some(8.0));
        assert_eq!(average_score(&[rating(7), rating(8), rating(8)]), Some(7.7));
    }
}
