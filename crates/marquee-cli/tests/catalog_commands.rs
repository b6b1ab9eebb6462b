//! Catalog, watchlist, and rating commands against mock services.

mod support;

use predicates::prelude::*;
use serde_json::json;
use support::{can_bind_localhost, marquee, remember, token_body};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_refresh(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("at-2", "rt-new")))
        .mount(server)
        .await;
}

async fn mount_matrix_details(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/movie/603"))
        .and(query_param("append_to_response", "videos,credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 603,
            "title": "The Matrix",
            "poster_path": "/matrix.jpg",
            "overview": "A hacker learns the truth.",
            "release_date": "1999-03-30",
            "genres": [{"name": "Action"}, {"name": "Science Fiction"}],
            "credits": {"cast": [{"name": "Keanu Reeves"}]},
            "videos": {"results": [{"key": "abc123", "site": "YouTube", "type": "Trailer"}]}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_movies_popular_lists_results() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("api_key", "tmdb-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": 603, "title": "The Matrix", "release_date": "1999-03-30", "vote_average": 8.2},
                {"id": 604, "title": "The Matrix Reloaded"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    marquee(home.path(), &server)
        .args(["movies", "popular"])
        .assert()
        .success()
        .stdout(predicate::str::contains("603  The Matrix (1999)"))
        .stdout(predicate::str::contains("604  The Matrix Reloaded"));
}

#[tokio::test]
async fn test_movies_search_reports_catalog_failure() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status_message": "Invalid API key: You must be granted a valid key."
        })))
        .mount(&server)
        .await;

    marquee(home.path(), &server)
        .args(["movies", "search", "the", "matrix"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("search for 'the matrix'"))
        .stderr(predicate::str::contains("Invalid API key"));
}

#[tokio::test]
async fn test_movies_show_prints_details_and_average() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_matrix_details(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/ratings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"movie_id": 603, "rating": 9, "review": "Great"},
            {"movie_id": 603, "rating": 8}
        ])))
        .mount(&server)
        .await;

    marquee(home.path(), &server)
        .args(["movies", "show", "603"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Matrix (1999)"))
        .stdout(predicate::str::contains("Action, Science Fiction"))
        .stdout(predicate::str::contains("https://www.youtube.com/watch?v=abc123"))
        .stdout(predicate::str::contains("8.5/10 from 2 review(s)"));
}

#[tokio::test]
async fn test_watchlist_add_stores_title_and_poster() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    remember(home.path(), "ada@example.com", "rt-old");
    let server = MockServer::start().await;
    mount_refresh(&server).await;
    mount_matrix_details(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/watchlist"))
        .and(body_partial_json(json!({
            "user_id": "u-1",
            "movie_id": 603,
            "movie_title": "The Matrix"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    marquee(home.path(), &server)
        .args(["watchlist", "add", "603"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added \"The Matrix\" to your watchlist"));
}

#[tokio::test]
async fn test_watchlist_add_duplicate_is_informational() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    remember(home.path(), "ada@example.com", "rt-old");
    let server = MockServer::start().await;
    mount_refresh(&server).await;
    mount_matrix_details(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/watchlist"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint"
        })))
        .mount(&server)
        .await;

    marquee(home.path(), &server)
        .args(["watchlist", "add", "603"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in your watchlist"));
}

#[tokio::test]
async fn test_watchlist_list_prints_entries() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    remember(home.path(), "ada@example.com", "rt-old");
    let server = MockServer::start().await;
    mount_refresh(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/watchlist"))
        .and(query_param("user_id", "eq.u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "user_id": "u-1",
                "movie_id": 603,
                "movie_title": "The Matrix",
                "added_at": "2024-05-01T12:00:00Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    marquee(home.path(), &server)
        .args(["watchlist", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-05-01"))
        .stdout(predicate::str::contains("The Matrix"));
}

#[tokio::test]
async fn test_rate_rejects_out_of_range_score() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    remember(home.path(), "ada@example.com", "rt-old");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("at", "rt")))
        .expect(0)
        .mount(&server)
        .await;

    marquee(home.path(), &server)
        .args(["rate", "603", "11"])
        .assert()
        .failure();
}
