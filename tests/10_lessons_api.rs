mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{data, lesson_body, start_server};

#[tokio::test]
async fn create_then_fetch_keeps_section_order() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/lessons"))
        .json(&lesson_body("Walking in Faith", 2025, "Q3", &["Friday", "Sunday", "Sunday"]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED, "expected 201, got {}", res.status());
    let created = data(res).await?;
    let id = created["id"].as_str().expect("lesson id").to_string();

    let res = client.get(server.url(&format!("/api/lessons/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched = data(res).await?;

    let days: Vec<&str> = fetched["sections"]
        .as_array()
        .expect("sections array")
        .iter()
        .map(|s| s["day"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(days, vec!["Friday", "Sunday", "Sunday"]);
    assert_eq!(fetched["quarter"], "Q3");
    assert_eq!(fetched["language"]["code"], "en");

    Ok(())
}

#[tokio::test]
async fn update_replaces_sections() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    let created = data(
        client
            .post(server.url("/api/lessons"))
            .json(&lesson_body("Grace", 2026, "Q1", &["Sunday", "Monday", "Tuesday"]))
            .send()
            .await?,
    )
    .await?;
    let id = created["id"].as_str().expect("lesson id").to_string();

    let res = client
        .put(server.url(&format!("/api/lessons/{}", id)))
        .json(&lesson_body("Grace Abounding", 2026, "Q1", &["Wednesday"]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = data(res).await?;

    assert_eq!(updated["title"], "Grace Abounding");
    assert_eq!(updated["id"], created["id"]);
    let sections = updated["sections"].as_array().expect("sections array");
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0]["day"], "Wednesday");

    Ok(())
}

#[tokio::test]
async fn invalid_payload_is_rejected_with_message() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    let mut body = lesson_body("", 2026, "Q2", &["Sunday"]);
    body["dailySections"][0]["bibleTexts"] = json!("");

    let res = client.post(server.url("/api/lessons")).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], json!(false));
    let error = body["error"].as_str().expect("error string");
    assert!(error.contains("Title is required"), "unexpected error: {}", error);
    assert!(body["fieldErrors"].get("dailySections").is_some(), "missing field errors: {}", body);

    // Nothing was stored
    let listed = data(client.get(server.url("/api/lessons/list")).send().await?).await?;
    assert_eq!(listed, json!([]));

    Ok(())
}

#[tokio::test]
async fn unknown_lesson_is_not_found() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/api/lessons/00000000-0000-4000-8000-000000000000"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Lesson not found");

    let res = client.get(server.url("/api/lessons/not-a-uuid")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn bulk_delete_requires_ids() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/lessons/delete"))
        .json(&json!({ "ids": [] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Missing or invalid lesson IDs");

    let mut ids = Vec::new();
    for title in ["One", "Two"] {
        let created = data(
            client
                .post(server.url("/api/lessons"))
                .json(&lesson_body(title, 2026, "Q4", &["Sunday"]))
                .send()
                .await?,
        )
        .await?;
        ids.push(created["id"].clone());
    }

    let res = client
        .post(server.url("/api/lessons/delete"))
        .json(&json!({ "ids": ids }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let outcome = data(res).await?;
    assert_eq!(outcome["deletedIds"].as_array().map(Vec::len), Some(2));

    let listed = data(client.get(server.url("/api/lessons/list")).send().await?).await?;
    assert_eq!(listed, json!([]));

    Ok(())
}

#[tokio::test]
async fn search_filters_and_paginates() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    for (title, quarter) in [("Faith one", "Q1"), ("Faith two", "Q1"), ("Faith three", "Q1"), ("Hope", "Q2")] {
        let res = client
            .post(server.url("/api/lessons"))
            .json(&lesson_body(title, 2026, quarter, &["Sunday"]))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let page = data(
        client
            .get(server.url("/api/lessons/search?q=faith&quarter=Q1&limit=2&page=2"))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(page["pagination"]["totalCount"], 3);
    assert_eq!(page["pagination"]["totalPages"], 2);
    assert_eq!(page["pagination"]["currentPage"], 2);
    assert_eq!(page["pagination"]["hasNextPage"], false);
    assert_eq!(page["pagination"]["hasPrevPage"], true);
    // Newest first, so the last page holds the oldest match
    assert_eq!(page["lessons"][0]["title"], "Faith one");

    let res = client.get(server.url("/api/lessons/search?year=soon")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let by_quarter = data(
        client
            .get(server.url("/api/lessons/by-quarter?year=2026&quarter=Q2"))
            .send()
            .await?,
    )
    .await?;
    assert_eq!(by_quarter.as_array().map(Vec::len), Some(1));

    let years = data(client.get(server.url("/api/lessons/years")).send().await?).await?;
    assert_eq!(years, json!([2026]));

    Ok(())
}

#[tokio::test]
async fn lesson_changes_reach_the_activity_feed() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/lessons"))
        .json(&lesson_body("Sabbath Rest", 2026, "Q3", &["Saturday"]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let feed = data(client.get(server.url("/api/notifications")).send().await?).await?;
    assert_eq!(feed[0]["title"], "Lesson Created");
    assert_eq!(feed[0]["type"], "success");

    Ok(())
}
