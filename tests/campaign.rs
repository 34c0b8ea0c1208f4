use std::time::Duration;

use actix_web::http::StatusCode;
use awc::Client;
use serde_json::json;

use campaign_server::{CampaignBody, CampaignListBody, CreateCampaignBody, UpdateCampaignBody};

const BASE: &str = "http://localhost:8117";

async fn wait_for_server(client: &Client) {
    for _ in 0..50 {
        if client
            .get(format!("{}/campaigns", BASE))
            .send()
            .await
            .is_ok()
        {
            return;
        }
        actix_web::rt::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not start");
}

#[actix_web::test]
async fn campaign_crud_lifecycle() {
    std::env::remove_var("MONGODB_URI");
    std::env::set_var("BIND_ADDR", "127.0.0.1:8117");
    let _ = std::thread::spawn(|| campaign_server::run(false));

    let client = Client::default();
    wait_for_server(&client).await;

    // names get trimmed and bare dates are read as midnight UTC
    let mut response = client
        .post(format!("{}/campaigns", BASE))
        .send_json(&json!({ "name": "  Summer Launch  ", "due_date": "2025-01-01" }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: CampaignBody = response.json().await.unwrap();
    assert_eq!(created.name, "Summer Launch".to_string());
    assert_eq!(
        created.due_date.unwrap().to_rfc3339(),
        "2025-01-01T00:00:00+00:00"
    );

    // the list envelope reports the created campaign
    let mut response = client
        .get(format!("{}/campaigns", BASE))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list: CampaignListBody = response.json().await.unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.campaigns[0], created);

    // fetching by id round-trips the creation result
    let mut response = client
        .get(format!("{}/campaigns/{}", BASE, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: CampaignBody = response.json().await.unwrap();
    assert_eq!(fetched, created);

    // whitespace-only names are a validation error
    let response = client
        .post(format!("{}/campaigns", BASE))
        .send_json(&CreateCampaignBody {
            name: "   ".to_string(),
            due_date: None,
        })
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // malformed and non-positive ids are request-shape errors, not 404s
    let response = client
        .get(format!("{}/campaigns/not-a-number", BASE))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let response = client
        .get(format!("{}/campaigns/0", BASE))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // updating an unknown id reports not-found even with an invalid name
    let response = client
        .put(format!("{}/campaigns/9999", BASE))
        .send_json(&json!({ "name": "" }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // an update with nothing to change is a client error
    let response = client
        .put(format!("{}/campaigns/{}", BASE, created.id))
        .send_json(&json!({}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // a partial update trims the name and leaves everything else alone
    let mut response = client
        .put(format!("{}/campaigns/{}", BASE, created.id))
        .send_json(&UpdateCampaignBody {
            name: Some("  Autumn Launch  ".to_string()),
            due_date: None,
        })
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: CampaignBody = response.json().await.unwrap();
    assert_eq!(updated.name, "Autumn Launch".to_string());
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.due_date, created.due_date);
    assert_eq!(updated.created_at, created.created_at);

    // an explicit null clears the due date
    let mut response = client
        .put(format!("{}/campaigns/{}", BASE, created.id))
        .send_json(&json!({ "due_date": null }))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared: CampaignBody = response.json().await.unwrap();
    assert_eq!(cleared.name, "Autumn Launch".to_string());
    assert_eq!(cleared.due_date, None);

    // deleting removes the campaign; doing it again is a 404
    let response = client
        .delete(format!("{}/campaigns/{}", BASE, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = client
        .get(format!("{}/campaigns/{}", BASE, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = client
        .delete(format!("{}/campaigns/{}", BASE, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // unknown paths fall through to the default 404
    let response = client
        .get(format!("{}/does-not-exist", BASE))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
