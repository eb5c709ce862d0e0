// SPDX-License-Identifier: MIT
// Copyright 2026 SEQHER Web Team

//! Callable functions client tests against a mock HTTP server.

use httpmock::prelude::*;
use seqher_site::error::AppError;
use seqher_site::services::FunctionsClient;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize, PartialEq)]
struct DonationReceipt {
    id: String,
    amount: u32,
}

#[tokio::test]
async fn test_call_posts_data_and_decodes_result() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/createDonation")
                .json_body(json!({"data": {"amount": 25, "programId": "clean-water"}}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"result": {"id": "don-1", "amount": 25}}));
        })
        .await;

    let client = FunctionsClient::with_base_url(server.base_url()).unwrap();
    let receipt: DonationReceipt = client
        .call(
            "createDonation",
            &json!({"amount": 25, "programId": "clean-water"}),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        receipt,
        DonationReceipt {
            id: "don-1".to_string(),
            amount: 25
        }
    );
}

#[tokio::test]
async fn test_call_surfaces_function_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/bookAppointment");
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({
                    "error": {"status": "INVALID_ARGUMENT", "message": "date is required"}
                }));
        })
        .await;

    let client = FunctionsClient::with_base_url(server.base_url()).unwrap();
    let result: Result<serde_json::Value, AppError> =
        client.call("bookAppointment", &json!({})).await;

    match result {
        Err(AppError::Functions(message)) => {
            assert!(message.contains("INVALID_ARGUMENT"));
            assert!(message.contains("date is required"));
        }
        other => panic!("expected function error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_call_rejects_non_json_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ping");
            then.status(500).body("upstream exploded");
        })
        .await;

    let client = FunctionsClient::with_base_url(server.base_url()).unwrap();
    let result: Result<serde_json::Value, AppError> = client.call("ping", &json!(null)).await;

    assert!(matches!(result, Err(AppError::Functions(_))));
}

#[tokio::test]
async fn test_call_without_result_is_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/ping");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({}));
        })
        .await;

    let client = FunctionsClient::with_base_url(server.base_url()).unwrap();
    let result: Result<serde_json::Value, AppError> = client.call("ping", &json!(null)).await;

    assert!(matches!(result, Err(AppError::Functions(_))));
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentRequest<'a> {
    program_id: &'a str,
    date: &'a str,
}

#[tokio::test]
async fn test_call_serializes_typed_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/bookAppointment")
                .json_body(json!({"data": {"programId": "girls-education", "date": "2026-11-02"}}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"result": "confirmed"}));
        })
        .await;

    let client = FunctionsClient::with_base_url(server.base_url()).unwrap();
    let request = AppointmentRequest {
        program_id: "girls-education",
        date: "2026-11-02",
    };
    let result: String = client.call("bookAppointment", &request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result, "confirmed");
}
