//! PostgrestParticipantStore against a wiremock PostgREST endpoint.

use dks_checkin_core::{
    ActivationFlag, ActivationType, ConditionalWrite, ParticipantId, ParticipantStore, StoreError,
};
use dks_checkin_store::{PostgrestParticipantStore, StoreConfig};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE_PATH: &str = "/rest/v1/participantes_dksfestival";
const ANA: &str = "3f2b8c1e-9a4d-4e7b-8c21-5d6f7a8b9c0d";

fn ana() -> ParticipantId {
    ParticipantId::parse(ANA).unwrap()
}

fn test_store(mock_server: &MockServer) -> PostgrestParticipantStore {
    let config = StoreConfig::new(mock_server.uri().parse().unwrap(), "test-key")
        .with_timeout_secs(5);
    PostgrestParticipantStore::new(&config).unwrap()
}

fn ana_row(dice: bool, puzzle: bool) -> serde_json::Value {
    serde_json::json!({
        "uuid": ANA,
        "primeiro_nome": "Ana",
        "email": "ana@example.com",
        "telefone": 11987654321i64,
        "brinde_recebido": false,
        "jogou_quebra_cabeca": puzzle,
        "jogou_jogo_dados": dice,
        "created_at": "2026-09-12T18:30:00.123456+00:00"
    })
}

// ── fetch ────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_sends_filter_and_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("select", "*"))
        .and(query_param("uuid", format!("eq.{ANA}")))
        .and(header("apikey", "test-key"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([ana_row(
            true, false
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server);
    let participant = store.fetch_by_identifier(ana()).await.unwrap().unwrap();

    assert_eq!(participant.id(), ana());
    assert_eq!(participant.display_name(), "Ana");
    assert!(participant.has_played(ActivationType::DiceGame));
    assert!(!participant.has_played(ActivationType::Puzzle));
}

#[tokio::test]
async fn fetch_empty_result_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server);

    assert!(store.fetch_by_identifier(ana()).await.unwrap().is_none());
}

#[tokio::test]
async fn fetch_server_error_is_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"Invalid API key"}"#))
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server);

    match store.fetch_by_identifier(ana()).await {
        Err(StoreError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_malformed_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"rows": []})))
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server);

    assert!(matches!(
        store.fetch_by_identifier(ana()).await,
        Err(StoreError::Decode(_))
    ));
}

#[tokio::test]
async fn unreachable_store_is_transport_error() {
    let config = StoreConfig::new("http://127.0.0.1:9".parse().unwrap(), "test-key")
        .with_timeout_secs(1);
    let store = PostgrestParticipantStore::new(&config).unwrap();

    assert!(matches!(
        store.fetch_by_identifier(ana()).await,
        Err(StoreError::Transport(_))
    ));
}

// ── update ───────────────────────────────────────────────────────────

#[tokio::test]
async fn update_patches_only_the_flag_column() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .and(query_param("uuid", format!("eq.{ANA}")))
        .and(header("prefer", "return=minimal"))
        .and(body_json(serde_json::json!({"jogou_quebra_cabeca": true})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server);

    store
        .update_flag(ana(), ActivationFlag::HasPlayedPuzzle)
        .await
        .unwrap();
}

#[tokio::test]
async fn rejected_update_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server);
    let result = store
        .update_flag(ana(), ActivationFlag::HasPlayedDiceGame)
        .await;

    assert!(matches!(result, Err(StoreError::Status { status: 403, .. })));
}

// ── conditional update ───────────────────────────────────────────────

#[tokio::test]
async fn conditional_update_applied_when_row_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .and(query_param("uuid", format!("eq.{ANA}")))
        .and(query_param("jogou_jogo_dados", "not.is.true"))
        .and(header("prefer", "return=representation"))
        .and(body_json(serde_json::json!({"jogou_jogo_dados": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([ana_row(
            true, false
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server);
    let result = store
        .set_flag_if_unset(ana(), ActivationFlag::HasPlayedDiceGame)
        .await
        .unwrap();

    assert_eq!(result, ConditionalWrite::Applied);
}

#[tokio::test]
async fn conditional_update_not_applied_when_nothing_matched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(TABLE_PATH))
        .and(query_param("jogou_quebra_cabeca", "not.is.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    let store = test_store(&mock_server);
    let result = store
        .set_flag_if_unset(ana(), ActivationFlag::HasPlayedPuzzle)
        .await
        .unwrap();

    assert_eq!(result, ConditionalWrite::NotApplied);
}
