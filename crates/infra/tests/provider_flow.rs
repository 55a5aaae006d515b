//! End-to-end flows against a mock provider: authentication, search
//! pagination, expansion, id-cache translation, and metadata lookups.

use std::sync::Arc;

use prospectarc_core::ports::{CompanyIdCache, SearchTransport};
use prospectarc_core::QueryBuilder;
use prospectarc_domain::{ContactQuery, IcpConfig, ProviderConfig};
use prospectarc_infra::{
    build_expansion_engine, AppConfig, MemoryTokenStore, ProviderClient, RequestExecutor,
    SqliteStore, StaticIcpDefaults, TokenManager,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_provider_config(base_url: String) -> ProviderConfig {
    let mut config = ProviderConfig::new(base_url, "client-id".into(), "client-secret".into());
    config.pacing_interval_ms = 0;
    config
}

async fn mount_auth(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/authenticate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": token, "expiresIn": 3600 })),
        )
        .mount(server)
        .await;
}

fn contact_entries(count: usize) -> Vec<serde_json::Value> {
    (0..count)
        .map(|i| {
            json!({
                "personId": format!("p{i}"),
                "companyId": format!("c{}", i % 3),
                "contactAccuracyScore": 90 + (i % 10)
            })
        })
        .collect()
}

#[tokio::test]
async fn test_expansion_early_stop_end_to_end() {
    let server = MockServer::start().await;
    mount_auth(&server, "test-jwt").await;

    Mock::given(method("POST"))
        .and(path("/search/contact"))
        .and(header("Authorization", "Bearer test-jwt"))
        .and(body_partial_json(json!({ "page": 1, "rpp": 25 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": contact_entries(5) })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/search/contact"))
        .and(body_partial_json(json!({ "page": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig {
        provider: test_provider_config(server.uri()),
        icp: IcpConfig::default(),
    };
    let engine =
        build_expansion_engine(config, Arc::new(MemoryTokenStore::new()), None).unwrap();

    let report = engine.run_expansion(ContactQuery::default(), 3, true).await.unwrap();

    assert_eq!(report.found, 5);
    assert!(report.target_met);
    assert!(report.steps_applied.is_empty());
    assert_eq!(report.searches_performed, 1);
}

#[tokio::test]
async fn test_cached_numeric_ids_are_substituted_into_the_wire_body() {
    let server = MockServer::start().await;
    mount_auth(&server, "test-jwt").await;

    // The hashed id with a cached mapping is replaced; the unknown one
    // passes through unchanged
    Mock::given(method("POST"))
        .and(path("/search/contact"))
        .and(body_partial_json(json!({ "companyIds": "987,hash-unknown" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = SqliteStore::open_in_memory().unwrap();
    CompanyIdCache::set(&cache, "hash-known", 987).await.unwrap();

    let config = test_provider_config(server.uri());
    let auth =
        Arc::new(TokenManager::new(config.clone(), Arc::new(MemoryTokenStore::new())).unwrap());
    let executor = RequestExecutor::new(
        &config,
        auth,
        Arc::new(prospectarc_common::SystemClock),
    )
    .unwrap();
    let builder =
        QueryBuilder::new(Arc::new(StaticIcpDefaults::new(IcpConfig::default())), 25);
    let client = ProviderClient::new(executor, builder).with_id_cache(Arc::new(cache));

    let query = ContactQuery {
        company_ids: vec!["hash-known".into(), "hash-unknown".into()],
        ..Default::default()
    };
    client.search_contacts(&query, 1).await.unwrap();

    // Once the unknown id's mapping is learned, later searches use it
    Mock::given(method("POST"))
        .and(path("/search/contact"))
        .and(body_partial_json(json!({ "companyIds": "987,555" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    client.remember_company_id("hash-unknown", 555).await;
    client.search_contacts(&query, 1).await.unwrap();
}

#[tokio::test]
async fn test_usage_lookup_parses_report() {
    let server = MockServer::start().await;
    mount_auth(&server, "test-jwt").await;

    Mock::given(method("GET"))
        .and(path("/lookup/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestsUsed": 150,
            "requestsLimit": 2000,
            "enrichCreditsRemaining": 875
        })))
        .mount(&server)
        .await;

    let config = test_provider_config(server.uri());
    let auth =
        Arc::new(TokenManager::new(config.clone(), Arc::new(MemoryTokenStore::new())).unwrap());
    let executor = RequestExecutor::new(
        &config,
        auth,
        Arc::new(prospectarc_common::SystemClock),
    )
    .unwrap();
    let builder =
        QueryBuilder::new(Arc::new(StaticIcpDefaults::new(IcpConfig::default())), 25);
    let client = ProviderClient::new(executor, builder);

    let usage = client.usage().await.unwrap();
    assert_eq!(usage.requests_used, Some(150));
    assert_eq!(usage.requests_limit, Some(2000));
    assert_eq!(usage.enrich_credits_remaining, Some(875));
    assert_eq!(usage.enrich_credits_used, None);
}

#[tokio::test]
async fn test_fresh_manager_adopts_token_persisted_by_previous_instance() {
    let server = MockServer::start().await;
    // Exactly one authentication across both manager instances
    Mock::given(method("POST"))
        .and(path("/authenticate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "shared-jwt", "expiresIn": 3600 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tokens.db");
    let config = test_provider_config(server.uri());

    {
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let manager = TokenManager::new(config.clone(), store).unwrap();
        assert_eq!(manager.get_token().await.unwrap().value, "shared-jwt");
    }

    let store = Arc::new(SqliteStore::open(&path).unwrap());
    let manager = TokenManager::new(config, store).unwrap();
    assert_eq!(manager.get_token().await.unwrap().value, "shared-jwt");
}

#[tokio::test]
async fn test_enrich_round_trip_through_the_client() {
    let server = MockServer::start().await;
    mount_auth(&server, "test-jwt").await;

    Mock::given(method("POST"))
        .and(path("/enrich/contact"))
        .and(body_partial_json(json!({
            "matchPersonInput": [ { "personId": "p1" }, { "personId": "p2" } ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                {
                    "input": { "personId": "p1" },
                    "data": [ { "personId": "p1", "email": "one@acme.test" } ],
                    "matchStatus": "MATCH"
                },
                { "input": { "personId": "p2" }, "data": [], "matchStatus": "NO_MATCH" }
            ]
        })))
        .mount(&server)
        .await;

    let config = test_provider_config(server.uri());
    let auth =
        Arc::new(TokenManager::new(config.clone(), Arc::new(MemoryTokenStore::new())).unwrap());
    let executor = RequestExecutor::new(
        &config,
        auth,
        Arc::new(prospectarc_common::SystemClock),
    )
    .unwrap();
    let builder =
        QueryBuilder::new(Arc::new(StaticIcpDefaults::new(IcpConfig::default())), 25);
    let client = Arc::new(ProviderClient::new(executor, builder));

    let splitter = prospectarc_core::BatchSplitter::new(
        client,
        prospectarc_domain::BatchCaps::default(),
        20,
    );
    let outcome = splitter
        .enrich(&prospectarc_domain::EnrichQuery::new(vec!["p1".into(), "p2".into()]))
        .await
        .unwrap();

    assert_eq!(outcome.contacts.len(), 1);
    assert_eq!(outcome.contacts[0].email.as_deref(), Some("one@acme.test"));
    assert_eq!(outcome.no_match, vec!["p2"]);
}
