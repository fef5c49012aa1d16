use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use tzindex_hasura::{generate, HasuraClient, HasuraError, Metadata};
use tzindex_tests::{
    defaults::{ADMIN_SECRET, SCHEMA},
    fixtures::{
        closed_addr, hasura_config, silent_gateway, spawn_gateway, token_registry, GatewayState,
    },
};

fn metadata() -> Metadata {
    generate(&token_registry(Some("tokens")), &[], SCHEMA).unwrap()
}

#[tokio::test]
async fn test_configure_waits_through_failed_health_checks() {
    let (addr, gateway) = spawn_gateway(GatewayState {
        unhealthy_for: 59,
        ..Default::default()
    })
    .await;

    let client = HasuraClient::new(&hasura_config(addr, 60)).unwrap();
    let pushed = client.configure(metadata()).await.unwrap();

    let gateway = gateway.lock().unwrap();
    assert_eq!(gateway.health_calls, 60);
    assert_eq!(gateway.queries, vec!["export_metadata", "replace_metadata"]);
    assert_eq!(
        gateway.admin_secrets,
        vec![Some(ADMIN_SECRET.to_string()), Some(ADMIN_SECRET.to_string())]
    );
    assert_eq!(gateway.metadata, serde_json::to_value(&pushed).unwrap());
}

#[tokio::test]
async fn test_configure_gives_up_when_never_healthy() {
    let (addr, gateway) = spawn_gateway(GatewayState {
        unhealthy_for: 60,
        ..Default::default()
    })
    .await;

    let client = HasuraClient::new(&hasura_config(addr, 60)).unwrap();
    let err = client.configure(metadata()).await.unwrap_err();

    assert!(matches!(err, HasuraError::Unhealthy { attempts: 60 }));
    let gateway = gateway.lock().unwrap();
    assert_eq!(gateway.health_calls, 60);
    assert!(gateway.queries.is_empty());
}

#[tokio::test]
async fn test_configure_gives_up_when_unreachable() {
    let client = HasuraClient::new(&hasura_config(closed_addr(), 3)).unwrap();
    let err = client.configure(metadata()).await.unwrap_err();
    assert!(matches!(err, HasuraError::Unhealthy { attempts: 3 }));
}

#[tokio::test]
async fn test_configure_gives_up_when_gateway_never_answers() {
    let (addr, _listener) = silent_gateway();

    let mut config = hasura_config(addr, 2);
    config.health_check_timeout_ms = 50;
    let client = HasuraClient::new(&config).unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), client.configure(metadata()))
        .await
        .expect("health polling should give up on its own")
        .unwrap_err();
    assert!(matches!(err, HasuraError::Unhealthy { attempts: 2 }));
}

#[tokio::test]
async fn test_configure_keeps_foreign_tables_and_is_idempotent() {
    let legacy = json!({
        "table": {"schema": "public", "name": "legacy"},
        "object_relationships": [],
        "array_relationships": [],
        "select_permissions": [],
        "insert_permissions": [{"role": "admin", "permission": {"check": {}, "columns": "*"}}]
    });
    let (addr, gateway) = spawn_gateway(GatewayState {
        metadata: json!({
            "version": 2,
            "tables": [
                {"table": {"schema": "public", "name": "token"}},
                legacy.clone()
            ]
        }),
        ..Default::default()
    })
    .await;

    let client = HasuraClient::new(&hasura_config(addr, 1)).unwrap();
    let first = client.configure(metadata()).await.unwrap();
    let after_first = gateway.lock().unwrap().metadata.clone();

    let second = client.configure(metadata()).await.unwrap();
    let after_second = gateway.lock().unwrap().metadata.clone();

    assert_eq!(first, second);
    assert_eq!(after_first, after_second);

    let names = second
        .tables
        .iter()
        .map(|t| t.table.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["token", "account", "legacy"]);
    assert_eq!(after_second["tables"][2], legacy);
}

#[tokio::test]
async fn test_configure_surfaces_rejections() {
    let (addr, _gateway) = spawn_gateway(GatewayState {
        reject_replace: true,
        ..Default::default()
    })
    .await;

    let client = HasuraClient::new(&hasura_config(addr, 1)).unwrap();
    let err = client.configure(metadata()).await.unwrap_err();

    match err {
        HasuraError::Rejected(body) => assert_eq!(body["error"], "table not found"),
        other => panic!("unexpected error: {other:?}"),
    }
}
