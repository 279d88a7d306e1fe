//! RPC core integration tests
//!
//! Preconditions, auth injection, id allocation and the three response
//! modes (result, raw envelope, strict).

mod common;

use common::{authenticated_client, client_with, mock_error_response, mock_response, MockTransport, ENDPOINT};
use serde_json::json;
use std::sync::Arc;
use zbx_client::{InvokeOptions, Session, ZabbixClient};
use zbx_core::Error;

#[tokio::test]
async fn test_protected_call_without_token_makes_no_request() {
    let transport = MockTransport::replying(json!([]));
    let client = client_with(transport.clone());

    let result = client
        .invoke("host.get", json!({"output": "extend"}), InvokeOptions::default())
        .await;

    assert!(matches!(result, Err(Error::Authentication(_))));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_empty_token_counts_as_missing() {
    let transport = MockTransport::replying(json!([]));
    let client = client_with(transport.clone());
    client.session().set_token("").await;

    let result = client.invoke("host.get", json!({}), InvokeOptions::default()).await;

    assert!(matches!(result, Err(Error::Authentication(_))));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_missing_endpoint_is_configuration_error() {
    let transport = MockTransport::replying(json!("tok"));
    let client = ZabbixClient::with_transport(Session::new(), transport.clone());

    let result = client
        .invoke("user.login", json!({"username": "Admin", "password": "zabbix"}), InvokeOptions::default())
        .await;

    assert!(matches!(result, Err(Error::Configuration(_))));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_login_needs_no_token() {
    let transport = MockTransport::replying(json!("0424bd59b807674191e7d77572075f33"));
    let client = client_with(transport.clone());

    let result = client
        .invoke("user.login", json!({"username": "Admin", "password": "zabbix"}), InvokeOptions::default())
        .await
        .unwrap();

    assert_eq!(result, json!("0424bd59b807674191e7d77572075f33"));
    let request = &transport.requests()[0];
    assert!(request.get("auth").is_none());
}

#[tokio::test]
async fn test_login_never_carries_existing_token() {
    let transport = MockTransport::replying(json!("new-token"));
    let client = authenticated_client(transport.clone()).await;

    client
        .invoke("user.login", json!({"username": "Admin", "password": "zabbix"}), InvokeOptions::default())
        .await
        .unwrap();

    assert!(transport.requests()[0].get("auth").is_none());
}

#[tokio::test]
async fn test_version_call_is_exempt() {
    let transport = MockTransport::replying(json!("7.0.0"));
    let client = client_with(transport.clone());

    let version = client.api_version().await.unwrap();

    assert_eq!(version, "7.0.0");
    let request = &transport.requests()[0];
    assert_eq!(request["method"], "apiinfo.version");
    assert!(request.get("auth").is_none());
}

#[tokio::test]
async fn test_protected_call_carries_token_and_envelope() {
    let transport = MockTransport::replying(json!([{"hostid": "10084"}]));
    let client = authenticated_client(transport.clone()).await;

    let result = client
        .invoke("host.get", json!({"output": ["hostid"]}), InvokeOptions::default())
        .await
        .unwrap();

    assert_eq!(result, json!([{"hostid": "10084"}]));
    assert_eq!(transport.urls(), vec![ENDPOINT.to_string()]);

    let request = &transport.requests()[0];
    assert_eq!(request["jsonrpc"], "2.0");
    assert_eq!(request["method"], "host.get");
    assert_eq!(request["params"], json!({"output": ["hostid"]}));
    assert_eq!(request["auth"], "tok1");
    assert!(request["id"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_request_ids_strictly_increase() {
    let transport = MockTransport::replying(json!([]));
    let client = authenticated_client(transport.clone()).await;

    for _ in 0..5 {
        client.invoke("host.get", json!({}), InvokeOptions::default()).await.unwrap();
    }

    let ids: Vec<u64> = transport
        .requests()
        .iter()
        .map(|request| request["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids.len(), 5);
    assert!(ids[0] > 0);
    assert!(ids.windows(2).all(|pair| pair[1] > pair[0]), "ids not increasing: {:?}", ids);
}

#[tokio::test]
async fn test_clones_share_id_sequence() {
    let transport = MockTransport::replying(json!([]));
    let client = authenticated_client(transport.clone()).await;
    let other = client.clone();

    client.invoke("host.get", json!({}), InvokeOptions::default()).await.unwrap();
    other.invoke("host.get", json!({}), InvokeOptions::default()).await.unwrap();
    client.invoke("host.get", json!({}), InvokeOptions::default()).await.unwrap();

    let ids: Vec<u64> = transport
        .requests()
        .iter()
        .map(|request| request["id"].as_u64().unwrap())
        .collect();
    assert!(ids.windows(2).all(|pair| pair[1] > pair[0]));
}

#[tokio::test]
async fn test_forced_id_is_used_and_counter_untouched() {
    let transport = MockTransport::replying(json!([]));
    let client = authenticated_client(transport.clone()).await;

    client.invoke("host.get", json!({}), InvokeOptions::default()).await.unwrap();
    client
        .invoke("host.get", json!({}), InvokeOptions::default().with_id(500))
        .await
        .unwrap();
    client.invoke("host.get", json!({}), InvokeOptions::default()).await.unwrap();

    let ids: Vec<u64> = transport
        .requests()
        .iter()
        .map(|request| request["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids[1], 500);
    assert_eq!(ids[2], ids[0] + 1);
}

#[tokio::test]
async fn test_raw_returns_full_envelope() {
    let transport = MockTransport::replying(json!({"hostids": ["10105"]}));
    let client = authenticated_client(transport.clone()).await;

    let envelope = client
        .invoke("host.create", json!({"host": "web-01"}), InvokeOptions::raw().with_id(77))
        .await
        .unwrap();

    assert_eq!(envelope["jsonrpc"], "2.0");
    assert_eq!(envelope["id"], 77);
    assert_eq!(envelope["result"]["hostids"][0], "10105");
}

#[tokio::test]
async fn test_api_error_embedded_by_default() {
    let transport = MockTransport::with_handler(|request| {
        Ok(mock_error_response(&request["id"], -32602, "Invalid params.", "No permissions to referred object or it does not exist!"))
    });
    let client = authenticated_client(transport.clone()).await;

    let envelope = client
        .invoke("host.delete", json!(["999"]), InvokeOptions::default())
        .await
        .unwrap();

    assert_eq!(envelope["error"]["code"], -32602);
    assert_eq!(envelope["error"]["message"], "Invalid params.");
    assert!(envelope.get("result").is_none());
}

#[tokio::test]
async fn test_api_error_raised_in_strict_mode() {
    let transport = MockTransport::with_handler(|request| {
        Ok(mock_error_response(&request["id"], -32500, "Application error.", "Host with the same name \"web-01\" already exists."))
    });
    let client = authenticated_client(transport.clone()).await;

    let result = client
        .invoke("host.create", json!({"host": "web-01"}), InvokeOptions::strict())
        .await;

    match result {
        Err(Error::Api(error)) => {
            assert_eq!(error.code, -32500);
            assert_eq!(error.message, "Application error.");
            assert!(error.data.unwrap().contains("already exists"));
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transport_failure_surfaces() {
    let transport = MockTransport::failing("connection refused");
    let client = authenticated_client(transport.clone()).await;

    let result = client.invoke("host.get", json!({}), InvokeOptions::default()).await;

    match result {
        Err(Error::Transport(message)) => assert!(message.contains("connection refused")),
        other => panic!("Expected Transport error, got {:?}", other),
    }
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_garbage_body_is_invalid_response() {
    let transport = MockTransport::with_handler(|_| Ok("<html>Service Unavailable</html>".to_string()));
    let client = authenticated_client(transport).await;

    let result = client.invoke("host.get", json!({}), InvokeOptions::default()).await;

    assert!(matches!(result, Err(Error::InvalidResponse(_))));
}

#[tokio::test]
async fn test_mismatched_response_id_still_returned() {
    let transport = MockTransport::with_handler(|_| Ok(mock_response(&json!(99999), json!(["ok"]))));
    let client = authenticated_client(transport).await;

    let result = client.invoke("host.get", json!({}), InvokeOptions::default()).await.unwrap();

    assert_eq!(result, json!(["ok"]));
}

#[tokio::test]
async fn test_typed_call() {
    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Host {
        hostid: String,
        host: String,
    }

    let transport = MockTransport::replying(json!([{"hostid": "10084", "host": "Zabbix server"}]));
    let client = authenticated_client(transport).await;

    let hosts: Vec<Host> = client
        .call("host.get", json!({"output": ["hostid", "host"]}))
        .await
        .unwrap();

    assert_eq!(
        hosts,
        vec![Host {
            hostid: "10084".to_string(),
            host: "Zabbix server".to_string()
        }]
    );
}

#[tokio::test]
async fn test_typed_call_shape_mismatch() {
    let transport = MockTransport::replying(json!({"unexpected": true}));
    let client = authenticated_client(transport).await;

    let result: Result<Vec<String>, _> = client.call("host.get", json!({})).await;

    assert!(matches!(result, Err(Error::Serialization(_))));
}

#[tokio::test]
async fn test_concurrent_invokes_get_unique_ids() {
    let transport = MockTransport::replying(json!([]));
    let client = authenticated_client(transport.clone()).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.invoke("host.get", json!({}), InvokeOptions::default()).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut ids: Vec<u64> = transport
        .requests()
        .iter()
        .map(|request| request["id"].as_u64().unwrap())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn test_separate_clients_have_separate_sessions() {
    let transport = MockTransport::replying(json!([]));
    let first = authenticated_client(transport.clone()).await;
    let second = client_with(Arc::clone(&transport));

    first.invoke("host.get", json!({}), InvokeOptions::default()).await.unwrap();
    let result = second.invoke("host.get", json!({}), InvokeOptions::default()).await;

    assert!(matches!(result, Err(Error::Authentication(_))));
    assert_eq!(transport.call_count(), 1);
}
