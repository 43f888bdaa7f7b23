//! Shared helpers for tests against a mocked cluster

#![allow(dead_code)]

use cohesity_ops::{ClusterConnection, CohesityClient};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";

pub fn api(p: &str) -> String {
    format!("/irisservices/api/v1/public/{}", p)
}

/// Start a mock cluster that accepts the test login
pub async fn cluster() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api("accessTokens")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "accessToken": TOKEN,
            "tokenType": "Bearer"
        })))
        .mount(&server)
        .await;
    server
}

pub fn client(server: &MockServer) -> CohesityClient {
    let conn = ClusterConnection {
        endpoint: server.uri(),
        username: "admin".to_string(),
        password: "admin".to_string(),
        domain: "LOCAL".to_string(),
        verify_tls: true,
        timeout: Duration::from_secs(5),
    };
    CohesityClient::new(&conn).expect("client should build")
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Mount a GET on `p` answering `body`
pub async fn mount_get(server: &MockServer, p: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(api(p)))
        .and(bearer_token(TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// One registered vCenter `vc1` (id 1, endpoint vc1.lab.local)
pub async fn mount_vcenter(server: &MockServer) {
    mount_get(
        server,
        "protectionSources/rootNodes",
        json!([{
            "protectionSource": {
                "id": 1,
                "name": "vc1",
                "environment": "kVMware",
                "vmWareProtectionSource": {"type": "kVCenter"}
            },
            "registrationInfo": {"accessInfo": {"endpoint": "vc1.lab.local"}}
        }]),
    )
    .await;
}

/// VMs listed under vCenter 1
pub async fn mount_vms(server: &MockServer, vms: Value) {
    Mock::given(method("GET"))
        .and(path(api("protectionSources/virtualMachines")))
        .and(query_param("vCenterId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vms))
        .mount(server)
        .await;
}

/// Existing jobs returned for a name lookup
pub async fn mount_jobs(server: &MockServer, name: &str, jobs: Value) {
    Mock::given(method("GET"))
        .and(path(api("protectionJobs")))
        .and(query_param("names", name))
        .and(query_param("isDeleted", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jobs))
        .mount(server)
        .await;
}
