//! Source resolution, vCenter registration and VM restore against a mocked
//! cluster

mod common;

use common::*;
use cohesity_ops::ops::{self, RestoreVms};
use cohesity_ops::source;
use cohesity_ops::CohesityError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod resolver_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_vcenter_returns_sentinel() {
        let server = cluster().await;
        mount_vcenter(&server).await;
        Mock::given(method("GET"))
            .and(path(api("protectionSources/virtualMachines")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let res = source::resolve_source(&client, "vc9", &names(&["vm1"]))
            .await
            .unwrap();

        assert!(!res.is_registered());
        assert!(res.source_ids().is_empty());
    }

    #[tokio::test]
    async fn test_partial_vm_resolution() {
        let server = cluster().await;
        mount_vcenter(&server).await;
        Mock::given(method("GET"))
            .and(path(api("protectionSources/virtualMachines")))
            .and(query_param("vCenterId", "1"))
            .and(query_param("names", "vm2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 11, "name": "vm1"},
                {"id": 13, "name": "vm3"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let res = source::resolve_source(&client, "vc1.lab.local", &names(&["vm1", "vm2", "vm3"]))
            .await
            .unwrap();

        assert_eq!(res.parent_id, Some(1));
        assert_eq!(res.source_ids(), vec![11, 13]);
        assert_eq!(res.unresolved, names(&["vm2"]));
    }

    #[tokio::test]
    async fn test_transport_failure_is_error() {
        let server = cluster().await;
        Mock::given(method("GET"))
            .and(path(api("protectionSources/rootNodes")))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = source::resolve_source(&client, "vc1", &names(&["vm1"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CohesityError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(api("accessTokens")))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Invalid username or password"
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = source::find_job(&client, "nightly").await.unwrap_err();
        assert!(matches!(err, CohesityError::Auth(_)));
        assert!(err.to_string().contains("Invalid username or password"));
    }

    #[tokio::test]
    async fn test_token_is_reused() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(api("accessTokens")))
            .and(body_partial_json(json!({"username": "admin", "domain": "LOCAL"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"accessToken": TOKEN})))
            .expect(1)
            .mount(&server)
            .await;
        mount_jobs(&server, "nightly", json!([])).await;

        let client = client(&server);
        for _ in 0..3 {
            assert!(source::find_job(&client, "nightly").await.is_err());
        }
    }

    #[tokio::test]
    async fn test_rejected_token_forces_new_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(api("accessTokens")))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"accessToken": TOKEN})))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(api("protectionJobs")))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Token expired"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client(&server);
        for _ in 0..2 {
            let err = source::find_job(&client, "nightly").await.unwrap_err();
            assert!(matches!(err, CohesityError::Auth(ref m) if m == "Token expired"));
        }
    }
}

mod register_tests {
    use super::*;

    #[tokio::test]
    async fn test_register_new_vcenter() {
        let server = cluster().await;
        mount_vcenter(&server).await;
        Mock::given(method("POST"))
            .and(path(api("protectionSources/register")))
            .and(body_partial_json(json!({
                "endpoint": "vc2.lab.local",
                "environment": "kVMware",
                "username": "administrator@vsphere.local",
                "vmwareType": "kVCenter"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 2})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let msg = ops::register_vcenter(&client, "vc2.lab.local", "administrator@vsphere.local", "pw")
            .await
            .unwrap();
        assert_eq!(msg, "Successfully registered Vcenter vc2.lab.local");
    }

    #[tokio::test]
    async fn test_register_existing_vcenter() {
        let server = cluster().await;
        mount_vcenter(&server).await;
        Mock::given(method("POST"))
            .and(path(api("protectionSources/register")))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let err = ops::register_vcenter(&client, "vc1.lab.local", "u", "p")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Source with name vc1.lab.local already exists");
    }
}

mod restore_tests {
    use super::*;

    async fn mount_snapshots(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(api("restore/objects")))
            .and(query_param("search", "web01"))
            .and(query_param("registeredSourceIds", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objectSnapshotInfo": [
                    {"jobId": 7, "jobUid": {"clusterId": 3, "clusterIncarnationId": 4, "id": 7},
                     "snapshottedSource": {"id": 11, "name": "web01"},
                     "versions": [
                        {"jobRunId": 71, "startedTimeUsecs": 1700000000000000i64},
                        {"jobRunId": 70, "startedTimeUsecs": 1690000000000000i64}
                     ]},
                    {"jobId": 8, "jobUid": {"clusterId": 3, "clusterIncarnationId": 4, "id": 8},
                     "snapshottedSource": {"id": 11, "name": "web01"},
                     "versions": [{"jobRunId": 81, "startedTimeUsecs": 1710000000000000i64}]}
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_restore_in_place_uses_latest_snapshot() {
        let server = cluster().await;
        mount_vcenter(&server).await;
        mount_vms(&server, json!([{"id": 11, "name": "web01"}])).await;
        mount_snapshots(&server).await;
        Mock::given(method("GET"))
            .and(path(api("protectionSources")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(api("restore/recover")))
            .and(body_partial_json(json!({
                "name": "task1",
                "type": "kRecoverVMs",
                "objects": [{
                    "environment": "kVMware",
                    "jobId": 8,
                    "jobRunId": 81,
                    "jobUid": {"clusterId": 3, "clusterIncarnationId": 4, "id": 8},
                    "protectionSourceId": 11,
                    "sourceName": "web01",
                    "startedTimeUsecs": 1710000000000000i64
                }],
                "vmwareParameters": {
                    "poweredOn": true,
                    "recoveryProcessType": "kInstantRecovery"
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 900})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let req = RestoreVms::new("task1", "vc1", names(&["web01"]));
        let msg = ops::restore_vms(&client, &req).await.unwrap();
        assert_eq!(msg, "Successfully created restore task 'task1'.");
    }

    #[tokio::test]
    async fn test_restore_to_pool_and_datastore() {
        let server = cluster().await;
        mount_vcenter(&server).await;
        mount_vms(&server, json!([{"id": 11, "name": "web01"}])).await;
        mount_snapshots(&server).await;
        Mock::given(method("GET"))
            .and(path(api("protectionSources")))
            .and(query_param("id", "1"))
            .and(query_param("includeDatastores", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "protectionSource": {"id": 1, "name": "vc1", "vmWareProtectionSource": {"type": "kVCenter"}},
                "nodes": [{
                    "protectionSource": {"id": 2, "name": "dc1", "vmWareProtectionSource": {"type": "kDatacenter"}},
                    "nodes": [
                        {"protectionSource": {"id": 30, "name": "Resources", "vmWareProtectionSource": {"type": "kResourcePool"}},
                         "nodes": [{"protectionSource": {"id": 31, "name": "restore-pool", "vmWareProtectionSource": {"type": "kResourcePool"}}}]},
                        {"protectionSource": {"id": 40, "name": "ds1", "vmWareProtectionSource": {"type": "kDatastore"}}}
                    ]
                }]
            }])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(api("restore/recover")))
            .and(body_partial_json(json!({
                "vmwareParameters": {
                    "poweredOn": false,
                    "prefix": "pre-",
                    "suffix": "_copy",
                    "resourcePoolId": 31,
                    "datastoreId": 40,
                    "newParentId": 1
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 901})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let req = RestoreVms {
            resource_pool: "restore-pool".to_string(),
            prefix: "pre-".to_string(),
            suffix: "_copy".to_string(),
            powered_on: false,
            ..RestoreVms::new("task2", "vc1", names(&["web01"]))
        };
        // datastore left empty: first datastore in the tree is used
        assert!(ops::restore_vms(&client, &req).await.is_ok());
    }

    #[tokio::test]
    async fn test_restore_unknown_pool() {
        let server = cluster().await;
        mount_vcenter(&server).await;
        mount_vms(&server, json!([{"id": 11, "name": "web01"}])).await;
        mount_get(&server, "protectionSources", json!([])).await;
        Mock::given(method("POST"))
            .and(path(api("restore/recover")))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let req = RestoreVms {
            resource_pool: "nope".to_string(),
            ..RestoreVms::new("task3", "vc1", names(&["web01"]))
        };
        let err = ops::restore_vms(&client, &req).await.unwrap_err();
        assert_eq!(err.to_string(), "Resource pool with name nope not available");
    }

    #[tokio::test]
    async fn test_restore_without_snapshot() {
        let server = cluster().await;
        mount_vcenter(&server).await;
        mount_vms(&server, json!([{"id": 11, "name": "web01"}])).await;
        mount_get(&server, "restore/objects", json!({"objectSnapshotInfo": []})).await;

        let client = client(&server);
        let req = RestoreVms::new("task4", "vc1", names(&["web01"]));
        let err = ops::restore_vms(&client, &req).await.unwrap_err();
        assert!(matches!(err, CohesityError::NoSnapshot(ref vm) if vm == "web01"));
    }
}
