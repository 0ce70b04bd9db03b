//! Shared helpers for HTTP-level tests against a wiremock server.

#![allow(dead_code)]

use rcsync::client::pagination::TerminationPolicy;
use rcsync::config::Config;
use rcsync::connector::Connector;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const EXTENSIONS: &str = "/restapi/v1.0/account/~/extension";
pub const USER_ROLES: &str = "/restapi/v1.0/account/~/user-role";
pub const TOKEN: &str = "/restapi/oauth/token";

pub fn assigned_roles_path(extension_id: &str) -> String {
    format!("{}/{}/assigned-role", EXTENSIONS, extension_id)
}

/// Embedded config pointed at the mock server, without credentials.
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::embedded().expect("embedded config parses");
    config.api.base_url = format!("{}/restapi", server.uri());
    config
}

pub fn with_credentials(mut config: Config) -> Config {
    config.oauth.client_id = "client".into();
    config.oauth.client_secret = "secret".into();
    config.oauth.jwt = "test-jwt".into();
    config
}

pub fn with_principal_policy(mut config: Config, policy: TerminationPolicy) -> Config {
    config.pagination.principals = policy;
    config
}

pub async fn connector(server: &MockServer) -> Connector {
    Connector::new(&config_for(server))
        .await
        .expect("connector builds")
}

pub fn extension(id: u64) -> Value {
    json!({
        "id": id,
        "extensionNumber": (100 + id).to_string(),
        "name": format!("User {}", id),
        "type": "User",
        "status": "Enabled",
        "contact": {
            "firstName": "User",
            "lastName": id.to_string(),
            "email": format!("user{}@example.com", id)
        }
    })
}

pub fn role(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "displayName": name,
        "description": format!("{} role", name),
        "scope": "Account",
        "custom": false,
        "hidden": false,
        "siteCompatible": true
    })
}

/// Page envelope carrying both counters and navigation links.
pub fn page(
    server: &MockServer,
    path: &str,
    records: Vec<Value>,
    page: u32,
    total_pages: u32,
    per_page: u32,
) -> Value {
    let uri = |n: u32| format!("{}{}?page={}&perPage={}", server.uri(), path, n, per_page);
    json!({
        "uri": uri(page),
        "records": records,
        "paging": {
            "page": page,
            "totalPages": total_pages,
            "perPage": per_page
        },
        "navigation": {
            "firstPage": {"uri": uri(1)},
            "lastPage": {"uri": uri(total_pages)}
        }
    })
}

pub fn assigned(ids: &[&str]) -> Value {
    let records: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "displayName": format!("Role {}", id), "autoAssigned": false}))
        .collect();
    json!({ "records": records })
}
