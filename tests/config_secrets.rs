// tests/config_secrets.rs
use std::{env, fs};

use daepiro_datacollector::config::{Secrets, ENV_SECRETS_PATH};

const KEYS: [&str; 5] = [
    "ADMIN_ACCESS_TOKEN",
    "API_SERVER_BASE_URL",
    "DISASTER_MESSAGE_API_URL",
    "DISASTER_MESSAGE_API_SERVICE_KEY",
    "DISASTER_NEWS_URL",
];

fn clear_env() {
    env::remove_var(ENV_SECRETS_PATH);
    for k in KEYS {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn payload_file_wins_over_plain_env() {
    clear_env();
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("secrets.json");
    fs::write(
        &p,
        r#"{
            "ADMIN_ACCESS_TOKEN": "file-token",
            "API_SERVER_BASE_URL": "https://api.daepiro.example",
            "DISASTER_MESSAGE_API_URL": "https://feed.example/messages",
            "DISASTER_MESSAGE_API_SERVICE_KEY": "svc",
            "DISASTER_NEWS_URL": "https://news.example/list"
        }"#,
    )
    .unwrap();

    env::set_var("ADMIN_ACCESS_TOKEN", "env-token");
    env::set_var(ENV_SECRETS_PATH, p.display().to_string());

    let s = Secrets::load().unwrap();
    assert_eq!(s.admin_access_token, "file-token");
    clear_env();
}

#[serial_test::serial]
#[test]
fn plain_env_is_the_fallback() {
    clear_env();
    env::set_var("ADMIN_ACCESS_TOKEN", "env-token");
    env::set_var("API_SERVER_BASE_URL", "https://api.daepiro.example/");
    env::set_var("DISASTER_MESSAGE_API_URL", "https://feed.example/messages");
    env::set_var("DISASTER_MESSAGE_API_SERVICE_KEY", "svc");
    env::set_var("DISASTER_NEWS_URL", "https://news.example/list");

    let s = Secrets::load().unwrap();
    assert_eq!(s.admin_access_token, "env-token");
    // trailing slash is not part of the base url
    assert_eq!(s.api_server_base_url, "https://api.daepiro.example");
    clear_env();
}

#[serial_test::serial]
#[test]
fn a_missing_key_is_fatal() {
    clear_env();
    env::set_var("ADMIN_ACCESS_TOKEN", "env-token");
    // API_SERVER_BASE_URL intentionally absent

    let err = Secrets::load().unwrap_err();
    assert!(err.to_string().contains("API_SERVER_BASE_URL"));
    clear_env();
}

#[serial_test::serial]
#[test]
fn a_dangling_payload_path_is_fatal() {
    clear_env();
    env::set_var(ENV_SECRETS_PATH, "/nonexistent/secrets.json");
    assert!(Secrets::load().is_err());
    clear_env();
}
