//! Config load validation tests for shelfmark-config.
// crates/shelfmark-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, fields).
// Purpose: Ensure config input handling is strict and fail-closed.
// ============================================================================

use std::fmt;
use std::io::Write;
use std::path::Path;

use shelfmark_config::ConfigError;
use shelfmark_config::ShelfmarkConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

/// Complete two-endpoint fixture used by the happy path.
const COMPLETE_CONFIG: &str = r#"
[source]
base_url = "https://archive.example.edu/staff/api"
username = "sync_user"
password = "sync_secret"

[target]
base_url = "https://bibdata.example.edu"
username = "abid"
password = "abid_secret"
timeout_ms = 500
"#;

fn assert_invalid(result: Result<ShelfmarkConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn expect_eq<T: PartialEq + fmt::Display>(label: &str, actual: T, expected: T) -> TestResult {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("{label}: expected {expected}, got {actual}"))
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(ShelfmarkConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(ShelfmarkConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(ShelfmarkConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(ShelfmarkConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"not = = toml").map_err(|err| err.to_string())?;
    assert_invalid(ShelfmarkConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_requires_both_endpoint_tables() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let only_source = r#"
[source]
base_url = "https://archive.example.edu"
username = "sync_user"
password = "sync_secret"
"#;
    file.write_all(only_source.as_bytes()).map_err(|err| err.to_string())?;
    assert_invalid(ShelfmarkConfig::load(Some(file.path())), "target")?;
    Ok(())
}

#[test]
fn load_rejects_out_of_range_endpoint_fields() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let bad_timeout = r#"
[source]
base_url = "https://archive.example.edu"
username = "sync_user"
password = "sync_secret"

[target]
base_url = "https://bibdata.example.edu"
username = "abid"
password = "abid_secret"
timeout_ms = 5
"#;
    file.write_all(bad_timeout.as_bytes()).map_err(|err| err.to_string())?;
    assert_invalid(ShelfmarkConfig::load(Some(file.path())), "target.timeout_ms")?;
    Ok(())
}

#[test]
fn load_rejects_cleartext_endpoints_without_opt_in() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let cleartext = r#"
[source]
base_url = "http://archive.example.edu"
username = "sync_user"
password = "sync_secret"

[target]
base_url = "https://bibdata.example.edu"
username = "abid"
password = "abid_secret"
"#;
    file.write_all(cleartext.as_bytes()).map_err(|err| err.to_string())?;
    assert_invalid(ShelfmarkConfig::load(Some(file.path())), "source.base_url")?;
    Ok(())
}

#[test]
fn load_accepts_a_complete_config() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(COMPLETE_CONFIG.as_bytes()).map_err(|err| err.to_string())?;
    let config = ShelfmarkConfig::load(Some(file.path())).map_err(|err| err.to_string())?;

    expect_eq(
        "source.base_url",
        config.source.base_url.as_str(),
        "https://archive.example.edu/staff/api",
    )?;
    expect_eq("source.timeout_ms", config.source.timeout_ms, 10_000)?;
    expect_eq("source.max_response_bytes", config.source.max_response_bytes, 1_048_576)?;
    expect_eq("source.user_agent", config.source.user_agent.as_str(), "shelfmark/0.1")?;
    expect_eq("source.allow_http", config.source.allow_http, false)?;
    expect_eq("target.timeout_ms", config.target.timeout_ms, 500)?;

    let client = config.target.client_config();
    expect_eq("client.base_url", client.base_url.as_str(), "https://bibdata.example.edu")?;
    expect_eq("client.username", client.username.as_str(), "abid")?;
    expect_eq("client.password", client.password.as_str(), "abid_secret")?;
    expect_eq("client.timeout_ms", client.timeout_ms, 500)?;
    Ok(())
}
