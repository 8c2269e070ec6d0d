mod common;

use std::process::{Command, Output};

use common::{claims, custom_config, temp_file};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn config_json(claims: Value) -> String {
    let custom = custom_config();
    json!({
        "custom": {
            "claims": claims,
            "header": { "kid": "k1" },
            "jwk_local_file": custom.jwk_local_file,
            "private_key_file_path": custom.private_key_file_path
        }
    })
    .to_string()
}

fn jwt_mint(args: &[&str]) -> Output {
    let workdir = tempfile::tempdir().expect("workdir");
    Command::new(env!("CARGO_BIN_EXE_jwt-mint"))
        .args(args)
        .current_dir(workdir.path())
        .env_remove("RUST_LOG")
        .env_remove("JWT_MINT_CONFIG")
        .env_remove("JWT_MINT_PRIVATE_KEY")
        .env_remove("JWT_MINT_JWK_FILE")
        .env_remove("JWT_MINT_DEBUG")
        .output()
        .expect("run jwt-mint")
}

#[test]
fn missing_claim_exits_with_failure_and_no_token() {
    let mut claims = claims();
    claims.remove("iss");
    let config = temp_file(&config_json(Value::Object(claims)));
    let path = config.path().to_str().expect("utf-8 path");

    let output = jwt_mint(&["--no-color", "-c", path]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("iss is required"), "{stderr}");
}

#[test]
fn quiet_success_prints_only_the_token() {
    let config = temp_file(&config_json(Value::Object(claims())));
    let path = config.path().to_str().expect("utf-8 path");

    let output = jwt_mint(&["custom", "-q", "-c", path]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "{stdout}");
    assert_eq!(lines[0].split('.').count(), 3);
}

#[test]
fn unreadable_config_file_fails() {
    let output = jwt_mint(&["--no-color", "-c", "/nonexistent/config.json"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("could not read config file"));
}
