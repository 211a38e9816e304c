//! Integration tests for the token commands and their exit codes.

mod common;

use common::{TEST_IV, TEST_KEY, strongbox_cmd};
use predicates::prelude::*;

fn stdout_of(args: &[&str]) -> String {
    let output = strongbox_cmd().args(args).output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", args);
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
fn test_obfuscate_roundtrip() {
    let token = stdout_of(&["obfuscate", "8443"]);
    assert_ne!(token, "8443");

    strongbox_cmd()
        .args(["deobfuscate", token.as_str()])
        .assert()
        .success()
        .stdout("8443\n");
}

#[test]
fn test_obfuscate_with_custom_salt() {
    let token = stdout_of(&["obfuscate", "value", "--salt", "5"]);
    strongbox_cmd()
        .args(["deobfuscate", token.as_str(), "--salt", "5"])
        .assert()
        .success()
        .stdout("value\n");
}

#[test]
fn test_non_positive_salt_is_invalid_input() {
    strongbox_cmd()
        .args(["obfuscate", "value", "--salt", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("salt"));
}

#[test]
fn test_encrypt_roundtrip_with_env_key() {
    let output = strongbox_cmd()
        .env("STRONGBOX_KEY", TEST_KEY)
        .args(["encrypt", "hunter2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let token = String::from_utf8(output.stdout).unwrap().trim().to_string();

    strongbox_cmd()
        .args(["--key", TEST_KEY, "decrypt", token.as_str()])
        .assert()
        .success()
        .stdout("hunter2\n");
}

#[test]
fn test_fixed_iv_is_deterministic() {
    let args = ["--key", TEST_KEY, "--iv", TEST_IV, "encrypt", "value", "--no-embed-iv"];
    assert_eq!(stdout_of(&args), stdout_of(&args));
}

#[test]
fn test_encrypt_without_key_is_invalid_input() {
    strongbox_cmd()
        .args(["encrypt", "value"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("encryption key is required"));
}

#[test]
fn test_decrypt_with_wrong_key_is_general_error() {
    let token = stdout_of(&["--key", TEST_KEY, "encrypt", "value"]);
    let other_key = "ff".repeat(32);
    strongbox_cmd()
        .args(["--key", other_key.as_str(), "decrypt", token.as_str()])
        .assert()
        .code(1);
}

#[test]
fn test_malformed_token_is_invalid_input() {
    strongbox_cmd()
        .args(["decompress", "%%% not base64"])
        .assert()
        .code(2);
}

#[test]
fn test_compress_roundtrip() {
    let token = stdout_of(&["compress", "a fairly long value"]);
    strongbox_cmd()
        .args(["decompress", token.as_str()])
        .assert()
        .success()
        .stdout("a fairly long value\n");
}

#[test]
fn test_missing_subcommand_is_usage_error() {
    strongbox_cmd().assert().code(2);
}
