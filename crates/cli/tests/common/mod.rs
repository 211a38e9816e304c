//! Shared test utilities for strongbox integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.
//! - No strongbox environment variables leak in from the host.

use assert_cmd::Command;

/// A valid 32-byte key, hex-encoded.
#[allow(dead_code)]
pub const TEST_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

/// A valid 12-byte IV, hex-encoded.
#[allow(dead_code)]
pub const TEST_IV: &str = "0a0b0c0d0e0f101112131415";

/// Returns a hermetic `strongbox` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - Strongbox env vars are cleared to ensure no leakage from the host.
pub fn strongbox_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("strongbox");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    // Clear potential host leakage
    cmd.env_remove("STRONGBOX_KEY")
        .env_remove("STRONGBOX_IV")
        .env_remove("STRONGBOX_ENVIRONMENT")
        .env_remove("STRONGBOX_CONTENT_ROOT");

    cmd
}
