//! Test-only support shared across this workspace's crates: a tracing
//! subscriber installed once per process, and canonical wire fixtures.

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a `tracing` subscriber with `color-eyre` span capture, once per
/// process. Call at the top of any test that wants its `tracing` output
/// (including from the code under test) visible on failure.
pub fn init() {
    INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                std::env::var("RUST_LOG").unwrap_or_else(|_| "bitcoin_chain=debug,bitcoin_consensus=debug".to_string()),
            )
            .with_writer(std::io::stderr);
        builder.try_init().ok();
        let _ = color_eyre::install();
    });
}

/// The 285-byte mainnet genesis block, in wire order.
///
/// Hash (display order): `000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f`
pub const MAINNET_GENESIS_BLOCK_BYTES: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c0101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

/// [`MAINNET_GENESIS_BLOCK_BYTES`] decoded to raw bytes.
pub fn mainnet_genesis_block_bytes() -> Vec<u8> {
    hex::decode(MAINNET_GENESIS_BLOCK_BYTES).expect("fixture is valid hex")
}
