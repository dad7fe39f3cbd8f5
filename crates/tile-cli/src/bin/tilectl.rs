// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! CLI entry point for `tilectl`.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    tile_cli::entrypoint().await
}
