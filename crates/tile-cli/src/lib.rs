// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `tilectl`: read and paint LAN tile lights.
//!
//! The binary is a thin wrapper around [`entrypoint`]; [`run`] holds the
//! command logic with the config store, cancellation and output injected so
//! tests can drive it.

use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tile_config::{ConfigService, ConfigStore, FsConfigStore};
use tile_lan::LanDevice;
use tile_proto::Color;
use tile_sync::{CancelToken, ColorBoard, TileDevice, TileError};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod prefs;
pub mod render;

pub use cli::{Cli, Command, ConfigAction};
pub use prefs::{parse_address, DevicePrefs, PREFS_KEY};

/// Parse arguments, set up logging and the platform config store, run the
/// command and print its output.
pub async fn entrypoint() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let store = FsConfigStore::new().context("opening config directory")?;
    debug!(dir = %store.dir().display(), "config store");
    let config = ConfigService::new(store);

    let ctx = CancelToken::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupted");
                interrupt.cancel();
            }
            Err(err) => warn!(%err, "could not install ctrl-c handler"),
        }
    });

    let mut out = Vec::new();
    run(cli, &config, &ctx, &mut out).await?;
    io::stdout().write_all(&out)?;
    Ok(())
}

/// Execute one parsed command.
///
/// Device commands are cancelled when `ctx` fires or after `--timeout-ms`.
pub async fn run<S, W>(
    cli: Cli,
    config: &ConfigService<S>,
    ctx: &CancelToken,
    out: &mut W,
) -> Result<()>
where
    S: ConfigStore + Sync,
    W: Write + Send,
{
    let mut prefs = DevicePrefs::load(config)?;
    prefs.override_with(cli.address.as_deref(), cli.target.as_deref());

    match cli.command {
        Command::Config { action } => run_config(action, prefs, config, out),
        Command::Get { json } => {
            let device = open_device(&prefs)?;
            let board = with_deadline(ctx, cli.timeout_ms, |ctx| async move {
                device.get_colors(&ctx, None).await
            })
            .await
            .context("reading tile colors")?;
            info!(width = board.width(), height = board.height(), "read tile colors");
            if json {
                serde_json::to_writer_pretty(&mut *out, &board)?;
                writeln!(out)?;
            } else {
                out.write_all(render::render_board(&board).as_bytes())?;
            }
            Ok(())
        }
        Command::Set {
            hue,
            saturation,
            brightness,
            kelvin,
            transition_ms,
            ack,
        } => {
            let device = open_device(&prefs)?;
            let color = Color::from_hsbk(hue, saturation, brightness, kelvin);
            let mut board = ColorBoard::new(device.width(), device.height());
            board.fill(color);
            let transition = Duration::from_millis(transition_ms);
            with_deadline(ctx, cli.timeout_ms, |ctx| async move {
                device.set_colors(&ctx, None, &board, transition, ack).await
            })
            .await
            .context("setting tile colors")?;
            info!(?color, ack, "set tile colors");
            Ok(())
        }
    }
}

fn run_config<S, W>(
    action: ConfigAction,
    prefs: DevicePrefs,
    config: &ConfigService<S>,
    out: &mut W,
) -> Result<()>
where
    S: ConfigStore,
    W: Write,
{
    match action {
        ConfigAction::Init { force } => {
            let existing: Option<DevicePrefs> = config.load(PREFS_KEY)?;
            if existing.is_some() && !force {
                bail!("preferences already exist; pass --force to overwrite");
            }
            let fresh = DevicePrefs {
                address: prefs.address,
                target: prefs.target,
                ..DevicePrefs::default()
            };
            fresh.save(config)?;
            info!(key = PREFS_KEY, "wrote default preferences");
            writeln!(out, "{}", serde_json::to_string_pretty(&fresh)?)?;
        }
        ConfigAction::Show => {
            writeln!(out, "{}", serde_json::to_string_pretty(&prefs)?)?;
        }
    }
    Ok(())
}

fn open_device(prefs: &DevicePrefs) -> Result<TileDevice<LanDevice>> {
    let addr = prefs.socket_addr()?;
    let topology = prefs.layout.build().context("invalid tile layout")?;
    let lan = LanDevice::new(addr, prefs.target()?).with_kelvin_range(prefs.kelvin_range());
    info!(%addr, tiles = topology.tile_count(), "using device");
    Ok(TileDevice::new(Arc::new(lan), topology))
}

/// Run `op` with a child token that also fires after `timeout_ms`.
async fn with_deadline<T, F, Fut>(ctx: &CancelToken, timeout_ms: u64, op: F) -> Result<T>
where
    T: Send,
    F: FnOnce(CancelToken) -> Fut + Send,
    Fut: Future<Output = Result<T, TileError>> + Send,
{
    let child = CancelToken::new();
    if ctx.is_cancelled() {
        child.cancel();
    }
    let watchdog = {
        let parent = ctx.clone();
        let child = child.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = parent.cancelled() => {}
                () = tokio::time::sleep(Duration::from_millis(timeout_ms)) => {
                    warn!(timeout_ms, "deadline reached");
                }
            }
            child.cancel();
        })
    };
    let res = op(child).await;
    watchdog.abort();
    Ok(res?)
}
