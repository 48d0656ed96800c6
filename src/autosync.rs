//! Auto-sync around directory commands.
//!
//! When `auto_sync` is enabled, a sync cycle runs before directory reads
//! and after successful directory writes. Every failure degrades
//! gracefully - the CLI keeps working offline when the gateway is down.

use scanledger_core::sync::{run_cycle, RetryPolicy};
use scanledger_core::AppContext;

use crate::commands::sync_cmd::build_gateway;
use crate::config::Config;

/// Performs auto-sync if enabled and configured. Errors are reported but
/// never propagate.
pub fn try_auto_sync(config: &Config, ctx: &mut AppContext) {
    if !config.sync.auto_sync || !config.sync.is_configured() {
        return;
    }

    let gateway = match build_gateway(ctx, config) {
        Ok(Some(gateway)) => gateway,
        Ok(None) => return,
        Err(e) => {
            tracing::debug!("Auto-sync skipped: {}", e);
            return;
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(_) => return,
    };

    // One immediate probe; a scheduled cycle will retry later anyway.
    let result = rt.block_on(run_cycle(
        &mut ctx.directory,
        Some(&gateway),
        &RetryPolicy::immediate(),
    ));

    if let Err(e) = result {
        eprintln!("Auto-sync: {}", e);
    }
}
