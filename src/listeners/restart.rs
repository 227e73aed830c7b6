//! Restart trigger listener.
//!
//! Exits the process when asked to restart by name; the process supervisor
//! is expected to bring the bot back up with fresh state.

use async_trait::async_trait;
use tracing::info;

use super::Listener;

/// Listener that exits the process on `<nick>: restart`.
pub struct RestartListener;

#[async_trait]
impl Listener for RestartListener {
    fn name(&self) -> &'static str {
        "restart"
    }

    async fn invoke(&self, text: &str, bot_nick: &str) -> anyhow::Result<Vec<String>> {
        if text.trim_start() == format!("{bot_nick}: restart") {
            info!("restart requested, exiting");
            std::process::exit(0);
        }
        Ok(vec![])
    }
}
