use anyhow::Context;
use chrono::Local;

use crate::{render, router::AppState};

pub async fn show(state: &AppState) -> anyhow::Result<()> {
    let stats = state
        .api
        .dashboard()
        .await
        .context("failed to fetch dashboard stats")?;
    let now = Local::now().naive_local();
    state
        .screen
        .show(&render::dashboard(&stats, now, &state.cfg.resthouse_name));
    Ok(())
}
