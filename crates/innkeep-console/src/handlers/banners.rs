use std::path::Path;

use anyhow::{anyhow, Context};
use tracing::info;

use innkeep_core::domain::BannerSlot;

use crate::{render, router::AppState};

pub fn slots(state: &AppState) {
    state.screen.show(&render::banner_slots());
}

pub async fn upload(state: &AppState, slot: &str, file: &Path) -> anyhow::Result<()> {
    let slot = BannerSlot::parse(slot).ok_or_else(|| {
        anyhow!("unknown banner slot {slot:?} (expected MAIN, SECOND or THIRD)")
    })?;
    if !file.is_file() {
        return Err(anyhow!("{} is not a file", file.display()));
    }

    let uploaded = state
        .api
        .upload_banner(slot, file)
        .await
        .with_context(|| format!("failed to upload {} banner", slot.title()))?;
    info!(slot = slot.as_wire(), file = %file.display(), "banner uploaded");

    let msg = match uploaded.url {
        Some(url) => format!("{} updated: {url}", slot.title()),
        None => format!("{} updated.", slot.title()),
    };
    state.screen.show(&msg);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::{state, FakeAdmin};

    #[tokio::test]
    async fn upload_reports_the_new_url() {
        let api = Arc::new(FakeAdmin::default());
        let (state, screen) = state(api.clone());
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("hero.jpg");
        std::fs::write(&file, b"jpeg").unwrap();

        upload(&state, "second", &file).await.unwrap();

        assert_eq!(api.calls(), vec![format!("banner SECOND {}", file.display())]);
        assert!(screen
            .text()
            .contains("Secondary Promo updated: https://cdn.example/banner.jpg"));
    }

    #[tokio::test]
    async fn upload_rejects_unknown_slots_and_missing_files() {
        let api = Arc::new(FakeAdmin::default());
        let (state, _) = state(api.clone());

        assert!(upload(&state, "FOURTH", Path::new("Cargo.toml")).await.is_err());
        assert!(upload(&state, "MAIN", Path::new("/no/such/banner.png"))
            .await
            .is_err());
        assert!(api.calls().is_empty());
    }

    #[test]
    fn slots_lists_all_three_positions() {
        let (state, screen) = state(Arc::new(FakeAdmin::default()));
        slots(&state);
        assert_eq!(screen.text().lines().count(), 3);
    }
}
