use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use tracing::info;

use innkeep_core::domain::{AcType, Room, RoomForm, RoomId, RoomStatus, RoomType};

use crate::{render, router::AppState};

/// Field overrides for `rooms edit`; `None` keeps the current value.
#[derive(Clone, Debug, Default)]
pub struct RoomPatch {
    pub room_number: Option<String>,
    pub room_type: Option<RoomType>,
    pub ac_type: Option<AcType>,
    pub price_per_night: Option<f64>,
    pub status: Option<RoomStatus>,
    pub image: Option<PathBuf>,
}

impl RoomPatch {
    pub fn is_empty(&self) -> bool {
        self.room_number.is_none()
            && self.room_type.is_none()
            && self.ac_type.is_none()
            && self.price_per_night.is_none()
            && self.status.is_none()
            && self.image.is_none()
    }

    pub fn apply(self, form: &mut RoomForm) {
        if let Some(v) = self.room_number {
            form.room_number = v;
        }
        if let Some(v) = self.room_type {
            form.room_type = v;
        }
        if let Some(v) = self.ac_type {
            form.ac_type = v;
        }
        if let Some(v) = self.price_per_night {
            form.price_per_night = v;
        }
        if let Some(v) = self.status {
            form.status = v;
        }
        if self.image.is_some() {
            form.image = self.image;
        }
    }
}

pub async fn list(state: &AppState, filter: Option<RoomStatus>) -> anyhow::Result<()> {
    let rooms = fetch(state).await?;
    state.screen.show(&render::rooms_table(&rooms, filter));
    Ok(())
}

pub async fn add(state: &AppState, form: RoomForm) -> anyhow::Result<()> {
    form.validate()?;
    state
        .api
        .create_room(&form)
        .await
        .with_context(|| format!("failed to add room {}", form.room_number))?;
    info!(room = %form.room_number, "room added");
    state
        .screen
        .show(&format!("Room {} added.", form.room_number));
    Ok(())
}

pub async fn edit(state: &AppState, id: &str, patch: RoomPatch) -> anyhow::Result<()> {
    if patch.is_empty() {
        bail!("nothing to change (pass at least one field)");
    }
    let room = find(state, id).await?;
    let mut form = RoomForm::from_room(&room);
    patch.apply(&mut form);
    form.validate()?;

    state
        .api
        .update_room(&room.id, &form)
        .await
        .with_context(|| format!("failed to update room {}", room.room_number))?;
    info!(room_id = %room.id, "room updated");
    state
        .screen
        .show(&format!("Room {} updated.", form.room_number));
    Ok(())
}

/// Sets `status`, or toggles Active/Inactive when none is given.
pub async fn set_status(
    state: &AppState,
    id: &str,
    status: Option<RoomStatus>,
) -> anyhow::Result<()> {
    let (room_id, status) = match status {
        Some(s) => (room_id(id)?, s),
        None => {
            let room = find(state, id).await?;
            let next = room.status.toggled();
            (room.id, next)
        }
    };
    state
        .api
        .set_room_status(&room_id, status)
        .await
        .with_context(|| format!("failed to update status of room {room_id}"))?;
    info!(room_id = %room_id, status = status.as_wire(), "room status changed");
    state
        .screen
        .show(&format!("Room {room_id} is now {}.", status.label()));
    Ok(())
}

/// Deleting is irreversible, so it needs an explicit confirmation.
pub async fn delete(state: &AppState, id: &str, confirmed: bool) -> anyhow::Result<()> {
    let room_id = room_id(id)?;
    if !confirmed {
        bail!("refusing to delete room {room_id} without --yes");
    }
    state
        .api
        .delete_room(&room_id)
        .await
        .with_context(|| format!("failed to delete room {room_id}"))?;
    info!(room_id = %room_id, "room deleted");
    state.screen.show(&format!("Room {room_id} deleted."));
    Ok(())
}

async fn fetch(state: &AppState) -> anyhow::Result<Vec<Room>> {
    state
        .api
        .list_rooms()
        .await
        .context("failed to fetch rooms")
}

async fn find(state: &AppState, id: &str) -> anyhow::Result<Room> {
    let id = room_id(id)?;
    fetch(state)
        .await?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| anyhow!("room {id} not found"))
}

fn room_id(raw: &str) -> anyhow::Result<RoomId> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("a room id is required");
    }
    Ok(RoomId::from(raw))
}
