//! HTTP adapter for the booking/room management API.
//!
//! Implements the `innkeep-core` ports over `reqwest`.

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use reqwest::{multipart, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use innkeep_core::{
    config::Config,
    domain::{
        BannerSlot, BannerUpload, Booking, BookingId, DashboardStats, MediaType, Room, RoomForm,
        RoomId, RoomStatus,
    },
    errors::Error,
    ports::{AdminApi, BookingApi},
    Result,
};

const ERROR_BODY_LIMIT: usize = 200;

#[derive(Clone, Debug)]
pub struct HttpAdminApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAdminApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("innkeep/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::External(format!("http client build: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.api_base_url.clone(), cfg.http_timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    async fn send(&self, what: &str, req: RequestBuilder) -> Result<Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| Error::External(format!("{what} request error: {e}")))?;

        let status = resp.status();
        debug!(what, status = status.as_u16(), "api response");
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }
        Ok(resp)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        what: &str,
        req: RequestBuilder,
    ) -> Result<T> {
        let resp = self.send(what, req).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::External(format!("{what} body error: {e}")))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn room_form(form: &RoomForm, image: Option<multipart::Part>) -> multipart::Form {
    let mut out = multipart::Form::new()
        .text("roomNumber", form.room_number.trim().to_string())
        .text("pricePerNight", form.price_per_night.to_string())
        .text("roomType", form.room_type.as_wire())
        .text("acType", form.ac_type.as_wire())
        .text("status", form.status.as_wire());
    if let Some(part) = image {
        out = out.part("image", part);
    }
    out
}

async fn file_part(path: &Path) -> Result<multipart::Part> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: "not a file name".to_string(),
        })?
        .to_string();

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let bytes = tokio::fs::read(path).await?;

    multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime.essence_str())
        .map_err(|e| Error::External(format!("multipart error: {e}")))
}

/// Media type for a banner file, guessed from its extension.
pub fn detect_media_type(path: &Path) -> MediaType {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    MediaType::from_mime(mime.essence_str())
}

#[async_trait]
impl BookingApi for HttpAdminApi {
    async fn list_bookings(&self) -> Result<Vec<Booking>> {
        self.send_json(
            "list bookings",
            self.request(Method::GET, "/api/admin/bookings"),
        )
        .await
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn check_in(&self, id: &BookingId) -> Result<()> {
        self.send(
            "check-in",
            self.request(Method::PUT, &format!("/api/admin/bookings/check-in/{id}")),
        )
        .await?;
        Ok(())
    }

    async fn check_out(&self, id: &BookingId) -> Result<()> {
        self.send(
            "check-out",
            self.request(Method::PUT, &format!("/api/admin/bookings/check-out/{id}")),
        )
        .await?;
        Ok(())
    }

    async fn dashboard(&self) -> Result<DashboardStats> {
        self.send_json("dashboard", self.request(Method::GET, "/api/admin/dashboard"))
            .await
    }

    async fn list_rooms(&self) -> Result<Vec<Room>> {
        self.send_json(
            "list rooms",
            self.request(Method::GET, "/api/rooms/getallrooms"),
        )
        .await
    }

    async fn create_room(&self, form: &RoomForm) -> Result<()> {
        form.validate()?;
        let image = match &form.image {
            Some(p) => Some(file_part(p).await?),
            None => None,
        };
        self.send(
            "create room",
            self.request(Method::POST, "/api/rooms/addrooms")
                .multipart(room_form(form, image)),
        )
        .await?;
        Ok(())
    }

    async fn update_room(&self, id: &RoomId, form: &RoomForm) -> Result<()> {
        form.validate()?;
        let image = match &form.image {
            Some(p) => Some(file_part(p).await?),
            None => None,
        };
        self.send(
            "update room",
            self.request(
                Method::PUT,
                &format!("/api/rooms/updateroom-with-image/{id}"),
            )
            .multipart(room_form(form, image)),
        )
        .await?;
        Ok(())
    }

    async fn set_room_status(&self, id: &RoomId, status: RoomStatus) -> Result<()> {
        self.send(
            "room status",
            self.request(Method::PATCH, &format!("/api/rooms/{id}/status"))
                .query(&[("status", status.as_wire())]),
        )
        .await?;
        Ok(())
    }

    async fn delete_room(&self, id: &RoomId) -> Result<()> {
        self.send(
            "delete room",
            self.request(Method::DELETE, &format!("/api/rooms/delete/{id}")),
        )
        .await?;
        Ok(())
    }

    async fn upload_banner(&self, slot: BannerSlot, file: &Path) -> Result<BannerUpload> {
        let media = detect_media_type(file);
        if !slot.accepts(media) {
            return Err(Error::InvalidInput(format!(
                "only images are allowed for the {} banner",
                slot.as_wire()
            )));
        }

        let part = file_part(file).await?;
        let form = multipart::Form::new()
            .text("position", slot.as_wire())
            .text("mediaType", media.as_wire())
            .part("file", part);

        self.send_json(
            "banner upload",
            self.request(Method::POST, "/api/admin/banners/upload")
                .multipart(form),
        )
        .await
    }
}
