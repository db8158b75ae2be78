//! JSON and image endpoints under `/garage`.

use std::io::Cursor;

use {
    autodash_gateway::AppState,
    axum::{
        Json,
        extract::{Path, Query, State},
        http::header,
        response::{IntoResponse, Redirect, Response},
    },
    base64::Engine as _,
    image::ImageFormat,
    serde::{Deserialize, Serialize},
};

use crate::{
    error::{Error, Result},
    pages::store,
};

/// Short private caching for polled JSON data.
const JSON_CACHE_CONTROL: &str = "private, max-age=5";

/// `GET /garage/json`
pub async fn garage_json_handler(State(state): State<AppState>) -> Result<Response> {
    let garage = store(&state.gateway)?.garage();
    Ok(([(header::CACHE_CONTROL, JSON_CACHE_CONTROL)], Json(garage)).into_response())
}

/// `GET /garage/{id}/json`
pub async fn vehicle_json_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let vehicle = store(&state.gateway)?
        .vehicle(&id)
        .ok_or_else(|| Error::not_found(format!("vehicle {id}")))?;
    Ok(([(header::CACHE_CONTROL, JSON_CACHE_CONTROL)], Json(vehicle)).into_response())
}

/// What a `{vin}-{image}.png[.json]` path segment asks for.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ImageRequest<'a> {
    pub vehicle: &'a str,
    pub image: &'a str,
    pub as_json: bool,
}

impl<'a> ImageRequest<'a> {
    /// The VIN never contains `-` but image names may, so split at the
    /// first one.
    pub(crate) fn parse(segment: &'a str) -> Option<Self> {
        let (stem, as_json) = match segment.strip_suffix(".png.json") {
            Some(stem) => (stem, true),
            None => (segment.strip_suffix(".png")?, false),
        };
        let (vehicle, image) = stem.split_once('-')?;
        if vehicle.is_empty() || image.is_empty() {
            return None;
        }
        Some(Self {
            vehicle,
            image,
            as_json,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub fallback: Option<String>,
}

/// Static asset path named by `?fallback=`, without leading slashes. Values
/// that cannot go into a `Location` header are ignored.
pub(crate) fn fallback_path(fallback: Option<&str>) -> Option<&str> {
    fallback
        .map(|f| f.trim_start_matches('/'))
        .filter(|f| !f.is_empty() && !f.chars().any(char::is_control))
}

#[derive(Debug, Serialize)]
struct EncodedImage {
    #[serde(rename = "type")]
    kind: &'static str,
    encoding: &'static str,
    data: String,
}

/// `GET /garage/{vin}-{image}.png[.json]`
///
/// Serves the picture as PNG bytes or as base64 inside JSON. A missing
/// picture redirects to `/static/<fallback>` when `?fallback=` is given and
/// is a 404 otherwise.
pub async fn vehicle_image_handler(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response> {
    let store = store(&state.gateway)?;
    let request = ImageRequest::parse(&segment);
    let image = request
        .as_ref()
        .and_then(|req| store.vehicle_image(req.vehicle, req.image));

    let (Some(request), Some(image)) = (request, image) else {
        return match fallback_path(query.fallback.as_deref()) {
            Some(fallback) => Ok(Redirect::to(&format!("/static/{fallback}")).into_response()),
            None => Err(Error::not_found(format!("image {segment}"))),
        };
    };

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    if request.as_json {
        let body = EncodedImage {
            kind: "image/png",
            encoding: "base64",
            data: base64::engine::general_purpose::STANDARD.encode(&png),
        };
        Ok(([(header::CACHE_CONTROL, JSON_CACHE_CONTROL)], Json(body)).into_response())
    } else {
        Ok((
            [
                (header::CONTENT_TYPE, "image/png"),
                (header::CACHE_CONTROL, JSON_CACHE_CONTROL),
            ],
            png,
        )
            .into_response())
    }
}
