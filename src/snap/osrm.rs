//! HTTP client for an OSRM-style `nearest` endpoint
//!
//! Each request runs on its own short-lived worker thread so the event loop
//! never waits on the network. Failures are logged and reported as an empty
//! reply.

use std::sync::mpsc::Sender;
use std::time::Duration;

use super::{RoadSnapService, SnapReply, SnapRequest, parse_nearest};
use crate::error::SnapError;
use crate::geo::GeoPoint;

/// Public OSRM demo server, walking profile
pub const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org/nearest/v1/foot";

pub struct OsrmSnapService {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OsrmSnapService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SnapError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// `{base}/{longitude},{latitude}`
    pub fn url_for(&self, point: GeoPoint) -> String {
        format!(
            "{}/{},{}",
            self.base_url.trim_end_matches('/'),
            point.longitude,
            point.latitude
        )
    }
}

fn fetch(client: &reqwest::blocking::Client, url: &str) -> Result<GeoPoint, SnapError> {
    let body = client.get(url).send()?.text()?;
    parse_nearest(&body)
}

impl RoadSnapService for OsrmSnapService {
    fn request_snap(&mut self, request: SnapRequest, reply: Sender<SnapReply>) {
        let client = self.client.clone();
        let url = self.url_for(request.point);

        std::thread::spawn(move || {
            let corrected = match fetch(&client, &url) {
                Ok(point) => Some(point),
                Err(e) => {
                    log::debug!("Snap for {:?} step {} failed: {}", request.target, request.step, e);
                    None
                }
            };
            // The receiver is gone once the controller is dropped
            let _ = reply.send(SnapReply { request, corrected });
        });
    }
}
