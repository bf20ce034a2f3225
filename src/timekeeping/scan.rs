use std::str::FromStr;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::TimekeepingError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ScanKind {
    Checkin,
    Checkout,
}

/// Notification from the QR scanning device. `decoded_text` is opaque here.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    #[serde(rename = "type")]
    #[schema(example = "checkin")]
    pub kind: String,

    #[schema(example = "https://hrm.local/qr/5f2c")]
    pub decoded_text: String,
}

impl ScanEvent {
    pub fn kind(&self) -> Result<ScanKind, TimekeepingError> {
        ScanKind::from_str(self.kind.trim()).map_err(|_| TimekeepingError::InvalidScanType {
            value: self.kind.clone(),
        })
    }
}

/// Swallows repeats of a successful scan inside a short window.
///
/// Camera scanners report one QR code several times per second; only the
/// first report of `(employee, kind, token)` inside the window gets through.
/// A scan that fails must be [`ScanGuard::forget`]-ed so the next report is
/// processed again and sees the failure too.
#[derive(Clone)]
pub struct ScanGuard {
    seen: Cache<(u64, ScanKind, String), ()>,
}

impl ScanGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            seen: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(window)
                .build(),
        }
    }

    /// `true` the first time a scan is seen within the window.
    pub async fn admit(&self, employee_id: u64, kind: ScanKind, decoded_text: &str) -> bool {
        self.seen
            .entry((employee_id, kind, decoded_text.to_string()))
            .or_insert(())
            .await
            .is_fresh()
    }

    pub async fn forget(&self, employee_id: u64, kind: ScanKind, decoded_text: &str) {
        self.seen
            .invalidate(&(employee_id, kind, decoded_text.to_string()))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: &str) -> ScanEvent {
        ScanEvent {
            kind: kind.to_string(),
            decoded_text: "qr-token".to_string(),
        }
    }

    #[test]
    fn parses_scan_kinds() {
        assert_eq!(event("checkin").kind(), Ok(ScanKind::Checkin));
        assert_eq!(event("checkout").kind(), Ok(ScanKind::Checkout));
        assert_eq!(
            event("lunch").kind(),
            Err(TimekeepingError::InvalidScanType {
                value: "lunch".to_string()
            })
        );
    }

    #[test]
    fn deserializes_device_payload() {
        let event: ScanEvent =
            serde_json::from_str(r#"{"type":"checkout","decodedText":"abc"}"#).unwrap();
        assert_eq!(event.kind(), Ok(ScanKind::Checkout));
        assert_eq!(event.decoded_text, "abc");
    }

    #[actix_web::test]
    async fn repeated_scan_is_swallowed() {
        let guard = ScanGuard::new(Duration::from_secs(60));

        assert!(guard.admit(1, ScanKind::Checkin, "qr-1").await);
        assert!(!guard.admit(1, ScanKind::Checkin, "qr-1").await);

        // a different kind, token or employee is a new scan
        assert!(guard.admit(1, ScanKind::Checkout, "qr-1").await);
        assert!(guard.admit(1, ScanKind::Checkin, "qr-2").await);
        assert!(guard.admit(2, ScanKind::Checkin, "qr-1").await);
    }

    #[actix_web::test]
    async fn forgotten_scan_is_admitted_again() {
        let guard = ScanGuard::new(Duration::from_secs(60));

        assert!(guard.admit(4, ScanKind::Checkin, "qr-1").await);
        guard.forget(4, ScanKind::Checkin, "qr-1").await;
        assert!(guard.admit(4, ScanKind::Checkin, "qr-1").await);
        assert!(!guard.admit(4, ScanKind::Checkin, "qr-1").await);
    }
}
