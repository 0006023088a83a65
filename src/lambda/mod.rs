// src/lambda/mod.rs

//! AWS Lambda handler for the stock monitor.
//!
//! Each invocation (typically a one-minute EventBridge schedule):
//! 1. Loads configuration and mail credentials from the environment
//! 2. Probes the product page once
//! 3. Emails the operator if the product is in stock
//!
//! No status file is kept between invocations.

use std::path::PathBuf;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::{load_config, load_mail_credentials};
use crate::driver::WebDriverBrowser;
use crate::error::Result;
use crate::pipeline::{CheckReport, check_once};
use crate::services::{AvailabilityProber, Notifier, SmtpMailer};

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    /// Pincode to use instead of the configured one
    #[serde(default)]
    pub pincode: Option<String>,
}

/// Lambda response payload.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CheckResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    pub body: String,
}

impl CheckResponse {
    pub fn from_report(report: &CheckReport) -> Self {
        Self {
            status_code: 200,
            body: report.summary(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: message.into(),
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<CheckRequest>,
) -> std::result::Result<CheckResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    match run_check(&request).await {
        Ok(report) => {
            info!(
                "Check completed in {}ms: {} (notified: {}, delivered: {})",
                start.elapsed().as_millis(),
                report.result,
                report.notified,
                report.delivered
            );
            Ok(CheckResponse::from_report(&report))
        }
        Err(e) => {
            error!("Check failed: {}", e);
            Ok(CheckResponse::failure(e.to_string()))
        }
    }
}

/// Internal check logic.
async fn run_check(request: &CheckRequest) -> Result<CheckReport> {
    let config_path = std::env::var("STOCK_MONITOR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("stock-monitor.toml"));

    let mut config = load_config(&config_path)?;
    if let Some(pincode) = &request.pincode {
        config.product.pincode = pincode.clone();
    }
    let credentials = load_mail_credentials()?;

    let prober = AvailabilityProber::new(WebDriverBrowser::new(&config.browser), &config);
    let mailer = SmtpMailer::new(&config.mail, &credentials)?;
    let notifier = Notifier::new(mailer, &credentials, config.product.clone());

    Ok(check_once(&prober, &notifier).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProbeResult;

    #[test]
    fn test_check_request_defaults() {
        let json = r#"{}"#;
        let req: CheckRequest = serde_json::from_str(json).unwrap();
        assert!(req.pincode.is_none());
    }

    #[test]
    fn test_check_request_ignores_schedule_fields() {
        let json = r#"{"source": "aws.events", "detail-type": "Scheduled Event", "pincode": "110001"}"#;
        let req: CheckRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.pincode.as_deref(), Some("110001"));
    }

    #[test]
    fn test_response_shape() {
        let report = CheckReport {
            result: ProbeResult::OutOfStock,
            notified: false,
            delivered: false,
        };
        let value = serde_json::to_value(CheckResponse::from_report(&report)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "statusCode": 200,
                "body": "Script ran and found status: out_of_stock"
            })
        );
    }
}
