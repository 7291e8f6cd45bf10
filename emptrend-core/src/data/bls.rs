//! BLS public API (v1) series provider.
//!
//! POSTs `{"seriesid": [id], "startyear": "Y", "endyear": "Y"}` to the
//! timeseries endpoint. A response is usable only when the HTTP status is a
//! success and the body says `"status": "REQUEST_SUCCEEDED"`; otherwise the
//! API's `message` list is surfaced in the error. No retries: a failed sector
//! simply yields no data for this run.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::provider::{DataError, SeriesProvider, YearRange};

pub const DEFAULT_BASE_URL: &str = "https://api.bls.gov/publicAPI/v1/timeseries/data/";

/// Longest `end - start` span the v1 API accepts in one request.
pub const MAX_YEAR_SPAN: i32 = 10;

const SUCCESS_STATUS: &str = "REQUEST_SUCCEEDED";

#[derive(Debug, Serialize)]
struct SeriesRequest<'a> {
    seriesid: [&'a str; 1],
    startyear: String,
    endyear: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results")]
    results: Option<ApiResults>,
}

#[derive(Debug, Deserialize)]
struct ApiResults {
    #[serde(default)]
    series: Vec<ApiSeries>,
}

#[derive(Debug, Deserialize)]
struct ApiSeries {
    #[serde(rename = "seriesID")]
    series_id: String,
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// Clamp a range to what one v1 request may cover.
///
/// A span wider than [`MAX_YEAR_SPAN`] is cut to `start ..= start + 9`.
pub fn clamp_to_api_limit(range: YearRange) -> YearRange {
    if range.span() > MAX_YEAR_SPAN {
        let clamped = YearRange {
            start: range.start,
            end: range.start + MAX_YEAR_SPAN - 1,
        };
        warn!(
            requested_start = range.start,
            requested_end = range.end,
            end = clamped.end,
            "v1 API limited to 10 years, adjusting range"
        );
        clamped
    } else {
        range
    }
}

/// BLS timeseries provider backed by a blocking HTTP client.
pub struct BlsProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BlsProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Pull the requested series out of a decoded response body.
    fn extract_series(
        series_id: &str,
        resp: ApiResponse,
    ) -> Result<Vec<serde_json::Value>, DataError> {
        if resp.status != SUCCESS_STATUS {
            let message = if resp.message.is_empty() {
                resp.status
            } else {
                resp.message.join("; ")
            };
            return Err(DataError::Api(message));
        }

        let series = resp
            .results
            .ok_or_else(|| DataError::ResponseFormatChanged("missing Results".into()))?
            .series;

        for s in &series {
            debug!(series_id = %s.series_id, points = s.data.len(), "series received");
        }

        series
            .into_iter()
            .find(|s| s.series_id == series_id)
            .map(|s| s.data)
            .ok_or_else(|| {
                DataError::ResponseFormatChanged(format!(
                    "series {series_id} not present in response"
                ))
            })
    }
}

impl SeriesProvider for BlsProvider {
    fn name(&self) -> &str {
        "bls_v1"
    }

    fn fetch_series(
        &self,
        series_id: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<serde_json::Value>, DataError> {
        let range = clamp_to_api_limit(YearRange::new(start_year, end_year)?);
        let body = SeriesRequest {
            seriesid: [series_id],
            startyear: range.start.to_string(),
            endyear: range.end.to_string(),
        };

        debug!(series_id, start = range.start, end = range.end, "requesting series");

        let resp = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::Http {
                status: status.as_u16(),
                series_id: series_id.to_string(),
            });
        }

        let decoded: ApiResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!(
                "failed to parse response for {series_id}: {e}"
            ))
        })?;

        Self::extract_series(series_id, decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: serde_json::Value) -> ApiResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn clamps_wide_span() {
        let r = clamp_to_api_limit(YearRange { start: 2000, end: 2015 });
        assert_eq!(r, YearRange { start: 2000, end: 2009 });
    }

    #[test]
    fn ten_year_span_untouched() {
        let r = YearRange { start: 2010, end: 2020 };
        assert_eq!(clamp_to_api_limit(r), r);
    }

    #[test]
    fn request_body_shape() {
        let body = SeriesRequest {
            seriesid: ["CES3000000001"],
            startyear: "2022".into(),
            endyear: "2025".into(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"seriesid": ["CES3000000001"], "startyear": "2022", "endyear": "2025"})
        );
    }

    #[test]
    fn successful_response_yields_points() {
        let resp = decode(json!({
            "status": "REQUEST_SUCCEEDED",
            "message": [],
            "Results": {"series": [{
                "seriesID": "CES2000000001",
                "data": [
                    {"year": "2024", "period": "M02", "periodName": "February", "value": "8190", "footnotes": [{}]},
                    {"year": "2024", "period": "M01", "periodName": "January", "value": "8170", "footnotes": [{}]}
                ]
            }]}
        }));
        let points = BlsProvider::extract_series("CES2000000001", resp).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0]["periodName"], "February");
    }

    #[test]
    fn failed_status_surfaces_message() {
        let resp = decode(json!({
            "status": "REQUEST_NOT_PROCESSED",
            "message": ["Daily threshold for total number of requests allocated has been reached."],
            "Results": {}
        }));
        let err = BlsProvider::extract_series("CES2000000001", resp).unwrap_err();
        match err {
            DataError::Api(msg) => assert!(msg.contains("Daily threshold")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_series_is_format_error() {
        let resp = decode(json!({
            "status": "REQUEST_SUCCEEDED",
            "Results": {"series": []}
        }));
        assert!(matches!(
            BlsProvider::extract_series("CES2000000001", resp),
            Err(DataError::ResponseFormatChanged(_))
        ));
    }
}
