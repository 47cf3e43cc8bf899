// Vision module
// Thin clients for the image analysis, object detection, and OCR routes.
// These stand apart from the embedding pipeline; nothing in the pipeline
// depends on them.


use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::VisionflowError;
use crate::config::VisionConfig;
use crate::http::{
    CallError, DEFAULT_RETRY_ATTEMPTS, DEFAULT_TIMEOUT_SECONDS, agent_with_timeout, read_body,
    send_with_retry,
};

const API_PATH_ANALYZE: &str = "vision/v3.2/analyze";
const API_PATH_DETECT: &str = "vision/v3.2/detect";
const API_PATH_OCR: &str = "vision/v3.2/ocr";

#[derive(Debug, Clone)]
pub struct VisionClient {
    endpoint: Url,
    subscription_key: String,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct ImageUrlRequest<'a> {
    url: &'a str,
}

/// Result of the analyze route. Every field is optional on the wire, so the
/// whole payload decodes with defaults rather than failing on absence.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    pub description: Option<Description>,
    #[serde(default)]
    pub categories: Vec<Category>,
    pub color: Option<ColorInfo>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Description {
    #[serde(default)]
    pub captions: Vec<Caption>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Caption {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Category {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColorInfo {
    #[serde(default)]
    pub dominant_colors: Vec<String>,
    #[serde(default)]
    pub accent_color: String,
    #[serde(default)]
    pub is_b_w_img: bool,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ObjectDetection {
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct DetectedObject {
    #[serde(rename = "object", default)]
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub rectangle: Rectangle,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Rectangle {
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub h: u32,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct OcrResult {
    pub language: Option<String>,
    #[serde(default)]
    pub regions: Vec<OcrRegion>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct OcrRegion {
    #[serde(default)]
    pub lines: Vec<OcrLine>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct OcrLine {
    #[serde(default)]
    pub words: Vec<OcrWord>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OcrWord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bounding_box: String,
}

impl OcrResult {
    /// Join recognized words into one line of text per OCR line, in reading
    /// order across all regions.
    #[inline]
    pub fn lines(&self) -> Vec<String> {
        self.regions
            .iter()
            .flat_map(|region| region.lines.iter())
            .map(|line| {
                line.words
                    .iter()
                    .map(|word| word.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

impl VisionClient {
    #[inline]
    pub fn new(config: &VisionConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            subscription_key: config.subscription_key.clone(),
            agent: agent_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = agent_with_timeout(timeout);
        self
    }

    /// Describe an image: captions, categories, and dominant colors.
    #[inline]
    pub fn analyze(&self, image_url: &str) -> crate::Result<ImageAnalysis> {
        let mut url = self.route(API_PATH_ANALYZE)?;
        url.set_query(Some("visualFeatures=Categories,Description,Color&language=en"));
        self.post_image_url(&url, image_url)
    }

    /// Detect objects with bounding rectangles.
    #[inline]
    pub fn detect(&self, image_url: &str) -> crate::Result<ObjectDetection> {
        let url = self.route(API_PATH_DETECT)?;
        self.post_image_url(&url, image_url)
    }

    /// Run printed-text OCR over an image.
    #[inline]
    pub fn ocr(&self, image_url: &str) -> crate::Result<OcrResult> {
        let url = self.route(API_PATH_OCR)?;
        self.post_image_url(&url, image_url)
    }

    fn route(&self, path: &str) -> crate::Result<Url> {
        self.endpoint
            .join(path)
            .context("Failed to build vision route URL")
            .map_err(VisionflowError::Other)
    }

    fn post_image_url<T: serde::de::DeserializeOwned>(
        &self,
        url: &Url,
        image_url: &str,
    ) -> crate::Result<T> {
        debug!("Posting image URL to {}", url.path());

        self.request(url, image_url)
            .map_err(|e| VisionflowError::Vision(format!("{e:#}")))
    }

    fn request<T: serde::de::DeserializeOwned>(&self, url: &Url, image_url: &str) -> Result<T> {
        let request_json = serde_json::to_string(&ImageUrlRequest { url: image_url })
            .context("Failed to serialize image URL request")?;

        let response_text = send_with_retry(self.retry_attempts, || {
            self.agent
                .post(url.as_str())
                .header("Content-Type", "application/json")
                .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
                .send(&request_json)
                .map_err(CallError::from)
                .and_then(read_body)
        })
        .context("Vision request failed")?;

        serde_json::from_str(&response_text).context("Failed to parse vision response")
    }
}
