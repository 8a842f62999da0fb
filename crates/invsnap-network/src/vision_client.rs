//! 비전 모델 클라이언트.
//!
//! 타일 PNG를 Base64로 실어 `/api/generate`에 POST하고,
//! 응답의 `response` 문자열 안에 든 JSON 객체를 `ExtractedItem`으로 파싱한다.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use invsnap_core::config::VisionApiConfig;
use invsnap_core::error::CoreError;
use invsnap_core::models::capture::Tile;
use invsnap_core::models::inventory::ExtractedItem;
use invsnap_core::ports::item_extractor::ItemExtractor;
use invsnap_vision::encoder::encode_png_base64;

/// 기본 지시문 — 인벤토리 패널 한 칸 해석
pub const DEFAULT_PROMPT: &str = r#"You are given one cropped cell of a game inventory panel.
Layout of a filled cell: an icon on the left; to its right the required amount of a
resource, a space, then the available amount inside parentheses, e.g. "10 (50)".
Under the numbers is the resource name, which may contain several words and may wrap
onto two lines. A cell can also be completely empty.

Answer with exactly one JSON object and nothing else:

{
  "item_name": "<string>",
  "required_count": <integer>,
  "available_count": <integer>
}

Counts are plain integers without thousand separators.
If the cell shows no icon, numbers or text, use "NONE" as item_name and null for both counts.
"#;

/// `/api/generate` 응답 바깥 객체
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama 호환 비전 모델 클라이언트
#[derive(Debug)]
pub struct OllamaVisionClient {
    /// HTTP 클라이언트 (요청 타임아웃 포함)
    http_client: reqwest::Client,
    /// API 엔드포인트 URL
    endpoint: String,
    /// 모델 이름
    model: String,
    /// 지시문
    prompt: String,
}

impl OllamaVisionClient {
    /// 새 클라이언트 생성
    pub fn new(config: &VisionApiConfig) -> Result<Self, CoreError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        let prompt = config
            .prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

        debug!(
            endpoint = %config.endpoint,
            model = %config.model,
            timeout = config.timeout_secs,
            "OllamaVisionClient 초기화"
        );

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            prompt,
        })
    }

    /// 요청 본문 구성 (이미지 1장)
    fn build_request_body(&self, image_b64: String) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "prompt": self.prompt,
            "stream": false,
            "images": [image_b64],
        })
    }

    /// 응답 본문에서 항목 파싱
    ///
    /// 안쪽 문자열의 첫 `{`부터 마지막 `}`까지를 JSON으로 읽는다 (설명문/코드 펜스 무시).
    fn parse_generate_response(body: &str) -> Result<ExtractedItem, CoreError> {
        let outer: GenerateResponse = serde_json::from_str(body)
            .map_err(|e| CoreError::Parse(format!("응답 JSON 파싱 실패: {}", e)))?;

        let text = outer.response.as_str();
        let json_str = match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => {
                return Err(CoreError::Parse(format!(
                    "응답에서 JSON 객체를 찾을 수 없음 (raw: {})",
                    text.chars().take(200).collect::<String>()
                )))
            }
        };

        serde_json::from_str(json_str).map_err(|e| {
            CoreError::Parse(format!(
                "항목 파싱 실패: {} (raw: {})",
                e,
                json_str.chars().take(200).collect::<String>()
            ))
        })
    }
}

#[async_trait]
impl ItemExtractor for OllamaVisionClient {
    async fn extract_item(&self, tile: &Tile) -> Result<ExtractedItem, CoreError> {
        let image_b64 = encode_png_base64(&tile.image)?;
        let request_body = self.build_request_body(image_b64);

        debug!(
            endpoint = %self.endpoint,
            row = tile.row,
            col = tile.col,
            "비전 모델 호출"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("비전 API 호출 실패: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CoreError::Network(format!("비전 API 응답 읽기 실패: {}", e)))?;

        if !status.is_success() {
            warn!(status = %status, "비전 API 오류 응답");
            return Err(CoreError::Network(format!(
                "비전 API 오류 ({}): {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let item = Self::parse_generate_response(&body)?;
        debug!(
            item = %item.item_name,
            required = ?item.required_count,
            available = ?item.available_count,
            "항목 추출 완료"
        );
        Ok(item)
    }
}

// ============================================================
// 테스트
// ============================================================
