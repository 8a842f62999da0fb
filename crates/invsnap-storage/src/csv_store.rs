//! CSV 인벤토리 저장소.
//!
//! 한 번의 upsert마다 전체 테이블을 읽고, item_name 기준으로 병합한 뒤,
//! 임시 파일 + rename으로 통째로 다시 쓴다. 행은 item_name 오름차순.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use invsnap_core::error::CoreError;
use invsnap_core::models::inventory::{
    is_sentinel_name, ExtractedItem, InventoryRecord, UpsertSummary,
};
use invsnap_core::ports::inventory_store::InventoryStore;

use crate::csv_codec::{encode_row, parse_records};

/// 테이블 컬럼 (순서 고정)
pub const CANONICAL_HEADER: [&str; 4] =
    ["timestamp", "item_name", "available_count", "required_count"];

/// 레코드 타임스탬프 형식 (로컬 시각, 초 단위)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// item_name → 레코드 (정렬 유지)
type RecordMap = BTreeMap<String, InventoryRecord>;

/// 데이터 행 → 레코드. 헤더 이름과 무관하게 위치로 읽는다
///
/// `timestamp, item_name, available_count, required_count` 순서.
fn record_from_row(row: &[String]) -> Option<InventoryRecord> {
    let cell = |i: usize| row.get(i).map(|s| s.trim());
    let item_name = cell(1)?;
    if is_sentinel_name(item_name) {
        return None;
    }
    Some(InventoryRecord {
        timestamp: cell(0).unwrap_or_default().to_string(),
        item_name: item_name.to_string(),
        available_count: parse_count(cell(2)),
        required_count: parse_count(cell(3)),
    })
}

fn is_canonical_header(header: &[String]) -> bool {
    header.iter().map(|h| h.trim()).eq(CANONICAL_HEADER)
}

/// 개수 필드 파싱. 빈 값, "None", 정수가 아닌 값은 None
fn parse_count(field: Option<&str>) -> Option<i64> {
    let field = field?;
    if field.is_empty() || field.eq_ignore_ascii_case("none") || field == "null" {
        return None;
    }
    field.parse().ok()
}

fn format_count(count: Option<i64>) -> String {
    count.map(|c| c.to_string()).unwrap_or_default()
}

/// 현재 로컬 시각 타임스탬프
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// 파일 내용을 레코드 맵으로 변환 (첫 행은 헤더, 중복 이름은 뒤쪽 행 우선)
fn parse_table(content: &str) -> RecordMap {
    let mut map = RecordMap::new();
    for row in parse_records(content).into_iter().skip(1) {
        if let Some(record) = record_from_row(&row) {
            map.insert(record.item_name.clone(), record);
        }
    }
    map
}

/// 항목들을 맵에 병합 (순수 함수)
///
/// 센티넬/빈 이름은 건너뛴다. 같은 배치에서 한 이름이 두 번 나오면
/// 두 번째는 `updated`로 센다.
pub fn merge_items(
    map: &mut BTreeMap<String, InventoryRecord>,
    items: &[ExtractedItem],
    timestamp: &str,
) -> UpsertSummary {
    let mut summary = UpsertSummary::default();

    for item in items.iter().filter(|i| !i.is_sentinel()) {
        let record = InventoryRecord::from_item(item, timestamp);
        match map.insert(record.item_name.clone(), record) {
            Some(_) => {
                summary.updated += 1;
                debug!("갱신: {}", item.item_name.trim());
            }
            None => {
                summary.added += 1;
                debug!("추가: {}", item.item_name.trim());
            }
        }
    }

    summary.total = map.len();
    summary
}

/// 테이블 전체 직렬화 (헤더 + 이름순 행)
fn render_table(map: &RecordMap) -> String {
    let mut content = encode_row(&CANONICAL_HEADER);
    for record in map.values() {
        content.push_str(&encode_row(&[
            record.timestamp.clone(),
            record.item_name.clone(),
            format_count(record.available_count),
            format_count(record.required_count),
        ]));
    }
    content
}

/// CSV 파일 기반 인벤토리 저장소
pub struct CsvInventoryStore {
    /// 테이블 파일 경로
    path: PathBuf,
    /// upsert 직렬화
    lock: Mutex<()>,
}

impl CsvInventoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// 테이블 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "inventory.csv".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// 파일이 없으면 헤더만 있는 테이블 생성. 헤더가 다르면 경고만 남긴다
    ///
    /// 여기서의 실패는 로그만 남긴다. 최종 쓰기 실패만 태스크 에러가 된다.
    async fn ensure_store(&self) {
        match fs::try_exists(&self.path).await {
            Ok(true) => self.check_header().await,
            Ok(false) => match self.create_store().await {
                Ok(()) => info!("인벤토리 테이블 생성: {}", self.path.display()),
                Err(e) => warn!("테이블 생성 실패: {}: {e}", self.path.display()),
            },
            Err(e) => warn!("테이블 확인 실패: {}: {e}", self.path.display()),
        }
    }

    async fn create_store(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, encode_row(&CANONICAL_HEADER)).await
    }

    /// 헤더 불일치는 경고만. 행은 기존 위치 그대로 읽힌다
    async fn check_header(&self) {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                warn!("테이블 헤더 확인 실패: {}: {e}", self.path.display());
                return;
            }
        };
        let Some(header) = parse_records(&content).into_iter().next() else {
            return;
        };
        if !is_canonical_header(&header) {
            warn!(
                "테이블 헤더 불일치: {:?} (기대값 {:?}), 행은 같은 컬럼 순서로 간주",
                header, CANONICAL_HEADER
            );
        }
    }

    async fn try_load_map(&self) -> Result<RecordMap, CoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(parse_table(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RecordMap::new()),
            Err(e) => Err(CoreError::StoreLoad(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    /// 읽기 실패는 빈 테이블로 간주
    async fn load_map(&self) -> RecordMap {
        match self.try_load_map().await {
            Ok(map) => map,
            Err(e) => {
                warn!("{e}, 빈 테이블로 계속");
                RecordMap::new()
            }
        }
    }

    /// 임시 파일에 쓴 뒤 rename
    async fn write_map(&self, map: &RecordMap) -> Result<(), CoreError> {
        let tmp = self.temp_path();
        let content = render_table(map);

        fs::write(&tmp, content).await.map_err(|e| {
            CoreError::StoreWrite(format!("임시 파일 쓰기 실패: {}: {e}", tmp.display()))
        })?;

        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(CoreError::StoreWrite(format!(
                "테이블 교체 실패: {}: {e}",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// 지정 타임스탬프로 upsert
    pub async fn upsert_all_at(
        &self,
        items: &[ExtractedItem],
        timestamp: &str,
    ) -> Result<UpsertSummary, CoreError> {
        let _guard = self.lock.lock().await;

        self.ensure_store().await;
        let mut map = self.load_map().await;
        debug!("기존 항목 {}개 로드", map.len());

        let summary = merge_items(&mut map, items, timestamp);
        self.write_map(&map).await?;

        debug!(
            "테이블 갱신: {} 갱신, {} 추가, 전체 {}",
            summary.updated, summary.added, summary.total
        );
        Ok(summary)
    }
}

#[async_trait]
impl InventoryStore for CsvInventoryStore {
    async fn upsert_all(&self, items: &[ExtractedItem]) -> Result<UpsertSummary, CoreError> {
        self.upsert_all_at(items, &current_timestamp()).await
    }

    async fn load(&self) -> Result<Vec<InventoryRecord>, CoreError> {
        let _guard = self.lock.lock().await;
        let map = self.try_load_map().await?;
        Ok(map.into_values().collect())
    }
}
