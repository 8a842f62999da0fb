//! `config.json` 관리.
//!
//! 경로 결정(플랫폼 디렉토리)은 바이너리 쪽 책임이고, 여기서는 주어진 경로만 다룬다.

use crate::config::AppConfig;
use crate::error::CoreError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 설정 파일 이름
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 시작 시 설정을 어디서 얻었는지
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// 기존 파일
    File,
    /// 파일이 없어 기본값으로 새로 만듦
    Created,
    /// 파일이 손상되어 기본값 사용 (파일은 그대로 둠)
    Fallback,
}

/// 시작 시 로드한 설정 핸들
#[derive(Debug, Clone)]
pub struct ConfigManager {
    current: AppConfig,
    path: PathBuf,
    source: ConfigSource,
}

impl ConfigManager {
    /// `path`의 설정을 연다. 없으면 기본값으로 만든다.
    pub fn with_path(path: PathBuf) -> Result<Self, CoreError> {
        let (config, source) = match fs::metadata(&path) {
            Ok(_) => match read_config(&path) {
                Ok(config) => (config, ConfigSource::File),
                Err(e) => {
                    warn!("설정 파일을 읽을 수 없어 기본값으로 실행: {e}");
                    (AppConfig::default_config(), ConfigSource::Fallback)
                }
            },
            Err(_) => {
                let config = AppConfig::default_config();
                write_config(&path, &config)?;
                info!("기본 설정 파일 생성: {}", path.display());
                (config, ConfigSource::Created)
            }
        };

        Ok(Self {
            current: config,
            path,
            source,
        })
    }

    /// 현재 설정 스냅샷
    pub fn get(&self) -> AppConfig {
        self.current.clone()
    }

    pub fn source(&self) -> ConfigSource {
        self.source
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }
}

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("{} 읽기 실패: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| CoreError::Config(format!("{} 파싱 실패: {e}", path.display())))
}

/// 임시 파일에 쓴 뒤 rename (부모 디렉토리는 필요하면 생성)
fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| CoreError::Config(format!("{} 생성 실패: {e}", parent.display())))?;
    }

    let json = serde_json::to_string_pretty(config)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .and_then(|()| fs::rename(&tmp, path))
        .map_err(|e| {
            let _ = fs::remove_file(&tmp);
            CoreError::Config(format!("{} 저장 실패: {e}", path.display()))
        })
}
