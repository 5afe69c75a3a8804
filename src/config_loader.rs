use log::{debug, error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// 설정 로드 오류
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// 파일 오류
    #[error("설정 파일 오류: {0}")]
    FileError(String),
    /// 파싱 오류
    #[error("설정 파싱 오류: {0}")]
    ParseError(String),
    /// 유효성 검사 오류
    #[error("설정 유효성 검사 오류: {0}")]
    ValidationError(String),
}

/// 설정 로드 결과
pub type ConfigResult<T> = Result<T, ConfigError>;

/// 설정 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON 형식
    Json,
    /// TOML 형식
    Toml,
    /// 자동 감지 (파일 확장자 또는 내용으로부터)
    Auto,
}

/// 설정 유효성 검사 트레이트
pub trait ConfigValidation {
    /// 설정 유효성 검사
    fn validate(&self) -> ConfigResult<()>;
}

/// 설정 파일 로더
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// 파일에서 설정 로드
    ///
    /// # Arguments
    /// * `path` - 설정 파일 경로
    /// * `format` - 설정 파일 형식 (Auto면 확장자로 감지)
    ///
    /// # Returns
    /// * `ConfigResult<T>` - 검증된 설정 객체 또는 오류
    pub fn load_from_file<T>(path: &Path, format: ConfigFormat) -> ConfigResult<T>
    where
        T: DeserializeOwned + ConfigValidation,
    {
        debug!("설정 파일 로드 시작: {}", path.display());

        let format = match format {
            ConfigFormat::Auto => Self::detect_format(path)?,
            other => other,
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            error!("설정 파일 읽기 실패: {} - {}", path.display(), e);
            ConfigError::FileError(format!("파일 읽기 실패: {e}"))
        })?;

        let config: T = Self::parse(&content, format).inspect_err(|e| {
            error!("설정 파일 파싱 실패: {} - {}", path.display(), e);
        })?;

        config.validate().inspect_err(|e| {
            error!("설정 유효성 검사 실패: {e}");
        })?;

        info!("설정 파일 로드 완료: {}", path.display());
        Ok(config)
    }

    /// 문자열에서 설정 로드
    ///
    /// Auto 형식은 JSON을 먼저 시도한 뒤 TOML로 재시도합니다.
    pub fn load_from_string<T>(content: &str, format: ConfigFormat) -> ConfigResult<T>
    where
        T: DeserializeOwned + ConfigValidation,
    {
        let config: T = Self::parse(content, format)?;
        config.validate()?;
        Ok(config)
    }

    /// HashMap에서 설정 로드
    ///
    /// 맵을 JSON으로 직렬화한 뒤 다시 역직렬화합니다.
    pub fn load_from_map<T, V>(map: &HashMap<String, V>) -> ConfigResult<T>
    where
        T: DeserializeOwned + ConfigValidation,
        V: Serialize,
    {
        let json = serde_json::to_string(map)
            .map_err(|e| ConfigError::ParseError(format!("맵을 JSON으로 변환 실패: {e}")))?;
        Self::load_from_string(&json, ConfigFormat::Json)
    }

    /// 설정 파일 저장
    ///
    /// # Arguments
    /// * `config` - 설정 객체
    /// * `path` - 저장할 파일 경로
    /// * `format` - 설정 파일 형식 (Auto면 확장자로 선택, 확장자가 없으면 TOML)
    pub fn save_to_file<T>(config: &T, path: &Path, format: ConfigFormat) -> ConfigResult<()>
    where
        T: Serialize + ConfigValidation,
    {
        debug!("설정 파일 저장 시작: {}", path.display());
        config.validate()?;

        let format = match format {
            ConfigFormat::Auto => Self::detect_format(path).unwrap_or(ConfigFormat::Toml),
            other => other,
        };

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(config)
                .map_err(|e| ConfigError::ParseError(format!("JSON 직렬화 실패: {e}")))?,
            _ => toml::to_string_pretty(config)
                .map_err(|e| ConfigError::ParseError(format!("TOML 직렬화 실패: {e}")))?,
        };

        std::fs::write(path, &content).map_err(|e| {
            error!("설정 파일 쓰기 실패: {} - {}", path.display(), e);
            ConfigError::FileError(format!("파일 쓰기 실패: {e}"))
        })?;

        info!("설정 파일 저장 완료: {}", path.display());
        Ok(())
    }

    fn parse<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
        match format {
            ConfigFormat::Json => Self::parse_json(content),
            ConfigFormat::Toml => Self::parse_toml(content),
            ConfigFormat::Auto => {
                Self::parse_json(content).or_else(|_| Self::parse_toml(content))
            }
        }
    }

    fn parse_json<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
        serde_json::from_str(content).map_err(|e| {
            warn!("JSON 파싱 실패: {e}");
            ConfigError::ParseError(format!("JSON 파싱 실패: {e}"))
        })
    }

    fn parse_toml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
        toml::from_str(content).map_err(|e| {
            warn!("TOML 파싱 실패: {e}");
            ConfigError::ParseError(format!("TOML 파싱 실패: {e}"))
        })
    }

    /// 파일 확장자로 형식 감지
    fn detect_format(path: &Path) -> ConfigResult<ConfigFormat> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            _ => {
                warn!("지원되지 않는 파일 형식: {}", path.display());
                Err(ConfigError::FileError(format!(
                    "파일 형식을 감지할 수 없음: {}",
                    path.display()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct WindowConfig {
        pub name: String,
        pub window: usize,
    }

    impl ConfigValidation for WindowConfig {
        fn validate(&self) -> ConfigResult<()> {
            if self.window == 0 {
                return Err(ConfigError::ValidationError(
                    "window는 0보다 커야 합니다".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[test]
    fn test_load_from_json_string() {
        let json = r#"{"name":"ladder","window":34}"#;
        let config =
            ConfigLoader::load_from_string::<WindowConfig>(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.name, "ladder");
        assert_eq!(config.window, 34);
    }

    #[test]
    fn test_auto_falls_back_to_toml() {
        let toml_str = r#"
            name = "ladder"
            window = 13
        "#;
        let config =
            ConfigLoader::load_from_string::<WindowConfig>(toml_str, ConfigFormat::Auto).unwrap();
        assert_eq!(config.window, 13);
    }

    #[test]
    fn test_validation_error() {
        let json = r#"{"name":"ladder","window":0}"#;
        let result = ConfigLoader::load_from_string::<WindowConfig>(json, ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_from_map() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), serde_json::json!("cd"));
        map.insert("window".to_string(), serde_json::json!(30));
        let config = ConfigLoader::load_from_map::<WindowConfig, _>(&map).unwrap();
        assert_eq!(config.window, 30);
    }

    #[test]
    fn test_unknown_extension() {
        let result = ConfigLoader::load_from_file::<WindowConfig>(
            Path::new("config.yaml"),
            ConfigFormat::Auto,
        );
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }
}
