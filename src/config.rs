use std::time::Duration;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 考试代码（upsc / neet / jee / cat / gate）
    pub exam_code: String,
    /// 待转换文件所在目录
    pub input_folder: String,
    /// 输出 ZIP 存放目录
    pub output_folder: String,
    /// 自定义考试配置文件（为空时使用内置配置）
    pub profiles_file: Option<String>,
    /// worker 初始化超时（秒）
    pub worker_init_timeout_secs: u64,
    /// 文档分析超时（秒）
    pub analyze_timeout_secs: u64,
    /// 单个文件格式化超时（秒）
    pub format_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exam_code: "upsc".to_string(),
            input_folder: "input_docs".to_string(),
            output_folder: "output".to_string(),
            profiles_file: None,
            worker_init_timeout_secs: 30,
            analyze_timeout_secs: 30,
            format_timeout_secs: 30,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            exam_code: std::env::var("EXAM_CODE").unwrap_or(default.exam_code),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            profiles_file: std::env::var("EXAM_PROFILES_FILE").ok().filter(|v| !v.is_empty()),
            worker_init_timeout_secs: std::env::var("WORKER_INIT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.worker_init_timeout_secs),
            analyze_timeout_secs: std::env::var("ANALYZE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.analyze_timeout_secs),
            format_timeout_secs: std::env::var("FORMAT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.format_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    pub fn worker_init_timeout(&self) -> Duration {
        Duration::from_secs(self.worker_init_timeout_secs)
    }

    pub fn analyze_timeout(&self) -> Duration {
        Duration::from_secs(self.analyze_timeout_secs)
    }

    pub fn format_timeout(&self) -> Duration {
        Duration::from_secs(self.format_timeout_secs)
    }
}
