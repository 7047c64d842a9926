use log::error;
use std::io;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    // ==== 常规业务错误 ====
    #[error("Resource not found")]
    NotFound,

    #[error("Bad request: {0}")]
    Validation(String),

    #[error("biz error: {0}")]
    BizError(String),

    // ==== 系统错误 ====
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// 校验错误携带的消息 key（如 "channel_bookmark.is_valid.id"）
    pub fn message_key(&self) -> Option<&str> {
        match self {
            AppError::Validation(key) => Some(key),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        error!("{:?}", e);
        AppError::Internal(e.to_string())
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::BizError(format!("参数验证失败: {}", e))
    }
}
