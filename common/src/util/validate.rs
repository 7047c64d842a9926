use lazy_static::lazy_static;
use regex::Regex;
use url::Url;
use validator::{ValidateEmail, ValidationError};

/// ✅ 实体 ID 校验：build_id 生成的 32 位十六进制
pub fn is_valid_id(id: &str) -> bool {
    lazy_static! {
        static ref ID_RE: Regex = Regex::new(r"^[0-9a-f]{32}$").unwrap();
    }
    ID_RE.is_match(id)
}

/// ✅ http/https 链接校验，只看结构不访问目标
pub fn is_valid_http_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.has_host(),
        Err(_) => false,
    }
}

/// ✅ 邮箱格式校验（基于 validator 库）
pub fn validate_email_str(email: &str) -> Result<(), ValidationError> {
    if email.validate_email() { Ok(()) } else { Err(ValidationError::new("邮箱格式错误")) }
}
