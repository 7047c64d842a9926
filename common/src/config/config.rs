use config::Config;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub sys: Option<SysConfig>,
    pub smtp: Option<SmtpConfig>,
}
impl AppConfig {
    pub fn new(file: &String) -> Self {
        let config = Config::builder()
            .add_source(config::File::with_name(file).required(true))
            .add_source(config::Environment::with_prefix("APP").separator("_"))
            .build()
            .expect("Failed to build configuration");
        let cfg = config.try_deserialize::<AppConfig>().expect("Failed to deserialize configuration");
        return cfg;
    }
    pub fn init(file: &String) {
        let instance = Self::new(&file);
        INSTANCE.set(Arc::new(instance)).expect("INSTANCE already initialized");
    }

    pub fn get_sys(&self) -> SysConfig {
        self.sys.clone().unwrap_or_default()
    }
    pub fn get_smtp(&self) -> SmtpConfig {
        self.smtp.clone().unwrap_or_default()
    }
    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("INSTANCE is not initialized").clone()
    }
}
static INSTANCE: OnceCell<Arc<AppConfig>> = OnceCell::new();

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SysConfig {
    //全局日志级别
    pub log_level: String,
}

/// SMTP 出站邮件配置，按发送请求读取，不跨请求复用连接
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SmtpConfig {
    /// 连接安全模式："TLS"（隐式 TLS）/ "STARTTLS"（明文升级）/ 其他视为明文
    pub connection_security: String,
    /// 跳过服务器证书校验（仅用于自建/测试环境）
    pub skip_server_certificate_verification: bool,
    /// EHLO 使用的本地主机名，空则由客户端库取默认值
    pub hostname: String,
    pub server: String,
    pub port: u16,
    /// 连接/读写超时（秒），0 取默认值
    pub server_timeout: u64,
    pub username: String,
    pub password: String,
    pub enable_smtp_auth: bool,
    /// 邮件通知总开关，关闭时自检直接失败
    pub send_email_notifications: bool,
    pub feedback_name: String,
    pub feedback_email: String,
    pub reply_to_address: String,
}
