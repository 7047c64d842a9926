use common::config::SmtpConfig;

pub mod biz_service;
pub mod entitys;

pub fn init_service(smtp_config: SmtpConfig) {
    biz_service::init_service(smtp_config);
}
