pub mod mail_service;

use common::config::SmtpConfig;

pub fn init_service(smtp_config: SmtpConfig) {
    mail_service::MailService::init(smtp_config);
}
