use crate::entitys::mail_entity::{EmbeddedFile, MailData};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use common::config::SmtpConfig;
use lettre::address::Envelope;
use lettre::message::header::{self, ContentType, Header, HeaderName, HeaderValue};
use lettre::message::{Attachment, Body, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use log::debug;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

const CONN_SECURITY_TLS: &str = "TLS";
const CONN_SECURITY_STARTTLS: &str = "STARTTLS";
/// server_timeout 配 0 时的兜底超时（秒）
const DEFAULT_SERVER_TIMEOUT_SECS: u64 = 10;
/// 纯文本替代内容的折行宽度
const TEXT_BODY_WIDTH: usize = 80;

/// Auto-Submitted 头（RFC 3834），通知邮件固定带上
#[derive(Debug, Clone, PartialEq)]
struct AutoSubmitted(String);

impl Header for AutoSubmitted {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Auto-Submitted")
    }
    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }
    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Precedence(String);

impl Header for Precedence {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Precedence")
    }
    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }
    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// 调用方附加的 MIME 头，名字运行期给定，值由 lettre 做 RFC 2047 编码
#[derive(Debug, Clone)]
struct ExtraHeader {
    name: HeaderName,
    value: String,
}

impl Header for ExtraHeader {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Extra-Header")
    }
    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("dynamic header cannot be parsed: {}", s).into())
    }
    fn display(&self) -> HeaderValue {
        HeaderValue::new(self.name.clone(), self.value.clone())
    }
}

#[async_trait]
pub trait MailServiceTrait: Send + Sync {
    async fn send_mail(&self, mail: &MailData) -> anyhow::Result<()>;
    async fn test_connection(&self) -> anyhow::Result<()>;
}

/// 出站邮件服务：每次发送单独建立一条 SMTP 会话，失败不重试，由调用方决定重试策略
#[derive(Debug)]
pub struct MailService {
    pub config: SmtpConfig,
}

impl MailService {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub fn init(config: SmtpConfig) {
        INSTANCE.set(Arc::new(Self::new(config))).expect("INSTANCE already initialized");
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("INSTANCE is not initialized").clone()
    }

    /// 用平台发件身份发送通知邮件
    pub async fn send_mail_using_config(&self, to: &str, subject: &str, html_body: &str, cc: &str) -> anyhow::Result<()> {
        self.send_mail_with_embedded_files(to, subject, html_body, cc, Vec::new()).await
    }

    /// 同上，带内嵌附件
    pub async fn send_mail_with_embedded_files(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        cc: &str,
        embedded_files: Vec<EmbeddedFile>,
    ) -> anyhow::Result<()> {
        let mail = MailData {
            mime_to: to.to_string(),
            smtp_to: to.to_string(),
            from_name: self.config.feedback_name.clone(),
            from_address: self.config.feedback_email.clone(),
            cc: cc.to_string(),
            reply_to_name: self.config.feedback_name.clone(),
            reply_to_address: self.config.reply_to_address.clone(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            embedded_files,
            mime_headers: HashMap::new(),
        };
        self.send_mail(&mail).await
    }

    fn server_timeout(&self) -> Duration {
        let secs = if self.config.server_timeout == 0 { DEFAULT_SERVER_TIMEOUT_SECS } else { self.config.server_timeout };
        Duration::from_secs(secs)
    }

    fn tls_parameters(&self) -> anyhow::Result<TlsParameters> {
        TlsParameters::builder(self.config.server.clone())
            .dangerous_accept_invalid_certs(self.config.skip_server_certificate_verification)
            .build()
            .map_err(|e| anyhow!("unable to prepare the TLS configuration: {}", e))
    }

    /// 按配置组装一条未建立的 SMTP 传输：明文 / STARTTLS 升级 / 隐式 TLS
    fn build_transport(&self) -> anyhow::Result<AsyncSmtpTransport<Tokio1Executor>> {
        let cfg = &self.config;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(cfg.server.as_str())
            .port(cfg.port)
            .timeout(Some(self.server_timeout()));

        match cfg.connection_security.as_str() {
            CONN_SECURITY_TLS => {
                builder = builder.tls(Tls::Wrapper(self.tls_parameters()?));
            }
            CONN_SECURITY_STARTTLS => {
                builder = builder.tls(Tls::Required(self.tls_parameters()?));
            }
            _ => {}
        }

        if !cfg.hostname.is_empty() {
            builder = builder.hello_name(ClientId::Domain(cfg.hostname.clone()));
        }

        if cfg.enable_smtp_auth {
            // 认证机制是封闭集合，实际用哪个按服务器通告的能力协商，
            // LOGIN 只允许出现在加密会话上，这些都由 lettre 把关
            builder = builder
                .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
                .authentication(vec![Mechanism::Plain, Mechanism::Login]);
        }

        Ok(builder.build())
    }

    /// 组装 MIME 文档和 SMTP 信封
    ///
    /// 信封收件人用 smtp_to，To 头用 mime_to，两者允许有意不同
    fn build_message(&self, mail: &MailData, date: SystemTime) -> anyhow::Result<(Envelope, Message)> {
        let from_address = mail
            .from_address
            .parse::<Address>()
            .map_err(|e| anyhow!("invalid from address {}: {}", mail.from_address, e))?;
        let smtp_to = mail
            .smtp_to
            .parse::<Address>()
            .map_err(|e| anyhow!("invalid envelope recipient {}: {}", mail.smtp_to, e))?;
        let mime_to = mail
            .mime_to
            .parse::<Mailbox>()
            .map_err(|e| anyhow!("invalid to address {}: {}", mail.mime_to, e))?;

        let envelope = Envelope::new(Some(from_address.clone()), vec![smtp_to])
            .context("unable to build the smtp envelope")?;

        let from_name = if mail.from_name.is_empty() { None } else { Some(mail.from_name.clone()) };
        let mut builder = Message::builder()
            .from(Mailbox::new(from_name, from_address))
            .to(mime_to)
            .subject(mail.subject.clone())
            .date(date)
            .header(header::ContentTransferEncoding::EightBit)
            .header(AutoSubmitted("auto-generated".to_string()))
            .header(Precedence("bulk".to_string()));

        if !mail.reply_to_address.is_empty() {
            let reply_to_address = mail
                .reply_to_address
                .parse::<Address>()
                .map_err(|e| anyhow!("invalid reply-to address {}: {}", mail.reply_to_address, e))?;
            let reply_to_name = if mail.reply_to_name.is_empty() { None } else { Some(mail.reply_to_name.clone()) };
            builder = builder.reply_to(Mailbox::new(reply_to_name, reply_to_address));
        }

        if !mail.cc.is_empty() {
            let cc = mail.cc.parse::<Mailbox>().map_err(|e| anyhow!("invalid cc address {}: {}", mail.cc, e))?;
            builder = builder.cc(cc);
        }

        for (name, value) in &mail.mime_headers {
            let header_name = HeaderName::new_from_ascii(name.clone())
                .map_err(|e| anyhow!("invalid mime header name {}: {}", name, e))?;
            builder = builder.header(ExtraHeader { name: header_name, value: value.clone() });
        }

        // 纯文本部分由 HTML 自动派生
        let txt_body = html2text::from_read(mail.html_body.as_bytes(), TEXT_BODY_WIDTH);
        let html_message = format!("\r\n<html><body>{}</body></html>", mail.html_body);

        let alternative = MultiPart::alternative_plain_html(txt_body, html_message);
        let message = if mail.embedded_files.is_empty() {
            builder.multipart(alternative)
        } else {
            let mut mixed = MultiPart::mixed().multipart(alternative);
            for file in &mail.embedded_files {
                mixed = mixed.singlepart(build_attachment(file)?);
            }
            builder.multipart(mixed)
        }
        .context("failed to build the email message")?;

        Ok((envelope, message))
    }
}

fn build_attachment(file: &EmbeddedFile) -> anyhow::Result<SinglePart> {
    let content_type_str = if file.content_type.is_empty() { "application/octet-stream" } else { file.content_type.as_str() };
    let content_type =
        ContentType::parse(content_type_str).map_err(|e| anyhow!("invalid content type {}: {}", content_type_str, e))?;
    Ok(Attachment::new_inline(file.name.clone()).body(Body::new(file.data.clone()), content_type))
}

static INSTANCE: OnceCell<Arc<MailService>> = OnceCell::new();

#[async_trait]
impl MailServiceTrait for MailService {
    async fn send_mail(&self, mail: &MailData) -> anyhow::Result<()> {
        // 未配置服务器的部署直接跳过，不算错误
        if self.config.server.is_empty() {
            return Ok(());
        }

        debug!("sending mail, to={} subject={}", mail.smtp_to, mail.subject);

        let (envelope, message) = self.build_message(mail, SystemTime::now())?;
        let mailer = self.build_transport()?;

        // 整体超时兜底，单阶段的 socket 超时由 transport 自己管
        let deadline = self.server_timeout() * 2;
        tokio::time::timeout(deadline, mailer.send_raw(&envelope, &message.formatted()))
            .await
            .map_err(|_| anyhow!("timed out while sending to the SMTP server"))?
            .context("failed to deliver the email message")?;
        Ok(())
    }

    /// 连通性自检：走完连接 / TLS / 认证，不发信体
    async fn test_connection(&self) -> anyhow::Result<()> {
        if !self.config.send_email_notifications {
            return Err(anyhow!("send.email.notifications.disabled"));
        }

        let mailer = self.build_transport()?;
        let deadline = self.server_timeout() * 2;
        let reachable = tokio::time::timeout(deadline, mailer.test_connection())
            .await
            .map_err(|_| anyhow!("timed out while connecting to the SMTP server"))?
            .context("unable to connect to the SMTP server")?;
        if !reachable {
            return Err(anyhow!("smtp.server.rejected.connection"));
        }
        Ok(())
    }
}
