// src/entitys/mail_entity.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// 内嵌附件：按名字引用的字节流
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedFile {
    pub name: String,
    /// MIME 类型，空则按 application/octet-stream 处理
    pub content_type: String,
    pub data: Vec<u8>,
}

/// 出站邮件内容
///
/// mime_to 渲染进 To 头，smtp_to 是信封收件人，两者可以不同（盲投场景），
/// 除此之外互不约束
#[derive(Debug, Clone, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MailData {
    pub mime_to: String,
    pub smtp_to: String,
    pub from_name: String,
    pub from_address: String,
    pub cc: String,
    pub reply_to_name: String,
    pub reply_to_address: String,
    pub subject: String,
    pub html_body: String,
    pub embedded_files: Vec<EmbeddedFile>,
    /// 调用方附加的 MIME 头，值在发送时做 RFC 2047 编码
    pub mime_headers: HashMap<String, String>,
}
