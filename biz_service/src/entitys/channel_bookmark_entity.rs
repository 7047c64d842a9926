use common::errors::AppError;
use common::util::common_utils::{build_id, build_md5};
use common::util::date_util::now_millis;
use common::util::validate::{is_valid_http_url, is_valid_id};
use common::{ChannelId, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{AsRefStr, EnumString};
use utoipa::ToSchema;

/// 书签类型：链接书签 / 文件书签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChannelBookmarkType {
    Link,
    File,
}

/// 频道书签：挂在频道上的命名链接或文件
///
/// 时间戳为毫秒；delete_at != 0 表示软删除，记录本身不移除
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBookmark {
    pub id: String,
    pub channel_id: ChannelId,
    /// 创建者用户 ID
    pub owner_id: UserId,
    /// 文件书签引用的文件 ID
    pub file_id: String,
    pub display_name: String,
    /// 排序位置
    pub sort_order: i64,
    pub link_url: String,
    pub image_url: String,
    pub emoji: String,
    /// 类型标记，取值见 ChannelBookmarkType（"link" / "file"）
    #[serde(rename = "type")]
    pub bookmark_type: String,
    pub create_at: i64,
    pub update_at: i64,
    pub delete_at: i64,
    /// 迁移/共享场景的来源书签 ID，仅做格式校验
    pub original_id: String,
    pub parent_id: String,
}

impl ChannelBookmark {
    /// 结构校验，返回第一个不满足的项
    ///
    /// 固定检查顺序：id -> channel_id -> owner_id -> display_name -> type
    /// -> 类型必填字段 -> image_url -> original_id/parent_id -> create_at -> update_at
    pub fn is_valid(&self) -> Result<(), AppError> {
        if !is_valid_id(&self.id) {
            return Err(AppError::Validation("channel_bookmark.is_valid.id".to_string()));
        }
        if !is_valid_id(&self.channel_id) {
            return Err(AppError::Validation("channel_bookmark.is_valid.channel_id".to_string()));
        }
        if !is_valid_id(&self.owner_id) {
            return Err(AppError::Validation("channel_bookmark.is_valid.owner_id".to_string()));
        }
        if self.display_name.is_empty() {
            return Err(AppError::Validation("channel_bookmark.is_valid.display_name".to_string()));
        }
        let bookmark_type = ChannelBookmarkType::from_str(&self.bookmark_type)
            .map_err(|_| AppError::Validation("channel_bookmark.is_valid.type".to_string()))?;
        // 类型必填字段二选一：link 用 link_url，file 用 file_id
        match bookmark_type {
            ChannelBookmarkType::Link => {
                if !self.file_id.is_empty() {
                    return Err(AppError::Validation("channel_bookmark.is_valid.file_id.not_allowed".to_string()));
                }
                if self.link_url.is_empty() || !is_valid_http_url(&self.link_url) {
                    return Err(AppError::Validation("channel_bookmark.is_valid.link_url".to_string()));
                }
            }
            ChannelBookmarkType::File => {
                if !self.link_url.is_empty() {
                    return Err(AppError::Validation("channel_bookmark.is_valid.link_url.not_allowed".to_string()));
                }
                if !is_valid_id(&self.file_id) {
                    return Err(AppError::Validation("channel_bookmark.is_valid.file_id".to_string()));
                }
            }
        }
        if !self.image_url.is_empty() && !is_valid_http_url(&self.image_url) {
            return Err(AppError::Validation("channel_bookmark.is_valid.image_url".to_string()));
        }
        if !self.original_id.is_empty() && !is_valid_id(&self.original_id) {
            return Err(AppError::Validation("channel_bookmark.is_valid.original_id".to_string()));
        }
        if !self.parent_id.is_empty() && !is_valid_id(&self.parent_id) {
            return Err(AppError::Validation("channel_bookmark.is_valid.parent_id".to_string()));
        }
        if self.create_at == 0 {
            return Err(AppError::Validation("channel_bookmark.is_valid.create_at".to_string()));
        }
        if self.update_at == 0 {
            return Err(AppError::Validation("channel_bookmark.is_valid.update_at".to_string()));
        }
        Ok(())
    }

    /// 首次入库前打时间戳，其他字段不动
    pub fn pre_save(&mut self) {
        if self.id.is_empty() {
            self.id = build_id();
        }
        if self.create_at == 0 {
            self.create_at = now_millis();
        }
        self.update_at = self.create_at;
    }

    /// 更新前推进 update_at，保证严格递增，create_at 不变
    pub fn pre_update(&mut self) {
        self.update_at = now_millis().max(self.update_at + 1);
    }

    /// 基于 (id, update_at) 的指纹，两者都相同才相等，用于缓存失效比较
    pub fn etag(&self) -> String {
        build_md5(&format!("{}.{}", self.id, self.update_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_bookmark() -> ChannelBookmark {
        ChannelBookmark {
            id: build_id(),
            channel_id: build_id(),
            owner_id: build_id(),
            display_name: "display name".to_string(),
            link_url: "https://example.com".to_string(),
            bookmark_type: ChannelBookmarkType::Link.as_ref().to_string(),
            create_at: 2,
            update_at: 3,
            delete_at: 4,
            ..Default::default()
        }
    }

    fn file_bookmark() -> ChannelBookmark {
        ChannelBookmark {
            id: build_id(),
            channel_id: build_id(),
            owner_id: build_id(),
            display_name: "display name".to_string(),
            file_id: build_id(),
            bookmark_type: ChannelBookmarkType::File.as_ref().to_string(),
            create_at: 2,
            update_at: 3,
            delete_at: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_is_valid() {
        let cases: Vec<(&str, ChannelBookmark, bool)> = vec![
            ("empty bookmark", ChannelBookmark::default(), false),
            (
                "bookmark without create at timestamp",
                ChannelBookmark { create_at: 0, ..link_bookmark() },
                false,
            ),
            (
                "bookmark without update at timestamp",
                ChannelBookmark { update_at: 0, ..link_bookmark() },
                false,
            ),
            (
                "bookmark with missing channel id",
                ChannelBookmark { channel_id: String::new(), ..link_bookmark() },
                false,
            ),
            (
                "bookmark with invalid channel id",
                ChannelBookmark { channel_id: "invalid".to_string(), ..link_bookmark() },
                false,
            ),
            (
                "bookmark with missing owner id",
                ChannelBookmark { owner_id: String::new(), ..link_bookmark() },
                false,
            ),
            (
                "bookmark with invalid owner id",
                ChannelBookmark { owner_id: "invalid".to_string(), ..link_bookmark() },
                false,
            ),
            (
                "bookmark with missing display name",
                ChannelBookmark { display_name: String::new(), ..link_bookmark() },
                false,
            ),
            (
                "bookmark with missing type",
                ChannelBookmark { bookmark_type: String::new(), ..link_bookmark() },
                false,
            ),
            (
                "bookmark with invalid type",
                ChannelBookmark { bookmark_type: "invalid".to_string(), ..link_bookmark() },
                false,
            ),
            (
                "bookmark of type link with missing link url",
                ChannelBookmark { link_url: String::new(), ..link_bookmark() },
                false,
            ),
            (
                "bookmark of type link with invalid link url",
                ChannelBookmark { link_url: "invalid".to_string(), ..link_bookmark() },
                false,
            ),
            ("bookmark of type link with valid link url", link_bookmark(), true),
            (
                "bookmark of type link with file id set",
                ChannelBookmark { file_id: build_id(), ..link_bookmark() },
                false,
            ),
            (
                "bookmark of type link with invalid image url",
                ChannelBookmark { image_url: "invalid".to_string(), ..link_bookmark() },
                false,
            ),
            (
                // we don't care whether the URL points at an actual image,
                // clients deal with broken previews
                "bookmark of type link with image url without extension",
                ChannelBookmark {
                    image_url: "https://example.com/some-image-without-extension".to_string(),
                    ..link_bookmark()
                },
                true,
            ),
            (
                "bookmark of type file with missing file id",
                ChannelBookmark { file_id: String::new(), ..file_bookmark() },
                false,
            ),
            (
                "bookmark of type file with invalid file id",
                ChannelBookmark { file_id: "invalid".to_string(), ..file_bookmark() },
                false,
            ),
            ("bookmark of type file with valid file id", file_bookmark(), true),
            (
                "bookmark of type file with link url set",
                ChannelBookmark { link_url: "https://example.com".to_string(), ..file_bookmark() },
                false,
            ),
            (
                "bookmark with invalid original id",
                ChannelBookmark { original_id: "invalid".to_string(), ..file_bookmark() },
                false,
            ),
            (
                "bookmark with invalid parent id",
                ChannelBookmark { parent_id: "invalid".to_string(), ..file_bookmark() },
                false,
            ),
        ];

        for (description, bookmark, expected_valid) in cases {
            assert_eq!(bookmark.is_valid().is_ok(), expected_valid, "case: {}", description);
        }
    }

    #[test]
    fn test_is_valid_first_error_key() {
        let mut bookmark = link_bookmark();
        bookmark.channel_id = String::new();
        bookmark.display_name = String::new();
        // channel_id 在 display_name 之前被检查
        let err = bookmark.is_valid().unwrap_err();
        assert_eq!(err.message_key(), Some("channel_bookmark.is_valid.channel_id"));
    }

    #[test]
    fn test_pre_save() {
        let mut bookmark = ChannelBookmark {
            id: build_id(),
            channel_id: build_id(),
            owner_id: build_id(),
            display_name: "display name".to_string(),
            link_url: "https://example.com".to_string(),
            bookmark_type: ChannelBookmarkType::Link.as_ref().to_string(),
            ..Default::default()
        };
        let original = bookmark.clone();

        bookmark.pre_save();
        assert_ne!(bookmark.create_at, 0);
        assert_ne!(bookmark.update_at, 0);
        assert_eq!(bookmark.update_at, bookmark.create_at);

        // timestamps aside, nothing else moved
        let mut expected = original;
        expected.create_at = bookmark.create_at;
        expected.update_at = bookmark.update_at;
        assert_eq!(expected, bookmark);

        assert!(bookmark.is_valid().is_ok());
    }

    #[test]
    fn test_pre_save_generates_id() {
        let mut bookmark = ChannelBookmark {
            channel_id: build_id(),
            owner_id: build_id(),
            display_name: "display name".to_string(),
            link_url: "https://example.com".to_string(),
            bookmark_type: ChannelBookmarkType::Link.as_ref().to_string(),
            ..Default::default()
        };
        bookmark.pre_save();
        assert!(is_valid_id(&bookmark.id));
    }

    #[test]
    fn test_pre_update() {
        let mut bookmark = link_bookmark();
        bookmark.pre_save();
        let create_at = bookmark.create_at;
        let update_at = bookmark.update_at;

        bookmark.pre_update();
        assert!(bookmark.update_at > update_at);
        assert_eq!(bookmark.create_at, create_at);

        // strictly increasing even when called back to back
        let previous = bookmark.update_at;
        bookmark.pre_update();
        assert!(bookmark.update_at > previous);
    }

    #[test]
    fn test_etag() {
        let bookmark = ChannelBookmark { update_at: 2, ..link_bookmark() };
        let same = bookmark.clone();
        assert_eq!(bookmark.etag(), same.etag());

        let other_id = ChannelBookmark { id: build_id(), ..bookmark.clone() };
        assert_ne!(bookmark.etag(), other_id.etag());

        let other_update = ChannelBookmark { update_at: 3, ..bookmark.clone() };
        assert_ne!(bookmark.etag(), other_update.etag());
    }

    #[test]
    fn test_serde_type_tag() {
        let bookmark = link_bookmark();
        let json = serde_json::to_string(&bookmark).unwrap();
        assert!(json.contains("\"type\":\"link\""));
        assert!(json.contains("\"displayName\""));

        let parsed: ChannelBookmark = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, bookmark);
    }
}
