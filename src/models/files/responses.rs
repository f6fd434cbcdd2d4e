use serde::Serialize;
use ts_rs::TS;

/// 照片上传结果，upload_token 随后作为签到请求里的照片凭证
#[derive(Serialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/file.ts")]
pub struct FileUploadResponse {
    /// 文件凭证
    pub upload_token: String,
    /// 原始文件名
    pub file_name: String,
    /// 文件大小(字节)
    pub size: i64,
    /// 文件类型
    pub content_type: String,
    /// 上传时间
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}
