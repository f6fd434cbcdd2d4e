use serde::Deserialize;
use ts_rs::TS;

// 提交签到请求
//
// 学生身份与姓名取自登录态，请求体里只带照片凭证。
// photo_token 指向已经通过文件接口上传成功的照片。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/attendance.ts")]
pub struct SubmitAttendanceRequest {
    pub photo_token: String,
}

// 签到记录查询参数（来自HTTP请求）
//
// date 形如 YYYY-MM-DD，缺省取当天（UTC）。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../client/src/types/generated/attendance.ts")]
pub struct AttendanceListParams {
    pub date: Option<String>,
}
