//! 路径参数安全提取器
//!
//! actix 默认的 `web::Path<i64>` 在解析失败时返回 400 纯文本，
//! 与统一响应信封不一致。这里的提取器在解析失败时返回信封格式错误。

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 定义一个从路径中按名称提取 i64 的安全提取器
///
/// ```rust,ignore
/// define_safe_i64_extractor!(SafeClassroomIdI64, "classroom_id");
/// ```
#[macro_export]
macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        pub struct $name(pub i64);

        impl actix_web::FromRequest for $name {
            type Error = actix_web::Error;
            type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

            fn from_request(
                req: &actix_web::HttpRequest,
                _payload: &mut actix_web::dev::Payload,
            ) -> Self::Future {
                let parsed = req
                    .match_info()
                    .get($param)
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .filter(|id| *id > 0);

                futures_util::future::ready(match parsed {
                    Some(id) => Ok($name(id)),
                    None => Err(actix_web::error::InternalError::from_response(
                        concat!("invalid ", $param),
                        actix_web::HttpResponse::BadRequest().json(
                            $crate::models::ApiResponse::<()>::error_empty(
                                $crate::models::ErrorCode::BadRequest,
                                concat!("Invalid path parameter: ", $param),
                            ),
                        ),
                    )
                    .into()),
                })
            }
        }
    };
}

define_safe_i64_extractor!(SafeClassroomIdI64, "classroom_id");

/// 文件凭证提取器：凭证形如 `{timestamp}-{uuid}`，拒绝路径穿越字符
pub struct SafeFileToken(pub String);

impl FromRequest for SafeFileToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .match_info()
            .get("file_token")
            .map(|raw| raw.to_string())
            .filter(|t| {
                !t.is_empty()
                    && t.len() <= 128
                    && t.chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            });

        ready(match token {
            Some(t) => Ok(SafeFileToken(t)),
            None => Err(actix_web::error::InternalError::from_response(
                "invalid file_token",
                actix_web::HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
                    ErrorCode::BadRequest,
                    "Invalid path parameter: file_token",
                )),
            )
            .into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_classroom_id_extractor_accepts_positive() {
        let req = TestRequest::default()
            .param("classroom_id", "42")
            .to_http_request();
        let extracted = SafeClassroomIdI64::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(extracted.0, 42);
    }

    #[actix_web::test]
    async fn test_classroom_id_extractor_rejects_garbage() {
        for bad in ["abc", "-1", "0", "9999999999999999999999"] {
            let req = TestRequest::default()
                .param("classroom_id", bad)
                .to_http_request();
            assert!(
                SafeClassroomIdI64::from_request(&req, &mut Payload::None)
                    .await
                    .is_err(),
                "should reject {bad:?}"
            );
        }
    }

    #[actix_web::test]
    async fn test_file_token_rejects_traversal() {
        let req = TestRequest::default()
            .param("file_token", "../etc/passwd")
            .to_http_request();
        assert!(
            SafeFileToken::from_request(&req, &mut Payload::None)
                .await
                .is_err()
        );
    }
}
