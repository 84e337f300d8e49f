//! JWT Extractor
//!
//! [`CurrentUser`] 作为 axum 提取器：优先复用 `require_auth` 已注入的
//! 扩展，否则走与中间件相同的 [`authenticate`](super::middleware::authenticate)。

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, middleware::authenticate};
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = authenticate(&state.jwt_service, &parts.headers, &parts.uri)?;

        // Cache for later extractions within the same request
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
