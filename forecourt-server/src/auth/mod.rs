//! 认证和授权模块
//!
//! JWT 生成/验证、认证中间件、处理函数提取器，以及资源归属检查。

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth};

use crate::utils::{AppError, AppResult};

/// Strip a `table:` prefix from a record id, if present.
///
/// IDs arrive both ways (`user:abc123` from tokens, bare `abc123` from
/// paths); ownership checks always compare the bare key.
pub fn bare_key(id: &str) -> &str {
    match id.split_once(':') {
        Some((_, key)) => key,
        None => id,
    }
}

/// Owner-or-admin gate used by every per-resource read and mutation
pub fn ensure_owner_or_admin(actor: &CurrentUser, owner_id: &str) -> AppResult<()> {
    if actor.is_admin() || bare_key(&actor.id) == bare_key(owner_id) {
        return Ok(());
    }
    Err(AppError::forbidden(
        "You do not have access to this resource",
    ))
}
