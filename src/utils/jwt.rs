use crate::config::AppConfig;
use actix_web::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user ID)
    pub role: String,       // 用户角色
    pub token_type: String, // token类型: "access" 或 "refresh"
    pub exp: usize,         // Expiration time (时间戳)
    pub iat: usize,         // Issued at (签发时间)
}

// Token 响应结构体
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct JwtUtils;

impl JwtUtils {
    // 获取 JWT 密钥
    fn get_secret() -> String {
        AppConfig::get().jwt.secret.clone()
    }

    // 生成 Access Token
    pub fn generate_access_token(
        user_id: i64,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::generate_token_with_expiry(
            user_id,
            role,
            "access",
            chrono::Duration::minutes(config.jwt.access_token_expiry),
        )
    }

    // 生成 Refresh Token
    pub fn generate_refresh_token(
        user_id: i64,
        role: &str,
        token_expiry: Option<chrono::Duration>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        match token_expiry {
            Some(expiry) => Self::generate_token_with_expiry(user_id, role, "refresh", expiry),
            None => Self::generate_token_with_expiry(
                user_id,
                role,
                "refresh",
                chrono::Duration::days(config.jwt.refresh_token_expiry),
            ),
        }
    }

    // 生成带自定义过期时间的 Token
    pub fn generate_token_with_expiry(
        user_id: i64,
        role: &str,
        token_type: &str,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            token_type: token_type.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let secret = Self::get_secret();
        let encoding_key = EncodingKey::from_secret(secret.as_ref());

        encode(&Header::default(), &claims, &encoding_key)
    }

    // 生成完整的 Token 响应（包含 access 和 refresh token）
    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
        refresh_token_expiry: Option<chrono::Duration>,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        let access_token = Self::generate_access_token(user_id, role)?;
        let refresh_token = Self::generate_refresh_token(user_id, role, refresh_token_expiry)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    // 验证 JWT token
    pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let secret = Self::get_secret();
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }

    // 验证 token 是否为指定类型
    pub fn verify_token_type(
        token: &str,
        expected_type: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = Self::verify_token(token)?;
        if claims.token_type != expected_type {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }

    // 验证 access token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_type(token, "access")
    }

    // 验证 refresh token
    pub fn verify_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_type(token, "refresh")
    }

    // 用 refresh token 换发新的 access token
    pub fn refresh_access_token(
        refresh_token: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Self::verify_refresh_token(refresh_token)?;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidToken)?;
        Self::generate_access_token(user_id, &claims.role)
    }

    // 创建 refresh token 的 HttpOnly cookie，max_age 与 token 有效期一致
    pub fn create_refresh_token_cookie(refresh_token: &str, max_age_days: i64) -> Cookie<'static> {
        let config = AppConfig::get();

        Cookie::build(REFRESH_TOKEN_COOKIE, refresh_token.to_string())
            .http_only(true)
            .secure(config.is_production())
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(actix_web::cookie::time::Duration::days(max_age_days))
            .finish()
    }

    // 从请求 cookie 中提取 refresh token
    pub fn extract_refresh_token_from_cookie(req: &actix_web::HttpRequest) -> Option<String> {
        req.cookie(REFRESH_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }

    // 清除 refresh token cookie（登出时使用）
    pub fn clear_refresh_token_cookie() -> Cookie<'static> {
        let mut cookie = Cookie::build(REFRESH_TOKEN_COOKIE, "")
            .http_only(true)
            .same_site(SameSite::Strict)
            .path("/")
            .finish();
        cookie.make_removal();
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_types() {
        let pair = JwtUtils::generate_token_pair(42, "student", None).unwrap();

        let access = JwtUtils::verify_access_token(&pair.access_token).unwrap();
        assert_eq!(access.sub, "42");
        assert_eq!(access.role, "student");

        let refresh = JwtUtils::verify_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.token_type, "refresh");

        // 两种 token 不能互换使用
        assert!(JwtUtils::verify_refresh_token(&pair.access_token).is_err());
        assert!(JwtUtils::verify_access_token(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_refresh_access_token_round_trip() {
        let pair = JwtUtils::generate_token_pair(7, "admin", None).unwrap();

        let new_access = JwtUtils::refresh_access_token(&pair.refresh_token).unwrap();
        let claims = JwtUtils::verify_access_token(&new_access).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, "admin");

        // access token 不能用来换发
        assert!(JwtUtils::refresh_access_token(&pair.access_token).is_err());
        assert!(JwtUtils::refresh_access_token("garbage").is_err());
    }

    #[test]
    fn test_refresh_cookie_lifetime() {
        let cookie = JwtUtils::create_refresh_token_cookie("token-value", 7);
        assert_eq!(
            cookie.max_age(),
            Some(actix_web::cookie::time::Duration::days(7))
        );
        assert_eq!(cookie.http_only(), Some(true));

        // remember_me 拿到更长的存活期
        let long = JwtUtils::create_refresh_token_cookie("token-value", 30);
        assert_eq!(
            long.max_age(),
            Some(actix_web::cookie::time::Duration::days(30))
        );
    }
}
