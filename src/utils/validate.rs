use once_cell::sync::Lazy;
use regex::Regex;

static STUDENT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{8,20}$").expect("Invalid student id regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 姓名长度校验：2 <= x <= 100
    let len = username.chars().count();
    if len < 2 || len > 100 {
        return Err("Username length must be between 2 and 100 characters");
    }
    Ok(())
}

pub fn validate_student_id(student_id: &str) -> Result<(), &'static str> {
    // 学号格式校验：8-20 位字母或数字
    if !STUDENT_ID_RE.is_match(student_id) {
        return Err("Student ID must be 8 to 20 letters or digits");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    // 密码长度校验：4 <= x <= 100
    if password.len() < 4 || password.len() > 100 {
        return Err("Password length must be between 4 and 100 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_student_id() {
        assert!(validate_student_id("20230001").is_ok());
        assert!(validate_student_id("2023000123456789ab").is_ok());
    }

    #[test]
    fn test_student_id_boundaries() {
        assert!(validate_student_id("1234567").is_err()); // 7 位
        assert!(validate_student_id("123456789012345678901").is_err()); // 21 位
        assert!(validate_student_id("2023 0001").is_err());
        assert!(validate_student_id("2023-0001").is_err());
        assert!(validate_student_id("").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("a@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.cn").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_username_length() {
        assert!(validate_username("张三").is_ok());
        assert!(validate_username("A").is_err());
        assert!(validate_username(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("abcd").is_ok());
        assert!(validate_password("abc").is_err());
        assert!(validate_password(&"p".repeat(101)).is_err());
    }
}
