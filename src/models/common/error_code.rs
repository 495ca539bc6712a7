use serde::{Deserialize, Serialize};

/// 业务错误码，随 ApiResponse 返回给客户端
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1002,
    NotFound = 1003,
    InternalServerError = 1004,

    // 认证与注册
    AuthFailed = 2000,
    RegisterFailed = 2001,
    StudentIdAlreadyExists = 2002,
    EmailAlreadyExists = 2003,
    StudentIdInvalid = 2004,
    EmailInvalid = 2005,
    UsernameInvalid = 2006,
    PasswordInvalid = 2007,

    // 作业提交
    SubmissionNotFound = 3000,
    FileTypeNotAllowed = 3001,
    FileSizeExceeded = 3002,
    FileNotFound = 3003,
    SubmitFailed = 3004,
    MultifileUploadNotAllowed = 3005,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::AuthFailed as i32, 2000);
        assert_eq!(ErrorCode::FileTypeNotAllowed as i32, 3001);
    }
}
