//! 文件保险库
//!
//! 磁盘布局：`{root}/{student_id}/{assignment_number}_{sanitized_name}`。
//! 文件名经过白名单清洗后，最终拼出的路径还会做一次根目录包含性校验，
//! 不信任清洗结果本身。
//! 所有文件系统错误作为 Storage 错误上抛，调用方不重试。

use std::fs;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::errors::{PortalError, Result};

static STUDENT_DIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,64}$").expect("Invalid student dir regex"));

/// 清洗上传文件名：只保留最后一个路径分段，
/// 白名单外的字符替换为 `_`，再去掉开头的点。
pub fn sanitize_file_name(original: &str) -> Result<String> {
    // 上传方可能带完整路径（Windows 或 Unix 分隔符都见过）
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        return Err(PortalError::validation(format!(
            "文件名不合法: {original:?}"
        )));
    }
    Ok(cleaned)
}

#[derive(Debug, Clone)]
pub struct FileVault {
    root: PathBuf,
}

impl FileVault {
    /// 创建保险库实例并确保根目录存在
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root: PathBuf = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 组合相对存储路径 `{student_id}/{n}_{sanitized}`，并校验结果仍在库内
    pub fn resolve_path(
        &self,
        student_id: &str,
        assignment_number: i32,
        original_name: &str,
    ) -> Result<String> {
        if !STUDENT_DIR_RE.is_match(student_id) {
            return Err(PortalError::validation(format!(
                "学号不能作为目录名: {student_id:?}"
            )));
        }
        if assignment_number <= 0 {
            return Err(PortalError::validation(format!(
                "作业编号必须为正整数: {assignment_number}"
            )));
        }

        let sanitized = sanitize_file_name(original_name)?;
        let relative = format!("{student_id}/{assignment_number}_{sanitized}");
        // 清洗后的名字不可信，最终路径再校验一次
        self.absolute(&relative)?;
        Ok(relative)
    }

    /// 相对路径转绝对路径，拒绝任何离开根目录的成分
    fn absolute(&self, relative: &str) -> Result<PathBuf> {
        let rel = Path::new(relative);
        for component in rel.components() {
            match component {
                Component::Normal(_) => {}
                _ => {
                    return Err(PortalError::validation(format!(
                        "存储路径越出保险库根目录: {relative:?}"
                    )));
                }
            }
        }

        let joined = self.root.join(rel);
        if !joined.starts_with(&self.root) {
            return Err(PortalError::validation(format!(
                "存储路径越出保险库根目录: {relative:?}"
            )));
        }
        Ok(joined)
    }

    /// 写入文件，按学号目录幂等创建；目标已存在时原地覆盖
    pub fn save(&self, relative: &str, bytes: &[u8]) -> Result<()> {
        let path = self.absolute(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(())
    }

    /// 删除文件，不存在时静默成功
    pub fn delete(&self, relative: &str) -> Result<()> {
        let path = self.absolute(relative)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// 尽力删除：失败只记日志，供覆盖提交 / 删除提交使用
    pub fn delete_best_effort(&self, relative: &str) {
        if let Err(e) = self.delete(relative) {
            warn!("Failed to remove stored file {}: {}", relative, e);
        }
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.absolute(relative)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// 读出整个文件内容用于下载
    pub fn read(&self, relative: &str) -> Result<Vec<u8>> {
        let path = self.absolute(relative)?;
        if !path.is_file() {
            return Err(PortalError::not_found(format!("文件不存在: {relative}")));
        }
        Ok(fs::read(&path)?)
    }

    /// 遍历整个保险库，统计占用字节数（管理员面板）
    pub fn total_bytes(&self) -> Result<u64> {
        let mut total = 0u64;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            for file in fs::read_dir(entry.path())? {
                let file = file?;
                if file.file_type()?.is_file() {
                    total += file.metadata()?.len();
                }
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_vault(tag: &str) -> FileVault {
        let dir = std::env::temp_dir().join(format!(
            "hwportal-vault-{tag}-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        FileVault::new(dir).unwrap()
    }

    #[test]
    fn test_sanitize_plain_name() {
        assert_eq!(sanitize_file_name("report.pdf").unwrap(), "report.pdf");
        assert_eq!(sanitize_file_name("hw_3-final.zip").unwrap(), "hw_3-final.zip");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("/etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_file_name("..\\..\\boot.ini").unwrap(), "boot.ini");
        assert_eq!(sanitize_file_name("a/b/c.pdf").unwrap(), "c.pdf");
    }

    #[test]
    fn test_sanitize_replaces_and_trims_dots() {
        assert_eq!(sanitize_file_name("实验 报告.pdf").unwrap(), "___.pdf");
        assert_eq!(sanitize_file_name("...hidden.md").unwrap(), "hidden.md");
        assert!(sanitize_file_name("...").is_err());
        assert!(sanitize_file_name("").is_err());
    }

    #[test]
    fn test_resolve_path_layout() {
        let vault = temp_vault("resolve");
        let rel = vault.resolve_path("20230001", 3, "report.pdf").unwrap();
        assert_eq!(rel, "20230001/3_report.pdf");
    }

    #[test]
    fn test_resolve_path_rejects_bad_student_id() {
        let vault = temp_vault("badsid");
        assert!(vault.resolve_path("../evil", 1, "a.pdf").is_err());
        assert!(vault.resolve_path("", 1, "a.pdf").is_err());
    }

    #[test]
    fn test_resolve_path_rejects_nonpositive_assignment() {
        let vault = temp_vault("badnum");
        assert!(vault.resolve_path("20230001", 0, "a.pdf").is_err());
        assert!(vault.resolve_path("20230001", -3, "a.pdf").is_err());
    }

    #[test]
    fn test_absolute_rejects_traversal() {
        let vault = temp_vault("traversal");
        assert!(vault.read("../outside.txt").is_err());
        assert!(vault.delete("20230001/../../outside.txt").is_err());
    }

    #[test]
    fn test_save_read_overwrite_delete() {
        let vault = temp_vault("rw");
        let rel = vault.resolve_path("20230001", 1, "data.md").unwrap();

        vault.save(&rel, b"first").unwrap();
        assert_eq!(vault.read(&rel).unwrap(), b"first");

        // 原地覆盖
        vault.save(&rel, b"second").unwrap();
        assert_eq!(vault.read(&rel).unwrap(), b"second");

        vault.delete(&rel).unwrap();
        assert!(!vault.exists(&rel));
        // 再删一次不是错误
        vault.delete(&rel).unwrap();
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let vault = temp_vault("missing");
        let err = vault.read("20230001/1_gone.pdf").unwrap_err();
        assert_eq!(err.code(), "E007");
    }

    #[test]
    fn test_total_bytes() {
        let vault = temp_vault("bytes");
        vault.save("20230001/1_a.md", b"12345").unwrap();
        vault.save("20230002/1_b.md", b"123").unwrap();
        assert_eq!(vault.total_bytes().unwrap(), 8);
    }
}
