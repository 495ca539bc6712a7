//! 作业目录
//!
//! 进程启动时从 JSON 清单加载一次，运行期间只读。
//! 未配置的作业编号使用 `第{n}次作业` 兜底名称。

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::errors::{PortalError, Result};

static CATALOG: OnceLock<AssignmentCatalog> = OnceLock::new();

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentEntry {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AssignmentCatalog {
    entries: Vec<AssignmentEntry>,
    names: HashMap<i32, String>,
}

impl AssignmentCatalog {
    /// 从 JSON 清单加载（`[{ "id": 1, "name": "..." }, ...]`）
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PortalError::catalog_load(format!(
                "读取作业清单 {} 失败: {e}",
                path.as_ref().display()
            ))
        })?;
        let entries: Vec<AssignmentEntry> = serde_json::from_str(&raw)
            .map_err(|e| PortalError::catalog_load(format!("作业清单解析失败: {e}")))?;

        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<AssignmentEntry>) -> Self {
        let names = entries
            .iter()
            .map(|e| (e.id, e.name.clone()))
            .collect::<HashMap<_, _>>();
        Self { entries, names }
    }

    /// 按清单顺序列出 (id, name)
    pub fn list(&self) -> impl Iterator<Item = (i32, &str)> {
        self.entries.iter().map(|e| (e.id, e.name.as_str()))
    }

    /// 作业编号对应的显示名称，未配置时兜底
    pub fn name_of(&self, id: i32) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("第{id}次作业"))
    }

    /// 初始化全局目录（启动时调用一次）
    pub fn init(path: impl AsRef<Path>) -> Result<()> {
        let catalog = Self::load(path)?;
        CATALOG
            .set(catalog)
            .map_err(|_| PortalError::catalog_load("作业目录重复初始化"))?;
        Ok(())
    }

    /// 获取全局目录
    pub fn get() -> &'static AssignmentCatalog {
        CATALOG.get().expect("Assignment catalog not initialized")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AssignmentCatalog {
        AssignmentCatalog::from_entries(vec![
            AssignmentEntry {
                id: 1,
                name: "线性表".to_string(),
            },
            AssignmentEntry {
                id: 3,
                name: "二叉树".to_string(),
            },
        ])
    }

    #[test]
    fn test_name_of_configured() {
        let catalog = sample();
        assert_eq!(catalog.name_of(1), "线性表");
        assert_eq!(catalog.name_of(3), "二叉树");
    }

    #[test]
    fn test_name_of_fallback() {
        let catalog = sample();
        assert_eq!(catalog.name_of(2), "第2次作业");
        assert_eq!(catalog.name_of(42), "第42次作业");
    }

    #[test]
    fn test_list_preserves_order() {
        let catalog = sample();
        let ids: Vec<i32> = catalog.list().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AssignmentCatalog::load("/nonexistent/assignments.json").unwrap_err();
        assert_eq!(err.code(), "E013");
    }
}
