//! Homework Portal - 学生作业提交平台后端服务
//!
//! 基于 Actix Web 构建的作业收集系统：学生注册登录后按作业编号
//! 上传文件，同一次作业重复提交原地覆盖，管理员统一查看和管理。
//!
//! # 架构
//! - `catalog`: 作业目录（启动时加载，运行期只读）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证授权中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数
//! - `vault`: 文件保险库（按学号分目录的提交存储）

pub mod catalog;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
pub mod vault;
