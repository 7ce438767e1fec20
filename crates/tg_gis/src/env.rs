// crates/tg_gis/src/env.rs

//! 地理处理环境
//!
//! 当前工作区、覆盖开关、许可扩展的进程级状态，
//! 配合 RAII 守卫做临时修改：守卫离开作用域（包括 panic 展开）时恢复原值。

use parking_lot::RwLock;
use std::collections::HashSet;
use tg_foundation::{TgError, TgResult};
use tracing::debug;

/// 环境内部状态
#[derive(Debug)]
struct EnvState {
    /// 当前工作区名称
    workspace: String,
    /// 是否允许覆盖已有输出
    overwrite: bool,
    /// 可用的许可扩展
    available: HashSet<String>,
    /// 已签出的许可扩展
    checked_out: HashSet<String>,
}

/// 地理处理环境
#[derive(Debug)]
pub struct GisEnv {
    state: RwLock<EnvState>,
}

impl Default for GisEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl GisEnv {
    /// 创建默认环境（无工作区、不允许覆盖、无可用扩展）
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(EnvState {
                workspace: String::new(),
                overwrite: false,
                available: HashSet::new(),
                checked_out: HashSet::new(),
            }),
        }
    }

    /// 创建带可用扩展的环境
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let env = Self::new();
        {
            let mut state = env.state.write();
            state.available = extensions.into_iter().map(Into::into).collect();
        }
        env
    }

    /// 当前工作区
    #[must_use]
    pub fn workspace(&self) -> String {
        self.state.read().workspace.clone()
    }

    /// 设置当前工作区，返回旧值
    pub fn set_workspace(&self, workspace: impl Into<String>) -> String {
        let mut state = self.state.write();
        std::mem::replace(&mut state.workspace, workspace.into())
    }

    /// 是否允许覆盖输出
    #[must_use]
    pub fn overwrite(&self) -> bool {
        self.state.read().overwrite
    }

    /// 设置覆盖开关，返回旧值
    pub fn set_overwrite(&self, overwrite: bool) -> bool {
        let mut state = self.state.write();
        std::mem::replace(&mut state.overwrite, overwrite)
    }

    /// 扩展是否已签出
    #[must_use]
    pub fn is_checked_out(&self, extension: &str) -> bool {
        self.state.read().checked_out.contains(extension)
    }

    /// 签出许可扩展
    ///
    /// 扩展不可用时返回 [`TgError::ExtensionUnavailable`]。重复签出是幂等的。
    pub fn checkout_extension(&self, extension: &str) -> TgResult<()> {
        let mut state = self.state.write();
        if !state.available.contains(extension) {
            return Err(TgError::extension_unavailable(extension));
        }
        state.checked_out.insert(extension.to_string());
        debug!(extension, "许可扩展已签出");
        Ok(())
    }

    /// 签入许可扩展
    pub fn checkin_extension(&self, extension: &str) {
        let mut state = self.state.write();
        if state.checked_out.remove(extension) {
            debug!(extension, "许可扩展已签入");
        }
    }
}

// ============================================================================
// RAII 守卫
// ============================================================================

/// 工作区守卫：作用域内切换工作区，离开时恢复
#[derive(Debug)]
pub struct WorkspaceGuard<'a> {
    env: &'a GisEnv,
    previous: String,
}

impl<'a> WorkspaceGuard<'a> {
    /// 切换到给定工作区
    pub fn new(env: &'a GisEnv, workspace: impl Into<String>) -> Self {
        let previous = env.set_workspace(workspace);
        Self { env, previous }
    }
}

impl Drop for WorkspaceGuard<'_> {
    fn drop(&mut self) {
        self.env.set_workspace(std::mem::take(&mut self.previous));
    }
}

/// 覆盖开关守卫：作用域内修改覆盖开关，离开时恢复
#[derive(Debug)]
pub struct OverwriteGuard<'a> {
    env: &'a GisEnv,
    previous: bool,
}

impl<'a> OverwriteGuard<'a> {
    /// 临时设置覆盖开关
    pub fn new(env: &'a GisEnv, overwrite: bool) -> Self {
        let previous = env.set_overwrite(overwrite);
        Self { env, previous }
    }
}

impl Drop for OverwriteGuard<'_> {
    fn drop(&mut self) {
        self.env.set_overwrite(self.previous);
    }
}

/// 许可扩展守卫：构造时签出，离开作用域时签入
#[derive(Debug)]
pub struct ExtensionGuard<'a> {
    env: &'a GisEnv,
    extension: String,
}

impl<'a> ExtensionGuard<'a> {
    /// 签出给定扩展，不可用时报错
    pub fn new(env: &'a GisEnv, extension: impl Into<String>) -> TgResult<Self> {
        let extension = extension.into();
        env.checkout_extension(&extension)?;
        Ok(Self { env, extension })
    }
}

impl Drop for ExtensionGuard<'_> {
    fn drop(&mut self) {
        self.env.checkin_extension(&self.extension);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_workspace_guard_restores() {
        let env = GisEnv::new();
        env.set_workspace("base");
        {
            let _g = WorkspaceGuard::new(&env, "scratch");
            assert_eq!(env.workspace(), "scratch");
        }
        assert_eq!(env.workspace(), "base");
    }

    #[test]
    fn test_nested_guards() {
        let env = GisEnv::new();
        env.set_workspace("a");
        {
            let _outer = WorkspaceGuard::new(&env, "b");
            {
                let _inner = WorkspaceGuard::new(&env, "c");
                assert_eq!(env.workspace(), "c");
            }
            assert_eq!(env.workspace(), "b");
        }
        assert_eq!(env.workspace(), "a");
    }

    #[test]
    fn test_overwrite_guard_restores() {
        let env = GisEnv::new();
        assert!(!env.overwrite());
        {
            let _g = OverwriteGuard::new(&env, true);
            assert!(env.overwrite());
        }
        assert!(!env.overwrite());
    }

    #[test]
    fn test_extension_guard_checks_in_on_drop() {
        let env = GisEnv::with_extensions(["spatial"]);
        {
            let _g = ExtensionGuard::new(&env, "spatial").unwrap();
            assert!(env.is_checked_out("spatial"));
        }
        assert!(!env.is_checked_out("spatial"));
    }

    #[test]
    fn test_extension_unavailable() {
        let env = GisEnv::new();
        let err = ExtensionGuard::new(&env, "spatial").unwrap_err();
        assert!(matches!(err, TgError::ExtensionUnavailable { .. }));
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let env = GisEnv::new();
        env.set_workspace("base");
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _g = WorkspaceGuard::new(&env, "scratch");
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(env.workspace(), "base");
    }
}
