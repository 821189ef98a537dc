//! CA 管理边界：页面渲染与 daemon 操作的薄封装。

pub(crate) mod handlers;
pub(crate) mod page;
