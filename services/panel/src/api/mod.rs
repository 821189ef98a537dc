//! API 类型与响应包裹。

pub(crate) mod error;
pub(crate) mod response;
pub(crate) mod types;
