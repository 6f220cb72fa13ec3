//! Flow control builtins

use async_trait::async_trait;

use super::{Builtin, Context, ExecResult};
use crate::error::Result;

/// The `:` builtin - expands its arguments and always exits 0.
pub struct Colon;

#[async_trait]
impl Builtin for Colon {
    async fn execute(&self, _ctx: Context<'_>) -> Result<ExecResult> {
        Ok(ExecResult::ok(String::new()))
    }
}
