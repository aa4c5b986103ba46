//! Class mapper.

use super::{statements, CLASS_NAMESPACE};
use crate::datasource::Mutation;
use crate::error::Result;
use crate::session::Session;

/// Class statements bound to one session.
pub struct ClassMapper<'s> {
    session: &'s mut Session,
}

impl<'s> ClassMapper<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Self { session }
    }

    pub async fn update_class_name(&mut self, name: &str, id: i64) -> Result<u64> {
        let mutation = Mutation::new(
            CLASS_NAMESPACE,
            statements::UPDATE_CLASS_NAME,
            "UPDATE class SET name = ? WHERE id = ?",
        )
        .param(name)
        .param(id);
        self.session.mutate(&mutation).await
    }
}
