//! # User Resolution Middleware
//!
//! Loads the user owning the session resolved by the session middleware.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use super::{Middleware, Outcome};
use crate::error::AppError;
use crate::models::{RequestContext, Stage};
use crate::services::store::UserStore;

pub struct UserMiddleware {
    store: Arc<dyn UserStore>,
}

impl UserMiddleware {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Middleware for UserMiddleware {
    fn name(&self) -> &'static str {
        "user"
    }

    async fn process(&self, ctx: &mut RequestContext) -> Outcome {
        let session_id = match ctx.session() {
            Stage::Resolved(session_id) => Some(session_id.clone()),
            Stage::Absent => None,
            Stage::Pending => {
                error!("User middleware ran before the session middleware");
                return Outcome::Fail(AppError::Internal);
            }
        };
        let Some(session_id) = session_id else {
            ctx.mark_user_absent();
            return Outcome::Continue;
        };

        match self.store.find_user_by_session(&session_id).await {
            Ok(Some(user)) => {
                debug!(user_id = user.id, "User resolved from session");
                ctx.set_user(user);
                Outcome::Continue
            }
            Ok(None) => {
                debug!("Session does not belong to a live user");
                ctx.mark_user_absent();
                Outcome::Continue
            }
            Err(e) => Outcome::Fail(AppError::Store(e)),
        }
    }
}
