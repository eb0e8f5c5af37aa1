use crate::engine::ForumEngine;
use crate::engine::idempotent::Attempt;
use crate::error::{ForumError, ForumResult, StoreError};
use crate::model::{CreateOutcome, User, UserProfile, UserUpdate};
use crate::repository::{ReadRepository, WriteRepository};
use tracing::instrument;

pub(crate) fn user_not_found(nickname: &str) -> ForumError {
    ForumError::NotFound(format!("Can't find user by nickname: {nickname}"))
}

impl ForumEngine {
    /// Create a user, or return every existing user colliding on nickname
    /// or email.
    #[instrument(skip(self, profile))]
    pub fn create_user(
        &self,
        nickname: &str,
        profile: UserProfile,
    ) -> ForumResult<CreateOutcome<User, Vec<User>>> {
        let user = profile.into_user(nickname);
        let email = user.email.clone();
        self.create_idempotent(
            "create_user",
            |tx| {
                let result = tx.insert_user(&user);
                Attempt::classify(result, user)
            },
            |snapshot| {
                let existing = snapshot.users_by_nickname_or_email(nickname, &email)?;
                Ok((!existing.is_empty()).then_some(existing))
            },
        )
    }

    pub fn user(&self, nickname: &str) -> ForumResult<User> {
        self.read(|snapshot| {
            snapshot
                .user_by_nickname(nickname)?
                .ok_or_else(|| user_not_found(nickname))
        })
    }

    /// Apply a partial profile update. Taking another user's email is a
    /// conflict.
    #[instrument(skip(self, update))]
    pub fn update_user(&self, nickname: &str, update: UserUpdate) -> ForumResult<User> {
        self.write("update_user", |tx| {
            let current = tx
                .user_by_nickname(nickname)?
                .ok_or_else(|| user_not_found(nickname))?;
            let updated = update.apply(&current);
            if updated == current {
                return Ok(current);
            }
            match tx.update_user(&current, &updated) {
                Ok(()) => Ok(updated),
                Err(StoreError::UniqueViolation { .. }) => Err(ForumError::Conflict(format!(
                    "This email is already registered by user: {}",
                    current.nickname
                ))),
                Err(err) => Err(err.into()),
            }
        })
    }
}
