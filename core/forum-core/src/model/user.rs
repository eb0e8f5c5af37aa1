use super::non_empty;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub nickname: String,
    pub fullname: String,
    pub about: String,
    pub email: String,
}

/// Profile fields supplied when a user is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub fullname: String,
    pub about: String,
    pub email: String,
}

impl UserProfile {
    pub fn into_user(self, nickname: impl Into<String>) -> User {
        User {
            nickname: nickname.into(),
            fullname: self.fullname,
            about: self.about,
            email: self.email,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub fullname: Option<String>,
    pub about: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    /// Returns the updated copy of `user`.
    pub fn apply(&self, user: &User) -> User {
        let mut updated = user.clone();
        if let Some(fullname) = non_empty(&self.fullname) {
            updated.fullname = fullname.to_string();
        }
        if let Some(about) = non_empty(&self.about) {
            updated.about = about.to_string();
        }
        if let Some(email) = non_empty(&self.email) {
            updated.email = email.to_string();
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_keep_current_values() {
        let user = UserProfile {
            fullname: "Alice A".into(),
            about: "hi".into(),
            email: "a@x.org".into(),
        }
        .into_user("alice");

        let update = UserUpdate {
            fullname: Some(String::new()),
            about: None,
            email: Some("alice@x.org".into()),
        };
        let updated = update.apply(&user);
        assert_eq!(updated.fullname, "Alice A");
        assert_eq!(updated.about, "hi");
        assert_eq!(updated.email, "alice@x.org");
        assert_eq!(updated.nickname, "alice");
    }
}
