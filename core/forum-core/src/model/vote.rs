use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub thread: u64,
    pub nickname: String,
    pub voice: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVote {
    pub nickname: String,
    pub voice: i32,
}

impl NewVote {
    pub fn new(nickname: impl Into<String>, voice: i32) -> Self {
        Self {
            nickname: nickname.into(),
            voice,
        }
    }

    pub fn is_valid_voice(&self) -> bool {
        self.voice == 1 || self.voice == -1
    }
}
