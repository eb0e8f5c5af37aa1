//! Row codec: every stored value is a `bincode` encoding of a model type.

use crate::error::StoreResult;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(bincode::deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Thread;
    use chrono::{TimeZone, Utc};

    #[test]
    fn thread_with_and_without_slug() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut thread = Thread {
            id: 3,
            title: "t".into(),
            author: "alice".into(),
            forum: "rust".into(),
            message: "m".into(),
            votes: -2,
            slug: None,
            created,
        };
        let decoded: Thread = decode(&encode(&thread).unwrap()).unwrap();
        assert_eq!(decoded, thread);

        thread.slug = Some("hello".into());
        let decoded: Thread = decode(&encode(&thread).unwrap()).unwrap();
        assert_eq!(decoded.slug.as_deref(), Some("hello"));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode::<Thread>(&[1, 2, 3]).is_err());
    }
}
