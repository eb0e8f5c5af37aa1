#![allow(dead_code)]

use forum_core::{
    CreateOutcome, Forum, ForumConfig, ForumEngine, ForumResult, NewForum, NewThread, TallyMode,
    Thread, User, UserProfile,
};

pub fn engine(tally: TallyMode) -> ForumEngine {
    forum_core::logging::init_test();
    ForumEngine::open(ForumConfig::new().with_tally(tally)).expect("open in-memory engine")
}

pub fn profile(email: &str) -> UserProfile {
    UserProfile {
        fullname: format!("Owner of {email}"),
        about: "about me".to_string(),
        email: email.to_string(),
    }
}

pub fn user(engine: &ForumEngine, nickname: &str) -> ForumResult<User> {
    let outcome = engine.create_user(nickname, profile(&format!("{nickname}@example.org")))?;
    match outcome {
        CreateOutcome::Created(user) => Ok(user),
        CreateOutcome::AlreadyExists(mut users) => Ok(users.remove(0)),
    }
}

pub fn forum(engine: &ForumEngine, slug: &str, owner: &str) -> ForumResult<Forum> {
    let outcome = engine.create_forum(NewForum {
        slug: slug.to_string(),
        title: format!("Forum {slug}"),
        user: owner.to_string(),
    })?;
    Ok(match outcome {
        CreateOutcome::Created(forum) | CreateOutcome::AlreadyExists(forum) => forum,
    })
}

pub fn thread(
    engine: &ForumEngine,
    forum: &str,
    author: &str,
    slug: Option<&str>,
) -> ForumResult<Thread> {
    let outcome = engine.create_thread(
        forum,
        NewThread {
            title: "A thread".to_string(),
            author: author.to_string(),
            message: "Opening message".to_string(),
            slug: slug.map(str::to_string),
            created: None,
        },
    )?;
    Ok(match outcome {
        CreateOutcome::Created(thread) | CreateOutcome::AlreadyExists(thread) => thread,
    })
}

/// Fresh engine with user `alice`, forum `rust` and one thread.
pub fn setup(tally: TallyMode) -> ForumResult<(ForumEngine, Thread)> {
    let engine = engine(tally);
    user(&engine, "alice")?;
    forum(&engine, "rust", "alice")?;
    let thread = thread(&engine, "rust", "alice", Some("hello-world"))?;
    Ok((engine, thread))
}
