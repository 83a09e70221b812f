//! Runtime tests for the session actor.
//!
//! Time is paused, so every simulator delay elapses instantly and exactly.

use api_lib::{adapters::StdRandom, runtime::spawn_session};
use chat_core::{
    ConversationId, Intent, IntentOutcome, Role, SessionController, UploadStatus,
};
use std::time::Duration;

fn controller() -> SessionController {
    SessionController::new(Box::new(StdRandom::seeded(11)))
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn first_send_creates_conversation_and_gets_one_reply() {
    let (session, _task) = spawn_session(controller());

    let outcome = session
        .apply(Intent::SendMessage {
            text: "Hello".into(),
        })
        .await
        .unwrap();

    let snapshot = session.snapshot();
    assert_eq!(outcome, IntentOutcome::Sent(snapshot.conversations[0].id));
    assert_eq!(snapshot.conversations.len(), 1);
    assert_eq!(snapshot.conversations[0].title, "Hello");
    assert_eq!(snapshot.active_title.as_deref(), Some("Hello"));
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].role, Role::User);
    assert!(snapshot.awaiting_response);

    advance(3500).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[1].role, Role::Assistant);
    assert!(!snapshot.awaiting_response);
}

#[tokio::test(start_paused = true)]
async fn reply_never_arrives_before_minimum_delay() {
    let (session, _task) = spawn_session(controller());
    session
        .apply(Intent::SendMessage { text: "ping".into() })
        .await
        .unwrap();

    advance(1499).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.messages.len(), 1);
    assert!(snapshot.awaiting_response);
}

#[tokio::test(start_paused = true)]
async fn gated_and_blank_sends_are_ignored() {
    let (session, _task) = spawn_session(controller());

    for text in ["", "   "] {
        let outcome = session
            .apply(Intent::SendMessage { text: text.into() })
            .await
            .unwrap();
        assert_eq!(outcome, IntentOutcome::Ignored);
    }
    assert!(session.snapshot().conversations.is_empty());

    session
        .apply(Intent::SendMessage { text: "one".into() })
        .await
        .unwrap();
    let outcome = session
        .apply(Intent::SendMessage { text: "two".into() })
        .await
        .unwrap();
    assert_eq!(outcome, IntentOutcome::Ignored);
    assert_eq!(session.snapshot().messages.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn reply_lands_in_original_conversation_after_switch() {
    let (session, _task) = spawn_session(controller());

    let a = match session
        .apply(Intent::CreateConversation {
            title: Some("A".into()),
        })
        .await
        .unwrap()
    {
        IntentOutcome::Created(id) => id,
        other => panic!("expected a new conversation, got {other:?}"),
    };
    let sent = session
        .apply(Intent::SendMessage {
            text: "question".into(),
        })
        .await
        .unwrap();
    assert_eq!(sent, IntentOutcome::Sent(a));
    let b = match session
        .apply(Intent::CreateConversation {
            title: Some("B".into()),
        })
        .await
        .unwrap()
    {
        IntentOutcome::Created(id) => id,
        other => panic!("expected a new conversation, got {other:?}"),
    };

    advance(3500).await;

    let in_a = session.history(a).await.unwrap().unwrap();
    let in_b = session.history(b).await.unwrap().unwrap();
    assert_eq!(in_a.len(), 2);
    assert_eq!(in_a[1].role, Role::Assistant);
    assert!(in_b.is_empty());
    assert_eq!(session.snapshot().active_conversation_id, Some(b));
}

#[tokio::test(start_paused = true)]
async fn deleting_active_conversation_clears_selection() {
    let (session, _task) = spawn_session(controller());
    session
        .apply(Intent::SendMessage { text: "bye".into() })
        .await
        .unwrap();
    let id = session.snapshot().active_conversation_id.unwrap();

    session
        .apply(Intent::DeleteConversation { id })
        .await
        .unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.active_conversation_id, None);
    assert!(snapshot.messages.is_empty());
    assert_eq!(session.history(id).await.unwrap(), None);

    // The pending reply is dropped but still releases the composer.
    advance(3500).await;
    assert!(!session.snapshot().awaiting_response);
    assert_eq!(session.history(id).await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn uploads_walk_through_each_stage_on_schedule() {
    let (session, _task) = spawn_session(controller());
    session
        .apply(Intent::UploadFiles {
            names: vec!["a.pdf".into(), "b.pdf".into()],
        })
        .await
        .unwrap();

    let statuses = |s: &chat_core::SessionSnapshot| -> Vec<UploadStatus> {
        s.uploads.iter().map(|f| f.status).collect()
    };

    assert_eq!(statuses(&session.snapshot()), [UploadStatus::Uploading; 2]);

    advance(1100).await;
    assert_eq!(statuses(&session.snapshot()), [UploadStatus::Processing; 2]);

    advance(2000).await;
    let snapshot = session.snapshot();
    assert_eq!(statuses(&snapshot), [UploadStatus::Ready; 2]);
    for file in &snapshot.uploads {
        let pages = file.page_count.unwrap();
        assert!((5..=54).contains(&pages));
    }
}

#[tokio::test(start_paused = true)]
async fn upload_stages_do_not_advance_early() {
    let (session, _task) = spawn_session(controller());
    session
        .apply(Intent::UploadFiles {
            names: vec!["slow.pdf".into()],
        })
        .await
        .unwrap();
    let status = |s: &chat_core::SessionSnapshot| s.uploads[0].status;

    advance(999).await;
    assert_eq!(status(&session.snapshot()), UploadStatus::Uploading);

    advance(2).await;
    assert_eq!(status(&session.snapshot()), UploadStatus::Processing);

    // +2999 ms
    advance(1998).await;
    let snapshot = session.snapshot();
    assert_eq!(status(&snapshot), UploadStatus::Processing);
    assert_eq!(snapshot.uploads[0].page_count, None);

    advance(2).await;
    let snapshot = session.snapshot();
    assert_eq!(status(&snapshot), UploadStatus::Ready);
    assert!(snapshot.uploads[0].page_count.is_some());
}

#[tokio::test(start_paused = true)]
async fn removed_upload_stays_gone() {
    let (session, _task) = spawn_session(controller());
    session
        .apply(Intent::UploadFiles {
            names: vec!["a.pdf".into(), "b.pdf".into()],
        })
        .await
        .unwrap();
    session
        .apply(Intent::RemoveUpload {
            name: "a.pdf".into(),
        })
        .await
        .unwrap();

    advance(3500).await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.uploads.len(), 1);
    assert_eq!(snapshot.uploads[0].name, "b.pdf");
    assert_eq!(snapshot.uploads[0].status, UploadStatus::Ready);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_each_change() {
    let (session, _task) = spawn_session(controller());
    let mut rx = session.subscribe();

    session
        .apply(Intent::SendMessage { text: "hi".into() })
        .await
        .unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().awaiting_response);

    rx.changed().await.unwrap();
    assert!(!rx.borrow_and_update().awaiting_response);
}

#[tokio::test(start_paused = true)]
async fn unknown_selection_is_ignored() {
    let (session, _task) = spawn_session(controller());
    let outcome = session
        .apply(Intent::SelectConversation {
            id: ConversationId::new(),
        })
        .await
        .unwrap();
    assert_eq!(outcome, IntentOutcome::Ignored);
    assert_eq!(session.snapshot().active_conversation_id, None);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_actor() {
    let (session, task) = spawn_session(controller());
    session.shutdown();
    task.await.unwrap();
    assert!(session
        .apply(Intent::CreateConversation { title: None })
        .await
        .is_err());
}
