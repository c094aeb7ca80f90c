mod common;

use crate::common::voice::FakeAgentApi;
use crate::common::{connect, create_test_assignment, create_test_course, create_test_user};
use campus_core::assistant::webhook::{handle_llm_webhook, handle_register_webhook};
use campus_core::assistant::{self, AssistantError, WebhookUrls};
use campus_core::enrollment;
use campus_db::assistant::{assistant as assistants, conversation, message};
use campus_entity::assistant::assistant::{DEFAULT_GREETING, Voice};
use campus_entity::assistant::message::MessageType;
use campus_entity::user::Role;
use campus_model::assistant::{
    LlmWebhookRequest, NewAssistant, RegisterWebhookRequest, UpdateAssistant, Voice as VoiceInput, WebhookMessage,
};
use test_log::test;
use url::Url;
use uuid::Uuid;

fn urls() -> WebhookUrls {
    WebhookUrls::new(&Url::parse("https://lms.example.org").unwrap()).unwrap()
}

fn new_assistant(course_id: Uuid) -> NewAssistant {
    NewAssistant {
        course_id,
        name: None,
        voice: VoiceInput::Echo,
        greeting_message: None,
        is_active: true,
    }
}

#[test(tokio::test)]
async fn test_create_assistant_with_defaults() {
    let db = &connect().await;
    let api = FakeAgentApi::default();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let (course, _) = create_test_course(db, &teacher, "rust-101").await;

    let created = assistant::create_assistant(db, &api, &urls(), &course, new_assistant(course.id))
        .await
        .unwrap();
    assert_eq!(created.name, "Course rust-101 Assistant");
    assert_eq!(created.greeting_message, DEFAULT_GREETING);
    assert_eq!(created.voice, Voice::Echo);
    assert_eq!(created.agent_id, "agent_1");

    let remote = api.created.lock().unwrap();
    assert_eq!(remote.len(), 1);
    assert_eq!(remote[0].voice, "echo");
    assert_eq!(
        remote[0].llm_webhook_url,
        "https://lms.example.org/api/v0/assistants/webhooks/llm"
    );
    assert_eq!(Some(&remote[0].llm_webhook_auth.token), created.webhook_token.as_ref());
    drop(remote);

    let result = assistant::create_assistant(db, &api, &urls(), &course, new_assistant(course.id)).await;
    assert!(matches!(result, Err(AssistantError::AlreadyExists)));
}

#[test(tokio::test)]
async fn test_vendor_failure_leaves_no_assistant() {
    let db = &connect().await;
    let api = FakeAgentApi::failing();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let (course, _) = create_test_course(db, &teacher, "rust-101").await;

    let result = assistant::create_assistant(db, &api, &urls(), &course, new_assistant(course.id)).await;
    assert!(matches!(result, Err(AssistantError::Vendor(_))));
    assert!(assistants::Query::find_by_course(db, course.id).await.unwrap().is_none());
}

#[test(tokio::test)]
async fn test_update_and_delete_are_remote_first() {
    let db = &connect().await;
    let api = FakeAgentApi::default();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let (course, _) = create_test_course(db, &teacher, "rust-101").await;
    let created = assistant::create_assistant(db, &api, &urls(), &course, new_assistant(course.id))
        .await
        .unwrap();

    let greeting_only = UpdateAssistant {
        greeting_message: Some("Hi there".to_owned()),
        ..Default::default()
    };
    let updated = assistant::update_assistant(db, &api, &created, greeting_only).await.unwrap();
    assert_eq!(updated.greeting_message, "Hi there");
    assert!(api.updated.lock().unwrap().is_empty());

    let rename = UpdateAssistant {
        name: Some("Ferris".to_owned()),
        voice: Some(VoiceInput::Echo),
        ..Default::default()
    };
    let updated = assistant::update_assistant(db, &api, &updated, rename).await.unwrap();
    assert_eq!(updated.name, "Ferris");
    {
        let remote = api.updated.lock().unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].1.name.as_deref(), Some("Ferris"));
        assert!(remote[0].1.voice.is_none());
    }

    let failing = FakeAgentApi::failing();
    let result = assistant::delete_assistant(db, &failing, &updated).await;
    assert!(matches!(result, Err(AssistantError::Vendor(_))));
    assert!(assistants::Query::find_by_id(db, updated.id).await.unwrap().is_some());

    assistant::delete_assistant(db, &api, &updated).await.unwrap();
    assert_eq!(*api.deleted.lock().unwrap(), vec![updated.agent_id.clone()]);
    assert!(assistants::Query::find_by_id(db, updated.id).await.unwrap().is_none());
}

#[test(tokio::test)]
async fn test_webhooks_record_the_conversation() {
    let db = &connect().await;
    let api = FakeAgentApi::default();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let (course, module) = create_test_course(db, &teacher, "rust-101").await;
    create_test_assignment(db, &module, "Borrowing", 3).await;
    enrollment::enroll_self(db, &course, &student).await.unwrap();
    let created = assistant::create_assistant(db, &api, &urls(), &course, new_assistant(course.id))
        .await
        .unwrap();
    let token = created.webhook_token.clone();

    let register = RegisterWebhookRequest {
        call_id: Some("call_1".to_owned()),
        agent_id: created.agent_id.clone(),
        session_id: "session_1".to_owned(),
        user_id: student.id,
    };
    let result = handle_register_webhook(db, register.clone(), Some("wrong")).await;
    assert!(matches!(result, Err(AssistantError::InvalidToken)));
    let response = handle_register_webhook(db, register, token.as_deref()).await.unwrap();
    assert!(response.success);

    let unknown_user = RegisterWebhookRequest {
        call_id: None,
        agent_id: created.agent_id.clone(),
        session_id: "session_2".to_owned(),
        user_id: Uuid::new_v4(),
    };
    let result = handle_register_webhook(db, unknown_user, token.as_deref()).await;
    assert!(matches!(result, Err(AssistantError::UnknownUser)));

    let request = LlmWebhookRequest {
        call_id: Some("call_1".to_owned()),
        agent_id: created.agent_id.clone(),
        session_id: "session_1".to_owned(),
        message: WebhookMessage {
            role: "user".to_owned(),
            content: "When is the next deadline?".to_owned(),
        },
    };
    let response = handle_llm_webhook(db, request, token.as_deref()).await.unwrap();
    assert_eq!(response.messages.len(), 2);
    assert_eq!(response.messages[0].role, "system");
    assert!(response.messages[0].content.contains("Course rust-101"));
    assert!(response.messages[0].content.contains("Borrowing"));
    assert_eq!(response.messages[1].role, "assistant");
    assert!(response.messages[1].content.to_lowercase().contains("deadline"));

    let stored = conversation::Query::find_by_session(db, "session_1").await.unwrap().unwrap();
    assert_eq!(stored.user_id, Some(student.id));
    let types: Vec<MessageType> = message::Query::list_for_conversation(db, stored.id)
        .await
        .unwrap()
        .into_iter()
        .map(|message| message.message_type)
        .collect();
    assert_eq!(types, [MessageType::System, MessageType::User, MessageType::Assistant]);

    let unknown_agent = LlmWebhookRequest {
        call_id: None,
        agent_id: "agent_unknown".to_owned(),
        session_id: "session_3".to_owned(),
        message: WebhookMessage::default(),
    };
    let result = handle_llm_webhook(db, unknown_agent, None).await;
    assert!(matches!(result, Err(AssistantError::UnknownAgent)));

    let call = assistant::end_call(db, &api, "call_1").await.unwrap();
    assert!(call.0.is_null());
    let stored = conversation::Query::find_by_id(db, stored.id).await.unwrap().unwrap();
    assert!(stored.ended_at.is_some());
}

#[test(tokio::test)]
async fn test_who_may_call() {
    let db = &connect().await;
    let api = FakeAgentApi::default();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let stranger = create_test_user(db, "stranger", Role::Student).await;
    let (course, _) = create_test_course(db, &teacher, "rust-101").await;
    enrollment::enroll_self(db, &course, &student).await.unwrap();
    let mut input = new_assistant(course.id);
    input.is_active = false;
    let inactive = assistant::create_assistant(db, &api, &urls(), &course, input).await.unwrap();
    assert!(!inactive.is_active);

    assert!(assistant::can_use(db, &inactive, &course, &teacher).await.unwrap());
    assert!(!assistant::can_use(db, &inactive, &course, &student).await.unwrap());

    let activate = UpdateAssistant {
        is_active: Some(true),
        ..Default::default()
    };
    let active = assistant::update_assistant(db, &api, &inactive, activate).await.unwrap();
    assert!(assistant::can_use(db, &active, &course, &student).await.unwrap());
    assert!(!assistant::can_use(db, &active, &course, &stranger).await.unwrap());

    let call = assistant::start_call(&active, &student, Some("pk_test".to_owned()));
    assert_eq!(call.agent_id, active.agent_id);
    assert_eq!(call.user_id, student.id);
    assert_eq!(call.public_key.as_deref(), Some("pk_test"));
}

#[test(tokio::test)]
async fn test_session_of_another_assistant_is_refused() {
    let db = &connect().await;
    let api = FakeAgentApi::default();
    let teacher = create_test_user(db, "teacher", Role::Teacher).await;
    let student = create_test_user(db, "student", Role::Student).await;
    let (first_course, _) = create_test_course(db, &teacher, "rust-101").await;
    let (second_course, _) = create_test_course(db, &teacher, "go-101").await;
    let first = assistant::create_assistant(db, &api, &urls(), &first_course, new_assistant(first_course.id))
        .await
        .unwrap();
    let second = assistant::create_assistant(db, &api, &urls(), &second_course, new_assistant(second_course.id))
        .await
        .unwrap();

    let utterance = |agent_id: &str| LlmWebhookRequest {
        call_id: None,
        agent_id: agent_id.to_owned(),
        session_id: "shared".to_owned(),
        message: WebhookMessage {
            role: "user".to_owned(),
            content: "hello".to_owned(),
        },
    };
    handle_llm_webhook(db, utterance(&first.agent_id), first.webhook_token.as_deref())
        .await
        .unwrap();

    let result = handle_llm_webhook(db, utterance(&second.agent_id), second.webhook_token.as_deref()).await;
    assert!(matches!(result, Err(AssistantError::SessionConflict)));

    let register = RegisterWebhookRequest {
        call_id: None,
        agent_id: second.agent_id.clone(),
        session_id: "shared".to_owned(),
        user_id: student.id,
    };
    let result = handle_register_webhook(db, register, second.webhook_token.as_deref()).await;
    assert!(matches!(result, Err(AssistantError::SessionConflict)));

    let stored = conversation::Query::find_by_session(db, "shared").await.unwrap().unwrap();
    assert_eq!(stored.assistant_id, first.id);
    assert_eq!(stored.user_id, None);
    let messages = message::Query::list_for_conversation(db, stored.id).await.unwrap();
    assert_eq!(messages.len(), 2);
}
