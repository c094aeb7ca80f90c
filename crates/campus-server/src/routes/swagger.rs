use super::api;

use axum::Router;
use utoipa::openapi::Components;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder};
use utoipa::{Modify, OpenApi, openapi::security::SecurityScheme};
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

struct SecurityAddon;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::v0::status::get_status,
        api::v0::accounts::register,
        api::v0::accounts::logout,
        api::v0::accounts::get_me,
        api::v0::accounts::update_me,
        api::v0::accounts::get_profile,
        api::v0::accounts::update_profile,
        api::v0::accounts::upload_avatar,
        api::v0::accounts::get_public_profile,
        api::v0::courses::list_courses,
        api::v0::courses::create_course,
        api::v0::courses::get_course,
        api::v0::courses::update_course,
        api::v0::courses::delete_course,
        api::v0::courses::enroll,
        api::v0::courses::unenroll,
        api::v0::courses::list_students,
        api::v0::courses::add_student,
        api::v0::courses::remove_student,
        api::v0::courses::modules::create_module,
        api::v0::courses::modules::get_module,
        api::v0::courses::modules::update_module,
        api::v0::courses::modules::delete_module,
        api::v0::courses::modules::create_content,
        api::v0::courses::modules::update_content,
        api::v0::courses::modules::delete_content,
        api::v0::courses::modules::upload_content_file,
        api::v0::courses::assignments::create_assignment,
        api::v0::courses::assignments::get_assignment,
        api::v0::courses::assignments::update_assignment,
        api::v0::courses::assignments::delete_assignment,
        api::v0::courses::assignments::submit_assignment,
        api::v0::courses::assignments::get_submission,
        api::v0::courses::assignments::grade,
        api::v0::forums::list_forums,
        api::v0::forums::create_forum,
        api::v0::forums::get_forum,
        api::v0::forums::update_forum,
        api::v0::forums::create_topic,
        api::v0::forums::get_topic,
        api::v0::forums::update_topic,
        api::v0::forums::toggle_pin,
        api::v0::forums::toggle_close,
        api::v0::forums::subscribe,
        api::v0::forums::unsubscribe,
        api::v0::forums::create_post,
        api::v0::forums::update_post,
        api::v0::forums::delete_post,
        api::v0::messages::list_conversations,
        api::v0::messages::start_conversation,
        api::v0::messages::unread_count,
        api::v0::messages::get_conversation,
        api::v0::messages::send_message,
        api::v0::messages::leave_conversation,
        api::v0::messages::delete_message,
        api::v0::notifications::list_notifications,
        api::v0::notifications::unread_count,
        api::v0::notifications::mark_read,
        api::v0::notifications::mark_all_read,
        api::v0::notifications::delete_notification,
        api::v0::assistants::list_assistants,
        api::v0::assistants::create_assistant,
        api::v0::assistants::get_assistant,
        api::v0::assistants::update_assistant,
        api::v0::assistants::delete_assistant,
        api::v0::assistants::start_call,
        api::v0::assistants::list_calls,
        api::v0::assistants::get_call,
        api::v0::assistants::end_call,
        api::v0::assistants::get_conversation,
        api::v0::assistants::llm_webhook,
        api::v0::assistants::register_webhook,
        api::v0::dashboard::get_dashboard,
    ),
    modifiers(&SecurityAddon),
    tags()
)]
pub(crate) struct ApiDoc;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Components::new);
        components.add_security_scheme(
            "token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Access token"))
                    .build(),
            ),
        );
    }
}

pub fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        // RapiDoc points at the document SwaggerUi already serves.
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v0/courses/{course}"));
        assert!(doc.paths.paths.contains_key("/api/v0/assistants/webhooks/llm"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("token"));
        assert!(components.schemas.contains_key("Dashboard"));
    }
}
