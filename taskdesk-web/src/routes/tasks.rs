/// Task endpoints
///
/// Every handler runs behind the session requirement and scopes its queries to
/// the signed-in user; a task owned by someone else answers exactly like a
/// missing one (404).
///
/// # Endpoints
///
/// - `POST /tasks` - Add a task
/// - `GET /tasks/:id/edit` - Edit form
/// - `POST /tasks/:id/edit` - Save title and description
/// - `POST /tasks/:id/toggle` - Flip completion
/// - `POST /tasks/:id/delete` - Delete permanently

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use taskdesk_shared::auth::session::CurrentUser;
use taskdesk_shared::models::task::{Task, TaskError, TaskInput, TaskQuery};

use super::pages::load_dashboard;
use crate::{
    app::AppState,
    error::{HtmlForm, WebError, WebResult},
    flash::{self, Flash, FlashMessage},
    middleware::csrf::CsrfGuard,
    views::{pages::EditTaskPage, render, Chrome},
};

/// Add and edit form fields
#[derive(Debug, Default, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub csrf_token: String,
}

/// Form fields of the toggle and delete buttons
#[derive(Debug, Default, Deserialize)]
pub struct ActionForm {
    #[serde(default)]
    pub csrf_token: String,
}

/// Task ids in paths that don't parse are simply unknown tasks
fn parse_task_id(raw: &str) -> WebResult<i64> {
    raw.parse::<i64>().map_err(|_| WebError::NotFound)
}

fn back_to_dashboard(state: &AppState, message: FlashMessage) -> Response {
    flash::redirect_with("/dashboard", message, state.secure_cookies())
}

/// `POST /tasks`
///
/// # Errors
///
/// - `400 Bad Request`: dashboard re-rendered with the form's messages
/// - `403 Forbidden`: CSRF token invalid
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(csrf): Extension<CsrfGuard>,
    HtmlForm(form): HtmlForm<TaskForm>,
) -> WebResult<Response> {
    csrf.verify(&form.csrf_token)?;

    let input = TaskInput::new(&form.title, &form.description);

    let mut tx = state.db.begin().await?;

    match Task::create(&mut tx, user.id, input).await {
        Ok(task) => {
            tx.commit().await?;
            tracing::info!(user_id = user.id, task_id = task.id, "Task created");

            Ok(back_to_dashboard(
                &state,
                FlashMessage::success("Task added successfully!"),
            ))
        }
        Err(TaskError::Validation(errors)) => {
            let mut page =
                load_dashboard(&mut tx, &state, &user, csrf.token(), TaskQuery::default()).await?;
            page.draft_title = form.title;
            page.draft_description = form.description;
            page.errors = errors;

            let chrome = Chrome::new(Some(&user.username), None);
            Ok((StatusCode::BAD_REQUEST, render(&page, &chrome)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /tasks/:id/edit`
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(flash): Extension<Flash>,
    Extension(csrf): Extension<CsrfGuard>,
    Path(id): Path<String>,
) -> WebResult<Response> {
    let task_id = parse_task_id(&id)?;

    let mut tx = state.db.begin().await?;
    let task = Task::find_owned(&mut tx, user.id, task_id).await?;
    tx.commit().await?;

    let page = EditTaskPage::for_task(task, csrf.token().to_string(), state.config.display.clone());

    Ok(render(&page, &Chrome::new(Some(&user.username), flash.0)).into_response())
}

/// `POST /tasks/:id/edit`
///
/// # Errors
///
/// - `400 Bad Request`: edit form re-rendered with the submitted values
/// - `403 Forbidden`: CSRF token invalid
/// - `404 Not Found`: task missing or not owned
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(csrf): Extension<CsrfGuard>,
    Path(id): Path<String>,
    HtmlForm(form): HtmlForm<TaskForm>,
) -> WebResult<Response> {
    csrf.verify(&form.csrf_token)?;
    let task_id = parse_task_id(&id)?;

    let input = TaskInput::new(&form.title, &form.description);

    let mut tx = state.db.begin().await?;

    match Task::update(&mut tx, user.id, task_id, input).await {
        Ok(task) => {
            tx.commit().await?;
            tracing::info!(user_id = user.id, task_id = task.id, "Task updated");

            Ok(back_to_dashboard(
                &state,
                FlashMessage::success("Task updated successfully!"),
            ))
        }
        Err(TaskError::Validation(errors)) => {
            let task = Task::find_owned(&mut tx, user.id, task_id).await?;

            let page = EditTaskPage {
                csrf_token: csrf.token().to_string(),
                task,
                title: form.title,
                description: form.description,
                errors,
                display: state.config.display.clone(),
            };

            let chrome = Chrome::new(Some(&user.username), None);
            Ok((StatusCode::BAD_REQUEST, render(&page, &chrome)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `POST /tasks/:id/toggle`
pub async fn toggle(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(csrf): Extension<CsrfGuard>,
    Path(id): Path<String>,
    HtmlForm(form): HtmlForm<ActionForm>,
) -> WebResult<Response> {
    csrf.verify(&form.csrf_token)?;
    let task_id = parse_task_id(&id)?;

    let mut tx = state.db.begin().await?;
    let task = Task::toggle(&mut tx, user.id, task_id).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        task_id = task.id,
        completed = task.completed,
        "Task toggled"
    );

    let status = if task.completed {
        "completed"
    } else {
        "marked as incomplete"
    };

    Ok(back_to_dashboard(
        &state,
        FlashMessage::success(format!("Task \"{}\" {}!", task.title, status)),
    ))
}

/// `POST /tasks/:id/delete`
///
/// Not idempotent: deleting the same task again is a 404.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(csrf): Extension<CsrfGuard>,
    Path(id): Path<String>,
    HtmlForm(form): HtmlForm<ActionForm>,
) -> WebResult<Response> {
    csrf.verify(&form.csrf_token)?;
    let task_id = parse_task_id(&id)?;

    let mut tx = state.db.begin().await?;
    let task = Task::delete(&mut tx, user.id, task_id).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, task_id = task.id, "Task deleted");

    Ok(back_to_dashboard(
        &state,
        FlashMessage::success(format!("Task \"{}\" deleted successfully!", task.title)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        assert_eq!(parse_task_id("42").unwrap(), 42);
        assert!(matches!(parse_task_id("abc"), Err(WebError::NotFound)));
        assert!(matches!(parse_task_id(""), Err(WebError::NotFound)));
        assert!(matches!(
            parse_task_id("99999999999999999999"),
            Err(WebError::NotFound)
        ));
    }
}
