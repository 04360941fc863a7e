/// Page view-models
///
/// One struct per page. Handlers fill them in and pass them to
/// [`super::render`]; nothing here touches the database.

use axum::http::StatusCode;
use taskdesk_shared::models::task::{
    Task, TaskFilter, TaskQuery, TaskStats, DESCRIPTION_MAX_LEN, TITLE_MAX_LEN,
};
use taskdesk_shared::validation::{FieldError, USERNAME_MAX_LEN};

use super::{csrf_field, escape, field_messages, format_time, Page};
use crate::config::DisplayConfig;

/// Form-level messages (not tied to one input)
fn form_messages(errors: &[FieldError]) -> String {
    let messages = field_messages(errors, "form");
    if messages.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="form-errors" role="alert">{}</div>"#, messages)
    }
}

/// Landing page for anonymous visitors
pub struct IndexPage;

impl Page for IndexPage {
    fn title(&self) -> String {
        "Welcome".to_string()
    }

    fn body(&self) -> String {
        r#"<section class="hero">
<h1>Stay on top of your tasks</h1>
<p>Taskdesk keeps a private to-do list for every account. Add tasks, tick them off, search and tidy up.</p>
<p class="actions"><a class="button" href="/register">Create an account</a> <a class="button secondary" href="/login">Log in</a></p>
</section>"#
            .to_string()
    }
}

pub struct LoginPage {
    pub csrf_token: String,
    pub username: String,
    pub errors: Vec<FieldError>,
}

impl Page for LoginPage {
    fn title(&self) -> String {
        "Log in".to_string()
    }

    fn body(&self) -> String {
        format!(
            r#"<section class="card narrow">
<h1>Log in</h1>
{errors}
<form method="post" action="/login" novalidate>
{csrf}
<label for="username">Username</label>
<input id="username" name="username" type="text" value="{username}" autocomplete="username" required>
{username_errors}
<label for="password">Password</label>
<input id="password" name="password" type="password" autocomplete="current-password" required>
{password_errors}
<button type="submit">Log in</button>
</form>
<p class="muted">No account yet? <a href="/register">Register</a></p>
</section>"#,
            errors = form_messages(&self.errors),
            csrf = csrf_field(&self.csrf_token),
            username = escape(&self.username),
            username_errors = field_messages(&self.errors, "username"),
            password_errors = field_messages(&self.errors, "password"),
        )
    }
}

pub struct RegisterPage {
    pub csrf_token: String,
    pub username: String,
    pub errors: Vec<FieldError>,
}

impl Page for RegisterPage {
    fn title(&self) -> String {
        "Register".to_string()
    }

    fn body(&self) -> String {
        format!(
            r#"<section class="card narrow">
<h1>Create an account</h1>
{errors}
<form id="register-form" method="post" action="/register" novalidate>
{csrf}
<label for="username">Username</label>
<input id="username" name="username" type="text" value="{username}" maxlength="{username_max}" autocomplete="username" required>
<p class="hint">3 to 20 characters: letters, numbers and underscores.</p>
{username_errors}
<label for="password">Password</label>
<input id="password" name="password" type="password" autocomplete="new-password" required>
<p class="hint">At least 8 characters with an uppercase letter, a lowercase letter and a number.</p>
{password_errors}
<label for="confirm_password">Confirm password</label>
<input id="confirm_password" name="confirm_password" type="password" autocomplete="new-password" required>
{confirm_errors}
<p class="client-errors" data-client-errors hidden></p>
<button type="submit">Register</button>
</form>
<p class="muted">Already registered? <a href="/login">Log in</a></p>
</section>"#,
            errors = form_messages(&self.errors),
            csrf = csrf_field(&self.csrf_token),
            username = escape(&self.username),
            username_max = USERNAME_MAX_LEN,
            username_errors = field_messages(&self.errors, "username"),
            password_errors = field_messages(&self.errors, "password"),
            confirm_errors = field_messages(&self.errors, "confirm_password"),
        )
    }
}

/// Title and description inputs shared by the add and edit forms
fn task_fields(title: &str, description: &str, errors: &[FieldError]) -> String {
    format!(
        r#"<label for="title">Title</label>
<input id="title" name="title" type="text" value="{title}" maxlength="{title_max}" data-counter="title-count" required>
<small class="counter" id="title-count"></small>
{title_errors}
<label for="description">Description <span class="muted">(optional)</span></label>
<textarea id="description" name="description" rows="3" maxlength="{description_max}" data-counter="description-count">{description}</textarea>
<small class="counter" id="description-count"></small>
{description_errors}"#,
        title = escape(title),
        title_max = TITLE_MAX_LEN,
        title_errors = field_messages(errors, "title"),
        description = escape(description),
        description_max = DESCRIPTION_MAX_LEN,
        description_errors = field_messages(errors, "description"),
    )
}

pub struct DashboardPage {
    pub csrf_token: String,
    pub username: String,
    pub tasks: Vec<Task>,
    pub stats: TaskStats,
    pub query: TaskQuery,

    /// Values to refill the add form with after a failed submit
    pub draft_title: String,
    pub draft_description: String,
    pub errors: Vec<FieldError>,

    pub display: DisplayConfig,
}

impl DashboardPage {
    fn stats_panel(&self) -> String {
        format!(
            r#"<section class="stats">
<div class="stat"><span class="stat-value">{}</span><span class="stat-label">Total</span></div>
<div class="stat"><span class="stat-value">{}</span><span class="stat-label">Completed</span></div>
<div class="stat"><span class="stat-value">{}</span><span class="stat-label">Incomplete</span></div>
</section>"#,
            self.stats.total, self.stats.completed, self.stats.incomplete
        )
    }

    fn search_bar(&self) -> String {
        let search = self.query.search.as_deref().unwrap_or("");

        let filters: String = [TaskFilter::All, TaskFilter::Incomplete, TaskFilter::Completed]
            .iter()
            .map(|filter| {
                let current = if *filter == self.query.filter {
                    r#" class="active" aria-pressed="true""#
                } else {
                    ""
                };
                format!(
                    r#"<button type="submit" name="filter" value="{value}"{current}>{label}</button>"#,
                    value = filter.as_str(),
                    label = match filter {
                        TaskFilter::All => "All",
                        TaskFilter::Incomplete => "Incomplete",
                        TaskFilter::Completed => "Completed",
                    },
                )
            })
            .collect();

        format!(
            r#"<form class="search" method="get" action="/dashboard">
<input type="search" name="search" value="{search}" placeholder="Search titles" aria-label="Search titles">
<div class="filters">{filters}</div>
</form>"#,
            search = escape(search),
        )
    }

    fn task_item(&self, task: &Task) -> String {
        let description = task
            .description
            .as_deref()
            .map(|d| format!(r#"<p class="task-description">{}</p>"#, escape(d)))
            .unwrap_or_default();

        let (state_class, toggle_label) = if task.completed {
            ("task completed", "Mark incomplete")
        } else {
            ("task", "Mark complete")
        };

        format!(
            r#"<li class="{state_class}" id="task-{id}">
<div class="task-main">
<h3 class="task-title">{title}</h3>
{description}
<p class="task-meta">Created {created}</p>
</div>
<div class="task-actions">
<form method="post" action="/tasks/{id}/toggle">{csrf}<button type="submit">{toggle_label}</button></form>
<a class="button secondary" href="/tasks/{id}/edit">Edit</a>
<form method="post" action="/tasks/{id}/delete" data-confirm="Delete this task? This cannot be undone.">{csrf}<button type="submit" class="danger">Delete</button></form>
</div>
</li>"#,
            id = task.id,
            title = escape(&task.title),
            created = format_time(task.created_at, &self.display),
            csrf = csrf_field(&self.csrf_token),
        )
    }

    fn task_list(&self) -> String {
        if self.tasks.is_empty() {
            let message = if self.query.search.is_some() || self.query.filter != TaskFilter::All {
                "No tasks match your search."
            } else {
                "No tasks yet. Add your first one above."
            };
            return format!(r#"<p class="empty">{}</p>"#, message);
        }

        let items: String = self.tasks.iter().map(|task| self.task_item(task)).collect();
        format!(r#"<ul class="tasks">{}</ul>"#, items)
    }
}

impl Page for DashboardPage {
    fn title(&self) -> String {
        "Dashboard".to_string()
    }

    fn body(&self) -> String {
        format!(
            r#"<h1>{username}'s tasks</h1>
{stats}
<section class="card">
<h2>Add a task</h2>
{errors}
<form method="post" action="/tasks" novalidate>
{csrf}
{fields}
<button type="submit">Add task</button>
</form>
</section>
<section class="card">
{search}
{list}
</section>"#,
            username = escape(&self.username),
            stats = self.stats_panel(),
            errors = form_messages(&self.errors),
            csrf = csrf_field(&self.csrf_token),
            fields = task_fields(&self.draft_title, &self.draft_description, &self.errors),
            search = self.search_bar(),
            list = self.task_list(),
        )
    }
}

pub struct EditTaskPage {
    pub csrf_token: String,
    pub task: Task,

    /// Values shown in the inputs (the submitted ones after a failed save)
    pub title: String,
    pub description: String,
    pub errors: Vec<FieldError>,

    pub display: DisplayConfig,
}

impl EditTaskPage {
    /// Form prefilled with the stored task
    pub fn for_task(task: Task, csrf_token: String, display: DisplayConfig) -> Self {
        Self {
            csrf_token,
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            task,
            errors: Vec::new(),
            display,
        }
    }
}

impl Page for EditTaskPage {
    fn title(&self) -> String {
        "Edit task".to_string()
    }

    fn body(&self) -> String {
        let status = if self.task.completed {
            "Completed"
        } else {
            "Incomplete"
        };

        format!(
            r#"<section class="card narrow">
<h1>Edit task</h1>
<dl class="task-times">
<dt>Status</dt><dd>{status}</dd>
<dt>Created</dt><dd>{created}</dd>
<dt>Last updated</dt><dd>{updated}</dd>
</dl>
{errors}
<form method="post" action="/tasks/{id}/edit" novalidate>
{csrf}
{fields}
<button type="submit">Save changes</button>
<a class="button secondary" href="/dashboard">Cancel</a>
</form>
</section>"#,
            created = format_time(self.task.created_at, &self.display),
            updated = format_time(self.task.updated_at, &self.display),
            errors = form_messages(&self.errors),
            id = self.task.id,
            csrf = csrf_field(&self.csrf_token),
            fields = task_fields(&self.title, &self.description, &self.errors),
        )
    }
}

/// Generic error page (404, 403, 500, ...)
pub struct ErrorPage {
    pub status: StatusCode,
    pub heading: String,
    pub message: String,
}

impl ErrorPage {
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            heading: "Page not found".to_string(),
            message: "The page you are looking for does not exist or has been removed.".to_string(),
        }
    }

    pub fn forbidden_csrf() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            heading: "Form expired".to_string(),
            message: "Your form session has expired or is invalid. Please go back, reload the page and submit again.".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            heading: "Bad request".to_string(),
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            heading: "Something went wrong".to_string(),
            message: "An unexpected error occurred. Please try again later.".to_string(),
        }
    }
}

impl Page for ErrorPage {
    fn title(&self) -> String {
        self.heading.clone()
    }

    fn body(&self) -> String {
        format!(
            r#"<section class="card narrow error-page">
<p class="error-code">{code}</p>
<h1>{heading}</h1>
<p>{message}</p>
<p><a class="button" href="/">Back to home</a></p>
</section>"#,
            code = self.status.as_u16(),
            heading = escape(&self.heading),
            message = escape(&self.message),
        )
    }
}
