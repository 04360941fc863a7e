/// Integration tests for the task repository

mod common;

use common::{create_user, test_pool};
use taskdesk_shared::models::task::{Task, TaskError, TaskFilter, TaskInput, TaskQuery};

fn all() -> TaskQuery {
    TaskQuery::default()
}

#[tokio::test]
async fn test_create_task_defaults() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let mut conn = pool.acquire().await.unwrap();

    let task = Task::create(&mut conn, alice.id, TaskInput::new("  Buy milk ", "  "))
        .await
        .unwrap();

    assert_eq!(task.user_id, alice.id);
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.description, None);
    assert!(!task.completed);
    assert_eq!(task.created_at, task.updated_at);
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let mut conn = pool.acquire().await.unwrap();

    for input in [
        TaskInput::new("", ""),
        TaskInput::new("ab", ""),
        TaskInput::new(&"t".repeat(201), ""),
        TaskInput::new("Fine title", &"d".repeat(201)),
    ] {
        assert!(matches!(
            Task::create(&mut conn, alice.id, input).await,
            Err(TaskError::Validation(_))
        ));
    }

    assert!(Task::list(&mut conn, alice.id, &all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_boundary_lengths_accepted() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let mut conn = pool.acquire().await.unwrap();

    let short = Task::create(&mut conn, alice.id, TaskInput::new("abc", "")).await;
    let long = Task::create(
        &mut conn,
        alice.id,
        TaskInput::new(&"t".repeat(200), &"d".repeat(200)),
    )
    .await;

    assert!(short.is_ok());
    assert!(long.is_ok());
}

#[tokio::test]
async fn test_list_newest_first_and_scoped_to_owner() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let mut conn = pool.acquire().await.unwrap();

    let first = Task::create(&mut conn, alice.id, TaskInput::new("First", "")).await.unwrap();
    let second = Task::create(&mut conn, alice.id, TaskInput::new("Second", "")).await.unwrap();
    Task::create(&mut conn, bob.id, TaskInput::new("Bob's task", "")).await.unwrap();

    let tasks = Task::list(&mut conn, alice.id, &all()).await.unwrap();
    let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();

    assert_eq!(ids, vec![second.id, first.id]);
    assert!(tasks.iter().all(|t| t.user_id == alice.id));
}

#[tokio::test]
async fn test_filter_and_search() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let mut conn = pool.acquire().await.unwrap();

    let milk = Task::create(&mut conn, alice.id, TaskInput::new("Buy milk", "")).await.unwrap();
    let report = Task::create(&mut conn, alice.id, TaskInput::new("Write report", "")).await.unwrap();
    Task::toggle(&mut conn, alice.id, report.id).await.unwrap();

    let incomplete = Task::list(&mut conn, alice.id, &TaskQuery::parse(Some("incomplete"), None))
        .await
        .unwrap();
    assert_eq!(incomplete.iter().map(|t| t.id).collect::<Vec<_>>(), vec![milk.id]);

    let completed = Task::list(&mut conn, alice.id, &TaskQuery::parse(Some("completed"), None))
        .await
        .unwrap();
    assert_eq!(completed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![report.id]);

    let unknown = Task::list(&mut conn, alice.id, &TaskQuery::parse(Some("bogus"), None))
        .await
        .unwrap();
    assert_eq!(unknown.len(), 2);

    let search = Task::list(&mut conn, alice.id, &TaskQuery::parse(None, Some("MILK")))
        .await
        .unwrap();
    assert_eq!(search.iter().map(|t| t.id).collect::<Vec<_>>(), vec![milk.id]);

    let combined = Task::list(
        &mut conn,
        alice.id,
        &TaskQuery {
            filter: TaskFilter::Completed,
            search: Some("milk".to_string()),
        },
    )
    .await
    .unwrap();
    assert!(combined.is_empty());
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let mut conn = pool.acquire().await.unwrap();

    Task::create(&mut conn, alice.id, TaskInput::new("100% done", "")).await.unwrap();
    Task::create(&mut conn, alice.id, TaskInput::new("1000 done", "")).await.unwrap();
    Task::create(&mut conn, alice.id, TaskInput::new("snake_case", "")).await.unwrap();
    Task::create(&mut conn, alice.id, TaskInput::new("snakeXcase", "")).await.unwrap();

    let percent = Task::list(&mut conn, alice.id, &TaskQuery::parse(None, Some("0%")))
        .await
        .unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].title, "100% done");

    let underscore = Task::list(&mut conn, alice.id, &TaskQuery::parse(None, Some("e_c")))
        .await
        .unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].title, "snake_case");
}

#[tokio::test]
async fn test_toggle_twice_restores_state() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let mut conn = pool.acquire().await.unwrap();

    let task = Task::create(&mut conn, alice.id, TaskInput::new("Buy milk", "")).await.unwrap();

    let once = Task::toggle(&mut conn, alice.id, task.id).await.unwrap();
    assert!(once.completed);
    assert!(once.updated_at > task.updated_at);

    let twice = Task::toggle(&mut conn, alice.id, task.id).await.unwrap();
    assert!(!twice.completed);
    assert!(twice.updated_at > once.updated_at);
    assert_eq!(twice.created_at, task.created_at);
}

#[tokio::test]
async fn test_update_changes_fields_and_timestamp() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let mut conn = pool.acquire().await.unwrap();

    let task = Task::create(&mut conn, alice.id, TaskInput::new("Buy milk", "2 litres")).await.unwrap();
    let updated = Task::update(&mut conn, alice.id, task.id, TaskInput::new("Buy oat milk", ""))
        .await
        .unwrap();

    assert_eq!(updated.title, "Buy oat milk");
    assert_eq!(updated.description, None);
    assert_eq!(updated.completed, task.completed);
    assert_eq!(updated.created_at, task.created_at);
    assert!(updated.updated_at > task.updated_at);

    let invalid = Task::update(&mut conn, alice.id, task.id, TaskInput::new("ab", "")).await;
    assert!(matches!(invalid, Err(TaskError::Validation(_))));

    let stored = Task::find_owned(&mut conn, alice.id, task.id).await.unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_ownership_guard() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let mut conn = pool.acquire().await.unwrap();

    let task = Task::create(&mut conn, alice.id, TaskInput::new("Private", "")).await.unwrap();

    assert!(matches!(
        Task::find_owned(&mut conn, bob.id, task.id).await,
        Err(TaskError::NotFound)
    ));
    assert!(matches!(
        Task::update(&mut conn, bob.id, task.id, TaskInput::new("Hijacked", "")).await,
        Err(TaskError::NotFound)
    ));
    // Foreign id wins over invalid input
    assert!(matches!(
        Task::update(&mut conn, bob.id, task.id, TaskInput::new("", "")).await,
        Err(TaskError::NotFound)
    ));
    assert!(matches!(
        Task::toggle(&mut conn, bob.id, task.id).await,
        Err(TaskError::NotFound)
    ));
    assert!(matches!(
        Task::delete(&mut conn, bob.id, task.id).await,
        Err(TaskError::NotFound)
    ));

    let untouched = Task::find_owned(&mut conn, alice.id, task.id).await.unwrap();
    assert_eq!(untouched, task);
}

#[tokio::test]
async fn test_delete_is_permanent() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let mut conn = pool.acquire().await.unwrap();

    let task = Task::create(&mut conn, alice.id, TaskInput::new("Temporary", "")).await.unwrap();
    let deleted = Task::delete(&mut conn, alice.id, task.id).await.unwrap();
    assert_eq!(deleted.id, task.id);

    assert!(matches!(
        Task::delete(&mut conn, alice.id, task.id).await,
        Err(TaskError::NotFound)
    ));
    assert!(matches!(
        Task::find_owned(&mut conn, alice.id, task.id).await,
        Err(TaskError::NotFound)
    ));
    assert!(Task::list(&mut conn, alice.id, &all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stats() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let mut conn = pool.acquire().await.unwrap();

    let empty = Task::stats(&mut conn, alice.id, None).await.unwrap();
    assert_eq!((empty.total, empty.completed, empty.incomplete), (0, 0, 0));

    let a = Task::create(&mut conn, alice.id, TaskInput::new("One", "")).await.unwrap();
    Task::create(&mut conn, alice.id, TaskInput::new("Two", "")).await.unwrap();
    Task::create(&mut conn, alice.id, TaskInput::new("Three", "")).await.unwrap();
    Task::toggle(&mut conn, alice.id, a.id).await.unwrap();

    let stats = Task::stats(&mut conn, alice.id, None).await.unwrap();
    assert_eq!((stats.total, stats.completed, stats.incomplete), (3, 1, 2));
}

#[tokio::test]
async fn test_stats_follow_search() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let mut conn = pool.acquire().await.unwrap();

    let milk = Task::create(&mut conn, alice.id, TaskInput::new("Buy milk", "")).await.unwrap();
    Task::create(&mut conn, alice.id, TaskInput::new("Buy bread", "")).await.unwrap();
    Task::create(&mut conn, alice.id, TaskInput::new("Call mom", "")).await.unwrap();
    Task::create(&mut conn, alice.id, TaskInput::new("100% done", "")).await.unwrap();
    Task::create(&mut conn, bob.id, TaskInput::new("Buy eggs", "")).await.unwrap();
    Task::toggle(&mut conn, alice.id, milk.id).await.unwrap();

    let stats = Task::stats(&mut conn, alice.id, Some("BUY")).await.unwrap();
    assert_eq!((stats.total, stats.completed, stats.incomplete), (2, 1, 1));

    let stats = Task::stats(&mut conn, alice.id, Some("%")).await.unwrap();
    assert_eq!((stats.total, stats.completed, stats.incomplete), (1, 0, 1));

    let stats = Task::stats(&mut conn, alice.id, Some("nothing")).await.unwrap();
    assert_eq!((stats.total, stats.completed, stats.incomplete), (0, 0, 0));
}

#[tokio::test]
async fn test_unknown_owner_rejected() {
    let pool = test_pool().await;
    let mut conn = pool.acquire().await.unwrap();

    let result = Task::create(&mut conn, 4242, TaskInput::new("Nobody's", "")).await;
    assert!(matches!(result, Err(TaskError::Database(_))));
}
