//! # Todo ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /todo/` - Todo 一覧
//! - `POST /todo/` - Todo 作成
//! - `PUT /todo/{id}` - タイトルと完了フラグの更新
//! - `DELETE /todo/{id}` - Todo 削除
//!
//! パスの ID はストアへの問い合わせ前に検証する。

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path,
        State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todo_domain::todo::{Todo, TodoChanges, TodoId, TodoTitle};
use todo_shared::{ApiResponse, CreatedResponse, MessageResponse};

use crate::{error::ApiError, usecase::TodoUseCaseImpl};

/// Todo API の共有状態
pub struct TodoState {
    pub usecase: TodoUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// Todo の JSON 表現
///
/// `completed` は真偽値ではなく `"true"` / `"false"` の文字列で返す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoView {
    pub id:         String,
    pub title:      String,
    pub completed:  String,
    pub created_at: DateTime<Utc>,
}

impl From<&Todo> for TodoView {
    fn from(todo: &Todo) -> Self {
        Self {
            id:         todo.id().to_string(),
            title:      todo.title().to_string(),
            completed:  todo.completed().to_string(),
            created_at: todo.created_at(),
        }
    }
}

/// Todo 作成リクエスト
///
/// `completed` など他のフィールドは無視する。
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
}

/// Todo 更新リクエスト
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title:     String,
    pub completed: bool,
}

/// JSON ボディの抽出結果を検証済みのリクエストに変換する
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))
}

/// パスの ID を検証する
///
/// パーセントデコード後に UTF-8 として読めないパスも不正な ID として扱う。
fn parse_id(path: Result<Path<String>, PathRejection>) -> Result<TodoId, ApiError> {
    let Path(raw) = path.map_err(|_| ApiError::InvalidId)?;
    let id = TodoId::parse(&raw).map_err(|_| ApiError::InvalidId)?;

    tracing::Span::current().record("id", tracing::field::display(&id));
    Ok(id)
}

fn parse_title(raw: String) -> Result<TodoTitle, ApiError> {
    TodoTitle::new(raw).map_err(|_| ApiError::TitleRequired)
}

// --- ハンドラ ---

/// GET /todo/
///
/// 保存されている全 Todo を返す（順序は不定）。
#[tracing::instrument(skip_all)]
pub async fn list_todos(
    State(state): State<Arc<TodoState>>,
) -> Result<impl IntoResponse, ApiError> {
    let todos = state.usecase.list_todos().await?;

    let views: Vec<TodoView> = todos.iter().map(TodoView::from).collect();
    Ok((StatusCode::OK, Json(ApiResponse::new(views))))
}

/// POST /todo/
///
/// タイトルが未指定・空白のみの場合は何も保存せず 400 を返す。
#[tracing::instrument(skip_all)]
pub async fn create_todo(
    State(state): State<Arc<TodoState>>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = parse_body(payload)?;
    let title = parse_title(request.title.unwrap_or_default())?;

    let todo = state.usecase.create_todo(title).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(
            "todo created successfully",
            todo.id().to_string(),
        )),
    ))
}

/// PUT /todo/{id}
#[tracing::instrument(skip_all, fields(id = tracing::field::Empty))]
pub async fn update_todo(
    State(state): State<Arc<TodoState>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let todo_id = parse_id(path)?;
    let request = parse_body(payload)?;
    let changes = TodoChanges {
        title:     parse_title(request.title)?,
        completed: request.completed,
    };

    state.usecase.update_todo(todo_id, changes).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("todo updated successfully")),
    ))
}

/// DELETE /todo/{id}
#[tracing::instrument(skip_all, fields(id = tracing::field::Empty))]
pub async fn delete_todo(
    State(state): State<Arc<TodoState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let todo_id = parse_id(path)?;

    state.usecase.delete_todo(todo_id).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("todo deleted successfully")),
    ))
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, header},
    };
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use todo_domain::clock::FixedClock;
    use todo_infra::mock::{MockFailure, MockTodoRepository};
    use tower::ServiceExt;

    use super::*;
    use crate::router::todo_router;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap()
    }

    fn create_test_app(repository: &MockTodoRepository) -> Router {
        let usecase = TodoUseCaseImpl::new(
            Arc::new(repository.clone()),
            Arc::new(FixedClock::new(fixed_now())),
        );
        todo_router(Arc::new(TodoState { usecase }))
    }

    fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn response_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn existing_todo(repository: &MockTodoRepository, title: &str) -> Todo {
        let todo = Todo::new(TodoId::new(), TodoTitle::new(title).unwrap(), fixed_now());
        repository.add_todo(todo.clone());
        todo
    }

    // ===== TodoView =====

    #[test]
    fn test_todo_view_はcompletedを文字列で表現する() {
        let id = TodoId::new();
        let todo = Todo::from_db(id, "buy milk".to_string(), true, fixed_now());

        let json = serde_json::to_value(TodoView::from(&todo)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": id.to_string(),
                "title": "buy milk",
                "completed": "true",
                "created_at": "2026-01-15T09:30:00Z"
            })
        );
    }

    // ===== GET /todo/ =====

    #[tokio::test]
    async fn test_get_空のときdataは空配列() {
        // Given
        let repository = MockTodoRepository::new();
        let sut = create_test_app(&repository);

        // When
        let response = sut.oneshot(empty_request(Method::GET, "/todo/")).await.unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response_body(response).await, serde_json::json!({ "data": [] }));
    }

    #[rstest]
    #[case("/todo")]
    #[case("/todo/")]
    #[tokio::test]
    async fn test_get_末尾スラッシュの有無にかかわらず一覧を返す(#[case] uri: &str) {
        let repository = MockTodoRepository::new();
        let todo = existing_todo(&repository, "buy milk");
        let sut = create_test_app(&repository);

        let response = sut.oneshot(empty_request(Method::GET, uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_body(response).await;
        assert_eq!(body["data"][0]["id"], todo.id().to_string());
        assert_eq!(body["data"][0]["completed"], "false");
    }

    #[tokio::test]
    async fn test_get_ストア障害で503とfetchメッセージ() {
        let repository = MockTodoRepository::failing(MockFailure::Store);
        let sut = create_test_app(&repository);

        let response = sut.oneshot(empty_request(Method::GET, "/todo/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = response_body(response).await;
        assert_eq!(body["message"], "could not fetch todos");
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_get_デコード失敗で500とdecodeメッセージ() {
        let repository = MockTodoRepository::failing(MockFailure::Decode);
        let sut = create_test_app(&repository);

        let response = sut.oneshot(empty_request(Method::GET, "/todo/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response_body(response).await["message"],
            "could not decode todos"
        );
    }

    // ===== POST /todo/ =====

    #[tokio::test]
    async fn test_post_タイトルを指定すると201とtodo_idが返る() {
        // Given
        let repository = MockTodoRepository::new();
        let sut = create_test_app(&repository);

        // When
        let response = sut
            .oneshot(json_request(
                Method::POST,
                "/todo/",
                r#"{"title": "buy milk", "completed": true}"#,
            ))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_body(response).await;
        assert_eq!(body["message"], "todo created successfully");

        let stored = repository.todos();
        assert_eq!(stored.len(), 1);
        assert_eq!(body["todo_id"], stored[0].id().to_string());
        assert!(!stored[0].completed(), "completed の指定は無視されること");
        assert_eq!(stored[0].created_at(), fixed_now());
    }

    #[rstest]
    #[case(r#"{"title": ""}"#, "空文字列")]
    #[case(r#"{"title": "   "}"#, "空白のみ")]
    #[case(r#"{}"#, "未指定")]
    #[case(r#"{"title": null}"#, "null")]
    #[tokio::test]
    async fn test_post_タイトルが無いと400で何も保存されない(
        #[case] body: &str,
        #[case] _description: &str,
    ) {
        let repository = MockTodoRepository::new();
        let sut = create_test_app(&repository);

        let response = sut
            .oneshot(json_request(Method::POST, "/todo/", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_body(response).await,
            serde_json::json!({ "message": "title is required", "error": "bad request" })
        );
        assert!(repository.todos().is_empty());
    }

    #[rstest]
    #[case(r#"{"title": "#, "途中で切れた JSON")]
    #[case(r#"{"title": 42}"#, "型の不一致")]
    #[case(r#""buy milk""#, "オブジェクトではない")]
    #[tokio::test]
    async fn test_post_不正なjsonは400でinvalid_request(
        #[case] body: &str,
        #[case] _description: &str,
    ) {
        let repository = MockTodoRepository::new();
        let sut = create_test_app(&repository);

        let response = sut
            .oneshot(json_request(Method::POST, "/todo/", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_body(response).await;
        assert_eq!(body["message"], "invalid request");
        assert!(!body["error"].as_str().unwrap().is_empty());
        assert!(repository.todos().is_empty());
    }

    // ===== PUT /todo/{id} =====

    #[tokio::test]
    async fn test_put_タイトルと完了フラグのみが更新される() {
        // Given
        let repository = MockTodoRepository::new();
        let todo = existing_todo(&repository, "buy milk");
        let sut = create_test_app(&repository);

        // When
        let response = sut
            .oneshot(json_request(
                Method::PUT,
                &format!("/todo/{}", todo.id()),
                r#"{"title": "buy oat milk", "completed": true}"#,
            ))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response_body(response).await,
            serde_json::json!({ "message": "todo updated successfully" })
        );
        assert_eq!(
            repository.todos(),
            vec![Todo::from_db(
                *todo.id(),
                "buy oat milk".to_string(),
                true,
                todo.created_at()
            )]
        );
    }

    #[tokio::test]
    async fn test_put_不正なidは400でストアに触れない() {
        let repository = MockTodoRepository::new();
        let todo = existing_todo(&repository, "buy milk");
        let sut = create_test_app(&repository);

        let response = sut
            .oneshot(json_request(
                Method::PUT,
                "/todo/65a1f0c2e4b0a1b2c3d4e5f6",
                r#"{"title": "hacked", "completed": true}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_body(response).await,
            serde_json::json!({ "message": "invalid id", "error": "bad request" })
        );
        assert_eq!(repository.todos(), vec![todo]);
    }

    #[tokio::test]
    async fn test_put_存在しないidは404() {
        let repository = MockTodoRepository::new();
        let sut = create_test_app(&repository);

        let response = sut
            .oneshot(json_request(
                Method::PUT,
                &format!("/todo/{}", TodoId::new()),
                r#"{"title": "ghost", "completed": false}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response_body(response).await["message"],
            "could not update todo"
        );
    }

    #[rstest]
    #[case(r#"{"title": "buy milk"}"#, "completed の欠落")]
    #[case(r#"{"title": "buy milk", "completed": "true"}"#, "completed が文字列")]
    #[tokio::test]
    async fn test_put_ボディの形が不正なら400でinvalid_request(
        #[case] body: &str,
        #[case] _description: &str,
    ) {
        let repository = MockTodoRepository::new();
        let todo = existing_todo(&repository, "buy milk");
        let sut = create_test_app(&repository);

        let response = sut
            .oneshot(json_request(Method::PUT, &format!("/todo/{}", todo.id()), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_body(response).await["message"], "invalid request");
        assert_eq!(repository.todos(), vec![todo]);
    }

    #[tokio::test]
    async fn test_put_空白のタイトルは400でtitle_required() {
        let repository = MockTodoRepository::new();
        let todo = existing_todo(&repository, "buy milk");
        let sut = create_test_app(&repository);

        let response = sut
            .oneshot(json_request(
                Method::PUT,
                &format!("/todo/{}", todo.id()),
                r#"{"title": " ", "completed": true}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_body(response).await["message"],
            "title is required"
        );
        assert_eq!(repository.todos(), vec![todo]);
    }

    // ===== DELETE /todo/{id} =====

    #[tokio::test]
    async fn test_delete_一件削除され二回目は404() {
        // Given
        let repository = MockTodoRepository::new();
        let keep = existing_todo(&repository, "walk");
        let target = existing_todo(&repository, "buy milk");
        let sut = create_test_app(&repository);
        let uri = format!("/todo/{}", target.id());

        // When
        let first = sut
            .clone()
            .oneshot(empty_request(Method::DELETE, &uri))
            .await
            .unwrap();
        let second = sut
            .oneshot(empty_request(Method::DELETE, &uri))
            .await
            .unwrap();

        // Then
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(
            response_body(first).await,
            serde_json::json!({ "message": "todo deleted successfully" })
        );
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response_body(second).await["message"],
            "could not delete todo"
        );
        assert_eq!(repository.todos(), vec![keep]);
    }

    #[rstest]
    #[case(Method::DELETE, "/todo/not-an-id", "UUID ではない")]
    #[case(Method::DELETE, "/todo/%FF", "UTF-8 として読めない")]
    #[case(Method::PUT, "/todo/%FF", "UTF-8 として読めない（更新）")]
    #[case(Method::PUT, "/todo/%E3%81", "途中で切れたマルチバイト文字")]
    #[tokio::test]
    async fn test_不正なidはinvalid_idのエンベロープで400になる(
        #[case] method: Method,
        #[case] uri: &str,
        #[case] _description: &str,
    ) {
        let repository = MockTodoRepository::new();
        let todo = existing_todo(&repository, "buy milk");
        let sut = create_test_app(&repository);

        let response = sut
            .oneshot(json_request(
                method,
                uri,
                r#"{"title": "hacked", "completed": true}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_body(response).await,
            serde_json::json!({ "message": "invalid id", "error": "bad request" })
        );
        assert_eq!(repository.todos(), vec![todo]);
    }

    #[tokio::test]
    async fn test_delete_タイムアウトは503() {
        let repository = MockTodoRepository::new();
        let todo = existing_todo(&repository, "buy milk");
        repository.fail_with(MockFailure::Timeout);
        let sut = create_test_app(&repository);

        let response = sut
            .oneshot(empty_request(Method::DELETE, &format!("/todo/{}", todo.id())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response_body(response).await["message"],
            "could not delete todo"
        );
    }
}
