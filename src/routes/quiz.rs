use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::engine::quiz::DifficultyChoice;
use crate::engine::CreatedQuiz;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::profile::Difficulty;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateQuizBody {
    student_id: String,
    subject: String,
    #[serde(default)]
    difficulty: DifficultyChoice,
    #[serde(default)]
    question_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitQuizBody {
    student_id: String,
    answers: Vec<Option<usize>>,
    time_taken_secs: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectQuery {
    student_id: String,
    subject: String,
}

/// Question as handed to the client: no correct option, no explanation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizQuestionDto {
    id: String,
    topic: String,
    prompt: String,
    options: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedQuizDto {
    quiz_id: String,
    subject: String,
    difficulty: Difficulty,
    hint_available: bool,
    extra_time_secs: u32,
    questions: Vec<QuizQuestionDto>,
}

impl From<CreatedQuiz> for CreatedQuizDto {
    fn from(created: CreatedQuiz) -> Self {
        Self {
            quiz_id: created.quiz_id,
            subject: created.subject,
            difficulty: created.difficulty,
            hint_available: created.hint_available,
            extra_time_secs: created.extra_time_secs,
            questions: created
                .questions
                .into_iter()
                .map(|q| QuizQuestionDto {
                    id: q.id,
                    topic: q.topic,
                    prompt: q.prompt,
                    options: q.options,
                })
                .collect(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_quiz))
        .route("/:id/submit", post(submit_quiz))
        .route("/weak-topics", get(weak_topics))
        .route("/revision", get(revision_summary))
}

async fn create_quiz(
    State(state): State<AppState>,
    Json(body): Json<CreateQuizBody>,
) -> Result<impl IntoResponse, AppError> {
    if body.subject.trim().is_empty() {
        return Err(AppError::validation("subject must not be empty"));
    }

    let created = state
        .engine()
        .create_quiz(
            &body.student_id,
            &body.subject,
            body.difficulty,
            body.question_count,
        )
        .await?;
    Ok(ok(CreatedQuizDto::from(created)))
}

async fn submit_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(body): Json<SubmitQuizBody>,
) -> Result<impl IntoResponse, AppError> {
    let result = state
        .engine()
        .submit_quiz(&body.student_id, &quiz_id, &body.answers, body.time_taken_secs)
        .await?;
    Ok(ok(result))
}

async fn weak_topics(
    State(state): State<AppState>,
    Query(query): Query<SubjectQuery>,
) -> Result<impl IntoResponse, AppError> {
    let topics = state
        .engine()
        .weak_topics(&query.student_id, &query.subject)
        .await?;
    Ok(ok(topics))
}

async fn revision_summary(
    State(state): State<AppState>,
    Query(query): Query<SubjectQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state
        .engine()
        .revision_summary(&query.student_id, &query.subject)
        .await?;
    Ok(ok(summary))
}
